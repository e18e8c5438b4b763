//! # Tour CLI Entry Point
//!
//! The main executable. This file drives the application lifecycle:
//!
//! 1. **Initialization**: Parses command-line arguments using [`cli::Cli`] and sets up logging.
//! 2. **Configuration**: Merges CLI flags with the optional config file into connection settings.
//! 3. **Connection**: Opens the single channel used for the rest of the process.
//! 4. **Execution**: Runs the requested call through `tour_core`.
//! 5. **Presentation**: Prints results as they arrive; failures go to stderr with exit code 1.

mod cli;
mod config;
mod formatter;
mod logging;

use clap::Parser;
use cli::{BlogCommands, Cli, Commands, GreetCommands, GreetingArgs, StreamArgs};
use formatter::{BlogList, CallResult, FormattedString, GenericError, LabelledBlog};
use std::process;
use tokio_util::sync::CancellationToken;
use tour_core::{
    blog::BlogClient,
    connection::{self, ConnectionSettings},
    greet::{GreetClient, greeting},
    proto::{blog::Blog, greet::Greeting},
    stream::StreamCoordinator,
    tonic::transport::Channel,
};

#[tokio::main]
async fn main() {
    let args = Cli::parse();
    logging::init(args.verbose);

    let settings = match config::resolve(&args) {
        Ok(settings) => settings,
        Err(err) => exit_with(GenericError("Invalid configuration", format!("{err:#}"))),
    };

    let channel = connect_or_exit(&settings).await;

    match args.command {
        Commands::Greet { call } => run_greet(GreetClient::new(channel), call).await,
        Commands::Blog { call } => run_blog(BlogClient::new(channel), call).await,
    }
}

fn exit_with(err: impl Into<FormattedString>) -> ! {
    eprintln!("{}", err.into());
    process::exit(1);
}

async fn connect_or_exit(settings: &ConnectionSettings) -> Channel {
    match connection::connect(settings).await {
        Ok(channel) => {
            tracing::info!(uri = %settings.uri(), tls = settings.tls.is_some(), "connected");
            channel
        }
        Err(err) => exit_with(err),
    }
}

fn to_greeting(args: GreetingArgs) -> Greeting {
    greeting(args.first_name, args.last_name)
}

fn to_greetings(stream: &StreamArgs) -> Vec<Greeting> {
    stream
        .names
        .iter()
        .map(|name| greeting(name.as_str(), None))
        .collect()
}

async fn run_greet(mut client: GreetClient, call: GreetCommands) {
    match call {
        GreetCommands::Unary { greeting } => match client.greet(to_greeting(greeting)).await {
            Ok(result) => println!("{}", FormattedString::from(CallResult("Greet", result))),
            Err(status) => exit_with(status),
        },
        GreetCommands::ManyTimes { greeting } => {
            let result = client
                .greet_many_times(to_greeting(greeting), |result| {
                    tracing::info!(result, "received");
                    println!("{}", FormattedString::from(CallResult("GreetManyTimes", result)));
                })
                .await;

            if let Err(status) = result {
                exit_with(status);
            }
        }
        GreetCommands::Long { stream } => {
            tracing::info!(count = stream.names.len(), pace = ?stream.pace(), "sending greetings");

            match client
                .long_greet(to_greetings(&stream), Some(stream.pace()))
                .await
            {
                Ok(result) => println!("{}", FormattedString::from(CallResult("LongGreet", result))),
                Err(status) => exit_with(status),
            }
        }
        GreetCommands::Everyone { stream } => greet_everyone(&mut client, &stream).await,
        GreetCommands::Deadline { greeting, timeouts } => {
            let greeting = to_greeting(greeting);

            for timeout in timeouts {
                tracing::info!(?timeout, "calling GreetWithDeadline");

                match client.greet_with_deadline(greeting.clone(), timeout).await {
                    Ok(outcome) => println!("{}", FormattedString::from(outcome)),
                    Err(status) => exit_with(status),
                }
            }
        }
    }
}

async fn greet_everyone(client: &mut GreetClient, stream: &StreamArgs) {
    let cancel = CancellationToken::new();
    let coordinator = StreamCoordinator::new()
        .with_pace(stream.pace())
        .with_cancellation(cancel.clone());

    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling the stream");
            cancel.cancel();
        }
    });

    let result = client
        .greet_everyone(to_greetings(stream), &coordinator, |result| {
            tracing::info!(result, "received");
            println!("{}", FormattedString::from(CallResult("GreetEveryone", result)));
        })
        .await;

    ctrl_c.abort();

    match result {
        Ok(outcome) => println!("{}", FormattedString::from(&outcome)),
        Err(err) => exit_with(err),
    }
}

async fn run_blog(mut client: BlogClient, call: BlogCommands) {
    match call {
        BlogCommands::Create { blog } => {
            match client
                .create_blog(blog.author, blog.title, blog.content)
                .await
            {
                Ok(blog) => print_blog("Blog has been created", &blog),
                Err(err) => exit_with(err),
            }
        }
        BlogCommands::Read { id } => match client.read_blog(id).await {
            Ok(blog) => print_blog("Blog was read", &blog),
            Err(err) => exit_with(err),
        },
        BlogCommands::Update { id, blog } => {
            let blog = Blog {
                id,
                author_id: blog.author,
                title: blog.title,
                content: blog.content,
            };

            match client.update_blog(blog).await {
                Ok(blog) => print_blog("Blog was updated", &blog),
                Err(err) => exit_with(err),
            }
        }
        BlogCommands::Delete { id } => match client.delete_blog(id).await {
            Ok(id) => println!("{}", FormattedString::from(CallResult("Blog was deleted", id))),
            Err(err) => exit_with(err),
        },
        BlogCommands::List => {
            let result = client
                .list_blogs(|blog| {
                    tracing::info!(id = %blog.id, "received");
                    println!("{}", FormattedString::from(blog));
                })
                .await;

            match result {
                Ok(blogs) => println!("{}", FormattedString::from(BlogList(&blogs))),
                Err(err) => exit_with(err),
            }
        }
    }
}

fn print_blog(label: &str, blog: &Blog) {
    println!("{}", FormattedString::from(LabelledBlog(label, blog)));
}
