//! # CLI
//!
//! This module defines the command-line interface of `tour` using `clap`.
//!
//! Connection options are global so they can be given before or after the subcommand;
//! any option left out falls back to the config file, then to the built-in default.
use clap::{Args, Parser, Subcommand};
use std::{path::PathBuf, time::Duration};

#[derive(Parser, Debug)]
#[command(
    name = "tour",
    version,
    about = "Unary, streaming and deadline gRPC calls against the greet and blog services"
)]
pub struct Cli {
    /// Server address, as host:port or a full URI [default: localhost:50051]
    #[arg(long, global = true)]
    pub addr: Option<String>,

    /// CA certificate (PEM) to trust. Enables TLS
    #[arg(long, global = true)]
    pub ca_cert: Option<PathBuf>,

    /// Name to verify the server certificate against (defaults to the host of --addr)
    #[arg(long, global = true)]
    pub tls_domain: Option<String>,

    /// Give up connecting after this many milliseconds
    #[arg(long, global = true)]
    pub connect_timeout_ms: Option<u64>,

    /// JSON file with default connection options
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv). RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Calls on the greet service, one per call shape
    Greet {
        #[command(subcommand)]
        call: GreetCommands,
    },

    /// CRUD and listing calls on the blog service
    Blog {
        #[command(subcommand)]
        call: BlogCommands,
    },
}

#[derive(Args, Debug, Clone)]
pub struct GreetingArgs {
    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct StreamArgs {
    /// First name to greet; repeat for each request, sent in order
    #[arg(long = "name", required = true)]
    pub names: Vec<String>,

    /// Delay between consecutive requests, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub pace_ms: u64,
}

impl StreamArgs {
    pub fn pace(&self) -> Duration {
        Duration::from_millis(self.pace_ms)
    }
}

#[derive(Subcommand, Debug)]
pub enum GreetCommands {
    /// Unary: one greeting, one result
    Unary {
        #[command(flatten)]
        greeting: GreetingArgs,
    },

    /// Server streaming: one greeting, a stream of results
    ManyTimes {
        #[command(flatten)]
        greeting: GreetingArgs,
    },

    /// Client streaming: a stream of greetings, one result
    Long {
        #[command(flatten)]
        stream: StreamArgs,
    },

    /// Bidirectional streaming: greetings and results flow concurrently (Ctrl-C cancels)
    Everyone {
        #[command(flatten)]
        stream: StreamArgs,
    },

    /// Unary with a deadline; one call per timeout, in order
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// tour greet deadline --first-name Ada --timeout-ms 5000 --timeout-ms 1000
    /// ```
    Deadline {
        #[command(flatten)]
        greeting: GreetingArgs,

        #[arg(long = "timeout-ms", required = true, value_parser = parse_millis)]
        timeouts: Vec<Duration>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct BlogArgs {
    #[arg(long)]
    pub author: String,

    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub content: String,
}

#[derive(Subcommand, Debug)]
pub enum BlogCommands {
    /// Create a blog; the server assigns its id
    Create {
        #[command(flatten)]
        blog: BlogArgs,
    },

    /// Read a blog by id
    Read {
        #[arg(long)]
        id: String,
    },

    /// Replace the author, title and content of a blog
    Update {
        #[arg(long)]
        id: String,

        #[command(flatten)]
        blog: BlogArgs,
    },

    /// Delete a blog by id
    Delete {
        #[arg(long)]
        id: String,
    },

    /// Stream every blog
    List,
}

fn parse_millis(value: &str) -> Result<Duration, String> {
    let millis: u64 = value
        .trim()
        .parse()
        .map_err(|e| format!("Invalid number of milliseconds '{value}': {e}"))?;

    if millis == 0 {
        return Err("Timeout must be greater than zero".to_string());
    }

    Ok(Duration::from_millis(millis))
}
