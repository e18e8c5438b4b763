//! # Greet Client
//!
//! A typed wrapper around the generated `GreetService` stub with one method per call shape:
//!
//! | Method                                 | Shape                   |
//! |----------------------------------------|-------------------------|
//! | [`GreetClient::greet`]                 | Unary                   |
//! | [`GreetClient::greet_many_times`]      | Server streaming        |
//! | [`GreetClient::long_greet`]            | Client streaming        |
//! | [`GreetClient::greet_everyone`]        | Bidirectional streaming |
//! | [`GreetClient::greet_with_deadline`]   | Unary with a deadline   |
use crate::{
    BoxError,
    stream::{BidiOutcome, DEFAULT_BUFFER, StreamCoordinator, StreamError, spawn_paced},
};
use http_body::Body as HttpBody;
use std::time::Duration;
use tonic::{Code, Request, Status, transport::Channel};
use tour_proto::{
    GreetServiceClient,
    greet::{
        GreetEveryoneRequest, GreetManyTimesRequest, GreetRequest, GreetWithDeadlineRequest,
        Greeting, LongGreetRequest,
    },
};

/// Builds a [`Greeting`] from a first name and an optional last name.
pub fn greeting(first_name: impl Into<String>, last_name: Option<String>) -> Greeting {
    Greeting {
        first_name: first_name.into(),
        last_name: last_name.filter(|name| !name.is_empty()),
    }
}

/// How a call with a deadline ended, when it did not fail for another reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeadlineOutcome {
    /// The server answered in time.
    Completed(String),
    /// The deadline passed before the server answered.
    DeadlineExceeded,
}

#[derive(Debug, Clone)]
pub struct GreetClient<S = Channel> {
    client: GreetServiceClient<S>,
}

impl<S> GreetClient<S>
where
    S: tonic::client::GrpcService<tonic::body::Body> + Clone,
    S::Error: Into<BoxError>,
    S::ResponseBody: HttpBody<Data = tonic::codegen::Bytes> + Send + 'static,
    <S::ResponseBody as HttpBody>::Error: Into<BoxError> + Send,
{
    pub fn new(service: S) -> Self {
        Self {
            client: GreetServiceClient::new(service),
        }
    }

    /// Unary call: one greeting in, one result out.
    pub async fn greet(&mut self, greeting: Greeting) -> Result<String, Status> {
        let request = GreetRequest {
            greeting: Some(greeting),
        };

        let response = self.client.greet(request).await?;
        Ok(response.into_inner().result)
    }

    /// Server streaming call: drains every result until the server closes the stream.
    ///
    /// `on_result` is invoked as each result arrives, before the stream has finished.
    pub async fn greet_many_times(
        &mut self,
        greeting: Greeting,
        mut on_result: impl FnMut(&str),
    ) -> Result<Vec<String>, Status> {
        let request = GreetManyTimesRequest {
            greeting: Some(greeting),
        };

        let mut stream = self.client.greet_many_times(request).await?.into_inner();
        let mut results = Vec::new();

        while let Some(response) = stream.message().await? {
            on_result(&response.result);
            results.push(response.result);
        }

        Ok(results)
    }

    /// Client streaming call: sends every greeting, `pace` apart, then waits for the single
    /// result the server computes once the request stream is closed.
    pub async fn long_greet(
        &mut self,
        greetings: Vec<Greeting>,
        pace: Option<Duration>,
    ) -> Result<String, Status> {
        let requests = greetings
            .into_iter()
            .map(|greeting| LongGreetRequest {
                greeting: Some(greeting),
            })
            .collect();

        let (stream, sender) = spawn_paced(requests, pace, DEFAULT_BUFFER);

        let result = self.client.long_greet(stream).await;
        // The sender finishes on its own once the call has consumed or dropped the stream.
        if !sender.is_finished() {
            sender.abort();
        }

        Ok(result?.into_inner().result)
    }

    /// Bidirectional streaming call driven by `coordinator`.
    ///
    /// Greetings are sent in order while results are received concurrently; `on_result` sees
    /// each result as soon as it arrives.
    pub async fn greet_everyone(
        &mut self,
        greetings: Vec<Greeting>,
        coordinator: &StreamCoordinator,
        mut on_result: impl FnMut(&str),
    ) -> Result<BidiOutcome<String>, StreamError> {
        let requests = greetings
            .into_iter()
            .map(|greeting| GreetEveryoneRequest {
                greeting: Some(greeting),
            })
            .collect();

        let mut client = self.client.clone();
        let outcome = coordinator
            .run(
                requests,
                move |stream| async move { client.greet_everyone(stream).await },
                |response| on_result(&response.result),
            )
            .await?;

        Ok(BidiOutcome {
            sent: outcome.sent,
            received: outcome.received.into_iter().map(|r| r.result).collect(),
        })
    }

    /// Unary call bounded by `timeout`.
    ///
    /// The timeout travels to the server as the gRPC deadline and is also enforced locally,
    /// so the call returns no later than `timeout` even if the server ignores it.
    pub async fn greet_with_deadline(
        &mut self,
        greeting: Greeting,
        timeout: Duration,
    ) -> Result<DeadlineOutcome, Status> {
        let mut request = Request::new(GreetWithDeadlineRequest {
            greeting: Some(greeting),
        });
        request.set_timeout(timeout);

        let call = self.client.greet_with_deadline(request);

        match tokio::time::timeout(timeout, call).await {
            Ok(Ok(response)) => Ok(DeadlineOutcome::Completed(response.into_inner().result)),
            Ok(Err(status)) if status.code() == Code::DeadlineExceeded => {
                Ok(DeadlineOutcome::DeadlineExceeded)
            }
            Ok(Err(status)) => Err(status),
            Err(_elapsed) => Ok(DeadlineOutcome::DeadlineExceeded),
        }
    }
}
