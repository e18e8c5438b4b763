//! # Stream Coordination
//!
//! Building blocks for the two call shapes where the client streams requests.
//!
//! ## Paced sender
//!
//! [`spawn_paced`] moves a finite list of requests into a spawned task that feeds a bounded
//! channel, optionally sleeping a fixed interval between consecutive values. Once every value
//! has been handed over the task drops its sender, which the receiving
//! [`ReceiverStream`] reports as end-of-input. This is what client-streaming calls use
//! as their request body.
//!
//! ## Bidirectional coordinator
//!
//! [`StreamCoordinator::run`] pairs a paced sender with a receive loop over the response
//! stream of the same call:
//!
//! 1. The send task pushes every input in order, then closes the request side.
//! 2. The receive loop, running on the caller's task, drains responses until the server
//!    signals end-of-stream, handing each one to an observer.
//! 3. The call resolves only after end-of-stream has been observed and the send task has
//!    finished.
//!
//! A [`CancellationToken`] can stop the call at any point. Aborting the send task drops its
//! sender, so the server sees the request stream end normally, as if every input had been
//! sent. Dropping the response stream afterwards cancels the response side of the call.
use std::{future::Future, time::Duration};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tonic::{Response, Status, Streaming};

/// Capacity of the channel between the send task and the request stream.
pub const DEFAULT_BUFFER: usize = 16;

/// Errors that end a bidirectional call before end-of-stream.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("Failed to open the stream: '{0}'")]
    Open(#[source] Status),
    #[error("Stream failed after {received} response(s): '{status}'")]
    Receive {
        status: Status,
        received: usize,
    },
    #[error("Stream was cancelled after {received} response(s)")]
    Cancelled { received: usize },
    #[error("Internal error, the send task did not complete: '{0}'")]
    SendTask(#[from] tokio::task::JoinError),
}

/// The result of a bidirectional call that reached end-of-stream.
#[derive(Debug, Clone, PartialEq)]
pub struct BidiOutcome<T> {
    /// How many requests were handed to the request stream.
    pub sent: usize,
    /// Every response, in the order the server emitted them.
    pub received: Vec<T>,
}

/// Spawns a task that sends `items` in order, sleeping `pace` between consecutive items.
///
/// The returned handle resolves to the number of items sent. Sending stops early if the
/// request stream is dropped, e.g. because the call already finished.
pub fn spawn_paced<T>(
    items: Vec<T>,
    pace: Option<Duration>,
    buffer: usize,
) -> (ReceiverStream<T>, JoinHandle<usize>)
where
    T: Send + 'static,
{
    let (tx, rx) = mpsc::channel(buffer.max(1));

    let handle = tokio::spawn(async move {
        let total = items.len();
        let mut sent = 0;

        for item in items {
            if let Some(pace) = pace.filter(|_| sent > 0) {
                tokio::time::sleep(pace).await;
            }

            if tx.send(item).await.is_err() {
                tracing::debug!(sent, total, "request stream closed before all items were sent");
                break;
            }
            sent += 1;
        }

        tracing::debug!(sent, "end of input");
        sent
    });

    (ReceiverStream::new(rx), handle)
}

/// Drives one bidirectional call: a send task and a receive loop over the same stream.
#[derive(Debug, Clone, Default)]
pub struct StreamCoordinator {
    pace: Option<Duration>,
    buffer: Option<usize>,
    cancel: CancellationToken,
}

impl StreamCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long between consecutive requests.
    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = (!pace.is_zero()).then_some(pace);
        self
    }

    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.buffer = Some(buffer);
        self
    }

    /// Stop the call as soon as `cancel` is triggered.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Runs a bidirectional call to completion.
    ///
    /// # Arguments
    ///
    /// * `inputs` - The requests, sent in this order.
    /// * `open` - Opens the call given the request stream, typically a generated client method.
    /// * `on_response` - Called with each response as soon as it is received.
    ///
    /// # Returns
    ///
    /// * `Ok(BidiOutcome)` - The server reached end-of-stream.
    /// * `Err(StreamError)` - Opening or receiving failed, or the call was cancelled.
    pub async fn run<Req, Resp, F, Fut, H>(
        &self,
        inputs: Vec<Req>,
        open: F,
        mut on_response: H,
    ) -> Result<BidiOutcome<Resp>, StreamError>
    where
        Req: Send + 'static,
        F: FnOnce(ReceiverStream<Req>) -> Fut,
        Fut: Future<Output = Result<Response<Streaming<Resp>>, Status>>,
        H: FnMut(&Resp),
    {
        let (requests, sender) =
            spawn_paced(inputs, self.pace, self.buffer.unwrap_or(DEFAULT_BUFFER));

        let opened = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                sender.abort();
                return Err(StreamError::Cancelled { received: 0 });
            }
            opened = open(requests) => opened,
        };

        let mut responses = match opened {
            Ok(response) => response.into_inner(),
            Err(status) => {
                sender.abort();
                return Err(StreamError::Open(status));
            }
        };

        let mut received = Vec::new();

        loop {
            let message = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    // Ends the request side first; `responses` is dropped on return.
                    sender.abort();
                    tracing::debug!(received = received.len(), "stream cancelled");
                    return Err(StreamError::Cancelled { received: received.len() });
                }
                message = responses.message() => message,
            };

            match message {
                Ok(Some(response)) => {
                    on_response(&response);
                    received.push(response);
                }
                Ok(None) => break,
                Err(status) => {
                    sender.abort();
                    return Err(StreamError::Receive {
                        status,
                        received: received.len(),
                    });
                }
            }
        }

        tracing::debug!(received = received.len(), "end of stream");

        // Release the call so a sender still pacing sees a closed channel.
        drop(responses);
        let sent = sender.await?;

        Ok(BidiOutcome { sent, received })
    }
}
