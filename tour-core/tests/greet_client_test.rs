use greet_service_impl::{DEADLINE_WORK, GreetServiceImpl};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tonic::Code;
use tour_core::greet::{DeadlineOutcome, GreetClient, greeting};
use tour_core::proto::GreetServiceServer;
use tour_core::stream::{StreamCoordinator, StreamError};


fn client(service: GreetServiceImpl) -> GreetClient<GreetServiceServer<GreetServiceImpl>> {
    GreetClient::new(GreetServiceServer::new(service))
}

fn greetings(names: &[&str]) -> Vec<tour_core::proto::greet::Greeting> {
    names.iter().map(|name| greeting(*name, None)).collect()
}

#[tokio::test]
async fn test_unary() {
    let mut client = client(GreetServiceImpl::default());

    let result = client
        .greet(greeting("Ada", Some("Lovelace".to_string())))
        .await
        .unwrap();

    assert_eq!(result, "Hello Ada Lovelace");
}

#[tokio::test]
async fn test_unary_without_last_name() {
    let mut client = client(GreetServiceImpl::default());

    // An empty last name is treated as absent.
    let result = client.greet(greeting("Ada", Some(String::new()))).await.unwrap();

    assert_eq!(result, "Hello Ada");
}

#[tokio::test]
async fn test_unary_error_status() {
    let mut client = client(GreetServiceImpl::default());

    let status = client.greet(greeting("", None)).await.unwrap_err();

    assert_eq!(status.code(), Code::InvalidArgument);
}

#[tokio::test]
async fn test_server_streaming() {
    let mut client = client(GreetServiceImpl::default());
    let mut observed = Vec::new();

    let results = client
        .greet_many_times(greeting("Grace", None), |r| observed.push(r.to_string()))
        .await
        .unwrap();

    assert_eq!(
        results,
        vec![
            "Hello Grace number 0",
            "Hello Grace number 1",
            "Hello Grace number 2"
        ]
    );
    assert_eq!(observed, results);
}

#[tokio::test]
async fn test_server_streaming_error_status() {
    let mut client = client(GreetServiceImpl::default());

    let status = client
        .greet_many_times(greeting("", None), |_| {})
        .await
        .unwrap_err();

    assert_eq!(status.code(), Code::InvalidArgument);
}

#[tokio::test(start_paused = true)]
async fn test_client_streaming() {
    let mut client = client(GreetServiceImpl::default());

    let result = client
        .long_greet(
            greetings(&["Alan", "Barbara", "Carol"]),
            Some(Duration::from_secs(1)),
        )
        .await
        .unwrap();

    assert_eq!(result, "Hello Alan! Hello Barbara! Hello Claude! ");
}

#[tokio::test]
async fn test_client_streaming_without_requests() {
    let mut client = client(GreetServiceImpl::default());

    let result = client.long_greet(vec![], None).await.unwrap();

    assert_eq!(result, "");
}

#[tokio::test(start_paused = true)]
async fn test_bidirectional_streaming() {
    let mut client = client(GreetServiceImpl::default());
    let coordinator = StreamCoordinator::new()
        .with_pace(Duration::from_secs(1))
        .with_buffer(1);
    let mut observed = Vec::new();

    let outcome = client
        .greet_everyone(
            greetings(&["Alan", "Barbara", "Carol", "Dennis", "Edsger"]),
            &coordinator,
            |r| observed.push(r.to_string()),
        )
        .await
        .unwrap();

    assert_eq!(outcome.sent, 5);
    assert_eq!(
        outcome.received,
        vec![
            "Hello Alan! ",
            "Hello Barbara! ",
            "Hello Claude! ",
            "Hello Dennis! ",
            "Hello Edsger! "
        ]
    );
    assert_eq!(observed, outcome.received);
}

#[tokio::test]
async fn test_bidirectional_streaming_without_requests() {
    let mut client = client(GreetServiceImpl::default());

    let outcome = client
        .greet_everyone(vec![], &StreamCoordinator::new(), |_| {})
        .await
        .unwrap();

    assert_eq!(outcome.sent, 0);
    assert!(outcome.received.is_empty());
}

#[tokio::test]
async fn test_bidirectional_streaming_error_status() {
    let mut client = client(GreetServiceImpl::default());

    let err = client
        .greet_everyone(
            greetings(&["Alan", "Barbara", "", "Dennis"]),
            &StreamCoordinator::new(),
            |_| {},
        )
        .await
        .unwrap_err();

    match err {
        StreamError::Receive { status, received } => {
            assert_eq!(status.code(), Code::InvalidArgument);
            assert_eq!(received, 2);
        }
        other => panic!("Expected a receive error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_bidirectional_streaming_cancelled() {
    let service = GreetServiceImpl {
        hold_open: true,
        ..Default::default()
    };
    let input_ended = service.input_ended.clone();
    let response_closed = service.response_closed.clone();
    let mut client = client(service);
    let cancel = CancellationToken::new();
    let coordinator = StreamCoordinator::new().with_cancellation(cancel.clone());
    let mut observed = 0;

    let err = client
        .greet_everyone(greetings(&["Alan", "Barbara"]), &coordinator, |_| {
            observed += 1;
            // The server never closes its side, so stop once everything came back.
            if observed == 2 {
                cancel.cancel();
            }
        })
        .await
        .unwrap_err();

    assert!(matches!(err, StreamError::Cancelled { received: 2 }));

    // The server sees a clean end of input, then the client dropping the response side.
    tokio::time::timeout(Duration::from_secs(5), input_ended.notified())
        .await
        .expect("server never saw the end of the request stream");
    tokio::time::timeout(Duration::from_secs(5), response_closed.notified())
        .await
        .expect("server response stream was never closed");
}

#[tokio::test]
async fn test_bidirectional_streaming_cancelled_while_sending() {
    let service = GreetServiceImpl {
        hold_open: true,
        ..Default::default()
    };
    let input_ended = service.input_ended.clone();
    let mut client = client(service);
    let cancel = CancellationToken::new();
    let coordinator = StreamCoordinator::new()
        .with_pace(Duration::from_secs(60))
        .with_cancellation(cancel.clone());

    let err = client
        .greet_everyone(greetings(&["Alan", "Barbara", "Carol"]), &coordinator, |_| {
            cancel.cancel();
        })
        .await
        .unwrap_err();

    assert!(matches!(err, StreamError::Cancelled { received: 1 }));

    // Aborting the paced sender ends the request stream without waiting out the pace.
    tokio::time::timeout(Duration::from_secs(5), input_ended.notified())
        .await
        .expect("server never saw the end of the request stream");
}

#[tokio::test]
async fn test_bidirectional_streaming_cancelled_before_start() {
    let mut client = client(GreetServiceImpl::default());
    let cancel = CancellationToken::new();
    cancel.cancel();
    let coordinator = StreamCoordinator::new().with_cancellation(cancel);

    let err = client
        .greet_everyone(greetings(&["Alan"]), &coordinator, |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, StreamError::Cancelled { received: 0 }));
}

#[tokio::test(start_paused = true)]
async fn test_deadline_completes() {
    let mut client = client(GreetServiceImpl::default());

    let outcome = client
        .greet_with_deadline(greeting("Ken", None), DEADLINE_WORK + Duration::from_secs(2))
        .await
        .unwrap();

    assert_eq!(outcome, DeadlineOutcome::Completed("Hello Ken".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_deadline_exceeded() {
    let mut client = client(GreetServiceImpl::default());

    let outcome = client
        .greet_with_deadline(greeting("Ken", None), Duration::from_secs(1))
        .await
        .unwrap();

    assert_eq!(outcome, DeadlineOutcome::DeadlineExceeded);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_other_status_is_an_error() {
    let mut client = client(GreetServiceImpl::default());

    let status = client
        .greet_with_deadline(greeting("", None), Duration::from_secs(5))
        .await
        .unwrap_err();

    assert_eq!(status.code(), Code::InvalidArgument);
}
