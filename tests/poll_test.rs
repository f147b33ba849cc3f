//! Tests for the polling strategy. Runs on a paused clock.

mod common;

use std::future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use serde_json::json;
use tokio::sync::oneshot;
use tokio::time::Instant;

use common::{MockTransport, USERS, orchestrator};
use herald::{Herald, HeraldError, PollOptions, Requester, TransportError};

fn every(ms: u64) -> PollOptions {
    PollOptions::new().interval(Duration::from_millis(ms))
}

fn transport() -> Arc<MockTransport> {
    let transport = Arc::new(MockTransport::new());
    transport.respond(USERS, json!({"data": {"online": 3}}));
    transport
}

#[tokio::test(start_paused = true)]
async fn polls_until_limit_then_ends() {
    let transport = transport();
    let herald = orchestrator(&transport);

    let start = Instant::now();
    let items: Vec<_> = herald
        .get_until(USERS, future::pending(), every(100).limit(3))
        .subscribe()
        .collect()
        .await;

    let numbers: Vec<u64> = items
        .into_iter()
        .map(|item| item.unwrap().request_number)
        .collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert_eq!(transport.calls(), 3);
    assert!(start.elapsed() >= Duration::from_millis(300));
    assert_eq!(herald.request_count(Requester::GetUntil), 3);
}

#[tokio::test(start_paused = true)]
async fn first_poll_waits_one_interval() {
    let transport = transport();
    let herald = orchestrator(&transport);

    let start = Instant::now();
    let mut stream = herald
        .get_until(USERS, future::pending(), every(100).limit(1))
        .subscribe();

    tokio::time::advance(Duration::from_millis(90)).await;
    tokio::task::yield_now().await;
    assert_eq!(transport.calls(), 0);

    let envelope = stream.next().await.unwrap().unwrap();
    assert_eq!(envelope.requester, Requester::GetUntil);
    assert_eq!(envelope.data, json!({"online": 3}));
    assert!(start.elapsed() >= Duration::from_millis(100));
    assert!(stream.next().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn cancel_signal_stops_polling() {
    let transport = transport();
    let herald = orchestrator(&transport);

    let (stop, stopped) = oneshot::channel::<()>();
    let cancel = async move {
        let _ = stopped.await;
    };
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(250)).await;
        let _ = stop.send(());
    });

    let items: Vec<_> = herald
        .get_until(USERS, cancel, every(100))
        .subscribe()
        .collect()
        .await;

    assert_eq!(items.len(), 2);
    assert_eq!(transport.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn subscribers_share_each_poll() {
    let transport = transport();
    let herald = orchestrator(&transport);

    let source = herald.get_until(USERS, future::pending(), every(100).limit(2));
    let first = source.subscribe().collect::<Vec<_>>();
    let second = source.subscribe().collect::<Vec<_>>();
    let (first, second) = tokio::join!(first, second);

    assert_eq!(transport.calls(), 2);
    assert_eq!(first.len(), 2);
    for (a, b) in first.iter().zip(&second) {
        assert!(Arc::ptr_eq(a.as_ref().unwrap(), b.as_ref().unwrap()));
    }
}

#[tokio::test(start_paused = true)]
async fn slow_poll_is_superseded_by_the_next_tick() {
    let transport = Arc::new(MockTransport::new().with_delay(Duration::from_millis(150)));
    transport.respond(USERS, json!("status"));
    let herald = orchestrator(&transport);

    // Ticks at 100, 200 and 300ms; each request needs 150ms, so only the
    // last one is allowed to finish.
    let items: Vec<_> = herald
        .get_until(USERS, future::pending(), every(100).limit(3))
        .subscribe()
        .collect()
        .await;

    assert_eq!(transport.calls(), 3);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].as_ref().unwrap().request_number, 1);
}

#[tokio::test(start_paused = true)]
async fn failed_poll_ends_the_stream() {
    let transport = transport();
    transport.fail(USERS, TransportError::status(401, Some("Unauthorized"), json!({"error": "token expired"})));
    let herald = orchestrator(&transport);

    let items: Vec<_> = herald
        .get_until(USERS, future::pending(), every(100))
        .subscribe()
        .collect()
        .await;

    assert_eq!(transport.calls(), 1);
    assert_eq!(items.len(), 1);
    assert_eq!(
        items[0].as_ref().unwrap_err().to_string(),
        "401 Unauthorized - token expired"
    );
}

#[tokio::test(start_paused = true)]
async fn zero_limit_polls_nothing() {
    let transport = transport();
    let herald = orchestrator(&transport);

    let items: Vec<_> = herald
        .get_until(USERS, future::pending(), every(100).limit(0))
        .subscribe()
        .collect()
        .await;

    assert!(items.is_empty());
    assert_eq!(transport.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn zero_interval_is_rejected() {
    let transport = transport();
    let herald = orchestrator(&transport);

    let err = herald
        .get_until(USERS, future::pending(), every(0))
        .first()
        .await
        .unwrap_err();
    assert!(matches!(err, HeraldError::InvalidInput(_)));
}

#[tokio::test(start_paused = true)]
async fn unschedulable_interval_is_rejected() {
    let transport = transport();
    let herald = orchestrator(&transport);

    let options = PollOptions::new().interval(Duration::MAX);
    let err = herald
        .get_until(USERS, future::pending(), options)
        .first()
        .await
        .unwrap_err();
    assert!(matches!(err, HeraldError::InvalidInput(_)));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn subscribing_after_polling_finished_yields_nothing() {
    let transport = transport();
    let herald = orchestrator(&transport);

    let source = herald.get_until(USERS, future::pending(), every(100).limit(1));
    let items: Vec<_> = source.subscribe().collect().await;
    assert_eq!(items.len(), 1);

    assert_eq!(source.first().await, Err(HeraldError::Closed));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn default_interval_comes_from_config() {
    let transport = transport();
    let herald = Herald::builder()
        .transport(transport.clone())
        .poll_interval(Duration::from_millis(400))
        .build()
        .unwrap();

    let start = Instant::now();
    herald
        .get_until(USERS, future::pending(), PollOptions::new().limit(1))
        .first()
        .await
        .unwrap();
    assert!(start.elapsed() >= Duration::from_millis(400));
}
