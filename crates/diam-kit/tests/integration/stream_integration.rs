//! Payment stream subscriptions over HTTP and injected sources.

use std::time::Duration;

use diam_kit::*;
use futures::channel::mpsc;
use tokio::sync::mpsc as tokio_mpsc;

use crate::common::{MockHorizon, payment_feed};

type Chunk = Result<Vec<u8>, StreamError>;

async fn recv<T>(rx: &mut tokio_mpsc::UnboundedReceiver<T>) -> T {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for stream")
        .expect("handler channel closed")
}

fn collect(
    builder: PaymentStreamBuilder,
) -> (
    PaymentStreamBuilder,
    tokio_mpsc::UnboundedReceiver<PaymentRecord>,
    tokio_mpsc::UnboundedReceiver<StreamError>,
) {
    let (payment_tx, payments) = tokio_mpsc::unbounded_channel();
    let (error_tx, errors) = tokio_mpsc::unbounded_channel();
    let builder = builder
        .on_payment(move |payment| {
            let _ = payment_tx.send(payment);
        })
        .on_error(move |err| {
            let _ = error_tx.send(err);
        });
    (builder, payments, errors)
}

#[tokio::test]
async fn test_http_stream_delivers_payments_then_ends() {
    let mock = MockHorizon::start().await;
    let identity = Identity::generate();
    mock.state.create_account(identity.public_key());
    let ledger = mock.ledger();

    let (builder, mut payments, mut errors) = collect(ledger.stream_payments(identity.public_key()));
    let subscription = builder.cursor("now").open();
    assert_eq!(subscription.account(), identity.public_key());

    let first = recv(&mut payments).await;
    assert_eq!(first.id, "101");
    assert_eq!(first.moved_amount(), Some("1.0000000"));
    assert_eq!(first.asset(), Some(Asset::Native));

    // The malformed message between them is dropped.
    let second = recv(&mut payments).await;
    assert_eq!(second.id, "102");

    assert!(matches!(recv(&mut errors).await, StreamError::Ended));
    assert_eq!(subscription.state(), StreamState::Closed);
    assert!(payments.try_recv().is_err());
}

#[tokio::test]
async fn test_http_stream_unknown_account_reports_status() {
    let mock = MockHorizon::start().await;
    let ledger = mock.ledger();
    let stranger = Identity::generate();

    let (builder, _payments, mut errors) = collect(ledger.stream_payments(stranger.public_key()));
    let subscription = builder.open();

    assert!(matches!(
        recv(&mut errors).await,
        StreamError::Status { status: 404 }
    ));
    assert_eq!(
        subscription.wait_for(StreamState::Open).await,
        StreamState::Closed
    );
}

#[tokio::test]
async fn test_malformed_message_keeps_stream_open() {
    let ledger = Ledger::testnet().build();
    let identity = Identity::generate();
    let (feed, source) = mpsc::unbounded::<Chunk>();

    let (builder, mut payments, mut errors) = collect(ledger.stream_payments(identity.public_key()));
    let subscription = builder.open_with_source(source);
    assert_eq!(
        subscription.wait_for(StreamState::Open).await,
        StreamState::Open
    );

    feed.unbounded_send(Ok(b"data: {\"id\": 7, broken\n\n".to_vec()))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(subscription.state(), StreamState::Open);
    assert!(payments.try_recv().is_err());

    let feed_text = payment_feed(identity.public_key());
    feed.unbounded_send(Ok(feed_text.into_bytes())).unwrap();
    assert_eq!(recv(&mut payments).await.id, "101");
    assert_eq!(recv(&mut payments).await.id, "102");
    assert_eq!(
        subscription.wait_for(StreamState::Receiving).await,
        StreamState::Receiving
    );
    assert!(errors.try_recv().is_err());
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let ledger = Ledger::testnet().build();
    let identity = Identity::generate();
    let (feed, source) = mpsc::unbounded::<Chunk>();

    let (builder, mut payments, mut errors) = collect(ledger.stream_payments(identity.public_key()));
    let subscription = builder.open_with_source(source);
    subscription.wait_for(StreamState::Open).await;

    subscription.close();
    subscription.close();
    assert_eq!(subscription.state(), StreamState::Closed);
    drop(subscription);

    let _ = feed.unbounded_send(Ok(payment_feed(identity.public_key()).into_bytes()));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(payments.try_recv().is_err());
    assert!(errors.try_recv().is_err());
}

#[tokio::test]
async fn test_session_replaces_subscription() {
    let ledger = Ledger::testnet().build();
    let mut session = Session::new(ledger, Identity::generate());
    let account = *session.public_key();

    let (first_feed, first_source) = mpsc::unbounded::<Chunk>();
    let first = session.ledger().stream_payments(&account).open_with_source(first_source);
    session.set_subscription(first);

    let (_second_feed, second_source) = mpsc::unbounded::<Chunk>();
    let second = session
        .ledger()
        .stream_payments(&account)
        .open_with_source(second_source);
    session.set_subscription(second);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(first_feed.is_closed());
    assert!(session.subscription().is_some());

    session.close_subscription();
    assert!(session.subscription().is_none());
}
