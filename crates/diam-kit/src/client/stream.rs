//! Payment stream subscriptions.
//!
//! A [`Subscription`] follows one account's payment feed over server-sent
//! events. The connection runs on its own tokio task and publishes its
//! [`StreamState`] through a `watch` channel:
//!
//! ```text
//! Closed <- Opening -> Open -> Receiving
//!              \         \        |
//!               +---------+-------+--> Closed
//! ```
//!
//! There is no reconnect: a transport error, a non-200 response or the end
//! of the stream closes the subscription and reports a [`StreamError`].

use std::pin::Pin;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::sse::{SseDecoder, SseEvent};
use crate::error::StreamError;
use crate::types::{PaymentRecord, PublicKey};

type PaymentHandler = Arc<dyn Fn(PaymentRecord) + Send + Sync>;
type ErrorHandler = Arc<dyn Fn(StreamError) + Send + Sync>;
type ByteSource = Pin<Box<dyn Stream<Item = Result<Vec<u8>, StreamError>> + Send>>;

/// Connection state of a [`Subscription`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamState {
    /// Closed by the caller or after a failure. Terminal.
    Closed,
    /// Connecting.
    Opening,
    /// Connected, no payment delivered yet.
    Open,
    /// At least one payment has been delivered.
    Receiving,
}

// ============================================================================
// PaymentStreamBuilder
// ============================================================================

/// Configures and opens a payment stream.
///
/// Created by [`Ledger::stream_payments`](crate::Ledger::stream_payments).
///
/// ```rust,no_run
/// # use diam_kit::*;
/// # async fn example(ledger: Ledger, account: PublicKey) {
/// let subscription = ledger
///     .stream_payments(&account)
///     .cursor("now")
///     .on_payment(|payment| println!("{} {:?}", payment.kind, payment.moved_amount()))
///     .on_error(|err| eprintln!("stream closed: {}", err))
///     .open();
///
/// subscription.wait_for(StreamState::Open).await;
/// # }
/// ```
pub struct PaymentStreamBuilder {
    client: reqwest::Client,
    horizon_url: String,
    account: PublicKey,
    cursor: Option<String>,
    on_payment: Option<PaymentHandler>,
    on_error: Option<ErrorHandler>,
}

impl PaymentStreamBuilder {
    pub(crate) fn new(
        client: reqwest::Client,
        horizon_url: impl Into<String>,
        account: PublicKey,
    ) -> Self {
        Self {
            client,
            horizon_url: horizon_url.into(),
            account,
            cursor: None,
            on_payment: None,
            on_error: None,
        }
    }

    /// Called for each payment, in arrival order.
    pub fn on_payment(mut self, handler: impl Fn(PaymentRecord) + Send + Sync + 'static) -> Self {
        self.on_payment = Some(Arc::new(handler));
        self
    }

    /// Called once if the stream fails.
    pub fn on_error(mut self, handler: impl Fn(StreamError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(handler));
        self
    }

    /// Start from a paging token. `"now"` skips history.
    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// Connect to `GET /accounts/{id}/payments` in the background.
    ///
    /// Returns immediately in [`StreamState::Opening`]. Must be called from
    /// within a tokio runtime.
    pub fn open(self) -> Subscription {
        let url = format!("{}/accounts/{}/payments", self.horizon_url, self.account);
        let mut request = self
            .client
            .get(&url)
            .header("Accept", "text/event-stream");
        if let Some(cursor) = &self.cursor {
            request = request.query(&[("cursor", cursor.as_str())]);
        }

        let (subscription, task) = self.into_task();
        let handle = tokio::spawn(async move {
            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => return task.fail(StreamError::Http(e)),
            };
            let status = response.status();
            if status != reqwest::StatusCode::OK {
                return task.fail(StreamError::Status {
                    status: status.as_u16(),
                });
            }

            let source = response
                .bytes_stream()
                .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(StreamError::Http));
            task.run(Box::pin(source)).await;
        });

        subscription.with_task(handle)
    }

    /// Read events from an already-connected byte source.
    ///
    /// The subscription is `Open` as soon as the task starts. Must be called
    /// from within a tokio runtime.
    pub fn open_with_source<S>(self, source: S) -> Subscription
    where
        S: Stream<Item = Result<Vec<u8>, StreamError>> + Send + 'static,
    {
        let (subscription, task) = self.into_task();
        let handle = tokio::spawn(async move {
            task.run(Box::pin(source)).await;
        });
        subscription.with_task(handle)
    }

    fn into_task(self) -> (PendingSubscription, StreamTask) {
        let (state, _) = watch::channel(StreamState::Opening);
        let state = Arc::new(state);
        tracing::info!(account = %self.account, "opening payment stream");

        let pending = PendingSubscription {
            account: self.account,
            state: state.clone(),
        };
        let task = StreamTask {
            account: self.account,
            state,
            on_payment: self.on_payment,
            on_error: self.on_error,
        };
        (pending, task)
    }
}

impl std::fmt::Debug for PaymentStreamBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentStreamBuilder")
            .field("horizon_url", &self.horizon_url)
            .field("account", &self.account)
            .field("cursor", &self.cursor)
            .finish()
    }
}

struct PendingSubscription {
    account: PublicKey,
    state: Arc<watch::Sender<StreamState>>,
}

impl PendingSubscription {
    fn with_task(self, task: JoinHandle<()>) -> Subscription {
        Subscription {
            account: self.account,
            state: self.state,
            task,
        }
    }
}

// ============================================================================
// Stream task
// ============================================================================

struct StreamTask {
    account: PublicKey,
    state: Arc<watch::Sender<StreamState>>,
    on_payment: Option<PaymentHandler>,
    on_error: Option<ErrorHandler>,
}

impl StreamTask {
    async fn run(self, mut source: ByteSource) {
        if !self.advance(StreamState::Open) {
            return;
        }
        tracing::info!(account = %self.account, "payment stream open");

        let mut decoder = SseDecoder::new();
        while let Some(chunk) = source.next().await {
            match chunk {
                Ok(bytes) => match decoder.feed(&bytes) {
                    Ok(events) => {
                        for event in events {
                            self.deliver(event);
                        }
                    }
                    Err(e) => return self.fail(e),
                },
                Err(e) => return self.fail(e),
            }
        }
        self.fail(StreamError::Ended);
    }

    fn deliver(&self, event: SseEvent) {
        let greeting = event.event.as_deref() == Some("open") || event.data == "\"hello\"";
        if greeting || event.data.is_empty() {
            return;
        }

        let payment = match serde_json::from_str::<PaymentRecord>(&event.data) {
            Ok(payment) => payment,
            Err(e) => {
                tracing::warn!(
                    account = %self.account,
                    error = %e,
                    "dropping malformed stream message"
                );
                return;
            }
        };

        if !self.advance(StreamState::Receiving) {
            return;
        }
        tracing::debug!(account = %self.account, id = %payment.id, "payment received");
        if let Some(handler) = &self.on_payment {
            handler(payment);
        }
    }

    /// Move to `next` unless the subscription was closed. Returns false if closed.
    fn advance(&self, next: StreamState) -> bool {
        let mut open = true;
        self.state.send_if_modified(|current| {
            if *current == StreamState::Closed {
                open = false;
                return false;
            }
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
        open
    }

    fn fail(&self, error: StreamError) {
        let was_closed = self.state.send_replace(StreamState::Closed) == StreamState::Closed;
        if was_closed {
            return;
        }
        tracing::info!(account = %self.account, error = %error, "payment stream closed");
        if let Some(handler) = &self.on_error {
            handler(error);
        }
    }
}

// ============================================================================
// Subscription
// ============================================================================

/// Handle to a running payment stream.
///
/// Dropping the handle closes the stream.
pub struct Subscription {
    account: PublicKey,
    state: Arc<watch::Sender<StreamState>>,
    task: JoinHandle<()>,
}

impl Subscription {
    /// The account being followed.
    pub fn account(&self) -> &PublicKey {
        &self.account
    }

    /// Current state.
    pub fn state(&self) -> StreamState {
        *self.state.borrow()
    }

    /// Wait until the state is `target` or the stream is closed, and return it.
    pub async fn wait_for(&self, target: StreamState) -> StreamState {
        let mut receiver = self.state.subscribe();
        match receiver
            .wait_for(|state| *state == target || *state == StreamState::Closed)
            .await
        {
            Ok(state) => *state,
            Err(_) => StreamState::Closed,
        }
    }

    /// Stop the stream. Safe to call more than once.
    pub fn close(&self) {
        let previous = self.state.send_replace(StreamState::Closed);
        self.task.abort();
        if previous != StreamState::Closed {
            tracing::info!(account = %self.account, "payment stream closed by caller");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("account", &self.account)
            .field("state", &self.state())
            .finish()
    }
}
