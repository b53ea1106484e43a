//! In-process mock of Horizon and friendbot.
//!
//! Accounts live in memory. Submissions are decoded as XDR and checked for
//! source account, sequence number, time bounds and signature, the same
//! checks the real network applies before anything else.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::{Form, Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use stellar_xdr::curr::{self as xdr, Limits, ReadXdr, WriteXdr};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use diam_kit::{Ledger, Network, PublicKey, RetryConfig, Signature};

/// Sequence number friendbot gives new accounts.
pub const INITIAL_SEQUENCE: i64 = 4_294_967_296;

/// Two payments, the greeting, and one malformed message in between.
pub fn payment_feed(account: &PublicKey) -> String {
    let payment = |id: &str, amount: &str| {
        json!({
            "id": id,
            "paging_token": id,
            "type": "payment",
            "from": account.to_string(),
            "to": account.to_string(),
            "asset_type": "native",
            "amount": amount,
        })
        .to_string()
    };
    format!(
        "retry: 1000\nevent: open\ndata: \"hello\"\n\n\
         id: 101\ndata: {}\n\n\
         data: {{\"id\": 7, broken\n\n\
         id: 102\ndata: {}\n\n",
        payment("101", "1.0000000"),
        payment("102", "2.5000000"),
    )
}

#[derive(Default)]
struct Inner {
    accounts: HashMap<String, i64>,
    ledger: u64,
    submissions: usize,
    account_loads: usize,
    failing_loads: usize,
    reject_next: Option<(String, Vec<String>)>,
    path_queries: Vec<HashMap<String, String>>,
}

/// Shared mock state, inspected and steered by tests.
#[derive(Clone, Default)]
pub struct MockState {
    inner: Arc<Mutex<Inner>>,
}

impl MockState {
    pub fn create_account(&self, account: &PublicKey) {
        self.inner
            .lock()
            .unwrap()
            .accounts
            .insert(account.to_string(), INITIAL_SEQUENCE);
    }

    pub fn sequence(&self, account: &PublicKey) -> Option<i64> {
        self.inner
            .lock()
            .unwrap()
            .accounts
            .get(&account.to_string())
            .copied()
    }

    /// Consume a sequence number behind the client's back.
    pub fn bump_sequence(&self, account: &PublicKey) {
        if let Some(seq) = self
            .inner
            .lock()
            .unwrap()
            .accounts
            .get_mut(&account.to_string())
        {
            *seq += 1;
        }
    }

    pub fn submissions(&self) -> usize {
        self.inner.lock().unwrap().submissions
    }

    pub fn account_loads(&self) -> usize {
        self.inner.lock().unwrap().account_loads
    }

    /// Answer the next `n` account loads with HTTP 503.
    pub fn fail_loads(&self, n: usize) {
        self.inner.lock().unwrap().failing_loads = n;
    }

    /// Reject the next submission with the given result codes.
    pub fn reject_next(&self, transaction: &str, operations: &[&str]) {
        self.inner.lock().unwrap().reject_next = Some((
            transaction.to_string(),
            operations.iter().map(|s| s.to_string()).collect(),
        ));
    }

    pub fn path_queries(&self) -> Vec<HashMap<String, String>> {
        self.inner.lock().unwrap().path_queries.clone()
    }
}

/// A running mock server.
pub struct MockHorizon {
    pub url: String,
    pub state: MockState,
    server: JoinHandle<()>,
}

impl MockHorizon {
    pub async fn start() -> Self {
        let state = MockState::default();
        let app = Router::new()
            .route("/accounts/{id}", get(load_account))
            .route("/accounts/{id}/payments", get(payments))
            .route("/transactions", post(submit))
            .route("/friendbot", get(friendbot))
            .route("/paths/strict-receive", get(strict_receive_paths))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}", addr),
            state,
            server,
        }
    }

    /// A ledger client pointed at this mock, with its faucet and no retries.
    pub fn ledger(&self) -> Ledger {
        Ledger::custom(&self.url)
            .friendbot(format!("{}/friendbot", self.url))
            .retry_config(RetryConfig::none())
            .build()
    }
}

impl Drop for MockHorizon {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// ============================================================================
// Handlers
// ============================================================================

fn problem(status: StatusCode, title: &str) -> Response {
    let body = json!({ "title": title, "status": status.as_u16() });
    (status, Json(body)).into_response()
}

fn rejection(transaction: &str, operations: &[String]) -> Response {
    let body = json!({
        "type": "https://stellar.org/horizon-errors/transaction_failed",
        "title": "Transaction Failed",
        "status": 400,
        "extras": {
            "result_codes": { "transaction": transaction, "operations": operations }
        }
    });
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

async fn load_account(State(state): State<MockState>, Path(id): Path<String>) -> Response {
    let mut inner = state.inner.lock().unwrap();
    inner.account_loads += 1;
    if inner.failing_loads > 0 {
        inner.failing_loads -= 1;
        return problem(StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable");
    }

    match inner.accounts.get(&id) {
        Some(seq) => Json(json!({
            "id": id,
            "account_id": id,
            "sequence": seq.to_string(),
            "balances": [{ "balance": "10000.0000000", "asset_type": "native" }]
        }))
        .into_response(),
        None => problem(StatusCode::NOT_FOUND, "Resource Missing"),
    }
}

#[derive(Deserialize)]
struct FriendbotQuery {
    addr: String,
}

async fn friendbot(State(state): State<MockState>, Query(query): Query<FriendbotQuery>) -> Response {
    let account: PublicKey = match query.addr.parse() {
        Ok(account) => account,
        Err(_) => return problem(StatusCode::BAD_REQUEST, "Bad Request"),
    };
    if state.sequence(&account).is_some() {
        return problem(StatusCode::BAD_REQUEST, "Account already funded");
    }
    state.create_account(&account);
    Json(json!({ "hash": "f00d", "ledger": 1 })).into_response()
}

#[derive(Deserialize)]
struct SubmitForm {
    tx: String,
}

async fn submit(State(state): State<MockState>, Form(form): Form<SubmitForm>) -> Response {
    let Ok(bytes) = STANDARD.decode(&form.tx) else {
        return rejection("tx_malformed", &[]);
    };
    let Ok(xdr::TransactionEnvelope::Tx(envelope)) =
        xdr::TransactionEnvelope::from_xdr(&bytes, Limits::none())
    else {
        return rejection("tx_malformed", &[]);
    };
    let tx = envelope.tx;

    let xdr::MuxedAccount::Ed25519(xdr::Uint256(source_bytes)) = &tx.source_account else {
        return rejection("tx_malformed", &[]);
    };
    let Ok(source) = PublicKey::from_bytes(*source_bytes) else {
        return rejection("tx_malformed", &[]);
    };
    let sequence = tx.seq_num.0;

    let payload = xdr::TransactionSignaturePayload {
        network_id: xdr::Hash(*Network::Testnet.id().as_bytes()),
        tagged_transaction: xdr::TransactionSignaturePayloadTaggedTransaction::Tx(tx.clone()),
    };
    let hash: [u8; 32] = Sha256::digest(payload.to_xdr(Limits::none()).unwrap()).into();
    let signed = envelope.signatures.iter().any(|decorated| {
        let Ok(signature) = <[u8; 64]>::try_from(decorated.signature.0.to_vec()) else {
            return false;
        };
        Signature::from_bytes(signature).verify(&hash, &source)
    });
    if !signed {
        return rejection("tx_bad_auth", &[]);
    }

    if let xdr::Preconditions::Time(bounds) = &tx.cond {
        let max_time = bounds.max_time.0;
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
        if max_time != 0 && max_time < now {
            return rejection("tx_too_late", &[]);
        }
    }

    let mut inner = state.inner.lock().unwrap();
    if let Some((transaction, operations)) = inner.reject_next.take() {
        return rejection(&transaction, &operations);
    }
    let Some(current) = inner.accounts.get_mut(&source.to_string()) else {
        return rejection("tx_no_source_account", &[]);
    };
    if sequence != *current + 1 {
        return rejection("tx_bad_seq", &[]);
    }
    *current = sequence;
    inner.submissions += 1;
    inner.ledger += 1;

    Json(json!({
        "hash": hex::encode(hash),
        "ledger": inner.ledger,
        "successful": true,
        "envelope_xdr": form.tx,
    }))
    .into_response()
}

async fn strict_receive_paths(
    State(state): State<MockState>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let amount = query.get("destination_amount").cloned().unwrap_or_default();
    state.inner.lock().unwrap().path_queries.push(query);

    Json(json!({
        "_embedded": { "records": [{
            "source_asset_type": "native",
            "source_amount": amount,
            "destination_asset_type": "native",
            "destination_amount": amount,
            "path": []
        }]}
    }))
    .into_response()
}

async fn payments(
    State(state): State<MockState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let accepts_events = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("text/event-stream"));
    if !accepts_events {
        return problem(StatusCode::NOT_ACCEPTABLE, "Not Acceptable");
    }

    let Ok(account) = id.parse::<PublicKey>() else {
        return problem(StatusCode::NOT_FOUND, "Resource Missing");
    };
    if state.sequence(&account).is_none() {
        return problem(StatusCode::NOT_FOUND, "Resource Missing");
    }

    (
        [(header::CONTENT_TYPE, "text/event-stream")],
        payment_feed(&account),
    )
        .into_response()
}
