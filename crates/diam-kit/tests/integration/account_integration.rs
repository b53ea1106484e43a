//! Identity creation, faucet funding and account loading.

use diam_kit::*;
use tokio_test::{assert_err, assert_ok};

use crate::common::{INITIAL_SEQUENCE, MockHorizon};

#[tokio::test]
async fn test_create_identity_funds_account() {
    let mock = MockHorizon::start().await;
    let ledger = mock.ledger();

    let created = ledger.create_identity().await;
    let receipt = assert_ok!(created.funding);
    assert_eq!(receipt.ledger, Some(1));

    let account = *created.identity.public_key();
    let snapshot = assert_ok!(ledger.load_account(&account).await);
    assert_eq!(snapshot.account_id(), &account);
    assert_eq!(snapshot.sequence(), INITIAL_SEQUENCE);
    assert_eq!(
        snapshot.balance(&Asset::Native),
        Some(Amount::from_units(10_000).unwrap())
    );
}

#[tokio::test]
async fn test_faucet_failure_still_returns_identity() {
    let mock = MockHorizon::start().await;
    let ledger = Ledger::custom(&mock.url)
        .friendbot(format!("{}/no-such-faucet", mock.url))
        .build();

    let created = ledger.create_identity().await;
    let err = assert_err!(created.funding);
    assert!(
        matches!(err, Error::Rpc(RpcError::Horizon { status: 404, .. })),
        "unexpected error: {:?}",
        err
    );
    assert!(!err.is_network_unavailable());

    // The identity is usable but its account does not exist yet.
    let err = assert_err!(ledger.load_account(created.identity.public_key()).await);
    assert!(err.is_account_not_found());
}

#[tokio::test]
async fn test_faucet_refusal_is_not_a_network_outage() {
    let mock = MockHorizon::start().await;
    let identity = Identity::generate();
    mock.state.create_account(identity.public_key());

    let faucet = Faucet::new(format!("{}/friendbot", mock.url));
    let err = assert_err!(faucet.fund(identity.public_key()).await);

    match &err {
        RpcError::Horizon { status, title, .. } => {
            assert_eq!(*status, 400);
            assert_eq!(title, "Account already funded");
        }
        other => panic!("Expected a Horizon error, got: {:?}", other),
    }
    assert!(!err.is_network_unavailable());
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_load_unknown_account_is_not_found() {
    let mock = MockHorizon::start().await;
    let ledger = mock.ledger();
    let stranger = Identity::generate();

    match ledger.load_account(stranger.public_key()).await {
        Err(Error::Rpc(RpcError::AccountNotFound(account))) => {
            assert_eq!(&account, stranger.public_key());
        }
        other => panic!("Expected AccountNotFound, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_horizon_is_network_unavailable() {
    let ledger = Ledger::custom("http://127.0.0.1:1")
        .retry_config(RetryConfig::none())
        .build();
    let account = Identity::generate();

    let err = assert_err!(ledger.load_account(account.public_key()).await);
    assert!(err.is_network_unavailable());
    assert!(!err.is_account_not_found());
}

#[tokio::test]
async fn test_load_retries_transient_failures() {
    let mock = MockHorizon::start().await;
    let identity = Identity::generate();
    mock.state.create_account(identity.public_key());
    mock.state.fail_loads(2);

    let ledger = Ledger::custom(&mock.url)
        .retry_config(RetryConfig {
            max_retries: 3,
            initial_delay_ms: 5,
            max_delay_ms: 20,
        })
        .build();

    let snapshot = assert_ok!(ledger.load_account(identity.public_key()).await);
    assert_eq!(snapshot.sequence(), INITIAL_SEQUENCE);
    assert_eq!(mock.state.account_loads(), 3);
}

#[tokio::test]
async fn test_load_gives_up_after_retries() {
    let mock = MockHorizon::start().await;
    let identity = Identity::generate();
    mock.state.create_account(identity.public_key());
    mock.state.fail_loads(10);

    let ledger = Ledger::custom(&mock.url)
        .retry_config(RetryConfig {
            max_retries: 1,
            initial_delay_ms: 5,
            max_delay_ms: 5,
        })
        .build();

    let err = assert_err!(ledger.load_account(identity.public_key()).await);
    assert!(err.is_network_unavailable());
    assert_eq!(mock.state.account_loads(), 2);
}
