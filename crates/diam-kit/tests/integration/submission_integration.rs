//! Building, signing and submitting transactions.

use std::time::Duration;

use diam_kit::*;
use tokio_test::{assert_err, assert_ok};

use crate::common::{INITIAL_SEQUENCE, MockHorizon};

async fn funded_session(mock: &MockHorizon) -> Session {
    let identity = Identity::generate();
    mock.state.create_account(identity.public_key());
    Session::new(mock.ledger(), identity)
}

// =============================================================================
// Successful submission
// =============================================================================

#[tokio::test]
async fn test_native_payment_consumes_one_sequence() {
    let mock = MockHorizon::start().await;
    let session = funded_session(&mock).await;
    let recipient = Identity::generate();
    mock.state.create_account(recipient.public_key());

    let before = assert_ok!(session.refresh().await);
    assert_eq!(before.sequence(), INITIAL_SEQUENCE);

    let payment = Operation::payment(recipient.public_key().to_string(), AssetSpec::Native, "100");
    let receipt = assert_ok!(session.execute(payment, None).await);
    assert!(receipt.successful);
    assert_eq!(receipt.hash.len(), 64);

    let after = assert_ok!(session.refresh().await);
    assert_eq!(after.sequence(), before.next_sequence());
    assert_eq!(mock.state.submissions(), 1);
}

#[tokio::test]
async fn test_manual_build_sign_submit() {
    let mock = MockHorizon::start().await;
    let session = funded_session(&mock).await;
    let ledger = session.ledger();

    let snapshot = assert_ok!(session.refresh().await);
    let envelope = assert_ok!(
        ledger
            .transaction(&snapshot)
            .operation(Operation::change_trust(AssetSpec::issued(
                "USD",
                Identity::generate().public_key().to_string(),
            )))
            .time_bounds(TimeBounds::expiring_in(Duration::from_secs(30)))
            .build()
    );
    assert_eq!(envelope.source(), &snapshot);
    assert_eq!(envelope.sequence(), snapshot.next_sequence());

    let signed = assert_ok!(session.identity().sign_envelope(envelope));
    let hash = signed.hash();
    let receipt = assert_ok!(ledger.submit(signed).await);
    assert_eq!(receipt.hash, hash.to_string());
}

#[tokio::test]
async fn test_successive_operations_each_reload() {
    let mock = MockHorizon::start().await;
    let session = funded_session(&mock).await;
    let me = session.public_key().to_string();

    for _ in 0..3 {
        let op = Operation::payment(me.clone(), AssetSpec::Native, "1");
        assert_ok!(session.execute(op, None).await);
    }

    assert_eq!(mock.state.submissions(), 3);
    assert_eq!(
        mock.state.sequence(session.public_key()),
        Some(INITIAL_SEQUENCE + 3)
    );
}

// =============================================================================
// Local validation
// =============================================================================

#[tokio::test]
async fn test_offer_with_zero_price_never_reaches_network() {
    let mock = MockHorizon::start().await;
    let session = funded_session(&mock).await;

    let offer = Operation::ManageSellOffer {
        selling: AssetSpec::Native,
        buying: AssetSpec::issued("USD", Identity::generate().public_key().to_string()),
        amount: "10".to_string(),
        price: "0".to_string(),
        offer_id: "0".to_string(),
    };
    let err = assert_err!(session.execute(offer, None).await);
    assert!(
        matches!(
            err,
            Error::InvalidOperationParameters(OperationError::NonPositivePrice(_))
        ),
        "unexpected error: {:?}",
        err
    );

    assert_eq!(mock.state.account_loads(), 0);
    assert_eq!(mock.state.submissions(), 0);
}

#[tokio::test]
async fn test_signing_for_another_account_fails() {
    let mock = MockHorizon::start().await;
    let session = funded_session(&mock).await;
    let other = Identity::generate();
    mock.state.create_account(other.public_key());

    let snapshot = assert_ok!(session.ledger().load_account(other.public_key()).await);
    let envelope = assert_ok!(
        session
            .ledger()
            .transaction(&snapshot)
            .operation(Operation::payment(
                session.public_key().to_string(),
                AssetSpec::Native,
                "5",
            ))
            .build()
    );

    let err = assert_err!(session.identity().sign_envelope(envelope));
    assert!(matches!(err, SignerError::SourceMismatch { .. }));
}

// =============================================================================
// Rejections
// =============================================================================

#[tokio::test]
async fn test_stale_snapshot_is_rejected_then_rebuilt() {
    let mock = MockHorizon::start().await;
    let session = funded_session(&mock).await;
    let me = session.public_key().to_string();

    let stale = assert_ok!(session.refresh().await);
    mock.state.bump_sequence(session.public_key());

    let envelope = assert_ok!(
        session
            .ledger()
            .transaction(&stale)
            .operation(Operation::payment(me.clone(), AssetSpec::Native, "1"))
            .build()
    );
    let signed = assert_ok!(session.identity().sign_envelope(envelope));
    let err = assert_err!(session.ledger().submit(signed).await);
    assert_eq!(err.rejection_reason(), Some(&RejectionReason::BadSequence));
    assert!(err.rejection_reason().unwrap().is_sequence_related());

    // execute loads a fresh snapshot.
    assert_ok!(
        session
            .execute(Operation::payment(me, AssetSpec::Native, "1"), None)
            .await
    );
    assert_eq!(
        mock.state.sequence(session.public_key()),
        Some(INITIAL_SEQUENCE + 2)
    );
}

#[tokio::test]
async fn test_operation_result_codes_are_mapped() {
    let mock = MockHorizon::start().await;
    let session = funded_session(&mock).await;
    mock.state.reject_next("tx_failed", &["op_underfunded"]);

    let op = Operation::payment(session.public_key().to_string(), AssetSpec::Native, "999999");
    let err = assert_err!(session.execute(op, None).await);

    match err {
        Error::Rpc(RpcError::SubmissionRejected {
            reason,
            transaction_code,
            operation_codes,
        }) => {
            assert_eq!(reason, RejectionReason::InsufficientBalance);
            assert_eq!(transaction_code, "tx_failed");
            assert_eq!(operation_codes, vec!["op_underfunded".to_string()]);
        }
        other => panic!("Expected SubmissionRejected, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_expired_time_bounds_are_rejected() {
    let mock = MockHorizon::start().await;
    let session = funded_session(&mock).await;

    let op = Operation::payment(session.public_key().to_string(), AssetSpec::Native, "1");
    let err = assert_err!(session.execute(op, Some(TimeBounds::new(0, 1))).await);
    assert_eq!(err.rejection_reason(), Some(&RejectionReason::Expired));
    assert_eq!(
        mock.state.sequence(session.public_key()),
        Some(INITIAL_SEQUENCE)
    );
}

#[tokio::test]
async fn test_unfunded_session_reports_account_not_found() {
    let mock = MockHorizon::start().await;
    let session = Session::new(mock.ledger(), Identity::generate());

    let op = Operation::payment(session.public_key().to_string(), AssetSpec::Native, "1");
    let err = assert_err!(session.execute(op, None).await);
    assert!(err.is_account_not_found());
}
