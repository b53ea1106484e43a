//! Strict-receive path finding.

use diam_kit::*;
use tokio_test::{assert_err, assert_ok};

use crate::common::MockHorizon;

#[tokio::test]
async fn test_find_paths_to_native() {
    let mock = MockHorizon::start().await;
    let ledger = mock.ledger();
    let source = Identity::generate();

    let paths = assert_ok!(
        ledger
            .find_paths(source.public_key(), AssetSpec::Native, "10")
            .await
    );
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].destination_asset, Asset::Native);
    assert_eq!(paths[0].destination_amount, "10.0000000");
    assert!(paths[0].path.is_empty());

    let queries = mock.state.path_queries();
    assert_eq!(queries.len(), 1);
    let query = &queries[0];
    assert_eq!(query["source_account"], source.public_key().to_string());
    assert_eq!(query["destination_account"], source.public_key().to_string());
    assert_eq!(query["destination_asset_type"], "native");
    assert_eq!(query["destination_amount"], "10.0000000");
    assert!(!query.contains_key("destination_asset_code"));
}

#[tokio::test]
async fn test_find_paths_to_issued_asset() {
    let mock = MockHorizon::start().await;
    let ledger = mock.ledger();
    let source = Identity::generate();
    let issuer = Identity::generate().public_key().to_string();

    assert_ok!(
        ledger
            .find_paths(
                source.public_key(),
                AssetSpec::issued("LONGASSET", issuer.clone()),
                "2.5"
            )
            .await
    );

    let query = &mock.state.path_queries()[0];
    assert_eq!(query["destination_account"], source.public_key().to_string());
    assert_eq!(query["destination_asset_type"], "credit_alphanum12");
    assert_eq!(query["destination_asset_code"], "LONGASSET");
    assert_eq!(query["destination_asset_issuer"], issuer);
}

#[tokio::test]
async fn test_find_paths_rejects_bad_amount_locally() {
    let mock = MockHorizon::start().await;
    let ledger = mock.ledger();
    let source = Identity::generate();

    let err = assert_err!(
        ledger
            .find_paths(source.public_key(), AssetSpec::Native, "ten")
            .await
    );
    assert!(matches!(err, Error::InvalidOperationParameters(_)));
    assert!(mock.state.path_queries().is_empty());
}
