//! Integration tests for registering patches without running them.

mod common;

use common::TestDb;
use pretty_assertions::assert_eq;
use tdp::prelude::*;

#[tokio::test]
async fn test_retrofit_existing_schema() {
    let db = TestDb::new();
    // Schema created outside of tdp.
    db.store()
        .await
        .execute("CREATE TABLE thing (id INTEGER PRIMARY KEY, name TEXT NOT NULL);")
        .await
        .unwrap();

    let engine = db.engine(&["pack-1"]).await;
    assert_eq!(engine.retrofit().await.unwrap(), 2);

    engine.validate_compatible().await.unwrap();
    assert!(engine.plan().await.unwrap().is_empty());
    // Nothing was executed, so the view does not exist.
    assert!(!engine.store().table_exists("weird_thing").await.unwrap());
}

#[tokio::test]
async fn test_retrofit_replaces_records() {
    let db = TestDb::new();
    db.upgrade(&["pack-1", "pack-2"]).await;

    let engine = db.engine(&["pack-6"]).await;
    assert!(engine.validate_upgradable().await.is_err());

    assert_eq!(engine.retrofit().await.unwrap(), 1);

    let applied = engine.store().applied_patches().await.unwrap();
    assert_eq!(
        applied.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["002-some-stuff.sql"]
    );
    engine.validate_compatible().await.unwrap();
}
