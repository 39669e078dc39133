//! Integration tests for planning and applying patches against SQLite.

mod common;

use common::{TestDb, fixture, names};
use pretty_assertions::assert_eq;
use tdp::prelude::*;

#[tokio::test]
async fn test_plan_on_fresh_database() {
    let db = TestDb::new();
    let engine = db.engine(&["pack-1", "pack-2"]).await;

    let plan = engine.plan().await.unwrap();

    // README.md and the hidden .draft.sql are not patches.
    assert_eq!(
        names(&plan),
        vec!["001-initial-schema.sql", "002-minor-changes.sql", "views.sql"]
    );
}

#[tokio::test]
async fn test_upgrade_creates_schema() {
    let db = TestDb::new();
    let engine = db.engine(&["pack-1"]).await;

    let report = engine.upgrade().await.unwrap();

    assert_eq!(report.applied, vec!["001-initial-schema.sql", "views.sql"]);
    assert!(engine.store().table_exists("thing").await.unwrap());
    assert!(engine.store().table_exists("weird_thing").await.unwrap());
    assert!(!engine.store().table_exists("draft").await.unwrap());
    assert!(engine.plan().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upgrade_is_idempotent() {
    let db = TestDb::new();
    db.upgrade(&["pack-1"]).await;

    let engine = db.engine(&["pack-1"]).await;
    let report = engine.upgrade().await.unwrap();

    assert!(!report.has_changes());
    engine.validate_compatible().await.unwrap();
}

#[tokio::test]
async fn test_upgrade_permanent() {
    let db = TestDb::new();
    db.upgrade(&["pack-1"]).await;

    let engine = db.engine(&["pack-1", "pack-2"]).await;
    assert_eq!(
        names(&engine.plan().await.unwrap()),
        vec!["002-minor-changes.sql"]
    );

    engine.upgrade().await.unwrap();

    assert_eq!(
        engine.store().columns("thing").await.unwrap(),
        vec!["id", "name", "description"]
    );
    engine.validate_compatible().await.unwrap();
}

#[tokio::test]
async fn test_upgrade_volatile() {
    let db = TestDb::new();
    db.upgrade(&["pack-1", "pack-2"]).await;

    let engine = db
        .engine(&["pack-1/001-initial-schema.sql", "pack-2", "pack-5/views.sql"])
        .await;
    assert_eq!(names(&engine.plan().await.unwrap()), vec!["views.sql"]);

    engine.upgrade().await.unwrap();

    assert_eq!(
        engine.store().columns("weird_thing").await.unwrap(),
        vec!["id", "name", "description"]
    );
    assert!(engine.plan().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_incompatible_upgrade() {
    let db = TestDb::new();
    db.upgrade(&["pack-1"]).await;

    let engine = db.engine(&["pack-4"]).await;

    match engine.plan().await {
        Err(PatchError::Mismatch { patch, .. }) => {
            assert_eq!(patch.name(), "001-initial-schema.sql");
        }
        other => panic!("expected mismatch, got {other:?}"),
    }
    let err = engine.upgrade().await.unwrap_err();
    assert!(err.is_consistency_violation());
    assert_eq!(
        err.to_string(),
        "Applied patch doesn't match configuration: 001-initial-schema.sql"
    );
}

#[tokio::test]
async fn test_broken_patch_stops_upgrade() {
    let db = TestDb::new();
    db.upgrade(&["pack-1", "pack-2"]).await;

    let engine = db
        .engine(&["pack-1/001-initial-schema.sql", "pack-2", "pack-5"])
        .await;
    let views_before = engine.store().signature_of("views.sql").await.unwrap();

    let err = engine.upgrade().await.unwrap_err();

    match &err {
        PatchError::ApplyFailed { patch, .. } => {
            assert!(patch.ends_with("003-broken.sql"), "{patch}");
        }
        other => panic!("expected apply failure, got {other:?}"),
    }
    assert!(!err.is_consistency_violation());

    // The failing patch left nothing behind, and later patches did not run.
    assert!(!engine.store().table_exists("broken").await.unwrap());
    assert_eq!(engine.store().signature_of("003-broken.sql").await.unwrap(), None);
    assert_eq!(
        engine.store().signature_of("views.sql").await.unwrap(),
        views_before
    );
}

#[tokio::test]
async fn test_overlapping_packs() {
    let set = PatchSet::from_paths([fixture("pack-1"), fixture("pack-3")])
        .await
        .unwrap();
    assert_eq!(set.len(), 2);

    let result = PatchSet::from_paths([fixture("pack-1"), fixture("pack-4")]).await;
    match result {
        Err(PatchError::Contradiction {
            existing,
            conflicting,
        }) => {
            assert_eq!(existing.name(), "001-initial-schema.sql");
            assert!(existing.path().unwrap().starts_with(fixture("pack-1")));
            assert!(conflicting.path().unwrap().starts_with(fixture("pack-4")));
        }
        other => panic!("expected contradiction, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_source() {
    let result = PatchSet::from_paths([fixture("pack-404")]).await;
    assert!(matches!(result, Err(PatchError::Io(_))));
}
