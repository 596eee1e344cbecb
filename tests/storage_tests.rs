//! LinkStore 集成测试（tempfile SQLite）

use std::sync::Arc;

use chrono::{Duration, Utc};
use tempfile::TempDir;

use linkloom::config::StorageConfig;
use linkloom::errors::LinkloomError;
use linkloom::storage::models::{FieldPatch, LinkPatch, NewLink, Plan};
use linkloom::storage::LinkStore;

async fn temp_store() -> (Arc<LinkStore>, TempDir) {
    let td = TempDir::new().unwrap();
    let path = td.path().join("storage_test.db");
    let config = StorageConfig {
        database_url: format!("sqlite://{}?mode=rwc", path.display()),
        ..Default::default()
    };
    let store = LinkStore::new(&config).await.unwrap();
    (Arc::new(store), td)
}

fn new_link(owner_id: &str, token: &str) -> NewLink {
    NewLink {
        id: uuid::Uuid::new_v4().to_string(),
        owner_id: owner_id.to_string(),
        token: token.to_string(),
        destination: "https://example.com".to_string(),
        title: None,
        description: None,
        created_at: Utc::now(),
        expires_at: None,
        max_clicks: None,
        is_active: true,
    }
}

#[tokio::test]
async fn test_insert_and_find_round_trip() {
    let (store, _td) = temp_store().await;
    store.ensure_owner("o-1").await.unwrap();

    let created = store.insert_link(&new_link("o-1", "aB3xY9z")).await.unwrap();
    assert_eq!(created.click_count, 0);
    assert!(created.is_active);

    let by_token = store.find_by_token("aB3xY9z").await.unwrap().unwrap();
    assert_eq!(by_token.id, created.id);

    let by_id = store.find_by_id(&created.id).await.unwrap().unwrap();
    assert_eq!(by_id.token, "aB3xY9z");

    assert!(store.find_by_token("zzzzzzz").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_token_is_conflict() {
    let (store, _td) = temp_store().await;
    store.ensure_owner("o-1").await.unwrap();

    store.insert_link(&new_link("o-1", "aB3xY9z")).await.unwrap();
    let err = store
        .insert_link(&new_link("o-1", "aB3xY9z"))
        .await
        .unwrap_err();
    assert!(matches!(err, LinkloomError::TokenConflict(_)));
}

#[tokio::test]
async fn test_patch_update_semantics() {
    let (store, _td) = temp_store().await;
    store.ensure_owner("o-1").await.unwrap();

    let mut link = new_link("o-1", "aB3xY9z");
    link.title = Some("原标题".to_string());
    link.expires_at = Some(Utc::now() + Duration::days(7));
    let created = store.insert_link(&link).await.unwrap();

    // Set destination + Clear expires_at，title 不动
    let patch = LinkPatch {
        destination: Some("https://example.org/new".to_string()),
        expires_at: FieldPatch::Clear,
        max_clicks: FieldPatch::Set(10),
        ..Default::default()
    };
    let updated = store.update_link(&created.id, &patch).await.unwrap();

    assert_eq!(updated.destination, "https://example.org/new");
    assert_eq!(updated.expires_at, None);
    assert_eq!(updated.max_clicks, Some(10));
    assert_eq!(updated.title, Some("原标题".to_string()));
    // token 和计数器不可变
    assert_eq!(updated.token, "aB3xY9z");
    assert_eq!(updated.click_count, 0);
}

#[tokio::test]
async fn test_update_missing_link_is_not_found() {
    let (store, _td) = temp_store().await;
    let patch = LinkPatch {
        is_active: Some(false),
        ..Default::default()
    };
    let err = store.update_link("no-such-id", &patch).await.unwrap_err();
    assert!(matches!(err, LinkloomError::NotFound(_)));
}

#[tokio::test]
async fn test_bulk_delete_is_scoped_to_owner() {
    let (store, _td) = temp_store().await;
    store.ensure_owner("o-1").await.unwrap();
    store.ensure_owner("o-2").await.unwrap();

    let mine = store.insert_link(&new_link("o-1", "aaaaaa1")).await.unwrap();
    let theirs = store.insert_link(&new_link("o-2", "bbbbbb2")).await.unwrap();

    let ids = vec![mine.id.clone(), theirs.id.clone()];
    let deleted = store.bulk_delete("o-1", &ids).await.unwrap();

    assert_eq!(deleted, 1);
    assert!(store.find_by_id(&mine.id).await.unwrap().is_none());
    // 别人的链接毫发无损
    assert!(store.find_by_id(&theirs.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_bulk_set_active() {
    let (store, _td) = temp_store().await;
    store.ensure_owner("o-1").await.unwrap();

    let a = store.insert_link(&new_link("o-1", "aaaaaa1")).await.unwrap();
    let b = store.insert_link(&new_link("o-1", "bbbbbb2")).await.unwrap();

    let affected = store
        .bulk_set_active("o-1", &[a.id.clone(), b.id.clone()], false)
        .await
        .unwrap();
    assert_eq!(affected, 2);

    assert!(!store.find_by_id(&a.id).await.unwrap().unwrap().is_active);
    assert!(!store.find_by_id(&b.id).await.unwrap().unwrap().is_active);
    assert_eq!(store.count_active_links("o-1").await.unwrap(), 0);
}

#[tokio::test]
async fn test_ensure_owner_is_idempotent_and_defaults_to_free() {
    let (store, _td) = temp_store().await;

    let first = store.ensure_owner("subject-42").await.unwrap();
    assert_eq!(first.plan, Plan::Free);
    assert_eq!(first.link_limit, 5);
    assert_eq!(first.active_link_count, 0);

    let second = store.ensure_owner("subject-42").await.unwrap();
    assert_eq!(second.created_at, first.created_at);
}

#[tokio::test]
async fn test_recompute_active_count_matches_store() {
    let (store, _td) = temp_store().await;
    store.ensure_owner("o-1").await.unwrap();

    store.insert_link(&new_link("o-1", "aaaaaa1")).await.unwrap();
    store.insert_link(&new_link("o-1", "bbbbbb2")).await.unwrap();
    // 计数器被人为推高，重算应当纠正
    store.increment_active_count("o-1").await.unwrap();
    store.increment_active_count("o-1").await.unwrap();
    store.increment_active_count("o-1").await.unwrap();

    let count = store.recompute_active_count("o-1").await.unwrap();
    assert_eq!(count, 2);
    assert_eq!(
        store.get_owner("o-1").await.unwrap().unwrap().active_link_count,
        2
    );
}

#[tokio::test]
async fn test_list_by_owner_newest_first() {
    let (store, _td) = temp_store().await;
    store.ensure_owner("o-1").await.unwrap();

    let mut older = new_link("o-1", "aaaaaa1");
    older.created_at = Utc::now() - Duration::hours(2);
    let mut newer = new_link("o-1", "bbbbbb2");
    newer.created_at = Utc::now();

    store.insert_link(&older).await.unwrap();
    store.insert_link(&newer).await.unwrap();

    let listed = store.list_by_owner("o-1").await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].token, "bbbbbb2");
    assert_eq!(listed[1].token, "aaaaaa1");
}
