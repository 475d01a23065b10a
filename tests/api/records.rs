use std::collections::HashSet;
use std::fs;
use std::sync::Arc;

use minifig_catalog::record::ID_LEN;
use minifig_catalog::store::FileStore;
use minifig_catalog::{ApiError, RecordApi};
use serde_json::json;
use tempfile::TempDir;

use crate::support::{memory_api, UnavailableStore};

#[tokio::test]
async fn create_generates_unique_ids_and_prepends() {
    let api = memory_api();

    let mut ids = HashSet::new();
    for i in 0..20 {
        let created = api
            .create(json!({ "name": format!("Set {i}"), "manufacturer": "Airfix" }))
            .await
            .unwrap();
        assert_eq!(created.id.len(), ID_LEN);
        assert!(ids.insert(created.id));
    }

    let records = api.list().await.unwrap();
    assert_eq!(records.len(), 20);
    assert_eq!(records[0].name, "Set 19");
}

#[tokio::test]
async fn create_requires_name_and_manufacturer() {
    let api = memory_api();

    let err = api.create(json!({ "name": "Tiger I" })).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(ref m) if m.contains("manufacturer")));

    let err = api
        .create(json!({ "name": "  ", "manufacturer": "Tamiya" }))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(ref m) if m.contains("name")));

    assert!(api.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_rejects_duplicate_supplied_id() {
    let api = memory_api();
    api.create(json!({ "id": "tiger1", "name": "Tiger I", "manufacturer": "Tamiya" }))
        .await
        .unwrap();

    let err = api
        .create(json!({ "id": "tiger1", "name": "Tiger II", "manufacturer": "Tamiya" }))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert_eq!(api.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_merges_and_keeps_id_and_sub_items() {
    let api = memory_api();
    let created = api
        .create(json!({
            "name": "Tiger I",
            "manufacturer": "Tamiya",
            "figures": [{ "name": "Commander", "img": "01.jpg" }]
        }))
        .await
        .unwrap();

    let updated = api
        .update(&created.id, json!({ "id": "hijack", "scale": "1/35" }))
        .await
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.scale, "1/35");
    assert_eq!(updated.name, "Tiger I");
    assert_eq!(updated.sub_items, created.sub_items);
    assert_eq!(api.get(&created.id).await.unwrap(), updated);
}

#[tokio::test]
async fn update_can_replace_sub_items() {
    let api = memory_api();
    let created = api
        .create(json!({
            "name": "Tiger I",
            "manufacturer": "Tamiya",
            "figures": [{ "name": "Commander", "img": "01.jpg" }]
        }))
        .await
        .unwrap();

    let updated = api
        .update(
            &created.id,
            json!({ "subItems": [{ "name": "Driver", "image": "02.jpg" }] }),
        )
        .await
        .unwrap();

    assert_eq!(updated.sub_items.len(), 1);
    assert_eq!(updated.sub_items[0].name, "Driver");
    assert_eq!(updated.sub_items[0].image, "02.jpg");
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
    let api = memory_api();
    let err = api.update("nope", json!({ "name": "x" })).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn upsert_appends_unknown_id() {
    let api = memory_api();
    api.create(json!({ "name": "Tiger I", "manufacturer": "Tamiya" }))
        .await
        .unwrap();

    let saved = api
        .upsert("new1", json!({ "name": "Sherman", "manufacturer": "Airfix" }))
        .await
        .unwrap();

    let records = api.list().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1], saved);
    assert_eq!(saved.id, "new1");
}

#[tokio::test]
async fn delete_removes_exactly_one() {
    let api = memory_api();
    let a = api
        .create(json!({ "name": "Tiger I", "manufacturer": "Tamiya" }))
        .await
        .unwrap();
    let b = api
        .create(json!({ "name": "Sherman", "manufacturer": "Airfix" }))
        .await
        .unwrap();

    let removed = api.delete(&a.id).await.unwrap();
    assert_eq!(removed.id, a.id);

    let records = api.list().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, b.id);

    assert!(matches!(api.delete(&a.id).await, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn delete_removes_asset_folder() {
    let dir = TempDir::new().unwrap();
    let assets = dir.path().join("images");
    fs::create_dir_all(assets.join("tiger")).unwrap();
    fs::write(assets.join("tiger").join("00.jpg"), b"img").unwrap();
    let api = RecordApi::new(Arc::new(
        FileStore::new(dir.path().join("data")).with_assets(&assets),
    ));

    let created = api
        .create(json!({ "name": "Tiger I", "manufacturer": "Tamiya", "folder": "tiger" }))
        .await
        .unwrap();
    api.delete(&created.id).await.unwrap();

    assert!(!assets.join("tiger").exists());
}

#[tokio::test]
async fn replace_all_is_trusted_as_sent() {
    let api = memory_api();
    api.create(json!({ "name": "Tiger I", "manufacturer": "Tamiya" }))
        .await
        .unwrap();

    let mut records = api.list().await.unwrap();
    records[0].name = "Tiger I (late)".into();
    records.push(minifig_catalog::Record::blank("bare"));
    api.replace_all(records.clone()).await.unwrap();

    assert_eq!(api.list().await.unwrap(), records);
}

#[tokio::test]
async fn store_failures_surface_as_server_errors() {
    let api = RecordApi::new(Arc::new(UnavailableStore));

    let err = api.list().await.unwrap_err();
    assert!(matches!(err, ApiError::Store(_)));
    assert_eq!(err.status_code(), 500);

    let err = api.replace_all(Vec::new()).await.unwrap_err();
    assert_eq!(err.status_code(), 500);
}
