//! End-to-end runs of the named-action protocol against a real store.

use serde_json::json;
use tempfile::tempdir;
use virtual_closet::domain::item::WardrobeItem;
use virtual_closet::domain::outfit::Outfit;
use virtual_closet::infrastructure::config::AppConfig;
use virtual_closet::{ActionRequest, Dispatcher};

async fn dispatcher(dir: &tempfile::TempDir) -> Dispatcher {
    let mut config = AppConfig {
        data_dir: Some(dir.path().to_path_buf()),
        ..AppConfig::default()
    };
    // Keep the failure-path test fast.
    config.http.max_retries = 1;
    config.http.timeout_seconds = 5;
    Dispatcher::from_config(&config)
        .await
        .expect("dispatcher builds")
}

fn request(value: serde_json::Value) -> ActionRequest {
    serde_json::from_value(value).expect("valid request")
}

fn save_item_request(title: &str, image: &str) -> ActionRequest {
    request(json!({
        "action": "saveItem",
        "product": {
            "title": title,
            "price": "",
            "brand": "",
            "description": "",
            "imageUrl": image,
            "url": "https://shop.example/p",
            "timestamp": "2026-01-15T10:00:00Z"
        }
    }))
}

#[tokio::test]
async fn deleting_by_added_at_removes_exactly_one_in_order() {
    let dir = tempdir().unwrap();
    let dispatcher = dispatcher(&dir).await;

    for title in ["first", "second", "third"] {
        let response = dispatcher
            .handle(save_item_request(title, "https://cdn.example/i.jpg"))
            .await;
        assert!(response.success, "save failed: {:?}", response.error);
    }

    let response = dispatcher.handle(request(json!({"action": "getWardrobe"}))).await;
    let items: Vec<WardrobeItem> = serde_json::from_value(response.data.unwrap()).unwrap();
    assert_eq!(items.len(), 3);

    let victim = items[1].added_at;
    let response = dispatcher
        .handle(request(json!({
            "action": "deleteItem",
            "addedAt": victim.to_rfc3339()
        })))
        .await;
    assert!(response.success);
    assert_eq!(response.data.unwrap()["removed"], true);

    let response = dispatcher.handle(request(json!({"action": "getWardrobe"}))).await;
    let remaining: Vec<WardrobeItem> = serde_json::from_value(response.data.unwrap()).unwrap();
    let titles: Vec<_> = remaining
        .iter()
        .map(|item| item.product.title.as_str())
        .collect();
    assert_eq!(titles, vec!["first", "third"]);
}

#[tokio::test]
async fn save_without_any_image_degrades_to_an_error_response() {
    let dir = tempdir().unwrap();
    let dispatcher = dispatcher(&dir).await;

    let response = dispatcher.handle(save_item_request("Socks", "")).await;
    assert!(!response.success);
    assert!(
        response
            .error
            .as_deref()
            .unwrap()
            .contains("could not detect product information")
    );

    // The failed save left no record behind.
    let response = dispatcher.handle(request(json!({"action": "getWardrobe"}))).await;
    let items: Vec<WardrobeItem> = serde_json::from_value(response.data.unwrap()).unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn outfit_compose_list_delete_round_trip() {
    let dir = tempdir().unwrap();
    let dispatcher = dispatcher(&dir).await;

    let saved = dispatcher
        .handle(save_item_request("Linen shirt", "https://cdn.example/s.jpg"))
        .await;
    let item: WardrobeItem = serde_json::from_value(saved.data.unwrap()).unwrap();

    let response = dispatcher
        .handle(request(json!({
            "action": "saveOutfit",
            "name": "Summer evening",
            "occasion": "casual",
            "items": { "tops": serde_json::to_value(&item).unwrap() }
        })))
        .await;
    assert!(response.success, "save outfit failed: {:?}", response.error);
    let outfit: Outfit = serde_json::from_value(response.data.unwrap()).unwrap();
    assert_eq!(outfit.name, "Summer evening");
    assert!(!outfit.is_ai_generated);

    let response = dispatcher.handle(request(json!({"action": "getOutfits"}))).await;
    let outfits: Vec<Outfit> = serde_json::from_value(response.data.unwrap()).unwrap();
    assert_eq!(outfits.len(), 1);

    let response = dispatcher
        .handle(request(json!({"action": "deleteOutfit", "id": outfit.id})))
        .await;
    assert!(response.success);

    let response = dispatcher.handle(request(json!({"action": "getOutfits"}))).await;
    let outfits: Vec<Outfit> = serde_json::from_value(response.data.unwrap()).unwrap();
    assert!(outfits.is_empty());
}

#[tokio::test]
async fn stale_collection_update_is_refused() {
    let dir = tempdir().unwrap();
    let dispatcher = dispatcher(&dir).await;

    let saved = dispatcher
        .handle(save_item_request("Tee", "https://cdn.example/t.jpg"))
        .await;
    let item = saved.data.unwrap();

    // Version is now 1; an update expecting 0 lost the race and must fail.
    let response = dispatcher
        .handle(request(json!({
            "action": "updateCollection",
            "collection": "wardrobe",
            "records": [item],
            "expectedVersion": 0
        })))
        .await;
    assert!(!response.success);
    assert!(response.error.as_deref().unwrap().contains("version conflict"));

    // The current version goes through.
    let response = dispatcher
        .handle(request(json!({
            "action": "updateCollection",
            "collection": "wardrobe",
            "records": [item],
            "expectedVersion": 1
        })))
        .await;
    assert!(response.success, "update failed: {:?}", response.error);
    assert_eq!(response.data.unwrap()["version"], 2);
}

#[tokio::test]
async fn unknown_collections_and_malformed_records_are_rejected() {
    let dir = tempdir().unwrap();
    let dispatcher = dispatcher(&dir).await;

    let response = dispatcher
        .handle(request(json!({
            "action": "updateCollection",
            "collection": "favorites",
            "records": []
        })))
        .await;
    assert!(!response.success);

    let response = dispatcher
        .handle(request(json!({
            "action": "updateCollection",
            "collection": "wardrobe",
            "records": [{"not": "an item"}]
        })))
        .await;
    assert!(!response.success);
}

#[tokio::test]
async fn scrape_of_unreachable_page_reports_error_not_panic() {
    let dir = tempdir().unwrap();
    let dispatcher = dispatcher(&dir).await;

    // The .invalid TLD never resolves, so the fetch fails fast and the
    // response carries the partial record with an error, per the degrade
    // policy.
    let response = dispatcher
        .handle(request(json!({
            "action": "scrapePage",
            "url": "http://closet-test.invalid/product"
        })))
        .await;
    assert!(response.success);
    let data = response.data.unwrap();
    assert!(
        data["error"]
            .as_str()
            .unwrap()
            .contains("failed to fetch page")
    );
    assert_eq!(data["url"], "http://closet-test.invalid/product");
}
