#![cfg(feature = "web")]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use interactive_grid::app::{self, AppState};
use interactive_grid::error::StoreError;
use interactive_grid::store::{GridStore, TableStore};
use interactive_grid::view::ActiveColor;
use interactive_grid::{Cell, CellRecord};
use serde_json::{Value, json};
use tower::ServiceExt;

struct BrokenStore;

impl GridStore for BrokenStore {
    fn list_all(&self) -> Result<Vec<CellRecord>, StoreError> {
        Err(StoreError::Io(std::io::Error::other("disk on fire")))
    }

    fn upsert(&self, _cell: &Cell) -> Result<CellRecord, StoreError> {
        Err(StoreError::Poisoned)
    }

    fn reset_all(&self) -> Result<(), StoreError> {
        Err(StoreError::Poisoned)
    }
}

fn setup(store: Arc<dyn GridStore>) -> Router {
    app::router(AppState::new(store, 10, ActiveColor::default()))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn post_raw(app: &Router, content_type: Option<&str>, body: &str) -> (StatusCode, Value) {
    let mut request = Request::builder().method("POST").uri("/api/update");
    if let Some(content_type) = content_type {
        request = request.header("content-type", content_type);
    }
    let response = app
        .clone()
        .oneshot(request.body(Body::from(body.to_owned())).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_empty_store_lists_nothing() {
    let app = setup(Arc::new(TableStore::in_memory()));
    let (status, body) = call(&app, "GET", "/api/cells", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_update_echoes_body_and_persists() {
    let store = Arc::new(TableStore::in_memory());
    let app = setup(store.clone());
    let update = json!({"row": 3, "column": 4, "isActive": true, "activationOrder": 1});

    let (status, body) = call(&app, "POST", "/api/update", Some(update.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, update);

    let (_, cells) = call(&app, "GET", "/api/cells", None).await;
    assert_eq!(
        cells,
        json!([{"id": 1, "row": 3, "column": 4, "isActive": true, "activationOrder": 1}])
    );
    assert_eq!(store.list_all().unwrap()[0].cell(), Cell::active(3, 4, 1));
}

#[tokio::test]
async fn test_update_without_order_echoes_without_order() {
    let app = setup(Arc::new(TableStore::in_memory()));
    let update = json!({"row": 0, "column": 0, "isActive": true});

    let (status, body) = call(&app, "POST", "/api/update", Some(update.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, update);

    let (_, cells) = call(&app, "GET", "/api/cells", None).await;
    assert_eq!(cells[0]["activationOrder"], json!(0));
}

#[tokio::test]
async fn test_repeated_update_leaves_store_unchanged() {
    let store = Arc::new(TableStore::in_memory());
    let app = setup(store.clone());
    let update = json!({"row": 2, "column": 7, "isActive": true, "activationOrder": 4});

    call(&app, "POST", "/api/update", Some(update.clone())).await;
    let before = store.list_all().unwrap();
    call(&app, "POST", "/api/update", Some(update)).await;

    assert_eq!(store.list_all().unwrap(), before);
}

#[tokio::test]
async fn test_out_of_bounds_update_is_rejected() {
    let store = Arc::new(TableStore::in_memory());
    let app = setup(store.clone());
    let update = json!({"row": 10, "column": 0, "isActive": true});

    let (status, body) = call(&app, "POST", "/api/update", Some(update)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("outside"));
    assert!(store.list_all().unwrap().is_empty());
}

#[tokio::test]
async fn test_reset_clears_all_cells() {
    let store = Arc::new(TableStore::in_memory());
    store.upsert(&Cell::active(0, 0, 1)).unwrap();
    store.upsert(&Cell::active(5, 5, 2)).unwrap();
    let app = setup(store.clone());

    let (status, body) = call(&app, "POST", "/api/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Cells reset successfully"}));
    assert!(
        store
            .list_all()
            .unwrap()
            .iter()
            .all(|r| !r.is_active && r.activation_order == 0)
    );
}

#[tokio::test]
async fn test_wrong_methods_are_rejected() {
    let app = setup(Arc::new(TableStore::in_memory()));

    for (method, uri) in [
        ("GET", "/api/update"),
        ("PUT", "/api/update"),
        ("GET", "/api/reset"),
        ("DELETE", "/api/cells"),
        ("POST", "/api/cells"),
    ] {
        let (status, body) = call(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
        assert_eq!(body, json!({"message": "Method Not Allowed"}));
    }
}

#[tokio::test]
async fn test_store_failures_become_500() {
    let app = setup(Arc::new(BrokenStore));

    let (status, body) = call(&app, "GET", "/api/cells", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"message": "storage io failed: disk on fire"}));

    let update = json!({"row": 1, "column": 1, "isActive": true});
    let (status, body) = call(&app, "POST", "/api/update", Some(update)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].is_string());

    let (status, _) = call(&app, "POST", "/api/reset", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_index_page_renders_grid() {
    let store = Arc::new(TableStore::in_memory());
    store.upsert(&Cell::active(3, 4, 1)).unwrap();
    let app = setup(store);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let page = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(page.matches("role=\"button\"").count(), 100);
    assert!(page.contains("cell active"));
}

#[tokio::test]
async fn test_malformed_update_bodies_get_message_replies() {
    let store = Arc::new(TableStore::in_memory());
    let app = setup(store.clone());

    let (status, body) = post_raw(&app, Some("application/json"), "{\"row\": 1,").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));

    let (status, body) = post_raw(&app, Some("application/json"), r#"{"row": 1}"#).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["message"].is_string());

    let (status, body) = post_raw(&app, None, r#"{"row": 1, "column": 1, "isActive": true}"#).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body["message"].is_string());

    assert!(store.list_all().unwrap().is_empty());
}
