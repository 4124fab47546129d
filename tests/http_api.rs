//! HTTP API：路由 + SQLite + 文件存储 + 事件总线

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tower::util::ServiceExt;
use uuid::Uuid;

use charsite::application::{ImageCleanupHandler, UnitOfWorkFactory};
use charsite::infrastructure::adapters::{FileImageStorage, FileImageStorageConfig};
use charsite::infrastructure::events::InProcessEventBus;
use charsite::infrastructure::http::{build_router, AppDependencies, AppState};
use charsite::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteChangeStore, SqliteCharacterRepository,
    SqliteImageRepository, SqlitePronounRepository,
};

const BASE_URL: &str = "http://charsite.test";

async fn setup() -> (Router, TempDir) {
    let dir = TempDir::new().unwrap();
    let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
    run_migrations(&pool).await.unwrap();

    let storage = Arc::new(
        FileImageStorage::new(FileImageStorageConfig {
            base_dir: dir.path().join("images"),
            public_base_url: BASE_URL.to_string(),
            signing_secret: "test-secret".to_string(),
        })
        .await
        .unwrap(),
    );

    let bus = Arc::new(InProcessEventBus::new(16));
    bus.subscribe(Arc::new(ImageCleanupHandler::new(storage.clone(), true)));

    let state = AppState::new(AppDependencies {
        character_repo: Arc::new(SqliteCharacterRepository::new(pool.clone())),
        pronoun_repo: Arc::new(SqlitePronounRepository::new(pool.clone())),
        image_repo: Arc::new(SqliteImageRepository::new(pool.clone())),
        image_storage: storage,
        unit_of_work: UnitOfWorkFactory::new(Arc::new(SqliteChangeStore::new(pool)), bus),
        upload_url_ttl: Duration::from_secs(300),
        max_upload_size: 1024 * 1024,
        shutdown: CancellationToken::new(),
    });

    (build_router(Arc::new(state)), dir)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn call(app: &Router, method: &str, uri: &str, user: Option<Uuid>, body: Option<Value>) -> Value {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user.to_string());
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let (status, bytes) = send(app, request).await;
    assert_eq!(status, StatusCode::OK, "unexpected status for {} {}", method, uri);
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_ping() {
    let (app, _dir) = setup().await;
    let res = call(&app, "GET", "/api/ping", None, None).await;
    assert_eq!(res["status"], "ok");
}

#[tokio::test]
async fn test_write_requires_user_header() {
    let (app, _dir) = setup().await;
    let res = call(
        &app,
        "POST",
        "/api/characters",
        None,
        Some(json!({ "name": "Aria" })),
    )
    .await;
    assert_eq!(res["errno"], 401);
}

#[tokio::test]
async fn test_character_and_pronoun_endpoints() {
    let (app, _dir) = setup().await;
    let user = Uuid::new_v4();

    let pronoun = call(
        &app,
        "POST",
        "/api/pronouns",
        Some(user),
        Some(json!({ "subject": "she", "object": "her", "possessive": "hers" })),
    )
    .await;
    assert_eq!(pronoun["errno"], 0);
    let pronoun_id = pronoun["data"]["id"].as_str().unwrap().to_string();

    let dup = call(
        &app,
        "POST",
        "/api/pronouns",
        Some(user),
        Some(json!({ "subject": "SHE", "object": "her", "possessive": "hers" })),
    )
    .await;
    assert_eq!(dup["code"], "Pronoun.AlreadyExists");

    let created = call(
        &app,
        "POST",
        "/api/characters",
        Some(user),
        Some(json!({ "name": "Aria", "pronoun_ids": [pronoun_id] })),
    )
    .await;
    assert_eq!(created["errno"], 0);
    let id = created["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["data"]["pronouns"][0]["subject"], "she");

    let invalid = call(
        &app,
        "POST",
        "/api/characters",
        Some(user),
        Some(json!({ "name": "   " })),
    )
    .await;
    assert_eq!(invalid["errno"], 400);
    assert_eq!(invalid["code"], "Character.Name.Invalid");

    let updated = call(
        &app,
        "PUT",
        &format!("/api/characters/{}", id),
        Some(user),
        Some(json!({
            "name": "Aria the Bold",
            "pronouns": [{ "subject": "they", "object": "them", "possessive": "theirs" }]
        })),
    )
    .await;
    assert_eq!(updated["data"]["name"], "Aria the Bold");
    assert_eq!(updated["data"]["pronouns"].as_array().unwrap().len(), 1);
    assert_eq!(updated["data"]["pronouns"][0]["subject"], "they");

    let listed = call(
        &app,
        "GET",
        &format!("/api/characters?created_by={}", user),
        None,
        None,
    )
    .await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);

    let pronouns = call(&app, "GET", "/api/pronouns", None, None).await;
    assert_eq!(pronouns["data"].as_array().unwrap().len(), 2);

    let deleted = call(
        &app,
        "DELETE",
        &format!("/api/characters/{}", id),
        Some(user),
        None,
    )
    .await;
    assert_eq!(deleted["errno"], 0);

    let missing = call(&app, "GET", &format!("/api/characters/{}", id), None, None).await;
    assert_eq!(missing["errno"], 404);
    assert_eq!(missing["code"], "Character.NotFound");
}

#[tokio::test]
async fn test_image_upload_flow() {
    let (app, _dir) = setup().await;
    let user = Uuid::new_v4();

    let created = call(
        &app,
        "POST",
        "/api/characters",
        Some(user),
        Some(json!({ "name": "Aria" })),
    )
    .await;
    let character_id = created["data"]["id"].as_str().unwrap().to_string();

    let added = call(
        &app,
        "POST",
        &format!("/api/characters/{}/images", character_id),
        Some(user),
        Some(json!({ "name": "portrait" })),
    )
    .await;
    assert_eq!(added["data"]["image"]["status"], "pending");
    let image_id = added["data"]["image"]["id"].as_str().unwrap().to_string();
    let upload_url = added["data"]["upload_url"].as_str().unwrap();
    let upload_path = upload_url.strip_prefix(BASE_URL).unwrap().to_string();

    // 篡改签名被拒绝
    let forged = upload_path.replace("signature=", "signature=0");
    let (_, bytes) = send(
        &app,
        Request::builder()
            .method("PUT")
            .uri(&forged)
            .header("content-type", "image/png")
            .body(Body::from("png bytes"))
            .unwrap(),
    )
    .await;
    let res: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(res["code"], "Storage.Image.InvalidToken");

    let (_, bytes) = send(
        &app,
        Request::builder()
            .method("PUT")
            .uri(&upload_path)
            .header("content-type", "image/png")
            .body(Body::from("png bytes"))
            .unwrap(),
    )
    .await;
    let res: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(res["errno"], 0);
    assert_eq!(res["data"]["size"], 9);

    let confirmed = call(
        &app,
        "POST",
        &format!("/api/characters/{}/images/{}/confirm", character_id, image_id),
        Some(user),
        None,
    )
    .await;
    assert_eq!(confirmed["data"]["image"]["status"], "completed");

    let url = call(
        &app,
        "GET",
        &format!("/api/characters/{}/images/{}/url", character_id, image_id),
        None,
        None,
    )
    .await;
    assert_eq!(
        url["data"]["url"],
        format!("{}/api/images/{}/content", BASE_URL, image_id)
    );

    let (status, content) = send(
        &app,
        Request::builder()
            .uri(format!("/api/images/{}/content", image_id))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content, b"png bytes");

    // 移除后存储对象被清理
    let removed = call(
        &app,
        "DELETE",
        &format!("/api/characters/{}/images/{}", character_id, image_id),
        Some(user),
        None,
    )
    .await;
    assert_eq!(removed["errno"], 0);

    let gone = call(
        &app,
        "GET",
        &format!("/api/images/{}/content", image_id),
        None,
        None,
    )
    .await;
    assert_eq!(gone["errno"], 404);
}
