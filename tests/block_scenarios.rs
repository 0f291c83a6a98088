//! Editor scenarios run against the public API with a private in-memory store.

use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{Method, Request, StatusCode};
use serde_json::{json, Value};
use site_builder_backend::blocks::{
    BlockContent, BlockRepository, BlockStyles, BlockType, OrderAssignment,
};
use site_builder_backend::db::{self, DbConfig};
use site_builder_backend::{create_app, AppState};
use std::net::SocketAddr;
use tower::ServiceExt;

async fn repository() -> BlockRepository {
    let pool = db::init_pool(Some(DbConfig::in_memory())).await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    BlockRepository::new(pool)
}

async fn append(repo: &BlockRepository, types: &[BlockType]) -> Vec<i64> {
    let mut ids = Vec::new();
    for block_type in types {
        ids.push(repo.append_default(*block_type).await.unwrap().id);
    }
    ids
}

async fn listing(repo: &BlockRepository) -> Vec<(i64, i64)> {
    repo.list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|b| (b.id, b.block_order))
        .collect()
}

#[tokio::test]
async fn reorder_puts_gallery_first() {
    let repo = repository().await;
    let ids = append(&repo, &[BlockType::Hero, BlockType::Text, BlockType::Gallery]).await;
    let (hero, text, gallery) = (ids[0], ids[1], ids[2]);

    repo.reorder_all(&[
        OrderAssignment { id: gallery, block_order: 0 },
        OrderAssignment { id: hero, block_order: 1 },
        OrderAssignment { id: text, block_order: 2 },
    ])
    .await
    .unwrap();

    let blocks = repo.list_all().await.unwrap();
    let types: Vec<BlockType> = blocks.iter().map(|b| b.block_type).collect();
    assert_eq!(types, [BlockType::Gallery, BlockType::Hero, BlockType::Text]);
    assert_eq!(listing(&repo).await, vec![(gallery, 0), (hero, 1), (text, 2)]);
}

#[tokio::test]
async fn delete_middle_then_reorder_restores_density() {
    let repo = repository().await;
    let ids = append(&repo, &[BlockType::Hero, BlockType::Text, BlockType::Contact]).await;

    repo.delete(ids[1]).await.unwrap();
    assert_eq!(listing(&repo).await, vec![(ids[0], 0), (ids[2], 2)]);

    repo.reorder_ids(&[ids[0], ids[2]]).await.unwrap();
    assert_eq!(listing(&repo).await, vec![(ids[0], 0), (ids[2], 1)]);
}

#[tokio::test]
async fn create_at_count_appears_last() {
    let repo = repository().await;
    append(&repo, &[BlockType::Hero, BlockType::Text]).await;

    let order = repo.count().await.unwrap();
    let id = repo
        .create(
            BlockType::Testimonials,
            order,
            BlockContent::default_for(BlockType::Testimonials),
            BlockStyles::default_for(BlockType::Testimonials),
        )
        .await
        .unwrap();

    let blocks = repo.list_all().await.unwrap();
    let last = blocks.last().unwrap();
    assert_eq!(last.id, id);
    assert_eq!(last.block_order, 2);
    assert_eq!(last.content, BlockContent::default_for(BlockType::Testimonials));
}

#[tokio::test]
async fn legacy_hero_migrates_once_through_the_api() {
    let pool = db::init_pool(Some(DbConfig::in_memory())).await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    sqlx::query("INSERT INTO blocks (block_type, block_order, content, styles) VALUES (?, ?, ?, ?)")
        .bind("hero")
        .bind(0_i64)
        .bind(r#"{"title":"Fresh Bread","subtitle":"Since 1952","description":"Baked daily"}"#)
        .bind("{}")
        .execute(&pool)
        .await
        .unwrap();

    let app = create_app(AppState::new(pool.clone()))
        .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 9000))));

    let mut seen = Vec::new();
    for _ in 0..2 {
        let res = app
            .clone()
            .oneshot(Request::get("/api/blocks").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        seen.push(body["blocks"][0]["content"]["textBoxes"].clone());
    }

    assert_eq!(seen[0], seen[1]);
    let boxes = seen[0].as_array().unwrap();
    assert_eq!(boxes.len(), 3);
    assert_eq!(boxes[0]["text"], json!("Since 1952"));
    assert_eq!(boxes[1]["text"], json!("Fresh Bread"));
    assert_eq!(boxes[2]["text"], json!("Baked daily"));

    let stored: String = sqlx::query_scalar("SELECT content FROM blocks")
        .fetch_one(&pool)
        .await
        .unwrap();
    let stored: Value = serde_json::from_str(&stored).unwrap();
    assert_eq!(stored["textBoxes"], seen[0]);
}

#[tokio::test]
async fn editor_session_over_http() {
    let pool = db::init_pool(Some(DbConfig::in_memory())).await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    let app = create_app(AppState::new(pool))
        .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 9000))));

    let call = |method: Method, uri: String, body: Option<Value>| {
        let app = app.clone();
        async move {
            let body = body
                .map(|b| Body::from(serde_json::to_vec(&b).unwrap()))
                .unwrap_or_else(Body::empty);
            let req = Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(body)
                .unwrap();
            let res = app.oneshot(req).await.unwrap();
            let status = res.status();
            let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
            let value: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, value)
        }
    };

    let mut ids = Vec::new();
    for block_type in ["hero", "text", "spacer"] {
        let (status, block) = call(
            Method::POST,
            "/api/blocks".to_string(),
            Some(json!({ "block_type": block_type })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        ids.push(block["id"].as_i64().unwrap());
    }

    let (status, _) = call(Method::DELETE, format!("/api/blocks/{}", ids[1]), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, list) = call(
        Method::POST,
        format!("/api/blocks/{}/move", ids[2]),
        Some(json!({ "direction": "up" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let order: Vec<i64> = list["blocks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_i64().unwrap())
        .collect();
    assert_eq!(order, vec![ids[2], ids[0]]);
    assert_eq!(list["blocks"][1]["block_order"], json!(1));

    let (status, _) = call(Method::GET, format!("/api/blocks/{}", ids[1]), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, visit) = call(
        Method::POST,
        "/api/analytics/visit".to_string(),
        Some(json!({ "page": "/" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(visit["session_id"].is_string());

    let (status, summary) = call(Method::GET, "/api/analytics/summary".to_string(), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_visits"], json!(1));

    let (status, ready) = call(Method::GET, "/health/ready".to_string(), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ready["status"], json!("ready"));
}
