#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    Router,
};
use order_management_api::{
    config::AppConfig,
    db::{self, DbConfig, DbPool},
    entities::{client, order, order_item, product},
    repositories::{
        ClientRepository, NewProduct, OrderItemRepository, OrderRepository, ProductRepository,
    },
    services::orders::OrderService,
    AppState,
};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::Value;
use tower::ServiceExt;

/// Helper harness for spinning up the application backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        Self::with_db_config(DbConfig::in_memory_sqlite()).await
    }

    /// Application over a SQLite file at `path` with a pool of
    /// `max_connections`, so transactions run on separate connections.
    pub async fn file_backed(path: &Path, max_connections: u32) -> Self {
        Self::with_db_config(DbConfig {
            url: format!("sqlite://{}?mode=rwc", path.display()),
            max_connections,
            min_connections: 1,
            ..Default::default()
        })
        .await
    }

    async fn with_db_config(db_config: DbConfig) -> Self {
        let pool = db::establish_connection_with_config(&db_config)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let cfg = AppConfig::new(
            db_config.url.clone(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );

        let state = AppState::new(Arc::new(pool), cfg);
        let router = order_management_api::app_router(state.clone());

        Self { router, state }
    }

    pub fn db(&self) -> &DbPool {
        &self.state.db
    }

    pub fn order_service(&self) -> Arc<OrderService> {
        self.state.services.order.clone()
    }

    /// Send a request against the router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        self.request_with_headers(method, uri, body, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// POST raw bytes with a JSON content type
    pub async fn post_raw(&self, uri: &str, raw: &'static str) -> axum::response::Response {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(raw))
            .expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn seed_client(&self, name: &str) -> client::Model {
        ClientRepository::new(self.db())
            .create(name, Some("10 Lenina St, apt. 5".to_string()))
            .await
            .expect("seed client")
    }

    pub async fn seed_order(&self, client_id: i32) -> order::Model {
        OrderRepository::new(self.db())
            .create(client_id, None)
            .await
            .expect("seed order")
    }

    pub async fn seed_product(&self, name: &str, quantity: i32, price: Decimal) -> product::Model {
        ProductRepository::new(self.db())
            .create(NewProduct {
                name: name.to_string(),
                quantity,
                price,
                category_id: None,
            })
            .await
            .expect("seed product")
    }

    /// Client + empty order, returning the order
    pub async fn seed_empty_order(&self) -> order::Model {
        let client = self.seed_client("Ivan Petrov").await;
        self.seed_order(client.id).await
    }

    pub async fn product_stock(&self, product_id: i32) -> i32 {
        product::Entity::find_by_id(product_id)
            .one(self.db())
            .await
            .expect("load product")
            .expect("product exists")
            .quantity
    }

    pub async fn order_total(&self, order_id: i32) -> Decimal {
        order::Entity::find_by_id(order_id)
            .one(self.db())
            .await
            .expect("load order")
            .expect("order exists")
            .total_amount
    }

    pub async fn line_count(&self, order_id: i32, product_id: i32) -> u64 {
        order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .filter(order_item::Column::ProductId.eq(product_id))
            .count(self.db())
            .await
            .expect("count order items")
    }

    pub async fn order_items(&self, order_id: i32) -> Vec<order_item::Model> {
        OrderItemRepository::new(self.db())
            .find_by_order(order_id)
            .await
            .expect("load order items")
    }
}

pub async fn response_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&body).expect("response body is json")
}
