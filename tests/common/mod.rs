//! Shared test utilities for integration tests.
//!
//! `TestClient` drives the router against an in-memory database. Seeding goes
//! straight through the query layer since the service itself is read-only.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use http_body_util::BodyExt;
use rentwise::config::Config;
use rentwise::db::queries::{categories, properties, transactions};
use rentwise::db::{create_in_memory_pool, migrations};
use rentwise::models::{NewProperty, NewTransaction, TransactionType};
use rentwise::server;
use rentwise::state::AppState;
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tower::ServiceExt;

pub struct TestClient {
    state: AppState,
}

impl TestClient {
    /// Fresh in-memory database with migrations applied.
    pub fn new() -> Self {
        let pool = create_in_memory_pool().expect("Failed to create in-memory pool");
        {
            let mut conn = pool.get().expect("Failed to get connection");
            migrations::run_migrations(&mut conn, Path::new("migrations"))
                .expect("Failed to run migrations");
        }

        let config = Config {
            host: "127.0.0.1".into(),
            database_path: PathBuf::from(":memory:"),
            ..Config::default()
        };

        Self {
            state: AppState::new(pool, config),
        }
    }

    pub fn router(&self) -> Router {
        server::router(self.state.clone())
    }

    /// Make a GET request and return status and body.
    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        let response = self
            .router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&body).to_string())
    }

    /// GET an endpoint and parse the body as JSON.
    pub async fn get_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, body) = self.get(uri).await;
        let parsed = serde_json::from_str(&body)
            .unwrap_or_else(|e| panic!("invalid JSON from {}: {} ({})", uri, e, body));
        (status, parsed)
    }

    // =========================================================================
    // Seeding helpers
    // =========================================================================

    pub fn create_property(&self, name: &str, purchase_price: Option<Decimal>) -> i64 {
        self.create_valued_property(name, purchase_price, None)
    }

    pub fn create_valued_property(
        &self,
        name: &str,
        purchase_price: Option<Decimal>,
        current_value: Option<Decimal>,
    ) -> i64 {
        let conn = self.state.db.get().unwrap();
        properties::create_property(
            &conn,
            &NewProperty {
                name: name.into(),
                purchase_price,
                current_value,
                acquisition_date: None,
            },
        )
        .unwrap()
    }

    pub fn category(&self, name: &str) -> i64 {
        let conn = self.state.db.get().unwrap();
        categories::ensure_category(&conn, name).unwrap()
    }

    pub fn income(&self, date: &str, amount: Decimal, property_id: Option<i64>) -> i64 {
        self.create_transaction(TxSeed {
            date,
            kind: TransactionType::Income,
            amount,
            property_id,
            ..TxSeed::default()
        })
    }

    pub fn expense(&self, date: &str, amount: Decimal, property_id: Option<i64>) -> i64 {
        self.create_transaction(TxSeed {
            date,
            kind: TransactionType::Expense,
            amount,
            property_id,
            ..TxSeed::default()
        })
    }

    pub fn create_transaction(&self, seed: TxSeed<'_>) -> i64 {
        let category_id = seed.category.map(|name| self.category(name));
        let conn = self.state.db.get().unwrap();
        transactions::create_transaction(
            &conn,
            &NewTransaction {
                date: NaiveDate::parse_from_str(seed.date, "%Y-%m-%d").unwrap(),
                kind: seed.kind,
                amount: seed.amount,
                description: seed.description.to_string(),
                property_id: seed.property_id,
                category_id,
                recurring: seed.recurring,
            },
        )
        .unwrap()
    }

    /// Raw SQL for rows the typed helpers refuse to write.
    pub fn execute(&self, sql: &str) {
        self.state.db.get().unwrap().execute_batch(sql).unwrap();
    }
}

pub struct TxSeed<'a> {
    pub date: &'a str,
    pub kind: TransactionType,
    pub amount: Decimal,
    pub description: &'a str,
    pub property_id: Option<i64>,
    pub category: Option<&'a str>,
    pub recurring: bool,
}

impl Default for TxSeed<'_> {
    fn default() -> Self {
        Self {
            date: "2025-01-01",
            kind: TransactionType::Expense,
            amount: Decimal::ZERO,
            description: "",
            property_id: None,
            category: None,
            recurring: false,
        }
    }
}
