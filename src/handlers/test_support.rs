// src/handlers/test_support.rs
//
// Roteador completo sobre o livro-razão em memória, para testes de rota.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use crate::{build_router, config::{AppState, Config}, db::memory_store::MemoryLedgerStore};

// Pool preguiçosa: as rotas testadas com isto só falam com o livro-razão em memória.
pub(crate) fn app(store: &MemoryLedgerStore) -> Router {
    let config = Config {
        database_url: "postgres://localhost/unused".into(),
        host: "127.0.0.1".into(),
        port: 0,
        db_max_connections: 1,
        db_acquire_timeout: std::time::Duration::from_millis(100),
        ledger_lock_timeout_ms: 100,
        app_env: "test".into(),
    };
    let pool = PgPoolOptions::new().connect_lazy(&config.database_url).unwrap();
    build_router(AppState::with_ledger_store(config, pool, Arc::new(store.clone())))
}

/// Envia a requisição e devolve status e corpo JSON (`Null` se vazio).
pub(crate) async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}
