// src/handlers/system.rs

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{common::error::AppError, config::AppState, models::reports::ApiOverview};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    #[schema(example = "OK")]
    pub status: String,
    pub database: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub version: String,
    pub environment: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "System",
    responses(
        (status = 200, description = "Serviço e banco de dados no ar", body = HealthResponse),
        (status = 503, description = "Banco de dados indisponível", body = HealthResponse)
    )
)]
pub async fn health(State(app_state): State<AppState>) -> impl IntoResponse {
    let db_ok = match sqlx::query("SELECT 1").execute(&app_state.db_pool).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check: banco de dados indisponível");
            false
        }
    };

    let body = HealthResponse {
        status: if db_ok { "OK" } else { "ERROR" }.to_string(),
        database: if db_ok { "connected" } else { "disconnected" }.to_string(),
        timestamp: Utc::now(),
        uptime_seconds: app_state.started_at.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: app_state.config.app_env.clone(),
    };
    let status = if db_ok { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    (status, Json(body))
}

#[utoipa::path(
    get,
    path = "/api/info",
    tag = "System",
    responses((status = 200, description = "Descrição do serviço", body = ServiceInfo))
)]
pub async fn info() -> impl IntoResponse {
    let endpoints = [
        "/api/health",
        "/api/info",
        "/api/stats",
        "/api/products",
        "/api/transactions",
        "/api/machines",
        "/api/plannings",
        "/swagger-ui",
    ];

    Json(ServiceInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: "Controle de estoque com livro-razão de movimentações, máquinas e planejamento".to_string(),
        endpoints: endpoints.iter().map(|e| e.to_string()).collect(),
    })
}

#[utoipa::path(
    get,
    path = "/api/stats",
    tag = "System",
    responses((status = 200, description = "Visão geral", body = ApiOverview))
)]
pub async fn stats(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let overview = app_state.report_service.overview().await?;
    Ok((StatusCode::OK, Json(overview)))
}

// Qualquer rota desconhecida responde no mesmo formato de erro da API.
pub async fn route_not_found(uri: Uri) -> AppError {
    AppError::RouteNotFound(uri.path().to_string())
}

#[cfg(test)]
mod tests {
    use axum::http::{header, Method, Request};
    use axum::body::Body;
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        db::memory_store::MemoryLedgerStore,
        handlers::test_support::{app, send},
    };

    #[tokio::test]
    async fn unknown_route_returns_json_not_found() {
        let store = MemoryLedgerStore::new();

        let (status, body) = send(app(&store), Method::GET, "/api/nao-existe", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Rota não encontrada: /api/nao-existe");
    }

    #[tokio::test]
    async fn oversized_body_is_refused() {
        let store = MemoryLedgerStore::new();
        let reason = "x".repeat(11 * 1024 * 1024);
        let body = json!({ "productId": 1, "quantity": 1, "transactionType": "STOCK_IN", "reason": reason });

        let (status, _) = send(app(&store), Method::POST, "/api/transactions", Some(body)).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(store.transactions().await.is_empty());
    }

    #[tokio::test]
    async fn responses_are_gzipped_when_accepted() {
        let store = MemoryLedgerStore::new();

        let response = app(&store)
            .oneshot(
                Request::get("/api/transactions/types")
                    .header(header::ACCEPT_ENCODING, "gzip")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_ENCODING], "gzip");
    }
}
