//src/main.rs

use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;

// Limite do corpo das requisições JSON
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

// Monta as rotas. Separado do main para os testes usarem o mesmo Router.
pub(crate) fn build_router(app_state: AppState) -> Router {
    let product_routes = Router::new()
        .route("/"
               , get(handlers::products::list_products)
               .post(handlers::products::create_product)
        )
        .route("/categories", get(handlers::products::list_categories))
        .route("/low-stock", get(handlers::products::list_low_stock))
        .route("/statistics", get(handlers::products::product_statistics))
        .route("/barcode/{barcode}", get(handlers::products::get_product_by_barcode))
        .route("/{id}"
               , get(handlers::products::get_product)
               .put(handlers::products::update_product)
               .delete(handlers::products::delete_product)
        );

    let transaction_routes = Router::new()
        .route("/"
               , get(handlers::transactions::list_transactions)
               .post(handlers::transactions::create_transaction)
        )
        .route("/types", get(handlers::transactions::list_transaction_types))
        .route("/statistics", get(handlers::transactions::transaction_statistics))
        .route("/daily-summary", get(handlers::transactions::daily_summary))
        .route("/product/{product_id}", get(handlers::transactions::list_product_transactions))
        .route("/{id}", get(handlers::transactions::get_transaction));

    let machine_routes = Router::new()
        .route("/"
               , get(handlers::machines::list_machines)
               .post(handlers::machines::create_machine)
        )
        .route("/stats", get(handlers::machines::machine_statistics))
        .route("/{id}"
               , get(handlers::machines::get_machine)
               .put(handlers::machines::update_machine)
               .delete(handlers::machines::delete_machine)
        );

    let planning_routes = Router::new()
        .route("/"
               , get(handlers::plannings::list_plannings)
               .post(handlers::plannings::create_planning)
        )
        .route("/stats", get(handlers::plannings::planning_statistics))
        .route("/categories", get(handlers::plannings::list_planning_categories))
        .route("/{id}"
               , get(handlers::plannings::get_planning)
               .put(handlers::plannings::update_planning)
               .delete(handlers::plannings::delete_planning)
        );

    Router::new()
        .route("/api/health", get(handlers::system::health))
        .route("/api/info", get(handlers::system::info))
        .route("/api/stats", get(handlers::system::stats))
        .nest("/api/products", product_routes)
        .nest("/api/transactions", transaction_routes)
        .nest("/api/machines", machine_routes)
        .nest("/api/plannings", planning_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(handlers::system::route_not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let app_state = AppState::new().await?;

    // Aplica as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let addr = app_state.config.bind_addr();
    let app = build_router(app_state);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Servidor encerrado");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Falha ao escutar o Ctrl+C: {}", e);
    }
}
