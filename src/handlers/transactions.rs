// src/handlers/transactions.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::{
    common::{
        error::AppError,
        pagination::{PageRequest, SortOrder},
    },
    config::AppState,
    models::{
        reports::{DailySummary, TransactionStatistics},
        transaction::{
            ApplyTransaction, LedgerEntry, TransactionDetail, TransactionFilter, TransactionKind,
            TransactionKindInfo, TransactionSortField,
        },
    },
    services::{report_service::date_range_bounds, TransactionService},
};

const DEFAULT_PAGE_SIZE: u32 = 20;

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("O motivo é obrigatório.".into());
        return Err(err);
    }
    Ok(())
}

// Aceita "STOCK_OUT" e também os códigos numéricos antigos (0, 1, 2), como texto ou número.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum KindInput {
    Code(i64),
    Name(String),
}

impl KindInput {
    fn parse(&self) -> Result<TransactionKind, AppError> {
        match self {
            KindInput::Code(code) => code.to_string().parse(),
            KindInput::Name(name) => name.parse(),
        }
    }
}

// ---
// Payload: CreateTransaction
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionPayload {
    #[validate(range(min = 1, message = "O campo 'productId' deve ser um ID válido."))]
    #[schema(example = 1)]
    pub product_id: i32,

    // STOCK_IN/STOCK_OUT: quantidade movimentada. ADJUSTMENT: saldo final desejado.
    #[schema(example = 3)]
    pub quantity: i32,

    #[schema(value_type = String, example = "STOCK_OUT")]
    pub transaction_type: KindInput,

    #[validate(
        length(max = 200, message = "O motivo pode ter no máximo 200 caracteres."),
        custom(function = "validate_not_blank")
    )]
    #[schema(example = "sale")]
    pub reason: String,

    #[validate(length(max = 1000, message = "As notas podem ter no máximo 1000 caracteres."))]
    pub notes: Option<String>,

    pub occurred_at: Option<DateTime<Utc>>,

    #[validate(length(max = 100, message = "O autor pode ter no máximo 100 caracteres."))]
    pub created_by: Option<String>,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListTransactionsQuery {
    #[validate(range(min = 1, message = "A página deve ser >= 1."))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100, message = "O limite deve estar entre 1 e 100."))]
    pub limit: Option<u32>,
    pub product_id: Option<i32>,
    /// STOCK_IN, STOCK_OUT, ADJUSTMENT (ou 0, 1, 2)
    pub transaction_type: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub sort_by: TransactionSortField,
    #[serde(default)]
    pub sort_order: SortOrder,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductTransactionsQuery {
    #[validate(range(min = 1, message = "A página deve ser >= 1."))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100, message = "O limite deve estar entre 1 e 100."))]
    pub limit: Option<u32>,
    #[serde(default)]
    pub sort_by: TransactionSortField,
    #[serde(default)]
    pub sort_order: SortOrder,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StatisticsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub product_id: Option<i32>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DailySummaryQuery {
    /// Dia (UTC). Padrão: hoje.
    pub date: Option<NaiveDate>,
}

// ---
// Handlers
// ---

#[utoipa::path(
    post,
    path = "/api/transactions",
    tag = "Transactions",
    request_body = CreateTransactionPayload,
    responses(
        (status = 201, description = "Transação aplicada; retorna a linha gravada e o produto com o saldo novo", body = LedgerEntry),
        (status = 400, description = "Dados inválidos, estoque insuficiente ou saldo inválido"),
        (status = 404, description = "Produto não encontrado"),
        (status = 409, description = "Produto bloqueado por outra operação")
    )
)]
pub async fn create_transaction(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateTransactionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let kind = payload.transaction_type.parse()?;

    let entry = app_state
        .ledger_service
        .apply_transaction(ApplyTransaction {
            product_id: payload.product_id,
            quantity: payload.quantity,
            kind,
            reason: payload.reason.trim().to_string(),
            notes: payload.notes,
            occurred_at: payload.occurred_at,
            created_by: payload.created_by,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    get,
    path = "/api/transactions",
    tag = "Transactions",
    params(ListTransactionsQuery),
    responses(
        (status = 200, description = "Lista paginada de transações"),
        (status = 400, description = "Filtros inválidos")
    )
)]
pub async fn list_transactions(
    State(app_state): State<AppState>,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<impl IntoResponse, AppError> {
    query.validate()?;

    let kind = query.transaction_type.as_deref().map(str::parse::<TransactionKind>).transpose()?;
    let (from, until) = date_range_bounds(query.start_date, query.end_date)?;
    let filter = TransactionFilter { product_id: query.product_id, kind, from, until };
    let page = PageRequest::new(query.page, query.limit, DEFAULT_PAGE_SIZE);

    let result = app_state
        .transaction_service
        .list(&filter, query.sort_by, query.sort_order, page)
        .await?;

    Ok((StatusCode::OK, Json(result)))
}

#[utoipa::path(
    get,
    path = "/api/transactions/types",
    tag = "Transactions",
    responses((status = 200, description = "Tipos de transação", body = Vec<TransactionKindInfo>))
)]
pub async fn list_transaction_types() -> impl IntoResponse {
    (StatusCode::OK, Json(TransactionService::kinds()))
}

#[utoipa::path(
    get,
    path = "/api/transactions/statistics",
    tag = "Transactions",
    params(StatisticsQuery),
    responses(
        (status = 200, description = "Totais por tipo e por dia", body = TransactionStatistics),
        (status = 400, description = "Intervalo de datas inválido")
    )
)]
pub async fn transaction_statistics(
    State(app_state): State<AppState>,
    Query(query): Query<StatisticsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let stats = app_state
        .report_service
        .transaction_statistics(query.start_date, query.end_date, query.product_id)
        .await?;
    Ok((StatusCode::OK, Json(stats)))
}

#[utoipa::path(
    get,
    path = "/api/transactions/daily-summary",
    tag = "Transactions",
    params(DailySummaryQuery),
    responses((status = 200, description = "Resumo do dia", body = DailySummary))
)]
pub async fn daily_summary(
    State(app_state): State<AppState>,
    Query(query): Query<DailySummaryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let summary = app_state.report_service.daily_summary(date).await?;
    Ok((StatusCode::OK, Json(summary)))
}

#[utoipa::path(
    get,
    path = "/api/transactions/product/{productId}",
    tag = "Transactions",
    params(
        ("productId" = i32, Path, description = "ID do produto"),
        ProductTransactionsQuery
    ),
    responses(
        (status = 200, description = "Histórico paginado do produto"),
        (status = 404, description = "Produto não encontrado")
    )
)]
pub async fn list_product_transactions(
    State(app_state): State<AppState>,
    Path(product_id): Path<i32>,
    Query(query): Query<ProductTransactionsQuery>,
) -> Result<impl IntoResponse, AppError> {
    query.validate()?;

    let page = PageRequest::new(query.page, query.limit, DEFAULT_PAGE_SIZE);
    let result = app_state
        .transaction_service
        .for_product(product_id, query.sort_by, query.sort_order, page)
        .await?;

    Ok((StatusCode::OK, Json(result)))
}

#[utoipa::path(
    get,
    path = "/api/transactions/{id}",
    tag = "Transactions",
    params(("id" = i32, Path, description = "ID da transação")),
    responses(
        (status = 200, description = "Transação com o resumo do produto", body = TransactionDetail),
        (status = 404, description = "Transação não encontrada")
    )
)]
pub async fn get_transaction(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let transaction = app_state.transaction_service.get(id).await?;
    Ok((StatusCode::OK, Json(transaction)))
}
