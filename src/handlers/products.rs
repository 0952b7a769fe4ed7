// src/handlers/products.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
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
        product::{NewProduct, Product, ProductChanges, ProductFilter, ProductSortField, ProductWithHistory, DEFAULT_UNIT},
        reports::ProductStatistics,
        transaction::OpenedProduct,
    },
};

const DEFAULT_PAGE_SIZE: u32 = 10;

// ---
// Validação Customizada
// ---
fn validate_price(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O preço não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// `length(min = 1)` aceita "   ", que vira "" depois do trim.
fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("O campo não pode ficar em branco.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(
        length(min = 1, max = 50, message = "O código de barras deve ter entre 1 e 50 caracteres."),
        custom(function = "validate_not_blank")
    )]
    #[schema(example = "8690000000017")]
    pub barcode: String,

    #[validate(
        length(min = 1, max = 200, message = "O nome deve ter entre 1 e 200 caracteres."),
        custom(function = "validate_not_blank")
    )]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 1000, message = "A descrição pode ter no máximo 1000 caracteres."))]
    pub description: String,

    #[validate(
        length(min = 1, max = 100, message = "A categoria deve ter entre 1 e 100 caracteres."),
        custom(function = "validate_not_blank")
    )]
    pub category: String,

    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = f64, example = 12.5)]
    pub price: Decimal,

    // Estoque inicial: vira um STOCK_IN "Initial stock" no livro-razão
    #[serde(default)]
    #[validate(range(min = 0, message = "O estoque inicial não pode ser negativo."))]
    pub current_stock: i32,

    #[serde(default)]
    #[validate(range(min = 0, message = "O estoque mínimo não pode ser negativo."))]
    pub min_stock_level: i32,

    #[validate(
        length(min = 1, max = 20, message = "A unidade deve ter entre 1 e 20 caracteres."),
        custom(function = "validate_not_blank")
    )]
    pub unit: Option<String>,

    #[validate(length(max = 100, message = "O autor pode ter no máximo 100 caracteres."))]
    pub created_by: Option<String>,
}

// Sem campo de saldo: saldo só muda por transação.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    #[validate(
        length(min = 1, max = 50, message = "O código de barras deve ter entre 1 e 50 caracteres."),
        custom(function = "validate_not_blank")
    )]
    pub barcode: Option<String>,

    #[validate(
        length(min = 1, max = 200, message = "O nome deve ter entre 1 e 200 caracteres."),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,

    #[validate(length(max = 1000, message = "A descrição pode ter no máximo 1000 caracteres."))]
    pub description: Option<String>,

    #[validate(
        length(min = 1, max = 100, message = "A categoria deve ter entre 1 e 100 caracteres."),
        custom(function = "validate_not_blank")
    )]
    pub category: Option<String>,

    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,

    #[validate(range(min = 0, message = "O estoque mínimo não pode ser negativo."))]
    pub min_stock_level: Option<i32>,

    #[validate(
        length(min = 1, max = 20, message = "A unidade deve ter entre 1 e 20 caracteres."),
        custom(function = "validate_not_blank")
    )]
    pub unit: Option<String>,

    pub is_active: Option<bool>,
}

impl From<UpdateProductPayload> for ProductChanges {
    fn from(p: UpdateProductPayload) -> Self {
        Self {
            barcode: p.barcode.map(|b| b.trim().to_string()),
            name: p.name.map(|n| n.trim().to_string()),
            description: p.description,
            category: p.category.map(|c| c.trim().to_string()),
            price: p.price.map(|v| v.round_dp(2)),
            min_stock_level: p.min_stock_level,
            unit: p.unit.map(|u| u.trim().to_string()),
            is_active: p.is_active,
        }
    }
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListProductsQuery {
    #[validate(range(min = 1, message = "A página deve ser >= 1."))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100, message = "O limite deve estar entre 1 e 100."))]
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub low_stock: bool,
    #[serde(default)]
    pub sort_by: ProductSortField,
    #[serde(default)]
    pub sort_order: SortOrder,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteProductQuery {
    /// `true` só desativa; padrão apaga o produto e o histórico.
    #[serde(default)]
    pub soft: bool,
}

// ---
// Handlers
// ---

#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    params(ListProductsQuery),
    responses(
        (status = 200, description = "Lista paginada de produtos ativos"),
        (status = 400, description = "Parâmetros inválidos")
    )
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<impl IntoResponse, AppError> {
    query.validate()?;

    let page = PageRequest::new(query.page, query.limit, DEFAULT_PAGE_SIZE);
    let filter = ProductFilter {
        search: query.search,
        category: query.category,
        low_stock: query.low_stock,
    };

    let result = app_state
        .product_service
        .list(&filter, query.sort_by, query.sort_order, page)
        .await?;

    Ok((StatusCode::OK, Json(result)))
}

#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Produto criado (com a entrada de estoque inicial, se houver)", body = OpenedProduct),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Código de barras já cadastrado")
    )
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let new_product = NewProduct {
        barcode: payload.barcode.trim().to_string(),
        name: payload.name.trim().to_string(),
        description: payload.description,
        category: payload.category.trim().to_string(),
        price: payload.price.round_dp(2),
        min_stock_level: payload.min_stock_level,
        unit: payload.unit.map(|u| u.trim().to_string()).unwrap_or_else(|| DEFAULT_UNIT.to_string()),
    };

    let opened = app_state
        .ledger_service
        .open_product(new_product, payload.current_stock, payload.created_by)
        .await?;

    Ok((StatusCode::CREATED, Json(opened)))
}

#[utoipa::path(
    get,
    path = "/api/products/categories",
    tag = "Products",
    responses((status = 200, description = "Categorias em uso", body = Vec<String>))
)]
pub async fn list_categories(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let categories = app_state.product_service.categories().await?;
    Ok((StatusCode::OK, Json(categories)))
}

#[utoipa::path(
    get,
    path = "/api/products/low-stock",
    tag = "Products",
    responses((status = 200, description = "Produtos com saldo <= mínimo", body = Vec<Product>))
)]
pub async fn list_low_stock(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let products = app_state.product_service.low_stock().await?;
    Ok((StatusCode::OK, Json(products)))
}

#[utoipa::path(
    get,
    path = "/api/products/statistics",
    tag = "Products",
    responses((status = 200, description = "Estatísticas do cadastro", body = ProductStatistics))
)]
pub async fn product_statistics(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stats = app_state.report_service.product_statistics().await?;
    Ok((StatusCode::OK, Json(stats)))
}

#[utoipa::path(
    get,
    path = "/api/products/barcode/{barcode}",
    tag = "Products",
    params(("barcode" = String, Path, description = "Código de barras")),
    responses(
        (status = 200, description = "Produto encontrado", body = Product),
        (status = 404, description = "Nenhum produto ativo com esse código")
    )
)]
pub async fn get_product_by_barcode(
    State(app_state): State<AppState>,
    Path(barcode): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.product_service.get_by_barcode(&barcode).await?;
    Ok((StatusCode::OK, Json(product)))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = i32, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto com as 20 movimentações mais recentes", body = ProductWithHistory),
        (status = 404, description = "Produto não encontrado")
    )
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.product_service.get_with_history(id).await?;
    Ok((StatusCode::OK, Json(product)))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = i32, Path, description = "ID do produto")),
    request_body = UpdateProductPayload,
    responses(
        (status = 200, description = "Produto atualizado", body = Product),
        (status = 404, description = "Produto não encontrado"),
        (status = 409, description = "Código de barras já cadastrado")
    )
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state.product_service.update(id, &payload.into()).await?;
    Ok((StatusCode::OK, Json(product)))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Products",
    params(
        ("id" = i32, Path, description = "ID do produto"),
        DeleteProductQuery
    ),
    responses(
        (status = 204, description = "Produto removido"),
        (status = 404, description = "Produto não encontrado")
    )
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<DeleteProductQuery>,
) -> Result<impl IntoResponse, AppError> {
    app_state.product_service.remove(id, query.soft).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use serde_json::json;

    use crate::{
        db::memory_store::MemoryLedgerStore,
        handlers::test_support::{app, send},
    };

    #[test]
    fn update_payload_ignores_balance_fields() {
        let payload: UpdateProductPayload =
            serde_json::from_value(json!({ "name": " Parafuso M10 ", "currentStock": 999 })).unwrap();
        let changes: ProductChanges = payload.into();

        assert_eq!(changes.name.as_deref(), Some("Parafuso M10"));
        assert!(changes.price.is_none());
    }

    #[test]
    fn negative_initial_stock_and_price_are_rejected() {
        let payload: CreateProductPayload = serde_json::from_value(json!({
            "barcode": "123",
            "name": "Parafuso",
            "category": "Ferragens",
            "price": -1.0,
            "currentStock": -5
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields.len(), 2);
        assert!(fields.contains_key("price"));
    }

    #[test]
    fn whitespace_only_text_fields_are_rejected() {
        let payload: CreateProductPayload = serde_json::from_value(json!({
            "barcode": "   ",
            "name": " ",
            "category": "\t",
            "price": 1.0,
            "unit": "  "
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["barcode", "name", "category", "unit"] {
            assert!(fields.contains_key(field), "{field} deveria ser recusado");
        }
    }

    #[test]
    fn update_with_blank_name_is_rejected() {
        let payload: UpdateProductPayload = serde_json::from_value(json!({ "name": "   " })).unwrap();
        assert!(payload.validate().unwrap_err().field_errors().contains_key("name"));
    }

    #[tokio::test]
    async fn blank_barcode_is_a_bad_request_with_details() {
        let store = MemoryLedgerStore::new();

        let (status, body) = send(
            app(&store),
            Method::POST,
            "/api/products",
            Some(json!({ "barcode": "   ", "name": "Parafuso", "category": "Ferragens", "price": 1.5 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"]["barcode"].is_array());
        assert!(store.product(1).await.is_none());
    }

    #[tokio::test]
    async fn create_trims_fields_and_records_initial_stock() {
        let store = MemoryLedgerStore::new();

        let (status, body) = send(
            app(&store),
            Method::POST,
            "/api/products",
            Some(json!({
                "barcode": " X1 ",
                "name": "Parafuso",
                "category": "Ferragens",
                "price": 1.5,
                "currentStock": 12
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["product"]["barcode"], "X1");
        assert_eq!(body["product"]["currentStock"], 12);
        assert_eq!(body["openingTransaction"]["reason"], "Initial stock");
    }
}
