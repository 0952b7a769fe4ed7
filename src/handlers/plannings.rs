// src/handlers/plannings.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        pagination::{PageRequest, SortOrder},
    },
    config::AppState,
    models::{
        planning::{
            CreatePlanningRequest, Planning, PlanningFilter, PlanningPriority, PlanningSortField,
            PlanningStatus, UpdatePlanningRequest,
        },
        reports::PlanningStatistics,
    },
};

const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListPlanningsQuery {
    #[validate(range(min = 1, message = "A página deve ser >= 1."))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100, message = "O limite deve estar entre 1 e 100."))]
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub status: Option<PlanningStatus>,
    pub category: Option<String>,
    pub priority: Option<PlanningPriority>,
    #[serde(default)]
    pub sort_by: PlanningSortField,
    #[serde(default)]
    pub sort_order: SortOrder,
}

#[utoipa::path(
    get,
    path = "/api/plannings",
    tag = "Plannings",
    params(ListPlanningsQuery),
    responses((status = 200, description = "Lista paginada de planejamentos"))
)]
pub async fn list_plannings(
    State(app_state): State<AppState>,
    Query(query): Query<ListPlanningsQuery>,
) -> Result<impl IntoResponse, AppError> {
    query.validate()?;

    let page = PageRequest::new(query.page, query.limit, DEFAULT_PAGE_SIZE);
    let filter = PlanningFilter {
        search: query.search,
        status: query.status,
        category: query.category,
        priority: query.priority,
    };

    let result = app_state
        .planning_service
        .list(&filter, query.sort_by, query.sort_order, page)
        .await?;
    Ok((StatusCode::OK, Json(result)))
}

#[utoipa::path(
    post,
    path = "/api/plannings",
    tag = "Plannings",
    request_body = CreatePlanningRequest,
    responses(
        (status = 201, description = "Planejamento criado", body = Planning),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_planning(
    State(app_state): State<AppState>,
    Json(payload): Json<CreatePlanningRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let planning = app_state.planning_service.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(planning)))
}

#[utoipa::path(
    get,
    path = "/api/plannings/stats",
    tag = "Plannings",
    responses((status = 200, description = "Totais por status, categoria e prioridade", body = PlanningStatistics))
)]
pub async fn planning_statistics(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stats = app_state.report_service.planning_statistics().await?;
    Ok((StatusCode::OK, Json(stats)))
}

#[utoipa::path(
    get,
    path = "/api/plannings/categories",
    tag = "Plannings",
    responses((status = 200, description = "Categorias em uso", body = Vec<String>))
)]
pub async fn list_planning_categories(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let categories = app_state.planning_service.categories().await?;
    Ok((StatusCode::OK, Json(categories)))
}

#[utoipa::path(
    get,
    path = "/api/plannings/{id}",
    tag = "Plannings",
    params(("id" = i32, Path, description = "ID do planejamento")),
    responses(
        (status = 200, description = "Planejamento", body = Planning),
        (status = 404, description = "Planejamento não encontrado")
    )
)]
pub async fn get_planning(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let planning = app_state.planning_service.get(id).await?;
    Ok((StatusCode::OK, Json(planning)))
}

#[utoipa::path(
    put,
    path = "/api/plannings/{id}",
    tag = "Plannings",
    params(("id" = i32, Path, description = "ID do planejamento")),
    request_body = UpdatePlanningRequest,
    responses(
        (status = 200, description = "Planejamento atualizado", body = Planning),
        (status = 404, description = "Planejamento não encontrado")
    )
)]
pub async fn update_planning(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdatePlanningRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let planning = app_state.planning_service.update(id, &payload).await?;
    Ok((StatusCode::OK, Json(planning)))
}

#[utoipa::path(
    delete,
    path = "/api/plannings/{id}",
    tag = "Plannings",
    params(("id" = i32, Path, description = "ID do planejamento")),
    responses(
        (status = 204, description = "Planejamento removido"),
        (status = 404, description = "Planejamento não encontrado")
    )
)]
pub async fn delete_planning(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    app_state.planning_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
