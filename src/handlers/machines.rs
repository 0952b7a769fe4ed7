// src/handlers/machines.rs

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
        machine::{CreateMachineRequest, Machine, MachineFilter, MachineSortField, MachineStatus, UpdateMachineRequest},
        reports::MachineStatistics,
    },
};

const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListMachinesQuery {
    #[validate(range(min = 1, message = "A página deve ser >= 1."))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100, message = "O limite deve estar entre 1 e 100."))]
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub status: Option<MachineStatus>,
    #[serde(rename = "type")]
    pub machine_type: Option<String>,
    #[serde(default)]
    pub sort_by: MachineSortField,
    #[serde(default)]
    pub sort_order: SortOrder,
}

#[utoipa::path(
    get,
    path = "/api/machines",
    tag = "Machines",
    params(ListMachinesQuery),
    responses((status = 200, description = "Lista paginada de máquinas"))
)]
pub async fn list_machines(
    State(app_state): State<AppState>,
    Query(query): Query<ListMachinesQuery>,
) -> Result<impl IntoResponse, AppError> {
    query.validate()?;

    let page = PageRequest::new(query.page, query.limit, DEFAULT_PAGE_SIZE);
    let filter = MachineFilter {
        search: query.search,
        status: query.status,
        machine_type: query.machine_type,
    };

    let result = app_state
        .machine_service
        .list(&filter, query.sort_by, query.sort_order, page)
        .await?;
    Ok((StatusCode::OK, Json(result)))
}

#[utoipa::path(
    post,
    path = "/api/machines",
    tag = "Machines",
    request_body = CreateMachineRequest,
    responses(
        (status = 201, description = "Máquina cadastrada", body = Machine),
        (status = 400, description = "Dados inválidos ou nome repetido")
    )
)]
pub async fn create_machine(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateMachineRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let machine = app_state.machine_service.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(machine)))
}

#[utoipa::path(
    get,
    path = "/api/machines/stats",
    tag = "Machines",
    responses((status = 200, description = "Totais por status e tipo", body = MachineStatistics))
)]
pub async fn machine_statistics(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stats = app_state.report_service.machine_statistics().await?;
    Ok((StatusCode::OK, Json(stats)))
}

#[utoipa::path(
    get,
    path = "/api/machines/{id}",
    tag = "Machines",
    params(("id" = i32, Path, description = "ID da máquina")),
    responses(
        (status = 200, description = "Máquina", body = Machine),
        (status = 404, description = "Máquina não encontrada")
    )
)]
pub async fn get_machine(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let machine = app_state.machine_service.get(id).await?;
    Ok((StatusCode::OK, Json(machine)))
}

#[utoipa::path(
    put,
    path = "/api/machines/{id}",
    tag = "Machines",
    params(("id" = i32, Path, description = "ID da máquina")),
    request_body = UpdateMachineRequest,
    responses(
        (status = 200, description = "Máquina atualizada", body = Machine),
        (status = 404, description = "Máquina não encontrada")
    )
)]
pub async fn update_machine(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateMachineRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let machine = app_state.machine_service.update(id, &payload).await?;
    Ok((StatusCode::OK, Json(machine)))
}

#[utoipa::path(
    delete,
    path = "/api/machines/{id}",
    tag = "Machines",
    params(("id" = i32, Path, description = "ID da máquina")),
    responses(
        (status = 204, description = "Máquina removida"),
        (status = 404, description = "Máquina não encontrada")
    )
)]
pub async fn delete_machine(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    app_state.machine_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
