// src/models/machine.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "machine_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MachineStatus {
    #[default]
    Active,
    Inactive,
    Maintenance,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    pub id: i32,
    #[schema(example = "CNC-01")]
    pub name: String,
    #[serde(rename = "type")]
    #[schema(example = "CNC")]
    pub machine_type: String,
    pub status: MachineStatus,
    pub location: Option<String>,
    pub description: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiry: Option<NaiveDate>,
    #[schema(example = 30)]
    pub maintenance_interval_days: Option<i32>,
    pub last_maintenance_date: Option<NaiveDate>,
    pub next_maintenance_date: Option<NaiveDate>,
    #[schema(value_type = Option<Object>)]
    pub specifications: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// POST /api/machines
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMachineRequest {
    #[validate(length(min = 2, max = 255, message = "O nome da máquina deve ter entre 2 e 255 caracteres."))]
    #[schema(example = "CNC-01")]
    pub name: String,

    #[serde(rename = "type")]
    #[validate(length(min = 2, max = 100, message = "O tipo deve ter entre 2 e 100 caracteres."))]
    #[schema(example = "CNC")]
    pub machine_type: String,

    #[serde(default)]
    pub status: MachineStatus,

    #[validate(length(max = 255, message = "A localização pode ter no máximo 255 caracteres."))]
    pub location: Option<String>,

    #[validate(length(max = 1000, message = "A descrição pode ter no máximo 1000 caracteres."))]
    pub description: Option<String>,

    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiry: Option<NaiveDate>,

    #[validate(range(min = 1, message = "O intervalo de manutenção deve ser positivo."))]
    pub maintenance_interval_days: Option<i32>,

    pub last_maintenance_date: Option<NaiveDate>,
    pub next_maintenance_date: Option<NaiveDate>,

    #[schema(value_type = Option<Object>)]
    pub specifications: Option<serde_json::Value>,
}

// PUT /api/machines/{id}: só altera o que vier preenchido
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMachineRequest {
    #[validate(length(min = 2, max = 255, message = "O nome da máquina deve ter entre 2 e 255 caracteres."))]
    pub name: Option<String>,

    #[serde(rename = "type")]
    #[validate(length(min = 2, max = 100, message = "O tipo deve ter entre 2 e 100 caracteres."))]
    pub machine_type: Option<String>,

    pub status: Option<MachineStatus>,

    #[validate(length(max = 255, message = "A localização pode ter no máximo 255 caracteres."))]
    pub location: Option<String>,

    #[validate(length(max = 1000, message = "A descrição pode ter no máximo 1000 caracteres."))]
    pub description: Option<String>,

    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiry: Option<NaiveDate>,

    #[validate(range(min = 1, message = "O intervalo de manutenção deve ser positivo."))]
    pub maintenance_interval_days: Option<i32>,

    pub last_maintenance_date: Option<NaiveDate>,
    pub next_maintenance_date: Option<NaiveDate>,

    #[schema(value_type = Option<Object>)]
    pub specifications: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum MachineSortField {
    Name,
    Type,
    Status,
    #[default]
    CreatedAt,
}

impl MachineSortField {
    pub fn column(self) -> &'static str {
        match self {
            MachineSortField::Name => "name",
            MachineSortField::Type => "machine_type",
            MachineSortField::Status => "status",
            MachineSortField::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MachineFilter {
    pub search: Option<String>,
    pub status: Option<MachineStatus>,
    pub machine_type: Option<String>,
}
