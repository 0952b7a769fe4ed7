// src/models/planning.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

pub const DEFAULT_CATEGORY: &str = "General";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "planning_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PlanningPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "planning_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PlanningStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Planning {
    pub id: i32,
    #[schema(example = "Revisão da prensa hidráulica")]
    pub title: String,
    pub description: Option<String>,
    #[schema(example = "General")]
    pub category: String,
    pub priority: PlanningPriority,
    pub status: PlanningStatus,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub assigned_to: Option<String>,
    #[schema(example = "8.5")]
    pub estimated_hours: Option<Decimal>,
    pub actual_hours: Option<Decimal>,
    pub budget: Option<Decimal>,
    pub actual_cost: Option<Decimal>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    #[schema(value_type = Object)]
    pub materials: serde_json::Value,
    #[schema(value_type = Object)]
    pub attachments: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// POST /api/plannings
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanningRequest {
    #[validate(length(min = 2, max = 255, message = "O título deve ter entre 2 e 255 caracteres."))]
    pub title: String,

    #[validate(length(max = 1000, message = "A descrição pode ter no máximo 1000 caracteres."))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 100, message = "A categoria deve ter entre 1 e 100 caracteres."))]
    pub category: Option<String>,

    #[serde(default)]
    pub priority: PlanningPriority,

    #[serde(default)]
    pub status: PlanningStatus,

    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,

    #[validate(length(min = 1, max = 100, message = "O responsável deve ter entre 1 e 100 caracteres."))]
    pub assigned_to: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    pub estimated_hours: Option<Decimal>,
    #[validate(custom(function = "validate_not_negative"))]
    pub actual_hours: Option<Decimal>,
    #[validate(custom(function = "validate_not_negative"))]
    pub budget: Option<Decimal>,
    #[validate(custom(function = "validate_not_negative"))]
    pub actual_cost: Option<Decimal>,

    #[validate(length(max = 1000, message = "As notas podem ter no máximo 1000 caracteres."))]
    pub notes: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,
    #[schema(value_type = Option<Object>)]
    pub materials: Option<serde_json::Value>,
    #[schema(value_type = Option<Object>)]
    pub attachments: Option<serde_json::Value>,
}

// PUT /api/plannings/{id}
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlanningRequest {
    #[validate(length(min = 2, max = 255, message = "O título deve ter entre 2 e 255 caracteres."))]
    pub title: Option<String>,

    #[validate(length(max = 1000, message = "A descrição pode ter no máximo 1000 caracteres."))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 100, message = "A categoria deve ter entre 1 e 100 caracteres."))]
    pub category: Option<String>,

    pub priority: Option<PlanningPriority>,
    pub status: Option<PlanningStatus>,

    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,

    #[validate(length(min = 1, max = 100, message = "O responsável deve ter entre 1 e 100 caracteres."))]
    pub assigned_to: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    pub estimated_hours: Option<Decimal>,
    #[validate(custom(function = "validate_not_negative"))]
    pub actual_hours: Option<Decimal>,
    #[validate(custom(function = "validate_not_negative"))]
    pub budget: Option<Decimal>,
    #[validate(custom(function = "validate_not_negative"))]
    pub actual_cost: Option<Decimal>,

    #[validate(length(max = 1000, message = "As notas podem ter no máximo 1000 caracteres."))]
    pub notes: Option<String>,

    pub tags: Option<Vec<String>>,
    #[schema(value_type = Option<Object>)]
    pub materials: Option<serde_json::Value>,
    #[schema(value_type = Option<Object>)]
    pub attachments: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum PlanningSortField {
    Title,
    Category,
    Priority,
    Status,
    DueDate,
    #[default]
    CreatedAt,
}

impl PlanningSortField {
    pub fn column(self) -> &'static str {
        match self {
            PlanningSortField::Title => "title",
            PlanningSortField::Category => "category",
            PlanningSortField::Priority => "priority",
            PlanningSortField::Status => "status",
            PlanningSortField::DueDate => "due_date",
            PlanningSortField::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlanningFilter {
    pub search: Option<String>,
    pub status: Option<PlanningStatus>,
    pub category: Option<String>,
    pub priority: Option<PlanningPriority>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_snake_case_on_the_wire() {
        let json = serde_json::to_string(&PlanningStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn negative_budget_is_rejected() {
        let payload: CreatePlanningRequest = serde_json::from_value(serde_json::json!({
            "title": "Inventário anual",
            "budget": -10.0
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("budget"));
    }

    #[test]
    fn defaults_apply_to_priority_and_status() {
        let payload: CreatePlanningRequest =
            serde_json::from_value(serde_json::json!({ "title": "Inventário anual" })).unwrap();

        assert!(payload.validate().is_ok());
        assert_eq!(payload.priority, PlanningPriority::Medium);
        assert_eq!(payload.status, PlanningStatus::Pending);
        assert!(payload.tags.is_empty());
    }
}
