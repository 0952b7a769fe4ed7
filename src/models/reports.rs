// src/models/reports.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::machine::MachineStatus;
use crate::models::planning::{PlanningPriority, PlanningStatus};
use crate::models::transaction::{TransactionDetail, TransactionKind};

// --- Transações ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KindTotals {
    #[serde(rename = "type")]
    pub transaction_type: TransactionKind,
    #[sqlx(skip)]
    pub type_name: String,
    pub count: i64,
    pub total_quantity: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub count: i64,
    pub total_quantity: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatistics {
    pub total_transactions: i64,
    pub transactions_by_type: Vec<KindTotals>,
    pub daily_stats: Vec<DailyTotals>,
}

// Resumo de um único dia
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_transactions: usize,
    pub stock_in_count: usize,
    pub stock_out_count: usize,
    pub adjustment_count: usize,
    pub total_stock_in: i64,
    pub total_stock_out: i64,
    pub transactions: Vec<TransactionDetail>,
}

// --- Produtos ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductStatistics {
    pub total_products: i64,
    pub low_stock_products: i64,
    pub total_value: Decimal,       // Soma dos preços unitários
    pub total_stock_value: Decimal, // Soma de preço * saldo
    pub by_category: Vec<CategoryCount>,
}

// --- Máquinas ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachineTypeCount {
    #[serde(rename = "type")]
    pub machine_type: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MachineStatusCount {
    pub status: MachineStatus,
    pub count: i64,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MachineStatistics {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
    pub maintenance: i64,
    pub by_type: Vec<MachineTypeCount>,
}

// --- Planejamento ---

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PlanningStatusCount {
    pub status: PlanningStatus,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanningPriorityCount {
    pub priority: PlanningPriority,
    pub count: i64,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanningStatistics {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub by_category: Vec<CategoryCount>,
    pub by_priority: Vec<PlanningPriorityCount>,
}

// --- Visão geral (/api/stats) ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiOverview {
    pub total_products: i64,
    pub total_transactions: i64,
    pub low_stock_products: i64,
    pub today_transactions: i64,
    pub last_updated: DateTime<Utc>,
    pub api_version: String,
}
