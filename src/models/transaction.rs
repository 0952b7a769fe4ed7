// src/models/transaction.rs

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::common::error::AppError;
use crate::models::product::{Product, ProductSummary};

pub const DEFAULT_CREATED_BY: &str = "system";

// --- Tipo de movimentação ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "stock_transaction_kind", rename_all = "SCREAMING_SNAKE_CASE")] // Banco
#[serde(rename_all = "SCREAMING_SNAKE_CASE")] // JSON
pub enum TransactionKind {
    StockIn,    // "STOCK_IN"
    StockOut,   // "STOCK_OUT"
    Adjustment, // "ADJUSTMENT": quantity é o saldo absoluto desejado
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 3] = [
        TransactionKind::StockIn,
        TransactionKind::StockOut,
        TransactionKind::Adjustment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::StockIn => "STOCK_IN",
            TransactionKind::StockOut => "STOCK_OUT",
            TransactionKind::Adjustment => "ADJUSTMENT",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TransactionKind::StockIn => "Stock in",
            TransactionKind::StockOut => "Stock out",
            TransactionKind::Adjustment => "Stock adjustment",
        }
    }
}

// Aceita o nome ("STOCK_OUT", "stock_out") e os códigos numéricos antigos (0, 1, 2).
impl FromStr for TransactionKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STOCK_IN" | "0" => Ok(TransactionKind::StockIn),
            "STOCK_OUT" | "1" => Ok(TransactionKind::StockOut),
            "ADJUSTMENT" | "2" => Ok(TransactionKind::Adjustment),
            _ => Err(AppError::InvalidOperationKind(s.to_string())),
        }
    }
}

// --- Linha do livro-razão (imutável) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockTransaction {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = 1)]
    pub product_id: i32,
    #[schema(example = 3)]
    pub quantity: i32,
    pub transaction_type: TransactionKind,
    #[schema(example = "sale")]
    pub reason: String,
    pub notes: Option<String>,
    #[serde(rename = "previousBalance")]
    #[schema(example = 10)]
    pub previous_stock: i32,
    #[serde(rename = "newBalance")]
    #[schema(example = 7)]
    pub new_stock: i32,
    pub transaction_date: DateTime<Utc>,
    #[schema(example = "system")]
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Transação + resumo do produto (listagens e detalhe)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub transaction: StockTransaction,
    #[sqlx(flatten)]
    pub product: ProductSummary,
}

// O que o livro-razão grava. previous/new já calculados.
#[derive(Debug, Clone)]
pub struct NewStockTransaction {
    pub product_id: i32,
    pub quantity: i32,
    pub kind: TransactionKind,
    pub reason: String,
    pub notes: Option<String>,
    pub previous_stock: i32,
    pub new_stock: i32,
    pub transaction_date: DateTime<Utc>,
    pub created_by: String,
}

// Comando de entrada do livro-razão
#[derive(Debug, Clone)]
pub struct ApplyTransaction {
    pub product_id: i32,
    pub quantity: i32,
    pub kind: TransactionKind,
    pub reason: String,
    pub notes: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
}

// Resultado: a transação gravada e o produto já com o saldo novo
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub transaction: StockTransaction,
    pub product: Product,
}

// Produto recém-criado e, se houve estoque inicial, a entrada que o gerou
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenedProduct {
    pub product: Product,
    pub opening_transaction: Option<StockTransaction>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionKindInfo {
    pub value: TransactionKind,
    pub label: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum TransactionSortField {
    TransactionDate,
    Quantity,
    TransactionType,
    #[default]
    CreatedAt,
}

impl TransactionSortField {
    pub fn column(self) -> &'static str {
        match self {
            TransactionSortField::TransactionDate => "t.transaction_date",
            TransactionSortField::Quantity => "t.quantity",
            TransactionSortField::TransactionType => "t.transaction_type",
            TransactionSortField::CreatedAt => "t.created_at",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub product_id: Option<i32>,
    pub kind: Option<TransactionKind>,
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}
