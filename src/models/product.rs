// src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::transaction::StockTransaction;

pub const DEFAULT_UNIT: &str = "pcs";

// --- Produto ---
// O saldo (current_stock) é sempre o new_stock da última transação aplicada.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "8690000000017")]
    pub barcode: String,
    #[schema(example = "Parafuso M8")]
    pub name: String,
    pub description: String,
    #[schema(example = "Ferragens")]
    pub category: String,
    #[schema(example = "12.50")]
    pub price: Decimal,
    #[schema(example = 10)]
    pub current_stock: i32,
    #[schema(example = 5)]
    pub min_stock_level: i32,
    #[schema(example = "pcs")]
    pub unit: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.min_stock_level
    }
}

// Versão enxuta do produto usada nos JOINs do histórico.
// As colunas vêm com prefixo "product_" para não colidir com as da transação.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    #[sqlx(rename = "product_id")]
    pub id: i32,
    #[sqlx(rename = "product_name")]
    pub name: String,
    #[sqlx(rename = "product_barcode")]
    pub barcode: String,
    #[sqlx(rename = "product_category")]
    pub category: String,
    #[sqlx(rename = "product_unit")]
    pub unit: String,
    #[sqlx(rename = "product_current_stock")]
    pub current_stock: i32,
}

// GET /api/products/{id}: produto + últimas movimentações
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithHistory {
    #[serde(flatten)]
    pub product: Product,
    pub recent_transactions: Vec<StockTransaction>,
}

// Dados para inserir um produto novo. O saldo nasce zerado;
// estoque inicial entra como STOCK_IN pelo livro-razão.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub barcode: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Decimal,
    pub min_stock_level: i32,
    pub unit: String,
}

// Atualização parcial. Saldo não entra aqui: só muda via transação.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub barcode: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub min_stock_level: Option<i32>,
    pub unit: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ProductSortField {
    #[default]
    Name,
    Barcode,
    Category,
    Price,
    CurrentStock,
    CreatedAt,
}

impl ProductSortField {
    pub fn column(self) -> &'static str {
        match self {
            ProductSortField::Name => "name",
            ProductSortField::Barcode => "barcode",
            ProductSortField::Category => "category",
            ProductSortField::Price => "price",
            ProductSortField::CurrentStock => "current_stock",
            ProductSortField::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub low_stock: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(current_stock: i32, min_stock_level: i32) -> Product {
        Product {
            id: 1,
            barcode: "123".into(),
            name: "Teste".into(),
            description: String::new(),
            category: "Geral".into(),
            price: Decimal::new(1000, 2),
            current_stock,
            min_stock_level,
            unit: DEFAULT_UNIT.into(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn low_stock_includes_the_threshold() {
        assert!(product(4, 5).is_low_stock());
        assert!(product(5, 5).is_low_stock());
        assert!(!product(6, 5).is_low_stock());
    }

    #[test]
    fn sort_field_maps_to_whitelisted_columns() {
        assert_eq!(ProductSortField::default().column(), "name");
        assert_eq!(ProductSortField::CurrentStock.column(), "current_stock");
    }
}
