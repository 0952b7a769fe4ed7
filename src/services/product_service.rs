// src/services/product_service.rs

use sqlx::PgPool;
use crate::{
    common::{
        error::AppError,
        pagination::{PageRequest, Paginated, SortOrder},
    },
    db::{ProductRepository, TransactionRepository},
    models::product::{Product, ProductChanges, ProductFilter, ProductSortField, ProductWithHistory},
};

/// Quantas movimentações acompanham o detalhe do produto.
pub const RECENT_HISTORY_LIMIT: i64 = 20;

// Leitura e manutenção do cadastro. O saldo não passa por aqui (ver LedgerService).
#[derive(Clone)]
pub struct ProductService {
    pool: PgPool,
    products: ProductRepository,
    transactions: TransactionRepository,
}

impl ProductService {
    pub fn new(pool: PgPool, products: ProductRepository, transactions: TransactionRepository) -> Self {
        Self { pool, products, transactions }
    }

    pub async fn list(
        &self,
        filter: &ProductFilter,
        sort_by: ProductSortField,
        order: SortOrder,
        page: PageRequest,
    ) -> Result<Paginated<Product>, AppError> {
        let (items, total) = self.products.list(filter, sort_by, order, page).await?;
        Ok(Paginated::new(items, page, total))
    }

    pub async fn get(&self, id: i32) -> Result<Product, AppError> {
        self.products
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::ProductNotFound(id))
    }

    pub async fn get_with_history(&self, id: i32) -> Result<ProductWithHistory, AppError> {
        let product = self.get(id).await?;
        let recent_transactions = self
            .transactions
            .recent_for_product(&self.pool, id, RECENT_HISTORY_LIMIT)
            .await?;
        Ok(ProductWithHistory { product, recent_transactions })
    }

    pub async fn get_by_barcode(&self, barcode: &str) -> Result<Product, AppError> {
        self.products
            .find_by_barcode(&self.pool, barcode)
            .await?
            .ok_or_else(|| AppError::BarcodeNotFound(barcode.to_string()))
    }

    pub async fn low_stock(&self) -> Result<Vec<Product>, AppError> {
        self.products.find_low_stock(&self.pool).await
    }

    pub async fn categories(&self) -> Result<Vec<String>, AppError> {
        self.products.get_categories(&self.pool).await
    }

    pub async fn update(&self, id: i32, changes: &ProductChanges) -> Result<Product, AppError> {
        let product = self
            .products
            .update(&self.pool, id, changes)
            .await?
            .ok_or(AppError::ProductNotFound(id))?;

        tracing::info!(product_id = id, "Produto atualizado");
        Ok(product)
    }

    /// `soft = true` só desativa; senão apaga o produto e, em cascata, o histórico.
    pub async fn remove(&self, id: i32, soft: bool) -> Result<(), AppError> {
        let removed = if soft {
            self.products.soft_remove(&self.pool, id).await?
        } else {
            self.products.remove(&self.pool, id).await?
        };

        if !removed {
            return Err(AppError::ProductNotFound(id));
        }
        tracing::info!(product_id = id, soft, "Produto removido");
        Ok(())
    }
}
