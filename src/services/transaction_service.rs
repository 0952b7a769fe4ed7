// src/services/transaction_service.rs

use sqlx::PgPool;
use crate::{
    common::{
        error::AppError,
        pagination::{PageRequest, Paginated, SortOrder},
    },
    db::{ProductRepository, TransactionRepository},
    models::transaction::{
        TransactionDetail, TransactionFilter, TransactionKind, TransactionKindInfo, TransactionSortField,
    },
};

// Consultas ao livro-razão. Escrita é só pelo LedgerService.
#[derive(Clone)]
pub struct TransactionService {
    pool: PgPool,
    transactions: TransactionRepository,
    products: ProductRepository,
}

impl TransactionService {
    pub fn new(pool: PgPool, transactions: TransactionRepository, products: ProductRepository) -> Self {
        Self { pool, transactions, products }
    }

    pub fn kinds() -> Vec<TransactionKindInfo> {
        TransactionKind::ALL
            .into_iter()
            .map(|kind| TransactionKindInfo { value: kind, label: kind.label().to_string() })
            .collect()
    }

    pub async fn list(
        &self,
        filter: &TransactionFilter,
        sort_by: TransactionSortField,
        order: SortOrder,
        page: PageRequest,
    ) -> Result<Paginated<TransactionDetail>, AppError> {
        let (items, total) = self.transactions.list(filter, sort_by, order, page).await?;
        Ok(Paginated::new(items, page, total))
    }

    pub async fn get(&self, id: i32) -> Result<TransactionDetail, AppError> {
        self.transactions
            .find_detail_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::TransactionNotFound(id))
    }

    /// Histórico de um produto ativo; produto inexistente é 404, não lista vazia.
    pub async fn for_product(
        &self,
        product_id: i32,
        sort_by: TransactionSortField,
        order: SortOrder,
        page: PageRequest,
    ) -> Result<Paginated<TransactionDetail>, AppError> {
        if self.products.find_by_id(&self.pool, product_id).await?.is_none() {
            return Err(AppError::ProductNotFound(product_id));
        }

        let filter = TransactionFilter { product_id: Some(product_id), ..Default::default() };
        self.list(&filter, sort_by, order, page).await
    }
}
