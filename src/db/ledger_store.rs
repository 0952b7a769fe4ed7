// src/db/ledger_store.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::{
    common::{db_utils::begin_with_lock_timeout, error::AppError},
    db::{ProductRepository, TransactionRepository},
    models::{
        product::{NewProduct, Product},
        transaction::{NewStockTransaction, StockTransaction},
    },
};

/// Fonte de unidades atômicas para o livro-razão.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn LedgerUnit>, AppError>;
}

/// Uma unidade aberta: tudo que for escrito aqui entra junto no `commit`.
/// Soltar a unidade sem `commit` descarta as escritas (rollback).
#[async_trait]
pub trait LedgerUnit: Send {
    /// Lê o produto com lock exclusivo até o fim da unidade.
    async fn get_for_update(&mut self, product_id: i32) -> Result<Option<Product>, AppError>;

    async fn insert_product(&mut self, input: &NewProduct) -> Result<Product, AppError>;

    async fn insert_transaction(&mut self, input: &NewStockTransaction) -> Result<StockTransaction, AppError>;

    async fn update_balance(&mut self, product_id: i32, new_balance: i32) -> Result<Product, AppError>;

    async fn commit(self: Box<Self>) -> Result<(), AppError>;
}

// ---
// Implementação PostgreSQL
// ---

#[derive(Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
    products: ProductRepository,
    transactions: TransactionRepository,
    lock_timeout_ms: u64,
}

impl PgLedgerStore {
    pub fn new(
        pool: PgPool,
        products: ProductRepository,
        transactions: TransactionRepository,
        lock_timeout_ms: u64,
    ) -> Self {
        Self { pool, products, transactions, lock_timeout_ms }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn begin(&self) -> Result<Box<dyn LedgerUnit>, AppError> {
        let tx = begin_with_lock_timeout(&self.pool, self.lock_timeout_ms).await?;
        Ok(Box::new(PgLedgerUnit {
            tx,
            products: self.products.clone(),
            transactions: self.transactions.clone(),
        }))
    }
}

struct PgLedgerUnit {
    tx: Transaction<'static, Postgres>,
    products: ProductRepository,
    transactions: TransactionRepository,
}

#[async_trait]
impl LedgerUnit for PgLedgerUnit {
    async fn get_for_update(&mut self, product_id: i32) -> Result<Option<Product>, AppError> {
        self.products.get_for_update(&mut *self.tx, product_id).await
    }

    async fn insert_product(&mut self, input: &NewProduct) -> Result<Product, AppError> {
        self.products.create(&mut *self.tx, input).await
    }

    async fn insert_transaction(&mut self, input: &NewStockTransaction) -> Result<StockTransaction, AppError> {
        self.transactions.insert(&mut *self.tx, input).await
    }

    async fn update_balance(&mut self, product_id: i32, new_balance: i32) -> Result<Product, AppError> {
        self.products.update_balance(&mut *self.tx, product_id, new_balance).await
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }
}
