// src/db/memory_store.rs
//
// LedgerStore em memória para os testes. Uma unidade segura o Mutex do estado
// inteiro do begin até o commit/drop, o que equivale (com folga) ao FOR UPDATE.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    common::error::AppError,
    db::ledger_store::{LedgerStore, LedgerUnit},
    models::{
        product::{NewProduct, Product, DEFAULT_UNIT},
        transaction::{NewStockTransaction, StockTransaction},
    },
};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    products: BTreeMap<i32, Product>,
    transactions: Vec<StockTransaction>,
    last_product_id: i32,
    last_transaction_id: i32,
}

#[derive(Clone, Default)]
pub struct MemoryLedgerStore {
    state: Arc<Mutex<MemoryState>>,
    fail_next_commit: Arc<AtomicBool>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixture: insere um produto já com saldo, sem passar pelo livro-razão.
    pub async fn seed_product(&self, barcode: &str, current_stock: i32, min_stock_level: i32) -> Product {
        let mut state = self.state.lock().await;
        state.last_product_id += 1;
        let now = Utc::now();
        let product = Product {
            id: state.last_product_id,
            barcode: barcode.to_string(),
            name: format!("Produto {barcode}"),
            description: String::new(),
            category: "Geral".to_string(),
            price: Decimal::new(1000, 2),
            current_stock,
            min_stock_level,
            unit: DEFAULT_UNIT.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        state.products.insert(product.id, product.clone());
        product
    }

    pub async fn deactivate(&self, product_id: i32) {
        if let Some(product) = self.state.lock().await.products.get_mut(&product_id) {
            product.is_active = false;
        }
    }

    pub async fn product(&self, product_id: i32) -> Option<Product> {
        self.state.lock().await.products.get(&product_id).cloned()
    }

    pub async fn transactions(&self) -> Vec<StockTransaction> {
        self.state.lock().await.transactions.clone()
    }

    /// O próximo commit falha (e nada é gravado).
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn begin(&self) -> Result<Box<dyn LedgerUnit>, AppError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryLedgerUnit {
            guard,
            working,
            fail_commit: self.fail_next_commit.swap(false, Ordering::SeqCst),
        }))
    }
}

struct MemoryLedgerUnit {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
    fail_commit: bool,
}

#[async_trait]
impl LedgerUnit for MemoryLedgerUnit {
    async fn get_for_update(&mut self, product_id: i32) -> Result<Option<Product>, AppError> {
        Ok(self.working.products.get(&product_id).cloned())
    }

    async fn insert_product(&mut self, input: &NewProduct) -> Result<Product, AppError> {
        if self.working.products.values().any(|p| p.barcode == input.barcode) {
            return Err(AppError::BarcodeAlreadyExists(input.barcode.clone()));
        }
        self.working.last_product_id += 1;
        let now = Utc::now();
        let product = Product {
            id: self.working.last_product_id,
            barcode: input.barcode.clone(),
            name: input.name.clone(),
            description: input.description.clone(),
            category: input.category.clone(),
            price: input.price,
            current_stock: 0,
            min_stock_level: input.min_stock_level,
            unit: input.unit.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.working.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn insert_transaction(&mut self, input: &NewStockTransaction) -> Result<StockTransaction, AppError> {
        if !self.working.products.contains_key(&input.product_id) {
            return Err(AppError::ProductNotFound(input.product_id));
        }
        self.working.last_transaction_id += 1;
        let now = Utc::now();
        let transaction = StockTransaction {
            id: self.working.last_transaction_id,
            product_id: input.product_id,
            quantity: input.quantity,
            transaction_type: input.kind,
            reason: input.reason.clone(),
            notes: input.notes.clone(),
            previous_stock: input.previous_stock,
            new_stock: input.new_stock,
            transaction_date: input.transaction_date,
            created_by: input.created_by.clone(),
            created_at: now,
            updated_at: now,
        };
        self.working.transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn update_balance(&mut self, product_id: i32, new_balance: i32) -> Result<Product, AppError> {
        // Mesmo papel do CHECK (current_stock >= 0) do banco
        if new_balance < 0 {
            return Err(AppError::InvalidBalance(i64::from(new_balance)));
        }
        let product = self
            .working
            .products
            .get_mut(&product_id)
            .ok_or(AppError::ProductNotFound(product_id))?;
        product.current_stock = new_balance;
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    async fn commit(mut self: Box<Self>) -> Result<(), AppError> {
        if self.fail_commit {
            return Err(AppError::ConcurrencyConflict("commit falhou (simulado)".to_string()));
        }
        *self.guard = std::mem::take(&mut self.working);
        Ok(())
    }
}
