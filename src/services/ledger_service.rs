// src/services/ledger_service.rs
//
// Único caminho para alterar o saldo de um produto: toda mudança vira uma
// linha no livro-razão, gravada na mesma unidade atômica que o novo saldo.

use std::sync::Arc;

use chrono::Utc;

use crate::{
    common::error::AppError,
    db::{LedgerStore, LedgerUnit},
    models::{
        product::NewProduct,
        transaction::{
            ApplyTransaction, LedgerEntry, NewStockTransaction, OpenedProduct, TransactionKind,
            DEFAULT_CREATED_BY,
        },
    },
};

pub const INITIAL_STOCK_REASON: &str = "Initial stock";

/// Calcula o saldo resultante de uma movimentação.
///
/// - `StockIn`/`StockOut` exigem quantidade positiva.
/// - `StockOut` maior que o saldo falha com `InsufficientStock`.
/// - `Adjustment` usa `quantity` como o saldo final desejado.
///
/// Qualquer resultado negativo ou fora do alcance de `i32` é `InvalidBalance`.
pub fn compute_new_balance(previous: i32, quantity: i32, kind: TransactionKind) -> Result<i32, AppError> {
    let new_balance = match kind {
        TransactionKind::StockIn => {
            if quantity <= 0 {
                return Err(AppError::InvalidQuantity(quantity));
            }
            i64::from(previous) + i64::from(quantity)
        }
        TransactionKind::StockOut => {
            if quantity <= 0 {
                return Err(AppError::InvalidQuantity(quantity));
            }
            if previous < quantity {
                return Err(AppError::InsufficientStock { available: previous, requested: quantity });
            }
            i64::from(previous) - i64::from(quantity)
        }
        TransactionKind::Adjustment => i64::from(quantity),
    };

    if new_balance < 0 {
        return Err(AppError::InvalidBalance(new_balance));
    }
    i32::try_from(new_balance).map_err(|_| AppError::InvalidBalance(new_balance))
}

#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn LedgerStore>,
}

impl LedgerService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    // --- APPLY TRANSACTION ---
    pub async fn apply_transaction(&self, cmd: ApplyTransaction) -> Result<LedgerEntry, AppError> {
        let mut unit = self.store.begin().await?;

        // Em caso de erro a unidade é descartada aqui mesmo (rollback).
        let entry = Self::apply_in_unit(unit.as_mut(), cmd).await?;

        unit.commit().await?;

        tracing::info!(
            product_id = entry.product.id,
            transaction_id = entry.transaction.id,
            kind = entry.transaction.transaction_type.as_str(),
            previous = entry.transaction.previous_stock,
            new = entry.transaction.new_stock,
            "Transação de estoque aplicada"
        );
        Ok(entry)
    }

    // --- OPEN PRODUCT ---
    /// Cria o produto com saldo zero e, se `initial_stock > 0`, registra a
    /// entrada inicial na mesma unidade.
    pub async fn open_product(
        &self,
        input: NewProduct,
        initial_stock: i32,
        created_by: Option<String>,
    ) -> Result<OpenedProduct, AppError> {
        if initial_stock < 0 {
            return Err(AppError::InvalidQuantity(initial_stock));
        }

        let mut unit = self.store.begin().await?;
        let product = unit.insert_product(&input).await?;

        let opened = if initial_stock > 0 {
            let entry = Self::apply_in_unit(
                unit.as_mut(),
                ApplyTransaction {
                    product_id: product.id,
                    quantity: initial_stock,
                    kind: TransactionKind::StockIn,
                    reason: INITIAL_STOCK_REASON.to_string(),
                    notes: None,
                    occurred_at: None,
                    created_by,
                },
            )
            .await?;
            OpenedProduct { product: entry.product, opening_transaction: Some(entry.transaction) }
        } else {
            OpenedProduct { product, opening_transaction: None }
        };

        unit.commit().await?;

        tracing::info!(
            product_id = opened.product.id,
            barcode = %opened.product.barcode,
            initial_stock,
            "Produto cadastrado"
        );
        Ok(opened)
    }

    // Lock, cálculo e escrita. Não faz commit: quem abriu a unidade decide.
    async fn apply_in_unit(unit: &mut dyn LedgerUnit, cmd: ApplyTransaction) -> Result<LedgerEntry, AppError> {
        let product = unit
            .get_for_update(cmd.product_id)
            .await?
            .filter(|p| p.is_active)
            .ok_or(AppError::ProductNotFound(cmd.product_id))?;

        let new_balance = match compute_new_balance(product.current_stock, cmd.quantity, cmd.kind) {
            Ok(balance) => balance,
            Err(e) => {
                tracing::debug!(product_id = product.id, kind = cmd.kind.as_str(), error = %e, "Movimentação recusada");
                return Err(e);
            }
        };

        let created_by = cmd
            .created_by
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CREATED_BY.to_string());

        let transaction = unit
            .insert_transaction(&NewStockTransaction {
                product_id: product.id,
                quantity: cmd.quantity,
                kind: cmd.kind,
                reason: cmd.reason,
                notes: cmd.notes,
                previous_stock: product.current_stock,
                new_stock: new_balance,
                transaction_date: cmd.occurred_at.unwrap_or_else(Utc::now),
                created_by,
            })
            .await?;

        let product = unit.update_balance(product.id, new_balance).await?;

        Ok(LedgerEntry { transaction, product })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_store::MemoryLedgerStore;
    use rust_decimal::Decimal;

    fn service(store: &MemoryLedgerStore) -> LedgerService {
        LedgerService::new(Arc::new(store.clone()))
    }

    fn cmd(product_id: i32, quantity: i32, kind: TransactionKind, reason: &str) -> ApplyTransaction {
        ApplyTransaction {
            product_id,
            quantity,
            kind,
            reason: reason.to_string(),
            notes: None,
            occurred_at: None,
            created_by: None,
        }
    }

    fn new_product(barcode: &str) -> NewProduct {
        NewProduct {
            barcode: barcode.to_string(),
            name: "Parafuso M8".to_string(),
            description: String::new(),
            category: "Ferragens".to_string(),
            price: Decimal::new(1250, 2),
            min_stock_level: 5,
            unit: "pcs".to_string(),
        }
    }

    // --- cálculo puro ---

    #[test]
    fn stock_in_adds_and_stock_out_subtracts() {
        assert_eq!(compute_new_balance(10, 5, TransactionKind::StockIn).unwrap(), 15);
        assert_eq!(compute_new_balance(10, 3, TransactionKind::StockOut).unwrap(), 7);
        assert_eq!(compute_new_balance(10, 10, TransactionKind::StockOut).unwrap(), 0);
    }

    #[test]
    fn adjustment_sets_the_target_balance() {
        assert_eq!(compute_new_balance(7, 4, TransactionKind::Adjustment).unwrap(), 4);
        assert_eq!(compute_new_balance(7, 0, TransactionKind::Adjustment).unwrap(), 0);
        assert_eq!(compute_new_balance(0, 50, TransactionKind::Adjustment).unwrap(), 50);
    }

    #[test]
    fn rejects_non_positive_in_and_out_quantities() {
        assert!(matches!(
            compute_new_balance(10, 0, TransactionKind::StockIn),
            Err(AppError::InvalidQuantity(0))
        ));
        assert!(matches!(
            compute_new_balance(10, -2, TransactionKind::StockOut),
            Err(AppError::InvalidQuantity(-2))
        ));
    }

    #[test]
    fn stock_out_beyond_balance_is_insufficient() {
        assert!(matches!(
            compute_new_balance(4, 20, TransactionKind::StockOut),
            Err(AppError::InsufficientStock { available: 4, requested: 20 })
        ));
    }

    #[test]
    fn negative_target_and_overflow_are_invalid_balances() {
        assert!(matches!(
            compute_new_balance(5, -1, TransactionKind::Adjustment),
            Err(AppError::InvalidBalance(-1))
        ));
        assert!(matches!(
            compute_new_balance(i32::MAX, 1, TransactionKind::StockIn),
            Err(AppError::InvalidBalance(_))
        ));
    }

    // --- aplicação no livro-razão ---

    #[tokio::test]
    async fn stock_in_records_previous_and_new_balance() {
        let store = MemoryLedgerStore::new();
        let product = store.seed_product("A1", 10, 5).await;

        let entry = service(&store)
            .apply_transaction(cmd(product.id, 5, TransactionKind::StockIn, "compra"))
            .await
            .unwrap();

        assert_eq!(entry.transaction.previous_stock, 10);
        assert_eq!(entry.transaction.new_stock, 15);
        assert_eq!(entry.transaction.created_by, DEFAULT_CREATED_BY);
        assert_eq!(entry.product.current_stock, 15);
        assert_eq!(store.product(product.id).await.unwrap().current_stock, 15);
        assert_eq!(store.transactions().await.len(), 1);
    }

    #[tokio::test]
    async fn sale_then_recount_leaves_product_low_on_stock() {
        let store = MemoryLedgerStore::new();
        let product = store.seed_product("A1", 10, 5).await;
        let ledger = service(&store);

        let sale = ledger
            .apply_transaction(cmd(product.id, 3, TransactionKind::StockOut, "sale"))
            .await
            .unwrap();
        assert_eq!((sale.transaction.previous_stock, sale.transaction.new_stock), (10, 7));

        let recount = ledger
            .apply_transaction(cmd(product.id, 4, TransactionKind::Adjustment, "recount"))
            .await
            .unwrap();
        assert_eq!((recount.transaction.previous_stock, recount.transaction.new_stock), (7, 4));
        assert_eq!(recount.transaction.quantity, 4);
        assert!(recount.product.is_low_stock());
    }

    #[tokio::test]
    async fn failed_stock_out_changes_nothing() {
        let store = MemoryLedgerStore::new();
        let product = store.seed_product("A1", 4, 5).await;

        let err = service(&store)
            .apply_transaction(cmd(product.id, 20, TransactionKind::StockOut, "sale"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InsufficientStock { available: 4, requested: 20 }));
        assert_eq!(store.product(product.id).await.unwrap().current_stock, 4);
        assert!(store.transactions().await.is_empty());
    }

    #[tokio::test]
    async fn failed_commit_rolls_back_both_writes() {
        let store = MemoryLedgerStore::new();
        let product = store.seed_product("A1", 10, 5).await;
        store.fail_next_commit();

        let err = service(&store)
            .apply_transaction(cmd(product.id, 5, TransactionKind::StockIn, "compra"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ConcurrencyConflict(_)));
        assert_eq!(store.product(product.id).await.unwrap().current_stock, 10);
        assert!(store.transactions().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_or_inactive_products_are_not_found() {
        let store = MemoryLedgerStore::new();
        let product = store.seed_product("A1", 10, 5).await;
        store.deactivate(product.id).await;
        let ledger = service(&store);

        let err = ledger
            .apply_transaction(cmd(product.id, 1, TransactionKind::StockIn, "compra"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ProductNotFound(id) if id == product.id));

        let err = ledger
            .apply_transaction(cmd(999, 1, TransactionKind::StockIn, "compra"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ProductNotFound(999)));
        assert!(store.transactions().await.is_empty());
    }

    #[tokio::test]
    async fn keeps_explicit_timestamp_and_creator() {
        let store = MemoryLedgerStore::new();
        let product = store.seed_product("A1", 0, 0).await;
        let occurred_at = "2025-03-01T12:00:00Z".parse().unwrap();

        let mut command = cmd(product.id, 2, TransactionKind::StockIn, "compra");
        command.occurred_at = Some(occurred_at);
        command.created_by = Some("maria".to_string());

        let entry = service(&store).apply_transaction(command).await.unwrap();
        assert_eq!(entry.transaction.transaction_date, occurred_at);
        assert_eq!(entry.transaction.created_by, "maria");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_stock_outs_never_oversell() {
        let store = MemoryLedgerStore::new();
        let product_id = store.seed_product("A1", 9, 0).await.id;
        let ledger = service(&store);

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let ledger = ledger.clone();
                tokio::spawn(async move {
                    ledger.apply_transaction(cmd(product_id, 5, TransactionKind::StockOut, "sale")).await
                })
            })
            .collect();

        let mut ok = 0;
        let mut insufficient = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(AppError::InsufficientStock { .. }) => insufficient += 1,
                Err(other) => panic!("erro inesperado: {other}"),
            }
        }

        assert_eq!((ok, insufficient), (1, 1));
        assert_eq!(store.product(product_id).await.unwrap().current_stock, 4);
        assert_eq!(store.transactions().await.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_stock_ins_lose_no_updates() {
        let store = MemoryLedgerStore::new();
        let product_id = store.seed_product("A1", 0, 0).await.id;
        let ledger = service(&store);

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let ledger = ledger.clone();
                tokio::spawn(async move {
                    ledger.apply_transaction(cmd(product_id, 1, TransactionKind::StockIn, "compra")).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.product(product_id).await.unwrap().current_stock, 20);
        let mut balances: Vec<i32> = store.transactions().await.iter().map(|t| t.new_stock).collect();
        balances.sort_unstable();
        assert_eq!(balances, (1..=20).collect::<Vec<_>>());
    }

    // --- cadastro com estoque inicial ---

    #[tokio::test]
    async fn open_product_with_initial_stock_writes_one_entry() {
        let store = MemoryLedgerStore::new();

        let opened = service(&store)
            .open_product(new_product("789"), 12, Some("joao".to_string()))
            .await
            .unwrap();

        assert_eq!(opened.product.current_stock, 12);
        let opening = opened.opening_transaction.unwrap();
        assert_eq!(opening.transaction_type, TransactionKind::StockIn);
        assert_eq!((opening.previous_stock, opening.new_stock), (0, 12));
        assert_eq!(opening.reason, INITIAL_STOCK_REASON);
        assert_eq!(opening.created_by, "joao");
        assert_eq!(store.transactions().await.len(), 1);
    }

    #[tokio::test]
    async fn open_product_without_stock_writes_no_entry() {
        let store = MemoryLedgerStore::new();

        let opened = service(&store).open_product(new_product("789"), 0, None).await.unwrap();

        assert_eq!(opened.product.current_stock, 0);
        assert!(opened.opening_transaction.is_none());
        assert!(store.transactions().await.is_empty());
    }

    #[tokio::test]
    async fn open_product_rejects_duplicate_barcode() {
        let store = MemoryLedgerStore::new();
        store.seed_product("789", 1, 0).await;

        let err = service(&store).open_product(new_product("789"), 5, None).await.unwrap_err();

        assert!(matches!(err, AppError::BarcodeAlreadyExists(ref b) if b == "789"));
        assert!(store.transactions().await.is_empty());
    }
}
