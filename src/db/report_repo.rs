// src/db/report_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use crate::{
    common::error::AppError,
    db::transaction_repo::push_filters,
    models::{
        reports::{
            CategoryCount, DailyTotals, KindTotals, MachineStatusCount, MachineTypeCount,
            PlanningPriorityCount, PlanningStatusCount,
        },
        transaction::TransactionFilter,
    },
};

// Totais de produtos numa linha só
#[derive(Debug, sqlx::FromRow)]
pub struct ProductTotalsRow {
    pub total_products: i64,
    pub low_stock_products: i64,
    pub total_value: Decimal,
    pub total_stock_value: Decimal,
}

// Contadores da visão geral (/api/stats)
#[derive(Debug, sqlx::FromRow)]
pub struct OverviewRow {
    pub total_products: i64,
    pub total_transactions: i64,
    pub low_stock_products: i64,
    pub today_transactions: i64,
}

#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Transações
    // ---
    // Cada consulta monta seu próprio QueryBuilder; por isso usam a pool direto.

    pub async fn count_transactions(&self, filter: &TransactionFilter) -> Result<i64, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM stock_transactions t");
        push_filters(&mut qb, filter);
        let total: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(total)
    }

    pub async fn totals_by_kind(&self, filter: &TransactionFilter) -> Result<Vec<KindTotals>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT t.transaction_type,
                   COUNT(*) AS count,
                   COALESCE(SUM(t.quantity), 0)::BIGINT AS total_quantity
            FROM stock_transactions t
            "#,
        );
        push_filters(&mut qb, filter);
        qb.push(" GROUP BY t.transaction_type ORDER BY t.transaction_type");

        let rows = qb.build_query_as::<KindTotals>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Contagem e soma por dia (UTC), do dia mais recente para o mais antigo.
    /// Ajustes contam, mas não somam: o quantity deles é saldo-alvo.
    pub async fn totals_by_day(&self, filter: &TransactionFilter) -> Result<Vec<DailyTotals>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT (t.transaction_date AT TIME ZONE 'UTC')::date AS date,
                   COUNT(*) AS count,
                   COALESCE(SUM(t.quantity) FILTER (WHERE t.transaction_type <> 'ADJUSTMENT'), 0)::BIGINT AS total_quantity
            FROM stock_transactions t
            "#,
        );
        push_filters(&mut qb, filter);
        qb.push(" GROUP BY 1 ORDER BY 1 DESC");

        let rows = qb.build_query_as::<DailyTotals>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    // ---
    // Produtos
    // ---

    pub async fn product_totals<'e, E>(&self, executor: E) -> Result<ProductTotalsRow, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, ProductTotalsRow>(
            r#"
            SELECT COUNT(*) AS total_products,
                   COUNT(*) FILTER (WHERE current_stock <= min_stock_level) AS low_stock_products,
                   COALESCE(SUM(price), 0) AS total_value,
                   COALESCE(SUM(price * current_stock), 0) AS total_stock_value
            FROM products
            WHERE is_active = TRUE
            "#,
        )
            .fetch_one(executor)
            .await?;
        Ok(row)
    }

    pub async fn products_by_category<'e, E>(&self, executor: E) -> Result<Vec<CategoryCount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, CategoryCount>(
            r#"
            SELECT category, COUNT(*) AS count
            FROM products
            WHERE is_active = TRUE
            GROUP BY category
            ORDER BY count DESC, category ASC
            "#,
        )
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    // ---
    // Máquinas e planejamentos
    // ---

    pub async fn machines_by_status<'e, E>(&self, executor: E) -> Result<Vec<MachineStatusCount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, MachineStatusCount>(
            "SELECT status, COUNT(*) AS count FROM machines GROUP BY status",
        )
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    pub async fn machines_by_type<'e, E>(&self, executor: E) -> Result<Vec<MachineTypeCount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, MachineTypeCount>(
            r#"
            SELECT machine_type, COUNT(*) AS count
            FROM machines
            GROUP BY machine_type
            ORDER BY count DESC, machine_type ASC
            "#,
        )
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    pub async fn plannings_by_status<'e, E>(&self, executor: E) -> Result<Vec<PlanningStatusCount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, PlanningStatusCount>(
            "SELECT status, COUNT(*) AS count FROM plannings GROUP BY status",
        )
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    pub async fn plannings_by_category<'e, E>(&self, executor: E) -> Result<Vec<CategoryCount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, CategoryCount>(
            r#"
            SELECT category, COUNT(*) AS count
            FROM plannings
            GROUP BY category
            ORDER BY count DESC, category ASC
            "#,
        )
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    pub async fn plannings_by_priority<'e, E>(&self, executor: E) -> Result<Vec<PlanningPriorityCount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, PlanningPriorityCount>(
            "SELECT priority, COUNT(*) AS count FROM plannings GROUP BY priority ORDER BY priority",
        )
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    // ---
    // Visão geral
    // ---

    pub async fn overview<'e, E>(&self, executor: E) -> Result<OverviewRow, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, OverviewRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM products WHERE is_active = TRUE) AS total_products,
                (SELECT COUNT(*) FROM stock_transactions) AS total_transactions,
                (SELECT COUNT(*) FROM products
                  WHERE is_active = TRUE AND current_stock <= min_stock_level) AS low_stock_products,
                (SELECT COUNT(*) FROM stock_transactions
                  WHERE created_at >= date_trunc('day', NOW() AT TIME ZONE 'UTC') AT TIME ZONE 'UTC') AS today_transactions
            "#,
        )
            .fetch_one(executor)
            .await?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        db::{test_db, PgLedgerStore, ProductRepository, TransactionRepository},
        models::transaction::{ApplyTransaction, TransactionKind},
        services::LedgerService,
    };

    fn movement(product_id: i32, quantity: i32, kind: TransactionKind) -> ApplyTransaction {
        ApplyTransaction {
            product_id,
            quantity,
            kind,
            reason: "teste".to_string(),
            notes: None,
            occurred_at: None,
            created_by: None,
        }
    }

    #[tokio::test]
    async fn daily_totals_count_adjustments_without_summing_them() {
        let Some(pool) = test_db::pool().await else { return };
        let ledger = LedgerService::new(Arc::new(PgLedgerStore::new(
            pool.clone(),
            ProductRepository::new(pool.clone()),
            TransactionRepository::new(pool.clone()),
            5000,
        )));

        let product_id = ledger
            .open_product(test_db::new_product(&test_db::unique_barcode()), 10, None)
            .await
            .unwrap()
            .product
            .id;
        ledger.apply_transaction(movement(product_id, 3, TransactionKind::StockOut)).await.unwrap();
        ledger.apply_transaction(movement(product_id, 50, TransactionKind::Adjustment)).await.unwrap();

        let filter = TransactionFilter { product_id: Some(product_id), ..Default::default() };
        let days = ReportRepository::new(pool).totals_by_day(&filter).await.unwrap();

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].count, 3);
        assert_eq!(days[0].total_quantity, 13);
    }
}
