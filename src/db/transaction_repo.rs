// src/db/transaction_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use crate::{
    common::{
        error::AppError,
        pagination::{PageRequest, SortOrder},
    },
    models::transaction::{
        NewStockTransaction, StockTransaction, TransactionDetail, TransactionFilter,
        TransactionSortField,
    },
};

// Transação + colunas do produto com prefixo (ver ProductSummary)
const DETAIL_SELECT: &str = r#"
    SELECT t.*,
           p.name          AS product_name,
           p.barcode       AS product_barcode,
           p.category      AS product_category,
           p.unit          AS product_unit,
           p.current_stock AS product_current_stock
    FROM stock_transactions t
    JOIN products p ON p.id = t.product_id
"#;

pub(crate) fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &TransactionFilter) {
    qb.push(" WHERE TRUE");

    if let Some(product_id) = filter.product_id {
        qb.push(" AND t.product_id = ").push_bind(product_id);
    }
    if let Some(kind) = filter.kind {
        qb.push(" AND t.transaction_type = ").push_bind(kind);
    }
    if let Some(from) = filter.from {
        qb.push(" AND t.transaction_date >= ").push_bind(from);
    }
    if let Some(until) = filter.until {
        qb.push(" AND t.transaction_date < ").push_bind(until);
    }
}

#[derive(Clone)]
pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Grava uma linha no livro-razão. Só deve ser chamado pelo LedgerUnit,
    /// na mesma transação que atualiza o saldo do produto.
    pub async fn insert<'e, E>(&self, executor: E, input: &NewStockTransaction) -> Result<StockTransaction, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let transaction = sqlx::query_as::<_, StockTransaction>(
            r#"
            INSERT INTO stock_transactions (
                product_id, quantity, transaction_type, reason, notes,
                previous_stock, new_stock, transaction_date, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
            .bind(input.product_id)
            .bind(input.quantity)
            .bind(input.kind)
            .bind(&input.reason)
            .bind(&input.notes)
            .bind(input.previous_stock)
            .bind(input.new_stock)
            .bind(input.transaction_date)
            .bind(&input.created_by)
            .fetch_one(executor)
            .await?;

        Ok(transaction)
    }

    pub async fn find_detail_by_id<'e, E>(&self, executor: E, id: i32) -> Result<Option<TransactionDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let detail = sqlx::query_as::<_, TransactionDetail>(&format!("{DETAIL_SELECT} WHERE t.id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(detail)
    }

    /// Últimas N movimentações de um produto (mais recentes primeiro).
    pub async fn recent_for_product<'e, E>(
        &self,
        executor: E,
        product_id: i32,
        limit: i64,
    ) -> Result<Vec<StockTransaction>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let transactions = sqlx::query_as::<_, StockTransaction>(
            r#"
            SELECT * FROM stock_transactions
            WHERE product_id = $1
            ORDER BY transaction_date DESC, created_at DESC, id DESC
            LIMIT $2
            "#,
        )
            .bind(product_id)
            .bind(limit)
            .fetch_all(executor)
            .await?;
        Ok(transactions)
    }

    /// Todas as movimentações com transaction_date em [from, until).
    pub async fn list_between<'e, E>(
        &self,
        executor: E,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<TransactionDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let transactions = sqlx::query_as::<_, TransactionDetail>(&format!(
            "{DETAIL_SELECT} WHERE t.transaction_date >= $1 AND t.transaction_date < $2 ORDER BY t.transaction_date DESC, t.id DESC"
        ))
            .bind(from)
            .bind(until)
            .fetch_all(executor)
            .await?;
        Ok(transactions)
    }

    /// Listagem paginada com filtros. COUNT + SELECT na pool.
    pub async fn list(
        &self,
        filter: &TransactionFilter,
        sort_by: TransactionSortField,
        order: SortOrder,
        page: PageRequest,
    ) -> Result<(Vec<TransactionDetail>, i64), AppError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM stock_transactions t");
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(DETAIL_SELECT);
        push_filters(&mut qb, filter);
        qb.push(format!(" ORDER BY {} {}, t.id DESC", sort_by.column(), order.sql()));
        qb.push(" LIMIT ").push_bind(i64::from(page.limit));
        qb.push(" OFFSET ").push_bind(page.offset());

        let transactions = qb.build_query_as::<TransactionDetail>().fetch_all(&self.pool).await?;
        Ok((transactions, total))
    }
}
