// src/db/product_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use crate::{
    common::{
        error::AppError,
        pagination::{PageRequest, SortOrder},
    },
    models::product::{NewProduct, Product, ProductChanges, ProductFilter, ProductSortField},
};

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

// Converte violação de UNIQUE(barcode) no erro de domínio.
fn map_barcode_violation(e: sqlx::Error, barcode: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::BarcodeAlreadyExists(barcode.to_string());
        }
    }
    e.into()
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    qb.push(" WHERE is_active = TRUE");

    if let Some(term) = filter.search.as_deref().filter(|t| !t.trim().is_empty()) {
        let pattern = format!("%{}%", term.trim());
        qb.push(" AND (name ILIKE ").push_bind(pattern.clone())
            .push(" OR barcode ILIKE ").push_bind(pattern.clone())
            .push(" OR category ILIKE ").push_bind(pattern.clone())
            .push(" OR description ILIKE ").push_bind(pattern)
            .push(")");
    }

    if let Some(category) = filter.category.as_deref() {
        qb.push(" AND category = ").push_bind(category.to_string());
    }

    if filter.low_stock {
        qb.push(" AND current_stock <= min_stock_level");
    }
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura
    // ---

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i32) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE id = $1 AND is_active = TRUE",
        )
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    pub async fn find_by_barcode<'e, E>(&self, executor: E, barcode: &str) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE barcode = $1 AND is_active = TRUE",
        )
            .bind(barcode)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    /// Produtos ativos com saldo <= mínimo, do menor saldo para o maior.
    pub async fn find_low_stock<'e, E>(&self, executor: E) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE is_active = TRUE AND current_stock <= min_stock_level
            ORDER BY current_stock ASC, name ASC
            "#,
        )
            .fetch_all(executor)
            .await?;
        Ok(products)
    }

    pub async fn get_categories<'e, E>(&self, executor: E) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let categories = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT category FROM products WHERE is_active = TRUE ORDER BY category ASC",
        )
            .fetch_all(executor)
            .await?;
        Ok(categories)
    }

    /// Listagem paginada. Faz COUNT + SELECT, por isso usa a pool direto.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        sort_by: ProductSortField,
        order: SortOrder,
        page: PageRequest,
    ) -> Result<(Vec<Product>, i64), AppError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products");
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM products");
        push_filters(&mut qb, filter);
        // Coluna e direção vêm de enums (whitelist), nunca do texto do usuário.
        qb.push(format!(" ORDER BY {} {}, id ASC", sort_by.column(), order.sql()));
        qb.push(" LIMIT ").push_bind(i64::from(page.limit));
        qb.push(" OFFSET ").push_bind(page.offset());

        let products = qb.build_query_as::<Product>().fetch_all(&self.pool).await?;
        Ok((products, total))
    }

    // ---
    // Escrita (rodam dentro de transação quando o chamador quiser)
    // ---

    /// Insere o produto com saldo zero. Estoque inicial é responsabilidade do livro-razão.
    pub async fn create<'e, E>(&self, executor: E, input: &NewProduct) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (barcode, name, description, category, price, current_stock, min_stock_level, unit)
            VALUES ($1, $2, $3, $4, $5, 0, $6, $7)
            RETURNING *
            "#,
        )
            .bind(&input.barcode)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.category)
            .bind(input.price)
            .bind(input.min_stock_level)
            .bind(&input.unit)
            .fetch_one(executor)
            .await
            .map_err(|e| map_barcode_violation(e, &input.barcode))
    }

    /// Lê o produto travando a linha (FOR UPDATE) até o fim da transação.
    /// Não filtra por is_active: quem decide é o livro-razão.
    pub async fn get_for_update<'e, E>(&self, executor: E, id: i32) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    pub async fn update_balance<'e, E>(&self, executor: E, id: i32, new_balance: i32) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET current_stock = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(new_balance)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::ProductNotFound(id))
    }

    /// Atualização parcial. O saldo não é alterável por aqui.
    pub async fn update<'e, E>(&self, executor: E, id: i32, changes: &ProductChanges) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let barcode = changes.barcode.clone().unwrap_or_default();

        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                barcode         = COALESCE($2, barcode),
                name            = COALESCE($3, name),
                description     = COALESCE($4, description),
                category        = COALESCE($5, category),
                price           = COALESCE($6, price),
                min_stock_level = COALESCE($7, min_stock_level),
                unit            = COALESCE($8, unit),
                is_active       = COALESCE($9, is_active),
                updated_at      = NOW()
            WHERE id = $1 AND is_active = TRUE
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(&changes.barcode)
            .bind(&changes.name)
            .bind(&changes.description)
            .bind(&changes.category)
            .bind(changes.price)
            .bind(changes.min_stock_level)
            .bind(&changes.unit)
            .bind(changes.is_active)
            .fetch_optional(executor)
            .await
            .map_err(|e| map_barcode_violation(e, &barcode))
    }

    /// Desativa o produto. O histórico continua lá.
    pub async fn soft_remove<'e, E>(&self, executor: E, id: i32) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE products SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND is_active = TRUE",
        )
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove de vez. As transações caem junto (ON DELETE CASCADE).
    pub async fn remove<'e, E>(&self, executor: E, id: i32) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
