// src/db/machine_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use crate::{
    common::{
        error::AppError,
        pagination::{PageRequest, SortOrder},
    },
    models::machine::{CreateMachineRequest, Machine, MachineFilter, MachineSortField, UpdateMachineRequest},
};

#[derive(Clone)]
pub struct MachineRepository {
    pool: PgPool,
}

// UNIQUE(name) -> erro de domínio
fn map_name_violation(e: sqlx::Error, name: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::MachineNameAlreadyExists(name.to_string());
        }
    }
    e.into()
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &MachineFilter) {
    qb.push(" WHERE TRUE");

    if let Some(term) = filter.search.as_deref().filter(|t| !t.trim().is_empty()) {
        let pattern = format!("%{}%", term.trim());
        qb.push(" AND (name ILIKE ").push_bind(pattern.clone())
            .push(" OR machine_type ILIKE ").push_bind(pattern.clone())
            .push(" OR location ILIKE ").push_bind(pattern)
            .push(")");
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(machine_type) = filter.machine_type.as_deref() {
        qb.push(" AND machine_type = ").push_bind(machine_type.to_string());
    }
}

impl MachineRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i32) -> Result<Option<Machine>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let machine = sqlx::query_as::<_, Machine>("SELECT * FROM machines WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(machine)
    }

    pub async fn list(
        &self,
        filter: &MachineFilter,
        sort_by: MachineSortField,
        order: SortOrder,
        page: PageRequest,
    ) -> Result<(Vec<Machine>, i64), AppError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM machines");
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM machines");
        push_filters(&mut qb, filter);
        qb.push(format!(" ORDER BY {} {}, id ASC", sort_by.column(), order.sql()));
        qb.push(" LIMIT ").push_bind(i64::from(page.limit));
        qb.push(" OFFSET ").push_bind(page.offset());

        let machines = qb.build_query_as::<Machine>().fetch_all(&self.pool).await?;
        Ok((machines, total))
    }

    pub async fn create<'e, E>(&self, executor: E, input: &CreateMachineRequest) -> Result<Machine, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Machine>(
            r#"
            INSERT INTO machines (
                name, machine_type, status, location, description, purchase_date, warranty_expiry,
                maintenance_interval_days, last_maintenance_date, next_maintenance_date, specifications
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
            .bind(input.name.trim())
            .bind(input.machine_type.trim())
            .bind(input.status)
            .bind(&input.location)
            .bind(&input.description)
            .bind(input.purchase_date)
            .bind(input.warranty_expiry)
            .bind(input.maintenance_interval_days)
            .bind(input.last_maintenance_date)
            .bind(input.next_maintenance_date)
            .bind(&input.specifications)
            .fetch_one(executor)
            .await
            .map_err(|e| map_name_violation(e, &input.name))
    }

    /// Atualização parcial: campos ausentes mantêm o valor atual.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: i32,
        changes: &UpdateMachineRequest,
    ) -> Result<Option<Machine>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let name = changes.name.as_deref().map(str::trim);

        sqlx::query_as::<_, Machine>(
            r#"
            UPDATE machines SET
                name                      = COALESCE($2, name),
                machine_type              = COALESCE($3, machine_type),
                status                    = COALESCE($4, status),
                location                  = COALESCE($5, location),
                description               = COALESCE($6, description),
                purchase_date             = COALESCE($7, purchase_date),
                warranty_expiry           = COALESCE($8, warranty_expiry),
                maintenance_interval_days = COALESCE($9, maintenance_interval_days),
                last_maintenance_date     = COALESCE($10, last_maintenance_date),
                next_maintenance_date     = COALESCE($11, next_maintenance_date),
                specifications            = COALESCE($12, specifications),
                updated_at                = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(name)
            .bind(changes.machine_type.as_deref().map(str::trim))
            .bind(changes.status)
            .bind(&changes.location)
            .bind(&changes.description)
            .bind(changes.purchase_date)
            .bind(changes.warranty_expiry)
            .bind(changes.maintenance_interval_days)
            .bind(changes.last_maintenance_date)
            .bind(changes.next_maintenance_date)
            .bind(&changes.specifications)
            .fetch_optional(executor)
            .await
            .map_err(|e| map_name_violation(e, name.unwrap_or_default()))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: i32) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM machines WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
