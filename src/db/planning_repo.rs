// src/db/planning_repo.rs

use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use crate::{
    common::{
        error::AppError,
        pagination::{PageRequest, SortOrder},
    },
    models::planning::{
        CreatePlanningRequest, Planning, PlanningFilter, PlanningSortField, UpdatePlanningRequest,
        DEFAULT_CATEGORY,
    },
};

#[derive(Clone)]
pub struct PlanningRepository {
    pool: PgPool,
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &PlanningFilter) {
    qb.push(" WHERE TRUE");

    if let Some(term) = filter.search.as_deref().filter(|t| !t.trim().is_empty()) {
        let pattern = format!("%{}%", term.trim());
        qb.push(" AND (title ILIKE ").push_bind(pattern.clone())
            .push(" OR description ILIKE ").push_bind(pattern.clone())
            .push(" OR assigned_to ILIKE ").push_bind(pattern)
            .push(")");
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(category) = filter.category.as_deref() {
        qb.push(" AND category = ").push_bind(category.to_string());
    }
    if let Some(priority) = filter.priority {
        qb.push(" AND priority = ").push_bind(priority);
    }
}

impl PlanningRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i32) -> Result<Option<Planning>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let planning = sqlx::query_as::<_, Planning>("SELECT * FROM plannings WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(planning)
    }

    /// Lê com lock, para o update decidir o completed_at sem corrida.
    pub async fn find_for_update<'e, E>(&self, executor: E, id: i32) -> Result<Option<Planning>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let planning = sqlx::query_as::<_, Planning>("SELECT * FROM plannings WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(planning)
    }

    pub async fn get_categories<'e, E>(&self, executor: E) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let categories = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT category FROM plannings ORDER BY category ASC",
        )
            .fetch_all(executor)
            .await?;
        Ok(categories)
    }

    pub async fn list(
        &self,
        filter: &PlanningFilter,
        sort_by: PlanningSortField,
        order: SortOrder,
        page: PageRequest,
    ) -> Result<(Vec<Planning>, i64), AppError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM plannings");
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM plannings");
        push_filters(&mut qb, filter);
        qb.push(format!(" ORDER BY {} {} NULLS LAST, id ASC", sort_by.column(), order.sql()));
        qb.push(" LIMIT ").push_bind(i64::from(page.limit));
        qb.push(" OFFSET ").push_bind(page.offset());

        let plannings = qb.build_query_as::<Planning>().fetch_all(&self.pool).await?;
        Ok((plannings, total))
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        input: &CreatePlanningRequest,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Planning, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let planning = sqlx::query_as::<_, Planning>(
            r#"
            INSERT INTO plannings (
                title, description, category, priority, status, start_date, end_date, due_date,
                completed_at, assigned_to, estimated_hours, actual_hours, budget, actual_cost,
                notes, tags, materials, attachments
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING *
            "#,
        )
            .bind(input.title.trim())
            .bind(&input.description)
            .bind(input.category.as_deref().unwrap_or(DEFAULT_CATEGORY))
            .bind(input.priority)
            .bind(input.status)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.due_date)
            .bind(completed_at)
            .bind(&input.assigned_to)
            .bind(input.estimated_hours)
            .bind(input.actual_hours)
            .bind(input.budget)
            .bind(input.actual_cost)
            .bind(&input.notes)
            .bind(&input.tags)
            .bind(input.materials.clone().unwrap_or_else(|| json!([])))
            .bind(input.attachments.clone().unwrap_or_else(|| json!([])))
            .fetch_one(executor)
            .await?;
        Ok(planning)
    }

    /// Atualização parcial. completed_at é decidido pelo serviço e gravado como veio.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: i32,
        changes: &UpdatePlanningRequest,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Planning>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let planning = sqlx::query_as::<_, Planning>(
            r#"
            UPDATE plannings SET
                title           = COALESCE($2, title),
                description     = COALESCE($3, description),
                category        = COALESCE($4, category),
                priority        = COALESCE($5, priority),
                status          = COALESCE($6, status),
                start_date      = COALESCE($7, start_date),
                end_date        = COALESCE($8, end_date),
                due_date        = COALESCE($9, due_date),
                assigned_to     = COALESCE($10, assigned_to),
                estimated_hours = COALESCE($11, estimated_hours),
                actual_hours    = COALESCE($12, actual_hours),
                budget          = COALESCE($13, budget),
                actual_cost     = COALESCE($14, actual_cost),
                notes           = COALESCE($15, notes),
                tags            = COALESCE($16, tags),
                materials       = COALESCE($17, materials),
                attachments     = COALESCE($18, attachments),
                completed_at    = $19,
                updated_at      = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(changes.title.as_deref().map(str::trim))
            .bind(&changes.description)
            .bind(&changes.category)
            .bind(changes.priority)
            .bind(changes.status)
            .bind(changes.start_date)
            .bind(changes.end_date)
            .bind(changes.due_date)
            .bind(&changes.assigned_to)
            .bind(changes.estimated_hours)
            .bind(changes.actual_hours)
            .bind(changes.budget)
            .bind(changes.actual_cost)
            .bind(&changes.notes)
            .bind(&changes.tags)
            .bind(&changes.materials)
            .bind(&changes.attachments)
            .bind(completed_at)
            .fetch_optional(executor)
            .await?;
        Ok(planning)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: i32) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM plannings WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
