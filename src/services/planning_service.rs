// src/services/planning_service.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use crate::{
    common::{
        error::AppError,
        pagination::{PageRequest, Paginated, SortOrder},
    },
    db::PlanningRepository,
    models::planning::{
        CreatePlanningRequest, Planning, PlanningFilter, PlanningSortField, PlanningStatus,
        UpdatePlanningRequest,
    },
};

/// Valor de `completed_at` depois de uma mudança de status.
/// Entrar em `completed` vindo de outro status carimba `now`; o resto preserva o valor atual.
pub fn completion_timestamp(
    previous: PlanningStatus,
    next: Option<PlanningStatus>,
    current: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match next {
        Some(PlanningStatus::Completed) if previous != PlanningStatus::Completed => Some(now),
        _ => current,
    }
}

#[derive(Clone)]
pub struct PlanningService {
    pool: PgPool,
    repo: PlanningRepository,
}

impl PlanningService {
    pub fn new(pool: PgPool, repo: PlanningRepository) -> Self {
        Self { pool, repo }
    }

    pub async fn list(
        &self,
        filter: &PlanningFilter,
        sort_by: PlanningSortField,
        order: SortOrder,
        page: PageRequest,
    ) -> Result<Paginated<Planning>, AppError> {
        let (items, total) = self.repo.list(filter, sort_by, order, page).await?;
        Ok(Paginated::new(items, page, total))
    }

    pub async fn get(&self, id: i32) -> Result<Planning, AppError> {
        self.repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::PlanningNotFound(id))
    }

    pub async fn categories(&self) -> Result<Vec<String>, AppError> {
        self.repo.get_categories(&self.pool).await
    }

    pub async fn create(&self, input: &CreatePlanningRequest) -> Result<Planning, AppError> {
        // Criado já como concluído também ganha o carimbo
        let completed_at = (input.status == PlanningStatus::Completed).then(Utc::now);
        let planning = self.repo.create(&self.pool, input, completed_at).await?;

        tracing::info!(planning_id = planning.id, "Planejamento criado");
        Ok(planning)
    }

    pub async fn update(&self, id: i32, changes: &UpdatePlanningRequest) -> Result<Planning, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::PlanningNotFound(id))?;

        let completed_at = completion_timestamp(current.status, changes.status, current.completed_at, Utc::now());

        let planning = self
            .repo
            .update(&mut *tx, id, changes, completed_at)
            .await?
            .ok_or(AppError::PlanningNotFound(id))?;

        tx.commit().await?;
        Ok(planning)
    }

    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        if !self.repo.delete(&self.pool, id).await? {
            return Err(AppError::PlanningNotFound(id));
        }
        tracing::info!(planning_id = id, "Planejamento removido");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn entering_completed_stamps_now() {
        let now = Utc::now();
        let stamped = completion_timestamp(PlanningStatus::InProgress, Some(PlanningStatus::Completed), None, now);
        assert_eq!(stamped, Some(now));
    }

    #[test]
    fn staying_completed_keeps_the_original_stamp() {
        let earlier = Utc::now() - Duration::days(3);
        let now = Utc::now();
        let stamped = completion_timestamp(
            PlanningStatus::Completed,
            Some(PlanningStatus::Completed),
            Some(earlier),
            now,
        );
        assert_eq!(stamped, Some(earlier));
    }

    #[test]
    fn other_changes_preserve_current_value() {
        let now = Utc::now();
        assert_eq!(completion_timestamp(PlanningStatus::Pending, None, None, now), None);
        assert_eq!(
            completion_timestamp(PlanningStatus::Pending, Some(PlanningStatus::Cancelled), None, now),
            None
        );

        let earlier = now - Duration::hours(1);
        assert_eq!(
            completion_timestamp(PlanningStatus::Completed, Some(PlanningStatus::InProgress), Some(earlier), now),
            Some(earlier)
        );
    }
}
