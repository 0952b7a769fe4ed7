// src/services/machine_service.rs

use sqlx::PgPool;
use crate::{
    common::{
        error::AppError,
        pagination::{PageRequest, Paginated, SortOrder},
    },
    db::MachineRepository,
    models::machine::{CreateMachineRequest, Machine, MachineFilter, MachineSortField, UpdateMachineRequest},
};

#[derive(Clone)]
pub struct MachineService {
    pool: PgPool,
    repo: MachineRepository,
}

impl MachineService {
    pub fn new(pool: PgPool, repo: MachineRepository) -> Self {
        Self { pool, repo }
    }

    pub async fn list(
        &self,
        filter: &MachineFilter,
        sort_by: MachineSortField,
        order: SortOrder,
        page: PageRequest,
    ) -> Result<Paginated<Machine>, AppError> {
        let (items, total) = self.repo.list(filter, sort_by, order, page).await?;
        Ok(Paginated::new(items, page, total))
    }

    pub async fn get(&self, id: i32) -> Result<Machine, AppError> {
        self.repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or(AppError::MachineNotFound(id))
    }

    pub async fn create(&self, input: &CreateMachineRequest) -> Result<Machine, AppError> {
        let machine = self.repo.create(&self.pool, input).await?;
        tracing::info!(machine_id = machine.id, name = %machine.name, "Máquina cadastrada");
        Ok(machine)
    }

    pub async fn update(&self, id: i32, changes: &UpdateMachineRequest) -> Result<Machine, AppError> {
        self.repo
            .update(&self.pool, id, changes)
            .await?
            .ok_or(AppError::MachineNotFound(id))
    }

    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        if !self.repo.delete(&self.pool, id).await? {
            return Err(AppError::MachineNotFound(id));
        }
        tracing::info!(machine_id = id, "Máquina removida");
        Ok(())
    }
}
