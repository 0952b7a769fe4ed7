pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod transaction_repo;
pub use transaction_repo::TransactionRepository;
pub mod machine_repo;
pub use machine_repo::MachineRepository;
pub mod planning_repo;
pub use planning_repo::PlanningRepository;
pub mod report_repo;
pub use report_repo::ReportRepository;

pub mod ledger_store;
pub use ledger_store::{LedgerStore, LedgerUnit, PgLedgerStore};

#[cfg(test)]
pub mod memory_store;

#[cfg(test)]
pub(crate) mod test_db;
