pub mod ledger_service;
pub use ledger_service::LedgerService;
pub mod product_service;
pub use product_service::ProductService;
pub mod transaction_service;
pub use transaction_service::TransactionService;
pub mod report_service;
pub use report_service::ReportService;
pub mod machine_service;
pub use machine_service::MachineService;
pub mod planning_service;
pub use planning_service::PlanningService;
