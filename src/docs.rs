// src/docs.rs

use utoipa::OpenApi;
use crate::common;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "Stock Ledger API", description = "Estoque com livro-razão, máquinas e planejamento"),
    paths(
        // --- System ---
        handlers::system::health,
        handlers::system::info,
        handlers::system::stats,

        // --- Products ---
        handlers::products::list_products,
        handlers::products::create_product,
        handlers::products::list_categories,
        handlers::products::list_low_stock,
        handlers::products::product_statistics,
        handlers::products::get_product_by_barcode,
        handlers::products::get_product,
        handlers::products::update_product,
        handlers::products::delete_product,

        // --- Transactions ---
        handlers::transactions::create_transaction,
        handlers::transactions::list_transactions,
        handlers::transactions::list_transaction_types,
        handlers::transactions::transaction_statistics,
        handlers::transactions::daily_summary,
        handlers::transactions::list_product_transactions,
        handlers::transactions::get_transaction,

        // --- Machines ---
        handlers::machines::list_machines,
        handlers::machines::create_machine,
        handlers::machines::machine_statistics,
        handlers::machines::get_machine,
        handlers::machines::update_machine,
        handlers::machines::delete_machine,

        // --- Plannings ---
        handlers::plannings::list_plannings,
        handlers::plannings::create_planning,
        handlers::plannings::planning_statistics,
        handlers::plannings::list_planning_categories,
        handlers::plannings::get_planning,
        handlers::plannings::update_planning,
        handlers::plannings::delete_planning,
    ),
    components(
        schemas(
            // --- Common ---
            common::pagination::PageInfo,
            common::pagination::SortOrder,

            // --- Products ---
            models::product::Product,
            models::product::ProductSummary,
            models::product::ProductWithHistory,
            models::product::ProductSortField,
            handlers::products::CreateProductPayload,
            handlers::products::UpdateProductPayload,

            // --- Transactions ---
            models::transaction::TransactionKind,
            models::transaction::StockTransaction,
            models::transaction::TransactionDetail,
            models::transaction::LedgerEntry,
            models::transaction::OpenedProduct,
            models::transaction::TransactionKindInfo,
            models::transaction::TransactionSortField,
            handlers::transactions::CreateTransactionPayload,

            // --- Reports ---
            models::reports::KindTotals,
            models::reports::DailyTotals,
            models::reports::TransactionStatistics,
            models::reports::DailySummary,
            models::reports::CategoryCount,
            models::reports::ProductStatistics,
            models::reports::MachineTypeCount,
            models::reports::MachineStatistics,
            models::reports::PlanningPriorityCount,
            models::reports::PlanningStatistics,
            models::reports::ApiOverview,

            // --- Machines ---
            models::machine::MachineStatus,
            models::machine::Machine,
            models::machine::CreateMachineRequest,
            models::machine::UpdateMachineRequest,
            models::machine::MachineSortField,

            // --- Plannings ---
            models::planning::PlanningPriority,
            models::planning::PlanningStatus,
            models::planning::Planning,
            models::planning::CreatePlanningRequest,
            models::planning::UpdatePlanningRequest,
            models::planning::PlanningSortField,

            // --- System ---
            handlers::system::HealthResponse,
            handlers::system::ServiceInfo,
        )
    ),
    tags(
        (name = "System", description = "Saúde e informações do serviço"),
        (name = "Products", description = "Cadastro de produtos"),
        (name = "Transactions", description = "Livro-razão de movimentações de estoque"),
        (name = "Machines", description = "Máquinas e manutenção"),
        (name = "Plannings", description = "Planejamento de tarefas")
    )
)]
pub struct ApiDoc;
