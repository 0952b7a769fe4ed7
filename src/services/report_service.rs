// src/services/report_service.rs

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;
use crate::{
    common::error::AppError,
    db::{ReportRepository, TransactionRepository},
    models::{
        machine::MachineStatus,
        planning::PlanningStatus,
        reports::{
            ApiOverview, DailySummary, MachineStatistics, PlanningStatistics, ProductStatistics,
            TransactionStatistics,
        },
        transaction::{TransactionDetail, TransactionFilter, TransactionKind},
    },
};

pub const MAX_RANGE_DAYS: i64 = 365;

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn start_of_next_day(date: NaiveDate) -> Result<DateTime<Utc>, AppError> {
    date.checked_add_days(Days::new(1))
        .map(start_of_day)
        .ok_or_else(|| AppError::InvalidDateRange(format!("data fora do intervalo suportado: {date}")))
}

/// Converte datas (inclusivas) em limites `[from, until)` em UTC.
/// Com as duas datas presentes exige `start <= end` e no máximo 365 dias.
pub fn date_range_bounds(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>), AppError> {
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(AppError::InvalidDateRange(format!(
                "a data inicial ({start}) é posterior à final ({end})"
            )));
        }
        if (end - start).num_days() > MAX_RANGE_DAYS {
            return Err(AppError::InvalidDateRange(format!(
                "o intervalo pode ter no máximo {MAX_RANGE_DAYS} dias"
            )));
        }
    }

    let from = start.map(start_of_day);
    let until = end.map(start_of_next_day).transpose()?;
    Ok((from, until))
}

/// Dobra as movimentações de um dia no resumo diário.
pub fn summarize_day(date: NaiveDate, transactions: Vec<TransactionDetail>) -> DailySummary {
    let mut summary = DailySummary {
        date,
        total_transactions: transactions.len(),
        stock_in_count: 0,
        stock_out_count: 0,
        adjustment_count: 0,
        total_stock_in: 0,
        total_stock_out: 0,
        transactions: Vec::new(),
    };

    for detail in &transactions {
        let t = &detail.transaction;
        match t.transaction_type {
            TransactionKind::StockIn => {
                summary.stock_in_count += 1;
                summary.total_stock_in += i64::from(t.quantity);
            }
            TransactionKind::StockOut => {
                summary.stock_out_count += 1;
                summary.total_stock_out += i64::from(t.quantity);
            }
            // O quantity do ajuste é saldo-alvo, não entra nos totais
            TransactionKind::Adjustment => summary.adjustment_count += 1,
        }
    }

    summary.transactions = transactions;
    summary
}

#[derive(Clone)]
pub struct ReportService {
    pool: PgPool,
    reports: ReportRepository,
    transactions: TransactionRepository,
}

impl ReportService {
    pub fn new(pool: PgPool, reports: ReportRepository, transactions: TransactionRepository) -> Self {
        Self { pool, reports, transactions }
    }

    pub async fn transaction_statistics(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        product_id: Option<i32>,
    ) -> Result<TransactionStatistics, AppError> {
        let (from, until) = date_range_bounds(start, end)?;
        let filter = TransactionFilter { product_id, kind: None, from, until };

        let total_transactions = self.reports.count_transactions(&filter).await?;
        let mut transactions_by_type = self.reports.totals_by_kind(&filter).await?;
        for totals in &mut transactions_by_type {
            totals.type_name = totals.transaction_type.label().to_string();
        }
        let daily_stats = self.reports.totals_by_day(&filter).await?;

        Ok(TransactionStatistics { total_transactions, transactions_by_type, daily_stats })
    }

    pub async fn daily_summary(&self, date: NaiveDate) -> Result<DailySummary, AppError> {
        let transactions = self
            .transactions
            .list_between(&self.pool, start_of_day(date), start_of_next_day(date)?)
            .await?;
        Ok(summarize_day(date, transactions))
    }

    pub async fn product_statistics(&self) -> Result<ProductStatistics, AppError> {
        let totals = self.reports.product_totals(&self.pool).await?;
        let by_category = self.reports.products_by_category(&self.pool).await?;

        Ok(ProductStatistics {
            total_products: totals.total_products,
            low_stock_products: totals.low_stock_products,
            total_value: totals.total_value,
            total_stock_value: totals.total_stock_value,
            by_category,
        })
    }

    pub async fn machine_statistics(&self) -> Result<MachineStatistics, AppError> {
        let mut stats = MachineStatistics::default();

        for row in self.reports.machines_by_status(&self.pool).await? {
            stats.total += row.count;
            match row.status {
                MachineStatus::Active => stats.active = row.count,
                MachineStatus::Inactive => stats.inactive = row.count,
                MachineStatus::Maintenance => stats.maintenance = row.count,
            }
        }
        stats.by_type = self.reports.machines_by_type(&self.pool).await?;

        Ok(stats)
    }

    pub async fn planning_statistics(&self) -> Result<PlanningStatistics, AppError> {
        let mut stats = PlanningStatistics::default();

        for row in self.reports.plannings_by_status(&self.pool).await? {
            stats.total += row.count;
            match row.status {
                PlanningStatus::Pending => stats.pending = row.count,
                PlanningStatus::InProgress => stats.in_progress = row.count,
                PlanningStatus::Completed => stats.completed = row.count,
                PlanningStatus::Cancelled => stats.cancelled = row.count,
            }
        }
        stats.by_category = self.reports.plannings_by_category(&self.pool).await?;
        stats.by_priority = self.reports.plannings_by_priority(&self.pool).await?;

        Ok(stats)
    }

    pub async fn overview(&self) -> Result<ApiOverview, AppError> {
        let row = self.reports.overview(&self.pool).await?;

        Ok(ApiOverview {
            total_products: row.total_products,
            total_transactions: row.total_transactions,
            low_stock_products: row.low_stock_products,
            today_transactions: row.today_transactions,
            last_updated: Utc::now(),
            api_version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{product::ProductSummary, transaction::StockTransaction};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn detail(id: i32, kind: TransactionKind, quantity: i32) -> TransactionDetail {
        let now = Utc::now();
        TransactionDetail {
            transaction: StockTransaction {
                id,
                product_id: 1,
                quantity,
                transaction_type: kind,
                reason: "teste".into(),
                notes: None,
                previous_stock: 0,
                new_stock: 0,
                transaction_date: now,
                created_by: "system".into(),
                created_at: now,
                updated_at: now,
            },
            product: ProductSummary {
                id: 1,
                name: "Parafuso".into(),
                barcode: "123".into(),
                category: "Ferragens".into(),
                unit: "pcs".into(),
                current_stock: 0,
            },
        }
    }

    #[test]
    fn range_bounds_cover_whole_days() {
        let (from, until) = date_range_bounds(Some(date("2025-01-01")), Some(date("2025-01-31"))).unwrap();
        assert_eq!(from.unwrap().to_rfc3339(), "2025-01-01T00:00:00+00:00");
        assert_eq!(until.unwrap().to_rfc3339(), "2025-02-01T00:00:00+00:00");
    }

    #[test]
    fn open_ended_ranges_are_allowed() {
        assert_eq!(date_range_bounds(None, None).unwrap(), (None, None));
        let (from, until) = date_range_bounds(Some(date("2025-01-01")), None).unwrap();
        assert!(from.is_some() && until.is_none());
    }

    #[test]
    fn rejects_inverted_ranges() {
        let err = date_range_bounds(Some(date("2025-02-01")), Some(date("2025-01-01"))).unwrap_err();
        assert!(matches!(err, AppError::InvalidDateRange(_)));
    }

    #[test]
    fn range_is_capped_at_one_year() {
        assert!(date_range_bounds(Some(date("2024-01-01")), Some(date("2024-12-31"))).is_ok());
        assert!(date_range_bounds(Some(date("2025-01-01")), Some(date("2026-01-01"))).is_ok());
        let err = date_range_bounds(Some(date("2025-01-01")), Some(date("2026-01-02"))).unwrap_err();
        assert!(matches!(err, AppError::InvalidDateRange(_)));
    }

    #[test]
    fn daily_summary_counts_kinds_and_sums_movements() {
        let summary = summarize_day(
            date("2025-03-01"),
            vec![
                detail(1, TransactionKind::StockIn, 10),
                detail(2, TransactionKind::StockIn, 5),
                detail(3, TransactionKind::StockOut, 3),
                detail(4, TransactionKind::Adjustment, 40),
            ],
        );

        assert_eq!(summary.total_transactions, 4);
        assert_eq!((summary.stock_in_count, summary.stock_out_count, summary.adjustment_count), (2, 1, 1));
        assert_eq!(summary.total_stock_in, 15);
        assert_eq!(summary.total_stock_out, 3);
        assert_eq!(summary.transactions.len(), 4);
    }

    #[test]
    fn empty_day_yields_zeroed_summary() {
        let summary = summarize_day(date("2025-03-01"), Vec::new());
        assert_eq!(summary.total_transactions, 0);
        assert_eq!(summary.total_stock_in + summary.total_stock_out, 0);
    }
}
