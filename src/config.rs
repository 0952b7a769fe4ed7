// src/config.rs

use crate::{
    db::{
        LedgerStore, MachineRepository, PgLedgerStore, PlanningRepository, ProductRepository,
        ReportRepository, TransactionRepository,
    },
    services::{
        LedgerService, MachineService, PlanningService, ProductService, ReportService,
        TransactionService,
    },
};
use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, str::FromStr, sync::Arc, time::{Duration, Instant}};

// ---
// Configuração (variáveis de ambiente / .env)
// ---
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub ledger_lock_timeout_ms: u64,
    pub app_env: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Separado do from_env para os testes não mexerem no ambiente do processo
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL deve ser definida")?;

        Ok(Self {
            database_url,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 8080)?,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            db_acquire_timeout: Duration::from_secs(parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 3)?),
            ledger_lock_timeout_ms: parse_or(&lookup, "LEDGER_LOCK_TIMEOUT_MS", 5000)?,
            app_env: lookup("APP_ENV").unwrap_or_else(|| "development".to_string()),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} inválida: '{raw}'")),
        None => Ok(default),
    }
}

// ---
// Estado compartilhado
// ---
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub started_at: Instant,
    pub ledger_service: LedgerService,
    pub product_service: ProductService,
    pub transaction_service: TransactionService,
    pub report_service: ReportService,
    pub machine_service: MachineService,
    pub planning_service: PlanningService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = Config::from_env()?;

        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.db_acquire_timeout)
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let ledger_store = Arc::new(PgLedgerStore::new(
            db_pool.clone(),
            ProductRepository::new(db_pool.clone()),
            TransactionRepository::new(db_pool.clone()),
            config.ledger_lock_timeout_ms,
        ));

        Ok(Self::with_ledger_store(config, db_pool, ledger_store))
    }

    /// Monta o gráfico de dependências. O livro-razão recebe o store já pronto
    /// (PostgreSQL em produção, memória nos testes).
    pub fn with_ledger_store(config: Config, db_pool: PgPool, ledger_store: Arc<dyn LedgerStore>) -> Self {
        let product_repo = ProductRepository::new(db_pool.clone());
        let transaction_repo = TransactionRepository::new(db_pool.clone());
        let report_repo = ReportRepository::new(db_pool.clone());

        Self {
            ledger_service: LedgerService::new(ledger_store),
            product_service: ProductService::new(db_pool.clone(), product_repo.clone(), transaction_repo.clone()),
            transaction_service: TransactionService::new(db_pool.clone(), transaction_repo.clone(), product_repo),
            report_service: ReportService::new(db_pool.clone(), report_repo, transaction_repo),
            machine_service: MachineService::new(db_pool.clone(), MachineRepository::new(db_pool.clone())),
            planning_service: PlanningService::new(db_pool.clone(), PlanningRepository::new(db_pool.clone())),
            config: Arc::new(config),
            started_at: Instant::now(),
            db_pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn applies_defaults() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/estoque")])).unwrap();

        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.db_acquire_timeout, Duration::from_secs(3));
        assert_eq!(config.ledger_lock_timeout_ms, 5000);
        assert_eq!(config.app_env, "development");
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/estoque"),
            ("HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("LEDGER_LOCK_TIMEOUT_MS", "250"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.ledger_lock_timeout_ms, 250);
    }

    #[test]
    fn database_url_is_required() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn invalid_numbers_fail_with_context() {
        let err = Config::from_lookup(lookup(&[("DATABASE_URL", "x"), ("PORT", "oitenta")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
