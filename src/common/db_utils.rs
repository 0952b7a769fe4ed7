use sqlx::{PgPool, Postgres, Transaction};

// ---
// Helper: transação com limite de espera por lock
// ---
/// Abre uma transação e define `lock_timeout` só para ela (is_local = true).
/// Um `SELECT ... FOR UPDATE` que espere mais que isso falha com SQLSTATE 55P03,
/// que o AppError converte em ConcurrencyConflict.
pub(crate) async fn begin_with_lock_timeout(
    pool: &PgPool,
    lock_timeout_ms: u64,
) -> Result<Transaction<'static, Postgres>, sqlx::Error> {

    // 1. Abre a transação
    let mut tx = pool.begin().await?;

    // 2. Define o lock_timeout local (vale até o COMMIT/ROLLBACK)
    sqlx::query("SELECT set_config('lock_timeout', $1, true)")
        .bind(format!("{lock_timeout_ms}ms"))
        .execute(&mut *tx)
        .await?;

    Ok(tx)
}
