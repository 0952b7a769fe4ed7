// src/db/test_db.rs
//
// Testes contra um Postgres real. Só rodam com TEST_DATABASE_URL apontando
// para um banco descartável; sem a variável, cada teste termina sem fazer nada.

use std::sync::atomic::{AtomicU32, Ordering};

use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::models::product::NewProduct;

pub(crate) async fn pool() -> Option<PgPool> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL não definida, pulando teste de banco");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(8)
        .connect(&url)
        .await
        .expect("falha ao conectar no banco de testes");
    sqlx::migrate!().run(&pool).await.expect("falha ao migrar o banco de testes");
    Some(pool)
}

// Código de barras único por execução, para os testes não colidirem.
pub(crate) fn unique_barcode() -> String {
    static NEXT: AtomicU32 = AtomicU32::new(0);
    format!(
        "T{}-{}-{}",
        std::process::id(),
        chrono::Utc::now().timestamp_micros(),
        NEXT.fetch_add(1, Ordering::Relaxed)
    )
}

pub(crate) fn new_product(barcode: &str) -> NewProduct {
    NewProduct {
        barcode: barcode.to_string(),
        name: "Parafuso M8".to_string(),
        description: String::new(),
        category: "Ferragens".to_string(),
        price: Decimal::new(1250, 2),
        min_stock_level: 5,
        unit: "pcs".to_string(),
    }
}
