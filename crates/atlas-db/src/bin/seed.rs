//! Seeds a development database with demo catalog data.
//!
//! ## Usage
//! ```text
//! ATLAS_DB_PATH=./atlas.db cargo run --bin seed
//! ```
//!
//! Idempotent-ish: re-running against an already-seeded database fails on
//! the UNIQUE business keys rather than duplicating rows.

use std::path::PathBuf;

use chrono::{Duration, Utc};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use atlas_core::validation::validate_sku;
use atlas_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let path = std::env::var("ATLAS_DB_PATH").unwrap_or_else(|_| "./atlas.db".to_string());
    info!(path = %path, "Seeding demo data");

    let db = Database::new(DbConfig::new(PathBuf::from(path))).await?;
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO employees (id, full_name, is_active, created_at) VALUES (?1, ?2, 1, ?3)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind("Dana Reyes")
    .bind(now)
    .execute(db.pool())
    .await?;

    sqlx::query(
        "INSERT INTO customers (id, full_name, is_active, created_at) VALUES (?1, ?2, 1, ?3)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind("Sam Okafor")
    .bind(now)
    .execute(db.pool())
    .await?;

    let summer_promo_id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO promotions (id, name, percent, is_active, starts_at, ends_at)
        VALUES (?1, ?2, ?3, 1, ?4, ?5)
        "#,
    )
    .bind(&summer_promo_id)
    .bind("Summer Sale 10%")
    .bind(10_i64)
    .bind(now - Duration::days(1))
    .bind(now + Duration::days(30))
    .execute(db.pool())
    .await?;

    let variants: &[(&str, &str, i64, i64, Option<&str>)] = &[
        ("TSH-RED-M", "T-Shirt Red (M)", 10_000, 40, Some(&summer_promo_id)),
        ("TSH-RED-L", "T-Shirt Red (L)", 10_000, 25, Some(&summer_promo_id)),
        ("JKT-BLK-M", "Jacket Black (M)", 45_000, 10, None),
        ("CAP-NVY-OS", "Cap Navy (One Size)", 5_500, 60, None),
        ("SCK-WHT-42", "Socks White (42)", 1_200, 200, None),
    ];

    for &(sku, name, price_cents, stock, promotion_id) in variants {
        validate_sku(sku)?;
        sqlx::query(
            r#"
            INSERT INTO product_variants
                (id, sku, name, sale_price_cents, stock, promotion_id, is_active,
                 created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?7)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(sku)
        .bind(name)
        .bind(price_cents)
        .bind(stock)
        .bind(promotion_id)
        .bind(now)
        .execute(db.pool())
        .await?;
    }

    sqlx::query(
        r#"
        INSERT INTO vouchers
            (id, code, min_subtotal_cents, reduced_percent, max_discount_cents,
             is_active, starts_at, ends_at)
        VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?7)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind("SAVE20")
    .bind(20_000_i64)
    .bind(20_i64)
    .bind(4_000_i64)
    .bind(now - Duration::days(1))
    .bind(now + Duration::days(90))
    .execute(db.pool())
    .await?;

    info!(
        variants = variants.len(),
        "Demo data seeded; try voucher SAVE20 on orders over $200"
    );

    db.close().await;
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=atlas=trace` - Show trace for atlas crates only
/// - Default: INFO level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,atlas=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
