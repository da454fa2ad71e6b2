//! # Inventory Ledger
//!
//! The only code path that mutates stock.
//!
//! ## Atomic Conditional Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Why UPDATE ... WHERE stock >= ?quantity                    │
//! │                                                                         │
//! │  Two checkouts race for the last 5 units, 3 each:                      │
//! │                                                                         │
//! │  Tx A: UPDATE ... SET stock = stock - 3 WHERE id = X AND stock >= 3    │
//! │        rows_affected = 1  → stock is now 2, A proceeds                 │
//! │                                                                         │
//! │  Tx B: UPDATE ... SET stock = stock - 3 WHERE id = X AND stock >= 3    │
//! │        rows_affected = 0  → predicate failed, B gets InsufficientStock │
//! │                                                                         │
//! │  The check and the write are ONE statement, so there is no window      │
//! │  between "read stock" and "write stock" for another writer to slip     │
//! │  into. No in-process lock needed; the database is the arbiter.         │
//! │                                                                         │
//! │  CHECK (stock >= 0) on the table is the last-resort backstop: any      │
//! │  bug that bypasses the predicate aborts instead of going negative.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::sqlite::SqliteExecutor;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Decrements a variant's stock iff enough is available.
///
/// Returns `true` when the decrement happened, `false` when the stock
/// predicate failed (insufficient stock, or unknown/inactive variant).
/// Executor-generic so checkout can run it inside its transaction.
pub(crate) async fn try_decrement<'e, E>(exec: E, variant_id: &str, quantity: i64) -> DbResult<bool>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE product_variants
        SET stock = stock - ?1,
            updated_at = datetime('now')
        WHERE id = ?2
          AND stock >= ?1
        "#,
    )
    .bind(quantity)
    .bind(variant_id)
    .execute(exec)
    .await?;

    let decremented = result.rows_affected() == 1;
    debug!(
        variant_id = %variant_id,
        quantity = quantity,
        decremented = decremented,
        "Conditional stock decrement"
    );
    Ok(decremented)
}

/// Reads the current stock level of a variant.
pub(crate) async fn stock_of<'e, E>(exec: E, variant_id: &str) -> DbResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let stock: Option<i64> =
        sqlx::query_scalar("SELECT stock FROM product_variants WHERE id = ?1")
            .bind(variant_id)
            .fetch_optional(exec)
            .await?;

    stock.ok_or_else(|| DbError::not_found("product variant", variant_id))
}

/// Pool-backed handle over stock operations.
///
/// ## Usage
/// ```rust,ignore
/// let ledger = InventoryLedger::new(pool);
/// let ok = ledger.try_decrement("var-1", 3).await?;
/// ```
#[derive(Debug, Clone)]
pub struct InventoryLedger {
    pool: SqlitePool,
}

impl InventoryLedger {
    /// Creates a new InventoryLedger.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryLedger { pool }
    }

    /// Atomically decrements stock iff `stock >= quantity`.
    ///
    /// Returns `true` if the decrement was applied.
    pub async fn try_decrement(&self, variant_id: &str, quantity: i64) -> DbResult<bool> {
        try_decrement(&self.pool, variant_id, quantity).await
    }

    /// Current stock level of a variant.
    pub async fn stock_of(&self, variant_id: &str) -> DbResult<i64> {
        stock_of(&self.pool, variant_id).await
    }

    /// Restocks a variant (receiving shipments, manual corrections).
    pub async fn restock(&self, variant_id: &str, quantity: i64) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE product_variants
            SET stock = stock + ?1,
                updated_at = datetime('now')
            WHERE id = ?2
            "#,
        )
        .bind(quantity)
        .bind(variant_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("product variant", variant_id));
        }

        debug!(variant_id = %variant_id, quantity = quantity, "Restocked variant");
        Ok(())
    }
}
