//! # Order Repository
//!
//! Reads and writes for orders and their lines.
//!
//! ## Storage Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  orders                           order_lines                           │
//! │  ┌────────────────────────┐       ┌────────────────────────┐            │
//! │  │ id (UUID)              │◄──────│ order_id (FK)          │            │
//! │  │ order_code (ORD-XXXX)  │       │ variant_id (FK)        │            │
//! │  │ customer_id (NULLable) │       │ quantity (CHECK > 0)   │            │
//! │  │ status (raw code)      │       │ UNIQUE(order, variant) │            │
//! │  │ totals (cents)         │       └────────────────────────┘            │
//! │  └────────────────────────┘                                             │
//! │                                                                         │
//! │  status is stored as the raw wire code (0/1 pending split kept on      │
//! │  disk, collapsed to Pending in the domain type on read). Status        │
//! │  writes are guarded by the raw code they expect to replace, so a       │
//! │  concurrent transition loses cleanly instead of clobbering.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteExecutor;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use atlas_core::{Order, OrderKind, OrderLine, OrderStatus, OrderTotals, PaymentMethod};

// =============================================================================
// Row Types
// =============================================================================

/// Raw order row. Keeps the numeric codes as stored so status updates can
/// be guarded against the exact on-disk value.
#[derive(Debug, FromRow)]
pub(crate) struct OrderRow {
    pub id: String,
    pub customer_id: Option<String>,
    pub employee_id: String,
    pub voucher_id: Option<String>,
    pub order_code: String,
    pub created_at: DateTime<Utc>,
    pub original_total_cents: i64,
    pub total_bill_cents: i64,
    pub total_amount: i64,
    pub payment_method: i64,
    pub status: i64,
    pub kind: i64,
}

impl OrderRow {
    /// Decodes the stored codes into domain types. A code outside the
    /// known sets means the row was written by something else entirely;
    /// that surfaces as an Internal error, never a panic.
    pub(crate) fn into_order(self, lines: Vec<OrderLine>) -> DbResult<Order> {
        let payment_method = PaymentMethod::from_code(self.payment_method)
            .ok_or_else(|| DbError::corrupt_code("payment_method", self.payment_method))?;
        let status = OrderStatus::from_code(self.status)
            .ok_or_else(|| DbError::corrupt_code("status", self.status))?;
        let kind = OrderKind::from_code(self.kind)
            .ok_or_else(|| DbError::corrupt_code("kind", self.kind))?;

        Ok(Order {
            id: self.id,
            customer_id: self.customer_id,
            employee_id: self.employee_id,
            voucher_id: self.voucher_id,
            order_code: self.order_code,
            created_at: self.created_at,
            lines,
            original_total_cents: self.original_total_cents,
            total_bill_cents: self.total_bill_cents,
            total_amount: self.total_amount,
            payment_method,
            status,
            kind,
        })
    }
}

#[derive(Debug, FromRow)]
struct OrderLineRow {
    id: String,
    order_id: String,
    variant_id: String,
    quantity: i64,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        OrderLine {
            id: row.id,
            order_id: row.order_id,
            variant_id: row.variant_id,
            quantity: row.quantity,
        }
    }
}

const ORDER_SELECT: &str = r#"
    SELECT id, customer_id, employee_id, voucher_id, order_code, created_at,
           original_total_cents, total_bill_cents, total_amount,
           payment_method, status, kind
    FROM orders
"#;

// =============================================================================
// Executor-Generic Helpers
// =============================================================================
//
// Shared between the pool-backed repository and the transactional order
// service. Everything the checkout transaction touches goes through these.

pub(crate) async fn fetch_order_row<'e, E>(exec: E, order_id: &str) -> DbResult<Option<OrderRow>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("{ORDER_SELECT} WHERE id = ?1");
    Ok(sqlx::query_as(&sql).bind(order_id).fetch_optional(exec).await?)
}

pub(crate) async fn fetch_lines<'e, E>(exec: E, order_id: &str) -> DbResult<Vec<OrderLine>>
where
    E: SqliteExecutor<'e>,
{
    let rows: Vec<OrderLineRow> = sqlx::query_as(
        r#"
        SELECT id, order_id, variant_id, quantity
        FROM order_lines
        WHERE order_id = ?1
        ORDER BY rowid
        "#,
    )
    .bind(order_id)
    .fetch_all(exec)
    .await?;

    Ok(rows.into_iter().map(OrderLine::from).collect())
}

/// Inserts a new order with the given initial status code (0 or 1; the
/// pending sub-code depends on kind and payment method).
pub(crate) async fn insert_order<'e, E>(exec: E, order: &Order, status_code: i64) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO orders (
            id, customer_id, employee_id, voucher_id, order_code, created_at,
            original_total_cents, total_bill_cents, total_amount,
            payment_method, status, kind
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )
    .bind(&order.id)
    .bind(&order.customer_id)
    .bind(&order.employee_id)
    .bind(&order.voucher_id)
    .bind(&order.order_code)
    .bind(order.created_at)
    .bind(order.original_total_cents)
    .bind(order.total_bill_cents)
    .bind(order.total_amount)
    .bind(order.payment_method.code())
    .bind(status_code)
    .bind(order.kind.code())
    .execute(exec)
    .await?;

    Ok(())
}

pub(crate) async fn insert_line<'e, E>(exec: E, line: &OrderLine) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO order_lines (id, order_id, variant_id, quantity)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&line.id)
    .bind(&line.order_id)
    .bind(&line.variant_id)
    .bind(line.quantity)
    .execute(exec)
    .await?;

    Ok(())
}

pub(crate) async fn update_line_quantity<'e, E>(
    exec: E,
    line_id: &str,
    quantity: i64,
) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("UPDATE order_lines SET quantity = ?1 WHERE id = ?2")
        .bind(quantity)
        .bind(line_id)
        .execute(exec)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("order line", line_id));
    }
    Ok(())
}

/// Persists freshly recomputed totals.
pub(crate) async fn update_totals<'e, E>(
    exec: E,
    order_id: &str,
    totals: &OrderTotals,
) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE orders
        SET original_total_cents = ?1,
            total_bill_cents = ?2,
            total_amount = ?3
        WHERE id = ?4
        "#,
    )
    .bind(totals.original_total.cents())
    .bind(totals.total_bill.cents())
    .bind(totals.total_amount)
    .bind(order_id)
    .execute(exec)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("order", order_id));
    }
    Ok(())
}

/// Writes a new status code, guarded by the raw code the caller read.
///
/// Returns `false` when the guard failed: another transaction moved the
/// order between our read and this write.
pub(crate) async fn update_status<'e, E>(
    exec: E,
    order_id: &str,
    expected_code: i64,
    new_code: i64,
) -> DbResult<bool>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("UPDATE orders SET status = ?1 WHERE id = ?2 AND status = ?3")
        .bind(new_code)
        .bind(order_id)
        .bind(expected_code)
        .execute(exec)
        .await?;

    Ok(result.rows_affected() == 1)
}

/// Marks an order completed unless it already reached a terminal state.
///
/// Guarded by `status NOT IN (completed, cancelled)` rather than an exact
/// expected code: finalize may legally fire from any live state, and a
/// concurrent finalize that won the race must turn this into a no-op.
pub(crate) async fn mark_completed<'e, E>(exec: E, order_id: &str) -> DbResult<bool>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("UPDATE orders SET status = ?1 WHERE id = ?2 AND status NOT IN (?1, ?3)")
        .bind(OrderStatus::Completed.code())
        .bind(order_id)
        .bind(OrderStatus::Cancelled.code())
        .execute(exec)
        .await?;

    Ok(result.rows_affected() == 1)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order reads.
///
/// All writes go through the transactional `OrderService`; this type only
/// serves lookups and listings.
///
/// ## Usage
/// ```rust,ignore
/// let repo = OrderRepository::new(pool);
///
/// let order = repo.get_by_code("ORD-1A2B3C4D").await?;
/// let recent = repo.list(Some(OrderKind::Online), 20, 0).await?;
/// ```
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Fetches an order with its lines by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Order> {
        debug!(order_id = %id, "Fetching order");

        let row = fetch_order_row(&self.pool, id)
            .await?
            .ok_or_else(|| DbError::not_found("order", id))?;
        let lines = fetch_lines(&self.pool, id).await?;

        row.into_order(lines)
    }

    /// Fetches an order with its lines by its business code.
    pub async fn get_by_code(&self, order_code: &str) -> DbResult<Order> {
        debug!(order_code = %order_code, "Fetching order by code");

        let sql = format!("{ORDER_SELECT} WHERE order_code = ?1");
        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(order_code)
            .fetch_optional(&self.pool)
            .await?;

        let row = row.ok_or_else(|| DbError::not_found("order", order_code))?;
        let lines = fetch_lines(&self.pool, &row.id).await?;

        row.into_order(lines)
    }

    /// Lists orders newest-first, optionally filtered by kind.
    ///
    /// Lines are loaded per order; listings are paginated, so the query
    /// count stays bounded by `limit`.
    pub async fn list(
        &self,
        kind: Option<OrderKind>,
        limit: u32,
        offset: u32,
    ) -> DbResult<Vec<Order>> {
        debug!(kind = ?kind, limit = limit, offset = offset, "Listing orders");

        let rows: Vec<OrderRow> = match kind {
            Some(kind) => {
                let sql = format!(
                    "{ORDER_SELECT} WHERE kind = ?1 ORDER BY created_at DESC LIMIT ?2 OFFSET ?3"
                );
                sqlx::query_as(&sql)
                    .bind(kind.code())
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("{ORDER_SELECT} ORDER BY created_at DESC LIMIT ?1 OFFSET ?2");
                sqlx::query_as(&sql)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let lines = fetch_lines(&self.pool, &row.id).await?;
            orders.push(row.into_order(lines)?);
        }

        debug!(count = orders.len(), "Listing returned orders");
        Ok(orders)
    }
}
