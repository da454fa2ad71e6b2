//! # Order Service
//!
//! Transactional order workflows: the write-side entry points of the
//! subsystem. Everything that mutates an order runs here, inside one
//! database transaction per call.
//!
//! ## Workflow Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Order Workflows                                  │
//! │                                                                         │
//! │  create_order ──► resolve employee/customer/voucher                    │
//! │                   mint id + ORD-XXXXXXXX code                          │
//! │                   insert with initial pending code, zero totals        │
//! │                                                                         │
//! │  add_line ──────► BEGIN                                                │
//! │                   load order + lines, load variant (+promotion)        │
//! │                   advisory stock check (nothing reserved)             │
//! │                   merge quantity into line set                         │
//! │                   recompute totals from CURRENT prices                 │
//! │                   COMMIT                                               │
//! │                                                                         │
//! │  finalize ──────► BEGIN                                                │
//! │                   per line: UPDATE stock WHERE stock >= qty            │
//! │                      any miss → Err → tx drops → FULL ROLLBACK         │
//! │                   recompute totals one last time                       │
//! │                   status → completed (guarded, at most once)           │
//! │                   COMMIT    ← stock + status move together             │
//! │                                                                         │
//! │  transition ────► BEGIN                                                │
//! │                   state-machine check, optimistic status write         │
//! │                   COMMIT                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Recompute at Finalize
//! Totals stored during cart-building are display values. Prices and
//! promotion windows can change between the last `add_line` and checkout,
//! so finalize re-derives the bill from current data inside the same
//! transaction that commits the stock decrement. The charged amount and
//! the decremented stock are one atomic fact.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::{catalog, inventory, order as order_repo};
use atlas_core::{
    recompute, validation, CoreError, MergeOutcome, Order, OrderKind, OrderLine, OrderStatus,
    Voucher,
};

// =============================================================================
// Errors
// =============================================================================

/// Error type for order workflows: either a domain rule was violated
/// (core) or the storage layer failed (db).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Db(DbError::from(err))
    }
}

impl From<atlas_core::ValidationError> for ServiceError {
    fn from(err: atlas_core::ValidationError) -> Self {
        ServiceError::Core(CoreError::from(err))
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// Request & Response Types
// =============================================================================

/// Inputs for creating an empty order.
#[derive(Debug, Clone)]
pub struct CreateOrderRequest {
    /// `None` = walk-in counter sale.
    pub customer_id: Option<String>,

    /// The employee ringing up or handling the order.
    pub employee_id: String,

    /// Voucher business code to attach, if the customer presented one.
    /// Qualification is evaluated at pricing time, not here.
    pub voucher_code: Option<String>,

    /// Payment method wire code (0 cash, 1 card, 2 transfer).
    pub payment_method: i64,

    /// Counter sale or online storefront order.
    pub kind: OrderKind,
}

/// Wire-format order representation with camelCase keys and raw numeric
/// codes, matching what the storefront consumes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSnapshot {
    pub id: String,
    pub order_code: String,
    pub customer_id: Option<String>,
    pub employee_id: String,
    pub voucher_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub original_total_cents: i64,
    pub total_bill_cents: i64,
    pub total_amount: i64,
    pub payment_method: i64,
    pub status: i64,
    pub kind: i64,
    pub lines: Vec<LineSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSnapshot {
    pub id: String,
    pub variant_id: String,
    pub quantity: i64,
}

impl From<&Order> for OrderSnapshot {
    fn from(order: &Order) -> Self {
        OrderSnapshot {
            id: order.id.clone(),
            order_code: order.order_code.clone(),
            customer_id: order.customer_id.clone(),
            employee_id: order.employee_id.clone(),
            voucher_id: order.voucher_id.clone(),
            created_at: order.created_at,
            original_total_cents: order.original_total_cents,
            total_bill_cents: order.total_bill_cents,
            total_amount: order.total_amount,
            payment_method: order.payment_method.code(),
            status: order.status.code(),
            kind: order.kind.code(),
            lines: order
                .lines
                .iter()
                .map(|l| LineSnapshot {
                    id: l.id.clone(),
                    variant_id: l.variant_id.clone(),
                    quantity: l.quantity,
                })
                .collect(),
        }
    }
}

// =============================================================================
// Service
// =============================================================================

/// Transactional order workflows over a shared pool.
///
/// ## Usage
/// ```rust,ignore
/// let service = db.order_service();
///
/// let order = service.create_order(request).await?;
/// let order = service.add_line(&order.id, "variant-uuid", 2).await?;
/// let order = service.finalize_payment(&order.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct OrderService {
    pool: SqlitePool,
}

impl OrderService {
    /// Creates a new OrderService.
    pub fn new(pool: SqlitePool) -> Self {
        OrderService { pool }
    }

    /// Creates an empty pending order.
    ///
    /// Resolves every referenced entity up front so a typo'd employee or
    /// voucher code fails here, not at checkout. The order starts with
    /// zero totals and no lines.
    pub async fn create_order(&self, request: CreateOrderRequest) -> ServiceResult<Order> {
        let payment_method = validation::parse_payment_method(request.payment_method)?;

        let catalog_repo = catalog::CatalogRepository::new(self.pool.clone());

        let employee = catalog_repo.find_employee(&request.employee_id).await?;
        if !employee.is_active {
            return Err(CoreError::invalid_argument(
                "employee_id",
                format!("employee {} is inactive", employee.id),
            )
            .into());
        }

        let customer_id = match request.customer_id {
            Some(id) => Some(catalog_repo.find_customer(&id).await?.id),
            None => None, // walk-in
        };

        let voucher_id = match &request.voucher_code {
            Some(code) => Some(catalog_repo.find_voucher_by_code(code).await?.id),
            None => None,
        };

        let order = Order {
            id: Uuid::new_v4().to_string(),
            customer_id,
            employee_id: employee.id,
            voucher_id,
            order_code: generate_order_code(),
            created_at: Utc::now(),
            lines: Vec::new(),
            original_total_cents: 0,
            total_bill_cents: 0,
            total_amount: 0,
            payment_method,
            status: OrderStatus::Pending,
            kind: request.kind,
        };

        // Unpaid online orders start at pending sub-code 0, everything
        // else at 1. Collapsed back to Pending on read.
        let status_code = OrderStatus::initial_code(request.kind, payment_method);
        order_repo::insert_order(&self.pool, &order, status_code).await?;

        info!(
            order_code = %order.order_code,
            kind = ?order.kind,
            walk_in = order.is_walk_in(),
            "Order created"
        );
        Ok(order)
    }

    /// Adds `quantity` of a variant to an order, merging with an existing
    /// line for the same variant.
    ///
    /// The stock check here is ADVISORY: it rejects obviously hopeless
    /// requests early but reserves nothing. The authoritative check is the
    /// conditional decrement in [`finalize_payment`](Self::finalize_payment).
    ///
    /// Totals are recomputed from current prices inside the same
    /// transaction that writes the line.
    pub async fn add_line(
        &self,
        order_id: &str,
        variant_id: &str,
        quantity: i64,
    ) -> ServiceResult<Order> {
        validation::validate_quantity(quantity).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let row = order_repo::fetch_order_row(&mut *tx, order_id)
            .await?
            .ok_or_else(|| DbError::not_found("order", order_id))?;
        let lines = order_repo::fetch_lines(&mut *tx, order_id).await?;
        let mut order = row.into_order(lines)?;

        let variant = catalog::variant_with_promotion(&mut *tx, variant_id)
            .await?
            .filter(|v| v.is_active)
            .ok_or_else(|| CoreError::not_found("product variant", variant_id))?;

        // Advisory check against the MERGED quantity: two adds of 3 each
        // must fail on the second add when only 5 are in stock.
        let already_in_cart = order
            .lines
            .iter()
            .find(|l| l.variant_id == variant_id)
            .map(|l| l.quantity)
            .unwrap_or(0);
        let requested = already_in_cart + quantity;
        if !variant.can_sell(requested) {
            return Err(CoreError::InsufficientStock {
                sku: variant.sku,
                available: variant.stock,
                requested,
            }
            .into());
        }

        let outcome = order.merge_line(Uuid::new_v4().to_string(), variant_id, quantity)?;
        match &outcome {
            MergeOutcome::Updated { line_id, quantity } => {
                order_repo::update_line_quantity(&mut *tx, line_id, *quantity).await?;
            }
            MergeOutcome::Inserted { line_id, quantity } => {
                let line = OrderLine {
                    id: line_id.clone(),
                    order_id: order.id.clone(),
                    variant_id: variant_id.to_string(),
                    quantity: *quantity,
                };
                order_repo::insert_line(&mut *tx, &line).await?;
            }
        }

        let totals = self.recompute_in_tx(&mut tx, &order).await?;
        order_repo::update_totals(&mut *tx, order_id, &totals).await?;

        tx.commit().await?;

        totals.apply_to(&mut order);
        debug!(
            order_code = %order.order_code,
            variant_id = %variant_id,
            quantity = quantity,
            total_bill_cents = order.total_bill_cents,
            "Line merged into order"
        );
        Ok(order)
    }

    /// Finalizes payment: commits stock and completes the order, atomically.
    ///
    /// ## The Only Code Path That Commits Stock
    /// Per line, a single conditional UPDATE decrements stock iff enough
    /// remains. The first line that misses turns the whole call into an
    /// `InsufficientStock` error and the transaction rolls back, restoring
    /// every earlier decrement. Two orders racing for the last units
    /// therefore end with one completed order and one clean failure —
    /// stock never goes negative and is never decremented twice.
    ///
    /// Calling this on an already-completed order returns
    /// `AlreadyFinalized`; on a cancelled order, `InvalidOrderStatus`.
    pub async fn finalize_payment(&self, order_id: &str) -> ServiceResult<Order> {
        let mut tx = self.pool.begin().await?;

        let row = order_repo::fetch_order_row(&mut *tx, order_id)
            .await?
            .ok_or_else(|| DbError::not_found("order", order_id))?;
        let lines = order_repo::fetch_lines(&mut *tx, order_id).await?;
        let mut order = row.into_order(lines)?;

        match order.status {
            OrderStatus::Completed => {
                return Err(CoreError::AlreadyFinalized {
                    order_code: order.order_code,
                }
                .into());
            }
            OrderStatus::Cancelled => {
                return Err(CoreError::InvalidOrderStatus {
                    order_code: order.order_code,
                    status: order.status,
                }
                .into());
            }
            _ => {}
        }

        let pricings = catalog::line_pricings(&mut *tx, order_id).await?;

        // Authoritative stock commit. Any miss aborts the whole call; the
        // transaction drop rolls back decrements already applied.
        for line in &pricings {
            if !inventory::try_decrement(&mut *tx, &line.variant_id, line.quantity).await? {
                let available = inventory::stock_of(&mut *tx, &line.variant_id).await?;
                return Err(CoreError::InsufficientStock {
                    sku: line.sku.clone(),
                    available,
                    requested: line.quantity,
                }
                .into());
            }
        }

        let voucher = self.attached_voucher(&mut tx, &order).await?;
        let totals = recompute(&pricings, voucher.as_ref(), Utc::now());
        order_repo::update_totals(&mut *tx, order_id, &totals).await?;

        if !order_repo::mark_completed(&mut *tx, order_id).await? {
            // A concurrent finalize won between our read and this write.
            return Err(CoreError::AlreadyFinalized {
                order_code: order.order_code,
            }
            .into());
        }

        tx.commit().await?;

        totals.apply_to(&mut order);
        order.status = OrderStatus::Completed;
        info!(
            order_code = %order.order_code,
            total_bill_cents = order.total_bill_cents,
            lines = order.lines.len(),
            "Order finalized, stock committed"
        );
        Ok(order)
    }

    /// Moves an order along the fulfillment state machine.
    ///
    /// The write is guarded by the exact status code read at the start of
    /// the transaction, so two staff members confirming the same order
    /// concurrently cannot both win.
    pub async fn transition_status(
        &self,
        order_id: &str,
        target: OrderStatus,
    ) -> ServiceResult<Order> {
        let mut tx = self.pool.begin().await?;

        let row = order_repo::fetch_order_row(&mut *tx, order_id)
            .await?
            .ok_or_else(|| DbError::not_found("order", order_id))?;
        let raw_status = row.status;
        let lines = order_repo::fetch_lines(&mut *tx, order_id).await?;
        let mut order = row.into_order(lines)?;

        let next = order.status.transition(target)?;

        if !order_repo::update_status(&mut *tx, order_id, raw_status, next.code()).await? {
            return Err(DbError::TransactionFailed(format!(
                "order {} changed status concurrently",
                order.order_code
            ))
            .into());
        }

        tx.commit().await?;

        order.status = next;
        info!(
            order_code = %order.order_code,
            status = ?order.status,
            "Order status updated"
        );
        Ok(order)
    }

    /// Fetches an order with its lines.
    pub async fn get_order(&self, order_id: &str) -> ServiceResult<Order> {
        let repo = order_repo::OrderRepository::new(self.pool.clone());
        Ok(repo.get_by_id(order_id).await?)
    }

    /// Lists orders newest-first, optionally filtered by kind.
    pub async fn list_orders(
        &self,
        kind: Option<OrderKind>,
        limit: u32,
        offset: u32,
    ) -> ServiceResult<Vec<Order>> {
        let repo = order_repo::OrderRepository::new(self.pool.clone());
        Ok(repo.list(kind, limit, offset).await?)
    }

    /// Loads the order's attached voucher for pricing, if any.
    async fn attached_voucher(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        order: &Order,
    ) -> DbResult<Option<Voucher>> {
        match &order.voucher_id {
            Some(id) => catalog::voucher_by_id(&mut **tx, id).await,
            None => Ok(None),
        }
    }

    /// Recomputes totals from current line pricing inside an open
    /// transaction.
    async fn recompute_in_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        order: &Order,
    ) -> DbResult<atlas_core::OrderTotals> {
        let pricings = catalog::line_pricings(&mut **tx, &order.id).await?;
        let voucher = self.attached_voucher(tx, order).await?;
        Ok(recompute(&pricings, voucher.as_ref(), Utc::now()))
    }
}

/// Mints a human-readable order code: `ORD-` plus the first 8 hex digits
/// of a fresh UUID, uppercased. Collisions are guarded by the UNIQUE
/// index on `order_code`.
fn generate_order_code() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("ORD-{}", uuid[..8].to_uppercase())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;
    use atlas_core::PaymentMethod;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_employee(db: &Database, id: &str) {
        sqlx::query(
            "INSERT INTO employees (id, full_name, is_active, created_at) VALUES (?1, ?2, 1, ?3)",
        )
        .bind(id)
        .bind("Test Employee")
        .bind(Utc::now())
        .execute(db.pool())
        .await
        .unwrap();
    }

    async fn seed_customer(db: &Database, id: &str) {
        sqlx::query(
            "INSERT INTO customers (id, full_name, is_active, created_at) VALUES (?1, ?2, 1, ?3)",
        )
        .bind(id)
        .bind("Test Customer")
        .bind(Utc::now())
        .execute(db.pool())
        .await
        .unwrap();
    }

    async fn seed_promotion(db: &Database, id: &str, percent: i64) {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO promotions (id, name, percent, is_active, starts_at, ends_at)
            VALUES (?1, ?2, ?3, 1, ?4, ?5)
            "#,
        )
        .bind(id)
        .bind("Test Promo")
        .bind(percent)
        .bind(now - Duration::hours(1))
        .bind(now + Duration::hours(1))
        .execute(db.pool())
        .await
        .unwrap();
    }

    async fn seed_variant(
        db: &Database,
        id: &str,
        sku: &str,
        price_cents: i64,
        stock: i64,
        promotion_id: Option<&str>,
    ) {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO product_variants
                (id, sku, name, sale_price_cents, stock, promotion_id, is_active,
                 created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?7)
            "#,
        )
        .bind(id)
        .bind(sku)
        .bind(format!("Variant {sku}"))
        .bind(price_cents)
        .bind(stock)
        .bind(promotion_id)
        .bind(now)
        .execute(db.pool())
        .await
        .unwrap();
    }

    async fn seed_voucher(
        db: &Database,
        id: &str,
        code: &str,
        min_subtotal_cents: i64,
        reduced_percent: i64,
        max_discount_cents: i64,
    ) {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO vouchers
                (id, code, min_subtotal_cents, reduced_percent, max_discount_cents,
                 is_active, starts_at, ends_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?7)
            "#,
        )
        .bind(id)
        .bind(code)
        .bind(min_subtotal_cents)
        .bind(reduced_percent)
        .bind(max_discount_cents)
        .bind(now - Duration::hours(1))
        .bind(now + Duration::hours(1))
        .execute(db.pool())
        .await
        .unwrap();
    }

    fn pos_cash_request(employee_id: &str) -> CreateOrderRequest {
        CreateOrderRequest {
            customer_id: None,
            employee_id: employee_id.to_string(),
            voucher_code: None,
            payment_method: PaymentMethod::Cash.code(),
            kind: OrderKind::Pos,
        }
    }

    async fn raw_status(db: &Database, order_id: &str) -> i64 {
        sqlx::query_scalar("SELECT status FROM orders WHERE id = ?1")
            .bind(order_id)
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_order_walk_in() {
        let db = test_db().await;
        seed_employee(&db, "emp-1").await;

        let order = db
            .order_service()
            .create_order(pos_cash_request("emp-1"))
            .await
            .unwrap();

        assert!(order.order_code.starts_with("ORD-"));
        assert_eq!(order.order_code.len(), 12);
        assert!(order.is_walk_in());
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_bill_cents, 0);
        // POS cash starts at pending sub-code 1
        assert_eq!(raw_status(&db, &order.id).await, 1);
    }

    #[tokio::test]
    async fn test_create_online_cod_order_starts_at_sub_code_zero() {
        let db = test_db().await;
        seed_employee(&db, "emp-1").await;
        seed_customer(&db, "cust-1").await;

        let order = db
            .order_service()
            .create_order(CreateOrderRequest {
                customer_id: Some("cust-1".to_string()),
                employee_id: "emp-1".to_string(),
                voucher_code: None,
                payment_method: PaymentMethod::Cash.code(),
                kind: OrderKind::Online,
            })
            .await
            .unwrap();

        assert_eq!(raw_status(&db, &order.id).await, 0);
        // Both sub-codes read back as Pending
        assert_eq!(
            db.orders().get_by_id(&order.id).await.unwrap().status,
            OrderStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_create_order_rejects_unknown_references() {
        let db = test_db().await;
        seed_employee(&db, "emp-1").await;

        let err = db
            .order_service()
            .create_order(pos_cash_request("nobody"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Db(DbError::NotFound { .. })));

        let err = db
            .order_service()
            .create_order(CreateOrderRequest {
                voucher_code: Some("NO-SUCH-CODE".to_string()),
                ..pos_cash_request("emp-1")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Db(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_create_order_rejects_bad_payment_code() {
        let db = test_db().await;
        seed_employee(&db, "emp-1").await;

        let err = db
            .order_service()
            .create_order(CreateOrderRequest {
                payment_method: 7,
                ..pos_cash_request("emp-1")
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::InvalidArgument { .. })
        ));
    }

    #[tokio::test]
    async fn test_add_line_prices_at_list_without_promotion() {
        let db = test_db().await;
        seed_employee(&db, "emp-1").await;
        seed_variant(&db, "var-1", "TSH-RED-M", 10_000, 10, None).await;
        let service = db.order_service();

        let order = service.create_order(pos_cash_request("emp-1")).await.unwrap();
        let order = service.add_line(&order.id, "var-1", 2).await.unwrap();

        // 2 × $100.00, no discount
        assert_eq!(order.original_total_cents, 20_000);
        assert_eq!(order.total_bill_cents, 20_000);
        assert_eq!(order.total_amount, 2);
    }

    #[tokio::test]
    async fn test_add_line_applies_active_promotion() {
        let db = test_db().await;
        seed_employee(&db, "emp-1").await;
        seed_promotion(&db, "promo-10", 10).await;
        seed_variant(&db, "var-1", "TSH-RED-M", 10_000, 10, Some("promo-10")).await;
        let service = db.order_service();

        let order = service.create_order(pos_cash_request("emp-1")).await.unwrap();
        let order = service.add_line(&order.id, "var-1", 3).await.unwrap();

        // 3 × ($100.00 at 10% off = $90.00)
        assert_eq!(order.original_total_cents, 30_000);
        assert_eq!(order.total_bill_cents, 27_000);
    }

    #[tokio::test]
    async fn test_add_line_merges_repeated_variant() {
        let db = test_db().await;
        seed_employee(&db, "emp-1").await;
        seed_variant(&db, "var-1", "TSH-RED-M", 10_000, 10, None).await;
        let service = db.order_service();

        let order = service.create_order(pos_cash_request("emp-1")).await.unwrap();
        service.add_line(&order.id, "var-1", 2).await.unwrap();
        let order = service.add_line(&order.id, "var-1", 3).await.unwrap();

        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].quantity, 5);
        assert_eq!(order.total_amount, 5);

        // Exactly one row in storage too
        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_lines WHERE order_id = ?1")
            .bind(&order.id)
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_add_line_advisory_check_counts_merged_quantity() {
        let db = test_db().await;
        seed_employee(&db, "emp-1").await;
        seed_variant(&db, "var-1", "TSH-RED-M", 10_000, 5, None).await;
        let service = db.order_service();

        let order = service.create_order(pos_cash_request("emp-1")).await.unwrap();
        service.add_line(&order.id, "var-1", 3).await.unwrap();

        // 3 already in cart + 3 more > 5 in stock
        let err = service.add_line(&order.id, "var-1", 3).await.unwrap_err();
        match err {
            ServiceError::Core(CoreError::InsufficientStock {
                sku,
                available,
                requested,
            }) => {
                assert_eq!(sku, "TSH-RED-M");
                assert_eq!(available, 5);
                assert_eq!(requested, 6);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_voucher_discount_capped() {
        let db = test_db().await;
        seed_employee(&db, "emp-1").await;
        seed_promotion(&db, "promo-10", 10).await;
        seed_variant(&db, "var-1", "TSH-RED-M", 10_000, 10, Some("promo-10")).await;
        seed_voucher(&db, "v-1", "SAVE20", 20_000, 20, 4_000).await;
        let service = db.order_service();

        let order = service
            .create_order(CreateOrderRequest {
                voucher_code: Some("SAVE20".to_string()),
                ..pos_cash_request("emp-1")
            })
            .await
            .unwrap();
        let order = service.add_line(&order.id, "var-1", 3).await.unwrap();

        // Post-promotion subtotal $270.00 qualifies (min $200.00).
        // 20% = $54.00, capped at $40.00 → bill $230.00.
        assert_eq!(order.original_total_cents, 30_000);
        assert_eq!(order.total_bill_cents, 23_000);
    }

    #[tokio::test]
    async fn test_voucher_below_minimum_contributes_nothing() {
        let db = test_db().await;
        seed_employee(&db, "emp-1").await;
        seed_variant(&db, "var-1", "TSH-RED-M", 10_000, 10, None).await;
        seed_voucher(&db, "v-1", "SAVE20", 20_000, 20, 4_000).await;
        let service = db.order_service();

        let order = service
            .create_order(CreateOrderRequest {
                voucher_code: Some("SAVE20".to_string()),
                ..pos_cash_request("emp-1")
            })
            .await
            .unwrap();
        let order = service.add_line(&order.id, "var-1", 1).await.unwrap();

        // $100.00 < $200.00 minimum: voucher stays attached, no discount
        assert_eq!(order.voucher_id.as_deref(), Some("v-1"));
        assert_eq!(order.total_bill_cents, 10_000);
    }

    #[tokio::test]
    async fn test_finalize_commits_stock_and_completes() {
        let db = test_db().await;
        seed_employee(&db, "emp-1").await;
        seed_variant(&db, "var-1", "TSH-RED-M", 10_000, 5, None).await;
        let service = db.order_service();

        let order = service.create_order(pos_cash_request("emp-1")).await.unwrap();
        service.add_line(&order.id, "var-1", 3).await.unwrap();

        let order = service.finalize_payment(&order.id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(db.inventory().stock_of("var-1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_double_finalize_decrements_once() {
        let db = test_db().await;
        seed_employee(&db, "emp-1").await;
        seed_variant(&db, "var-1", "TSH-RED-M", 10_000, 5, None).await;
        let service = db.order_service();

        let order = service.create_order(pos_cash_request("emp-1")).await.unwrap();
        service.add_line(&order.id, "var-1", 3).await.unwrap();
        service.finalize_payment(&order.id).await.unwrap();

        let err = service.finalize_payment(&order.id).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::AlreadyFinalized { .. })
        ));
        // Stock moved exactly once
        assert_eq!(db.inventory().stock_of("var-1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_finalize_race_one_winner_one_clean_failure() {
        let db = test_db().await;
        seed_employee(&db, "emp-1").await;
        seed_variant(&db, "var-1", "TSH-RED-M", 10_000, 5, None).await;
        let service = db.order_service();

        // Both orders pass the advisory check against stock 5
        let first = service.create_order(pos_cash_request("emp-1")).await.unwrap();
        service.add_line(&first.id, "var-1", 3).await.unwrap();
        let second = service.create_order(pos_cash_request("emp-1")).await.unwrap();
        service.add_line(&second.id, "var-1", 3).await.unwrap();

        service.finalize_payment(&first.id).await.unwrap();

        let err = service.finalize_payment(&second.id).await.unwrap_err();
        match err {
            ServiceError::Core(CoreError::InsufficientStock { available, requested, .. }) => {
                assert_eq!(available, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        // Loser left nothing behind: stock intact, order still pending
        assert_eq!(db.inventory().stock_of("var-1").await.unwrap(), 2);
        let second = service.get_order(&second.id).await.unwrap();
        assert_eq!(second.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_finalize_rolls_back_partial_decrements() {
        let db = test_db().await;
        seed_employee(&db, "emp-1").await;
        seed_variant(&db, "var-1", "TSH-RED-M", 10_000, 10, None).await;
        seed_variant(&db, "var-2", "TSH-BLU-M", 10_000, 10, None).await;
        let service = db.order_service();

        let order = service.create_order(pos_cash_request("emp-1")).await.unwrap();
        service.add_line(&order.id, "var-1", 2).await.unwrap();
        service.add_line(&order.id, "var-2", 2).await.unwrap();

        // Drain var-2 behind the order's back
        sqlx::query("UPDATE product_variants SET stock = 1 WHERE id = 'var-2'")
            .execute(db.pool())
            .await
            .unwrap();

        let err = service.finalize_payment(&order.id).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::InsufficientStock { .. })
        ));

        // var-1's decrement was rolled back with the transaction
        assert_eq!(db.inventory().stock_of("var-1").await.unwrap(), 10);
        assert_eq!(db.inventory().stock_of("var-2").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_finalize_reprices_from_current_data() {
        let db = test_db().await;
        seed_employee(&db, "emp-1").await;
        seed_variant(&db, "var-1", "TSH-RED-M", 10_000, 10, None).await;
        let service = db.order_service();

        let order = service.create_order(pos_cash_request("emp-1")).await.unwrap();
        service.add_line(&order.id, "var-1", 2).await.unwrap();

        // Price change between cart-building and checkout
        sqlx::query("UPDATE product_variants SET sale_price_cents = 12000 WHERE id = 'var-1'")
            .execute(db.pool())
            .await
            .unwrap();

        let order = service.finalize_payment(&order.id).await.unwrap();
        assert_eq!(order.total_bill_cents, 24_000);
    }

    #[tokio::test]
    async fn test_transition_walks_the_state_machine() {
        let db = test_db().await;
        seed_employee(&db, "emp-1").await;
        let service = db.order_service();

        let order = service.create_order(pos_cash_request("emp-1")).await.unwrap();

        let order = service
            .transition_status(&order.id, OrderStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Confirmed);

        // Confirmed → Completed skips Shipping
        let err = service
            .transition_status(&order.id, OrderStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_cancelled_order_is_frozen() {
        let db = test_db().await;
        seed_employee(&db, "emp-1").await;
        seed_variant(&db, "var-1", "TSH-RED-M", 10_000, 10, None).await;
        let service = db.order_service();

        let order = service.create_order(pos_cash_request("emp-1")).await.unwrap();
        service
            .transition_status(&order.id, OrderStatus::Cancelled)
            .await
            .unwrap();

        let err = service.add_line(&order.id, "var-1", 1).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::InvalidOrderStatus { .. })
        ));

        let err = service.finalize_payment(&order.id).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::InvalidOrderStatus { .. })
        ));
        // Cancellation does not restock: stock untouched either way
        assert_eq!(db.inventory().stock_of("var-1").await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_list_orders_filters_by_kind() {
        let db = test_db().await;
        seed_employee(&db, "emp-1").await;
        seed_customer(&db, "cust-1").await;
        let service = db.order_service();

        service.create_order(pos_cash_request("emp-1")).await.unwrap();
        service
            .create_order(CreateOrderRequest {
                customer_id: Some("cust-1".to_string()),
                kind: OrderKind::Online,
                ..pos_cash_request("emp-1")
            })
            .await
            .unwrap();

        let online = service.list_orders(Some(OrderKind::Online), 10, 0).await.unwrap();
        assert_eq!(online.len(), 1);
        assert_eq!(online[0].kind, OrderKind::Online);

        let all = service.list_orders(None, 10, 0).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_snapshot_uses_camel_case_wire_keys() {
        let db = test_db().await;
        seed_employee(&db, "emp-1").await;
        seed_variant(&db, "var-1", "TSH-RED-M", 10_000, 10, None).await;
        let service = db.order_service();

        let order = service.create_order(pos_cash_request("emp-1")).await.unwrap();
        let order = service.add_line(&order.id, "var-1", 2).await.unwrap();

        let snapshot = OrderSnapshot::from(&order);
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["orderCode"], order.order_code);
        assert_eq!(json["totalBillCents"], 20_000);
        assert_eq!(json["paymentMethod"], 0);
        assert_eq!(json["kind"], 1);
        assert!(json["customerId"].is_null());
        assert_eq!(json["lines"][0]["variantId"], "var-1");
    }
}
