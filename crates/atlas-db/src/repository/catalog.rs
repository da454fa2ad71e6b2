//! # Catalog Repository
//!
//! Lookups for the reference data an order needs: customers, employees,
//! vouchers, and product variants with their attached promotion.
//!
//! ## Variant + Promotion Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │               How a Variant Reaches the Pricing Engine                  │
//! │                                                                         │
//! │  find_variant("var-1")                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SELECT v.*, p.* FROM product_variants v                                │
//! │  LEFT JOIN promotions p ON p.id = v.promotion_id                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                            │
//! │  │ ProductVariant                          │                            │
//! │  │   sku: "TSH-RED-M"                      │                            │
//! │  │   sale_price_cents: 10_000              │                            │
//! │  │   promotion: Some(Promotion { 10%.. }) │ ← resolved by the join     │
//! │  └─────────────────────────────────────────┘                            │
//! │                                                                         │
//! │  Whether the promotion actually discounts is decided later, at         │
//! │  pricing time, against the sale timestamp. The repository never        │
//! │  filters promotions by window.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteExecutor;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use atlas_core::{
    Customer, Employee, LinePricing, Money, ProductVariant, Promotion, Voucher,
};

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, FromRow)]
struct CustomerRow {
    id: String,
    full_name: String,
    is_active: bool,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            full_name: row.full_name,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, FromRow)]
struct EmployeeRow {
    id: String,
    full_name: String,
    is_active: bool,
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        Employee {
            id: row.id,
            full_name: row.full_name,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, FromRow)]
struct VoucherRow {
    id: String,
    code: String,
    min_subtotal_cents: i64,
    reduced_percent: i64,
    max_discount_cents: i64,
    is_active: bool,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
}

impl From<VoucherRow> for Voucher {
    fn from(row: VoucherRow) -> Self {
        Voucher {
            id: row.id,
            code: row.code,
            min_subtotal_cents: row.min_subtotal_cents,
            // CHECK (reduced_percent BETWEEN 0 AND 100) holds the range
            reduced_percent: row.reduced_percent as u32,
            max_discount_cents: row.max_discount_cents,
            is_active: row.is_active,
            starts_at: row.starts_at,
            ends_at: row.ends_at,
        }
    }
}

/// One variant row with its (optional) joined promotion. The promotion
/// columns are all-or-nothing: either the LEFT JOIN matched and every
/// `promo_*` column is set, or none are.
#[derive(Debug, FromRow)]
struct VariantRow {
    id: String,
    sku: String,
    name: String,
    sale_price_cents: i64,
    stock: i64,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    promo_id: Option<String>,
    promo_name: Option<String>,
    promo_percent: Option<i64>,
    promo_is_active: Option<bool>,
    promo_starts_at: Option<DateTime<Utc>>,
    promo_ends_at: Option<DateTime<Utc>>,
}

impl VariantRow {
    fn into_variant(self) -> ProductVariant {
        let VariantRow {
            id,
            sku,
            name,
            sale_price_cents,
            stock,
            is_active,
            created_at,
            updated_at,
            promo_id,
            promo_name,
            promo_percent,
            promo_is_active,
            promo_starts_at,
            promo_ends_at,
        } = self;

        let promotion = match (
            promo_id,
            promo_name,
            promo_percent,
            promo_is_active,
            promo_starts_at,
            promo_ends_at,
        ) {
            (Some(pid), Some(pname), Some(percent), Some(active), Some(starts), Some(ends)) => {
                Some(Promotion {
                    id: pid,
                    name: pname,
                    percent: percent as u32,
                    is_active: active,
                    starts_at: starts,
                    ends_at: ends,
                })
            }
            _ => None,
        };

        ProductVariant {
            id,
            sku,
            name,
            sale_price_cents,
            stock,
            promotion,
            is_active,
            created_at,
            updated_at,
        }
    }
}

const VARIANT_SELECT: &str = r#"
    SELECT
        v.id, v.sku, v.name, v.sale_price_cents, v.stock,
        v.is_active, v.created_at, v.updated_at,
        p.id AS promo_id,
        p.name AS promo_name,
        p.percent AS promo_percent,
        p.is_active AS promo_is_active,
        p.starts_at AS promo_starts_at,
        p.ends_at AS promo_ends_at
    FROM product_variants v
    LEFT JOIN promotions p ON p.id = v.promotion_id
"#;

// =============================================================================
// Executor-Generic Helpers
// =============================================================================
//
// These take any executor so the same SQL serves both pool-backed reads
// and reads inside an open transaction.

pub(crate) async fn variant_with_promotion<'e, E>(
    exec: E,
    variant_id: &str,
) -> DbResult<Option<ProductVariant>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("{VARIANT_SELECT} WHERE v.id = ?1");
    let row: Option<VariantRow> = sqlx::query_as(&sql)
        .bind(variant_id)
        .fetch_optional(exec)
        .await?;

    Ok(row.map(VariantRow::into_variant))
}

pub(crate) async fn voucher_by_id<'e, E>(exec: E, voucher_id: &str) -> DbResult<Option<Voucher>>
where
    E: SqliteExecutor<'e>,
{
    let row: Option<VoucherRow> = sqlx::query_as(
        r#"
        SELECT id, code, min_subtotal_cents, reduced_percent,
               max_discount_cents, is_active, starts_at, ends_at
        FROM vouchers
        WHERE id = ?1
        "#,
    )
    .bind(voucher_id)
    .fetch_optional(exec)
    .await?;

    Ok(row.map(Voucher::from))
}

#[derive(Debug, FromRow)]
struct LinePricingRow {
    variant_id: String,
    sku: String,
    quantity: i64,
    sale_price_cents: i64,
    promo_id: Option<String>,
    promo_name: Option<String>,
    promo_percent: Option<i64>,
    promo_is_active: Option<bool>,
    promo_starts_at: Option<DateTime<Utc>>,
    promo_ends_at: Option<DateTime<Utc>>,
}

/// Loads the pricing inputs for every line of an order in one query:
/// quantity from the line, current list price and promotion from the
/// variant. Used by recompute-on-mutation and by checkout.
pub(crate) async fn line_pricings<'e, E>(exec: E, order_id: &str) -> DbResult<Vec<LinePricing>>
where
    E: SqliteExecutor<'e>,
{
    let rows: Vec<LinePricingRow> = sqlx::query_as(
        r#"
        SELECT
            l.variant_id, v.sku, l.quantity, v.sale_price_cents,
            p.id AS promo_id,
            p.name AS promo_name,
            p.percent AS promo_percent,
            p.is_active AS promo_is_active,
            p.starts_at AS promo_starts_at,
            p.ends_at AS promo_ends_at
        FROM order_lines l
        INNER JOIN product_variants v ON v.id = l.variant_id
        LEFT JOIN promotions p ON p.id = v.promotion_id
        WHERE l.order_id = ?1
        ORDER BY l.rowid
        "#,
    )
    .bind(order_id)
    .fetch_all(exec)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let promotion = match (
                row.promo_id,
                row.promo_name,
                row.promo_percent,
                row.promo_is_active,
                row.promo_starts_at,
                row.promo_ends_at,
            ) {
                (Some(id), Some(name), Some(percent), Some(active), Some(starts), Some(ends)) => {
                    Some(Promotion {
                        id,
                        name,
                        percent: percent as u32,
                        is_active: active,
                        starts_at: starts,
                        ends_at: ends,
                    })
                }
                _ => None,
            };

            LinePricing {
                variant_id: row.variant_id,
                sku: row.sku,
                quantity: row.quantity,
                list_price: Money::from_cents(row.sale_price_cents),
                promotion,
            }
        })
        .collect())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog lookups.
///
/// ## Usage
/// ```rust,ignore
/// let repo = CatalogRepository::new(pool);
///
/// let variant = repo.find_variant("uuid-here").await?;
/// let voucher = repo.find_voucher_by_code("SAVE20").await?;
/// ```
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Fetches a customer by id.
    pub async fn find_customer(&self, id: &str) -> DbResult<Customer> {
        debug!(customer_id = %id, "Fetching customer");

        let row: Option<CustomerRow> = sqlx::query_as(
            "SELECT id, full_name, is_active FROM customers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Customer::from)
            .ok_or_else(|| DbError::not_found("customer", id))
    }

    /// Fetches an employee by id.
    pub async fn find_employee(&self, id: &str) -> DbResult<Employee> {
        debug!(employee_id = %id, "Fetching employee");

        let row: Option<EmployeeRow> = sqlx::query_as(
            "SELECT id, full_name, is_active FROM employees WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Employee::from)
            .ok_or_else(|| DbError::not_found("employee", id))
    }

    /// Fetches a voucher by id.
    pub async fn find_voucher(&self, id: &str) -> DbResult<Voucher> {
        voucher_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| DbError::not_found("voucher", id))
    }

    /// Fetches a voucher by its business code (the code printed on the
    /// voucher, unique).
    pub async fn find_voucher_by_code(&self, code: &str) -> DbResult<Voucher> {
        debug!(voucher_code = %code, "Fetching voucher by code");

        let row: Option<VoucherRow> = sqlx::query_as(
            r#"
            SELECT id, code, min_subtotal_cents, reduced_percent,
                   max_discount_cents, is_active, starts_at, ends_at
            FROM vouchers
            WHERE code = ?1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Voucher::from)
            .ok_or_else(|| DbError::not_found("voucher", code))
    }

    /// Fetches a product variant by id, with its promotion resolved.
    pub async fn find_variant(&self, id: &str) -> DbResult<ProductVariant> {
        debug!(variant_id = %id, "Fetching variant");

        variant_with_promotion(&self.pool, id)
            .await?
            .ok_or_else(|| DbError::not_found("product variant", id))
    }

    /// Fetches a product variant by SKU, with its promotion resolved.
    pub async fn find_variant_by_sku(&self, sku: &str) -> DbResult<ProductVariant> {
        debug!(sku = %sku, "Fetching variant by SKU");

        let sql = format!("{VARIANT_SELECT} WHERE v.sku = ?1");
        let row: Option<VariantRow> = sqlx::query_as(&sql)
            .bind(sku)
            .fetch_optional(&self.pool)
            .await?;

        row.map(VariantRow::into_variant)
            .ok_or_else(|| DbError::not_found("product variant", sku))
    }
}
