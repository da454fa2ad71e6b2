//! # atlas-db: Database Layer for Atlas POS
//!
//! This crate provides storage and transactional order workflows for the
//! Atlas POS order subsystem. It uses SQLite for storage with sqlx for
//! async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Atlas POS Data Flow                              │
//! │                                                                         │
//! │  Caller (HTTP handler, terminal command, ...)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     atlas-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ OrderService  │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │ (service.rs)  │    │ (catalog/     │    │  (embedded)  │  │   │
//! │  │   │               │    │  order/       │    │              │  │   │
//! │  │   │ create_order  │───►│  inventory)   │    │ 001_init.sql │  │   │
//! │  │   │ add_line      │    │               │    │ ...          │  │   │
//! │  │   │ finalize      │    └───────┬───────┘    └──────────────┘  │   │
//! │  │   └───────┬───────┘            │                              │   │
//! │  │           │     pricing rules  │                              │   │
//! │  │           ▼                    ▼                              │   │
//! │  │      atlas-core         Database (pool.rs)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │        WAL mode, foreign keys on, CHECK (stock >= 0)            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (catalog, order, inventory)
//! - [`service`] - Transactional order workflows
//!
//! ## Usage
//!
//! ```rust,ignore
//! use atlas_db::{Database, DbConfig};
//!
//! // Create database with default config
//! let config = DbConfig::new("path/to/atlas.db");
//! let db = Database::new(config).await?;
//!
//! // Run an order through its life
//! let service = db.order_service();
//! let order = service.create_order(request).await?;
//! let order = service.add_line(&order.id, variant_id, 2).await?;
//! let order = service.finalize_payment(&order.id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use service::{
    CreateOrderRequest, LineSnapshot, OrderService, OrderSnapshot, ServiceError, ServiceResult,
};

// Repository re-exports for convenience
pub use repository::catalog::CatalogRepository;
pub use repository::inventory::InventoryLedger;
pub use repository::order::OrderRepository;
