//! # Repository Layer
//!
//! Database access organized by aggregate:
//! - [`catalog`] - customers, employees, vouchers, product variants
//! - [`order`] - orders and their lines
//! - [`inventory`] - conditional stock decrements
//!
//! Repositories hold a pool clone and expose async methods returning
//! `DbResult<T>`. Pure pricing and state-machine logic lives in
//! `atlas-core`; repositories only move rows.

pub mod catalog;
pub mod inventory;
pub mod order;
