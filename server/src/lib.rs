//! Storefront reservation / order-commit server
//!
//! Finite-inventory stock reservation for an online storefront: holding
//! stock against a customer's cart, converting that hold into a durable
//! order exactly once, and reconciling stock when holds expire or
//! payments fail.
//!
//! # Modules
//!
//! - [`inventory`] - stock ledger with conditional writes and bounded retry
//! - [`cart`] - per-customer reservation lifecycle and expiry reaping
//! - [`checkout`] - pricing and transactional order commitment
//! - [`payment`] - idempotent webhook-driven payment confirmation
//! - [`db`] - embedded SurrealDB, models, repositories, transactions
//! - [`api`] - HTTP surface
//! - [`auth`] - JWT boundary to the external authentication service

pub mod api;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod core;
pub mod db;
pub mod inventory;
pub mod payment;
pub mod utils;

pub use crate::core::{AppState, Config, Server};
pub use utils::{AppError, AppResult};

/// Create the work directory and initialize logging
pub fn setup_environment(config: &Config) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.work_dir)?;
    let log_dir = format!("{}/logs", config.work_dir);
    std::fs::create_dir_all(&log_dir)?;

    let level = if config.is_production() { "info" } else { "debug" };
    utils::logger::init_logger_with_file(Some(level), Some(&log_dir));
    Ok(())
}
