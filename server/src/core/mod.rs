//! Core Module
//!
//! Configuration, shared application state and the HTTP server shell.

pub mod config;
pub mod server;
pub mod state;

pub use config::Config;
pub use server::Server;
pub use state::AppState;
