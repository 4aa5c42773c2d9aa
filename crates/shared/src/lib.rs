//! Shared identifiers, amount helpers, errors, and configuration for Storebooks.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe references to companies, stores, accounts, entries
//! - Amount helpers built on `rust_decimal` (no floats anywhere)
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, ClientConfig, JournalConfig};
pub use error::{AppError, AppResult};
