//! Core business logic for Storebooks.
//!
//! This crate contains the journal engine with ZERO web or database dependencies.
//! Persistence and lookups are reached through async traits implemented elsewhere.
//!
//! # Modules
//!
//! - `catalog` - Account catalog, reference listings and session caching
//! - `journal` - Line editing, validation, payload composition and saving

pub mod catalog;
pub mod journal;
