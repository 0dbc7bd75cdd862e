//! Expiration Manager Core - Shared types library.
//!
//! This crate provides common types used across the expiration manager:
//! - `admin` - Merchant-facing expiration admin service
//! - `cli` - Command-line tools for migrations and metafield bootstrap
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps the date logic testable in isolation.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, shop domains, expiration fields and status evaluation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
