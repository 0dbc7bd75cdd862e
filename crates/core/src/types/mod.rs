//! Core types for the expiration manager.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod expiration;
pub mod id;
pub mod shop;
pub mod status;

pub use expiration::*;
pub use id::*;
pub use shop::{ShopDomain, ShopDomainError};
pub use status::*;
