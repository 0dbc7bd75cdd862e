//! Domain types for Shopify Admin API.
//!
//! These types provide a clean, ergonomic API separate from the raw
//! GraphQL response shapes in `admin::queries`.

pub mod common;
pub mod product;

pub use common::*;
pub use product::*;
