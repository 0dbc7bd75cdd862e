//! Request extractors for admin.
//!
//! Request tracing is layered in `app`; Sentry layers are added in `main`.

pub mod shop;

pub use shop::CurrentShop;
