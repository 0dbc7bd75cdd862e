//! Domain models for admin.

pub mod audit_log;
pub mod settings;

pub use audit_log::{AuditLog, NewAuditLog};
pub use settings::{Settings, SettingsView};
