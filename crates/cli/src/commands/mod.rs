//! CLI subcommands.

pub mod definitions;
pub mod migrate;
