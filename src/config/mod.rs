//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ConnectionConfig, AdminEntry)
//! - [`validation`]: Load-time checks that report every problem at once
//!
//! MUC room settings are deliberately not validated here; the session checks
//! them when the connection comes online.

mod types;
mod validation;

pub use types::{AdminEntry, Config, ConfigError, ConnectionConfig};
pub use validation::{ValidationError, validate};
