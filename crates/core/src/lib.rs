//! Core types and configuration for the newsprice system.
//!
//! This crate provides shared types used across all other crates:
//! - Price samples, news items and labeled records
//! - Time bucketing
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
