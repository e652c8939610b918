//! Orchestration for the newsprice system.
//!
//! This crate provides:
//! - Provider traits for price and news sources
//! - Yahoo Finance implementations of both
//! - JSON snapshot persistence
//! - The fetch -> parse -> align -> persist pipeline

pub mod pipeline;
pub mod provider;
pub mod snapshot;
pub mod yahoo;

pub use pipeline::{prepare, prepare_from_snapshots, Pipeline, RawData, RunReport};
pub use provider::{NewsProvider, PriceProvider, PriceRequest};
pub use snapshot::SnapshotStore;
pub use yahoo::YahooClient;
