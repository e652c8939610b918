//! Labeling for the newsprice system.
//!
//! This crate handles:
//! - News-to-price alignment (publish bucket vs. one window later)
//! - Alignment drop accounting
//! - Label distribution summaries

pub mod aligner;
pub mod summary;

pub use aligner::{align, Aligner, AlignStats, Alignment, DropReason};
pub use summary::DatasetSummary;
