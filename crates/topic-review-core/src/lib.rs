//! Core types, configuration, and error handling for topic-review.
//!
//! This crate provides the shared foundation used by the pipeline and the CLI:
//! - [`TopicReviewError`] — unified error type using `thiserror`
//! - [`TopicReviewConfig`] — configuration loaded from `.topic-review.toml`
//! - Shared types: [`Topic`], [`ChangeNumber`], [`PatchSetRef`],
//!   [`ReviewRequest`], [`PatchOutcome`], [`RunSummary`]

mod config;
mod error;
mod types;

pub use config::{GerritConfig, ReviewConfig, TopicReviewConfig, DEFAULT_PORT};
pub use error::TopicReviewError;
pub use types::{
    ChangeNumber, PatchOutcome, PatchSetRef, ReviewRequest, RunSummary, SkipReason, Topic,
};
