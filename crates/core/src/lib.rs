//! Core types and configuration for the trade-journal pipeline.
//!
//! This crate provides shared types used across all other crates:
//! - Ledger and trade types (executions, lots, round-trips, cash events)
//! - Feature and tag types
//! - Tag vocabulary (the contract between the rule engine and label builder)
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;
pub mod vocab;

pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use types::*;
