//! Common utilities shared across the forum crates.
//!
//! This crate provides:
//! - Unified error handling with single-match lookup helpers
//! - Configuration structures

pub mod config;
pub mod error;

pub use config::*;
pub use error::{single_match, AppError, AppResult, OptionExt};
