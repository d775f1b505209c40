//! # MWD Common Library
//!
//! Shared code for the MWD blast analytics service:
//! - Error type and result alias
//! - Bootstrap configuration (TOML + environment)
//! - Database initialization, row models and storage queries

pub mod config;
pub mod db;
pub mod error;

pub use db::models::{BlastReport, Feature, HolePosition, MwdSample};
pub use error::{Error, Result};
