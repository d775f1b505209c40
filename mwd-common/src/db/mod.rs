//! Database schema, row models and queries

pub mod init;
pub mod models;
pub mod positions;
pub mod reports;
pub mod samples;

pub use init::*;
pub use models::*;
