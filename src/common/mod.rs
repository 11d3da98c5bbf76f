//! Common types and utilities shared across SawitDB.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration (index order, CDC settings)
//! - Error types
//! - Identifiers (RecordId)

pub mod config;
pub mod error;
mod record_id;

pub use config::{CdcAdapter, CdcConfig, IndexConfig};
pub use error::{Error, Result};
pub use record_id::RecordId;
