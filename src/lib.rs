//! SawitDB - ordered secondary indexes for an embedded, file-backed table store.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            SawitDB                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │        Query Layer (external): parser → executor         │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │          │ =, <, >, BETWEEN              │ row mutations        │
//! │          ↓                               ↓                      │
//! │  ┌─────────────────────────┐   ┌──────────────────────────┐    │
//! │  │   Index Layer (index/)  │   │   CDC Hooks (cdc/)        │    │
//! │  │ OrderedIndex (B+Tree)   │   │ EventBus → listeners      │    │
//! │  │ SharedIndex (RwLock)    │   │ CdcLogWriter (crc32 log)  │    │
//! │  └─────────────────────────┘   └──────────────────────────┘    │
//! │          ↑ record refs                                          │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │        Storage Layer (external): table files             │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (RecordId, Error, config)
//! - [`index`] - Ordered B+Tree index and its thread-safe handle
//! - [`cdc`] - Table event listeners and the CDC log
//!
//! # Quick Start
//! ```
//! use sawitdb::common::IndexConfig;
//! use sawitdb::index::{IndexKey, OrderedIndex};
//! use sawitdb::RecordId;
//!
//! let config = IndexConfig::new().with_name("idx_users_umur").with_key_field("umur");
//! let mut index = OrderedIndex::with_config(config).unwrap();
//!
//! index.insert(IndexKey::from(17), RecordId::new(0, 0));
//! index.insert(IndexKey::from(20), RecordId::new(0, 1));
//!
//! let teens = index.range(&IndexKey::from(13), &IndexKey::from(19));
//! assert_eq!(teens, vec![RecordId::new(0, 0)]);
//! ```

pub mod cdc;
pub mod common;
pub mod index;

// Re-export commonly used items at crate root for convenience
pub use common::config::DEFAULT_ORDER;
pub use common::{Error, RecordId, Result};

pub use cdc::{CdcLogWriter, EventBus, TableEvent, TableEventKind, TableEventListener};
pub use index::{IndexKey, IndexStats, OrderedIndex, SharedIndex};
