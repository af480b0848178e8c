#![forbid(unsafe_code)]

//! SQLite-backed registry of dynamically created list tables and the generic
//! record operations that run against them.

mod store;

pub use sl_core::ids::{TABLE_PREFIX, TableId, TableIdError};
pub use sl_core::model::{Record, RecordDraft, TableEntry};
pub use store::*;
