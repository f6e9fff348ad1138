//! Audit trail for Chorebook
//!
//! Every create, update and delete of a household record is appended to a
//! line-delimited JSON log with before/after snapshots.
//!
//! - `AuditEntry`: one operation on one entity.
//! - `AuditLogger`: append/read access to the JSONL file.
//! - `generate_diff`: compact field-level summary of an update.

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
