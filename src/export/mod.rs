//! Export module for Chorebook
//!
//! - CSV: expenses and their payments, one row each (spreadsheet-friendly)
//! - JSON: a full snapshot of one household

pub mod csv;
pub mod json;

pub use self::csv::{export_expenses_csv, export_payments_csv};
pub use self::json::{export_household_json, import_from_json, HouseholdExport, EXPORT_SCHEMA_VERSION};
