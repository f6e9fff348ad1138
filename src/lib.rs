//! Chorebook - household chores and shared expenses
//!
//! This library provides the core of the Chorebook application: a shared
//! chore rota with recurring chores and missed-chore tracking, and an
//! expense ledger that splits costs equally between members and settles
//! them through recorded payments. Members can also report household
//! issues as alerts and track them until resolved.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (members, chores, expenses, payments, alerts)
//! - `ledger`: Share computation and settlement rules for expenses
//! - `recurrence`: Next-occurrence and missed-chore rules
//! - `directory`: Household membership and permission checks
//! - `storage`: JSON file storage layer with locked, write-through mutations
//! - `audit`: Audit logging system
//! - `services`: Business logic layer
//! - `reports`: Dashboard and balance reports
//! - `export`: CSV and JSON export
//!
//! # Example
//!
//! ```rust,ignore
//! use chorebook::config::{paths::ChorebookPaths, settings::Settings};
//! use chorebook::storage::Storage;
//!
//! let paths = ChorebookPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::with_audit(paths, settings.audit_enabled)?;
//! storage.load_all()?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod directory;
pub mod display;
pub mod error;
pub mod export;
pub mod ledger;
pub mod models;
pub mod recurrence;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{ChorebookError, ChorebookResult};
