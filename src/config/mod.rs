//! Configuration module for Chorebook
//!
//! - Platform path resolution (with an env var override)
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::ChorebookPaths;
pub use settings::Settings;
