//! Beacon Storage - SQLite settings persistence.
//!
//! This crate provides the local settings store used by the rest of Beacon.
//! Settings are key-value pairs with JSON values, so callers can store
//! strings, booleans, and structured values through one interface.
//!
//! # Example
//!
//! ```no_run
//! use beacon_storage::Database;
//! use serde_json::json;
//!
//! let db = Database::in_memory().unwrap();
//!
//! db.set_setting("useSystemProxy", &json!(true)).unwrap();
//!
//! // Missing keys fall back to the provided default.
//! let rules: String = db.get_setting_or("proxyRules", String::new()).unwrap();
//! assert!(rules.is_empty());
//! ```

mod database;
pub mod error;
pub mod models;
mod pool;
mod repository;
mod schema;

pub use database::Database;
pub use error::{Result, StorageError};
pub use models::Setting;
pub use pool::ConnectionPool;
