//! High-level database interface.

use std::path::PathBuf;

use directories::ProjectDirs;
use tracing::info;

use crate::error::{Result, StorageError};
use crate::models::Setting;
use crate::pool::ConnectionPool;
use crate::repository::SettingsRepo;

/// High-level settings database for Beacon.
#[derive(Clone)]
pub struct Database {
    pool: ConnectionPool,
}

impl Database {
    /// Create a new database in the default app data directory.
    pub fn new() -> Result<Self> {
        let path = Self::default_db_path()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        info!("Opening database at: {:?}", path);
        let pool = ConnectionPool::new(&path)?;

        Ok(Self { pool })
    }

    /// Create a new database at a specific path.
    pub fn with_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        info!("Opening database at: {:?}", path);
        let pool = ConnectionPool::new(&path)?;

        Ok(Self { pool })
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> Result<Self> {
        let pool = ConnectionPool::in_memory()?;
        Ok(Self { pool })
    }

    /// Get the default database path.
    pub fn default_db_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "beacon", "beacon")
            .ok_or_else(|| StorageError::Config("Could not determine app data directory".into()))?;

        Ok(proj_dirs.data_dir().join("beacon.db"))
    }

    /// Get a setting.
    pub fn get_setting(&self, key: &str) -> Result<Option<Setting>> {
        let conn = self.pool.get()?;
        SettingsRepo::get(&conn, key)
    }

    /// Set a setting.
    pub fn set_setting(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let conn = self.pool.get()?;
        SettingsRepo::set(&conn, key, value)
    }

    /// Get a typed setting value with a default.
    pub fn get_setting_or<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
        default: T,
    ) -> Result<T> {
        let conn = self.pool.get()?;
        SettingsRepo::get_or(&conn, key, default)
    }

    /// Delete a setting.
    pub fn delete_setting(&self, key: &str) -> Result<bool> {
        let conn = self.pool.get()?;
        SettingsRepo::delete(&conn, key)
    }
}
