//! Settings repository.

use rusqlite::{params, Connection};

use crate::error::Result;
use crate::models::Setting;

/// Repository for settings operations.
pub struct SettingsRepo;

impl SettingsRepo {
    /// Get a setting.
    pub fn get(conn: &Connection, key: &str) -> Result<Option<Setting>> {
        let mut stmt = conn.prepare("SELECT key, value FROM settings WHERE key = ?1")?;

        let setting = stmt
            .query_row([key], |row| {
                let value_str: String = row.get(1)?;
                Ok(Setting {
                    key: row.get(0)?,
                    value: serde_json::from_str(&value_str).unwrap_or(serde_json::Value::Null),
                })
            })
            .ok();

        Ok(setting)
    }

    /// Set a setting (insert or update).
    pub fn set(conn: &Connection, key: &str, value: &serde_json::Value) -> Result<()> {
        let value_json = serde_json::to_string(value)?;

        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value_json],
        )?;

        Ok(())
    }

    /// Delete a setting.
    pub fn delete(conn: &Connection, key: &str) -> Result<bool> {
        let deleted = conn.execute("DELETE FROM settings WHERE key = ?1", [key])?;
        Ok(deleted > 0)
    }

    /// Get a typed setting value with a default.
    pub fn get_or<T: serde::de::DeserializeOwned>(
        conn: &Connection,
        key: &str,
        default: T,
    ) -> Result<T> {
        match Self::get(conn, key)? {
            Some(setting) => Ok(serde_json::from_value(setting.value).unwrap_or(default)),
            None => Ok(default),
        }
    }
}
