use crate::StoreResult;
use mesa_core::catalog::{Banner, Category, Product};
use mesa_core::order::Order;
use mesa_core::settings::Settings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Every collection of the backend in one JSON document.
///
/// Used to seed a [`crate::MemoryStore`] and to persist it between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub banners: Vec<Banner>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

impl Snapshot {
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Writes pretty JSON, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
