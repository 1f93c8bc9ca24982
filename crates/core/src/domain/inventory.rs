use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stock-keeping unit identifier. Only uppercase ASCII letters, digits, and
/// hyphens are representable; anything else fails `parse`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Sku(String);

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SkuError {
    #[error("sku is empty")]
    Empty,
    #[error("sku contains characters outside A-Z, 0-9, and `-`: `{0}`")]
    InvalidCharset(String),
}

impl Sku {
    pub fn parse(raw: &str) -> Result<Self, SkuError> {
        if raw.is_empty() {
            return Err(SkuError::Empty);
        }
        let allowed =
            raw.bytes().all(|byte| byte.is_ascii_uppercase() || byte.is_ascii_digit() || byte == b'-');
        if !allowed {
            return Err(SkuError::InvalidCharset(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Sku {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Sku::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: Sku,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub unit_price: Decimal,
}

/// Read-only lookup capability the executor borrows per turn. The engine
/// never owns inventory data.
pub trait InventoryLookup {
    fn find(&self, sku: &Sku) -> Option<&InventoryItem>;
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    items: Vec<InventoryItem>,
}

#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("could not read catalog file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse catalog file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: serde_json::Error },
}

impl Catalog {
    pub fn new(items: Vec<InventoryItem>) -> Self {
        Self { items }
    }

    pub fn load_json(path: &Path) -> Result<Self, CatalogLoadError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| CatalogLoadError::ReadFile { path: path.to_path_buf(), source })?;
        let items = serde_json::from_str::<Vec<InventoryItem>>(&raw)
            .map_err(|source| CatalogLoadError::ParseFile { path: path.to_path_buf(), source })?;
        Ok(Self::new(items))
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl InventoryLookup for Catalog {
    fn find(&self, sku: &Sku) -> Option<&InventoryItem> {
        self.items.iter().find(|item| &item.id == sku)
    }
}
