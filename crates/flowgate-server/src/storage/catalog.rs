//! Catalog seed.
//!
//! The catalog (categories, variants, menu, tables) is loaded from a JSON
//! file at start-up and written to the store with [`super::Store::seed`].

use std::{collections::HashSet, path::Path};

use flowgate_core::{Category, DiningTable, MenuItem, Variant};
use serde::{Deserialize, Serialize};

use super::StorageError;

/// Static business data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Product categories
    #[serde(default)]
    pub categories: Vec<Category>,
    /// Product variants with their opening stock
    #[serde(default)]
    pub variants: Vec<SeedVariant>,
    /// Restaurant menu
    #[serde(default)]
    pub menu_items: Vec<MenuItem>,
    /// Dining tables
    #[serde(default)]
    pub tables: Vec<DiningTable>,
}

/// A variant plus its opening stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedVariant {
    /// The variant
    #[serde(flatten)]
    pub variant: Variant,
    /// Units on hand when first seeded
    #[serde(default)]
    pub quantity: u32,
}

impl Catalog {
    /// Parse a catalog from JSON and check it.
    ///
    /// # Errors
    ///
    /// - `Serialization`: not valid catalog JSON
    /// - `Conflict`: duplicate id, or a variant in an unknown category
    pub fn from_json(bytes: &[u8]) -> Result<Self, StorageError> {
        let catalog: Self =
            serde_json::from_slice(bytes).map_err(|e| StorageError::Serialization(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Read and parse a catalog file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| StorageError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json(&bytes)
    }

    /// Variants without their stock.
    pub fn variant_list(&self) -> Vec<Variant> {
        self.variants.iter().map(|seed| seed.variant.clone()).collect()
    }

    fn validate(&self) -> Result<(), StorageError> {
        unique("category", self.categories.iter().map(|c| c.id.as_str()))?;
        unique("sku", self.variants.iter().map(|v| v.variant.sku.as_str()))?;
        unique("menu item", self.menu_items.iter().map(|m| m.id.as_str()))?;
        unique("table", self.tables.iter().map(|t| t.id.as_str()))?;

        let categories: HashSet<&str> = self.categories.iter().map(|c| c.id.as_str()).collect();
        if let Some(orphan) = self.variants.iter().find(|v| !categories.contains(v.variant.category_id.as_str())) {
            return Err(StorageError::Conflict(format!(
                "sku {} references unknown category {}",
                orphan.variant.sku, orphan.variant.category_id
            )));
        }
        Ok(())
    }
}

fn unique<'a>(kind: &str, ids: impl Iterator<Item = &'a str>) -> Result<(), StorageError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(StorageError::Conflict(format!("{kind} {id}")));
        }
    }
    Ok(())
}
