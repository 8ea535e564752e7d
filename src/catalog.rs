use std::collections::HashSet;

use serde::{Deserialize, Serialize};

const BUILTIN_CATALOG: &str = include_str!("../assets/catalog.json");
pub const MAX_RATING: f32 = 5.0;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate catalog id: {0}")]
    DuplicateId(u32),
    #[error("item {id} has rating {rating} outside 0..=5")]
    InvalidRating { id: u32, rating: f32 },
}

/// Read-only product reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: u32,
    pub name: String,
    pub category: String,
    pub price_cents: u32,
    pub rating: f32,
    pub image: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    pub fn new(items: Vec<CatalogItem>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id) {
                return Err(CatalogError::DuplicateId(item.id));
            }
            if !(0.0..=MAX_RATING).contains(&item.rating) {
                return Err(CatalogError::InvalidRating { id: item.id, rating: item.rating });
            }
        }
        Ok(Self { items })
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        Self::new(serde_json::from_str(raw)?)
    }

    /// The catalog shipped with the storefront.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn get(&self, id: u32) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
