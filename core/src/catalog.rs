//! Catalog documents: categories, products with variation groups, banners.

use crate::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub order: u32,
    pub active: bool,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

/// One choice inside a variation group. `price` is a signed delta on the base price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariationOption {
    pub id: String,
    pub name: String,
    pub price: Money,
}

/// A group of options such as "Size" or "Extras".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variation {
    pub id: String,
    pub name: String,
    pub options: Vec<VariationOption>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub multi_select: bool,
}

impl Variation {
    pub fn option(&self, option_id: &str) -> Option<&VariationOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    fn option_position(&self, option_id: &str) -> usize {
        self.options
            .iter()
            .position(|o| o.id == option_id)
            .unwrap_or(usize::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub category_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub active: bool,
    pub order: u32,
    #[serde(default)]
    pub variations: Vec<Variation>,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// A new active product with no variations.
    pub fn new(
        id: impl Into<String>,
        category_id: impl Into<String>,
        name: impl Into<String>,
        price: Money,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            category_id: category_id.into(),
            name: name.into(),
            description: String::new(),
            price,
            image_url: None,
            active: true,
            order: 0,
            variations: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_variation(mut self, variation: Variation) -> Self {
        self.variations.push(variation);
        self
    }

    pub fn variation(&self, variation_id: &str) -> Option<&Variation> {
        self.variations.iter().find(|v| v.id == variation_id)
    }

    pub(crate) fn variation_position(&self, variation_id: &str) -> usize {
        self.variations
            .iter()
            .position(|v| v.id == variation_id)
            .unwrap_or(usize::MAX)
    }

    pub(crate) fn selection_rank(&self, variation_id: &str, option_id: &str) -> (usize, usize) {
        let group = self.variation_position(variation_id);
        let option = self
            .variation(variation_id)
            .map(|v| v.option_position(option_id))
            .unwrap_or(usize::MAX);
        (group, option)
    }

    /// Checks the rules the back office enforces before saving a product.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::MissingName);
        }
        if self.price.is_negative() {
            return Err(CatalogError::NegativePrice(self.name.clone()));
        }

        let mut group_ids = HashSet::new();
        for variation in &self.variations {
            if variation.name.trim().is_empty() {
                return Err(CatalogError::UnnamedVariation(variation.id.clone()));
            }
            if !group_ids.insert(variation.id.as_str()) {
                return Err(CatalogError::DuplicateVariation(variation.id.clone()));
            }
            if variation.options.is_empty() {
                return Err(CatalogError::EmptyVariation(variation.name.clone()));
            }

            let mut option_ids = HashSet::new();
            for option in &variation.options {
                if option.name.trim().is_empty() {
                    return Err(CatalogError::UnnamedOption(variation.name.clone()));
                }
                if !option_ids.insert(option.id.as_str()) {
                    return Err(CatalogError::DuplicateOption {
                        variation: variation.name.clone(),
                        option: option.id.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub id: String,
    pub title: String,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub order: u32,
    pub active: bool,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("product name is required")]
    MissingName,
    #[error("product '{0}' has a negative base price")]
    NegativePrice(String),
    #[error("variation '{0}' has no name")]
    UnnamedVariation(String),
    #[error("variation id '{0}' is used twice")]
    DuplicateVariation(String),
    #[error("variation '{0}' has no options")]
    EmptyVariation(String),
    #[error("variation '{0}' has an option without a name")]
    UnnamedOption(String),
    #[error("variation '{variation}' repeats option id '{option}'")]
    DuplicateOption { variation: String, option: String },
}

/// Anything listed by its admin-defined position.
pub trait Ordered {
    fn position(&self) -> u32;
    fn is_active(&self) -> bool;
}

impl Ordered for Category {
    fn position(&self) -> u32 {
        self.order
    }
    fn is_active(&self) -> bool {
        self.active
    }
}

impl Ordered for Product {
    fn position(&self) -> u32 {
        self.order
    }
    fn is_active(&self) -> bool {
        self.active
    }
}

impl Ordered for Banner {
    fn position(&self) -> u32 {
        self.order
    }
    fn is_active(&self) -> bool {
        self.active
    }
}

/// Sort by position ascending. Stable, so equal positions keep insertion order.
pub fn sort_by_position<T: Ordered>(items: &mut [T]) {
    items.sort_by_key(Ordered::position);
}

/// The storefront view: active entries only, by position.
pub fn storefront<T: Ordered + Clone>(items: &[T]) -> Vec<T> {
    let mut visible: Vec<T> = items.iter().filter(|i| i.is_active()).cloned().collect();
    sort_by_position(&mut visible);
    visible
}
