//! # Cart
//!
//! The shopping cart a customer builds before checkout.
//!
//! A line is only accepted once its variation choices are consistent with the
//! product: every referenced group/option exists, single-select groups hold at
//! most one option, and every required group has a selection. Choices are
//! resolved into [`SelectedOption`] snapshots at add time, so the line prices
//! itself without going back to the catalog.

use crate::catalog::Product;
use crate::money::Money;
use crate::pricing;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: u32 = 999;

/// A customer's choice of one option inside one variation group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub variation_id: String,
    pub option_id: String,
}

impl Selection {
    pub fn new(variation_id: impl Into<String>, option_id: impl Into<String>) -> Self {
        Self {
            variation_id: variation_id.into(),
            option_id: option_id.into(),
        }
    }
}

/// A resolved selection, copied by value from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedOption {
    pub variation_id: String,
    pub variation_name: String,
    pub option_id: String,
    pub option_name: String,
    pub price: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(Uuid);

impl LineId {
    pub fn new() -> Self {
        LineId(Uuid::new_v4())
    }
}

impl Default for LineId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: LineId,
    pub product: Product,
    pub quantity: u32,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub options: Vec<SelectedOption>,
}

impl CartLine {
    pub fn unit_price(&self) -> Money {
        pricing::unit_price(self.product.price, self.options.iter().map(|o| o.price))
    }

    pub fn total(&self) -> Money {
        pricing::line_total(self.unit_price(), self.quantity)
    }

    fn checked_total_at(&self, quantity: u32) -> Option<Money> {
        pricing::checked_line_total(
            self.product.price,
            self.options.iter().map(|o| o.price),
            quantity,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("product '{0}' is not available")]
    ProductUnavailable(String),
    #[error("quantity must be between 1 and {}", MAX_LINE_QUANTITY)]
    InvalidQuantity,
    #[error("cart amount is too large")]
    AmountTooLarge,
    #[error("product '{product}' has no variation '{variation}'")]
    UnknownVariation { product: String, variation: String },
    #[error("variation '{variation}' has no option '{option}'")]
    UnknownOption { variation: String, option: String },
    #[error("option '{option}' selected twice in '{variation}'")]
    DuplicateSelection { variation: String, option: String },
    #[error("'{0}' accepts a single option")]
    TooManyOptions(String),
    #[error("'{0}' requires a selection")]
    MissingRequired(String),
    #[error("cart line {0} not found")]
    LineNotFound(LineId),
}

/// Validates `selections` against `product` and returns the resolved options in
/// catalog order (group order, then option order).
pub fn resolve_selections(
    product: &Product,
    selections: &[Selection],
) -> Result<Vec<SelectedOption>, CartError> {
    let mut seen = HashSet::new();
    let mut per_group: HashMap<&str, usize> = HashMap::new();
    let mut resolved = Vec::with_capacity(selections.len());

    for selection in selections {
        let variation = product.variation(&selection.variation_id).ok_or_else(|| {
            CartError::UnknownVariation {
                product: product.name.clone(),
                variation: selection.variation_id.clone(),
            }
        })?;
        let option = variation
            .option(&selection.option_id)
            .ok_or_else(|| CartError::UnknownOption {
                variation: variation.name.clone(),
                option: selection.option_id.clone(),
            })?;

        if !seen.insert(selection) {
            return Err(CartError::DuplicateSelection {
                variation: variation.name.clone(),
                option: option.name.clone(),
            });
        }

        let count = per_group.entry(variation.id.as_str()).or_default();
        *count += 1;
        if !variation.multi_select && *count > 1 {
            return Err(CartError::TooManyOptions(variation.name.clone()));
        }

        resolved.push(SelectedOption {
            variation_id: variation.id.clone(),
            variation_name: variation.name.clone(),
            option_id: option.id.clone(),
            option_name: option.name.clone(),
            price: option.price,
        });
    }

    if let Some(missing) = product
        .variations
        .iter()
        .find(|v| v.required && !per_group.contains_key(v.id.as_str()))
    {
        return Err(CartError::MissingRequired(missing.name.clone()));
    }

    resolved.sort_by_key(|o| product.selection_rank(&o.variation_id, &o.option_id));
    Ok(resolved)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new line. Every add creates its own line, so the same product
    /// with different choices stays separate.
    pub fn add(
        &mut self,
        product: &Product,
        quantity: u32,
        notes: impl Into<String>,
        selections: &[Selection],
    ) -> Result<LineId, CartError> {
        if !product.active {
            return Err(CartError::ProductUnavailable(product.name.clone()));
        }
        if quantity == 0 || quantity > MAX_LINE_QUANTITY {
            return Err(CartError::InvalidQuantity);
        }
        let options = resolve_selections(product, selections)?;

        let line = CartLine {
            id: LineId::new(),
            product: product.clone(),
            quantity,
            notes: notes.into(),
            options,
        };
        self.ensure_fits(&line, quantity, None)?;
        let id = line.id;
        tracing::debug!(line = %id, product = %product.id, quantity, "cart line added");
        self.lines.push(line);
        Ok(id)
    }

    pub fn remove(&mut self, id: LineId) -> Option<CartLine> {
        let index = self.lines.iter().position(|l| l.id == id)?;
        Some(self.lines.remove(index))
    }

    /// Setting a quantity of zero removes the line.
    pub fn set_quantity(&mut self, id: LineId, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return self
                .remove(id)
                .map(|_| ())
                .ok_or(CartError::LineNotFound(id));
        }
        if quantity > MAX_LINE_QUANTITY {
            return Err(CartError::InvalidQuantity);
        }
        let line = self.line(id).ok_or(CartError::LineNotFound(id))?;
        self.ensure_fits(line, quantity, Some(id))?;
        self.line_mut(id)?.quantity = quantity;
        Ok(())
    }

    pub fn set_notes(&mut self, id: LineId, notes: impl Into<String>) -> Result<(), CartError> {
        self.line_mut(id)?.notes = notes.into();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, id: LineId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::total).sum()
    }

    /// Sum of quantities, as shown on the cart badge.
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |count, l| count.saturating_add(l.quantity))
    }

    /// Rejects `line` at `quantity` when its total, or the subtotal with it,
    /// would leave the `i64` range. `replacing` is left out of the sum.
    fn ensure_fits(
        &self,
        line: &CartLine,
        quantity: u32,
        replacing: Option<LineId>,
    ) -> Result<(), CartError> {
        let own = line
            .checked_total_at(quantity)
            .ok_or(CartError::AmountTooLarge)?;
        self.lines
            .iter()
            .filter(|l| Some(l.id) != replacing)
            .try_fold(own, |acc, l| {
                l.checked_total_at(l.quantity)
                    .and_then(|total| acc.checked_add(total))
                    .ok_or(CartError::AmountTooLarge)
            })
            .map(|_| ())
    }

    fn line_mut(&mut self, id: LineId) -> Result<&mut CartLine, CartError> {
        self.lines
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(CartError::LineNotFound(id))
    }
}
