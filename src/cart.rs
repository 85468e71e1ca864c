//! Session cart.
//!
//! The cart is a plain value: handlers load it from the session, mutate it and
//! store it back. Lines keep insertion order, and every item id appears at
//! most once.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::menu_items;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

/// A cart line resolved against the catalog.
#[derive(Debug, Clone)]
pub struct PricedLine {
    pub item: menu_items::Model,
    pub quantity: i32,
    pub line_total: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct PricedCart {
    pub lines: Vec<PricedLine>,
    pub total: Decimal,
}

impl PricedCart {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn clamp_quantity(quantity: i64) -> i32 {
    i32::try_from(quantity).unwrap_or(if quantity < 0 { i32::MIN } else { i32::MAX })
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn quantity(&self, item_id: Uuid) -> Option<i32> {
        self.lines
            .iter()
            .find(|line| line.item_id == item_id)
            .map(|line| line.quantity)
    }

    pub fn item_ids(&self) -> Vec<Uuid> {
        self.lines.iter().map(|line| line.item_id).collect()
    }

    /// Add `quantity` (at least 1) of an item and return the amount actually added.
    pub fn add(&mut self, item_id: Uuid, quantity: i64) -> i32 {
        let quantity = clamp_quantity(quantity.max(1));
        match self.lines.iter_mut().find(|line| line.item_id == item_id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.lines.push(CartLine { item_id, quantity }),
        }
        quantity
    }

    /// Set quantities for the supplied items. Non-positive quantities remove
    /// the line; items not mentioned keep their current quantity.
    pub fn update<I>(&mut self, quantities: I)
    where
        I: IntoIterator<Item = (Uuid, i64)>,
    {
        for (item_id, quantity) in quantities {
            if quantity <= 0 {
                self.remove(item_id);
                continue;
            }
            let quantity = clamp_quantity(quantity);
            match self.lines.iter_mut().find(|line| line.item_id == item_id) {
                Some(line) => line.quantity = quantity,
                None => self.lines.push(CartLine { item_id, quantity }),
            }
        }
    }

    pub fn remove(&mut self, item_id: Uuid) {
        self.lines.retain(|line| line.item_id != item_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Price the cart against a snapshot of the catalog. Lines whose item is
    /// missing from `catalog` are skipped.
    pub fn price(&self, catalog: &HashMap<Uuid, menu_items::Model>) -> PricedCart {
        let mut priced = PricedCart::default();
        for line in &self.lines {
            let Some(item) = catalog.get(&line.item_id) else {
                continue;
            };
            let line_total = item.price * Decimal::from(line.quantity);
            priced.total += line_total;
            priced.lines.push(PricedLine {
                item: item.clone(),
                quantity: line.quantity,
                line_total,
            });
        }
        priced
    }
}
