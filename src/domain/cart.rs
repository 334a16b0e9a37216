use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::catalog::{Product, Variant};
use super::errors::DomainError;

/// A cart entry with the product details captured when it was added.
///
/// The snapshot is used for display and copied verbatim into the order; stock
/// decisions are always taken against the live catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: String,
    pub product_id: String,
    #[serde(default)]
    pub variant_id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub selected_weight: String,
    pub price: BigDecimal,
    pub qty: i32,
}

impl CartLine {
    pub fn from_variant(
        product: &Product,
        variant: &Variant,
        qty: i32,
    ) -> Result<Self, DomainError> {
        if qty < 1 {
            return Err(DomainError::InvalidInput(
                "quantity must be at least 1".to_string(),
            ));
        }
        Ok(CartLine {
            id: line_id(&product.id, variant.id),
            product_id: product.id.clone(),
            variant_id: Some(variant.id),
            name: product.name.clone(),
            category: Some(product.category.clone()),
            image_url: None,
            selected_weight: variant.descriptor(),
            price: variant.price.clone(),
            qty,
        })
    }

    pub fn line_total(&self) -> BigDecimal {
        &self.price * BigDecimal::from(self.qty)
    }
}

pub fn line_id(product_id: &str, variant_id: Uuid) -> String {
    format!("{product_id}-{variant_id}")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Builds a cart from stored lines, dropping any that violate `qty >= 1`.
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        Cart {
            lines: lines.into_iter().filter(|l| l.qty >= 1).collect(),
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn subtotal(&self) -> BigDecimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Adds `line`, or bumps the quantity of the line with the same id.
    pub fn add(&mut self, line: CartLine) -> Result<(), DomainError> {
        match self.lines.iter_mut().find(|l| l.id == line.id) {
            Some(existing) => {
                existing.qty = existing.qty.checked_add(line.qty).ok_or_else(|| {
                    DomainError::InvalidInput(format!("quantity of {} is too large", line.name))
                })?;
            }
            None => self.lines.push(line),
        }
        Ok(())
    }

    /// Changes a line's quantity by `delta`; a line reaching zero is removed.
    pub fn adjust_quantity(&mut self, line_id: &str, delta: i32) -> Result<(), DomainError> {
        let index = self
            .lines
            .iter()
            .position(|l| l.id == line_id)
            .ok_or(DomainError::NotFound)?;
        let qty = self.lines[index].qty.saturating_add(delta);
        if qty < 1 {
            self.lines.remove(index);
        } else {
            self.lines[index].qty = qty;
        }
        Ok(())
    }

    pub fn remove(&mut self, line_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.id != line_id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Folds a guest cart into this one: shared lines add up, new ones append.
    pub fn merge(&mut self, guest: Cart) -> Result<(), DomainError> {
        for line in guest.lines {
            self.add(line)?;
        }
        Ok(())
    }
}
