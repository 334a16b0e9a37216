use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A purchasable size of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: Uuid,
    pub weight: BigDecimal,
    pub unit: String,
    pub price: BigDecimal,
    pub stock: i32,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Variant {
    pub fn is_purchasable(&self) -> bool {
        self.active && self.stock > 0
    }

    /// Display form used on cart lines, e.g. `"500 g"`.
    pub fn descriptor(&self) -> String {
        format!("{} {}", self.weight, self.unit)
    }

    fn matches(&self, selector: &WeightSelector) -> bool {
        self.weight == selector.weight && self.unit == selector.unit
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default = "default_active")]
    pub is_available: bool,
    pub variants: Vec<Variant>,
}

impl Product {
    pub fn variant(&self, id: Uuid) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == id)
    }

    /// Index of the variant a cart line points at.
    ///
    /// A line carrying a variant id is resolved by id only. Lines without one
    /// fall back to the `"<weight><unit>"` descriptor, compared with all
    /// whitespace removed.
    pub fn resolve_variant(&self, variant_id: Option<Uuid>, descriptor: &str) -> Option<usize> {
        match variant_id {
            Some(id) => self.variants.iter().position(|v| v.id == id),
            None => {
                let selector = descriptor.parse::<WeightSelector>().ok()?;
                self.variants.iter().position(|v| v.matches(&selector))
            }
        }
    }
}

/// Weight/unit pair parsed from a free-form descriptor such as `"500 g"`.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightSelector {
    pub weight: BigDecimal,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDescriptor(pub String);

impl fmt::Display for InvalidDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a weight descriptor", self.0)
    }
}

impl std::error::Error for InvalidDescriptor {}

impl FromStr for WeightSelector {
    type Err = InvalidDescriptor;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        let split = compact
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(compact.len());
        let (number, unit) = compact.split_at(split);
        if number.is_empty() || unit.is_empty() {
            return Err(InvalidDescriptor(raw.to_string()));
        }
        let weight =
            BigDecimal::from_str(number).map_err(|_| InvalidDescriptor(raw.to_string()))?;
        Ok(WeightSelector {
            weight,
            unit: unit.to_string(),
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn variant(weight: i32, unit: &str, price: i32, stock: i32) -> Variant {
        Variant {
            id: Uuid::new_v4(),
            weight: BigDecimal::from(weight),
            unit: unit.to_string(),
            price: BigDecimal::from(price),
            stock,
            active: true,
        }
    }

    pub fn product(id: &str, name: &str, variants: Vec<Variant>) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            category: "Snacks".to_string(),
            is_available: true,
            variants,
        }
    }
}
