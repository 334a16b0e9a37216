use uuid::Uuid;

use crate::domain::cart::{Cart, CartLine};
use crate::domain::errors::DomainError;
use crate::domain::ports::{CartRepository, CatalogRepository};
use crate::domain::profile::Identity;

use super::require_identity;

/// The per-user cart mirror. Every mutation loads, edits and saves the whole cart.
pub struct CartService<S> {
    store: S,
}

impl<S: CartRepository + CatalogRepository> CartService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn get_cart(&self, identity: Option<&Identity>) -> Result<Cart, DomainError> {
        let identity = require_identity(identity)?;
        self.store.load_cart(&identity.user_id)
    }

    /// Snapshots a purchasable variant into the cart.
    pub fn add_item(
        &self,
        identity: Option<&Identity>,
        product_id: &str,
        variant_id: Uuid,
        qty: i32,
    ) -> Result<Cart, DomainError> {
        let identity = require_identity(identity)?;
        let product = self
            .store
            .find_product(product_id)?
            .filter(|p| p.is_available)
            .ok_or_else(|| DomainError::ProductUnavailable(product_id.to_string()))?;
        let variant = product
            .variant(variant_id)
            .filter(|v| v.active)
            .ok_or_else(|| DomainError::VariantUnavailable(product.name.clone()))?;
        if !variant.is_purchasable() {
            return Err(DomainError::InsufficientStock {
                name: product.name.clone(),
                available: variant.stock.max(0),
            });
        }
        let line = CartLine::from_variant(&product, variant, qty)?;

        self.update(&identity.user_id, |cart| cart.add(line))
    }

    pub fn adjust_quantity(
        &self,
        identity: Option<&Identity>,
        line_id: &str,
        delta: i32,
    ) -> Result<Cart, DomainError> {
        let identity = require_identity(identity)?;
        self.update(&identity.user_id, |cart| cart.adjust_quantity(line_id, delta))
    }

    pub fn remove_line(
        &self,
        identity: Option<&Identity>,
        line_id: &str,
    ) -> Result<Cart, DomainError> {
        let identity = require_identity(identity)?;
        self.update(&identity.user_id, |cart| {
            if cart.remove(line_id) {
                Ok(())
            } else {
                Err(DomainError::NotFound)
            }
        })
    }

    /// Folds the cart built while signed out into the user's saved cart.
    pub fn merge_guest_cart(
        &self,
        identity: Option<&Identity>,
        guest: Cart,
    ) -> Result<Cart, DomainError> {
        let identity = require_identity(identity)?;
        let mut priced = Vec::with_capacity(guest.len());
        for line in guest.into_lines() {
            match self.reprice(&line)? {
                Some(fresh) => priced.push(fresh),
                None => log::warn!(
                    "dropping guest line {} for {}: no longer purchasable",
                    line.id,
                    identity.user_id
                ),
            }
        }
        if priced.is_empty() {
            return self.store.load_cart(&identity.user_id);
        }
        self.update(&identity.user_id, |cart| cart.merge(Cart::from_lines(priced)))
    }

    /// Rebuilds a client-held line from the live catalog, keeping only its quantity.
    fn reprice(&self, line: &CartLine) -> Result<Option<CartLine>, DomainError> {
        let Some(product) = self
            .store
            .find_product(&line.product_id)?
            .filter(|p| p.is_available)
        else {
            return Ok(None);
        };
        let variant = product
            .resolve_variant(line.variant_id, &line.selected_weight)
            .and_then(|i| product.variants.get(i))
            .filter(|v| v.is_purchasable());
        match variant {
            Some(variant) => CartLine::from_variant(&product, variant, line.qty).map(Some),
            None => Ok(None),
        }
    }

    fn update<F>(&self, user_id: &str, edit: F) -> Result<Cart, DomainError>
    where
        F: FnOnce(&mut Cart) -> Result<(), DomainError>,
    {
        let mut cart = self.store.load_cart(user_id)?;
        edit(&mut cart)?;
        self.store.save_cart(user_id, &cart)?;
        Ok(cart)
    }
}
