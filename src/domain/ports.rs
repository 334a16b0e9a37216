use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};

use super::cart::Cart;
use super::catalog::{Product, Variant};
use super::errors::DomainError;
use super::order::{ListResult, Order};
use super::pricing::Coupon;
use super::profile::UserProfile;

/// Store-wide inputs read by the checkout; never written by it.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSettings {
    pub min_order_amount: BigDecimal,
    pub coupons: Vec<Coupon>,
    pub online_orders: bool,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            min_order_amount: BigDecimal::zero(),
            coupons: Vec::new(),
            online_orders: true,
        }
    }
}

/// One attempt of the atomic checkout unit.
///
/// Reads establish the snapshot the writes are conditioned on; nothing is
/// visible to other callers until the owning [`CheckoutStore`] commits.
pub trait CatalogTransaction {
    fn product(&mut self, id: &str) -> Result<Option<Product>, DomainError>;
    /// Replaces the variant list of a product read earlier in this transaction.
    fn write_variants(&mut self, product_id: &str, variants: &[Variant]) -> Result<(), DomainError>;
    fn order_exists(&mut self, order_id: &str) -> Result<bool, DomainError>;
    /// Create-if-absent write of a new order, together with its outbox event.
    fn insert_order(&mut self, order: &Order) -> Result<(), DomainError>;
    fn checkout_settings(&mut self) -> Result<CheckoutSettings, DomainError>;
}

pub trait CheckoutStore: Send + Sync + 'static {
    /// Runs `body` atomically, retrying it on [`DomainError::TransactionConflict`]
    /// until the retry budget is spent. Any other error aborts with no effect.
    fn transact<T, F>(&self, body: F) -> Result<T, DomainError>
    where
        F: FnMut(&mut dyn CatalogTransaction) -> Result<T, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    fn find_by_id(&self, order_id: &str) -> Result<Option<Order>, DomainError>;
    fn list_for_user(
        &self,
        user_id: &str,
        page: i64,
        limit: i64,
    ) -> Result<ListResult, DomainError>;
}

pub trait CartRepository: Send + Sync + 'static {
    fn load_cart(&self, user_id: &str) -> Result<Cart, DomainError>;
    fn save_cart(&self, user_id: &str, cart: &Cart) -> Result<(), DomainError>;
    fn clear_cart(&self, user_id: &str) -> Result<(), DomainError>;
}

pub trait ProfileRepository: Send + Sync + 'static {
    fn find_profile(&self, user_id: &str) -> Result<Option<UserProfile>, DomainError>;
    fn save_profile(&self, profile: &UserProfile) -> Result<(), DomainError>;
}

/// Catalog lookups for cart snapshots. Never used for stock decisions.
pub trait CatalogRepository: Send + Sync + 'static {
    fn find_product(&self, id: &str) -> Result<Option<Product>, DomainError>;
}

pub trait SettingsSource: Send + Sync + 'static {
    fn checkout_settings(&self) -> Result<CheckoutSettings, DomainError>;
}

pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Everything a storefront backend provides.
pub trait StorefrontStore:
    CheckoutStore
    + OrderRepository
    + CartRepository
    + ProfileRepository
    + CatalogRepository
    + SettingsSource
    + Clone
{
}

impl<T> StorefrontStore for T where
    T: CheckoutStore
        + OrderRepository
        + CartRepository
        + ProfileRepository
        + CatalogRepository
        + SettingsSource
        + Clone
{
}
