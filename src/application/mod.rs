pub mod cart_service;
pub mod checkout_service;
pub mod order_service;
pub mod profile_service;

use uuid::Uuid;

use crate::domain::cart::Cart;
use crate::domain::checkout::CheckoutRequest;
use crate::domain::errors::DomainError;
use crate::domain::order::Order;
use crate::domain::order_id::OrderIdGenerator;
use crate::domain::ports::{Clock, StorefrontStore, SystemClock};
use crate::domain::profile::{Address, Identity, UserProfile};

use cart_service::CartService;
use checkout_service::{CheckoutService, Quote, QuoteRequest};
use order_service::{OrderPage, OrderService};
use profile_service::ProfileService;

pub(crate) fn require_identity(identity: Option<&Identity>) -> Result<&Identity, DomainError> {
    identity.ok_or(DomainError::Unauthenticated)
}

/// The storefront operations as seen by the HTTP layer.
///
/// Object safe, so handlers depend on `dyn StorefrontApi` rather than on the
/// storage backend.
pub trait StorefrontApi: Send + Sync {
    fn place_order(
        &self,
        identity: Option<&Identity>,
        request: &CheckoutRequest,
    ) -> Result<Order, DomainError>;
    fn quote(
        &self,
        identity: Option<&Identity>,
        request: &QuoteRequest,
    ) -> Result<Quote, DomainError>;

    fn cart(&self, identity: Option<&Identity>) -> Result<Cart, DomainError>;
    fn add_to_cart(
        &self,
        identity: Option<&Identity>,
        product_id: &str,
        variant_id: Uuid,
        qty: i32,
    ) -> Result<Cart, DomainError>;
    fn adjust_cart_line(
        &self,
        identity: Option<&Identity>,
        line_id: &str,
        delta: i32,
    ) -> Result<Cart, DomainError>;
    fn remove_cart_line(
        &self,
        identity: Option<&Identity>,
        line_id: &str,
    ) -> Result<Cart, DomainError>;
    fn merge_cart(&self, identity: Option<&Identity>, guest: Cart) -> Result<Cart, DomainError>;

    fn order(&self, identity: Option<&Identity>, order_id: &str) -> Result<Order, DomainError>;
    fn orders(
        &self,
        identity: Option<&Identity>,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<OrderPage, DomainError>;

    fn profile(&self, identity: Option<&Identity>) -> Result<UserProfile, DomainError>;
    fn update_contact(
        &self,
        identity: Option<&Identity>,
        name: &str,
        phone: &str,
    ) -> Result<UserProfile, DomainError>;
    fn add_address(
        &self,
        identity: Option<&Identity>,
        address: Address,
    ) -> Result<UserProfile, DomainError>;
    fn remove_address(
        &self,
        identity: Option<&Identity>,
        index: usize,
    ) -> Result<UserProfile, DomainError>;
}

/// All application services over one store.
pub struct Storefront<S, C = SystemClock> {
    pub checkout: CheckoutService<S, C>,
    pub orders: OrderService<S>,
    pub carts: CartService<S>,
    pub profiles: ProfileService<S>,
}

impl<S: StorefrontStore> Storefront<S> {
    pub fn new(store: S, ids: OrderIdGenerator) -> Self {
        Self::with_clock(store, SystemClock, ids)
    }
}

impl<S: StorefrontStore, C: Clock> Storefront<S, C> {
    pub fn with_clock(store: S, clock: C, ids: OrderIdGenerator) -> Self {
        Storefront {
            orders: OrderService::new(store.clone()),
            carts: CartService::new(store.clone()),
            profiles: ProfileService::new(store.clone()),
            checkout: CheckoutService::with_clock(store, clock, ids),
        }
    }
}

impl<S: StorefrontStore, C: Clock> StorefrontApi for Storefront<S, C> {
    fn place_order(
        &self,
        identity: Option<&Identity>,
        request: &CheckoutRequest,
    ) -> Result<Order, DomainError> {
        self.checkout.place_order(identity, request)
    }

    fn quote(
        &self,
        identity: Option<&Identity>,
        request: &QuoteRequest,
    ) -> Result<Quote, DomainError> {
        self.checkout.quote(identity, request)
    }

    fn cart(&self, identity: Option<&Identity>) -> Result<Cart, DomainError> {
        self.carts.get_cart(identity)
    }

    fn add_to_cart(
        &self,
        identity: Option<&Identity>,
        product_id: &str,
        variant_id: Uuid,
        qty: i32,
    ) -> Result<Cart, DomainError> {
        self.carts.add_item(identity, product_id, variant_id, qty)
    }

    fn adjust_cart_line(
        &self,
        identity: Option<&Identity>,
        line_id: &str,
        delta: i32,
    ) -> Result<Cart, DomainError> {
        self.carts.adjust_quantity(identity, line_id, delta)
    }

    fn remove_cart_line(
        &self,
        identity: Option<&Identity>,
        line_id: &str,
    ) -> Result<Cart, DomainError> {
        self.carts.remove_line(identity, line_id)
    }

    fn merge_cart(&self, identity: Option<&Identity>, guest: Cart) -> Result<Cart, DomainError> {
        self.carts.merge_guest_cart(identity, guest)
    }

    fn order(&self, identity: Option<&Identity>, order_id: &str) -> Result<Order, DomainError> {
        self.orders.get_order(identity, order_id)
    }

    fn orders(
        &self,
        identity: Option<&Identity>,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<OrderPage, DomainError> {
        self.orders.list_orders(identity, page, limit)
    }

    fn profile(&self, identity: Option<&Identity>) -> Result<UserProfile, DomainError> {
        self.profiles.get_profile(identity)
    }

    fn update_contact(
        &self,
        identity: Option<&Identity>,
        name: &str,
        phone: &str,
    ) -> Result<UserProfile, DomainError> {
        self.profiles.update_contact(identity, name, phone)
    }

    fn add_address(
        &self,
        identity: Option<&Identity>,
        address: Address,
    ) -> Result<UserProfile, DomainError> {
        self.profiles.add_address(identity, address)
    }

    fn remove_address(
        &self,
        identity: Option<&Identity>,
        index: usize,
    ) -> Result<UserProfile, DomainError> {
        self.profiles.remove_address(identity, index)
    }
}
