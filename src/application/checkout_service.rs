use bigdecimal::{BigDecimal, Zero};

use crate::domain::checkout::{self, CheckoutPlan, CheckoutRequest};
use crate::domain::errors::DomainError;
use crate::domain::order::{DeliveryMethod, Order};
use crate::domain::order_id::OrderIdGenerator;
use crate::domain::ports::{Clock, StorefrontStore, SystemClock};
use crate::domain::pricing::{self, Coupon, PriceBreakdown};
use crate::domain::profile::{Identity, UserProfile};

use super::require_identity;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub delivery_method: DeliveryMethod,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CouponOffer {
    pub coupon: Coupon,
    pub unlocked: bool,
}

/// What the customer would pay right now, with the reasons it might change.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub price: PriceBreakdown,
    /// Amount still missing for home delivery; zero when the minimum is met.
    pub delivery_shortfall: BigDecimal,
    pub offers: Vec<CouponOffer>,
}

pub struct CheckoutService<S, C = SystemClock> {
    store: S,
    clock: C,
    ids: OrderIdGenerator,
}

impl<S: StorefrontStore> CheckoutService<S> {
    pub fn new(store: S, ids: OrderIdGenerator) -> Self {
        Self::with_clock(store, SystemClock, ids)
    }
}

impl<S: StorefrontStore, C: Clock> CheckoutService<S, C> {
    pub fn with_clock(store: S, clock: C, ids: OrderIdGenerator) -> Self {
        Self { store, clock, ids }
    }

    /// Places the caller's cart as one order, or fails with no effect.
    ///
    /// The cart is cleared only after the transaction committed. Failing to
    /// clear it does not undo or fail the order.
    pub fn place_order(
        &self,
        identity: Option<&Identity>,
        request: &CheckoutRequest,
    ) -> Result<Order, DomainError> {
        let identity = require_identity(identity)?;
        let cart = self.store.load_cart(&identity.user_id)?;
        let profile = self
            .store
            .find_profile(&identity.user_id)?
            .unwrap_or_else(|| UserProfile::from_identity(identity));
        let settings = self.store.checkout_settings()?;

        let destination =
            checkout::check_preconditions(request, &cart, identity, &profile, &settings)
                .inspect_err(|e| {
                    log::warn!("checkout rejected for {}: {}", identity.user_id, e);
                })?;

        let plan = CheckoutPlan {
            identity,
            profile: &profile,
            destination: &destination,
            lines: cart.lines(),
            coupon_code: request.coupon_code.as_deref(),
            now: self.clock.now(),
            ids: &self.ids,
        };
        let order = self
            .store
            .transact(|tx| checkout::execute(tx, &plan, &mut rand::thread_rng()))
            .inspect_err(|e| {
                log::warn!("checkout failed for {}: {}", identity.user_id, e);
            })?;

        log::info!(
            "order {} placed by {}: {} line(s), total {}",
            order.order_id,
            order.user_id,
            order.items.len(),
            order.total_amount
        );
        if let Err(e) = self.store.clear_cart(&identity.user_id) {
            log::warn!(
                "order {} committed but cart of {} was not cleared: {}",
                order.order_id,
                identity.user_id,
                e
            );
        }
        Ok(order)
    }

    /// Prices the caller's cart without touching stock.
    ///
    /// An explicitly requested coupon that cannot be applied is an error here,
    /// unlike at checkout where it silently falls away.
    pub fn quote(
        &self,
        identity: Option<&Identity>,
        request: &QuoteRequest,
    ) -> Result<Quote, DomainError> {
        let identity = require_identity(identity)?;
        let cart = self.store.load_cart(&identity.user_id)?;
        let settings = self.store.checkout_settings()?;
        let subtotal = cart.subtotal();

        let coupon = request
            .coupon_code
            .as_deref()
            .map(|code| pricing::apply_coupon(&settings.coupons, code, &subtotal))
            .transpose()?;
        let price = PriceBreakdown::compute(cart.lines(), coupon.as_ref());

        let delivery_shortfall = match request.delivery_method {
            DeliveryMethod::HomeDelivery if subtotal < settings.min_order_amount => {
                &settings.min_order_amount - &subtotal
            }
            _ => BigDecimal::zero(),
        };
        let offers = settings
            .coupons
            .iter()
            .map(|c| CouponOffer {
                unlocked: c.is_unlocked(&subtotal),
                coupon: c.clone(),
            })
            .collect();

        Ok(Quote {
            price,
            delivery_shortfall,
            offers,
        })
    }
}
