//! Inventory-safe order placement.
//!
//! [`check_preconditions`] runs before any transaction is opened and has no
//! side effects. [`execute`] is the body of the atomic unit: it re-reads every
//! product, validates the whole cart, and only then writes the decremented
//! variants and the new order through the same [`CatalogTransaction`].

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

use super::cart::{Cart, CartLine};
use super::catalog::Product;
use super::errors::DomainError;
use super::order::{DeliveryMethod, Order, OrderStatus, ShippingAddress};
use super::order_id::OrderIdGenerator;
use super::ports::{CatalogTransaction, CheckoutSettings};
use super::pricing::{self, PriceBreakdown};
use super::profile::{is_valid_phone, Identity, UserProfile};

/// Candidate identifiers tried before the attempt is treated as a conflict.
pub const MAX_ORDER_ID_CANDIDATES: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliverySelection {
    /// Deliver to one of the user's saved addresses.
    HomeDelivery { address_index: Option<usize> },
    StorePickup { phone: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub delivery: DeliverySelection,
    pub coupon_code: Option<String>,
}

/// Resolved delivery details for an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub method: DeliveryMethod,
    pub shipping: ShippingAddress,
    pub phone: String,
}

/// Fail-fast checks on the caller's input; touches no shared state.
pub fn check_preconditions(
    request: &CheckoutRequest,
    cart: &Cart,
    identity: &Identity,
    profile: &UserProfile,
    settings: &CheckoutSettings,
) -> Result<Destination, DomainError> {
    if cart.is_empty() {
        return Err(DomainError::EmptyCart);
    }
    if !settings.online_orders {
        return Err(DomainError::ShopClosed);
    }

    match &request.delivery {
        DeliverySelection::HomeDelivery { address_index } => {
            let subtotal = cart.subtotal();
            if subtotal < settings.min_order_amount {
                return Err(DomainError::BelowMinimumOrder {
                    shortfall: &settings.min_order_amount - &subtotal,
                });
            }
            let address = address_index
                .and_then(|i| profile.addresses.get(i))
                .ok_or(DomainError::NoAddressSelected)?;
            let phone = address
                .phone
                .clone()
                .or_else(|| profile.phone.clone())
                .or_else(|| identity.phone.clone())
                .unwrap_or_default();
            Ok(Destination {
                method: DeliveryMethod::HomeDelivery,
                shipping: ShippingAddress::Delivery(address.clone()),
                phone,
            })
        }
        DeliverySelection::StorePickup { phone } => {
            let phone = phone.trim();
            if !is_valid_phone(phone) {
                return Err(DomainError::InvalidPhone);
            }
            Ok(Destination {
                method: DeliveryMethod::StorePickup,
                shipping: ShippingAddress::StorePickup,
                phone: phone.to_string(),
            })
        }
    }
}

/// A decrement applied to one variant by a committed checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockMovement {
    pub product_id: String,
    pub variant_id: Uuid,
    pub quantity: i32,
    pub remaining: i32,
}

/// Validates every line against fresh catalog reads, then writes the decrements.
///
/// Lines on the same product share one working copy, so decrements on several
/// variants (or the same variant twice) compose and the product is written once.
/// Nothing is written unless every line passes.
pub fn reserve_stock(
    tx: &mut dyn CatalogTransaction,
    lines: &[CartLine],
) -> Result<Vec<StockMovement>, DomainError> {
    let mut working: BTreeMap<String, Product> = BTreeMap::new();
    let mut movements = Vec::with_capacity(lines.len());

    for line in lines {
        if line.qty < 1 {
            return Err(DomainError::InvalidInput(format!(
                "quantity for {} must be at least 1",
                line.name
            )));
        }

        let product = match working.entry(line.product_id.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let fresh = tx
                    .product(&line.product_id)?
                    .filter(|p| p.is_available)
                    .ok_or_else(|| DomainError::ProductUnavailable(line.name.clone()))?;
                entry.insert(fresh)
            }
        };

        let variant = product
            .resolve_variant(line.variant_id, &line.selected_weight)
            .and_then(|i| product.variants.get_mut(i))
            .filter(|v| v.active)
            .ok_or_else(|| DomainError::VariantUnavailable(line.name.clone()))?;

        if variant.stock < line.qty {
            return Err(DomainError::InsufficientStock {
                name: line.name.clone(),
                available: variant.stock,
            });
        }
        variant.stock -= line.qty;
        movements.push(StockMovement {
            product_id: line.product_id.clone(),
            variant_id: variant.id,
            quantity: line.qty,
            remaining: variant.stock,
        });
    }

    for (product_id, product) in &working {
        tx.write_variants(product_id, &product.variants)?;
    }
    Ok(movements)
}

/// Picks an identifier not yet present in the ledger.
pub fn allocate_order_id<R: Rng + ?Sized>(
    tx: &mut dyn CatalogTransaction,
    generator: &OrderIdGenerator,
    year: i32,
    phone: &str,
    rng: &mut R,
) -> Result<String, DomainError> {
    for _ in 0..MAX_ORDER_ID_CANDIDATES {
        let candidate = generator.generate(year, phone, rng);
        if !tx.order_exists(&candidate)? {
            return Ok(candidate);
        }
    }
    Err(DomainError::TransactionConflict)
}

/// Everything the transactional body needs, captured before it starts.
#[derive(Debug, Clone)]
pub struct CheckoutPlan<'a> {
    pub identity: &'a Identity,
    pub profile: &'a UserProfile,
    pub destination: &'a Destination,
    pub lines: &'a [CartLine],
    pub coupon_code: Option<&'a str>,
    pub now: DateTime<Utc>,
    pub ids: &'a OrderIdGenerator,
}

impl CheckoutPlan<'_> {
    fn assemble(&self, order_id: String, price: PriceBreakdown) -> Order {
        Order {
            order_id,
            user_id: self.identity.user_id.clone(),
            user_name: self.profile.order_name(self.identity),
            user_email: self
                .identity
                .email
                .clone()
                .or_else(|| self.profile.email.clone()),
            phone: self.destination.phone.clone(),
            items: self.lines.to_vec(),
            subtotal: price.subtotal,
            discount_amount: price.discount_amount,
            applied_code: price.applied_code,
            total_amount: price.final_payable,
            delivery_method: self.destination.method,
            shipping_address: self.destination.shipping.clone(),
            payment_method: self.destination.method.payment_method(),
            status: OrderStatus::Placed,
            created_at: self.now,
            recorded_at: None,
            rider_name: None,
            rider_phone: None,
        }
    }
}

/// The transactional body: price, reserve stock, allocate an id, write the order.
pub fn execute<R: Rng + ?Sized>(
    tx: &mut dyn CatalogTransaction,
    plan: &CheckoutPlan<'_>,
    rng: &mut R,
) -> Result<Order, DomainError> {
    let settings = tx.checkout_settings()?;
    let subtotal: BigDecimal = pricing::subtotal(plan.lines);
    let coupon = plan
        .coupon_code
        .and_then(|code| pricing::revalidate(&settings.coupons, code, &subtotal));
    let price = PriceBreakdown::compute(plan.lines, coupon.as_ref());

    reserve_stock(tx, plan.lines)?;

    let order_id = allocate_order_id(
        tx,
        plan.ids,
        plan.ids.year_of(plan.now),
        &plan.destination.phone,
        rng,
    )?;
    let order = plan.assemble(order_id, price);
    tx.insert_order(&order)?;
    Ok(order)
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::domain::cart::fixtures::line;
    use crate::domain::catalog::fixtures::{product, variant};
    use crate::domain::catalog::Variant;
    use crate::domain::order::PaymentMethod;
    use crate::domain::pricing::Coupon;
    use crate::domain::profile::{Address, AddressType};

    /// Records writes instead of applying them, so tests can assert on effects.
    #[derive(Default)]
    struct RecordingTransaction {
        products: HashMap<String, Product>,
        existing_orders: HashSet<String>,
        settings: CheckoutSettings,
        written: Vec<(String, Vec<Variant>)>,
        inserted: Vec<Order>,
    }

    impl CatalogTransaction for RecordingTransaction {
        fn product(&mut self, id: &str) -> Result<Option<Product>, DomainError> {
            Ok(self.products.get(id).cloned())
        }

        fn write_variants(
            &mut self,
            product_id: &str,
            variants: &[Variant],
        ) -> Result<(), DomainError> {
            self.written.push((product_id.to_string(), variants.to_vec()));
            Ok(())
        }

        fn order_exists(&mut self, order_id: &str) -> Result<bool, DomainError> {
            Ok(self.existing_orders.contains(order_id))
        }

        fn insert_order(&mut self, order: &Order) -> Result<(), DomainError> {
            self.inserted.push(order.clone());
            Ok(())
        }

        fn checkout_settings(&mut self) -> Result<CheckoutSettings, DomainError> {
            Ok(self.settings.clone())
        }
    }

    fn identity() -> Identity {
        Identity {
            user_id: "uid-1".to_string(),
            display_name: Some("Karthik".to_string()),
            email: Some("karthik@example.com".to_string()),
            phone: None,
        }
    }

    fn home_address(phone: Option<&str>) -> Address {
        Address {
            kind: AddressType::Home,
            line1: "7 Temple Street".to_string(),
            city: "Chennai".to_string(),
            state: "TN".to_string(),
            zip: "600100".to_string(),
            phone: phone.map(str::to_string),
        }
    }

    fn pickup(phone: &str) -> CheckoutRequest {
        CheckoutRequest {
            delivery: DeliverySelection::StorePickup {
                phone: phone.to_string(),
            },
            coupon_code: None,
        }
    }

    fn home(index: Option<usize>) -> CheckoutRequest {
        CheckoutRequest {
            delivery: DeliverySelection::HomeDelivery {
                address_index: index,
            },
            coupon_code: None,
        }
    }

    fn settings(min: i32) -> CheckoutSettings {
        CheckoutSettings {
            min_order_amount: BigDecimal::from(min),
            ..CheckoutSettings::default()
        }
    }

    fn one_line_cart() -> Cart {
        Cart::from_lines(vec![line("a", "A", "250 g", "100", 2)])
    }

    #[test]
    fn empty_cart_is_rejected_first() {
        let profile = UserProfile::from_identity(&identity());
        let err = check_preconditions(
            &pickup("9876543210"),
            &Cart::default(),
            &identity(),
            &profile,
            &settings(0),
        )
        .expect_err("empty cart");
        assert!(matches!(err, DomainError::EmptyCart));
    }

    #[test]
    fn closed_shop_rejects_checkout() {
        let profile = UserProfile::from_identity(&identity());
        let closed = CheckoutSettings {
            online_orders: false,
            ..CheckoutSettings::default()
        };
        let err = check_preconditions(
            &pickup("9876543210"),
            &one_line_cart(),
            &identity(),
            &profile,
            &closed,
        )
        .expect_err("shop closed");
        assert!(matches!(err, DomainError::ShopClosed));
    }

    #[test]
    fn home_delivery_below_minimum_reports_shortfall() {
        let mut profile = UserProfile::from_identity(&identity());
        profile.addresses.push(home_address(None));
        let err = check_preconditions(
            &home(Some(0)),
            &one_line_cart(),
            &identity(),
            &profile,
            &settings(350),
        )
        .expect_err("below minimum");
        match err {
            DomainError::BelowMinimumOrder { shortfall } => {
                assert_eq!(shortfall, BigDecimal::from(150));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn minimum_does_not_apply_to_pickup() {
        let profile = UserProfile::from_identity(&identity());
        let destination = check_preconditions(
            &pickup("9876543210"),
            &one_line_cart(),
            &identity(),
            &profile,
            &settings(10_000),
        )
        .expect("pickup ignores minimum");
        assert_eq!(destination.method, DeliveryMethod::StorePickup);
        assert_eq!(destination.shipping, ShippingAddress::StorePickup);
    }

    #[test]
    fn home_delivery_needs_a_saved_address() {
        let mut profile = UserProfile::from_identity(&identity());
        for request in [home(None), home(Some(0))] {
            let err = check_preconditions(
                &request,
                &one_line_cart(),
                &identity(),
                &profile,
                &settings(0),
            )
            .expect_err("no address");
            assert!(matches!(err, DomainError::NoAddressSelected));
        }

        profile.addresses.push(home_address(None));
        let err = check_preconditions(
            &home(Some(3)),
            &one_line_cart(),
            &identity(),
            &profile,
            &settings(0),
        )
        .expect_err("index out of range");
        assert!(matches!(err, DomainError::NoAddressSelected));
    }

    #[test]
    fn home_delivery_phone_prefers_address_then_profile() {
        let mut profile = UserProfile::from_identity(&identity());
        profile.phone = Some("9000000001".to_string());
        profile.addresses.push(home_address(Some("9000000002")));
        profile.addresses.push(home_address(None));

        let with_address_phone = check_preconditions(
            &home(Some(0)),
            &one_line_cart(),
            &identity(),
            &profile,
            &settings(0),
        )
        .expect("valid");
        assert_eq!(with_address_phone.phone, "9000000002");

        let with_profile_phone = check_preconditions(
            &home(Some(1)),
            &one_line_cart(),
            &identity(),
            &profile,
            &settings(0),
        )
        .expect("valid");
        assert_eq!(with_profile_phone.phone, "9000000001");
    }

    #[test]
    fn pickup_phone_must_be_ten_digits() {
        let profile = UserProfile::from_identity(&identity());
        for phone in ["", "98765", "98765432101", "98765abcde"] {
            let err = check_preconditions(
                &pickup(phone),
                &one_line_cart(),
                &identity(),
                &profile,
                &settings(0),
            )
            .expect_err("invalid phone");
            assert!(matches!(err, DomainError::InvalidPhone), "phone {phone:?}");
        }
    }

    fn tx_with(products: Vec<Product>) -> RecordingTransaction {
        RecordingTransaction {
            products: products.into_iter().map(|p| (p.id.clone(), p)).collect(),
            ..RecordingTransaction::default()
        }
    }

    #[test]
    fn missing_product_aborts_without_writes() {
        let mut tx = tx_with(vec![]);
        let lines = vec![line("gone", "Banana Chips", "250 g", "80", 1)];
        let err = reserve_stock(&mut tx, &lines).expect_err("product missing");
        assert!(matches!(err, DomainError::ProductUnavailable(name) if name == "Banana Chips"));
        assert!(tx.written.is_empty());
    }

    #[test]
    fn unavailable_product_is_treated_as_missing() {
        let mut p = product("a", "A", vec![variant(250, "g", 100, 5)]);
        p.is_available = false;
        let mut tx = tx_with(vec![p]);
        let err = reserve_stock(&mut tx, &[line("a", "A", "250 g", "100", 1)])
            .expect_err("product hidden");
        assert!(matches!(err, DomainError::ProductUnavailable(_)));
    }

    #[test]
    fn unknown_or_inactive_variant_is_unavailable() {
        let mut inactive = variant(500, "g", 180, 9);
        inactive.active = false;
        let mut tx = tx_with(vec![product(
            "a",
            "A",
            vec![variant(250, "g", 100, 5), inactive],
        )]);

        let err = reserve_stock(&mut tx, &[line("a", "A", "1 kg", "100", 1)])
            .expect_err("no such size");
        assert!(matches!(err, DomainError::VariantUnavailable(name) if name == "A"));

        let err = reserve_stock(&mut tx, &[line("a", "A", "500 g", "180", 1)])
            .expect_err("inactive size");
        assert!(matches!(err, DomainError::VariantUnavailable(_)));
        assert!(tx.written.is_empty());
    }

    #[test]
    fn insufficient_stock_on_middle_line_aborts_whole_cart() {
        let mut tx = tx_with(vec![
            product("a", "A", vec![variant(250, "g", 100, 5)]),
            product("b", "B", vec![variant(250, "g", 100, 1)]),
            product("c", "C", vec![variant(250, "g", 100, 5)]),
        ]);
        let lines = vec![
            line("a", "A", "250 g", "100", 1),
            line("b", "B", "250 g", "100", 2),
            line("c", "C", "250 g", "100", 1),
        ];
        let err = reserve_stock(&mut tx, &lines).expect_err("line 2 short");
        match err {
            DomainError::InsufficientStock { name, available } => {
                assert_eq!(name, "B");
                assert_eq!(available, 1);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(tx.written.is_empty(), "no product may be written");
    }

    #[test]
    fn decrement_touches_only_the_matched_variant() {
        let small = variant(250, "g", 100, 5);
        let large = variant(500, "g", 190, 7);
        let mut tx = tx_with(vec![product("a", "A", vec![small.clone(), large.clone()])]);

        let movements = reserve_stock(&mut tx, &[line("a", "A", "250 g", "100", 2)])
            .expect("enough stock");
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].remaining, 3);

        let (id, variants) = &tx.written[0];
        assert_eq!(id, "a");
        assert_eq!(variants[0], Variant { stock: 3, ..small });
        assert_eq!(variants[1], large);
    }

    #[test]
    fn lines_on_one_product_compose_into_a_single_write() {
        let small = variant(250, "g", 100, 5);
        let large = variant(500, "g", 190, 4);
        let mut tx = tx_with(vec![product("a", "A", vec![small, large])]);
        let lines = vec![
            line("a", "A", "250 g", "100", 2),
            line("a", "A", "500 g", "190", 3),
            line("a", "A", "250g", "100", 1),
        ];
        reserve_stock(&mut tx, &lines).expect("enough stock");

        assert_eq!(tx.written.len(), 1);
        let variants = &tx.written[0].1;
        assert_eq!(variants[0].stock, 2);
        assert_eq!(variants[1].stock, 1);
    }

    #[test]
    fn repeated_variant_lines_are_checked_cumulatively() {
        let mut tx = tx_with(vec![product("a", "A", vec![variant(250, "g", 100, 3)])]);
        let lines = vec![
            line("a", "A", "250 g", "100", 2),
            line("a", "A", "250 g", "100", 2),
        ];
        let err = reserve_stock(&mut tx, &lines).expect_err("4 > 3");
        assert!(matches!(err, DomainError::InsufficientStock { available: 1, .. }));
        assert!(tx.written.is_empty());
    }

    #[test]
    fn order_id_candidates_skip_existing_ids() {
        let generator = OrderIdGenerator::default();
        let mut seeded = StdRng::seed_from_u64(11);
        let first = generator.generate(2025, "9876546789", &mut seeded);

        let mut tx = RecordingTransaction::default();
        tx.existing_orders.insert(first.clone());

        let mut rng = StdRng::seed_from_u64(11);
        let allocated = allocate_order_id(&mut tx, &generator, 2025, "9876546789", &mut rng)
            .expect("second candidate is free");
        assert_ne!(allocated, first);
        assert!(allocated.starts_with("DP2025-6789-"));
    }

    #[test]
    fn execute_writes_order_with_revalidated_coupon() {
        let mut tx = tx_with(vec![product("a", "A", vec![variant(250, "g", 100, 5)])]);
        tx.settings.coupons.push(Coupon {
            title: "SAVE10".to_string(),
            discount_percent: 10,
            min_order_amount: BigDecimal::from(150),
        });

        let identity = identity();
        let profile = UserProfile::from_identity(&identity);
        let destination = Destination {
            method: DeliveryMethod::StorePickup,
            shipping: ShippingAddress::StorePickup,
            phone: "9876543210".to_string(),
        };
        let lines = vec![line("a", "A", "250 g", "100", 2)];
        let ids = OrderIdGenerator::default();
        let plan = CheckoutPlan {
            identity: &identity,
            profile: &profile,
            destination: &destination,
            lines: &lines,
            coupon_code: Some("SAVE10"),
            now: Utc.with_ymd_and_hms(2025, 10, 20, 18, 30, 0).unwrap(),
            ids: &ids,
        };

        let order = execute(&mut tx, &plan, &mut StdRng::seed_from_u64(1)).expect("commits");
        assert!(order.order_id.starts_with("DP2025-3210-"));
        assert_eq!(order.subtotal, BigDecimal::from(200));
        assert_eq!(order.discount_amount, BigDecimal::from(20));
        assert_eq!(order.total_amount, BigDecimal::from(180));
        assert_eq!(order.applied_code.as_deref(), Some("SAVE10"));
        assert_eq!(order.payment_method, PaymentMethod::PayAtStore);
        assert_eq!(order.status, OrderStatus::Placed);
        assert_eq!(order.user_name, "Karthik");
        assert_eq!(tx.inserted.len(), 1);
    }

    #[test]
    fn execute_drops_coupon_that_no_longer_qualifies() {
        let mut tx = tx_with(vec![product("a", "A", vec![variant(250, "g", 100, 5)])]);
        tx.settings.coupons.push(Coupon {
            title: "BIG300".to_string(),
            discount_percent: 10,
            min_order_amount: BigDecimal::from(300),
        });

        let identity = identity();
        let profile = UserProfile::from_identity(&identity);
        let destination = Destination {
            method: DeliveryMethod::StorePickup,
            shipping: ShippingAddress::StorePickup,
            phone: "9876543210".to_string(),
        };
        let lines = vec![line("a", "A", "250 g", "125", 2)];
        let ids = OrderIdGenerator::default();
        let plan = CheckoutPlan {
            identity: &identity,
            profile: &profile,
            destination: &destination,
            lines: &lines,
            coupon_code: Some("BIG300"),
            now: Utc::now(),
            ids: &ids,
        };

        let order = execute(&mut tx, &plan, &mut StdRng::seed_from_u64(2)).expect("commits");
        assert_eq!(order.applied_code, None);
        assert_eq!(order.total_amount, BigDecimal::from(250));
    }
}
