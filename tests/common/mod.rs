#![allow(dead_code)]

use std::str::FromStr;
use std::time::Duration;

use bigdecimal::BigDecimal;
use chrono::{DateTime, TimeZone, Utc};
use storefront_service::application::Storefront;
use storefront_service::domain::cart::{Cart, CartLine};
use storefront_service::domain::catalog::{Product, Variant};
use storefront_service::domain::order_id::OrderIdGenerator;
use storefront_service::domain::ports::{CartRepository, Clock};
use storefront_service::domain::profile::Identity;
use storefront_service::infrastructure::{InMemoryStore, RetryPolicy};
use uuid::Uuid;

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn october_2025() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2025, 10, 20, 18, 45, 0).unwrap())
}

pub fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(8),
    }
}

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
        category: "Sweets".to_string(),
        is_available: true,
        variants,
    }
}

/// A cart line as stored by older clients: no variant id, descriptor only.
pub fn line(product_id: &str, name: &str, weight: &str, price: &str, qty: i32) -> CartLine {
    CartLine {
        id: format!("{product_id}-{}", weight.replace(' ', "")),
        product_id: product_id.to_string(),
        variant_id: None,
        name: name.to_string(),
        category: None,
        image_url: None,
        selected_weight: weight.to_string(),
        price: BigDecimal::from_str(price).expect("valid decimal"),
        qty,
    }
}

pub fn user(user_id: &str) -> Identity {
    Identity {
        user_id: user_id.to_string(),
        display_name: Some(format!("Customer {user_id}")),
        email: Some(format!("{user_id}@example.com")),
        phone: None,
    }
}

pub fn stock(store: &InMemoryStore, product_id: &str, variant: usize) -> i32 {
    use storefront_service::domain::ports::CatalogRepository;
    store
        .find_product(product_id)
        .expect("catalog read")
        .expect("product exists")
        .variants[variant]
        .stock
}

pub fn fill_cart(store: &InMemoryStore, user_id: &str, lines: Vec<CartLine>) {
    store
        .save_cart(user_id, &Cart::from_lines(lines))
        .expect("save cart");
}

pub fn storefront(store: &InMemoryStore) -> Storefront<InMemoryStore, FixedClock> {
    Storefront::with_clock(store.clone(), october_2025(), OrderIdGenerator::default())
}
