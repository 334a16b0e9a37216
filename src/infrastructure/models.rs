use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::catalog::{Product, Variant};
use crate::domain::errors::DomainError;
use crate::domain::order::{Order, ORDER_AGGREGATE, ORDER_PLACED_EVENT};
use crate::domain::profile::UserProfile;
use crate::schema::{app_settings, carts, order_outbox, orders, products, profiles};

pub(crate) fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, DomainError> {
    serde_json::from_value(value)
        .map_err(|e| DomainError::Internal(format!("malformed {what} document: {e}")))
}

pub(crate) fn encode<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<Value, DomainError> {
    serde_json::to_value(value)
        .map_err(|e| DomainError::Internal(format!("cannot encode {what}: {e}")))
}

// ── Catalog ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub category: String,
    pub is_available: bool,
    pub variants: Value,
    pub revision: i64,
}

impl ProductRow {
    /// The product together with the revision it was read at.
    pub fn into_product(self) -> Result<(Product, i64), DomainError> {
        let variants: Vec<Variant> = decode(self.variants, "variants")?;
        Ok((
            Product {
                id: self.id,
                name: self.name,
                category: self.category,
                is_available: self.is_available,
                variants,
            },
            self.revision,
        ))
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub id: String,
    pub name: String,
    pub category: String,
    pub is_available: bool,
    pub variants: Value,
}

impl NewProductRow {
    pub fn from_product(product: &Product) -> Result<Self, DomainError> {
        Ok(NewProductRow {
            id: product.id.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            is_available: product.is_available,
            variants: encode(&product.variants, "variants")?,
        })
    }
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub order_id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: Option<String>,
    pub phone: String,
    pub items: Value,
    pub subtotal: BigDecimal,
    pub discount_amount: BigDecimal,
    pub applied_code: Option<String>,
    pub total_amount: BigDecimal,
    pub delivery_method: String,
    pub shipping_address: Value,
    pub payment_method: String,
    pub status: String,
    pub client_created_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub rider_name: Option<String>,
    pub rider_phone: Option<String>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            items: decode(row.items, "order items")?,
            shipping_address: decode(row.shipping_address, "shipping address")?,
            delivery_method: row.delivery_method.parse()?,
            payment_method: row.payment_method.parse()?,
            status: row.status.parse()?,
            order_id: row.order_id,
            user_id: row.user_id,
            user_name: row.user_name,
            user_email: row.user_email,
            phone: row.phone,
            subtotal: row.subtotal,
            discount_amount: row.discount_amount,
            applied_code: row.applied_code,
            total_amount: row.total_amount,
            created_at: row.client_created_at,
            recorded_at: Some(row.created_at),
            rider_name: row.rider_name,
            rider_phone: row.rider_phone,
        })
    }
}

/// The server timestamp (`created_at`) is left to the database default.
#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub order_id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: Option<String>,
    pub phone: String,
    pub items: Value,
    pub subtotal: BigDecimal,
    pub discount_amount: BigDecimal,
    pub applied_code: Option<String>,
    pub total_amount: BigDecimal,
    pub delivery_method: String,
    pub shipping_address: Value,
    pub payment_method: String,
    pub status: String,
    pub client_created_at: DateTime<Utc>,
}

impl NewOrderRow {
    pub fn from_order(order: &Order) -> Result<Self, DomainError> {
        Ok(NewOrderRow {
            order_id: order.order_id.clone(),
            user_id: order.user_id.clone(),
            user_name: order.user_name.clone(),
            user_email: order.user_email.clone(),
            phone: order.phone.clone(),
            items: encode(&order.items, "order items")?,
            subtotal: order.subtotal.clone(),
            discount_amount: order.discount_amount.clone(),
            applied_code: order.applied_code.clone(),
            total_amount: order.total_amount.clone(),
            delivery_method: order.delivery_method.as_str().to_string(),
            shipping_address: encode(&order.shipping_address, "shipping address")?,
            payment_method: order.payment_method.as_str().to_string(),
            status: order.status.as_str().to_string(),
            client_created_at: order.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = order_outbox)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_outbox)]
pub struct NewOutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
}

impl NewOutboxEventRow {
    pub fn order_placed(order: &Order) -> Self {
        NewOutboxEventRow {
            id: Uuid::new_v4(),
            aggregate_type: ORDER_AGGREGATE.to_string(),
            aggregate_id: order.order_id.clone(),
            event_type: ORDER_PLACED_EVENT.to_string(),
            payload: order.placed_event_payload(),
        }
    }
}

// ── Carts, profiles, settings ────────────────────────────────────────────────

#[derive(Debug, Insertable)]
#[diesel(table_name = carts)]
pub struct CartRow {
    pub user_id: String,
    pub lines: Value,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProfileRow {
    pub user_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub addresses: Value,
}

impl ProfileRow {
    pub fn from_profile(profile: &UserProfile) -> Result<Self, DomainError> {
        Ok(ProfileRow {
            user_id: profile.user_id.clone(),
            name: profile.name.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            addresses: encode(&profile.addresses, "addresses")?,
        })
    }
}

impl TryFrom<ProfileRow> for UserProfile {
    type Error = DomainError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(UserProfile {
            addresses: decode(row.addresses, "addresses")?,
            user_id: row.user_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = app_settings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SettingRow {
    pub key: String,
    pub value: Value,
}
