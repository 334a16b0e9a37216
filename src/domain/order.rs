use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::cart::CartLine;
use super::errors::DomainError;
use super::profile::Address;

/// Marker stored in place of an address for store-pickup orders.
pub const STORE_PICKUP: &str = "Store Pickup";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryMethod {
    #[serde(rename = "Home Delivery")]
    HomeDelivery,
    #[serde(rename = "Store Pickup")]
    StorePickup,
}

impl DeliveryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMethod::HomeDelivery => "Home Delivery",
            DeliveryMethod::StorePickup => STORE_PICKUP,
        }
    }

    pub fn payment_method(&self) -> PaymentMethod {
        match self {
            DeliveryMethod::HomeDelivery => PaymentMethod::CashOnDelivery,
            DeliveryMethod::StorePickup => PaymentMethod::PayAtStore,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "COD")]
    CashOnDelivery,
    #[serde(rename = "Pay at Store")]
    PayAtStore,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "COD",
            PaymentMethod::PayAtStore => "Pay at Store",
        }
    }
}

/// Fulfillment lifecycle. The checkout only ever writes `Placed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Placed,
    Processing,
    Shipped,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "Placed",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::OutForDelivery => "Out for Delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Placed" => Ok(OrderStatus::Placed),
            "Processing" => Ok(OrderStatus::Processing),
            "Shipped" => Ok(OrderStatus::Shipped),
            "Out for Delivery" => Ok(OrderStatus::OutForDelivery),
            "Delivered" => Ok(OrderStatus::Delivered),
            "Cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::Internal(format!("unknown order status '{other}'"))),
        }
    }
}

impl FromStr for DeliveryMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Home Delivery" => Ok(DeliveryMethod::HomeDelivery),
            STORE_PICKUP => Ok(DeliveryMethod::StorePickup),
            other => Err(DomainError::Internal(format!(
                "unknown delivery method '{other}'"
            ))),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COD" => Ok(PaymentMethod::CashOnDelivery),
            "Pay at Store" => Ok(PaymentMethod::PayAtStore),
            other => Err(DomainError::Internal(format!(
                "unknown payment method '{other}'"
            ))),
        }
    }
}

/// Where the order goes: a saved address, or the pickup marker string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ShippingRepr", into = "ShippingRepr")]
pub enum ShippingAddress {
    Delivery(Address),
    StorePickup,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ShippingRepr {
    Address(Address),
    Marker(String),
}

impl From<ShippingAddress> for ShippingRepr {
    fn from(value: ShippingAddress) -> Self {
        match value {
            ShippingAddress::Delivery(address) => ShippingRepr::Address(address),
            ShippingAddress::StorePickup => ShippingRepr::Marker(STORE_PICKUP.to_string()),
        }
    }
}

impl TryFrom<ShippingRepr> for ShippingAddress {
    type Error = String;

    fn try_from(value: ShippingRepr) -> Result<Self, Self::Error> {
        match value {
            ShippingRepr::Address(address) => Ok(ShippingAddress::Delivery(address)),
            ShippingRepr::Marker(marker) if marker == STORE_PICKUP => {
                Ok(ShippingAddress::StorePickup)
            }
            ShippingRepr::Marker(other) => Err(format!("unknown shipping marker '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: Option<String>,
    pub phone: String,
    pub items: Vec<CartLine>,
    pub subtotal: BigDecimal,
    pub discount_amount: BigDecimal,
    pub applied_code: Option<String>,
    pub total_amount: BigDecimal,
    pub delivery_method: DeliveryMethod,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    /// Client clock at the moment the order was built.
    pub created_at: DateTime<Utc>,
    /// Store clock at commit; `None` until the order has been persisted.
    pub recorded_at: Option<DateTime<Utc>>,
    pub rider_name: Option<String>,
    pub rider_phone: Option<String>,
}

/// Outbox routing key for order events.
pub const ORDER_AGGREGATE: &str = "Order";
pub const ORDER_PLACED_EVENT: &str = "OrderPlaced";

impl Order {
    /// Payload of the `OrderPlaced` outbox event consumed by fulfillment.
    pub fn placed_event_payload(&self) -> serde_json::Value {
        let lines: Vec<serde_json::Value> = self
            .items
            .iter()
            .map(|l| {
                json!({
                    "product_id": l.product_id,
                    "variant_id": l.variant_id,
                    "selected_weight": l.selected_weight,
                    "quantity": l.qty,
                    "unit_price": l.price.to_string()
                })
            })
            .collect();

        json!({
            "order_id": self.order_id,
            "user_id": self.user_id,
            "status": self.status.as_str(),
            "delivery_method": self.delivery_method.as_str(),
            "payment_method": self.payment_method.as_str(),
            "total_amount": self.total_amount.to_string(),
            "lines": lines
        })
    }
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<Order>,
    pub total: i64,
}
