use bigdecimal::BigDecimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Please sign in to place an order")]
    Unauthenticated,
    #[error("Your cart is empty")]
    EmptyCart,
    #[error("Online ordering is currently switched off")]
    ShopClosed,
    #[error("Add {shortfall} more to qualify for home delivery")]
    BelowMinimumOrder { shortfall: BigDecimal },
    #[error("Please select a delivery address")]
    NoAddressSelected,
    #[error("Enter a valid 10 digit phone number")]
    InvalidPhone,
    #[error("{0} is no longer available")]
    ProductUnavailable(String),
    #[error("The selected size of {0} is no longer available")]
    VariantUnavailable(String),
    #[error("Insufficient stock for {name}: only {available} left")]
    InsufficientStock { name: String, available: i32 },
    #[error("The order could not be completed because of concurrent activity, please try again")]
    TransactionConflict,
    #[error("Coupon {0} does not exist")]
    CouponNotFound(String),
    #[error("Add {shortfall} more to use coupon {code}")]
    CouponBelowMinimum { code: String, shortfall: BigDecimal },
    #[error("Not found")]
    NotFound,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Storage unavailable: {0}")]
    Storage(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Stable machine-readable name of the failure kind.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Unauthenticated => "unauthenticated",
            DomainError::EmptyCart => "empty_cart",
            DomainError::ShopClosed => "shop_closed",
            DomainError::BelowMinimumOrder { .. } => "below_minimum_order",
            DomainError::NoAddressSelected => "no_address_selected",
            DomainError::InvalidPhone => "invalid_phone",
            DomainError::ProductUnavailable(_) => "product_unavailable",
            DomainError::VariantUnavailable(_) => "variant_unavailable",
            DomainError::InsufficientStock { .. } => "insufficient_stock",
            DomainError::TransactionConflict => "transaction_conflict",
            DomainError::CouponNotFound(_) => "coupon_not_found",
            DomainError::CouponBelowMinimum { .. } => "coupon_below_minimum",
            DomainError::NotFound => "not_found",
            DomainError::InvalidInput(_) => "invalid_input",
            DomainError::Storage(_) => "storage_unavailable",
            DomainError::Internal(_) => "internal",
        }
    }

    /// Whether re-submitting the same request unchanged may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DomainError::TransactionConflict | DomainError::Storage(_)
        )
    }
}
