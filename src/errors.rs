use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    /// Stable machine-readable failure kind, e.g. `insufficient_stock`.
    pub code: String,
    /// Whether resubmitting the same request may succeed.
    pub retryable: bool,
}

impl AppError {
    fn code(&self) -> &'static str {
        match self {
            AppError::Domain(e) => e.code(),
            AppError::BadRequest(_) => "bad_request",
            AppError::Internal(_) => "internal",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, AppError::Domain(e) if e.is_retryable())
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(e: actix_web::error::BlockingError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Domain(e) => match e {
                DomainError::Unauthenticated => StatusCode::UNAUTHORIZED,
                DomainError::NotFound => StatusCode::NOT_FOUND,
                DomainError::ProductUnavailable(_)
                | DomainError::VariantUnavailable(_)
                | DomainError::InsufficientStock { .. }
                | DomainError::TransactionConflict => StatusCode::CONFLICT,
                DomainError::EmptyCart
                | DomainError::BelowMinimumOrder { .. }
                | DomainError::NoAddressSelected
                | DomainError::InvalidPhone
                | DomainError::CouponNotFound(_)
                | DomainError::CouponBelowMinimum { .. }
                | DomainError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
                DomainError::ShopClosed | DomainError::Storage(_) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = match status {
            StatusCode::INTERNAL_SERVER_ERROR => {
                log::error!("{}", self);
                "Internal server error".to_string()
            }
            StatusCode::SERVICE_UNAVAILABLE
                if !matches!(self, AppError::Domain(DomainError::ShopClosed)) =>
            {
                log::error!("{}", self);
                "Service temporarily unavailable, please try again".to_string()
            }
            _ => self.to_string(),
        };
        HttpResponse::build(status).json(ErrorBody {
            error: message,
            code: self.code().to_string(),
            retryable: self.retryable(),
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use actix_web::ResponseError;
    use bigdecimal::BigDecimal;

    use super::*;

    fn status(err: DomainError) -> StatusCode {
        AppError::from(err).error_response().status()
    }

    #[test]
    fn not_found_returns_404() {
        assert_eq!(status(DomainError::NotFound), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unauthenticated_returns_401() {
        assert_eq!(status(DomainError::Unauthenticated), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn stock_failures_are_conflicts() {
        assert_eq!(
            status(DomainError::InsufficientStock {
                name: "A".to_string(),
                available: 1
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(status(DomainError::TransactionConflict), StatusCode::CONFLICT);
        assert_eq!(
            status(DomainError::VariantUnavailable("A".to_string())),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn precondition_failures_are_unprocessable() {
        assert_eq!(
            status(DomainError::BelowMinimumOrder {
                shortfall: BigDecimal::from(50)
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status(DomainError::InvalidPhone), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn storage_failure_is_retryable_503() {
        let err = AppError::from(DomainError::Storage("pool timed out".to_string()));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.retryable());
    }

    #[test]
    fn internal_error_returns_500() {
        let err = AppError::Internal("something went wrong".to_string());
        assert_eq!(
            err.error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn domain_message_is_displayed_transparently() {
        let err = AppError::from(DomainError::InsufficientStock {
            name: "Murukku".to_string(),
            available: 1,
        });
        assert_eq!(err.to_string(), "Insufficient stock for Murukku: only 1 left");
    }

    #[actix_web::test]
    async fn body_carries_code_and_retry_hint() {
        let resp = AppError::from(DomainError::TransactionConflict).error_response();
        let body = to_bytes(resp.into_body()).await.expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(json["code"], "transaction_conflict");
        assert_eq!(json["retryable"], true);
    }

    #[actix_web::test]
    async fn internal_details_are_not_leaked() {
        let resp = AppError::from(DomainError::Internal("secret dsn".to_string())).error_response();
        let body = to_bytes(resp.into_body()).await.expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(json["error"], "Internal server error");
    }
}
