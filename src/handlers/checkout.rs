use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::checkout_service::{Quote, QuoteRequest};
use crate::application::StorefrontApi;
use crate::domain::checkout::{CheckoutRequest, DeliverySelection};
use crate::domain::order::DeliveryMethod;
use crate::errors::{AppError, ErrorBody};

use super::identity::Caller;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethodRequest {
    HomeDelivery,
    StorePickup,
}

impl From<DeliveryMethodRequest> for DeliveryMethod {
    fn from(value: DeliveryMethodRequest) -> Self {
        match value {
            DeliveryMethodRequest::HomeDelivery => DeliveryMethod::HomeDelivery,
            DeliveryMethodRequest::StorePickup => DeliveryMethod::StorePickup,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    pub delivery_method: DeliveryMethodRequest,
    /// Index into the profile's saved addresses; required for home delivery.
    #[serde(default)]
    pub address_index: Option<usize>,
    /// Contact number for store pickup, exactly 10 digits.
    #[serde(default)]
    pub pickup_phone: Option<String>,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

impl From<PlaceOrderRequest> for CheckoutRequest {
    fn from(req: PlaceOrderRequest) -> Self {
        let delivery = match req.delivery_method {
            DeliveryMethodRequest::HomeDelivery => DeliverySelection::HomeDelivery {
                address_index: req.address_index,
            },
            DeliveryMethodRequest::StorePickup => DeliverySelection::StorePickup {
                phone: req.pickup_phone.unwrap_or_default(),
            },
        };
        CheckoutRequest {
            delivery,
            coupon_code: req.coupon_code.filter(|c| !c.trim().is_empty()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlaceOrderResponse {
    pub order_id: String,
    pub total_amount: String,
    pub payment_method: String,
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QuoteRequestBody {
    pub delivery_method: DeliveryMethodRequest,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OfferResponse {
    pub title: String,
    pub discount_percent: u32,
    pub min_amount: String,
    pub unlocked: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuoteResponse {
    pub subtotal: String,
    pub discount_percent: u32,
    pub discount_amount: String,
    pub final_payable: String,
    pub applied_code: Option<String>,
    pub delivery_shortfall: String,
    pub offers: Vec<OfferResponse>,
}

impl From<Quote> for QuoteResponse {
    fn from(quote: Quote) -> Self {
        QuoteResponse {
            subtotal: quote.price.subtotal.to_string(),
            discount_percent: quote.price.discount_percent,
            discount_amount: quote.price.discount_amount.to_string(),
            final_payable: quote.price.final_payable.to_string(),
            applied_code: quote.price.applied_code,
            delivery_shortfall: quote.delivery_shortfall.to_string(),
            offers: quote
                .offers
                .into_iter()
                .map(|o| OfferResponse {
                    title: o.coupon.title,
                    discount_percent: o.coupon.discount_percent,
                    min_amount: o.coupon.min_order_amount.to_string(),
                    unlocked: o.unlocked,
                })
                .collect(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /checkout
///
/// Places the caller's saved cart as one order. Stock is re-validated against
/// the live catalog; on any failure nothing is written and the cart is kept.
#[utoipa::path(
    post,
    path = "/checkout",
    params(("X-User-Id" = String, Header, description = "Signed-in user")),
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = PlaceOrderResponse),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 409, description = "Stock changed or concurrent checkout", body = ErrorBody),
        (status = 422, description = "Delivery preconditions not met", body = ErrorBody),
        (status = 503, description = "Ordering off or storage unavailable", body = ErrorBody),
    ),
    tag = "checkout"
)]
pub async fn place_order(
    api: web::Data<dyn StorefrontApi>,
    caller: Caller,
    body: web::Json<PlaceOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let request = CheckoutRequest::from(body.into_inner());
    let order = web::block(move || api.place_order(caller.identity(), &request)).await??;

    Ok(HttpResponse::Created().json(PlaceOrderResponse {
        total_amount: order.total_amount.to_string(),
        payment_method: order.payment_method.as_str().to_string(),
        status: order.status.as_str().to_string(),
        order_id: order.order_id,
    }))
}

/// POST /checkout/quote
#[utoipa::path(
    post,
    path = "/checkout/quote",
    params(("X-User-Id" = String, Header, description = "Signed-in user")),
    request_body = QuoteRequestBody,
    responses(
        (status = 200, description = "Current pricing", body = QuoteResponse),
        (status = 422, description = "Coupon unknown or not yet unlocked", body = ErrorBody),
    ),
    tag = "checkout"
)]
pub async fn quote(
    api: web::Data<dyn StorefrontApi>,
    caller: Caller,
    body: web::Json<QuoteRequestBody>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let request = QuoteRequest {
        delivery_method: body.delivery_method.into(),
        coupon_code: body.coupon_code.filter(|c| !c.trim().is_empty()),
    };
    let quote = web::block(move || api.quote(caller.identity(), &request)).await??;
    Ok(HttpResponse::Ok().json(QuoteResponse::from(quote)))
}
