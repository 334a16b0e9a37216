use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::StorefrontApi;
use crate::domain::order::Order;
use crate::errors::{AppError, ErrorBody};

use super::cart::CartLineResponse;
use super::identity::Caller;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub order_id: String,
    pub user_name: String,
    pub user_email: Option<String>,
    pub phone: String,
    pub items: Vec<CartLineResponse>,
    pub subtotal: String,
    pub discount_amount: String,
    pub applied_code: Option<String>,
    pub total_amount: String,
    pub delivery_method: String,
    /// A saved address object, or the string `"Store Pickup"`.
    #[schema(value_type = Object)]
    pub shipping_address: serde_json::Value,
    pub payment_method: String,
    pub status: String,
    pub created_at: String,
    pub recorded_at: Option<String>,
    pub rider_name: Option<String>,
    pub rider_phone: Option<String>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        OrderResponse {
            items: order.items.iter().map(CartLineResponse::from).collect(),
            subtotal: order.subtotal.to_string(),
            discount_amount: order.discount_amount.to_string(),
            total_amount: order.total_amount.to_string(),
            delivery_method: order.delivery_method.as_str().to_string(),
            shipping_address: serde_json::to_value(&order.shipping_address)
                .unwrap_or(serde_json::Value::Null),
            payment_method: order.payment_method.as_str().to_string(),
            status: order.status.as_str().to_string(),
            created_at: order.created_at.to_rfc3339(),
            recorded_at: order.recorded_at.map(|t| t.to_rfc3339()),
            order_id: order.order_id,
            user_name: order.user_name,
            user_email: order.user_email,
            phone: order.phone,
            applied_code: order.applied_code,
            rider_name: order.rider_name,
            rider_phone: order.rider_phone,
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    pub page: Option<i64>,
    /// Items per page. Defaults to 20, capped at 100.
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /orders/{order_id}
///
/// Returns one of the caller's orders; other users' orders are reported as missing.
#[utoipa::path(
    get,
    path = "/orders/{order_id}",
    params(
        ("order_id" = String, Path, description = "Order identifier, e.g. DP2025-6789-4213"),
        ("X-User-Id" = String, Header, description = "Signed-in user"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "orders"
)]
pub async fn get_order(
    api: web::Data<dyn StorefrontApi>,
    caller: Caller,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let order = web::block(move || api.order(caller.identity(), &order_id)).await??;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /orders
///
/// The caller's orders, newest first.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ListOrdersParams,
        ("X-User-Id" = String, Header, description = "Signed-in user"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 401, description = "Not signed in", body = ErrorBody),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    api: web::Data<dyn StorefrontApi>,
    caller: Caller,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page =
        web::block(move || api.orders(caller.identity(), params.page, params.limit)).await??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: page.items.into_iter().map(OrderResponse::from).collect(),
        total: page.total,
        page: page.page,
        limit: page.limit,
    }))
}
