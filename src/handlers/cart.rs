use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::StorefrontApi;
use crate::domain::cart::{Cart, CartLine};
use crate::errors::AppError;

use super::identity::Caller;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddItemRequest {
    pub product_id: String,
    pub variant_id: Uuid,
    #[serde(default = "one")]
    pub qty: i32,
}

fn one() -> i32 {
    1
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdjustQuantityRequest {
    /// Signed change, e.g. `1` or `-1`. A line reaching zero is removed.
    pub delta: i32,
}

/// A cart line as held by a signed-out client.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GuestLineRequest {
    pub id: String,
    pub product_id: String,
    pub variant_id: Option<Uuid>,
    pub name: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
    /// Display descriptor such as `"500 g"`.
    pub selected_weight: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "120.50"
    pub price: String,
    pub qty: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MergeCartRequest {
    pub lines: Vec<GuestLineRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLineResponse {
    pub id: String,
    pub product_id: String,
    pub variant_id: Option<Uuid>,
    pub name: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub selected_weight: String,
    pub price: String,
    pub qty: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub lines: Vec<CartLineResponse>,
    pub subtotal: String,
}

impl From<&CartLine> for CartLineResponse {
    fn from(line: &CartLine) -> Self {
        CartLineResponse {
            id: line.id.clone(),
            product_id: line.product_id.clone(),
            variant_id: line.variant_id,
            name: line.name.clone(),
            category: line.category.clone(),
            image_url: line.image_url.clone(),
            selected_weight: line.selected_weight.clone(),
            price: line.price.to_string(),
            qty: line.qty,
        }
    }
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        CartResponse {
            subtotal: cart.subtotal().to_string(),
            lines: cart.lines().iter().map(CartLineResponse::from).collect(),
        }
    }
}

impl TryFrom<GuestLineRequest> for CartLine {
    type Error = AppError;

    fn try_from(req: GuestLineRequest) -> Result<Self, Self::Error> {
        let price = BigDecimal::from_str(&req.price)
            .map_err(|_| AppError::BadRequest(format!("invalid price '{}'", req.price)))?;
        Ok(CartLine {
            id: req.id,
            product_id: req.product_id,
            variant_id: req.variant_id,
            name: req.name,
            category: req.category,
            image_url: req.image_url,
            selected_weight: req.selected_weight,
            price,
            qty: req.qty,
        })
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /cart
#[utoipa::path(
    get,
    path = "/cart",
    params(("X-User-Id" = String, Header, description = "Signed-in user")),
    responses(
        (status = 200, description = "Current cart", body = CartResponse),
        (status = 401, description = "Not signed in", body = crate::errors::ErrorBody),
    ),
    tag = "cart"
)]
pub async fn get_cart(
    api: web::Data<dyn StorefrontApi>,
    caller: Caller,
) -> Result<HttpResponse, AppError> {
    let cart = web::block(move || api.cart(caller.identity())).await??;
    Ok(HttpResponse::Ok().json(CartResponse::from(cart)))
}

/// POST /cart/items
///
/// Snapshots the variant's current name, price and descriptor into the cart.
#[utoipa::path(
    post,
    path = "/cart/items",
    params(("X-User-Id" = String, Header, description = "Signed-in user")),
    request_body = AddItemRequest,
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
        (status = 409, description = "Unavailable or sold out", body = crate::errors::ErrorBody),
        (status = 422, description = "Invalid quantity", body = crate::errors::ErrorBody),
    ),
    tag = "cart"
)]
pub async fn add_item(
    api: web::Data<dyn StorefrontApi>,
    caller: Caller,
    body: web::Json<AddItemRequest>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    let cart = web::block(move || {
        api.add_to_cart(caller.identity(), &req.product_id, req.variant_id, req.qty)
    })
    .await??;
    Ok(HttpResponse::Ok().json(CartResponse::from(cart)))
}

/// PATCH /cart/items/{line_id}
#[utoipa::path(
    patch,
    path = "/cart/items/{line_id}",
    params(
        ("line_id" = String, Path, description = "Cart line id"),
        ("X-User-Id" = String, Header, description = "Signed-in user"),
    ),
    request_body = AdjustQuantityRequest,
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
        (status = 404, description = "No such line", body = crate::errors::ErrorBody),
    ),
    tag = "cart"
)]
pub async fn adjust_item(
    api: web::Data<dyn StorefrontApi>,
    caller: Caller,
    path: web::Path<String>,
    body: web::Json<AdjustQuantityRequest>,
) -> Result<HttpResponse, AppError> {
    let line_id = path.into_inner();
    let delta = body.delta;
    let cart =
        web::block(move || api.adjust_cart_line(caller.identity(), &line_id, delta)).await??;
    Ok(HttpResponse::Ok().json(CartResponse::from(cart)))
}

/// DELETE /cart/items/{line_id}
#[utoipa::path(
    delete,
    path = "/cart/items/{line_id}",
    params(
        ("line_id" = String, Path, description = "Cart line id"),
        ("X-User-Id" = String, Header, description = "Signed-in user"),
    ),
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
        (status = 404, description = "No such line", body = crate::errors::ErrorBody),
    ),
    tag = "cart"
)]
pub async fn remove_item(
    api: web::Data<dyn StorefrontApi>,
    caller: Caller,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let line_id = path.into_inner();
    let cart = web::block(move || api.remove_cart_line(caller.identity(), &line_id)).await??;
    Ok(HttpResponse::Ok().json(CartResponse::from(cart)))
}

/// POST /cart/merge
///
/// Folds the cart a client built while signed out into the saved cart.
#[utoipa::path(
    post,
    path = "/cart/merge",
    params(("X-User-Id" = String, Header, description = "Signed-in user")),
    request_body = MergeCartRequest,
    responses(
        (status = 200, description = "Merged cart", body = CartResponse),
        (status = 400, description = "Malformed line", body = crate::errors::ErrorBody),
    ),
    tag = "cart"
)]
pub async fn merge_cart(
    api: web::Data<dyn StorefrontApi>,
    caller: Caller,
    body: web::Json<MergeCartRequest>,
) -> Result<HttpResponse, AppError> {
    let lines = body
        .into_inner()
        .lines
        .into_iter()
        .map(CartLine::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    let guest = Cart::from_lines(lines);
    let cart = web::block(move || api.merge_cart(caller.identity(), guest)).await??;
    Ok(HttpResponse::Ok().json(CartResponse::from(cart)))
}
