pub mod cart;
pub mod checkout;
pub mod identity;
pub mod orders;
pub mod profile;

use actix_web::web;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "Storefront service", description = "Cart, checkout and order tracking"),
    paths(
        checkout::place_order,
        checkout::quote,
        cart::get_cart,
        cart::add_item,
        cart::adjust_item,
        cart::remove_item,
        cart::merge_cart,
        orders::get_order,
        orders::list_orders,
        profile::get_profile,
        profile::update_profile,
        profile::add_address,
        profile::remove_address,
    ),
    components(schemas(crate::errors::ErrorBody)),
    tags(
        (name = "checkout", description = "Order placement"),
        (name = "cart", description = "Per-user cart"),
        (name = "orders", description = "Order history"),
        (name = "profile", description = "Contact details and address book"),
    )
)]
pub struct ApiDoc;

/// Registers every storefront route on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/checkout")
            .route("", web::post().to(checkout::place_order))
            .route("/quote", web::post().to(checkout::quote)),
    )
    .service(
        web::scope("/cart")
            .route("", web::get().to(cart::get_cart))
            .route("/items", web::post().to(cart::add_item))
            .route("/items/{line_id}", web::patch().to(cart::adjust_item))
            .route("/items/{line_id}", web::delete().to(cart::remove_item))
            .route("/merge", web::post().to(cart::merge_cart)),
    )
    .service(
        web::scope("/orders")
            .route("", web::get().to(orders::list_orders))
            .route("/{order_id}", web::get().to(orders::get_order)),
    )
    .service(
        web::scope("/profile")
            .route("", web::get().to(profile::get_profile))
            .route("", web::put().to(profile::update_profile))
            .route("/addresses", web::post().to(profile::add_address))
            .route("/addresses/{index}", web::delete().to(profile::remove_address)),
    );
}
