pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod errors;
pub mod order;
pub mod order_id;
pub mod ports;
pub mod pricing;
pub mod profile;
