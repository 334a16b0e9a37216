pub mod cart_repo;
pub mod diesel_store;
pub mod memory;
pub mod models;
pub mod order_repo;
pub mod profile_repo;
pub mod retry;
pub mod settings_repo;

pub use diesel_store::DieselStore;
pub use memory::InMemoryStore;
pub use retry::RetryPolicy;
