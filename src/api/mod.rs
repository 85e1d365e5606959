//! Typed access to the catalog REST API.

pub mod categories;
pub mod client;
pub mod products;

pub use categories::CategoriesApi;
pub use client::ApiClient;
pub use products::ProductsApi;
