// Declare modules within this crate
pub mod doc;
pub mod error;
pub mod handlers;
pub mod logic;
#[cfg(test)]
mod logic_proptest;
#[cfg(test)]
mod logic_test;
pub mod routes;

pub use error::CatalogError;
pub use handlers::CatalogState;
pub use routes::routes;
