//! Domain types, errors, authentication and order placement for Bazaar.

pub mod address;
pub mod analytics;
pub mod auth;
pub mod customer;
pub mod error;
pub mod order;
pub mod order_service;
pub mod order_store;
pub mod pagination;
pub mod product;
pub mod user;
pub mod validate;
pub mod vendor;


pub use address::Address;
pub use error::AppError;
pub use order_service::OrderService;
pub use order_store::OrderStore;
pub use pagination::{Page, PageRequest, PaginationMeta};
pub use user::Role;
