//! PostgreSQL persistence for Bazaar: pool, migrations, and one repository
//! per resource.

pub mod analytics_repository;
pub mod config;
pub mod database;
pub mod pagination;

pub mod customer_repository;
pub mod order_repository;
pub mod product_repository;
pub mod user_repository;
pub mod vendor_repository;

pub use analytics_repository::AnalyticsRepository;
pub use config::DatabaseConfig;
pub use customer_repository::CustomerRepository;
pub use database::Database;
pub use order_repository::OrderRepository;
pub use pagination::{ListFilter, paginate};
pub use product_repository::ProductRepository;
pub use user_repository::UserRepository;
pub use vendor_repository::VendorRepository;
