use bazaar_core::OrderService;
use bazaar_core::auth::TokenService;
use bazaar_db::{Database, OrderRepository};

/// Shared application state, available to all route handlers via `State<Arc<AppState>>`.
pub struct AppState {
    pub db: Database,
    /// Signs and verifies bearer tokens.
    pub tokens: TokenService,
}

impl AppState {
    pub fn orders(&self) -> OrderService<OrderRepository> {
        OrderService::new(self.db.order_repo())
    }
}
