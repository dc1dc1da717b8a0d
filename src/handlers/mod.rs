pub mod health;
pub mod orders;

use crate::{db::DbPool, services::orders::OrderService};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone, Debug)]
pub struct AppServices {
    pub order: Arc<OrderService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            order: Arc::new(OrderService::new(db_pool)),
        }
    }
}
