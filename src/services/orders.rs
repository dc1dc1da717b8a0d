use crate::{
    db::{DatabaseAccess, DbPool},
    errors::ServiceError,
    repositories::{OrderDetails, OrderItemRepository, OrderRepository, ProductRepository},
};
use metrics::counter;
use sea_orm::DatabaseTransaction;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Request to add `quantity` units of a product to an order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItemCommand {
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
}

/// Service for order line-item mutation and order lookup
#[derive(Clone, Debug)]
pub struct OrderService {
    db: DatabaseAccess,
}

impl OrderService {
    /// Creates a new order service instance
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            db: DatabaseAccess::new(db_pool),
        }
    }

    /// Adds a product to an order, merging into an existing line for the same
    /// product, then reserves stock and recomputes the order total.
    ///
    /// All writes commit together or not at all. Returns the order as it
    /// stands after the commit.
    #[instrument(skip(self, command), fields(order_id = command.order_id, product_id = command.product_id, quantity = command.quantity))]
    pub async fn add_item_to_order(
        &self,
        command: AddItemCommand,
    ) -> Result<OrderDetails, ServiceError> {
        if command.quantity < 1 {
            counter!("order_items.rejected", 1, "code" => "validation_error");
            return Err(ServiceError::ValidationError(format!(
                "quantity must be a positive integer, got {}",
                command.quantity
            )));
        }

        let outcome = self
            .db
            .transaction::<_, _, ServiceError>(move |txn| Box::pin(apply_add_item(txn, command)))
            .await;

        if let Err(e) = outcome {
            warn!(error = %e, code = e.code(), "add item to order rejected");
            counter!("order_items.rejected", 1, "code" => e.code());
            return Err(e);
        }

        counter!("order_items.added", 1);
        info!("item added to order");

        self.get_order(command.order_id).await
    }

    /// Loads an order with its client and items
    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: i32) -> Result<OrderDetails, ServiceError> {
        OrderRepository::new(self.db.get_pool())
            .find_with_details(order_id)
            .await?
            .ok_or(ServiceError::OrderNotFound(order_id))
    }
}

async fn apply_add_item(
    txn: &DatabaseTransaction,
    command: AddItemCommand,
) -> Result<(), ServiceError> {
    let AddItemCommand {
        order_id,
        product_id,
        quantity,
    } = command;

    let orders = OrderRepository::new(txn);
    let products = ProductRepository::new(txn);
    let items = OrderItemRepository::new(txn);

    if orders.find_by_id(order_id).await?.is_none() {
        return Err(ServiceError::OrderNotFound(order_id));
    }

    if !products.has_stock(product_id, quantity).await? {
        return Err(ServiceError::InsufficientStock {
            product_id,
            requested: quantity,
        });
    }

    match items.find_for_product(order_id, product_id).await? {
        Some(existing) => {
            items.increment_quantity(&existing, quantity).await?;
        }
        None => {
            let product = products
                .find_by_id(product_id)
                .await?
                .ok_or(ServiceError::ProductNotFound(product_id))?;
            items
                .create(order_id, product_id, quantity, product.price)
                .await?;
        }
    }

    // stock may have moved since has_stock; the guarded update refuses to overdraw
    if !products.adjust_quantity(product_id, -quantity).await? {
        return Err(ServiceError::InsufficientStock {
            product_id,
            requested: quantity,
        });
    }

    orders.recompute_total(order_id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{establish_connection_with_config, run_migrations, DbConfig};
    use crate::repositories::{ClientRepository, NewProduct};
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    async fn service_with_order() -> (OrderService, Arc<DbPool>, i32, i32) {
        let pool = establish_connection_with_config(&DbConfig::in_memory_sqlite())
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();
        let pool = Arc::new(pool);

        let client = ClientRepository::new(pool.as_ref())
            .create("Ivan Petrov", Some("10 Lenina St".to_string()))
            .await
            .unwrap();
        let order = OrderRepository::new(pool.as_ref())
            .create(client.id, None)
            .await
            .unwrap();
        let product = ProductRepository::new(pool.as_ref())
            .create(NewProduct {
                name: "iPhone 14".to_string(),
                quantity: 15,
                price: dec!(799.99),
                category_id: None,
            })
            .await
            .unwrap();

        (OrderService::new(pool.clone()), pool, order.id, product.id)
    }

    #[tokio::test]
    async fn non_positive_quantity_is_rejected_before_touching_the_store() {
        let (service, pool, order_id, product_id) = service_with_order().await;

        let result = service
            .add_item_to_order(AddItemCommand {
                order_id,
                product_id,
                quantity: 0,
            })
            .await;

        assert_matches!(result, Err(ServiceError::ValidationError(_)));
        let product = ProductRepository::new(pool.as_ref())
            .find_by_id(product_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(product.quantity, 15);
    }

    #[tokio::test]
    async fn first_addition_creates_line_at_current_price() {
        let (service, _pool, order_id, product_id) = service_with_order().await;

        let details = service
            .add_item_to_order(AddItemCommand {
                order_id,
                product_id,
                quantity: 2,
            })
            .await
            .unwrap();

        assert_eq!(details.items.len(), 1);
        assert_eq!(details.items[0].item.quantity, 2);
        assert_eq!(details.items[0].item.price, dec!(799.99));
        assert_eq!(details.items[0].product.quantity, 13);
        assert_eq!(details.order.total_amount, dec!(1599.98));
        assert_eq!(details.order.status, "created");
    }

    #[tokio::test]
    async fn missing_order_is_reported_as_order_not_found() {
        let (service, _pool, _order_id, product_id) = service_with_order().await;

        let result = service
            .add_item_to_order(AddItemCommand {
                order_id: 999,
                product_id,
                quantity: 1,
            })
            .await;

        assert_matches!(result, Err(ServiceError::OrderNotFound(999)));
    }

    #[tokio::test]
    async fn get_order_reports_missing_order() {
        let (service, _pool, _order_id, _product_id) = service_with_order().await;
        assert_matches!(
            service.get_order(42).await,
            Err(ServiceError::OrderNotFound(42))
        );
    }
}
