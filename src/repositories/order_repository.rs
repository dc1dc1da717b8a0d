use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;
use tracing::debug;

use crate::entities::client::{Entity as Client, Model as ClientModel};
use crate::entities::order::{
    ActiveModel as OrderActiveModel, Column, Entity as Order, Model as OrderModel,
};
use crate::entities::order_item::{self, Entity as OrderItem, Model as OrderItemModel};
use crate::repositories::OrderItemRepository;
use crate::entities::product::{Entity as Product, Model as ProductModel};
use crate::errors::ServiceError;
use crate::repositories::{BaseRepository, Repository};

/// An order together with its client and every line item with its product
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrderDetails {
    pub order: OrderModel,
    pub client: ClientModel,
    pub items: Vec<OrderItemDetails>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrderItemDetails {
    pub item: OrderItemModel,
    pub product: ProductModel,
}

/// Sum of `quantity * price` over `items`, rounded to cents
pub fn sum_line_totals<'a, I>(items: I) -> Decimal
where
    I: IntoIterator<Item = &'a OrderItemModel>,
{
    items
        .into_iter()
        .map(OrderItemModel::line_total)
        .sum::<Decimal>()
        .round_dp(2)
}

/// Repository for order operations
#[derive(Debug)]
pub struct OrderRepository<'c, C> {
    base: BaseRepository<'c, C>,
}

impl<'c, C: ConnectionTrait> OrderRepository<'c, C> {
    pub fn new(db: &'c C) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create an empty order; `status` falls back to "created"
    pub async fn create(
        &self,
        client_id: i32,
        status: Option<String>,
    ) -> Result<OrderModel, ServiceError> {
        let status = match status {
            Some(status) => Set(status),
            None => ActiveValue::NotSet,
        };

        Ok(OrderActiveModel {
            client_id: Set(client_id),
            status,
            ..Default::default()
        }
        .insert(self.base.get_db())
        .await?)
    }

    /// Find an order by ID
    pub async fn find_by_id(&self, id: i32) -> Result<Option<OrderModel>, ServiceError> {
        Ok(Order::find_by_id(id).one(self.base.get_db()).await?)
    }

    /// Loads the order with its client and items (each with its product)
    pub async fn find_with_details(&self, id: i32) -> Result<Option<OrderDetails>, ServiceError> {
        let db = self.base.get_db();

        let Some(order) = Order::find_by_id(id).one(db).await? else {
            return Ok(None);
        };

        let client = Client::find_by_id(order.client_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Client {} not found", order.client_id)))?;

        let rows = OrderItem::find()
            .filter(order_item::Column::OrderId.eq(id))
            .order_by_asc(order_item::Column::Id)
            .find_also_related(Product)
            .all(db)
            .await?;

        let items = rows
            .into_iter()
            .map(|(item, product)| match product {
                Some(product) => Ok(OrderItemDetails { item, product }),
                None => Err(ServiceError::ProductNotFound(item.product_id)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(OrderDetails {
            order,
            client,
            items,
        }))
    }

    /// Rewrites `total_amount` from the order's current items.
    ///
    /// An order without items gets an explicit zero.
    pub async fn recompute_total(&self, id: i32) -> Result<Decimal, ServiceError> {
        let db = self.base.get_db();

        let items = OrderItemRepository::new(db).find_by_order(id).await?;
        let total = sum_line_totals(&items);

        let result = Order::update_many()
            .col_expr(Column::TotalAmount, Expr::value(total))
            .filter(Column::Id.eq(id))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::OrderNotFound(id));
        }

        debug!(order_id = id, %total, items = items.len(), "order total recomputed");
        Ok(total)
    }
}
