use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::order_item::{
    ActiveModel as OrderItemActiveModel, Column, Entity as OrderItem, Model as OrderItemModel,
};
use crate::errors::ServiceError;
use crate::repositories::{BaseRepository, Repository};

/// Repository for order line items
#[derive(Debug)]
pub struct OrderItemRepository<'c, C> {
    base: BaseRepository<'c, C>,
}

impl<'c, C: ConnectionTrait> OrderItemRepository<'c, C> {
    pub fn new(db: &'c C) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// The line for `product_id` in `order_id`, if any
    pub async fn find_for_product(
        &self,
        order_id: i32,
        product_id: i32,
    ) -> Result<Option<OrderItemModel>, ServiceError> {
        Ok(OrderItem::find()
            .filter(Column::OrderId.eq(order_id))
            .filter(Column::ProductId.eq(product_id))
            .one(self.base.get_db())
            .await?)
    }

    pub async fn find_by_order(&self, order_id: i32) -> Result<Vec<OrderItemModel>, ServiceError> {
        Ok(OrderItem::find()
            .filter(Column::OrderId.eq(order_id))
            .order_by_asc(Column::Id)
            .all(self.base.get_db())
            .await?)
    }

    /// Inserts a new line. A second line for the same (order, product) pair is
    /// rejected by the unique index and surfaces as `ConstraintViolation`.
    pub async fn create(
        &self,
        order_id: i32,
        product_id: i32,
        quantity: i32,
        price: Decimal,
    ) -> Result<OrderItemModel, ServiceError> {
        Ok(OrderItemActiveModel {
            order_id: Set(order_id),
            product_id: Set(product_id),
            quantity: Set(quantity),
            price: Set(price),
            ..Default::default()
        }
        .insert(self.base.get_db())
        .await?)
    }

    /// Adds `delta` to the line's quantity; the captured price stays as is
    pub async fn increment_quantity(
        &self,
        item: &OrderItemModel,
        delta: i32,
    ) -> Result<OrderItemModel, ServiceError> {
        OrderItem::update_many()
            .col_expr(Column::Quantity, Expr::col(Column::Quantity).add(delta))
            .filter(Column::Id.eq(item.id))
            .exec(self.base.get_db())
            .await?;

        OrderItem::find_by_id(item.id)
            .one(self.base.get_db())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order item {} not found", item.id)))
    }
}
