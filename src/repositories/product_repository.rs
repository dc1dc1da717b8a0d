use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use serde::Deserialize;
use tracing::debug;
use validator::{Validate, ValidationError};

use crate::entities::product::{
    ActiveModel as ProductActiveModel, Column, Entity as Product, Model as ProductModel,
};
use crate::errors::ServiceError;
use crate::repositories::{BaseRepository, Repository};

/// Input for creating a product
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(range(min = 0))]
    pub quantity: i32,
    #[validate(custom = "validate_positive_price")]
    pub price: Decimal,
    pub category_id: Option<i32>,
}

fn validate_positive_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_positive() && !price.is_zero() {
        Ok(())
    } else {
        Err(ValidationError::new("price_must_be_positive"))
    }
}

#[derive(Debug)]
pub struct ProductRepository<'c, C> {
    base: BaseRepository<'c, C>,
}

impl<'c, C: ConnectionTrait> ProductRepository<'c, C> {
    pub fn new(db: &'c C) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, input: NewProduct) -> Result<ProductModel, ServiceError> {
        input.validate()?;

        Ok(ProductActiveModel {
            name: Set(input.name),
            quantity: Set(input.quantity),
            price: Set(input.price),
            category_id: Set(input.category_id),
            ..Default::default()
        }
        .insert(self.base.get_db())
        .await?)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<ProductModel>, ServiceError> {
        Ok(Product::find_by_id(id).one(self.base.get_db()).await?)
    }

    /// True iff the product exists and holds at least `quantity` units.
    ///
    /// A missing product and a short product both answer `false`.
    pub async fn has_stock(&self, id: i32, quantity: i32) -> Result<bool, ServiceError> {
        let matching = Product::find()
            .filter(Column::Id.eq(id))
            .filter(Column::Quantity.gte(quantity))
            .count(self.base.get_db())
            .await?;
        Ok(matching > 0)
    }

    /// Applies a signed delta to the product's stock.
    ///
    /// A negative delta only applies while the stock covers it, so stock never
    /// drops below zero. Returns whether a row was changed.
    pub async fn adjust_quantity(&self, id: i32, delta: i32) -> Result<bool, ServiceError> {
        let mut update = Product::update_many()
            .col_expr(Column::Quantity, Expr::col(Column::Quantity).add(delta))
            .filter(Column::Id.eq(id));
        if delta < 0 {
            update = update.filter(Column::Quantity.gte(delta.saturating_neg()));
        }

        let result = update.exec(self.base.get_db()).await?;
        debug!(
            product_id = id,
            delta,
            rows = result.rows_affected,
            "product stock adjusted"
        );
        Ok(result.rows_affected == 1)
    }
}
