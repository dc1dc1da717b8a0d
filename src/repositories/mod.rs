//! Typed read/write operations over the five store tables.
//!
//! Every repository borrows a [`ConnectionTrait`] implementor, so the same
//! calls run against the pool or inside a `DatabaseTransaction`.

use sea_orm::ConnectionTrait;

pub mod category_repository;
pub mod client_repository;
pub mod order_item_repository;
pub mod order_repository;
pub mod product_repository;

pub use category_repository::CategoryRepository;
pub use client_repository::ClientRepository;
pub use order_item_repository::OrderItemRepository;
pub use order_repository::{OrderDetails, OrderItemDetails, OrderRepository};
pub use product_repository::{NewProduct, ProductRepository};

/// Repository trait for common database operations
pub trait Repository {
    type Connection: ConnectionTrait;

    fn get_db(&self) -> &Self::Connection;
}

#[derive(Debug)]
pub struct BaseRepository<'c, C> {
    db: &'c C,
}

impl<'c, C: ConnectionTrait> BaseRepository<'c, C> {
    pub fn new(db: &'c C) -> Self {
        Self { db }
    }
}

impl<C: ConnectionTrait> Repository for BaseRepository<'_, C> {
    type Connection = C;

    fn get_db(&self) -> &C {
        self.db
    }
}
