//! sea-orm entities for the order management schema.
//!
//! Relations are kept as foreign-key columns; graph traversal happens through
//! explicit repository queries rather than lazily loaded object graphs.

pub mod category;
pub mod client;
pub mod order;
pub mod order_item;
pub mod product;

pub use category::Entity as Category;
pub use client::Entity as Client;
pub use order::Entity as Order;
pub use order_item::Entity as OrderItem;
pub use product::Entity as Product;
