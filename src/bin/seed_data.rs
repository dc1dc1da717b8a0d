//! Seed data script - populates the database with demo data
//!
//! Run with: cargo run --bin seed-data -- --migrate
//!
//! This creates:
//! - 5 root categories and 10 child categories
//! - 5 clients with addresses
//! - 11 products spread over the child categories
//! - 3 empty orders (two "created", one "processing")

use clap::Parser;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::ConnectionTrait;
use std::sync::Arc;
use tracing::info;

use order_management_api::{
    db::{self, DatabaseAccess, DbConfig},
    errors::ServiceError,
    repositories::{
        CategoryRepository, ClientRepository, NewProduct, OrderRepository, ProductRepository,
    },
};

#[derive(Debug, Parser)]
#[command(name = "seed-data", about = "Populate the order database with demo data")]
struct Args {
    /// Database connection URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://orders.db?mode=rwc")]
    database_url: String,

    /// Create missing tables before seeding
    #[arg(long)]
    migrate: bool,
}

/// Root categories and the children created under each of them
const CATEGORY_TREE: &[(&str, &[&str])] = &[
    ("Electronics", &["Smartphones", "Laptops", "Televisions"]),
    (
        "Home Appliances",
        &["Refrigerators", "Washing Machines", "Microwaves"],
    ),
    ("Clothing", &["Menswear", "Womenswear"]),
    ("Books", &["Fiction", "Science"]),
    ("Sports", &[]),
];

const CLIENTS: &[(&str, &str)] = &[
    ("Ivan Petrov", "10 Lenina St, apt. 5"),
    ("Maria Sidorova", "25 Mira Ave, apt. 12"),
    ("Alexey Kozlov", "3 Sadovaya St, apt. 7"),
    ("Ekaterina Vasnetsova", "15 Tsentralnaya St, apt. 9"),
    ("Dmitry Orlov", "40 Pobedy Ave, apt. 3"),
];

/// (child category name, product name, stock, price)
fn products() -> Vec<(&'static str, &'static str, i32, Decimal)> {
    vec![
        ("Smartphones", "iPhone 14", 15, dec!(799.99)),
        ("Smartphones", "Samsung Galaxy S23", 20, dec!(699.99)),
        ("Laptops", "MacBook Pro 16", 8, dec!(2499.99)),
        ("Laptops", "Dell XPS 15", 12, dec!(1899.99)),
        ("Televisions", "Samsung QLED 55", 10, dec!(899.99)),
        ("Refrigerators", "Bosch Refrigerator", 7, dec!(799.99)),
        ("Washing Machines", "LG Washing Machine", 11, dec!(499.99)),
        ("Menswear", "Levi's Jeans", 25, dec!(89.99)),
        ("Womenswear", "Summer Dress", 22, dec!(59.99)),
        ("Fiction", "War and Peace", 35, dec!(19.99)),
        ("Science", "Python for Beginners", 20, dec!(39.99)),
    ]
}

/// (client index, status)
const ORDERS: &[(usize, &str)] = &[(0, "created"), (1, "created"), (2, "processing")];

#[derive(Debug, Default, PartialEq, Eq)]
struct SeedSummary {
    categories: usize,
    clients: usize,
    products: usize,
    orders: usize,
}

async fn seed<C: ConnectionTrait>(db: &C) -> Result<SeedSummary, ServiceError> {
    let categories = CategoryRepository::new(db);
    let clients = ClientRepository::new(db);
    let product_repo = ProductRepository::new(db);
    let orders = OrderRepository::new(db);

    let mut summary = SeedSummary::default();
    let mut child_ids = Vec::new();

    let mut roots = Vec::with_capacity(CATEGORY_TREE.len());
    for (root_name, _) in CATEGORY_TREE {
        roots.push(categories.create(*root_name, None).await?);
        summary.categories += 1;
    }
    for (root, (_, children)) in roots.iter().zip(CATEGORY_TREE) {
        for child_name in children.iter() {
            let child = categories.create(*child_name, Some(root.id)).await?;
            child_ids.push((*child_name, child.id));
            summary.categories += 1;
        }
    }

    let mut client_ids = Vec::with_capacity(CLIENTS.len());
    for (name, address) in CLIENTS {
        let client = clients.create(*name, Some(address.to_string())).await?;
        client_ids.push(client.id);
        summary.clients += 1;
    }

    for (category, name, quantity, price) in products() {
        let category_id = child_ids
            .iter()
            .find(|(child_name, _)| *child_name == category)
            .map(|(_, id)| *id);
        product_repo
            .create(NewProduct {
                name: name.to_string(),
                quantity,
                price,
                category_id,
            })
            .await?;
        summary.products += 1;
    }

    for (client_index, status) in ORDERS {
        let client_id = client_ids
            .get(*client_index)
            .copied()
            .ok_or_else(|| ServiceError::InternalError("seed client missing".to_string()))?;
        orders.create(client_id, Some(status.to_string())).await?;
        summary.orders += 1;
    }

    Ok(summary)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();

    info!("=== Order Management Seed Data ===");

    let config = DbConfig {
        url: args.database_url.clone(),
        max_connections: 5,
        ..Default::default()
    };
    let pool = db::establish_connection_with_config(&config).await?;
    if args.migrate {
        db::run_migrations(&pool).await?;
    }

    let access = DatabaseAccess::new(Arc::new(pool));
    let summary = access
        .transaction::<_, _, ServiceError>(|txn| Box::pin(async move { seed(txn).await }))
        .await?;

    info!(
        "Created {} categories, {} clients, {} products, {} orders",
        summary.categories, summary.clients, summary.products, summary.orders
    );
    info!("Try: curl -X POST http://localhost:8080/api/v1/orders/1/items -H 'content-type: application/json' -d '{{\"order_id\":1,\"product_id\":1,\"quantity\":2}}'");
    info!("Or explore interactively at: http://localhost:8080/swagger-ui");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeds_full_demo_catalog() {
        let pool = db::establish_connection_with_config(&DbConfig::in_memory_sqlite())
            .await
            .unwrap();
        db::run_migrations(&pool).await.unwrap();

        let summary = seed(&pool).await.unwrap();
        assert_eq!(
            summary,
            SeedSummary {
                categories: 15,
                clients: 5,
                products: 11,
                orders: 3,
            }
        );

        let iphone = ProductRepository::new(&pool)
            .find_by_id(1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(iphone.name, "iPhone 14");
        assert_eq!(iphone.quantity, 15);
        assert_eq!(iphone.price, dec!(799.99));

        let electronics_children = CategoryRepository::new(&pool).find_children(1).await.unwrap();
        assert_eq!(electronics_children.len(), 3);
    }
}
