mod common;

use assert_matches::assert_matches;
use common::TestApp;
use order_management_api::entities::product;
use order_management_api::errors::ServiceError;
use order_management_api::services::orders::AddItemCommand;
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use tempfile::TempDir;

fn add(order_id: i32, product_id: i32, quantity: i32) -> AddItemCommand {
    AddItemCommand {
        order_id,
        product_id,
        quantity,
    }
}

#[tokio::test]
async fn repeated_additions_merge_into_one_line() {
    let app = TestApp::new().await;
    let order = app.seed_empty_order().await;
    let iphone = app.seed_product("iPhone 14", 15, dec!(799.99)).await;
    let service = app.order_service();

    let first = service
        .add_item_to_order(add(order.id, iphone.id, 2))
        .await
        .expect("first addition");
    assert_eq!(app.product_stock(iphone.id).await, 13);
    assert_eq!(first.items.len(), 1);
    assert_eq!(first.items[0].item.product_id, iphone.id);
    assert_eq!(first.items[0].item.quantity, 2);
    assert_eq!(first.items[0].item.price, dec!(799.99));
    assert_eq!(first.order.total_amount, dec!(1599.98));

    let second = service
        .add_item_to_order(add(order.id, iphone.id, 3))
        .await
        .expect("second addition");
    assert_eq!(app.product_stock(iphone.id).await, 10);
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].item.id, first.items[0].item.id);
    assert_eq!(second.items[0].item.quantity, 5);
    assert_eq!(second.items[0].item.price, dec!(799.99));
    assert_eq!(second.order.total_amount, dec!(3999.95));
    assert_eq!(app.line_count(order.id, iphone.id).await, 1);
}

#[tokio::test]
async fn missing_order_changes_nothing() {
    let app = TestApp::new().await;
    let order = app.seed_empty_order().await;
    let iphone = app.seed_product("iPhone 14", 15, dec!(799.99)).await;

    let result = app
        .order_service()
        .add_item_to_order(add(999, iphone.id, 1))
        .await;

    assert_matches!(result, Err(ServiceError::OrderNotFound(999)));
    assert_eq!(app.product_stock(iphone.id).await, 15);
    assert_eq!(app.order_total(order.id).await, Decimal::ZERO);
    assert!(app.order_items(order.id).await.is_empty());
}

#[rstest]
#[case::exact_stock(7, true)]
#[case::one_below_stock(6, true)]
#[case::one_above_stock(8, false)]
#[tokio::test]
async fn stock_boundary(#[case] requested: i32, #[case] succeeds: bool) {
    let app = TestApp::new().await;
    let order = app.seed_empty_order().await;
    let fridge = app.seed_product("Bosch Refrigerator", 7, dec!(799.99)).await;

    let result = app
        .order_service()
        .add_item_to_order(add(order.id, fridge.id, requested))
        .await;

    if succeeds {
        let details = result.expect("addition within stock succeeds");
        assert_eq!(app.product_stock(fridge.id).await, 7 - requested);
        assert_eq!(
            details.order.total_amount,
            Decimal::from(requested) * dec!(799.99)
        );
    } else {
        assert_matches!(
            result,
            Err(ServiceError::InsufficientStock { product_id, requested: r })
                if product_id == fridge.id && r == requested
        );
        assert_eq!(app.product_stock(fridge.id).await, 7);
        assert_eq!(app.order_total(order.id).await, Decimal::ZERO);
        assert_eq!(app.line_count(order.id, fridge.id).await, 0);
    }
}

#[tokio::test]
async fn failed_merge_leaves_existing_line_untouched() {
    let app = TestApp::new().await;
    let order = app.seed_empty_order().await;
    let macbook = app.seed_product("MacBook Pro 16", 8, dec!(2499.99)).await;
    let service = app.order_service();

    service
        .add_item_to_order(add(order.id, macbook.id, 5))
        .await
        .unwrap();
    let result = service.add_item_to_order(add(order.id, macbook.id, 4)).await;

    assert_matches!(result, Err(ServiceError::InsufficientStock { .. }));
    let items = app.order_items(order.id).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 5);
    assert_eq!(app.product_stock(macbook.id).await, 3);
    assert_eq!(app.order_total(order.id).await, dec!(12499.95));
}

#[tokio::test]
async fn unknown_product_is_reported_as_insufficient_stock() {
    let app = TestApp::new().await;
    let order = app.seed_empty_order().await;

    let result = app
        .order_service()
        .add_item_to_order(add(order.id, 4242, 1))
        .await;

    assert_matches!(
        result,
        Err(ServiceError::InsufficientStock {
            product_id: 4242,
            requested: 1
        })
    );
    assert!(app.order_items(order.id).await.is_empty());
}

#[tokio::test]
async fn line_keeps_price_captured_at_first_addition() {
    let app = TestApp::new().await;
    let order = app.seed_empty_order().await;
    let phone = app.seed_product("Samsung Galaxy S23", 20, dec!(699.99)).await;
    let service = app.order_service();

    service
        .add_item_to_order(add(order.id, phone.id, 1))
        .await
        .unwrap();

    product::Entity::update_many()
        .col_expr(product::Column::Price, Expr::value(dec!(749.99)))
        .filter(product::Column::Id.eq(phone.id))
        .exec(app.db())
        .await
        .unwrap();

    let details = service
        .add_item_to_order(add(order.id, phone.id, 2))
        .await
        .unwrap();

    assert_eq!(details.items[0].item.price, dec!(699.99));
    assert_eq!(details.items[0].product.price, dec!(749.99));
    assert_eq!(details.order.total_amount, dec!(2099.97));
}

#[tokio::test]
async fn total_sums_every_line_of_the_order() {
    let app = TestApp::new().await;
    let order = app.seed_empty_order().await;
    let book = app.seed_product("War and Peace", 35, dec!(19.99)).await;
    let jeans = app.seed_product("Levi's Jeans", 25, dec!(89.99)).await;
    let service = app.order_service();

    service
        .add_item_to_order(add(order.id, book.id, 3))
        .await
        .unwrap();
    let details = service
        .add_item_to_order(add(order.id, jeans.id, 2))
        .await
        .unwrap();

    assert_eq!(details.items.len(), 2);
    let expected: Decimal = details.items.iter().map(|d| d.item.line_total()).sum();
    assert_eq!(details.order.total_amount, expected);
    assert_eq!(details.order.total_amount, dec!(239.95));
}

#[tokio::test]
async fn same_product_in_different_orders_gets_separate_lines() {
    let app = TestApp::new().await;
    let first = app.seed_empty_order().await;
    let second = app.seed_order(first.client_id).await;
    let tv = app.seed_product("Samsung QLED 55", 10, dec!(899.99)).await;
    let service = app.order_service();

    service
        .add_item_to_order(add(first.id, tv.id, 1))
        .await
        .unwrap();
    service
        .add_item_to_order(add(second.id, tv.id, 2))
        .await
        .unwrap();

    assert_eq!(app.line_count(first.id, tv.id).await, 1);
    assert_eq!(app.line_count(second.id, tv.id).await, 1);
    assert_eq!(app.product_stock(tv.id).await, 7);
    assert_eq!(app.order_total(first.id).await, dec!(899.99));
    assert_eq!(app.order_total(second.id).await, dec!(1799.98));
}

#[tokio::test]
async fn queued_additions_stop_exactly_at_available_stock() {
    let app = TestApp::new().await;
    let order = app.seed_empty_order().await;
    let dress = app.seed_product("Summer Dress", 10, dec!(59.99)).await;
    let service = app.order_service();

    let mut tasks = Vec::new();
    for _ in 0..20 {
        let service = service.clone();
        let (order_id, product_id) = (order.id, dress.id);
        tasks.push(tokio::spawn(async move {
            service
                .add_item_to_order(add(order_id, product_id, 1))
                .await
                .is_ok()
        }));
    }

    let mut successes = 0;
    for task in tasks {
        if task.await.unwrap() {
            successes += 1;
        }
    }

    assert_eq!(successes, 10);
    assert_eq!(app.product_stock(dress.id).await, 0);
    let items = app.order_items(order.id).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 10);
    assert_eq!(app.order_total(order.id).await, dec!(599.90));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_additions_on_separate_connections_never_overdraw_stock() {
    let dir = TempDir::new().unwrap();
    let app = TestApp::file_backed(&dir.path().join("orders.db"), 8).await;
    let order = app.seed_empty_order().await;
    let dress = app.seed_product("Summer Dress", 10, dec!(59.99)).await;
    let service = app.order_service();

    let mut tasks = Vec::new();
    for _ in 0..20 {
        let service = service.clone();
        let (order_id, product_id) = (order.id, dress.id);
        tasks.push(tokio::spawn(async move {
            service.add_item_to_order(add(order_id, product_id, 1)).await
        }));
    }

    let mut successes = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => successes += 1,
            // lost lock races surface as store errors and roll back
            Err(ServiceError::InsufficientStock { .. })
            | Err(ServiceError::DatabaseError(_))
            | Err(ServiceError::ConstraintViolation(_)) => {}
            Err(other) => panic!("unexpected failure: {other:?}"),
        }
    }

    assert!(successes >= 1);
    assert!(successes <= 10);
    let stock = app.product_stock(dress.id).await;
    assert!(stock >= 0);
    assert_eq!(stock, 10 - successes);

    let items = app.order_items(order.id).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, successes);
    assert_eq!(
        app.order_total(order.id).await,
        Decimal::from(successes) * dec!(59.99)
    );
}
