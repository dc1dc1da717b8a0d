mod common;

use assert_matches::assert_matches;
use common::TestApp;
use order_management_api::entities::{order, order_item, product};
use order_management_api::errors::ServiceError;
use order_management_api::repositories::{
    CategoryRepository, NewProduct, OrderItemRepository, ProductRepository,
};
use order_management_api::services::orders::AddItemCommand;
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;

#[tokio::test]
async fn category_children_are_listed_and_cascade_on_delete() {
    let app = TestApp::new().await;
    let categories = CategoryRepository::new(app.db());

    let electronics = categories.create("Electronics", None).await.unwrap();
    let phones = categories
        .create("Smartphones", Some(electronics.id))
        .await
        .unwrap();
    let laptops = categories
        .create("Laptops", Some(electronics.id))
        .await
        .unwrap();
    let flagships = categories.create("Flagships", Some(phones.id)).await.unwrap();

    let children = categories.find_children(electronics.id).await.unwrap();
    let names: Vec<_> = children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Smartphones", "Laptops"]);

    assert!(categories.delete(electronics.id).await.unwrap());
    for id in [electronics.id, phones.id, laptops.id, flagships.id] {
        assert!(categories.find_by_id(id).await.unwrap().is_none());
    }
}

#[tokio::test]
async fn deleting_a_category_keeps_its_products() {
    let app = TestApp::new().await;
    let categories = CategoryRepository::new(app.db());
    let tvs = categories.create("Televisions", None).await.unwrap();

    let tv = ProductRepository::new(app.db())
        .create(NewProduct {
            name: "Samsung QLED 55".to_string(),
            quantity: 10,
            price: dec!(899.99),
            category_id: Some(tvs.id),
        })
        .await
        .unwrap();

    categories.delete(tvs.id).await.unwrap();

    let reloaded = product::Entity::find_by_id(tv.id)
        .one(app.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.category_id, None);
}

#[tokio::test]
async fn category_with_unknown_parent_is_a_constraint_violation() {
    let app = TestApp::new().await;

    let result = CategoryRepository::new(app.db())
        .create("Orphan", Some(9_999))
        .await;

    assert_matches!(result, Err(ServiceError::ConstraintViolation(_)));
}

#[tokio::test]
async fn invalid_product_is_rejected() {
    let app = TestApp::new().await;

    let result = ProductRepository::new(app.db())
        .create(NewProduct {
            name: "Free Lunch".to_string(),
            quantity: 1,
            price: dec!(0),
            category_id: None,
        })
        .await;

    assert_matches!(result, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn duplicate_line_for_same_product_is_a_constraint_violation() {
    let app = TestApp::new().await;
    let order = app.seed_empty_order().await;
    let laptop = app.seed_product("Dell XPS 15", 12, dec!(1899.99)).await;
    let items = OrderItemRepository::new(app.db());

    items
        .create(order.id, laptop.id, 1, laptop.price)
        .await
        .unwrap();
    let duplicate = items.create(order.id, laptop.id, 1, laptop.price).await;

    assert_matches!(duplicate, Err(ServiceError::ConstraintViolation(_)));
    assert_eq!(app.line_count(order.id, laptop.id).await, 1);
}

#[tokio::test]
async fn deleting_an_order_removes_its_lines() {
    let app = TestApp::new().await;
    let order = app.seed_empty_order().await;
    let washer = app.seed_product("LG Washing Machine", 11, dec!(499.99)).await;

    app.order_service()
        .add_item_to_order(AddItemCommand {
            order_id: order.id,
            product_id: washer.id,
            quantity: 2,
        })
        .await
        .unwrap();

    order::Entity::delete_by_id(order.id)
        .exec(app.db())
        .await
        .unwrap();

    let remaining = order_item::Entity::find().all(app.db()).await.unwrap();
    assert!(remaining.is_empty());
    // stock reserved for a deleted order is not returned
    assert_eq!(app.product_stock(washer.id).await, 9);
}

#[tokio::test]
async fn deleting_a_client_removes_their_orders() {
    let app = TestApp::new().await;
    let order = app.seed_empty_order().await;

    order_management_api::entities::client::Entity::delete_by_id(order.client_id)
        .exec(app.db())
        .await
        .unwrap();

    assert!(order::Entity::find_by_id(order.id)
        .one(app.db())
        .await
        .unwrap()
        .is_none());
}
