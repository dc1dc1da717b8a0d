use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    response::Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::entities::{client, product};
use crate::repositories::{OrderDetails, OrderItemDetails};
use crate::services::orders::AddItemCommand;
use crate::{errors::ServiceError, AppState};

/// Body of `POST /api/v1/orders/{order_id}/items`
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
#[schema(example = json!({"order_id": 1, "product_id": 6, "quantity": 2}))]
pub struct AddItemRequest {
    pub order_id: i32,
    pub product_id: i32,
    #[validate(range(min = 1, message = "quantity must be a positive integer"))]
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClientResponse {
    pub id: i32,
    pub name: String,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: i32,
    pub name: String,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 799.99)]
    pub price: Decimal,
    pub category_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    /// Unit price captured when the line was created
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 799.99)]
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub product: ProductResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: i32,
    pub client_id: i32,
    pub status: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 1599.98)]
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub client: ClientResponse,
    pub items: Vec<OrderItemResponse>,
}

impl From<client::Model> for ClientResponse {
    fn from(model: client::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            address: model.address,
            created_at: model.created_at,
        }
    }
}

impl From<product::Model> for ProductResponse {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            quantity: model.quantity,
            price: model.price,
            category_id: model.category_id,
            created_at: model.created_at,
        }
    }
}

impl From<OrderItemDetails> for OrderItemResponse {
    fn from(details: OrderItemDetails) -> Self {
        let OrderItemDetails { item, product } = details;
        Self {
            id: item.id,
            order_id: item.order_id,
            product_id: item.product_id,
            quantity: item.quantity,
            price: item.price,
            created_at: item.created_at,
            product: product.into(),
        }
    }
}

impl From<OrderDetails> for OrderResponse {
    fn from(details: OrderDetails) -> Self {
        let OrderDetails {
            order,
            client,
            items,
        } = details;
        Self {
            id: order.id,
            client_id: order.client_id,
            status: order.status,
            total_amount: order.total_amount,
            created_at: order.created_at,
            client: client.into(),
            items: items.into_iter().map(Into::into).collect(),
        }
    }
}

fn order_id_from_path(path: Result<Path<i32>, PathRejection>) -> Result<i32, ServiceError> {
    path.map(|Path(id)| id)
        .map_err(|rejection| ServiceError::ValidationError(rejection.body_text()))
}

/// Add a product to an order
#[utoipa::path(
    post,
    path = "/api/v1/orders/{order_id}/items",
    summary = "Add item to order",
    description = "Adds a product to the order. Repeated additions of the same product increase the existing line's quantity; stock is reserved and the order total recomputed in the same transaction.",
    params(("order_id" = i32, Path, description = "Order ID")),
    request_body = AddItemRequest,
    responses(
        (status = 200, description = "Item added; returns the updated order", body = OrderResponse,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid request or insufficient stock", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order or product not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Constraint violation", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn add_item_to_order(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<AddItemRequest>, JsonRejection>,
) -> Result<Json<OrderResponse>, ServiceError> {
    let order_id = order_id_from_path(path)?;
    let Json(payload) =
        payload.map_err(|rejection| ServiceError::ValidationError(rejection.body_text()))?;
    payload.validate()?;

    if payload.order_id != order_id {
        return Err(ServiceError::ValidationError(format!(
            "order_id in body ({}) does not match path ({})",
            payload.order_id, order_id
        )));
    }

    let details = state
        .services
        .order
        .add_item_to_order(AddItemCommand {
            order_id,
            product_id: payload.product_id,
            quantity: payload.quantity,
        })
        .await?;

    Ok(Json(details.into()))
}

/// Get an order with its client and items
#[utoipa::path(
    get,
    path = "/api/v1/orders/{order_id}",
    summary = "Get order",
    params(("order_id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order retrieved successfully", body = OrderResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<OrderResponse>, ServiceError> {
    let order_id = order_id_from_path(path)?;
    let details = state.services.order.get_order(order_id).await?;
    Ok(Json(details.into()))
}
