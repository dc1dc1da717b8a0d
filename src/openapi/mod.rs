use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Order Management API",
        version = "1.0.0",
        description = r#"
# Order Management API

Stores categories, products, clients and orders, and adds products to orders.

Adding an item checks stock, merges repeated additions of the same product into
one line, reserves stock and recomputes the order total in a single transaction.

## Errors

Failures return a JSON body with a machine-readable `code`
(`order_not_found`, `product_not_found`, `insufficient_stock`,
`constraint_violation`, `validation_error`) and a human-readable `detail`.
"#
    ),
    paths(
        crate::handlers::health::root,
        crate::handlers::health::health_check,
        crate::handlers::orders::add_item_to_order,
        crate::handlers::orders::get_order,
    ),
    components(
        schemas(
            crate::handlers::orders::AddItemRequest,
            crate::handlers::orders::OrderResponse,
            crate::handlers::orders::OrderItemResponse,
            crate::handlers::orders::ClientResponse,
            crate::handlers::orders::ProductResponse,
            crate::handlers::health::HealthResponse,
            crate::handlers::health::ComponentHealth,
            crate::handlers::health::ComponentStatus,
            crate::handlers::health::RootResponse,
            crate::errors::ErrorResponse
        )
    ),
    tags(
        (name = "orders", description = "Order line-item operations"),
        (name = "health", description = "Liveness and readiness")
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Order Management API"));
        assert!(json.contains("/api/v1/orders/{order_id}/items"));
        assert!(json.contains("AddItemRequest"));
    }
}
