//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use checkout::CheckoutPolicy;
use gateway::InMemoryPaymentGateway;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use store::InMemoryCatalogStore;
use tower::ServiceExt;
use uuid::Uuid;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            metrics_exporter_prometheus::PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> (Router, Arc<InMemoryCatalogStore>, Arc<InMemoryPaymentGateway>) {
    let (state, catalog, gateway) = api::create_in_memory_state(CheckoutPolicy::default());
    let app = api::create_app(state, get_metrics_handle());
    (app, catalog, gateway)
}

fn request(method: &str, uri: &str, user: Option<(&str, &str)>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((user_id, role)) = user {
        builder = builder
            .header("x-user-id", user_id)
            .header("x-user-email", "buyer@example.com")
            .header("x-user-role", role);
    }
    match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&value).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn admin_id() -> String {
    Uuid::new_v4().to_string()
}

async fn seed_product(app: &Router, body: Value) -> Value {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/products",
            Some((&admin_id(), "admin")),
            Some(body),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await
}

fn shirt_payload() -> Value {
    json!({
        "name": "Linen Shirt",
        "description": "A breezy summer shirt",
        "category": "apparel",
        "price": 29.99,
        "total_stock": 10,
        "colours": ["red", "blue"],
        "sizes": ["sm", "md"],
        "tags": ["summer"]
    })
}

#[tokio::test]
async fn health_check() {
    let (app, _, _) = setup();

    let response = app
        .oneshot(request("GET", "/health", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn metrics_endpoint_renders() {
    let (app, _, _) = setup();

    let response = app
        .oneshot(request("GET", "/metrics", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn cart_requires_identity() {
    let (app, _, _) = setup();

    let response = app
        .clone()
        .oneshot(request("GET", "/api/cart", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(request(
            "GET",
            "/api/cart",
            Some(("not-a-uuid", "customer")),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn product_mutation_requires_admin() {
    let (app, _, _) = setup();

    let response = app
        .oneshot(request(
            "POST",
            "/api/products",
            Some((&admin_id(), "customer")),
            Some(shirt_payload()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn create_and_fetch_product() {
    let (app, _, _) = setup();

    let created = seed_product(&app, shirt_payload()).await;
    assert_eq!(created["slug"], "linen-shirt");
    assert_eq!(created["price"], 29.99);
    assert_eq!(created["in_stock"], true);

    let response = app
        .clone()
        .oneshot(request("GET", "/api/products/linen-shirt", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["name"], "Linen Shirt");

    let response = app
        .oneshot(request("GET", "/api/products/no-such-slug", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_accepts_scalar_variant_lists() {
    let (app, _, _) = setup();

    let created = seed_product(
        &app,
        json!({
            "name": "Bucket Hat",
            "category": "apparel",
            "price": 14.50,
            "total_stock": 4,
            "colours": "green",
            "sizes": "[\"sm\", \"md\"]"
        }),
    )
    .await;

    assert_eq!(created["colours"], json!(["green"]));
    assert_eq!(created["sizes"], json!(["sm", "md"]));
}

#[tokio::test]
async fn create_rejects_unknown_colour() {
    let (app, _, _) = setup();

    let response = app
        .oneshot(request(
            "POST",
            "/api/products",
            Some((&admin_id(), "admin")),
            Some(json!({
                "name": "Odd Shirt",
                "category": "apparel",
                "price": 10.0,
                "colours": ["chartreuse"]
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_slug_is_rejected() {
    let (app, _, _) = setup();
    seed_product(&app, shirt_payload()).await;

    let response = app
        .oneshot(request(
            "POST",
            "/api/products",
            Some((&admin_id(), "admin")),
            Some(shirt_payload()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rename_cannot_take_another_products_slug() {
    let (app, _, _) = setup();
    seed_product(&app, shirt_payload()).await;
    let hat = seed_product(
        &app,
        json!({
            "name": "Bucket Hat",
            "category": "apparel",
            "price": 14.50,
            "total_stock": 4
        }),
    )
    .await;
    let hat_id = hat["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/products/{hat_id}"),
            Some((&admin_id(), "admin")),
            Some(json!({ "name": "Linen Shirt" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert!(json["error"].as_str().unwrap().contains("linen-shirt"));

    // Renaming to its own name keeps its own slug and succeeds.
    let response = app
        .oneshot(request(
            "PUT",
            &format!("/api/products/{hat_id}"),
            Some((&admin_id(), "admin")),
            Some(json!({ "name": "Bucket Hat" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["slug"], "bucket-hat");
}

#[tokio::test]
async fn listing_tolerates_enormous_page_numbers() {
    let (app, _, _) = setup();
    seed_product(&app, shirt_payload()).await;

    let response = app
        .oneshot(request(
            "GET",
            "/api/products?page=400000000&limit=12",
            None,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["products"], json!([]));
}

#[tokio::test]
async fn listing_filters_by_category() {
    let (app, _, _) = setup();
    seed_product(&app, shirt_payload()).await;
    seed_product(
        &app,
        json!({
            "name": "Mug",
            "category": "kitchen",
            "price": 8.0,
            "total_stock": 20
        }),
    )
    .await;

    let response = app
        .clone()
        .oneshot(request("GET", "/api/products?category=kitchen", None, None))
        .await
        .unwrap();
    let json = json_body(response).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["products"][0]["name"], "Mug");

    let response = app
        .oneshot(request("GET", "/api/products", None, None))
        .await
        .unwrap();
    let json = json_body(response).await;
    assert_eq!(json["total"], 2);
    assert_eq!(json["page"], 1);
}

#[tokio::test]
async fn update_and_delete_product() {
    let (app, _, _) = setup();
    let created = seed_product(&app, shirt_payload()).await;
    let id = created["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/products/{id}"),
            Some((&admin_id(), "admin")),
            Some(json!({ "total_stock": 0, "price": 19.99 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["in_stock"], false);
    assert_eq!(json["price"], 19.99);

    let response = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/api/products/{id}"),
            Some((&admin_id(), "admin")),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(request("GET", "/api/products/linen-shirt", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cart_add_view_and_clear() {
    let (app, _, _) = setup();
    let created = seed_product(&app, shirt_payload()).await;
    let product_id = created["id"].as_str().unwrap().to_string();
    let user = Uuid::new_v4().to_string();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/cart",
            Some((&user, "customer")),
            Some(json!({
                "product_id": product_id,
                "quantity": 2,
                "colour": "red",
                "size": "md"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["total_items"], 2);
    assert_eq!(json["total_amount"], 59.98);

    // A fresh user sees an empty cart, not an error.
    let other = Uuid::new_v4().to_string();
    let response = app
        .clone()
        .oneshot(request("GET", "/api/cart", Some((&other, "customer")), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["total_items"], 0);

    let response = app
        .clone()
        .oneshot(request("DELETE", "/api/cart", Some((&user, "customer")), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["total_items"], 0);

    // Clearing a never-created cart is a 404.
    let response = app
        .oneshot(request("DELETE", "/api/cart", Some((&other, "customer")), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cart_add_rejects_insufficient_stock() {
    let (app, _, _) = setup();
    let created = seed_product(&app, shirt_payload()).await;
    let product_id = created["id"].as_str().unwrap().to_string();
    let user = Uuid::new_v4().to_string();

    let response = app
        .oneshot(request(
            "POST",
            "/api/cart",
            Some((&user, "customer")),
            Some(json!({ "product_id": product_id, "quantity": 11 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert!(json["error"].as_str().unwrap().contains("10"));
}

#[tokio::test]
async fn checkout_of_empty_cart_is_rejected() {
    let (app, _, _) = setup();
    let user = Uuid::new_v4().to_string();

    let response = app
        .oneshot(request("POST", "/api/checkout", Some((&user, "customer")), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn full_checkout_flow_reconciles_stock() {
    let (app, _, gateway) = setup();
    let created = seed_product(&app, shirt_payload()).await;
    let product_id = created["id"].as_str().unwrap().to_string();
    let user = Uuid::new_v4().to_string();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/cart",
            Some((&user, "customer")),
            Some(json!({ "product_id": product_id, "quantity": 3 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            "/api/checkout/summary",
            Some((&user, "customer")),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let summary = json_body(response).await;
    assert_eq!(summary["total_items"], 3);
    assert_eq!(summary["total_amount"], 89.97);

    let response = app
        .clone()
        .oneshot(request("POST", "/api/checkout", Some((&user, "customer")), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let session = json_body(response).await;
    let session_id = session["session_id"].as_str().unwrap().to_string();
    assert!(session["url"].as_str().unwrap().contains(&session_id));
    assert_eq!(session["summary"]["total_items"], 3);

    // Unpaid confirmation reports the status without touching anything.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/checkout/confirm",
            Some((&user, "customer")),
            Some(json!({ "session_id": session_id })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "not_paid");

    gateway.mark_paid(&session_id);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/checkout/confirm",
            Some((&user, "customer")),
            Some(json!({ "session_id": session_id })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "paid");
    assert_eq!(json["amount_total"], 89.97);

    let response = app
        .clone()
        .oneshot(request("GET", "/api/products/linen-shirt", None, None))
        .await
        .unwrap();
    let json = json_body(response).await;
    assert_eq!(json["total_stock"], 7);
    assert_eq!(json["sold_count"], 3);

    let response = app
        .oneshot(request("GET", "/api/cart", Some((&user, "customer")), None))
        .await
        .unwrap();
    let json = json_body(response).await;
    assert_eq!(json["total_items"], 0);
}

#[tokio::test]
async fn malformed_input_gets_json_errors() {
    let (app, _, _) = setup();
    let user = Uuid::new_v4().to_string();

    // Body missing the required session_id field.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/checkout/confirm",
            Some((&user, "customer")),
            Some(json!({})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert!(json["error"].is_string());

    // Path segment that does not parse as a product id.
    let response = app
        .oneshot(request(
            "PUT",
            "/api/products/not-a-uuid",
            Some((&admin_id(), "admin")),
            Some(json!({ "price": 5.0 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn payment_status_passthrough() {
    let (app, _, _) = setup();
    let user = Uuid::new_v4().to_string();

    let response = app
        .oneshot(request(
            "GET",
            "/api/checkout/status/cs_999999",
            Some((&user, "customer")),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
