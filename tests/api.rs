use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::Utc;
use ecommerce_backoffice::{
    app::build_router,
    config::{AppConfig, AppEnv},
    db::{Db, retry::RetryConfig},
    entity::{categories, customers, employees, orders, products},
    middleware::auth::{Identity, Role},
    services::auth_service::{hash_password, issue_token},
    state::AppState,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, prelude::DateTimeWithTimeZone};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

fn config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".into(),
        host: "127.0.0.1".into(),
        port: 0,
        env: AppEnv::Development,
        jwt_secret: "router-test-secret".into(),
        jwt_ttl_hours: 1,
        db_retry: RetryConfig::default(),
        db_health_interval_secs: 30,
    }
}

fn app(conn: DatabaseConnection) -> Router {
    build_router(AppState::new(Db::from_connection(conn), config()))
}

fn app_in(conn: DatabaseConnection, env: AppEnv) -> Router {
    let config = AppConfig { env, ..config() };
    build_router(AppState::new(Db::from_connection(conn), config))
}

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

fn now() -> DateTimeWithTimeZone {
    Utc::now().into()
}

fn employee(password_hash: &str) -> employees::Model {
    employees::Model {
        id: Uuid::new_v4(),
        first_name: "Store".into(),
        last_name: "Clerk".into(),
        email: "clerk@shop.com".into(),
        phone_number: None,
        address: None,
        password_hash: password_hash.into(),
        created_at: now(),
        updated_at: now(),
    }
}

fn customer() -> customers::Model {
    customers::Model {
        id: Uuid::new_v4(),
        first_name: "Sample".into(),
        last_name: "Buyer".into(),
        email: "buyer@shop.com".into(),
        phone_number: None,
        address: None,
        password_hash: "unused".into(),
        created_at: now(),
        updated_at: now(),
    }
}

fn product(id: Uuid) -> products::Model {
    products::Model {
        id,
        name: "Canvas Tote".into(),
        description: None,
        price: 150_000,
        discount: 25.0,
        stock: 12,
        category_id: None,
        created_at: now(),
        updated_at: now(),
    }
}

fn field_names(body: &Value) -> Vec<String> {
    body["data"]["errors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e["field"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn token_for(id: Uuid, role: Role) -> String {
    let identity = Identity {
        id,
        email: "someone@shop.com".into(),
        role,
    };
    issue_token(&config(), &identity).unwrap().token
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    send_json(Request::post(uri), token, body)
}

fn send_json(
    builder: axum::http::request::Builder,
    token: Option<&str>,
    body: Value,
) -> Request<Body> {
    let mut builder = builder.header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn unknown_route_is_404() {
    let response = app(empty_db())
        .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["data"]["path"], "/nope");
}

#[tokio::test]
async fn protected_route_without_token_is_401() {
    let response = app(empty_db())
        .oneshot(post_json("/orders", None, json!({ "emailOrder": "a@b.com" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn customer_token_on_employee_route_is_401() {
    let token = token_for(Uuid::new_v4(), Role::Customer);
    let response = app(empty_db())
        .oneshot(
            Request::get("/orders")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_for_deleted_account_is_401() {
    let token = token_for(Uuid::new_v4(), Role::Employee);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<employees::Model>::new()])
        .into_connection();

    let response = app(db)
        .oneshot(
            Request::get("/orders")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_order_is_rejected_before_the_store() {
    let clerk = employee("unused");
    let token = token_for(clerk.id, Role::Employee);
    // only the session lookup is answered; an insert would fail with 500
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![clerk]])
        .into_connection();

    let response = app(db)
        .oneshot(post_json(
            "/orders",
            Some(&token),
            json!({
                "emailOrder": "not-an-email",
                "paymentType": "BITCOIN",
                "createdDate": "2024-01-10T00:00:00Z",
                "shippedDate": "2024-01-05T00:00:00Z",
                "orderDetails": [
                    { "productId": Uuid::new_v4(), "quantity": 1 },
                    { "productId": Uuid::new_v4(), "quantity": 1, "discount": 80 }
                ]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    let errors = body["data"]["errors"].as_array().cloned().unwrap_or_default();
    let fields: Vec<&str> = errors.iter().filter_map(|e| e["field"].as_str()).collect();

    assert!(fields.contains(&"shippedDate"));
    assert!(fields.contains(&"emailOrder"));
    assert!(fields.contains(&"paymentType"));
    assert!(fields.contains(&"orderDetails.1.discount"));
    assert!(!fields.contains(&"orderDetails.0.discount"));

    let payment = errors.iter().find(|e| e["field"] == "paymentType").unwrap();
    assert_eq!(payment["message"], "Payment type: BITCOIN is invalid!");
}

#[tokio::test]
async fn order_read_resolves_missing_customer_to_null() {
    let clerk = employee("unused");
    let token = token_for(clerk.id, Role::Employee);
    let order = orders::Model {
        id: Uuid::new_v4(),
        description: Some("phone order".into()),
        created_date: now(),
        shipped_date: None,
        email_order: String::new(),
        phone_number_order: None,
        payment_type: "CASH".into(),
        status: "WAITING".into(),
        shipping_address_id: None,
        customer_id: Some(Uuid::new_v4()),
        employee_id: None,
        order_details: orders::OrderDetails::default(),
        created_at: now(),
        updated_at: now(),
    };
    let order_id = order.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![clerk]])
        .append_query_results([vec![order]])
        .append_query_results([Vec::<customers::Model>::new()])
        .into_connection();

    let response = app(db)
        .oneshot(
            Request::get(format!("/orders/{order_id}"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["id"], order_id.to_string());
    assert!(body["data"]["customerId"].is_string());
    assert!(body["data"]["customer"].is_null());
    assert!(body["data"]["shippingAddress"].is_null());
}

#[tokio::test]
async fn employee_login_issues_a_token() {
    let clerk = employee(&hash_password("clerk-pass").unwrap());
    let clerk_id = clerk.id;
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![clerk]])
        .into_connection();

    let response = app(db)
        .oneshot(post_json(
            "/employees/login",
            None,
            json!({ "email": "clerk@shop.com", "password": "clerk-pass" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["role"], "employee");
    assert_eq!(body["data"]["accountId"], clerk_id.to_string());
    assert!(body["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn login_with_wrong_password_is_401() {
    let clerk = employee(&hash_password("clerk-pass").unwrap());
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![clerk]])
        .into_connection();

    let response = app(db)
        .oneshot(post_json(
            "/employees/login",
            None,
            json!({ "email": "clerk@shop.com", "password": "guess" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn catalog_reads_are_public() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<categories::Model>::new()])
        .into_connection();

    let response = app(db)
        .oneshot(
            Request::get(format!("/categories/{}", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn huge_page_number_reads_past_the_end() {
    // count, then the page itself
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<categories::Model>::new()])
        .append_query_results([Vec::<categories::Model>::new()])
        .into_connection();

    let response = app(db)
        .oneshot(
            Request::get("/categories?page=9223372036854775807&per_page=100")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["meta"]["page"], i64::MAX);
}

#[tokio::test]
async fn login_accepts_mixed_case_email() {
    let clerk = employee(&hash_password("clerk-pass").unwrap());
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![clerk]])
        .into_connection();

    let response = app(db)
        .oneshot(post_json(
            "/employees/login",
            None,
            json!({ "email": " Clerk@Shop.COM ", "password": "clerk-pass" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn checkout_without_lines_is_400() {
    let buyer = customer();
    let token = token_for(buyer.id, Role::Customer);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![buyer]])
        .into_connection();

    let response = app(db)
        .oneshot(post_json(
            "/orders/checkout",
            Some(&token),
            json!({ "orderDetails": [] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn checkout_names_the_line_with_an_unknown_product() {
    let buyer = customer();
    let token = token_for(buyer.id, Role::Customer);
    let ghost = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![buyer]])
        .append_query_results([Vec::<products::Model>::new()])
        .into_connection();

    let response = app(db)
        .oneshot(post_json(
            "/orders/checkout",
            Some(&token),
            json!({ "orderDetails": [{ "productId": ghost, "quantity": 1 }] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    let errors = body["data"]["errors"].as_array().cloned().unwrap_or_default();
    let unknown = errors
        .iter()
        .find(|e| e["field"] == "orderDetails.0.productId")
        .expect("productId error");
    assert_eq!(unknown["value"], ghost.to_string());
    assert_eq!(unknown["message"], format!("Product {ghost} does not exist"));
}

#[tokio::test]
async fn checkout_rejects_negative_quantity_before_the_insert() {
    let buyer = customer();
    let token = token_for(buyer.id, Role::Customer);
    let tote = Uuid::new_v4();
    // no insert result queued: reaching the store would turn into a 500
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![buyer]])
        .append_query_results([vec![product(tote)]])
        .into_connection();

    let response = app(db)
        .oneshot(post_json(
            "/orders/checkout",
            Some(&token),
            json!({ "orderDetails": [{ "productId": tote, "quantity": -1 }] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(field_names(&body), vec!["orderDetails.0.quantity".to_string()]);
}

#[tokio::test]
async fn shipping_before_creation_is_rejected() {
    let clerk = employee("unused");
    let token = token_for(clerk.id, Role::Employee);
    let created: DateTimeWithTimeZone = "2024-01-10T00:00:00Z".parse().unwrap();
    let order = orders::Model {
        id: Uuid::new_v4(),
        description: None,
        created_date: created,
        shipped_date: None,
        email_order: "buyer@shop.com".into(),
        phone_number_order: None,
        payment_type: "CASH".into(),
        status: "WAITING".into(),
        shipping_address_id: None,
        customer_id: None,
        employee_id: Some(clerk.id),
        order_details: orders::OrderDetails::default(),
        created_at: created,
        updated_at: created,
    };
    let order_id = order.id;
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![clerk]])
        .append_query_results([vec![order]])
        .into_connection();

    let response = app(db)
        .oneshot(send_json(
            Request::patch(format!("/orders/{order_id}/ship")),
            Some(&token),
            json!({ "shippedDate": "2024-01-05T00:00:00Z" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    let errors = body["data"]["errors"].as_array().cloned().unwrap_or_default();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["field"], "shippedDate");
    assert_eq!(
        errors[0]["message"],
        "Shipped date: 2024-01-05T00:00:00+00:00 is invalid!"
    );
}

#[tokio::test]
async fn server_error_detail_depends_on_environment() {
    let uri = format!("/categories/{}", Uuid::new_v4());

    // no query results queued: the lookup fails inside the store
    let response = app_in(empty_db(), AppEnv::Production)
        .oneshot(Request::get(&uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["data"]["error"], "Internal Server Error");

    let response = app_in(empty_db(), AppEnv::Development)
        .oneshot(Request::get(&uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Internal Server Error");
    assert!(
        body["data"]["error"]
            .as_str()
            .is_some_and(|detail| detail.starts_with("ORM error"))
    );
}
