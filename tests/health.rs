use axum::{
    body::{Body, to_bytes},
    extract::State,
    http::{Request, StatusCode},
};
use ecommerce_backoffice::{
    app::build_router,
    config::{AppConfig, AppEnv},
    db::{Db, retry::RetryConfig},
    routes::health::health_check,
    state::AppState,
};
use sea_orm::{DatabaseBackend, MockDatabase};
use tower::ServiceExt;

fn state() -> AppState {
    let conn = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let config = AppConfig {
        database_url: "postgres://unused".into(),
        host: "127.0.0.1".into(),
        port: 0,
        env: AppEnv::Development,
        jwt_secret: "health-secret".into(),
        jwt_ttl_hours: 1,
        db_retry: RetryConfig::default(),
        db_health_interval_secs: 30,
    };
    AppState::new(Db::from_connection(conn), config)
}

#[tokio::test]
async fn health_check_returns_ok() {
    let (status, response) = health_check(State(state())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response.0.message, "Health check");
}

#[tokio::test]
async fn health_reports_degraded_database() {
    let state = state();
    state
        .db
        .mark_degraded(&sea_orm::DbErr::Custom("connection refused".into()));

    let response = build_router(state)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"]["status"], "degraded");
    assert_eq!(body["data"]["database"]["state"], "degraded");
    let last_error = body["data"]["database"]["lastError"].as_str().unwrap_or_default();
    assert!(last_error.contains("connection refused"));
}
