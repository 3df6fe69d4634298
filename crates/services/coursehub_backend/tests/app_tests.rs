use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use coursehub_backend::build_app;
use coursehub_config::{
    AppConfig, AuthConfig, DatabaseConfig, LoggingConfig, ServerConfig, StripeConfig,
};
use coursehub_db::{CourseRepository, DbClient, NewCourse, Repositories};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

// Helper function to create a mock AppConfig for testing
fn create_mock_config(use_stripe: bool, cors_allowed_origins: Vec<String>) -> Arc<AppConfig> {
    Arc::new(AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8086,
            cors_allowed_origins,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: None,
        },
        auth: AuthConfig {
            jwt_secret: "test-jwt-secret".to_string(),
            issuer: None,
            audience: None,
        },
        use_stripe,
        stripe: Some(StripeConfig {
            secret_key: "sk_test_123".to_string(),
            webhook_secret: "whsec_test".to_string(),
            api_base: "http://127.0.0.1:9".to_string(),
            api_version: None,
            currency: "usd".to_string(),
            success_url: None,
            cancel_url: None,
            webhook_tolerance_seconds: 300,
            allow_promotion_codes: true,
        }),
        logging: LoggingConfig::default(),
    })
}

async fn app(use_stripe: bool, origins: Vec<String>) -> (Router, DbClient) {
    let db = DbClient::in_memory().await.unwrap();
    (build_app(create_mock_config(use_stripe, origins), db.clone()), db)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_health_reports_database() {
    let (app, _db) = app(true, vec![]).await;
    let (status, body) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
    assert_eq!(body["stripe"], true);
}

#[tokio::test]
async fn test_catalog_is_served_under_api() {
    let (app, db) = app(false, vec![]).await;
    Repositories::new(&db)
        .courses
        .insert_course(NewCourse {
            title: "Timber Framing".to_string(),
            slug: "timber-framing".to_string(),
            description: None,
            price_cents: 4900,
            thumbnail_url: None,
            published: true,
        })
        .await
        .unwrap();

    let (status, body) = get(&app, "/api/courses").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["slug"], "timber-framing");

    let (status, _) = get(&app, "/courses").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stripe_routes_follow_runtime_flag() {
    let webhook = || {
        Request::builder()
            .method("POST")
            .uri("/api/stripe/webhook")
            .body(Body::from("{}"))
            .unwrap()
    };

    let (disabled, _db) = app(false, vec![]).await;
    let response = disabled.oneshot(webhook()).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Enabled: the route exists and rejects the unsigned delivery
    let (enabled, _db) = app(true, vec![]).await;
    let response = enabled.oneshot(webhook()).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cors_preflight() {
    let (app, _db) = app(false, vec!["https://shop.example.com".to_string()]).await;
    let preflight = |origin: &str| {
        Request::builder()
            .method("OPTIONS")
            .uri("/api/courses")
            .header("origin", origin)
            .header("access-control-request-method", "GET")
            .header("access-control-request-headers", "authorization,x-client-info")
            .body(Body::empty())
            .unwrap()
    };

    let response = app
        .clone()
        .oneshot(preflight("https://shop.example.com"))
        .await
        .unwrap();
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "https://shop.example.com"
    );
    let allowed = response
        .headers()
        .get("access-control-allow-headers")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(allowed.contains("x-client-info"));
    assert!(allowed.contains("authorization"));

    let response = app.oneshot(preflight("https://evil.example.com")).await.unwrap();
    assert!(response.headers().get("access-control-allow-origin").is_none());
}
