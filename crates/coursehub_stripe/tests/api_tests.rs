mod fixtures;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use coursehub_db::{PurchaseRepository, Repositories};
use coursehub_stripe::routes;
use fixtures::{bearer, create_mock_stripe_config, create_test_course, create_test_db, create_verifier, sign};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app(api_base: &str, repos: Repositories) -> Router {
    routes(
        Arc::new(create_mock_stripe_config(api_base)),
        repos,
        create_verifier(),
    )
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn webhook_request(payload: &str, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/stripe/webhook")
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header("Stripe-Signature", signature);
    }
    builder.body(Body::from(payload.to_string())).unwrap()
}

#[tokio::test]
async fn test_webhook_records_purchase_idempotently() {
    let (_db, repos) = create_test_db().await;
    let course = create_test_course(&repos, "timber-framing").await;
    let app = app("http://127.0.0.1:9", repos.clone());

    let payload = json!({
        "id": "evt_1",
        "type": "checkout.session.completed",
        "data": { "object": {
            "id": "cs_test_1",
            "amount_total": 4900,
            "payment_intent": "pi_1",
            "payment_status": "paid",
            "metadata": { "course_id": course.id.to_string(), "user_id": "user-1" }
        }}
    })
    .to_string();

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(webhook_request(&payload, Some(sign(payload.as_bytes()))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "received": true }));
    }

    let purchases = repos.purchases.list_for_user("user-1").await.unwrap();
    assert_eq!(purchases.len(), 1);
}

#[tokio::test]
async fn test_webhook_rejects_bad_signature() {
    let (_db, repos) = create_test_db().await;
    let app = app("http://127.0.0.1:9", repos);
    let payload = r#"{"id":"evt_1","type":"checkout.session.completed","data":{"object":{}}}"#;

    let response = app
        .clone()
        .oneshot(webhook_request(payload, Some("t=1,v1=deadbeef".to_string())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.starts_with("Webhook Error:"), "{message}");

    let response = app.oneshot(webhook_request(payload, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_checkout_requires_token() {
    let (_db, repos) = create_test_db().await;
    let course = create_test_course(&repos, "timber-framing").await;
    let app = app("http://127.0.0.1:9", repos);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/stripe/create-checkout")
                .header("content-type", "application/json")
                .body(Body::from(json!({ "courseId": course.id }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_checkout_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "prod_1" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/prices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "price_1" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/checkout/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cs_test_1",
            "url": "https://checkout.stripe.com/c/pay/cs_test_1"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let (_db, repos) = create_test_db().await;
    let course = create_test_course(&repos, "timber-framing").await;
    let app = app(&server.uri(), repos);

    // The second checkout reuses the stored price
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/stripe/create-checkout")
                    .header("content-type", "application/json")
                    .header("authorization", bearer("user-1"))
                    .body(Body::from(
                        json!({ "courseId": course.id, "userId": "user-1" }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({
                "sessionId": "cs_test_1",
                "url": "https://checkout.stripe.com/c/pay/cs_test_1"
            })
        );
    }
}

#[tokio::test]
async fn test_create_checkout_unknown_course() {
    let (_db, repos) = create_test_db().await;
    let app = app("http://127.0.0.1:9", repos);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/stripe/create-checkout")
                .header("content-type", "application/json")
                .header("authorization", bearer("user-1"))
                .body(Body::from(
                    json!({ "courseId": uuid::Uuid::new_v4() }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
