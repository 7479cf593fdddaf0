//! End-to-end storefront scenarios over HTTP.
//!
//! Each test starts a server on an ephemeral port with its own data
//! directory; see [`TestContext`].

#![allow(clippy::unwrap_used)]

use reqwest::{StatusCode, header::AUTHORIZATION};
use serde_json::{Value, json};

use makhana_integration_tests::{ADMIN_PASSWORD, TestContext, admin_basic_auth, bearer};

fn is_tracking_number(value: &str) -> bool {
    value.strip_prefix("TRK").is_some_and(|rest| {
        !rest.is_empty()
            && rest
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
    })
}

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new().await;
    let resp = ctx.get("/health").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_shopper_checkout_and_admin_shipping() {
    let ctx = TestContext::new().await;
    ctx.register("Alice", "alice@example.com", "secret123").await;

    // Log in again to get a fresh session
    let resp = ctx
        .post("/api/auth/login")
        .json(&json!({"email": "Alice@Example.com", "password": "secret123"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let login: Value = resp.json().await.unwrap();
    let token = login["sessionId"].as_str().unwrap().to_string();
    assert_eq!(login["user"]["email"], "alice@example.com");

    // Cart: the same product twice merges into one row
    for _ in 0..2 {
        let resp = ctx
            .post("/api/cart")
            .json(&json!({"sessionId": "alice-cart", "productId": 1}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }
    let cart: Value = ctx
        .get("/api/cart/alice-cart")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let rows = cart.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["quantity"], 2);

    let unit_price: u64 = rows[0]["product"]["price"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    let total = (unit_price * 2).to_string();

    // Checkout
    let resp = ctx
        .post("/api/orders")
        .header(AUTHORIZATION, bearer(&token))
        .json(&json!({
            "customerName": "Alice Smith",
            "customerEmail": "alice@example.com",
            "shippingAddress": "221B Baker St",
            "total": total,
            "items": cart.to_string(),
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = resp.json().await.unwrap();
    let tracking = order["trackingNumber"].as_str().unwrap().to_string();
    assert!(is_tracking_number(&tracking));
    assert_eq!(order["status"], "pending");
    assert_eq!(order["total"], total.as_str());
    assert_eq!(order["shippingAddress"], "221B Baker St");
    let order_id = order["id"].as_i64().unwrap();

    let resp = ctx
        .delete("/api/cart/alice-cart")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Public tracking shows the first name only
    let tracked: Value = ctx
        .get(&format!("/api/track/{tracking}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(tracked["status"], "pending");
    assert_eq!(tracked["customerName"], "Alice");

    // Admin ships it
    let admin = admin_basic_auth(ADMIN_PASSWORD);
    let resp = ctx
        .put(&format!("/api/orders/{order_id}/status"))
        .header(AUTHORIZATION, &admin)
        .json(&json!({"status": "shipped"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let shown: Value = ctx
        .get(&format!("/api/orders/{order_id}"))
        .header(AUTHORIZATION, &admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(shown["status"], "shipped");
    assert_eq!(shown["trackingNumber"], tracking.as_str());

    let tracked: Value = ctx
        .get(&format!("/api/track/{tracking}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(tracked["status"], "shipped");
}

#[tokio::test]
async fn test_checkout_requires_login() {
    let ctx = TestContext::new().await;
    let resp = ctx
        .post("/api/orders")
        .json(&json!({"shippingAddress": "221B Baker St"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Authentication required");
}

#[tokio::test]
async fn test_wrong_password_rejected() {
    let ctx = TestContext::new().await;
    ctx.register("Bob", "bob@example.com", "secret123").await;

    let resp = ctx
        .post("/api/auth/login")
        .json(&json!({"email": "bob@example.com", "password": "nope"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_reviews_and_stats() {
    let ctx = TestContext::new().await;
    let token = ctx.register("Carol", "carol@example.com", "secret123").await;
    let review = json!({
        "productId": 3,
        "rating": 4,
        "title": "Tasty",
        "comment": "Good crunch",
    });

    let resp = ctx
        .post("/api/reviews")
        .header(AUTHORIZATION, bearer(&token))
        .json(&review)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["userName"], "Carol");

    let resp = ctx
        .post("/api/reviews")
        .header(AUTHORIZATION, bearer(&token))
        .json(&review)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let stats: Value = ctx
        .get("/api/products/3/review-stats")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["totalReviews"], 1);
    assert_eq!(stats["ratingDistribution"]["4"], 1);

    let mine: Value = ctx
        .get("/api/users/reviews")
        .header(AUTHORIZATION, bearer(&token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(mine.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_category_in_use_delete_rejected() {
    let ctx = TestContext::new().await;
    let resp = ctx
        .delete("/api/categories/1")
        .header(AUTHORIZATION, admin_basic_auth(ADMIN_PASSWORD))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let categories: Value = ctx
        .get("/api/categories")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(categories.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_admin_lockout_after_repeated_failures() {
    let ctx = TestContext::new().await;
    let wrong = admin_basic_auth("not-the-password");

    for _ in 0..5 {
        let resp = ctx
            .post("/api/admin/auth")
            .header(AUTHORIZATION, &wrong)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    // Even the right password is refused while locked out
    let resp = ctx
        .post("/api/admin/auth")
        .header(AUTHORIZATION, admin_basic_auth(ADMIN_PASSWORD))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Too many login attempts. Please try again later.");
    assert!(body["retryAfter"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_admin_lockout_survives_spoofed_forwarded_for() {
    let ctx = TestContext::new().await;
    let wrong = admin_basic_auth("not-the-password");

    for i in 0..20 {
        let resp = ctx
            .post("/api/admin/auth")
            .header(AUTHORIZATION, &wrong)
            .header("x-forwarded-for", format!("203.0.113.{i}"))
            .header("cf-connecting-ip", format!("198.51.100.{i}"))
            .send()
            .await
            .unwrap();
        let expected = if i < 5 {
            StatusCode::UNAUTHORIZED
        } else {
            StatusCode::TOO_MANY_REQUESTS
        };
        assert_eq!(resp.status(), expected, "attempt {i}");
    }

    let resp = ctx
        .post("/api/admin/auth")
        .header(AUTHORIZATION, admin_basic_auth(ADMIN_PASSWORD))
        .header("x-forwarded-for", "203.0.113.250")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_changes_persist_to_data_dir() {
    let ctx = TestContext::new().await;
    let resp = ctx
        .post("/api/settings")
        .header(AUTHORIZATION, admin_basic_auth(ADMIN_PASSWORD))
        .json(&json!({"key": "hero_title", "value": "Crunch time"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let saved: Value = serde_json::from_slice(
        &std::fs::read(ctx.data_dir().join("database.json")).unwrap(),
    )
    .unwrap();
    let settings = saved["settings"].as_array().unwrap();
    assert!(
        settings
            .iter()
            .any(|s| s["key"] == "hero_title" && s["value"] == "Crunch time")
    );
}
