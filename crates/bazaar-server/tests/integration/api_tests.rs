use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use bazaar_core::user::Role;
use serde_json::json;

use crate::integration::common::setup_test_app;

#[tokio::test]
async fn health_returns_200() {
    let app = setup_test_app().await;

    let (status, json) = app.send(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "ok");
}

#[tokio::test]
async fn openapi_document_is_public() {
    let app = setup_test_app().await;

    let (status, json) = app
        .send(Method::GET, "/api-docs/openapi.json", None, None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["info"]["title"], "Bazaar API");
}

#[tokio::test]
async fn missing_token_returns_401_envelope() {
    let app = setup_test_app().await;

    let (status, json) = app.send(Method::GET, "/api/products", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "unauthorized");
}

#[tokio::test]
async fn garbage_token_returns_401() {
    let app = setup_test_app().await;

    let (status, _) = app
        .send(Method::GET, "/api/products", Some("not-a-jwt"), None)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_for_deactivated_user_returns_401() {
    let app = setup_test_app().await;
    let (user, token) = app.user_with_token("gone@example.com", Role::Admin).await;
    app.db
        .user_repo()
        .update(
            user.id,
            &bazaar_core::user::UserUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let (status, _) = app.send(Method::GET, "/api/auth/me", Some(&token), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_login_and_me() {
    let app = setup_test_app().await;

    let (status, json) = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Ada",
                "email": "Ada@Example.com",
                "password": "correct horse",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    assert_eq!(json["data"]["user"]["email"], "ada@example.com");
    assert_eq!(json["data"]["user"]["role"], "user");
    assert!(json["data"]["user"].get("password_hash").is_none());

    let (status, json) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": "correct horse" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["token_type"], "Bearer");
    assert_eq!(json["data"]["expires_in"], 3600);
    let token = json["data"]["token"].as_str().unwrap().to_string();

    let (status, json) = app.send(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["email"], "ada@example.com");
    assert!(!json["data"]["last_login_at"].is_null());
}

#[tokio::test]
async fn login_with_wrong_password_returns_401() {
    let app = setup_test_app().await;
    app.send(
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "name": "Ada", "email": "ada@example.com", "password": "correct horse" })),
    )
    .await;

    let (status, json) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": "wrong horse" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Invalid email or password");

    let (status, unknown) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": "wrong horse" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown, json);
}

#[tokio::test]
async fn register_rejects_short_password_and_duplicates() {
    let app = setup_test_app().await;
    let body = json!({ "name": "Ada", "email": "ada@example.com", "password": "short" });

    let (status, json) = app
        .send(Method::POST, "/api/auth/register", None, Some(body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "validation_error");

    let body = json!({ "name": "Ada", "email": "ada@example.com", "password": "long enough" });
    let (status, _) = app
        .send(Method::POST, "/api/auth/register", None, Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = app
        .send(Method::POST, "/api/auth/register", None, Some(body))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "conflict");
}

#[tokio::test]
async fn change_password_requires_current_password() {
    let app = setup_test_app().await;
    let (_, json) = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "name": "Ada", "email": "ada@example.com", "password": "first password" })),
        )
        .await;
    let token = json["data"]["token"].as_str().unwrap().to_string();

    let (status, _) = app
        .send(
            Method::PUT,
            "/api/auth/password",
            Some(&token),
            Some(json!({ "current_password": "not it", "new_password": "second password" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::PUT,
            "/api/auth/password",
            Some(&token),
            Some(json!({ "current_password": "first password", "new_password": "second password" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ada@example.com", "password": "second password" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn users_endpoints_are_admin_only() {
    let app = setup_test_app().await;
    let manager = app.token_for(Role::Manager).await;
    let admin = app.token_for(Role::Admin).await;

    let (status, json) = app.send(Method::GET, "/api/users", Some(&manager), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "forbidden");

    let (status, json) = app.send(Method::GET, "/api/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["pagination"]["total"], 2);
    assert_eq!(json["pagination"]["totalPages"], 1);
}

#[tokio::test]
async fn admin_manages_users_but_not_itself() {
    let app = setup_test_app().await;
    let (admin, token) = app.user_with_token("root@example.com", Role::Admin).await;

    let (status, json) = app
        .send(
            Method::POST,
            "/api/users",
            Some(&token),
            Some(json!({
                "name": "Maya",
                "email": "maya@example.com",
                "password": "manager password",
                "role": "manager",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    assert_eq!(json["data"]["role"], "manager");
    let id = json["data"]["id"].as_str().unwrap().to_string();

    let (status, json) = app
        .send(
            Method::PUT,
            &format!("/api/users/{id}"),
            Some(&token),
            Some(json!({ "is_active": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["is_active"], false);

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/users/{}", admin.id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/users/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = app
        .send(Method::GET, &format!("/api/users/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "not_found");
}

#[tokio::test]
async fn product_crud_and_role_guards() {
    let app = setup_test_app().await;
    let admin = app.token_for(Role::Admin).await;
    let user = app.token_for(Role::User).await;

    let (status, _) = app
        .send(
            Method::POST,
            "/api/products",
            Some(&user),
            Some(json!({ "name": "Lamp", "sku": "LAMP-1", "price": "19.99" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let product = app.create_product(&admin, "LAMP-1", "19.99", 5).await;
    assert_eq!(product["price"], "19.99");
    assert_eq!(product["status"], "active");
    let id = product["id"].as_str().unwrap().to_string();

    let (status, json) = app
        .send(Method::GET, &format!("/api/products/{id}"), Some(&user), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["sku"], "LAMP-1");

    let (status, json) = app
        .send(
            Method::PUT,
            &format!("/api/products/{id}"),
            Some(&admin),
            Some(json!({ "stock": 12 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["stock"], 12);
    assert_eq!(json["data"]["price"], "19.99");

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/products/{id}"), Some(&user), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = app
        .send(Method::DELETE, &format!("/api/products/{id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["id"], id.as_str());
}

#[tokio::test]
async fn product_validation_errors() {
    let app = setup_test_app().await;
    let admin = app.token_for(Role::Admin).await;

    let (status, json) = app
        .send(
            Method::POST,
            "/api/products",
            Some(&admin),
            Some(json!({ "name": "Lamp", "sku": "LAMP-1", "price": "-1" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);

    let (status, json) = app
        .send(
            Method::POST,
            "/api/products",
            Some(&admin),
            Some(json!({ "name": "Vault", "sku": "VAULT-1", "price": "99999999999" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "validation_error");
    assert_eq!(json["error"], "Price cannot exceed 9999999999.99");

    let (status, json) = app
        .send(
            Method::POST,
            "/api/products",
            Some(&admin),
            Some(json!({ "name": "Lamp", "sku": "LAMP-2", "price": "1.999" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "validation_error");

    let (status, json) = app
        .send(
            Method::POST,
            "/api/products",
            Some(&admin),
            Some(json!({
                "name": "Lamp",
                "sku": "LAMP-1",
                "price": "1.00",
                "vendor_id": "00000000-0000-0000-0000-000000000001",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().starts_with("Vendor not found"));

    let (status, json) = app
        .send(Method::GET, "/api/products/not-a-uuid", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "validation_error");

    let (status, json) = app
        .send(Method::GET, "/api/products?status=discontinued", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn malformed_json_uses_error_envelope() {
    let app = setup_test_app().await;
    let admin = app.token_for(Role::Admin).await;

    let request = Request::post("/api/products")
        .header("authorization", format!("Bearer {admin}"))
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, json) = app.send_raw(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "validation_error");
}

#[tokio::test]
async fn product_list_pagination() {
    let app = setup_test_app().await;
    let admin = app.token_for(Role::Admin).await;
    for i in 0..12 {
        app.create_product(&admin, &format!("SKU-{i:02}"), "3.00", i).await;
    }

    let (status, json) = app
        .send(Method::GET, "/api/products?page=2&limit=5", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), 5);
    assert_eq!(json["pagination"]["page"], 2);
    assert_eq!(json["pagination"]["limit"], 5);
    assert_eq!(json["pagination"]["total"], 12);
    assert_eq!(json["pagination"]["totalPages"], 3);

    let (_, json) = app
        .send(Method::GET, "/api/products?low_stock=2", Some(&admin), None)
        .await;
    assert_eq!(json["pagination"]["total"], 3);

    let (_, json) = app
        .send(Method::GET, "/api/products?limit=1000", Some(&admin), None)
        .await;
    assert_eq!(json["pagination"]["limit"], 100);

    let (status, json) = app
        .send(Method::GET, "/api/products?page=-1&limit=-3", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["pagination"]["page"], 1);
    assert_eq!(json["pagination"]["limit"], 1);
}

#[tokio::test]
async fn customers_and_vendors_are_staff_only() {
    let app = setup_test_app().await;
    let manager = app.token_for(Role::Manager).await;
    let user = app.token_for(Role::User).await;

    let (status, _) = app.send(Method::GET, "/api/customers", Some(&user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = app
        .send(
            Method::POST,
            "/api/customers",
            Some(&manager),
            Some(json!({
                "name": "Grace",
                "email": "grace@example.com",
                "address": { "street": "1 Main St", "city": "Springfield", "country": "US" },
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    assert_eq!(json["data"]["address"]["city"], "Springfield");
    let customer_id = json["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/customers/{customer_id}"),
            Some(&manager),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = app
        .send(
            Method::POST,
            "/api/vendors",
            Some(&manager),
            Some(json!({ "name": "Acme", "email": "sales@acme.test", "commission_rate": "150" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{json}");

    let (status, json) = app
        .send(
            Method::POST,
            "/api/vendors",
            Some(&manager),
            Some(json!({ "name": "Acme", "email": "sales@acme.test" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    assert_eq!(json["data"]["status"], "pending");
    assert_eq!(json["data"]["commission_rate"], "10.00");
}

#[tokio::test]
async fn dashboard_requires_staff() {
    let app = setup_test_app().await;
    let user = app.token_for(Role::User).await;
    let manager = app.token_for(Role::Manager).await;

    let (status, _) = app
        .send(Method::GET, "/api/analytics/dashboard", Some(&user), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = app
        .send(
            Method::GET,
            "/api/analytics/dashboard?months=3",
            Some(&manager),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["totals"]["users"], 2);
    assert_eq!(json["data"]["monthly_revenue"].as_array().unwrap().len(), 3);
    assert_eq!(json["data"]["orders_by_status"].as_array().unwrap().len(), 5);
}
