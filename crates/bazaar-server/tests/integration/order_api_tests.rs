use axum::http::{Method, StatusCode};
use bazaar_core::user::Role;
use serde_json::{Value, json};

use crate::integration::common::{TestApp, setup_test_app};

async fn place_order(app: &TestApp, token: &str, lines: Value) -> (StatusCode, Value) {
    app.send(
        Method::POST,
        "/api/orders",
        Some(token),
        Some(json!({ "items": lines })),
    )
    .await
}

async fn stock_of(app: &TestApp, token: &str, product_id: &str) -> i64 {
    let (_, json) = app
        .send(
            Method::GET,
            &format!("/api/products/{product_id}"),
            Some(token),
            None,
        )
        .await;
    json["data"]["stock"].as_i64().unwrap()
}

#[tokio::test]
async fn placing_order_prices_items_and_decrements_stock() {
    let app = setup_test_app().await;
    let admin = app.token_for(Role::Admin).await;
    let (buyer, token) = app.user_with_token("buyer@example.com", Role::User).await;
    let lamp = app.create_product(&admin, "LAMP-1", "19.99", 5).await;
    let lamp_id = lamp["id"].as_str().unwrap();

    let (status, json) = place_order(
        &app,
        &token,
        json!([{ "product_id": lamp_id, "quantity": 2 }]),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{json}");
    let order = &json["data"];
    assert_eq!(order["status"], "pending");
    assert_eq!(order["total_amount"], "39.98");
    assert_eq!(order["user_id"], buyer.id.to_string());
    assert_eq!(order["items"][0]["unit_price"], "19.99");
    assert_eq!(order["items"][0]["product_name"], "Product LAMP-1");
    assert!(order["order_number"].as_str().unwrap().starts_with("ORD-"));

    assert_eq!(stock_of(&app, &admin, lamp_id).await, 3);
}

#[tokio::test]
async fn order_total_too_large_is_400() {
    let app = setup_test_app().await;
    let admin = app.token_for(Role::Admin).await;
    let vault = app.create_product(&admin, "VAULT-1", "9000000000.00", 5).await;
    let vault_id = vault["id"].as_str().unwrap();

    let (status, json) = place_order(
        &app,
        &admin,
        json!([{ "product_id": vault_id, "quantity": 2 }]),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST, "{json}");
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "validation_error");
    assert_eq!(stock_of(&app, &admin, vault_id).await, 5);
}

#[tokio::test]
async fn insufficient_stock_returns_409_and_keeps_stock() {
    let app = setup_test_app().await;
    let admin = app.token_for(Role::Admin).await;
    let lamp = app.create_product(&admin, "LAMP-1", "10.00", 5).await;
    let mug = app.create_product(&admin, "MUG-1", "4.00", 1).await;
    let lamp_id = lamp["id"].as_str().unwrap();
    let mug_id = mug["id"].as_str().unwrap();

    let (status, json) = place_order(
        &app,
        &admin,
        json!([
            { "product_id": lamp_id, "quantity": 2 },
            { "product_id": mug_id, "quantity": 3 },
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "insufficient_stock");
    assert_eq!(stock_of(&app, &admin, lamp_id).await, 5);
    assert_eq!(stock_of(&app, &admin, mug_id).await, 1);

    let (_, json) = app.send(Method::GET, "/api/orders", Some(&admin), None).await;
    assert_eq!(json["pagination"]["total"], 0);
}

#[tokio::test]
async fn order_validation_errors() {
    let app = setup_test_app().await;
    let admin = app.token_for(Role::Admin).await;
    let lamp = app.create_product(&admin, "LAMP-1", "10.00", 5).await;
    let lamp_id = lamp["id"].as_str().unwrap();

    let (status, _) = place_order(&app, &admin, json!([])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = place_order(
        &app,
        &admin,
        json!([{ "product_id": lamp_id, "quantity": 0 }]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = place_order(
        &app,
        &admin,
        json!([{ "product_id": "00000000-0000-0000-0000-000000000001", "quantity": 1 }]),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "not_found");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/orders",
            Some(&admin),
            Some(json!({
                "customer_id": "00000000-0000-0000-0000-000000000002",
                "items": [{ "product_id": lamp_id, "quantity": 1 }],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(stock_of(&app, &admin, lamp_id).await, 5);
}

#[tokio::test]
async fn users_only_see_their_own_orders() {
    let app = setup_test_app().await;
    let admin = app.token_for(Role::Admin).await;
    let (_, alice) = app.user_with_token("alice@example.com", Role::User).await;
    let (_, bob) = app.user_with_token("bob@example.com", Role::User).await;
    let lamp = app.create_product(&admin, "LAMP-1", "10.00", 10).await;
    let lamp_id = lamp["id"].as_str().unwrap();

    let (_, json) = place_order(&app, &alice, json!([{ "product_id": lamp_id, "quantity": 1 }])).await;
    let alice_order = json["data"]["id"].as_str().unwrap().to_string();
    place_order(&app, &bob, json!([{ "product_id": lamp_id, "quantity": 1 }])).await;

    let (_, json) = app.send(Method::GET, "/api/orders", Some(&alice), None).await;
    assert_eq!(json["pagination"]["total"], 1);
    assert_eq!(json["data"][0]["id"], alice_order.as_str());

    let (status, _) = app
        .send(
            Method::GET,
            &format!("/api/orders/{alice_order}"),
            Some(&bob),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, json) = app.send(Method::GET, "/api/orders", Some(&admin), None).await;
    assert_eq!(json["pagination"]["total"], 2);
}

#[tokio::test]
async fn status_updates_follow_lifecycle() {
    let app = setup_test_app().await;
    let manager = app.token_for(Role::Manager).await;
    let user = app.token_for(Role::User).await;
    let lamp = app.create_product(&manager, "LAMP-1", "10.00", 5).await;
    let lamp_id = lamp["id"].as_str().unwrap();

    let (_, json) = place_order(&app, &user, json!([{ "product_id": lamp_id, "quantity": 4 }])).await;
    let order_id = json["data"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/orders/{order_id}");

    let (status, _) = app
        .send(Method::PUT, &uri, Some(&user), Some(json!({ "status": "processing" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = app
        .send(Method::PUT, &uri, Some(&manager), Some(json!({ "status": "delivered" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "conflict");

    let (status, json) = app
        .send(
            Method::PUT,
            &uri,
            Some(&manager),
            Some(json!({ "status": "processing", "notes": "packed" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["data"]["status"], "processing");
    assert_eq!(json["data"]["notes"], "packed");

    let (status, json) = app
        .send(Method::PUT, &uri, Some(&manager), Some(json!({ "status": "cancelled" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "cancelled");
    assert_eq!(stock_of(&app, &manager, lamp_id).await, 5);

    let (status, _) = app.send(Method::PUT, &uri, Some(&manager), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn only_admin_deletes_orders() {
    let app = setup_test_app().await;
    let admin = app.token_for(Role::Admin).await;
    let manager = app.token_for(Role::Manager).await;
    let lamp = app.create_product(&admin, "LAMP-1", "10.00", 5).await;
    let lamp_id = lamp["id"].as_str().unwrap();

    let (_, json) = place_order(&app, &admin, json!([{ "product_id": lamp_id, "quantity": 2 }])).await;
    let uri = format!("/api/orders/{}", json["data"]["id"].as_str().unwrap());

    let (status, _) = app.send(Method::DELETE, &uri, Some(&manager), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send(Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.send(Method::GET, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(stock_of(&app, &admin, lamp_id).await, 3);
}
