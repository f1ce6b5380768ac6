use cart_client::{
    domain::{
        cart::{CartError, CartMode, LineItemId},
        checkout::{CheckoutError, OrderOutcome, PaymentMethod},
    },
    infra::LocalStorage,
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method, path},
};

use crate::test_utils::{
    STORAGE_KEY, TOKEN, build_store, engine, guest_storage, manual_order, server_row,
};

#[tokio::test]
async fn unavailable_server_serves_the_guest_cart() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/cart/add"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let storage = guest_storage(json!([
        { "product_id": 1, "quantity": 2, "price": 100000, "shop_id": 1 }
    ]));
    let mut store = build_store(&server, storage.clone(), Some(TOKEN));

    let outcome = store.load().await;

    assert_eq!(outcome.mode, CartMode::Degraded);
    assert!(outcome.reconciliation.is_none());
    assert_eq!(store.items().len(), 1);
    assert!(storage.get_item(STORAGE_KEY).expect("get should succeed").is_some());
}

#[tokio::test]
async fn degraded_mutations_are_written_to_local_storage() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let storage = guest_storage(json!([
        { "product_id": 1, "quantity": 2, "price": 100000 },
        { "product_id": 2, "quantity": 1, "price": 50000 }
    ]));
    let mut store = build_store(&server, storage.clone(), Some(TOKEN));
    store.load().await;

    store
        .update_quantity(LineItemId::new(1), 5)
        .await
        .expect("update should succeed");
    store
        .remove(LineItemId::new(2))
        .await
        .expect("remove should succeed");

    let saved: serde_json::Value = serde_json::from_str(
        &storage
            .get_item(STORAGE_KEY)
            .expect("get should succeed")
            .expect("guest cart should be saved"),
    )
    .expect("guest cart should be JSON");
    assert_eq!(saved.as_array().map(Vec::len), Some(1));
    assert_eq!(saved[0]["quantity"], json!(5));

    let missing = store.remove(LineItemId::new(2)).await;
    assert!(matches!(missing, Err(CartError::ItemNotFound(_))));
}

#[tokio::test]
async fn malformed_guest_entries_are_skipped() {
    let server = MockServer::start().await;
    let storage = guest_storage(json!([
        { "product_id": 1, "quantity": 1, "price": 100000 },
        { "quantity": "lots" },
        "not an item"
    ]));
    let mut store = build_store(&server, storage, None);

    store.load().await;

    assert_eq!(store.items().len(), 1);
}

#[tokio::test]
async fn checkout_refuses_a_cart_that_never_reached_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/dathang"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "order_id": 1 })))
        .expect(0)
        .mount(&server)
        .await;

    let storage = guest_storage(json!([
        { "product_id": 1, "quantity": 2, "price": 100000, "shop_id": 1 }
    ]));
    let mut store = build_store(&server, storage.clone(), Some(TOKEN));
    assert_eq!(store.load().await.mode, CartMode::Degraded);

    let outcome = engine()
        .submit_order(&mut store, manual_order(PaymentMethod::Cod))
        .await;

    assert_eq!(outcome, OrderOutcome::Failed(CheckoutError::CartNotSynced));
    assert_eq!(store.items().len(), 1);
    assert!(storage.get_item(STORAGE_KEY).expect("get should succeed").is_some());
}

#[tokio::test]
async fn checkout_moves_the_guest_cart_once_the_server_is_back() {
    let server = MockServer::start().await;
    // Down for the first load, empty for the retry, then holding the pushed line.
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([server_row(30, 1, 2, 100000, 1)])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/cart/add"))
        .and(body_partial_json(json!({ "product_id": 1, "quantity": 2 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/dathang"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "order_id": 77 })))
        .expect(1)
        .mount(&server)
        .await;

    let storage = guest_storage(json!([
        { "product_id": 1, "quantity": 2, "price": 100000, "shop_id": 1 }
    ]));
    let mut store = build_store(&server, storage.clone(), Some(TOKEN));
    assert_eq!(store.load().await.mode, CartMode::Degraded);

    let outcome = engine()
        .submit_order(&mut store, manual_order(PaymentMethod::Cod))
        .await;

    match outcome {
        OrderOutcome::Placed { order_id: Some(id) } => assert_eq!(id.as_str(), "77"),
        other => panic!("Expected a placed order, got {other:?}"),
    }
    assert_eq!(store.mode(), CartMode::Authenticated);
    assert_eq!(storage.get_item(STORAGE_KEY).expect("get should succeed"), None);
}
