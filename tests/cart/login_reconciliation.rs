use cart_client::{
    domain::cart::{CartMode, NewLineItem, PriceSource, ProductId, ShopId},
    infra::{Credential, LocalStorage},
};
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

use crate::test_utils::{STORAGE_KEY, TOKEN, build_store, guest_storage, server_row};

fn bearer() -> String {
    format!("Bearer {TOKEN}")
}

#[tokio::test]
async fn login_pushes_missing_guest_items_once() {
    let server = MockServer::start().await;
    // First fetch sees only the existing server line, the refetch after reconciliation sees both.
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .and(header("authorization", bearer().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([server_row(10, 1, 1, 100000, 1)])))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [server_row(10, 1, 1, 100000, 1), server_row(11, 2, 3, 50000, 2)]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/cart/add"))
        .and(body_partial_json(json!({ "product_id": 2, "quantity": 3, "replace_quantity": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let storage = guest_storage(json!([
        { "product_id": 1, "quantity": 2, "price": 100000 },
        { "product_id": 2, "quantity": 3, "price": 50000 }
    ]));
    let mut store = build_store(&server, storage.clone(), None);
    assert_eq!(store.load().await.mode, CartMode::Guest);

    let outcome = store.login(Credential::new(TOKEN)).await;

    assert_eq!(outcome.mode, CartMode::Authenticated);
    let report = outcome.reconciliation.expect("guest cart should be reconciled");
    assert!(report.is_complete());
    assert_eq!(report.pushed.len(), 1);
    assert_eq!(report.duplicates.len(), 1);
    assert_eq!(store.items().len(), 2);
    assert_eq!(storage.get_item(STORAGE_KEY).expect("get should succeed"), None);
}

#[tokio::test]
async fn failed_push_is_reported_and_others_continue() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/cart/add"))
        .and(body_partial_json(json!({ "product_id": 1 })))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "message": "Sản phẩm ngừng bán" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/cart/add"))
        .and(body_partial_json(json!({ "product_id": 2 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let storage = guest_storage(json!([
        { "product_id": 1, "quantity": 1, "price": 100000 },
        { "product_id": 2, "quantity": 1, "price": 50000 }
    ]));
    let mut store = build_store(&server, storage, Some(TOKEN));

    let outcome = store.load().await;

    let report = outcome.reconciliation.expect("guest cart should be reconciled");
    assert!(!report.is_complete());
    assert_eq!(report.pushed.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].message.contains("Sản phẩm ngừng bán"));
}

#[tokio::test]
async fn authenticated_add_shows_the_refreshed_server_cart() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([server_row(21, 5, 2, 80000, 4)])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/cart/add"))
        .and(header("authorization", bearer().as_str()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let storage = guest_storage(json!([]));
    let mut store = build_store(&server, storage.clone(), Some(TOKEN));
    store.load().await;

    store
        .add(NewLineItem {
            product_id: ProductId::new(5),
            variant_id: None,
            quantity: 2,
            shop_id: Some(ShopId::new(4)),
            name: "Giày".to_owned(),
            image: None,
            options: Vec::new(),
            pricing: PriceSource {
                product_price: Some(Decimal::from(80_000)),
                ..Default::default()
            },
        })
        .await
        .expect("add should succeed");

    assert_eq!(store.items().len(), 1);
    assert_eq!(store.items()[0].id.get(), 21);
    assert_eq!(store.items()[0].effective_total(), Decimal::from(160_000));
    assert_eq!(
        storage.get_item(STORAGE_KEY).expect("get should succeed").as_deref(),
        Some("[]")
    );
}
