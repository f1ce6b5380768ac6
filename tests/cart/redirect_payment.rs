use cart_client::domain::{
    cart::{AddressId, CartMode},
    checkout::{AddressForm, OrderOutcome, OrderRequest, PaymentMethod},
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

use crate::test_utils::{TOKEN, build_store, engine, guest_storage, manual_order, server_row};

async fn server_with_cart() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            server_row(1, 7, 1, 300000, 1),
            server_row(2, 8, 2, 150000, 2)
        ])))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn online_payment_redirects_and_clears_the_cart() {
    let server = server_with_cart().await;
    Mock::given(method("POST"))
        .and(path("/api/dathang"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .and(body_json(json!({
            "payment_method": "vnpay",
            "voucher_code": "GIAM50K",
            "address_id": 3
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "redirect_url": "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html?token=abc" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut store = build_store(&server, guest_storage(json!([])), Some(TOKEN));
    assert_eq!(store.load().await.mode, CartMode::Authenticated);
    let mut changes = store.subscribe();

    let outcome = engine()
        .submit_order(
            &mut store,
            OrderRequest {
                payment_method: PaymentMethod::Vnpay,
                address: AddressForm {
                    address_id: Some(AddressId::new(3)),
                    manual: None,
                },
                voucher_code: Some("GIAM50K".to_owned()),
            },
        )
        .await;

    assert_eq!(
        outcome,
        OrderOutcome::Redirected {
            url: "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html?token=abc".to_owned()
        }
    );
    assert!(store.is_empty());
    let cleared = changes.recv().await.expect("clear should be broadcast");
    assert_eq!(cleared.item_count, 0);
}

#[tokio::test]
async fn order_id_is_read_from_a_flat_response() {
    let server = server_with_cart().await;
    Mock::given(method("POST"))
        .and(path("/api/dathang"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "order_id": "DH-20261016-01" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut store = build_store(&server, guest_storage(json!([])), Some(TOKEN));
    store.load().await;

    let outcome = engine()
        .submit_order(&mut store, manual_order(PaymentMethod::Momo))
        .await;

    match outcome {
        OrderOutcome::Placed { order_id: Some(id) } => assert_eq!(id.as_str(), "DH-20261016-01"),
        other => panic!("Expected a placed order, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_without_message_is_generic_and_cart_survives() {
    let server = server_with_cart().await;
    Mock::given(method("POST"))
        .and(path("/api/dathang"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>Bad gateway</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let mut store = build_store(&server, guest_storage(json!([])), Some(TOKEN));
    store.load().await;

    let outcome = engine()
        .submit_order(&mut store, manual_order(PaymentMethod::Cod))
        .await;

    match outcome {
        OrderOutcome::Failed(e) => {
            assert_eq!(e.to_string(), "Could not place the order. Please try again.")
        }
        other => panic!("Expected a failure, got {other:?}"),
    }
    assert_eq!(store.items().len(), 2);
}
