use std::sync::Arc;

use cart_client::{
    domain::{
        cart::{CartStore, GuestCart, StoreOptions},
        checkout::{AddressForm, CheckoutEngine, ManualAddress, OrderRequest, PaymentMethod},
    },
    infra::{ApiSettings, Credential, MemoryLocalStorage, RestApi},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use wiremock::MockServer;

pub const STORAGE_KEY: &str = "cart";
pub const TOKEN: &str = "test-token";
pub const FEE_PER_SHOP: i64 = 20_000;

/// Settings pointing at the mock backend. No retries, so failures surface immediately.
pub fn api_settings(server: &MockServer) -> ApiSettings {
    ApiSettings {
        base_url: format!("{}/api", server.uri()),
        timeout_ms: 2_000,
        token: None,
        fetch_retries: 0,
        reconcile_concurrency: 2,
    }
}

pub fn build_store(
    server: &MockServer,
    storage: Arc<MemoryLocalStorage>,
    token: Option<&str>,
) -> CartStore {
    let settings = api_settings(server);
    let api = RestApi::new(&settings).expect("HTTP client should build");
    CartStore::new(
        Arc::new(api),
        GuestCart::new(storage, STORAGE_KEY),
        token.map(Credential::new),
        StoreOptions {
            fetch_retries: settings.fetch_retries,
            reconcile_concurrency: settings.reconcile_concurrency,
        },
    )
}

pub fn engine() -> CheckoutEngine {
    CheckoutEngine::new(Decimal::from(FEE_PER_SHOP))
}

/// Guest cart as the storefront writes it to local storage.
pub fn guest_storage(records: Value) -> Arc<MemoryLocalStorage> {
    Arc::new(MemoryLocalStorage::with_item(
        STORAGE_KEY,
        &records.to_string(),
    ))
}

pub fn manual_address() -> ManualAddress {
    ManualAddress {
        full_name: "Lê Văn C".to_owned(),
        address: "45 Trần Phú".to_owned(),
        city: "Đà Nẵng".to_owned(),
        phone: "+84905123456".to_owned(),
        email: "c@example.com".to_owned(),
    }
}

pub fn manual_order(payment_method: PaymentMethod) -> OrderRequest {
    OrderRequest {
        payment_method,
        address: AddressForm {
            address_id: None,
            manual: Some(manual_address()),
        },
        voucher_code: None,
    }
}

/// A `GET /cart` row with an embedded product.
pub fn server_row(id: i64, product_id: i64, quantity: i64, price: i64, shop_id: i64) -> Value {
    json!({
        "id": id,
        "product_id": product_id,
        "variant_id": null,
        "quantity": quantity,
        "product": {
            "name": format!("Product {product_id}"),
            "price": price,
            "sale_price": null,
            "seller_id": shop_id
        }
    })
}
