//! Guest cart persisted in local storage.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::warn;

use crate::infra::{LocalStorage, StorageError};

use super::{
    LineItem, LineItemId, PriceSource, ProductId, ShopId, VariantId,
    line_item::{clamp_quantity, whole_units},
};

/// One entry of the guest cart array, also the shape of `cart_items` in guest orders.
/// `price`/`sale_price` are already resolved against the selected variant. They are written as
/// JSON numbers and read back from numbers or numeric strings.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct GuestCartRecord {
    pub product_id: ProductId,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, serialize_with = "rust_decimal::serde::float_option::serialize")]
    pub price: Option<Decimal>,
    #[serde(
        default,
        serialize_with = "rust_decimal::serde::float_option::serialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub sale_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_id: Option<ShopId>,
}

impl GuestCartRecord {
    fn into_line_item(self, id: LineItemId) -> LineItem {
        let price = self.price.map(whole_units);
        let sale_price = self.sale_price.map(whole_units);
        let pricing = if self.variant_id.is_some() {
            PriceSource {
                variant_sale_price: sale_price,
                variant_price: price,
                ..Default::default()
            }
        } else {
            PriceSource {
                product_sale_price: sale_price,
                product_price: price,
                ..Default::default()
            }
        };

        LineItem {
            id,
            product_id: self.product_id,
            variant_id: self.variant_id,
            quantity: clamp_quantity(self.quantity),
            shop_id: self.shop_id,
            name: self.name,
            image: self.image,
            options: [self.value1, self.value2]
                .into_iter()
                .flatten()
                .filter(|label| !label.trim().is_empty())
                .collect(),
            pricing,
        }
    }
}

impl From<&LineItem> for GuestCartRecord {
    fn from(item: &LineItem) -> Self {
        let list = item.list_unit_price();
        let effective = item.effective_unit_price();
        let mut options = item.options.iter().cloned();
        GuestCartRecord {
            product_id: item.product_id,
            quantity: i64::from(item.quantity),
            variant_id: item.variant_id,
            name: item.name.clone(),
            image: item.image.clone(),
            price: Some(list),
            sale_price: (effective != list).then_some(effective),
            value1: options.next(),
            value2: options.next(),
            shop_id: item.shop_id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GuestCart {
    storage: Arc<dyn LocalStorage>,
    key: String,
}

impl GuestCart {
    pub fn new(storage: Arc<dyn LocalStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Reads the guest cart. Absent or unreadable carts are empty, malformed entries are skipped.
    /// Line ids are the 1-based positions in the stored array.
    pub fn load(&self) -> Vec<LineItem> {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Guest cart could not be read from local storage: {e}");
                return Vec::new();
            }
        };

        let entries = match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(serde_json::Value::Array(entries)) => entries,
            Ok(_) | Err(_) => {
                warn!("Guest cart in local storage is not a JSON array. Ignoring it.");
                return Vec::new();
            }
        };

        entries
            .into_iter()
            .filter_map(|entry| {
                serde_json::from_value::<GuestCartRecord>(entry)
                    .inspect_err(|e| warn!("Skipping malformed guest cart entry: {e}"))
                    .ok()
            })
            .enumerate()
            .map(|(index, record)| record.into_line_item(LineItemId::new(index as i64 + 1)))
            .collect()
    }

    pub fn save(&self, items: &[LineItem]) -> Result<(), StorageError> {
        let records: Vec<GuestCartRecord> = items.iter().map(GuestCartRecord::from).collect();
        let raw = serde_json::to_string(&records)?;
        self.storage.set_item(&self.key, &raw)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_item(&self.key)
    }
}

//-------------------------- Tests -------------------------------
