//! Line items and the price fallback chain.

use rust_decimal::Decimal;

use super::{LineItemId, ProductId, ShopId, VariantId};

/// Quantities below one are raised to one.
pub fn clamp_quantity(quantity: i64) -> u32 {
    u32::try_from(quantity.max(1)).unwrap_or(u32::MAX)
}

/// Amounts are whole currency units.
pub(crate) fn whole_units(amount: Decimal) -> Decimal {
    amount.floor()
}

/// Every price a line item may carry. Variant fields take precedence over product fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceSource {
    pub variant_sale_price: Option<Decimal>,
    pub variant_price: Option<Decimal>,
    pub product_sale_price: Option<Decimal>,
    pub product_price: Option<Decimal>,
}

impl PriceSource {
    /// The price actually charged: variant sale, variant, product sale, product, else zero.
    pub fn effective_unit_price(&self) -> Decimal {
        self.variant_sale_price
            .or(self.variant_price)
            .or(self.product_sale_price)
            .or(self.product_price)
            .unwrap_or(Decimal::ZERO)
    }

    /// The list price used for the subtotal: variant, product, else zero.
    pub fn list_unit_price(&self) -> Decimal {
        self.variant_price
            .or(self.product_price)
            .unwrap_or(Decimal::ZERO)
    }

    fn floored(self) -> Self {
        Self {
            variant_sale_price: self.variant_sale_price.map(whole_units),
            variant_price: self.variant_price.map(whole_units),
            product_sale_price: self.product_sale_price.map(whole_units),
            product_price: self.product_price.map(whole_units),
        }
    }
}

/// Identity of a line item across the guest and authenticated carts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey(String);

impl ItemKey {
    pub fn new(product_id: ProductId, variant_id: Option<VariantId>, options: &[String]) -> Self {
        let variant = variant_id.map_or_else(|| "null".to_owned(), |v| v.to_string());
        let mut key = format!("{product_id}|{variant}");
        for option in options {
            key.push('|');
            key.push_str(option.trim());
        }
        ItemKey(key.to_lowercase())
    }
}

impl std::fmt::Display for ItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub id: LineItemId,
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub quantity: u32,
    pub shop_id: Option<ShopId>,
    pub name: String,
    pub image: Option<String>,
    /// Selected option labels, e.g. colour and size.
    pub options: Vec<String>,
    pub pricing: PriceSource,
}

impl LineItem {
    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.product_id, self.variant_id, &self.options)
    }

    pub fn effective_unit_price(&self) -> Decimal {
        self.pricing.effective_unit_price()
    }

    pub fn list_unit_price(&self) -> Decimal {
        self.pricing.list_unit_price()
    }

    pub fn list_total(&self) -> Decimal {
        self.list_unit_price() * Decimal::from(self.quantity)
    }

    pub fn effective_total(&self) -> Decimal {
        self.effective_unit_price() * Decimal::from(self.quantity)
    }
}

/// What a product page knows about an item being added to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLineItem {
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub quantity: u32,
    pub shop_id: Option<ShopId>,
    pub name: String,
    pub image: Option<String>,
    pub options: Vec<String>,
    pub pricing: PriceSource,
}

impl NewLineItem {
    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.product_id, self.variant_id, &self.options)
    }

    pub fn into_line_item(self, id: LineItemId) -> LineItem {
        LineItem {
            id,
            product_id: self.product_id,
            variant_id: self.variant_id,
            quantity: self.quantity.max(1),
            shop_id: self.shop_id,
            name: self.name,
            image: self.image,
            options: self.options,
            pricing: self.pricing.floored(),
        }
    }
}

//------------------------- Wire format ----------------------------

/// A cart row as returned by `GET /cart`, with the product and variant embedded.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ServerCartItem {
    pub id: LineItemId,
    pub product_id: ProductId,
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    pub quantity: i64,
    #[serde(default)]
    pub product: Option<ServerProduct>,
    #[serde(default)]
    pub variant: Option<ServerVariant>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ServerProduct {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub sale_price: Option<Decimal>,
    #[serde(default, alias = "seller_id")]
    pub shop_id: Option<ShopId>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ServerVariant {
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub sale_price: Option<Decimal>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub value1: Option<String>,
    #[serde(default)]
    pub value2: Option<String>,
}

impl From<ServerCartItem> for LineItem {
    fn from(item: ServerCartItem) -> Self {
        let product = item.product;
        let variant = item.variant;

        let pricing = PriceSource {
            variant_sale_price: variant.as_ref().and_then(|v| v.sale_price),
            variant_price: variant.as_ref().and_then(|v| v.price),
            product_sale_price: product.as_ref().and_then(|p| p.sale_price),
            product_price: product.as_ref().and_then(|p| p.price),
        }
        .floored();

        let options = variant
            .as_ref()
            .map(|v| {
                [v.value1.clone(), v.value2.clone()]
                    .into_iter()
                    .flatten()
                    .filter(|label| !label.trim().is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let image = variant
            .as_ref()
            .and_then(|v| v.image.clone())
            .or_else(|| product.as_ref().and_then(|p| p.image.clone()));

        LineItem {
            id: item.id,
            product_id: item.product_id,
            variant_id: item.variant_id,
            quantity: clamp_quantity(item.quantity),
            shop_id: product.as_ref().and_then(|p| p.shop_id),
            name: product.map(|p| p.name).unwrap_or_default(),
            image,
            options,
            pricing,
        }
    }
}

//-------------------------- Tests -------------------------------
