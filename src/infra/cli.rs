use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use crate::domain::{
    cart::{
        AddressId, LineItemId, NewLineItem, PriceSource, ProductId, ShopId, VariantId,
        clamp_quantity,
    },
    checkout::{
        AddressForm, AppliedVoucher, ManualAddress, OrderRequest, PaymentMethod, Voucher,
        VoucherConfirmation, VoucherKind,
    },
};

#[derive(Parser, Debug)]
#[command(version, about = "Storefront cart and checkout client")]
pub struct Cli {
    /// Bearer token of a signed in user. Without it the guest cart is used.
    #[arg(long, env = "CART_TOKEN", global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the cart and its price breakdown.
    Show {
        #[command(flatten)]
        voucher: VoucherArgs,
    },
    /// Add a product to the cart.
    Add(AddArgs),
    /// Change the quantity of a cart line. Values below one become one.
    SetQuantity {
        id: LineItemId,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a cart line.
    Remove { id: LineItemId },
    /// Place an order for the current cart.
    Checkout(CheckoutArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    pub product_id: ProductId,
    #[arg(long)]
    pub variant_id: Option<VariantId>,
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub quantity: i64,
    #[arg(long)]
    pub shop_id: Option<ShopId>,
    #[arg(long, default_value = "")]
    pub name: String,
    #[arg(long)]
    pub image: Option<String>,
    /// List price of the product or the selected variant.
    #[arg(long)]
    pub price: Option<Decimal>,
    #[arg(long)]
    pub sale_price: Option<Decimal>,
    /// Selected option labels, e.g. `--option Red --option XL`.
    #[arg(long = "option")]
    pub options: Vec<String>,
}

/// A voucher as the storefront describes it. Without a confirmed discount the discount is
/// estimated from its terms.
#[derive(Args, Debug, Default)]
pub struct VoucherArgs {
    /// Voucher code to apply.
    #[arg(long = "voucher")]
    pub code: Option<String>,
    /// Fixed amount taken off the order.
    #[arg(long, requires = "code", conflicts_with = "voucher_percent")]
    pub voucher_amount: Option<Decimal>,
    /// Percentage taken off the order.
    #[arg(long, requires = "code")]
    pub voucher_percent: Option<Decimal>,
    #[arg(long, requires = "voucher_percent")]
    pub voucher_max_discount: Option<Decimal>,
    #[arg(long, requires = "code")]
    pub voucher_min_order: Option<Decimal>,
    /// The voucher waives shipping.
    #[arg(long, requires = "code")]
    pub free_shipping: bool,
    /// Voucher discount already confirmed by the server.
    #[arg(long, requires = "code")]
    pub voucher_discount: Option<Decimal>,
}

impl VoucherArgs {
    pub fn applied(&self) -> Option<AppliedVoucher> {
        let code = self.code.as_deref().map(str::trim).filter(|code| !code.is_empty())?;
        let kind = match self.voucher_percent {
            Some(percent) => VoucherKind::Percent {
                percent,
                max_discount: self.voucher_max_discount,
            },
            None => VoucherKind::Fixed(self.voucher_amount.unwrap_or(Decimal::ZERO)),
        };
        let voucher = Voucher {
            code: code.to_owned(),
            kind,
            min_order_value: self.voucher_min_order.unwrap_or(Decimal::ZERO),
            free_shipping: self.free_shipping,
        };

        Some(match self.voucher_discount {
            Some(discount) => AppliedVoucher::confirmed(
                voucher,
                VoucherConfirmation {
                    discount,
                    is_free_shipping: self.free_shipping,
                },
            ),
            None => AppliedVoucher::estimated(voucher),
        })
    }
}

#[derive(Args, Debug)]
pub struct CheckoutArgs {
    #[arg(long, default_value = "cod")]
    pub payment_method: PaymentMethod,
    #[command(flatten)]
    pub voucher: VoucherArgs,
    /// A saved address of the signed in user.
    #[arg(long)]
    pub address_id: Option<AddressId>,
    #[arg(long)]
    pub full_name: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
}

impl From<AddArgs> for NewLineItem {
    fn from(args: AddArgs) -> Self {
        // Prices given on the command line belong to whatever was selected.
        let pricing = if args.variant_id.is_some() {
            PriceSource {
                variant_sale_price: args.sale_price,
                variant_price: args.price,
                ..Default::default()
            }
        } else {
            PriceSource {
                product_sale_price: args.sale_price,
                product_price: args.price,
                ..Default::default()
            }
        };
        NewLineItem {
            product_id: args.product_id,
            variant_id: args.variant_id,
            quantity: clamp_quantity(args.quantity),
            shop_id: args.shop_id,
            name: args.name,
            image: args.image,
            options: args.options,
            pricing,
        }
    }
}

impl From<CheckoutArgs> for OrderRequest {
    fn from(args: CheckoutArgs) -> Self {
        let fields = [
            &args.full_name,
            &args.address,
            &args.city,
            &args.phone,
            &args.email,
        ];
        // Any manual field at all means a manual address; the blank ones fail validation.
        let manual = fields.iter().any(|field| field.is_some()).then(|| ManualAddress {
            full_name: args.full_name.clone().unwrap_or_default(),
            address: args.address.clone().unwrap_or_default(),
            city: args.city.clone().unwrap_or_default(),
            phone: args.phone.clone().unwrap_or_default(),
            email: args.email.clone().unwrap_or_default(),
        });

        OrderRequest {
            payment_method: args.payment_method,
            address: AddressForm {
                address_id: args.address_id,
                manual,
            },
            voucher_code: args.voucher.code,
        }
    }
}
