pub mod domain;
pub mod infra;

use std::sync::Arc;

use anyhow::Context;
use domain::{
    cart::{CartMode, CartStore, GuestCart, LineItem, LoadOutcome, StoreOptions},
    checkout::{AppliedVoucher, CheckoutEngine, OrderOutcome, PriceBreakdown},
};
use infra::{Command, Credential, FileLocalStorage, RestApi, Settings, VoucherArgs};
use tracing_appender::non_blocking::WorkerGuard;

pub struct AppState {
    pub settings: Settings,
    pub store: CartStore,
    pub engine: CheckoutEngine,
}

pub fn configure_tracing(settings: &Settings) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(
        settings.application.logs_directory.clone(),
        "cart_client.log",
    );
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(non_blocking)
        .init();
    _guard
}

/// Builds the store and engine. A token given on the command line wins over the configured one.
pub fn construct_app_state(settings: Settings, token: Option<String>) -> anyhow::Result<AppState> {
    let api = RestApi::new(&settings.api).context("Failed to build the HTTP client.")?;
    let storage = FileLocalStorage::new(settings.application.storage_path.clone());
    let guest = GuestCart::new(Arc::new(storage), settings.cart.storage_key.clone());
    let credential = token
        .or_else(|| settings.api.token.clone())
        .filter(|token| !token.trim().is_empty())
        .map(Credential::new);
    let options = StoreOptions {
        fetch_retries: settings.api.fetch_retries,
        reconcile_concurrency: settings.api.reconcile_concurrency,
    };

    let store = CartStore::new(Arc::new(api), guest, credential, options);
    let engine = CheckoutEngine::new(settings.cart.shipping_fee_per_shop());

    Ok(AppState {
        settings,
        store,
        engine,
    })
}

pub async fn run(state: &mut AppState, command: Command) -> anyhow::Result<()> {
    let loaded = state.store.load().await;
    report_load(&loaded);

    match command {
        Command::Show { voucher } => {
            let voucher = usable_voucher(&state.store, &voucher);
            print_cart(state.store.items());
            print_breakdown(&state.engine.breakdown(state.store.items(), voucher.as_ref()));
        }
        Command::Add(args) => {
            state
                .store
                .add(args.into())
                .await
                .context("Could not add the item to the cart.")?;
            print_cart(state.store.items());
        }
        Command::SetQuantity { id, quantity } => {
            state
                .store
                .update_quantity(id, quantity)
                .await
                .with_context(|| format!("Could not change the quantity of line {id}."))?;
            print_cart(state.store.items());
        }
        Command::Remove { id } => {
            state
                .store
                .remove(id)
                .await
                .with_context(|| format!("Could not remove line {id}."))?;
            print_cart(state.store.items());
        }
        Command::Checkout(args) => {
            let voucher = usable_voucher(&state.store, &args.voucher);
            print_breakdown(&state.engine.breakdown(state.store.items(), voucher.as_ref()));
            match state.engine.submit_order(&mut state.store, args.into()).await {
                OrderOutcome::Placed { order_id: Some(id) } => println!("Order {id} placed."),
                OrderOutcome::Placed { order_id: None } => println!("Order placed."),
                OrderOutcome::Redirected { url } => println!("Continue payment at {url}"),
                OrderOutcome::Failed(e) => anyhow::bail!(e),
            }
        }
    }
    Ok(())
}

/// Guests cannot redeem vouchers, so a guest total never includes one.
fn usable_voucher(store: &CartStore, args: &VoucherArgs) -> Option<AppliedVoucher> {
    let applied = args.applied()?;
    if store.mode() == CartMode::Guest {
        println!("Voucher {} needs a signed in account and was not applied.", applied.code());
        return None;
    }
    println!("Voucher: {}", applied.code());
    Some(applied)
}

fn report_load(outcome: &LoadOutcome) {
    if outcome.mode == CartMode::Degraded {
        println!("Server cart unavailable, showing the cart saved on this device.");
    }
    if let Some(report) = &outcome.reconciliation {
        if !report.pushed.is_empty() {
            println!("Moved {} item(s) from this device to your cart.", report.pushed.len());
        }
        for failed in &report.failed {
            println!("Could not move {}: {}", failed.key, failed.message);
        }
    }
}

fn print_cart(items: &[LineItem]) {
    if items.is_empty() {
        println!("Cart is empty.");
        return;
    }
    for item in items {
        let options = if item.options.is_empty() {
            String::new()
        } else {
            format!(" ({})", item.options.join(", "))
        };
        println!(
            "#{} {}{} x{} @ {} = {}",
            item.id,
            item.name,
            options,
            item.quantity,
            item.effective_unit_price(),
            item.effective_total()
        );
    }
}

fn print_breakdown(breakdown: &PriceBreakdown) {
    println!("Subtotal:           {}", breakdown.subtotal);
    println!("Promotion discount: -{}", breakdown.promotion_discount);
    println!("Voucher discount:   -{}", breakdown.voucher_discount);
    println!("Shipping:           {}", breakdown.shipping);
    println!("Total:              {}", breakdown.total);
}
