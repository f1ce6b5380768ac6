mod cli;
mod client_error;
mod config;
mod local_storage;
mod rest_api;

pub use cli::{AddArgs, CheckoutArgs, Cli, Command, VoucherArgs};
pub use client_error::ClientError;
pub use config::{ApiSettings, ApplicationSettings, CartSettings, Settings, get_config_settings};
pub use local_storage::{FileLocalStorage, LocalStorage, MemoryLocalStorage, StorageError};
pub use rest_api::{AddToCartRequest, Credential, MarketplaceApi, MockMarketplaceApi, RestApi};
