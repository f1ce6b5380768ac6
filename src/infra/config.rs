use anyhow::Context;
use camino::Utf8PathBuf;
use config::Config;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Clone, Deserialize, Debug)]
pub struct Settings {
    pub environment: String,
    pub application: ApplicationSettings,
    pub api: ApiSettings,
    pub cart: CartSettings,
}

#[derive(Clone, Deserialize, Debug)]
pub struct ApplicationSettings {
    pub logs_directory: String,
    pub storage_path: Utf8PathBuf,
}

#[derive(Clone, Deserialize, Debug)]
pub struct ApiSettings {
    pub base_url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub fetch_retries: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub reconcile_concurrency: usize,
}

#[derive(Clone, Deserialize, Debug)]
pub struct CartSettings {
    pub storage_key: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub shipping_fee_per_shop: i64,
}

impl CartSettings {
    pub fn shipping_fee_per_shop(&self) -> Decimal {
        Decimal::from(self.shipping_fee_per_shop)
    }
}

fn find_config_dir() -> anyhow::Result<Utf8PathBuf> {
    let current_dir =
        std::env::current_dir().context("Failed to determine the current directory.")?;
    let current_dir =
        Utf8PathBuf::try_from(current_dir).context("Could not convert PathBuf to Utf8PathBuf")?;

    current_dir
        .ancestors()
        .map(|p| p.join("config"))
        .find(|p| {
            let base_path = p.join("base.yaml");
            p.is_dir() && base_path.is_file()
        })
        .ok_or_else(|| anyhow::anyhow!("Cannot find config directory!"))
}

pub fn get_config_settings() -> anyhow::Result<Settings> {
    let config_directory = find_config_dir()?;

    // Detect the running environment - default to `development` if unspecified.
    let environment: String =
        std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".to_owned());

    let base_source = config::File::from(config_directory.join("base").into_std_path_buf()).required(true);

    let env_source =
        config::File::from(config_directory.join(environment.as_str()).into_std_path_buf())
            .required(true);

    // e.g. `APP_API__BASE_URL=http://shop.test/api` sets `Settings.api.base_url`
    let overrides_source = config::Environment::with_prefix("app")
        .prefix_separator("_")
        .separator("__");

    let config = Config::builder()
        .set_default("environment", environment.as_str())?
        .add_source(base_source)
        .add_source(env_source)
        .add_source(overrides_source)
        .build()?;

    config
        .try_deserialize()
        .context("Could not deserialise config settings.")
}
