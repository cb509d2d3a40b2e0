use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use config::{Config, File};
use serde::Deserialize;
use url::Url;

const DEFAULT_CONFIG_PATH: &str = "settings.yml";
const DB_HOST_ENV: &str = "DB_HOST";
const DATABASE_URL_ENV: &str = "DATABASE_URL";
const APP_PORT_ENV: &str = "APP_PORT";
const BASE_URL_ENV: &str = "BASE_URL";

#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub database_url: Url,
    /// scheme and host used for `short_url`; taken from the request when unset
    pub base_url: Option<Url>,
    pub max_key_attempts: u32,
    pub index_file: PathBuf,
}

/// Values that may come from the built-in defaults or the optional config file
#[derive(Deserialize)]
struct FileConfig {
    app_port: u16,
    db_name: String,
    db_host: String,
    db_port: u16,
    db_user: String,
    db_pass: String,
    base_url: Option<String>,
    max_key_attempts: u32,
    index_file: PathBuf,
}

fn load_file_config() -> Result<FileConfig> {
    let settings = Config::builder()
        .set_default("app_port", 8080)?
        .set_default("db_name", "db")?
        .set_default("db_host", "localhost")?
        .set_default("db_port", 5432)?
        .set_default("db_user", "admin")?
        .set_default("db_pass", "admin")?
        .set_default("max_key_attempts", 10)?
        .set_default("index_file", "index.html")?
        .add_source(File::with_name(DEFAULT_CONFIG_PATH).required(false))
        .build()
        .map_err(|e| anyhow!("Failed to read config file: {e}"))?;

    settings
        .try_deserialize::<FileConfig>()
        .map_err(|e| anyhow!("Failed to deserialize config file: {e}"))
}

/// Try to parse env variable. If it's not set, return None. If it's invalid, treat it as an error.
fn try_from_env<T, F>(env_var: &str, f: F) -> Result<Option<T>>
where
    F: FnOnce(String) -> Result<T>,
{
    match std::env::var(env_var) {
        Ok(raw) => {
            let val = f(raw).map_err(|_| anyhow!("Failed to parse {}", env_var))?;
            Ok(Some(val))
        }
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(_) => bail!("Could not read {env_var} from env"),
    }
}

/// Load configuration from defaults, `settings.yml` and env, in increasing priority.
/// `port_override` comes from the command line and beats all of them.
pub fn load(port_override: Option<u16>) -> Result<Settings> {
    let config = load_file_config()?;

    let port = match port_override {
        Some(port) => port,
        None => try_from_env(APP_PORT_ENV, |raw| raw.parse::<u16>().map_err(|e| e.into()))?
            .unwrap_or(config.app_port),
    };

    let database_url = match try_from_env(DATABASE_URL_ENV, |raw| {
        Url::parse(&raw).map_err(|e| e.into())
    })? {
        Some(url) => url,
        None => {
            let db_host = try_from_env(DB_HOST_ENV, Ok)?
                .filter(|host| !host.is_empty())
                .unwrap_or(config.db_host);
            tracing::debug!("{DATABASE_URL_ENV} is not set, connecting to {db_host}");

            let url_str = format!(
                "postgres://{}:{}@{}:{}/{}",
                config.db_user, config.db_pass, db_host, config.db_port, config.db_name
            );
            Url::parse(&url_str).context("Assembled database url is invalid")?
        }
    };

    let base_url = match try_from_env(BASE_URL_ENV, |raw| Url::parse(&raw).map_err(|e| e.into()))? {
        Some(url) => Some(url),
        None => config
            .base_url
            .map(|raw| Url::parse(&raw))
            .transpose()
            .context("base_url in config file is invalid")?,
    };

    if config.max_key_attempts == 0 {
        bail!("max_key_attempts must be at least 1");
    }

    Ok(Settings {
        port,
        database_url,
        base_url,
        max_key_attempts: config.max_key_attempts,
        index_file: config.index_file,
    })
}
