use anyhow::{Result, anyhow};
use config::{Config, Environment, File, Map};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub api: Api,
    pub storage: Storage,
    pub routes: Routes,
    pub log: Log,
}

#[derive(Debug, Deserialize)]
pub struct Api {
    pub backend: String, // "fake" or "real"
    pub base_url: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
    pub backend: String, // "memory" or "file"
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct Routes {
    pub login: String,
    pub register: String,
    pub logout: String,
    pub landing: String,
    pub protected: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

const DEFAULT_BASE_URL: &str = "http://localhost:8888";
const ENV_PREFIX: &str = "SESSIONGATE";

fn default_storage_dir() -> String {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sessiongate")
        .to_string_lossy()
        .into_owned()
}

/// Defaults, then the settings file, then `SESSIONGATE_*` environment
/// variables (`SESSIONGATE_API__BASE_URL`, ...).
///
/// The built-in settings file may be absent; an explicit `path` must exist.
pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    parse_settings_with_env(path, None)
}

/// `env` replaces the process environment when given.
fn parse_settings_with_env(
    path: Option<&str>,
    env: Option<Map<String, String>>,
) -> Result<Settings> {
    let (path, required) = match path {
        Some(path) => (path, true),
        None => (SETTINGS_PATH, false),
    };

    let settings: Settings = Config::builder()
        .set_default("api.backend", "real")?
        .set_default("api.base_url", DEFAULT_BASE_URL)?
        .set_default("storage.backend", "file")?
        .set_default("storage.dir", default_storage_dir())?
        .set_default("routes.login", "/login")?
        .set_default("routes.register", "/register")?
        .set_default("routes.logout", "/logout")?
        .set_default("routes.landing", "/home")?
        .set_default("routes.protected", vec!["/home", "/onebook", "/books", "/filmstv"])?
        .set_default("log.filter", "info")?
        .add_source(File::with_name(path).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("routes.protected")
                .source(env),
        )
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}
