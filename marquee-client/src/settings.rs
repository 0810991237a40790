use crate::storage::FileStorage;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File as ConfigFile, FileFormat};
use eyre::{eyre, Context, Result};
use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

const EXAMPLE_CONFIG: &str = include_str!("../config.toml");

// TODO: Move the token into the OS secret storage instead of a plain file in the data dir.
#[derive(Debug, serde::Deserialize, serde::Serialize)]
pub struct Settings {
    pub server_address: String,
    pub storage_path: String,
    pub request_timeout_secs: u64,
    pub logout_timeout_secs: u64,
}

impl Settings {
    pub fn config_file() -> PathBuf {
        let mut config_file = if let Ok(p) = std::env::var("MARQUEE_CONFIG_DIR") {
            PathBuf::from(p)
        } else {
            marquee_common::utils::config_dir()
        };
        config_file.push("config.toml");
        config_file
    }

    pub fn build_default() -> Result<ConfigBuilder<DefaultState>> {
        let data_dir = marquee_common::utils::data_dir();
        let storage_path = data_dir.join("session");

        Ok(Config::builder()
            .set_default("server_address", "http://127.0.0.1:8001")?
            .set_default("storage_path", storage_path.to_str())?
            .set_default("request_timeout_secs", 10)?
            .set_default("logout_timeout_secs", 5)?)
    }

    pub fn builder() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Self::build_default()?.add_source(
            Environment::with_prefix("marquee")
                .prefix_separator("_")
                .separator("__"),
        ))
    }

    pub fn new() -> Result<Self> {
        let config_file = Self::config_file();
        let data_dir = marquee_common::utils::data_dir();

        if let Some(config_dir) = config_file.parent() {
            create_dir_all(config_dir)
                .wrap_err_with(|| format!("Failed to create dir {config_dir:?}"))?;
        }
        create_dir_all(&data_dir).wrap_err_with(|| format!("Failed to create dir {data_dir:?}"))?;

        let mut config_builder = Self::builder()?;
        config_builder = if config_file.exists() {
            let path = config_file
                .to_str()
                .ok_or_else(|| eyre!("Config path {config_file:?} is not valid utf-8"))?;
            config_builder.add_source(ConfigFile::new(path, FileFormat::Toml))
        } else {
            let mut file = File::create(&config_file).wrap_err("Failed to create config file")?;
            file.write_all(EXAMPLE_CONFIG.as_bytes())
                .wrap_err("Failed to write default config file")?;
            config_builder
        };

        let mut settings: Settings = config_builder
            .build()?
            .try_deserialize()
            .map_err(|e| eyre!("Failed to deserialize {}", e))?;

        settings.storage_path = expand_shell(&settings.storage_path)?;

        Ok(settings)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn logout_timeout(&self) -> Duration {
        Duration::from_secs(self.logout_timeout_secs)
    }

    pub fn storage(&self) -> Result<FileStorage> {
        FileStorage::new(&self.storage_path)
            .wrap_err_with(|| format!("Failed to open session storage {:?}", self.storage_path))
    }
}

fn expand_shell(value: &str) -> Result<String> {
    Ok(shellexpand::full(value)?.to_string())
}
