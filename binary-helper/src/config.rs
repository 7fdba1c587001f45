use std::path::Path;

use anyhow::Context as _;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::Config;
use crate::logging;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
	/// The log level filter, in `tracing` env-filter syntax
	pub level: String,

	/// The output format
	pub mode: logging::Mode,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			mode: logging::Mode::Default,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
	/// The postgres connection string
	pub uri: String,

	/// Upper bound on pooled connections
	pub max_connections: usize,

	/// How long to wait for a free connection, unbounded when unset
	pub pool_timeout_ms: Option<u64>,

	/// Apply the embedded schema on startup
	pub migrate: bool,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self {
			uri: "postgres://localhost:5432".to_string(),
			max_connections: 16,
			pool_timeout_ms: None,
			migrate: true,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, bound(deserialize = ""))]
pub struct AppConfig<T: ConfigExtention> {
	/// The name of the application
	pub name: String,

	/// The version reported by the application
	pub version: String,

	/// The path to the config file
	pub config_file: Option<String>,

	/// The logging configuration
	pub logging: LoggingConfig,

	/// The database configuration
	pub database: DatabaseConfig,

	#[serde(flatten)]
	pub extra: T,
}

pub trait ConfigExtention: Serialize + DeserializeOwned + Default {
	const APP_NAME: &'static str;

	const APP_VERSION: &'static str = "0.0.0";

	/// Prefix of environment overrides, nested keys are separated by `__`.
	const ENV_PREFIX: &'static str;

	fn config_default() -> AppConfig<Self> {
		AppConfig {
			name: Self::APP_NAME.to_owned(),
			version: Self::APP_VERSION.to_owned(),
			config_file: Some("config.toml".to_owned()),
			logging: Default::default(),
			database: Default::default(),
			extra: Self::default(),
		}
	}

	fn pre_hook(_config: &mut AppConfig<Self>) -> anyhow::Result<()> {
		Ok(())
	}
}

impl<T: ConfigExtention> Default for AppConfig<T> {
	fn default() -> Self {
		T::config_default()
	}
}

impl<T: ConfigExtention> AppConfig<T> {
	/// Layers the defaults, the config file and the environment, lowest
	/// priority first.
	///
	/// A missing file is only an error when it was asked for explicitly
	/// through `{ENV_PREFIX}CONFIG_FILE`.
	pub fn figment() -> anyhow::Result<(Figment, Option<String>)> {
		let defaults = Self::default();

		let explicit_file = std::env::var(format!("{}CONFIG_FILE", T::ENV_PREFIX)).ok();
		let config_file = match (explicit_file, defaults.config_file.clone()) {
			(Some(file), _) => {
				anyhow::ensure!(Path::new(&file).exists(), "config file not found: {file}");
				Some(file)
			}
			(None, Some(file)) if Path::new(&file).exists() => Some(file),
			_ => None,
		};

		let mut figment = Figment::from(Serialized::defaults(defaults));

		if let Some(file) = &config_file {
			figment = figment.merge(Toml::file(file));
		}

		let figment = figment
			.merge(Env::raw().only(&["DATABASE_URL"]).map(|_| "database.uri".into()))
			.merge(Env::prefixed(T::ENV_PREFIX).split("__"));

		Ok((figment, config_file))
	}
}

impl<T: ConfigExtention> Config for AppConfig<T> {
	fn logging(&self) -> &LoggingConfig {
		&self.logging
	}

	fn parse() -> anyhow::Result<Self>
	where
		Self: Sized,
	{
		// A missing .env file is fine.
		let _ = dotenvy::dotenv();

		let (figment, config_file) = Self::figment()?;

		let mut config: Self = figment.extract().context("failed to extract config")?;
		config.config_file = config_file;

		Ok(config)
	}

	fn name(&self) -> &str {
		&self.name
	}

	fn pre_hook(&mut self) -> anyhow::Result<()> {
		T::pre_hook(self)
	}
}
