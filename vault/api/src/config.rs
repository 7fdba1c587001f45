use std::net::{Ipv4Addr, SocketAddr};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ApiConfig {
	/// Bind address for the HTTP server
	pub bind_address: SocketAddr,

	/// Comma separated list of origins allowed by CORS
	pub cors_origins: String,

	/// Title shown on the index banner
	pub title: String,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			bind_address: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8000)),
			cors_origins: "http://localhost:3000".to_string(),
			title: "Prompt Vault API".to_string(),
		}
	}
}

impl ApiConfig {
	pub fn cors_origins(&self) -> Vec<String> {
		self.cors_origins
			.split(',')
			.map(str::trim)
			.filter(|origin| !origin.is_empty())
			.map(String::from)
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_cors_origins_split() {
		let config = ApiConfig {
			cors_origins: " http://localhost:3000, https://vault.example.com ,,".to_string(),
			..Default::default()
		};

		assert_eq!(
			config.cors_origins(),
			vec!["http://localhost:3000".to_string(), "https://vault.example.com".to_string()]
		);
	}

	#[test]
	fn test_defaults() {
		let config = ApiConfig::default();
		assert_eq!(config.bind_address.to_string(), "0.0.0.0:8000");
		assert_eq!(config.cors_origins(), vec!["http://localhost:3000".to_string()]);
	}
}
