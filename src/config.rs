//! Validated client configuration shared by the transport and the auth backend.

// self
use crate::{_prelude::*, error::ConfigError};

/// Errors raised while constructing or validating a [`ClientConfig`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ClientConfigError {
	/// Base URL must use HTTP or HTTPS.
	#[error("The base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Base URL that failed validation.
		url: String,
	},
	/// Base URL cannot carry a query string or fragment.
	#[error("The base URL must not carry a query or fragment: {url}.")]
	BaseUrlNotPrefix {
		/// Base URL that failed validation.
		url: String,
	},
	/// Request timeout must be strictly positive.
	#[error("The request timeout must be positive.")]
	NonPositiveTimeout,
	/// Auth endpoint paths must be absolute.
	#[error("The {endpoint} path must start with `/`: {path}.")]
	RelativeEndpointPath {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Path that failed validation.
		path: String,
	},
	/// Default header names must be valid HTTP tokens.
	#[error("Default header name `{name}` is invalid.")]
	InvalidHeaderName {
		/// Header name that failed validation.
		name: String,
	},
}

/// Immutable configuration consumed by transports and the auth backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
	/// Base URL every relative request path is appended to.
	pub base_url: Url,
	/// Default per-request timeout.
	pub timeout: Duration,
	/// Path of the auth backend's refresh endpoint.
	pub refresh_path: String,
	/// Path of the auth backend's sign-in endpoint.
	pub sign_in_path: String,
	/// Headers attached to every request.
	pub default_headers: BTreeMap<String, String>,
}
impl ClientConfig {
	/// Default per-request timeout.
	pub const DEFAULT_TIMEOUT: Duration = Duration::seconds(10);
	/// Default refresh endpoint path.
	pub const DEFAULT_REFRESH_PATH: &'static str = "/auth/refresh";
	/// Default sign-in endpoint path.
	pub const DEFAULT_SIGN_IN_PATH: &'static str = "/auth/signin";

	/// Creates a new builder for the provided base URL.
	pub fn builder(base_url: Url) -> ClientConfigBuilder {
		ClientConfigBuilder::new(base_url)
	}

	/// Resolves a request path to an absolute URL.
	///
	/// Absolute `http(s)://` paths are used as-is; everything else is appended to the base URL.
	pub fn resolve(&self, path: &str) -> Result<Url, ConfigError> {
		let raw = if path.starts_with("http://") || path.starts_with("https://") {
			path.to_owned()
		} else {
			let base = self.base_url.as_str().trim_end_matches('/');

			if path.starts_with('/') { format!("{base}{path}") } else { format!("{base}/{path}") }
		};

		Url::parse(&raw)
			.map_err(|source| ConfigError::InvalidPath { path: path.to_owned(), source })
	}

	fn validate(&self) -> Result<(), ClientConfigError> {
		if !matches!(self.base_url.scheme(), "http" | "https") {
			return Err(ClientConfigError::UnsupportedScheme { url: self.base_url.to_string() });
		}
		if self.base_url.query().is_some() || self.base_url.fragment().is_some() {
			return Err(ClientConfigError::BaseUrlNotPrefix { url: self.base_url.to_string() });
		}
		if !self.timeout.is_positive() {
			return Err(ClientConfigError::NonPositiveTimeout);
		}

		validate_endpoint_path("refresh", &self.refresh_path)?;
		validate_endpoint_path("sign-in", &self.sign_in_path)?;

		for name in self.default_headers.keys() {
			validate_header_name(name)?;
		}

		Ok(())
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// Base URL every relative request path is appended to.
	pub base_url: Url,
	/// Default per-request timeout.
	pub timeout: Duration,
	/// Path of the auth backend's refresh endpoint.
	pub refresh_path: String,
	/// Path of the auth backend's sign-in endpoint.
	pub sign_in_path: String,
	/// Headers attached to every request.
	pub default_headers: BTreeMap<String, String>,
}
impl ClientConfigBuilder {
	/// Creates a new builder seeded with defaults and the provided base URL.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			timeout: ClientConfig::DEFAULT_TIMEOUT,
			refresh_path: ClientConfig::DEFAULT_REFRESH_PATH.into(),
			sign_in_path: ClientConfig::DEFAULT_SIGN_IN_PATH.into(),
			default_headers: BTreeMap::from([(
				"Content-Type".to_owned(),
				"application/json".to_owned(),
			)]),
		}
	}

	/// Overrides the default per-request timeout.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Overrides the refresh endpoint path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Overrides the sign-in endpoint path.
	pub fn sign_in_path(mut self, path: impl Into<String>) -> Self {
		self.sign_in_path = path.into();

		self
	}

	/// Adds or replaces a default header.
	pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.default_headers.insert(name.into(), value.into());

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ClientConfigError> {
		let config = ClientConfig {
			base_url: self.base_url,
			timeout: self.timeout,
			refresh_path: self.refresh_path,
			sign_in_path: self.sign_in_path,
			default_headers: self.default_headers,
		};

		config.validate()?;

		Ok(config)
	}
}

fn validate_endpoint_path(endpoint: &'static str, path: &str) -> Result<(), ClientConfigError> {
	if path.starts_with('/') {
		Ok(())
	} else {
		Err(ClientConfigError::RelativeEndpointPath { endpoint, path: path.to_owned() })
	}
}

fn validate_header_name(name: &str) -> Result<(), ClientConfigError> {
	let valid = !name.is_empty()
		&& name.bytes().all(|b| b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&b));

	if valid { Ok(()) } else { Err(ClientConfigError::InvalidHeaderName { name: name.to_owned() }) }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Test URL should parse.")
	}

	#[test]
	fn builder_applies_storefront_defaults() {
		let config = ClientConfig::builder(url("https://shop.example.com"))
			.build()
			.expect("Default configuration should validate.");

		assert_eq!(config.timeout, Duration::seconds(10));
		assert_eq!(config.refresh_path, "/auth/refresh");
		assert_eq!(config.sign_in_path, "/auth/signin");
		assert_eq!(
			config.default_headers.get("Content-Type").map(String::as_str),
			Some("application/json")
		);
	}

	#[test]
	fn resolve_appends_paths_to_base_prefix() {
		let config = ClientConfig::builder(url("https://shop.example.com/api/"))
			.build()
			.expect("Prefixed base URL should validate.");

		assert_eq!(
			config.resolve("/cart/items").expect("Absolute path should resolve.").as_str(),
			"https://shop.example.com/api/cart/items"
		);
		assert_eq!(
			config.resolve("products?page=2").expect("Relative path should resolve.").as_str(),
			"https://shop.example.com/api/products?page=2"
		);
		assert_eq!(
			config
				.resolve("https://cdn.example.com/banner.json")
				.expect("Absolute URL should be used as-is.")
				.as_str(),
			"https://cdn.example.com/banner.json"
		);
	}

	#[test]
	fn build_rejects_invalid_settings() {
		let err = ClientConfig::builder(url("ftp://shop.example.com"))
			.build()
			.expect_err("Non-HTTP schemes must be rejected.");

		assert!(matches!(err, ClientConfigError::UnsupportedScheme { .. }));

		let err = ClientConfig::builder(url("https://shop.example.com/?tenant=1"))
			.build()
			.expect_err("Base URLs with a query must be rejected.");

		assert!(matches!(err, ClientConfigError::BaseUrlNotPrefix { .. }));

		let err = ClientConfig::builder(url("https://shop.example.com"))
			.timeout(Duration::ZERO)
			.build()
			.expect_err("A zero timeout must be rejected.");

		assert_eq!(err, ClientConfigError::NonPositiveTimeout);

		let err = ClientConfig::builder(url("https://shop.example.com"))
			.refresh_path("auth/refresh")
			.build()
			.expect_err("Relative refresh paths must be rejected.");

		assert!(matches!(err, ClientConfigError::RelativeEndpointPath { endpoint: "refresh", .. }));

		let err = ClientConfig::builder(url("https://shop.example.com"))
			.default_header("X Bad", "1")
			.build()
			.expect_err("Header names with whitespace must be rejected.");

		assert!(matches!(err, ClientConfigError::InvalidHeaderName { .. }));
	}
}
