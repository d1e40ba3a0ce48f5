//! Transport primitives for storefront API calls.
//!
//! The module exposes [`HttpTransport`] alongside the [`ApiRequest`]/[`ApiResponse`] pair so
//! downstream crates can plug in their own HTTP stack. Implementations must surface non-2xx
//! responses as [`Error::Api`] with the HTTP status attached; the refresh coordinator keys its
//! 401 handling off that status.

pub mod request;

pub use request::*;

// self
use crate::_prelude::*;
#[cfg(feature = "reqwest")]
use crate::{
	config::ClientConfig,
	error::{ConfigError, TransportError},
};

/// Boxed future returned by [`HttpTransport::send`].
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<ApiResponse>> + 'a + Send>>;

/// Abstraction over HTTP stacks able to execute storefront API calls.
///
/// Implementations are shared behind `Arc` by the client and the auth backend, so they must be
/// `Send + Sync + 'static`, and the futures they return must be `Send`.
///
/// # Contract
///
/// - Attach `request.bearer` as an `Authorization: Bearer` header when present.
/// - Resolve 2xx responses to [`ApiResponse`].
/// - Fail every other status with [`Error::Api`] carrying the status and body.
/// - Fail network errors and timeouts with [`Error::Transport`].
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes a single request without any retry or recovery.
	fn send<'a>(&'a self, request: &'a ApiRequest) -> TransportFuture<'a>;
}

/// Reqwest-backed transport resolving request paths against a [`ClientConfig`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
	client: ReqwestClient,
	config: Arc<ClientConfig>,
}
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a transport with a fresh reqwest client.
	pub fn new(config: ClientConfig) -> Result<Self> {
		let client = ReqwestClient::builder().build().map_err(ConfigError::from)?;

		Ok(Self::with_client(client, config))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient, config: ClientConfig) -> Self {
		Self { client, config: Arc::new(config) }
	}

	/// Returns the configuration the transport resolves requests against.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	fn build(&self, request: &ApiRequest) -> Result<reqwest::RequestBuilder> {
		let url = self.config.resolve(&request.path)?;
		let timeout = request.config.timeout.unwrap_or(self.config.timeout);
		let mut builder =
			self.client.request(map_method(request.method), url).timeout(timeout.unsigned_abs());

		for (name, value) in self.config.default_headers.iter().chain(request.config.headers.iter())
		{
			builder = builder.header(name.as_str(), value.as_str());
		}

		if !request.config.query.is_empty() {
			builder = builder.query(&request.config.query);
		}
		if let Some(token) = request.bearer.as_ref() {
			builder = builder.bearer_auth(token.expose());
		}
		if let Some(body) = request.body.as_ref() {
			builder = builder.body(serde_json::to_vec(body).map_err(ConfigError::request_body)?);
		}

		Ok(builder)
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn send<'a>(&'a self, request: &'a ApiRequest) -> TransportFuture<'a> {
		Box::pin(async move {
			let response = self.build(request)?.send().await.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			if (200..300).contains(&status) {
				Ok(ApiResponse { status, body })
			} else {
				Err(Error::Api { status, body: String::from_utf8_lossy(&body).into_owned() })
			}
		})
	}
}

#[cfg(feature = "reqwest")]
fn map_method(method: Method) -> reqwest::Method {
	match method {
		Method::Get => reqwest::Method::GET,
		Method::Post => reqwest::Method::POST,
		Method::Put => reqwest::Method::PUT,
		Method::Patch => reqwest::Method::PATCH,
		Method::Delete => reqwest::Method::DELETE,
	}
}
