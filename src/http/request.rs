//! Request and response descriptions exchanged with [`HttpTransport`](crate::http::HttpTransport).

// crates.io
use serde::de::DeserializeOwned;
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::{ConfigError, DecodeError},
};

/// HTTP verbs supported by the storefront API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `PATCH`
	Patch,
	/// `DELETE`
	Delete,
}
impl Method {
	/// Returns the canonical uppercase verb.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Optional per-request transport settings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestConfig {
	/// Extra headers; these override configured defaults with the same name.
	pub headers: BTreeMap<String, String>,
	/// Query pairs appended to the resolved URL.
	pub query: Vec<(String, String)>,
	/// Timeout override for this request only.
	pub timeout: Option<Duration>,
}
impl RequestConfig {
	/// Adds or replaces a header.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}

	/// Appends a query pair.
	pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((key.into(), value.into()));

		self
	}

	/// Overrides the timeout for this request.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}
}

/// Description of one outbound API call.
///
/// The attempt counter travels with the description: [`ApiRequest::retried`] yields a new value
/// with the counter bumped, and the coordinator refuses to recover a request whose counter is
/// already non-zero.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP verb.
	pub method: Method,
	/// Path relative to the configured base URL (or an absolute URL).
	pub path: String,
	/// JSON body, if any.
	pub body: Option<Value>,
	/// Per-request transport settings.
	pub config: RequestConfig,
	/// Bearer credential attached to the request.
	pub bearer: Option<TokenSecret>,
	attempt: u8,
}
impl ApiRequest {
	/// Creates a body-less request.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			body: None,
			config: RequestConfig::default(),
			bearer: None,
			attempt: 0,
		}
	}

	/// Serializes `payload` as the JSON body.
	pub fn json<P>(mut self, payload: &P) -> Result<Self>
	where
		P: ?Sized + Serialize,
	{
		self.body = Some(serde_json::to_value(payload).map_err(ConfigError::request_body)?);

		Ok(self)
	}

	/// Uses a pre-built JSON value as the body.
	pub fn with_body(mut self, body: Value) -> Self {
		self.body = Some(body);

		self
	}

	/// Replaces the per-request transport settings.
	pub fn with_config(mut self, config: RequestConfig) -> Self {
		self.config = config;

		self
	}

	/// Replaces the bearer credential.
	pub fn with_bearer(mut self, bearer: Option<TokenSecret>) -> Self {
		self.bearer = bearer;

		self
	}

	/// Number of times this request has already been replayed.
	pub fn attempt(&self) -> u8 {
		self.attempt
	}

	/// Returns `true` once the request has been replayed.
	pub fn is_retry(&self) -> bool {
		self.attempt > 0
	}

	/// Returns a copy carrying `bearer` with the attempt counter incremented.
	pub fn retried(&self, bearer: TokenSecret) -> Self {
		Self { bearer: Some(bearer), attempt: self.attempt.saturating_add(1), ..self.clone() }
	}
}

/// Successful response returned by a transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
	/// HTTP status code (always 2xx).
	pub status: u16,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Decodes the body as JSON; an empty body decodes as `null`.
	pub fn decode<R>(&self, endpoint: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		let bytes: &[u8] = if self.body.iter().all(u8::is_ascii_whitespace) {
			b"null"
		} else {
			&self.body
		};
		let mut de = serde_json::Deserializer::from_slice(bytes);

		serde_path_to_error::deserialize(&mut de).map_err(|source| {
			DecodeError::Payload {
				endpoint: endpoint.to_owned(),
				status: self.status,
				source: Arc::new(source),
			}
			.into()
		})
	}
}
