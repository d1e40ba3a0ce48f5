//! Client-level error types shared across the transport, session store, and refresh coordinator.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Shared, clonable error source.
///
/// Sources are reference counted so a single refresh failure can be handed to every parked
/// caller without losing the underlying cause.
pub type SharedError = Arc<dyn StdError + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Clone, Debug, ThisError)]
pub enum Error {
	/// Session store failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration or request construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response payload could not be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Session could not be recovered.
	#[error(transparent)]
	Session(#[from] SessionError),

	/// Backend answered with a non-success HTTP status.
	#[error("Backend responded with HTTP {status}.")]
	Api {
		/// HTTP status code returned by the backend.
		status: u16,
		/// Raw response body, lossily decoded as UTF-8.
		body: String,
	},
}
impl Error {
	/// Returns the HTTP status attached to backend failures.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Api { status, .. } => Some(*status),
			Self::Decode(DecodeError::Payload { status, .. }) => Some(*status),
			_ => None,
		}
	}

	/// Returns `true` when the backend rejected the request credential (HTTP 401).
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Api { status: 401, .. })
	}
}

/// Configuration and request construction failures.
#[derive(Clone, Debug, ThisError)]
pub enum ConfigError {
	/// Client configuration failed validation.
	#[error(transparent)]
	Client(#[from] crate::config::ClientConfigError),
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: SharedError,
	},
	/// Request path cannot be resolved against the base URL.
	#[error("Request path `{path}` cannot be resolved against the base URL.")]
	InvalidPath {
		/// Offending request path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized to JSON.
	#[error("Request body could not be serialized.")]
	RequestBody {
		/// Underlying serialization failure.
		#[source]
		source: Arc<serde_json::Error>,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Arc::new(src) }
	}

	/// Wraps a request body serialization failure.
	pub fn request_body(src: serde_json::Error) -> Self {
		Self::RequestBody { source: Arc::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Clone, Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure or timed out.
	#[error("Network error occurred while calling the backend.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: SharedError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the backend.")]
	Io(#[source] Arc<std::io::Error>),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Arc::new(src) }
	}
}
impl From<std::io::Error> for TransportError {
	fn from(e: std::io::Error) -> Self {
		Self::Io(Arc::new(e))
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Payload decoding failures.
#[derive(Clone, Debug, ThisError)]
pub enum DecodeError {
	/// Response body is not the JSON shape the caller asked for.
	#[error("Response from `{endpoint}` is malformed at `{}`.", .source.path())]
	Payload {
		/// Request path that produced the payload.
		endpoint: String,
		/// HTTP status code of the response.
		status: u16,
		/// Structured parsing failure including the offending field path.
		#[source]
		source: Arc<serde_path_to_error::Error<serde_json::Error>>,
	},
}

/// Session recovery failures raised by the refresh coordinator.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum SessionError {
	/// No stored session carries a refresh token.
	#[error("No stored session carries a refresh token.")]
	MissingRefreshToken,
	/// The refreshing request was dropped before the refresh settled.
	#[error("Token refresh was abandoned before it settled.")]
	RefreshAbandoned,
}
