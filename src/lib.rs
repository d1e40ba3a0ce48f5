//! Authenticated storefront HTTP client: bearer credentials on every call, a single shared token
//! refresh no matter how many requests hit 401 at once, and a clean logout when refresh fails.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod backend;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod http;
pub mod obs;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		backend::HttpAuthBackend,
		config::ClientConfig,
		coordinator::ReqwestAuthClient,
		http::ReqwestTransport,
		store::{MemoryStore, SessionStore},
	};

	/// Builds a reqwest transport pointed at `base_url` with default settings.
	pub fn test_reqwest_transport(base_url: &str) -> ReqwestTransport {
		let config = ClientConfig::builder(
			Url::parse(base_url).expect("Test base URL should parse successfully."),
		)
		.build()
		.expect("Test client configuration should validate.");

		ReqwestTransport::new(config).expect("Failed to build Reqwest transport for tests.")
	}

	/// Constructs a [`ReqwestAuthClient`] backed by an in-memory store and the reqwest transport
	/// used across integration tests.
	pub fn build_reqwest_test_client(base_url: &str) -> (ReqwestAuthClient, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn SessionStore> = store_backend.clone();
		let transport = Arc::new(test_reqwest_transport(base_url));
		let backend =
			HttpAuthBackend::<ReqwestTransport>::new(transport.clone(), transport.config());
		let client = ReqwestAuthClient::with_transport(store, transport, backend);

		(client, store_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
