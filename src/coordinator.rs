//! Authenticated request coordinator with a single-flight token refresh.
//!
//! [`AuthClient`] attaches the stored access token to every request. When the backend answers
//! 401, the failing request takes a synchronous check-and-set on the client's
//! [`RefreshCoordinatorState`]:
//!
//! - the first caller owns the refresh, rotates the session through the [`AuthBackend`],
//!   persists it, releases every parked caller in FIFO order, and replays its own request;
//! - callers arriving while a refresh runs park a [`CompletionToken`] and replay their own
//!   request once the refresh hands them the new credential.
//!
//! A replayed request that fails again is surfaced as-is and never triggers another refresh.
//! When the refresh fails, the session is cleared, every parked caller is rejected with the same
//! error, and the [`SessionObserver`] fires once.

mod metrics;
pub mod observer;
pub mod state;

pub use metrics::RefreshMetrics;
pub use observer::*;
pub use state::{CompletionToken, RefreshCoordinatorState, RefreshSnapshot, Waiter};

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{Session, TokenSecret, UserProfile},
	backend::AuthBackend,
	error::SessionError,
	http::{ApiRequest, ApiResponse, HttpTransport, Method, RequestConfig},
	obs::{self, RefreshOutcome, RefreshSpan},
	store::SessionStore,
};
#[cfg(feature = "reqwest")]
use crate::{backend::HttpAuthBackend, config::ClientConfig, http::ReqwestTransport};
use state::{Admission, RefreshCycle};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestAuthClient = AuthClient<ReqwestTransport, HttpAuthBackend<ReqwestTransport>>;

/// HTTP client that attaches session credentials and recovers from expired access tokens.
///
/// Each instance owns its own refresh gate, so independent clients (or tests) never share
/// refresh state. Clones share the gate, the store, and the metrics.
pub struct AuthClient<T, B>
where
	T: ?Sized + HttpTransport,
	B: ?Sized + AuthBackend,
{
	/// Transport used for every API request and replay.
	pub transport: Arc<T>,
	/// Auth backend that issues refreshed credentials.
	pub backend: Arc<B>,
	/// Session store holding the current credential.
	pub store: Arc<dyn SessionStore>,
	/// Receiver of the session-termination signal.
	pub observer: Arc<dyn SessionObserver>,
	/// Shared counters for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	state: Arc<Mutex<RefreshCoordinatorState>>,
}
impl<T, B> AuthClient<T, B>
where
	T: ?Sized + HttpTransport,
	B: ?Sized + AuthBackend,
{
	/// Creates a client from caller-provided transport and backend handles.
	///
	/// The session-termination signal defaults to [`NoopObserver`]; see
	/// [`AuthClient::with_observer`].
	pub fn with_transport(
		store: Arc<dyn SessionStore>,
		transport: impl Into<Arc<T>>,
		backend: impl Into<Arc<B>>,
	) -> Self {
		Self {
			transport: transport.into(),
			backend: backend.into(),
			store,
			observer: Arc::new(NoopObserver),
			refresh_metrics: Default::default(),
			state: Default::default(),
		}
	}

	/// Sets the receiver of the session-termination signal.
	pub fn with_observer(mut self, observer: impl 'static + SessionObserver) -> Self {
		self.observer = Arc::new(observer);

		self
	}

	/// Returns the refresh counters.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.refresh_metrics
	}

	/// Returns the current refresh flag and number of parked callers.
	pub fn refresh_state(&self) -> RefreshSnapshot {
		self.state.lock().snapshot()
	}

	/// Issues a `GET` and decodes the JSON payload.
	pub async fn get<R>(&self, path: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.get_with(path, RequestConfig::default()).await
	}

	/// Issues a `GET` with per-request transport settings.
	pub async fn get_with<R>(&self, path: &str, config: RequestConfig) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.send(ApiRequest::new(Method::Get, path).with_config(config)).await
	}

	/// Issues a `POST` with a JSON body and decodes the JSON payload.
	pub async fn post<R, P>(&self, path: &str, payload: &P) -> Result<R>
	where
		R: DeserializeOwned,
		P: ?Sized + Serialize,
	{
		self.post_with(path, payload, RequestConfig::default()).await
	}

	/// Issues a `POST` with a JSON body and per-request transport settings.
	pub async fn post_with<R, P>(
		&self,
		path: &str,
		payload: &P,
		config: RequestConfig,
	) -> Result<R>
	where
		R: DeserializeOwned,
		P: ?Sized + Serialize,
	{
		self.send_json(Method::Post, path, payload, config).await
	}

	/// Issues a `PUT` with a JSON body and decodes the JSON payload.
	pub async fn put<R, P>(&self, path: &str, payload: &P) -> Result<R>
	where
		R: DeserializeOwned,
		P: ?Sized + Serialize,
	{
		self.put_with(path, payload, RequestConfig::default()).await
	}

	/// Issues a `PUT` with a JSON body and per-request transport settings.
	pub async fn put_with<R, P>(
		&self,
		path: &str,
		payload: &P,
		config: RequestConfig,
	) -> Result<R>
	where
		R: DeserializeOwned,
		P: ?Sized + Serialize,
	{
		self.send_json(Method::Put, path, payload, config).await
	}

	/// Issues a `PATCH` with a JSON body and decodes the JSON payload.
	pub async fn patch<R, P>(&self, path: &str, payload: &P) -> Result<R>
	where
		R: DeserializeOwned,
		P: ?Sized + Serialize,
	{
		self.patch_with(path, payload, RequestConfig::default()).await
	}

	/// Issues a `PATCH` with a JSON body and per-request transport settings.
	pub async fn patch_with<R, P>(
		&self,
		path: &str,
		payload: &P,
		config: RequestConfig,
	) -> Result<R>
	where
		R: DeserializeOwned,
		P: ?Sized + Serialize,
	{
		self.send_json(Method::Patch, path, payload, config).await
	}

	/// Issues a `DELETE` and decodes the JSON payload.
	pub async fn delete<R>(&self, path: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.delete_with(path, RequestConfig::default()).await
	}

	/// Issues a `DELETE` with per-request transport settings.
	pub async fn delete_with<R>(&self, path: &str, config: RequestConfig) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.send(ApiRequest::new(Method::Delete, path).with_config(config)).await
	}

	/// Issues a `DELETE` carrying a JSON body and decodes the JSON payload.
	pub async fn delete_json<R, P>(&self, path: &str, payload: &P) -> Result<R>
	where
		R: DeserializeOwned,
		P: ?Sized + Serialize,
	{
		self.send_json(Method::Delete, path, payload, RequestConfig::default()).await
	}

	/// Executes a fully described request and decodes the JSON payload.
	pub async fn send<R>(&self, request: ApiRequest) -> Result<R>
	where
		R: DeserializeOwned,
	{
		let endpoint = request.path.clone();

		self.execute(request).await?.decode(&endpoint)
	}

	/// Executes a request with the stored credential attached, recovering once from a 401.
	///
	/// Any bearer already set on `request` is replaced by the stored access token; without a
	/// stored session the request goes out unauthenticated.
	pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
		let bearer = self.store.read().await?.map(|session| session.access_token);
		let request = request.with_bearer(bearer);
		let outcome = self.transport.send(&request).await;

		match outcome {
			Err(error) if error.is_unauthorized() => self.recover(request, error).await,
			outcome => outcome,
		}
	}

	/// Signs in through the auth backend and persists the resulting session.
	pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
		let grant = self.backend.sign_in(email, password).await?;
		let session = Session::from(grant);

		self.store.write(session.clone()).await?;

		Ok(session)
	}

	/// Clears the stored session without firing the termination signal.
	pub async fn sign_out(&self) -> Result<()> {
		self.store.clear().await?;

		Ok(())
	}

	/// Returns `true` while a session is stored.
	pub async fn is_authenticated(&self) -> Result<bool> {
		Ok(self.store.read().await?.is_some())
	}

	/// Returns a display copy of the signed-in user's profile.
	pub async fn current_user(&self) -> Result<Option<UserProfile>> {
		Ok(self.store.read().await?.map(|session| session.user))
	}

	async fn send_json<R, P>(
		&self,
		method: Method,
		path: &str,
		payload: &P,
		config: RequestConfig,
	) -> Result<R>
	where
		R: DeserializeOwned,
		P: ?Sized + Serialize,
	{
		self.send(ApiRequest::new(method, path).json(payload)?.with_config(config)).await
	}

	async fn recover(&self, request: ApiRequest, error: Error) -> Result<ApiResponse> {
		if request.is_retry() {
			return Err(error);
		}

		// The guard is released before any suspension point.
		let admission = self.state.lock().admit();
		let access_token = match admission {
			Admission::Park(waiter) => {
				self.refresh_metrics.record_parked();
				obs::record_refresh_outcome(RefreshOutcome::Parked);
				obs::trace_refresh_event(RefreshOutcome::Parked, 0, None);

				waiter.wait().await?
			},
			Admission::Refresh => self.refresh(RefreshCycle::begin(self.state.clone())).await?,
		};
		let replay = request.retried(access_token);

		// A replay that fails again (401 included) is terminal.
		RefreshSpan::new("replay").instrument(self.transport.send(&replay)).await
	}

	async fn refresh(&self, cycle: RefreshCycle) -> Result<TokenSecret> {
		let span = RefreshSpan::new("refresh");

		span.instrument(async move {
			self.refresh_metrics.record_attempt();
			obs::record_refresh_outcome(RefreshOutcome::Attempt);
			obs::trace_refresh_event(RefreshOutcome::Attempt, 0, None);

			match self.rotate().await {
				Ok(session) => {
					let released = cycle.succeed(&session.access_token);

					self.refresh_metrics.record_success();
					obs::record_refresh_outcome(RefreshOutcome::Success);
					obs::trace_refresh_event(RefreshOutcome::Success, released, None);

					Ok(session.access_token)
				},
				Err(error) => {
					self.terminate(cycle, &error).await;

					Err(error)
				},
			}
		})
		.await
	}

	async fn rotate(&self) -> Result<Session> {
		let current = self
			.store
			.read()
			.await?
			.filter(|session| !session.refresh_token.is_empty())
			.ok_or(SessionError::MissingRefreshToken)?;
		let grant = self.backend.refresh(&current.refresh_token).await?;
		let session = current.rotate(grant);

		RefreshSpan::new("persist").instrument(self.store.write(session.clone())).await?;

		Ok(session)
	}

	async fn terminate(&self, cycle: RefreshCycle, error: &Error) {
		if let Err(clear_error) = self.store.clear().await {
			obs::trace_refresh_event(RefreshOutcome::Failure, 0, Some(&Error::from(clear_error)));
		}

		let rejected = cycle.fail(error);

		self.refresh_metrics.record_failure();
		obs::record_refresh_outcome(RefreshOutcome::Failure);
		obs::trace_refresh_event(RefreshOutcome::Failure, rejected, Some(error));
		self.observer.session_terminated();
	}
}
#[cfg(feature = "reqwest")]
impl AuthClient<ReqwestTransport, HttpAuthBackend<ReqwestTransport>> {
	/// Creates a client backed by reqwest for both API calls and the auth backend.
	pub fn new(config: ClientConfig, store: Arc<dyn SessionStore>) -> Result<Self> {
		let transport = Arc::new(ReqwestTransport::new(config)?);
		let backend =
			HttpAuthBackend::<ReqwestTransport>::new(transport.clone(), transport.config());

		Ok(Self::with_transport(store, transport, backend))
	}
}
impl<T, B> Clone for AuthClient<T, B>
where
	T: ?Sized + HttpTransport,
	B: ?Sized + AuthBackend,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			backend: self.backend.clone(),
			store: self.store.clone(),
			observer: self.observer.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			state: self.state.clone(),
		}
	}
}
impl<T, B> Debug for AuthClient<T, B>
where
	T: ?Sized + HttpTransport,
	B: ?Sized + AuthBackend,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthClient")
			.field("refresh_state", &self.refresh_state())
			.field("refresh_metrics", &self.refresh_metrics)
			.finish()
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// crates.io
	use httpmock::prelude::*;
	use serde_json::{Value, json};
	// self
	use crate::_preludet::*;

	#[tokio::test]
	async fn sign_in_persists_session_and_authorizes_requests() {
		let server = MockServer::start_async().await;
		let sign_in = server
			.mock_async(|when, then| {
				when.method(POST)
					.path("/auth/signin")
					.json_body(json!({ "email": "shopper@example.com", "password": "hunter2" }));
				then.status(200).json_body(json!({
					"access_token": "A1",
					"refresh_token": "R1",
					"user": { "id": "u-1", "email": "shopper@example.com", "phone": "555-0100" },
				}));
			})
			.await;
		let cart = server
			.mock_async(|when, then| {
				when.method(GET).path("/cart").header("authorization", "Bearer A1");
				then.status(200).json_body(json!({ "items": [] }));
			})
			.await;
		let (client, store) = build_reqwest_test_client(&server.base_url());
		let session = client
			.sign_in("shopper@example.com", "hunter2")
			.await
			.expect("Sign-in should succeed.");

		assert_eq!(session.user.id, "u-1");
		assert_eq!(store.snapshot().as_ref(), Some(&session));

		let body: Value = client.get("/cart").await.expect("Authorized request should succeed.");

		sign_in.assert_async().await;
		cart.assert_async().await;

		assert_eq!(body["items"], json!([]));

		client.sign_out().await.expect("Sign-out should succeed.");

		assert!(store.snapshot().is_none());
		assert!(!client.is_authenticated().await.expect("Store read should succeed."));
	}
}
