//! Auth backend contract plus the HTTP implementation used by the storefront.

// self
use crate::{
	_prelude::*,
	auth::{SessionGrant, TokenSecret},
	config::ClientConfig,
	http::{ApiRequest, HttpTransport, Method},
};

/// Boxed future returned by [`AuthBackend`] operations.
pub type BackendFuture<'a> = Pin<Box<dyn Future<Output = Result<SessionGrant>> + 'a + Send>>;

/// Remote authority that issues session grants.
///
/// The refresh coordinator treats any error returned by [`AuthBackend::refresh`] as an
/// unrecoverable refresh failure.
pub trait AuthBackend
where
	Self: 'static + Send + Sync,
{
	/// Exchanges a refresh token for a new credential pair.
	fn refresh<'a>(&'a self, refresh_token: &'a TokenSecret) -> BackendFuture<'a>;

	/// Exchanges account credentials for a new credential pair.
	fn sign_in<'a>(&'a self, email: &'a str, password: &'a str) -> BackendFuture<'a>;
}

#[derive(Serialize)]
struct RefreshBody<'a> {
	refresh_token: &'a str,
}

#[derive(Serialize)]
struct SignInBody<'a> {
	email: &'a str,
	password: &'a str,
}

/// [`AuthBackend`] speaking the storefront's JSON auth endpoints over an unauthenticated transport.
pub struct HttpAuthBackend<T>
where
	T: ?Sized + HttpTransport,
{
	transport: Arc<T>,
	refresh_path: String,
	sign_in_path: String,
}
impl<T> HttpAuthBackend<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a backend that posts to the endpoint paths declared in `config`.
	pub fn new(transport: impl Into<Arc<T>>, config: &ClientConfig) -> Self {
		Self {
			transport: transport.into(),
			refresh_path: config.refresh_path.clone(),
			sign_in_path: config.sign_in_path.clone(),
		}
	}

	async fn exchange<P>(&self, path: &str, payload: &P) -> Result<SessionGrant>
	where
		P: Sync + Serialize,
	{
		let request = ApiRequest::new(Method::Post, path).json(payload)?;
		let response = self.transport.send(&request).await?;

		response.decode(path)
	}
}
impl<T> AuthBackend for HttpAuthBackend<T>
where
	T: ?Sized + HttpTransport,
{
	fn refresh<'a>(&'a self, refresh_token: &'a TokenSecret) -> BackendFuture<'a> {
		Box::pin(async move {
			let body = RefreshBody { refresh_token: refresh_token.expose() };

			self.exchange(&self.refresh_path, &body).await
		})
	}

	fn sign_in<'a>(&'a self, email: &'a str, password: &'a str) -> BackendFuture<'a> {
		Box::pin(async move {
			let body = SignInBody { email, password };

			self.exchange(&self.sign_in_path, &body).await
		})
	}
}
impl<T> Debug for HttpAuthBackend<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("HttpAuthBackend")
			.field("refresh_path", &self.refresh_path)
			.field("sign_in_path", &self.sign_in_path)
			.finish()
	}
}
