//! Persisted session credentials and the auth backend's grant payload.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Identity of the signed-in shopper, kept for display purposes only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
	/// Backend user identifier.
	pub id: String,
	/// Account email address.
	pub email: String,
	/// Account phone number.
	pub phone: String,
}

/// Credential pair issued by the auth backend on sign-in or refresh.
///
/// Mirrors the backend's JSON payload (`access_token`, `refresh_token`, `user`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionGrant {
	/// Short-lived access token attached to API calls.
	pub access_token: TokenSecret,
	/// Longer-lived token used solely to obtain a new access token.
	pub refresh_token: TokenSecret,
	/// Profile of the authenticated user.
	pub user: UserProfile,
}

/// Session credential persisted in a [`SessionStore`](crate::store::SessionStore).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
	/// Access token attached as a bearer credential.
	pub access_token: TokenSecret,
	/// Refresh token presented to the auth backend on 401.
	pub refresh_token: TokenSecret,
	/// Profile of the authenticated user.
	pub user: UserProfile,
	/// Instant of the sign-in or refresh that produced the credentials.
	#[serde(default = "time::OffsetDateTime::now_utc")]
	pub updated_at: OffsetDateTime,
}
impl Session {
	/// Creates a session stamped with the current clock.
	pub fn new(
		access_token: impl Into<TokenSecret>,
		refresh_token: impl Into<TokenSecret>,
		user: UserProfile,
	) -> Self {
		Self {
			access_token: access_token.into(),
			refresh_token: refresh_token.into(),
			user,
			updated_at: OffsetDateTime::now_utc(),
		}
	}

	/// Swaps in the credential pair from a refresh grant.
	///
	/// The stored profile is kept; only the tokens and the timestamp change.
	pub fn rotate(self, grant: SessionGrant) -> Self {
		Self {
			access_token: grant.access_token,
			refresh_token: grant.refresh_token,
			user: self.user,
			updated_at: OffsetDateTime::now_utc(),
		}
	}
}
impl From<SessionGrant> for Session {
	fn from(grant: SessionGrant) -> Self {
		Self::new(grant.access_token, grant.refresh_token, grant.user)
	}
}
