// crates.io
use time::macros;
// self
use storefront_auth::{
	auth::{Session, SessionGrant, UserProfile},
	store::{MemoryStore, SessionStore},
};

fn make_profile() -> UserProfile {
	UserProfile {
		id: "u-123".into(),
		email: "shopper@example.com".into(),
		phone: "555-0123".into(),
	}
}

fn build_session(access: &str, refresh: &str) -> Session {
	Session {
		updated_at: macros::datetime!(2025-11-10 12:00 UTC),
		..Session::new(access, refresh, make_profile())
	}
}

#[tokio::test]
async fn save_and_fetch_round_trip() {
	let store = MemoryStore::default();

	assert!(store.read().await.expect("Reading an empty store should succeed.").is_none());

	store
		.write(build_session("access-1", "refresh-1"))
		.await
		.expect("Failed to save session into the memory store.");

	let fetched = store
		.read()
		.await
		.expect("Failed to read session from the memory store.")
		.expect("Memory store lost the saved session.");

	assert_eq!(fetched, build_session("access-1", "refresh-1"));
}

#[tokio::test]
async fn rotation_replaces_tokens_but_keeps_profile() {
	let store = MemoryStore::with_session(build_session("access-1", "refresh-1"));
	let current = store.snapshot().expect("Seeded store should hold a session.");
	let grant = SessionGrant {
		access_token: "access-2".into(),
		refresh_token: "refresh-2".into(),
		user: UserProfile { id: "u-other".into(), ..make_profile() },
	};

	store.write(current.rotate(grant)).await.expect("Failed to persist rotated session.");

	let rotated = store.snapshot().expect("Rotated session should remain stored.");

	assert_eq!(rotated.access_token.expose(), "access-2");
	assert_eq!(rotated.refresh_token.expose(), "refresh-2");
	assert_eq!(rotated.user, make_profile());
}

#[tokio::test]
async fn clones_share_the_same_slot_and_clear_is_idempotent() {
	let store = MemoryStore::with_session(build_session("access-1", "refresh-1"));
	let view = store.clone();

	store.clear().await.expect("Clearing the memory store should succeed.");

	assert!(view.snapshot().is_none());

	view.clear().await.expect("Clearing an empty memory store should succeed.");

	assert!(store.read().await.expect("Reading a cleared store should succeed.").is_none());
}
