//! Thread-safe in-memory [`SessionStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::Session,
	store::{SessionStore, StoreError, StoreFuture},
};

type SessionSlot = Arc<RwLock<Option<Session>>>;

/// Storage backend that keeps the session in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(SessionSlot);
impl MemoryStore {
	/// Creates a store seeded with `session`.
	pub fn with_session(session: Session) -> Self {
		Self(Arc::new(RwLock::new(Some(session))))
	}

	/// Returns a copy of the stored session without going through the async contract.
	pub fn snapshot(&self) -> Option<Session> {
		self.0.read().clone()
	}

	fn replace_now(slot: &SessionSlot, session: Option<Session>) -> Result<(), StoreError> {
		*slot.write() = session;

		Ok(())
	}
}
impl SessionStore for MemoryStore {
	fn read(&self) -> StoreFuture<'_, Option<Session>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.read().clone()) })
	}

	fn write(&self, session: Session) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move { Self::replace_now(&slot, Some(session)) })
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move { Self::replace_now(&slot, None) })
	}
}
