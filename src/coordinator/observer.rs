//! Session-termination signal fired when a refresh cannot be recovered.

/// Receives the session-termination signal (e.g. navigate back to the signed-out view).
///
/// Called exactly once per failed refresh cycle, after the stored session is cleared and every
/// parked caller has been rejected. Closures implement the trait directly.
pub trait SessionObserver
where
	Self: Send + Sync,
{
	/// Signals that the session is gone and the user must sign in again.
	fn session_terminated(&self);
}
impl<F> SessionObserver for F
where
	F: Fn() + Send + Sync,
{
	fn session_terminated(&self) {
		self()
	}
}

/// Observer that ignores the termination signal.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;
impl SessionObserver for NoopObserver {
	fn session_terminated(&self) {}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;
	use crate::_prelude::*;

	#[test]
	fn closures_act_as_observers() {
		let fired = Arc::new(AtomicUsize::new(0));
		let observer: Arc<dyn SessionObserver> = {
			let fired = fired.clone();

			Arc::new(move || {
				fired.fetch_add(1, Ordering::SeqCst);
			})
		};

		observer.session_terminated();

		assert_eq!(fired.load(Ordering::SeqCst), 1);
	}
}
