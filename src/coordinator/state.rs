//! Refresh gate: the in-flight flag, the FIFO queue of parked callers, and the cycle guard that
//! always returns the gate to quiescence.

// std
use std::{collections::VecDeque, mem};
// crates.io
use tokio::sync::oneshot;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::SessionError,
	obs::{self, RefreshOutcome},
};

type Completion = Result<TokenSecret>;

/// Snapshot of the refresh gate for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefreshSnapshot {
	/// Whether a refresh is currently running.
	pub in_flight: bool,
	/// Number of callers parked behind the running refresh.
	pub queued: usize,
}

/// One parked caller's deferred completion.
///
/// Settling consumes the token, so each continuation fires at most once.
#[derive(Debug)]
pub struct CompletionToken {
	ticket: u64,
	sender: oneshot::Sender<Completion>,
}
impl CompletionToken {
	/// Enqueue sequence number of the parked caller.
	pub fn ticket(&self) -> u64 {
		self.ticket
	}

	/// Releases the caller with the freshly issued access credential.
	pub fn resolve(self, access_token: TokenSecret) {
		// A dropped receiver means the caller went away; nothing to release.
		let _ = self.sender.send(Ok(access_token));
	}

	/// Fails the caller with the error that ended the refresh.
	pub fn reject(self, error: Error) {
		let _ = self.sender.send(Err(error));
	}
}

/// Receiving half held by a parked caller.
#[derive(Debug)]
pub struct Waiter {
	ticket: u64,
	receiver: oneshot::Receiver<Completion>,
}
impl Waiter {
	/// Enqueue sequence number shared with the matching [`CompletionToken`].
	pub fn ticket(&self) -> u64 {
		self.ticket
	}

	/// Suspends until the governing refresh settles.
	pub async fn wait(self) -> Result<TokenSecret> {
		match self.receiver.await {
			Ok(completion) => completion,
			Err(_) => Err(SessionError::RefreshAbandoned.into()),
		}
	}
}

/// Decision taken for a request that observed a 401.
#[derive(Debug)]
pub(crate) enum Admission {
	/// A refresh is running; park until it settles.
	Park(Waiter),
	/// The caller won the check-and-set and owns the refresh.
	Refresh,
}

/// Refresh gate owned by a single client instance.
///
/// Invariants: the queue is non-empty only while `in_flight` is set, and clearing the flag always
/// drains the queue in the same critical section.
#[derive(Debug, Default)]
pub struct RefreshCoordinatorState {
	in_flight: bool,
	queue: VecDeque<CompletionToken>,
	next_ticket: u64,
}
impl RefreshCoordinatorState {
	/// Returns the current flag and queue length.
	pub fn snapshot(&self) -> RefreshSnapshot {
		RefreshSnapshot { in_flight: self.in_flight, queued: self.queue.len() }
	}

	/// Synchronous check-and-set deciding whether a 401 refreshes or parks.
	pub(crate) fn admit(&mut self) -> Admission {
		if self.in_flight {
			return Admission::Park(self.park());
		}

		self.in_flight = true;

		Admission::Refresh
	}

	fn park(&mut self) -> Waiter {
		let (sender, receiver) = oneshot::channel();
		let ticket = self.next_ticket;

		self.next_ticket += 1;
		self.queue.push_back(CompletionToken { ticket, sender });

		Waiter { ticket, receiver }
	}

	fn settle(&mut self) -> VecDeque<CompletionToken> {
		self.in_flight = false;

		mem::take(&mut self.queue)
	}
}

/// Ownership of the running refresh.
///
/// Dropping an unsettled cycle (the refreshing future was cancelled or panicked) clears the flag
/// and rejects every parked caller with [`SessionError::RefreshAbandoned`].
pub(crate) struct RefreshCycle {
	state: Arc<Mutex<RefreshCoordinatorState>>,
	settled: bool,
}
impl RefreshCycle {
	/// Wraps a gate whose flag was just set by [`RefreshCoordinatorState::admit`].
	pub(crate) fn begin(state: Arc<Mutex<RefreshCoordinatorState>>) -> Self {
		Self { state, settled: false }
	}

	/// Clears the flag, then releases parked callers in FIFO order with `access_token`.
	///
	/// Returns the number of released callers.
	pub(crate) fn succeed(mut self, access_token: &TokenSecret) -> usize {
		let drained = self.state.lock().settle();
		let released = drained.len();

		self.settled = true;

		for token in drained {
			token.resolve(access_token.clone());
		}

		released
	}

	/// Clears the flag, then rejects parked callers in FIFO order with `error`.
	///
	/// Returns the number of rejected callers.
	pub(crate) fn fail(mut self, error: &Error) -> usize {
		let drained = self.state.lock().settle();
		let rejected = drained.len();

		self.settled = true;

		for token in drained {
			token.reject(error.clone());
		}

		rejected
	}
}
impl Drop for RefreshCycle {
	fn drop(&mut self) {
		if self.settled {
			return;
		}

		let drained = self.state.lock().settle();
		let released = drained.len();

		for token in drained {
			token.reject(SessionError::RefreshAbandoned.into());
		}

		obs::record_refresh_outcome(RefreshOutcome::Abandoned);
		obs::trace_refresh_event(RefreshOutcome::Abandoned, released, None);
	}
}
