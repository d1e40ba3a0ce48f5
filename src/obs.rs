//! Optional observability helpers for the refresh coordinator.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to wrap every refresh cycle in `storefront_auth.refresh` spans whose
//!   `stage` field is `refresh`, `persist`, or `replay`, and to emit events when callers park,
//!   refreshes settle, or the session is torn down.
//! - Enable `metrics` to increment the `storefront_auth_refresh_total` counter for every
//!   refresh outcome, labeled by `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcomes recorded for each refresh cycle and parked caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshOutcome {
	/// A caller won the check-and-set and started a refresh.
	Attempt,
	/// A caller observed a 401 while a refresh was in flight and parked.
	Parked,
	/// The refresh rotated the session.
	Success,
	/// The refresh failed and the session was torn down.
	Failure,
	/// The refreshing future was dropped before it settled.
	Abandoned,
}
impl RefreshOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RefreshOutcome::Attempt => "attempt",
			RefreshOutcome::Parked => "parked",
			RefreshOutcome::Success => "success",
			RefreshOutcome::Failure => "failure",
			RefreshOutcome::Abandoned => "abandoned",
		}
	}
}
impl Display for RefreshOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
