// self
use crate::{_prelude::*, obs::RefreshOutcome};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedRefresh<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedRefresh<F> = F;

/// A span builder used by the refresh coordinator.
#[derive(Clone, Debug)]
pub struct RefreshSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl RefreshSpan {
	/// Creates a new span tagged with the provided stage.
	pub fn new(stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("storefront_auth.refresh", stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedRefresh<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a structured event describing a coordinator transition (when enabled).
///
/// `released` is the number of parked callers settled by the transition; `error` carries the
/// failure that ended a cycle. Token values never reach this function.
pub fn trace_refresh_event(outcome: RefreshOutcome, released: usize, error: Option<&Error>) {
	#[cfg(feature = "tracing")]
	{
		let outcome = outcome.as_str();

		match error {
			Some(error) => tracing::warn!(outcome, released, %error, "session refresh failed"),
			None if released > 0 =>
				tracing::info!(outcome, released, "session refresh released parked callers"),
			None => tracing::debug!(outcome, "session refresh transition"),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (outcome, released, error);
	}
}
