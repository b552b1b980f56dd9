// self
use crate::{
	_prelude::*,
	obs::{OperationKind, OperationOutcome},
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOperation<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOperation<F> = F;

/// A span builder used by fetches and aggregations.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OperationSpan {
	/// Creates a new span tagged with the provided operation kind + stage.
	pub fn new(kind: OperationKind, stage: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("api_composer.operation", operation = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOperation<Fut>
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

	/// Emits the completion event inside this span.
	pub fn record_elapsed(&self, elapsed: StdDuration, outcome: OperationOutcome) {
		#[cfg(feature = "tracing")]
		{
			let elapsed_ms = elapsed.as_secs_f64() * 1_000.;

			self.span.in_scope(|| match outcome {
				OperationOutcome::Failure =>
					tracing::warn!(elapsed_ms, outcome = outcome.as_str(), "operation failed"),
				_ => tracing::info!(elapsed_ms, outcome = outcome.as_str(), "operation finished"),
			});
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (elapsed, outcome);
		}
	}
}
