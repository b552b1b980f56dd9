//! Optional observability helpers for fetches and aggregations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `api_composer.operation` with the `operation`
//!   and `stage` fields, plus one event per completed operation with `elapsed_ms` + `outcome`.
//! - Enable `metrics` to increment the `api_composer_operation_total` counter for every
//!   attempt/success/failure, labeled by `operation` + `outcome`.

mod tracing;

pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the composer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Fetch-and-join across both sources.
	Aggregate,
	/// Every page of one source.
	FetchSource,
	/// One signed page request.
	FetchPage,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::Aggregate => "aggregate",
			OperationKind::FetchSource => "fetch_source",
			OperationKind::FetchPage => "fetch_page",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OperationOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationOutcome::Attempt => "attempt",
			OperationOutcome::Success => "success",
			OperationOutcome::Failure => "failure",
		}
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside an operation span and records its elapsed time and outcome.
///
/// Nothing is recorded for a future dropped before completion, which is what happens to siblings
/// abandoned after a fail-fast join.
pub async fn timed<F, T>(kind: OperationKind, stage: &str, fut: F) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	let span = OperationSpan::new(kind, stage);

	count(kind, OperationOutcome::Attempt);

	let started = Instant::now();
	let result = span.instrument(fut).await;
	let outcome =
		if result.is_ok() { OperationOutcome::Success } else { OperationOutcome::Failure };

	span.record_elapsed(started.elapsed(), outcome);
	count(kind, outcome);

	result
}

#[cfg(feature = "metrics")]
fn count(kind: OperationKind, outcome: OperationOutcome) {
	metrics::counter!(
		"api_composer_operation_total",
		"operation" => kind.as_str(),
		"outcome" => outcome.as_str()
	)
	.increment(1);
}
#[cfg(not(feature = "metrics"))]
fn count(_: OperationKind, _: OperationOutcome) {}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::ConfigError;

	#[tokio::test]
	async fn timed_passes_results_through() {
		let value = timed(OperationKind::FetchPage, "test", async { Ok(7) })
			.await
			.expect("Successful future should pass through.");

		assert_eq!(value, 7);

		let err = timed(OperationKind::Aggregate, "test", async {
			Err::<(), _>(ConfigError::Message("boom".into()).into())
		})
		.await
		.expect_err("Failing future should pass through.");

		assert!(matches!(err, Error::Config(ConfigError::Message(_))));
	}

	#[test]
	fn labels_are_stable() {
		assert_eq!(OperationKind::FetchSource.to_string(), "fetch_source");
		assert_eq!(OperationOutcome::Failure.to_string(), "failure");
	}
}
