// self
use crate::obs::{Outcome, Stage};

const STAGE_COUNTER: &str = "jwt_bearer_transport_stage_total";

/// Increments the stage counter once; a no-op unless the `metrics` feature is enabled.
pub fn record_stage_outcome(stage: Stage, outcome: Outcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(STAGE_COUNTER, "stage" => stage.as_str(), "outcome" => outcome.as_str())
		.increment(1);
	#[cfg(not(feature = "metrics"))]
	let _ = (stage, outcome, STAGE_COUNTER);
}

/// Records [`Outcome::Success`] or [`Outcome::Failure`] for `result` and hands it back.
pub fn record_stage_result<T, E>(stage: Stage, result: Result<T, E>) -> Result<T, E> {
	record_stage_outcome(stage, if result.is_ok() { Outcome::Success } else { Outcome::Failure });

	result
}
