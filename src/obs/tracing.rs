// self
use crate::{_prelude::*, obs::Stage};

/// Span around one exchange or one authenticated request.
///
/// Compiles down to an empty value when the `tracing` feature is off.
#[derive(Clone, Debug)]
pub struct StageSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl StageSpan {
	/// Opens a `jwt_bearer_transport.stage` span for `stage`, tagged with the call site `step`.
	pub fn new(stage: Stage, step: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			Self {
				span: tracing::info_span!(
					"jwt_bearer_transport.stage",
					stage = stage.as_str(),
					step,
					attempt = tracing::field::Empty,
					status = tracing::field::Empty,
				),
			}
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (stage, step);

			Self {}
		}
	}

	/// Records the 1-based attempt number.
	pub fn record_attempt(&self, attempt: u8) {
		self.record("attempt", attempt.into());
	}

	/// Records the HTTP status observed by the stage.
	pub fn record_status(&self, status: u16) {
		self.record("status", status.into());
	}

	/// Runs `fut` inside the span without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> impl Future<Output = Fut::Output>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			tracing::Instrument::instrument(fut, self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}

	fn record(&self, field: &'static str, value: u64) {
		#[cfg(feature = "tracing")]
		self.span.record(field, value);
		#[cfg(not(feature = "tracing"))]
		let _ = (field, value);
	}
}
