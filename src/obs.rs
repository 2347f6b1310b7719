//! Optional observability helpers for token exchanges and authenticated requests.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `jwt_bearer_transport.stage` with the
//!   `stage` (exchange or request) and `step` (call site) fields.
//! - Enable `metrics` to increment the `jwt_bearer_transport_stage_total` counter for every
//!   attempt/success/failure/retry, labeled by `stage` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Stages observed by the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
	/// JWT-bearer exchange against the token endpoint.
	Exchange,
	/// Authenticated request delegated to the underlying executor.
	Request,
}
impl Stage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Stage::Exchange => "exchange",
			Stage::Request => "request",
		}
	}
}
impl Display for Stage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// Entry to a stage.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
	/// Upstream rejected the bearer and the stage is being repeated.
	Retry,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::Success => "success",
			Outcome::Failure => "failure",
			Outcome::Retry => "retry",
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
