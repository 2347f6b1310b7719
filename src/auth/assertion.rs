//! The long-lived signed credential traded for access tokens.

// self
use crate::{_prelude::*, error::ConfigError};

/// Signed JWT assertion presented to the token endpoint with the `jwt-bearer` grant.
///
/// The value is immutable once constructed and never printed by `Debug` or `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct Assertion(Arc<str>);
impl Assertion {
	/// Wraps a pre-signed assertion, rejecting empty or whitespace-only input.
	pub fn new(value: impl AsRef<str>) -> Result<Self, ConfigError> {
		let view = value.as_ref().trim();

		if view.is_empty() {
			return Err(ConfigError::EmptyAssertion);
		}

		Ok(Self(Arc::from(view)))
	}

	/// Returns the raw assertion. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl TryFrom<String> for Assertion {
	type Error = ConfigError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl TryFrom<&str> for Assertion {
	type Error = ConfigError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl Debug for Assertion {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Assertion").field(&"<redacted>").finish()
	}
}
impl Display for Assertion {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
