//! Access tokens issued by a token endpoint, paired with their expiry instant.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Lifecycle status of an issued token at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
	/// Token may be attached to requests.
	Active,
	/// Token reached its expiry instant or carries no value.
	Expired,
}

/// Access token plus the instant after which it must not be used.
///
/// Both fields travel together so a cache holding an `IssuedToken` can never observe a new
/// value paired with a stale expiry.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Expiry instant, derived from the exchange start plus `expires_in`.
	pub expires_at: OffsetDateTime,
}
impl IssuedToken {
	/// Pairs an access token with an absolute expiry instant.
	pub fn new(access_token: impl Into<String>, expires_at: OffsetDateTime) -> Self {
		Self { access_token: TokenSecret::new(access_token), expires_at }
	}

	/// Builds a token whose lifetime starts at `issued_at`.
	pub fn issued_at(
		access_token: impl Into<String>,
		issued_at: OffsetDateTime,
		expires_in: Duration,
	) -> Self {
		Self::new(access_token, issued_at + expires_in)
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> TokenStatus {
		if self.access_token.is_empty() || instant >= self.expires_at {
			return TokenStatus::Expired;
		}

		TokenStatus::Active
	}

	/// Convenience helper that checks the status using the current UTC instant.
	pub fn status(&self) -> TokenStatus {
		self.status_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` if the token may be attached to a request sent at `instant`.
	pub fn is_usable_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), TokenStatus::Active)
	}

	/// Remaining lifetime at `instant`, clamped at zero.
	pub fn remaining_at(&self, instant: OffsetDateTime) -> Duration {
		let remaining = self.expires_at - instant;

		if remaining.is_negative() { Duration::ZERO } else { remaining }
	}
}
impl Debug for IssuedToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IssuedToken")
			.field("access_token", &"<redacted>")
			.field("expires_at", &self.expires_at)
			.finish()
	}
}
