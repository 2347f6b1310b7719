//! Shared token state with an atomic get-or-refresh operation.

// crates.io
use oauth2::http::HeaderValue;
// self
use crate::{
	_prelude::*,
	auth::{IssuedToken, TokenSecret},
	error::ExchangeError,
	obs::{self, Outcome, Stage},
	provider::TokenProvider,
	transport::TransportMetrics,
};

/// Cached access token owned by one transport.
///
/// The state is a single `Option<IssuedToken>` so value and expiry are always replaced
/// together. Refreshes are serialized by an async singleflight guard; the state lock itself is
/// never held across an `.await`.
#[derive(Debug, Default)]
pub struct TokenCache {
	state: RwLock<Option<IssuedToken>>,
	refresh_guard: AsyncMutex<()>,
}
impl TokenCache {
	/// Returns a copy of the cached token, if any.
	pub fn snapshot(&self) -> Option<IssuedToken> {
		self.state.read().clone()
	}

	/// Returns the cached secret when it is usable at `now`.
	pub fn usable_at(&self, now: OffsetDateTime) -> Option<TokenSecret> {
		self.state
			.read()
			.as_ref()
			.filter(|token| token.is_usable_at(now))
			.map(|token| token.access_token.clone())
	}

	/// Returns a token usable at `now`, exchanging a new one through `provider` when needed.
	///
	/// Concurrent callers that observe an unusable token queue on the singleflight guard and
	/// reuse whatever the first one stored. A failed exchange leaves the state untouched, and so
	/// does a token that cannot be encoded as a bearer header.
	pub(crate) async fn get_or_refresh(
		&self,
		provider: &dyn TokenProvider,
		now: OffsetDateTime,
		metrics: &TransportMetrics,
	) -> Result<TokenSecret, ExchangeError> {
		if let Some(token) = self.usable_at(now) {
			return Ok(token);
		}

		let _singleflight = self.refresh_guard.lock().await;

		if let Some(token) = self.usable_at(now) {
			return Ok(token);
		}

		metrics.record_exchange();
		obs::record_stage_outcome(Stage::Exchange, Outcome::Attempt);

		let issued = obs::record_stage_result(
			Stage::Exchange,
			provider.fetch().await.and_then(ensure_sendable),
		)
		.inspect_err(|_| metrics.record_exchange_failure())?;
		let token = issued.access_token.clone();

		*self.state.write() = Some(issued);

		Ok(token)
	}

	/// Clears the state if it still holds `rejected`.
	///
	/// Returns `false` when another caller already replaced the token, in which case the
	/// replacement is kept.
	pub(crate) fn invalidate(&self, rejected: &TokenSecret) -> bool {
		let mut state = self.state.write();

		if state.as_ref().is_some_and(|token| &token.access_token == rejected) {
			*state = None;

			true
		} else {
			false
		}
	}
}

fn ensure_sendable(issued: IssuedToken) -> Result<IssuedToken, ExchangeError> {
	HeaderValue::try_from(issued.access_token.bearer())
		.map_err(|source| ExchangeError::UnusableToken { source })?;

	Ok(issued)
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicU32, Ordering};
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::provider::TokenFuture;

	const NOW: OffsetDateTime = macros::datetime!(2025-01-01 00:00 UTC);

	/// Issues `T1`, `T2`, ... each valid for one hour from [`NOW`].
	#[derive(Default)]
	struct Sequence(AtomicU32);
	impl TokenProvider for Sequence {
		fn fetch(&self) -> TokenFuture<'_> {
			let n = self.0.fetch_add(1, Ordering::SeqCst) + 1;

			Box::pin(async move {
				Ok(IssuedToken::issued_at(format!("T{n}"), NOW, Duration::hours(1)))
			})
		}
	}

	struct Failing;
	impl TokenProvider for Failing {
		fn fetch(&self) -> TokenFuture<'_> {
			Box::pin(async { Err(ExchangeError::EmptyToken) })
		}
	}

	#[tokio::test]
	async fn refreshes_only_when_unusable() {
		let cache = TokenCache::default();
		let provider = Sequence::default();
		let metrics = TransportMetrics::default();
		let first = cache
			.get_or_refresh(&provider, NOW, &metrics)
			.await
			.expect("Empty cache should exchange.");
		let second = cache
			.get_or_refresh(&provider, NOW + Duration::minutes(59), &metrics)
			.await
			.expect("Fresh token should be reused.");

		assert_eq!(first.expose(), "T1");
		assert_eq!(second.expose(), "T1");
		assert_eq!(metrics.exchanges(), 1);

		let third = cache
			.get_or_refresh(&provider, NOW + Duration::hours(1), &metrics)
			.await
			.expect("Expired token should be replaced.");

		assert_eq!(third.expose(), "T2");
		assert_eq!(metrics.exchanges(), 2);
		assert_eq!(
			cache.snapshot().map(|token| token.expires_at),
			Some(NOW + Duration::hours(1))
		);
	}

	#[tokio::test]
	async fn failed_exchanges_leave_state_untouched() {
		let cache = TokenCache::default();
		let metrics = TransportMetrics::default();
		let err = cache
			.get_or_refresh(&Failing, NOW, &metrics)
			.await
			.expect_err("Failing provider should surface its error.");

		assert!(matches!(err, ExchangeError::EmptyToken));
		assert!(cache.snapshot().is_none());
		assert_eq!(metrics.exchange_failures(), 1);
	}

	#[tokio::test]
	async fn invalidation_compares_before_clearing() {
		let cache = TokenCache::default();
		let provider = Sequence::default();
		let metrics = TransportMetrics::default();
		let token = cache
			.get_or_refresh(&provider, NOW, &metrics)
			.await
			.expect("Empty cache should exchange.");

		assert!(!cache.invalidate(&TokenSecret::new("stale")));
		assert!(cache.usable_at(NOW).is_some());
		assert!(cache.invalidate(&token));
		assert!(cache.usable_at(NOW).is_none());
	}

	#[tokio::test]
	async fn tokens_that_cannot_be_headers_are_never_cached() {
		let cache = TokenCache::default();
		let metrics = TransportMetrics::default();
		let provider = crate::provider::FnTokenProvider::new(|| async {
			Ok(IssuedToken::issued_at("T1\nInjected: yes", NOW, Duration::hours(1)))
		});
		let err = cache
			.get_or_refresh(&provider, NOW, &metrics)
			.await
			.expect_err("Header-breaking tokens should be refused.");

		assert!(matches!(err, ExchangeError::UnusableToken { .. }));
		assert!(cache.snapshot().is_none());
		assert_eq!(metrics.exchange_failures(), 1);
	}
}
