//! Authenticating transport: attaches bearer tokens, refreshes them lazily, and retries once
//! when the upstream API rejects the bearer.
//!
//! Every request goes through the same steps:
//!
//! 1. The current instant is captured once and used for every freshness check of the call.
//! 2. A [`HeaderScope`] lends the caller's header set to the transport and restores it on every
//!    exit path.
//! 3. The [`TokenCache`] hands out a usable token, exchanging a new one through the
//!    [`TokenProvider`] when the cache is empty or expired. Exchange failures abort the request.
//! 4. The request is sent through the wrapped [`HttpExecutor`]. Anything other than
//!    `401 Unauthorized` is returned untouched, as is a `401` once the retry budget is spent.
//! 5. A `401` invalidates the rejected token so the next attempt, or the next request once the
//!    budget is spent, re-exchanges even if the token had not nominally expired.

mod cache;
mod headers;
mod metrics;

pub use cache::TokenCache;
pub use headers::HeaderScope;
pub use metrics::TransportMetrics;

// crates.io
use oauth2::http::StatusCode;
// self
use crate::{
	_prelude::*,
	auth::IssuedToken,
	error::TransportError,
	http::HttpExecutor,
	obs::{self, Outcome, Stage, StageSpan},
	provider::TokenProvider,
};

/// Number of times a request is resent after a `401 Unauthorized`.
pub const DEFAULT_MAX_UNAUTHORIZED_RETRIES: u8 = 1;

/// Decorator around an [`HttpExecutor`] that authenticates every request it sends.
///
/// One instance owns one token cache; share it behind `Arc` (or through a cloned
/// [`AuthenticatedClient`](crate::client::AuthenticatedClient)) so concurrent requests reuse
/// the same token.
pub struct AuthenticatingTransport<E>
where
	E: ?Sized + HttpExecutor,
{
	provider: Arc<dyn TokenProvider>,
	http_client: Arc<E>,
	cache: TokenCache,
	max_unauthorized_retries: u8,
	metrics: Arc<TransportMetrics>,
}
impl<E> AuthenticatingTransport<E>
where
	E: ?Sized + HttpExecutor,
{
	/// Wraps `http_client`, obtaining tokens from `provider`.
	pub fn new(provider: Arc<dyn TokenProvider>, http_client: impl Into<Arc<E>>) -> Self {
		Self {
			provider,
			http_client: http_client.into(),
			cache: TokenCache::default(),
			max_unauthorized_retries: DEFAULT_MAX_UNAUTHORIZED_RETRIES,
			metrics: Default::default(),
		}
	}

	/// Overrides how many times a `401 Unauthorized` request is resent with a new token.
	///
	/// Zero disables the retry; the first `401` is returned as-is.
	pub fn with_max_unauthorized_retries(mut self, retries: u8) -> Self {
		self.max_unauthorized_retries = retries;

		self
	}

	/// Returns the retry budget for `401 Unauthorized` responses.
	pub fn max_unauthorized_retries(&self) -> u8 {
		self.max_unauthorized_retries
	}

	/// Returns the wrapped executor.
	pub fn http_client(&self) -> &Arc<E> {
		&self.http_client
	}

	/// Returns the shared activity counters.
	pub fn metrics(&self) -> &Arc<TransportMetrics> {
		&self.metrics
	}

	/// Returns a copy of the cached token, if one has been issued.
	pub fn cached_token(&self) -> Option<IssuedToken> {
		self.cache.snapshot()
	}

	/// Sends `request` with a bearer token, using the current UTC instant for freshness.
	///
	/// The request's headers are identical to their original state once this returns.
	pub async fn execute(&self, request: &mut HttpRequest) -> Result<HttpResponse> {
		self.execute_at(request, OffsetDateTime::now_utc()).await
	}

	/// Sends `request` with a bearer token, treating `now` as the current instant for every
	/// freshness check of the call.
	pub async fn execute_at(
		&self,
		request: &mut HttpRequest,
		now: OffsetDateTime,
	) -> Result<HttpResponse> {
		const STAGE: Stage = Stage::Request;

		let span = StageSpan::new(STAGE, "execute");

		self.metrics.record_request();
		obs::record_stage_outcome(STAGE, Outcome::Attempt);

		let result = span.instrument(self.send_with_retry(request, now, &span)).await;

		obs::record_stage_result(STAGE, result)
	}

	async fn send_with_retry(
		&self,
		request: &mut HttpRequest,
		now: OffsetDateTime,
		span: &StageSpan,
	) -> Result<HttpResponse> {
		let mut scope = HeaderScope::enter(request);
		let mut retries = 0_u8;

		loop {
			span.record_attempt(retries.saturating_add(1));

			let token =
				self.cache.get_or_refresh(self.provider.as_ref(), now, &self.metrics).await?;
			let outgoing = scope.authorize(&token).inspect_err(|_| {
				self.cache.invalidate(&token);
			})?;
			let response =
				self.http_client.execute(outgoing).await.map_err(TransportError::from)?;

			span.record_status(response.status().as_u16());

			if response.status() != StatusCode::UNAUTHORIZED {
				return Ok(response);
			}

			self.cache.invalidate(&token);

			if retries >= self.max_unauthorized_retries {
				return Ok(response);
			}

			self.metrics.record_retry();
			obs::record_stage_outcome(Stage::Request, Outcome::Retry);

			retries += 1;
		}
	}
}
impl<E> Debug for AuthenticatingTransport<E>
where
	E: ?Sized + HttpExecutor,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthenticatingTransport")
			.field("cache", &self.cache)
			.field("max_unauthorized_retries", &self.max_unauthorized_retries)
			.field("metrics", &self.metrics)
			.finish_non_exhaustive()
	}
}
