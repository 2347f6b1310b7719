//! Token providers: the collaborators that trade a long-lived credential for access tokens.
//!
//! `descriptor` holds the validated exchange configuration (token endpoint, grant type, extra
//! form fields). `jwt_bearer` implements [`TokenProvider`] for the RFC 7523 JWT-bearer grant on
//! top of any [`HttpExecutor`](crate::http::HttpExecutor).

pub mod descriptor;
pub mod jwt_bearer;

pub use descriptor::*;
pub use jwt_bearer::*;

// self
use crate::{_prelude::*, auth::IssuedToken, error::ExchangeError};

/// Boxed future returned by [`TokenProvider::fetch`].
pub type TokenFuture<'a> =
	Pin<Box<dyn Future<Output = Result<IssuedToken, ExchangeError>> + 'a + Send>>;

/// Performs one token exchange per call using a credential bound at construction.
///
/// Implementations are stateless per call; caching and refresh decisions belong to the
/// transport. The returned [`IssuedToken::expires_at`] must be anchored on an instant captured
/// no later than the moment the exchange request was dispatched.
pub trait TokenProvider
where
	Self: Send + Sync,
{
	/// Exchanges the bound credential for a fresh access token.
	fn fetch(&self) -> TokenFuture<'_>;
}

/// Adapts an async closure into a [`TokenProvider`].
///
/// Useful for credentials that come from somewhere other than an HTTP token endpoint, and for
/// test doubles.
pub struct FnTokenProvider<F>(F);
impl<F> FnTokenProvider<F> {
	/// Wraps `f`; every [`TokenProvider::fetch`] call invokes it once.
	pub fn new(f: F) -> Self {
		Self(f)
	}
}
impl<F, Fut> TokenProvider for FnTokenProvider<F>
where
	F: Send + Sync + Fn() -> Fut,
	Fut: 'static + Send + Future<Output = Result<IssuedToken, ExchangeError>>,
{
	fn fetch(&self) -> TokenFuture<'_> {
		Box::pin((self.0)())
	}
}
impl<F> Debug for FnTokenProvider<F> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("FnTokenProvider(..)")
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use parking_lot::Mutex;
	// self
	use super::*;

	#[tokio::test]
	async fn closure_providers_run_once_per_fetch() {
		let calls = Arc::new(Mutex::new(0_u32));
		let counter = calls.clone();
		let provider = FnTokenProvider::new(move || {
			let counter = counter.clone();

			async move {
				*counter.lock() += 1;

				Ok(IssuedToken::issued_at("T1", OffsetDateTime::now_utc(), Duration::hours(1)))
			}
		});
		let token = provider.fetch().await.expect("Closure provider should succeed.");

		assert_eq!(token.access_token.expose(), "T1");
		assert_eq!(*calls.lock(), 1);

		let _ = provider.fetch().await;

		assert_eq!(*calls.lock(), 2);
	}
}
