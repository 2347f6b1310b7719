//! Demonstrates plugging a hand-written [`HttpExecutor`] and a closure-backed token source into
//! the authenticating transport, without any HTTP stack.

// std
use std::sync::{
	Arc,
	atomic::{AtomicU32, Ordering},
};
// crates.io
use color_eyre::Result;
use time::{Duration, OffsetDateTime};
// self
use jwt_bearer_transport::{
	auth::IssuedToken,
	http::{ExecuteFuture, HttpExecutor},
	oauth2::{
		HttpRequest, HttpResponse,
		http::{Request, StatusCode, header},
	},
	provider::FnTokenProvider,
	transport::AuthenticatingTransport,
};

/// Executor that only accepts the most recently minted token, so the first call after a
/// rotation is answered with `401 Unauthorized`.
struct RotatingBackend {
	current: Arc<AtomicU32>,
}
impl HttpExecutor for RotatingBackend {
	type TransportError = std::io::Error;

	fn execute(&self, request: HttpRequest) -> ExecuteFuture<'_, Self::TransportError> {
		let expected = format!("Bearer token-{}", self.current.load(Ordering::SeqCst));
		let accepted = request
			.headers()
			.get(header::AUTHORIZATION)
			.is_some_and(|value| value.as_bytes() == expected.as_bytes());

		Box::pin(async move {
			let body = if accepted { b"hello".to_vec() } else { Vec::new() };
			let mut response = HttpResponse::new(body);

			if !accepted {
				*response.status_mut() = StatusCode::UNAUTHORIZED;
			}

			Ok(response)
		})
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let minted = Arc::new(AtomicU32::new(0));
	let accepted = Arc::new(AtomicU32::new(1));
	let counter = minted.clone();
	let provider = Arc::new(FnTokenProvider::new(move || {
		let generation = counter.fetch_add(1, Ordering::SeqCst) + 1;

		async move {
			Ok(IssuedToken::issued_at(
				format!("token-{generation}"),
				OffsetDateTime::now_utc(),
				Duration::hours(1),
			))
		}
	}));
	let transport = AuthenticatingTransport::<RotatingBackend>::new(
		provider,
		RotatingBackend { current: accepted.clone() },
	);

	for round in 0..3 {
		if round == 2 {
			// The backend revokes the current token; the transport recovers on its own.
			accepted.fetch_add(1, Ordering::SeqCst);
		}

		let mut request =
			Request::builder().uri("https://api.example.com/greeting").body(Vec::new())?;
		let response = transport.execute(&mut request).await?;

		println!(
			"round {round}: {} {:?}",
			response.status(),
			String::from_utf8_lossy(response.body())
		);
	}

	println!(
		"Tokens minted: {}, retries: {}.",
		minted.load(Ordering::SeqCst),
		transport.metrics().retries()
	);

	Ok(())
}
