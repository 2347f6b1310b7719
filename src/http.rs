//! HTTP executor primitives shared by the token provider and the authenticating transport.
//!
//! [`HttpExecutor`] is the crate's only dependency on an HTTP stack. Requests and responses use
//! the `oauth2` crate's [`HttpRequest`]/[`HttpResponse`] aliases (`http::Request<Vec<u8>>` and
//! `http::Response<Vec<u8>>`) so executors stay interchangeable with `oauth2` clients.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::_prelude::*;

/// Boxed future returned by [`HttpExecutor::execute`].
pub type ExecuteFuture<'a, E> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, HttpClientError<E>>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of sending a fully buffered request.
///
/// Implementations must be `Send + Sync + 'static` so a single executor can be shared (behind
/// `Arc`) by the token provider and the transport that wraps it. The returned future must be
/// `Send` so authenticated requests can hop executors.
pub trait HttpExecutor
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Sends `request` and buffers the whole response body.
	///
	/// Non-success statuses are *responses*, not errors; only failures to obtain a response
	/// at all are reported through [`HttpClientError`].
	fn execute(&self, request: HttpRequest) -> ExecuteFuture<'_, Self::TransportError>;
}

/// Copies a buffered request so it can be handed to an executor by value.
///
/// Extensions are not carried over; executors only see method, URI, version, headers, and
/// body.
pub fn duplicate_request(request: &HttpRequest) -> Result<HttpRequest, oauth2::http::Error> {
	let mut builder = oauth2::http::Request::builder()
		.method(request.method().clone())
		.uri(request.uri().clone())
		.version(request.version());

	if let Some(headers) = builder.headers_mut() {
		*headers = request.headers().clone();
	}

	builder.body(request.body().clone())
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Token endpoints return results directly, so a custom [`ReqwestClient`] used for exchanges
/// should not follow redirects.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpExecutor for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn execute(&self, request: HttpRequest) -> ExecuteFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let response =
				client.execute(request.try_into().map_err(Box::new)?).await.map_err(Box::new)?;
			let status = response.status();
			let version = response.version();
			let headers = response.headers().to_owned();
			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.version_mut() = version;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
