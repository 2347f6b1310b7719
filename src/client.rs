//! Caller-facing client whose outgoing requests are authenticated.

// crates.io
use oauth2::{
	AsyncHttpClient,
	http::{Method, Request},
};
// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;
use crate::{
	_prelude::*,
	auth::Assertion,
	error::{ConfigError, TransportError},
	http::HttpExecutor,
	provider::{ExchangeDescriptor, JwtBearerProvider, TokenProvider},
	transport::AuthenticatingTransport,
};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestAuthenticatedClient = AuthenticatedClient<ReqwestHttpClient>;

/// HTTP client that behaves like its wrapped executor but authenticates every request.
///
/// Clones share the same [`AuthenticatingTransport`], and with it the cached token, so a
/// single exchange serves every clone until the token expires or is rejected.
///
/// The client also implements [`AsyncHttpClient`], so it can be handed to `oauth2` request
/// builders or any other code written against that trait.
pub struct AuthenticatedClient<E>
where
	E: ?Sized + HttpExecutor,
{
	transport: Arc<AuthenticatingTransport<E>>,
}
impl<E> AuthenticatedClient<E>
where
	E: ?Sized + HttpExecutor,
{
	/// Wraps `http_client`, exchanging `assertion` at the endpoint described by `descriptor`.
	///
	/// The token exchange itself goes through the same unwrapped executor.
	pub fn with_http_client(
		assertion: Assertion,
		descriptor: ExchangeDescriptor,
		http_client: impl Into<Arc<E>>,
	) -> Self {
		let http_client = http_client.into();
		let provider =
			Arc::new(JwtBearerProvider::<E>::new(descriptor, assertion, http_client.clone()));

		Self::with_provider(provider, http_client)
	}

	/// Wraps `http_client`, obtaining tokens from a caller-supplied provider.
	pub fn with_provider(
		provider: Arc<dyn TokenProvider>,
		http_client: impl Into<Arc<E>>,
	) -> Self {
		Self::from_transport(AuthenticatingTransport::<E>::new(provider, http_client))
	}

	/// Builds a client around an already configured transport.
	pub fn from_transport(transport: impl Into<Arc<AuthenticatingTransport<E>>>) -> Self {
		Self { transport: transport.into() }
	}

	/// Returns the shared transport.
	pub fn transport(&self) -> &Arc<AuthenticatingTransport<E>> {
		&self.transport
	}

	/// Sends an owned request.
	pub async fn execute(&self, mut request: HttpRequest) -> Result<HttpResponse> {
		self.transport.execute(&mut request).await
	}

	/// Sends a borrowed request; its headers are restored before this returns.
	pub async fn execute_in_place(&self, request: &mut HttpRequest) -> Result<HttpResponse> {
		self.transport.execute(request).await
	}

	/// Sends a `GET` request to `url`.
	pub async fn get(&self, url: &Url) -> Result<HttpResponse> {
		let request = Request::builder()
			.method(Method::GET)
			.uri(url.as_str())
			.body(Vec::new())
			.map_err(TransportError::from)?;

		self.execute(request).await
	}
}
#[cfg(feature = "reqwest")]
impl AuthenticatedClient<ReqwestHttpClient> {
	/// Creates a client backed by a default reqwest client that exchanges `assertion` at
	/// Google's token endpoint.
	pub fn new(assertion: Assertion) -> Result<Self> {
		let descriptor = ExchangeDescriptor::google().map_err(ConfigError::from)?;

		Ok(Self::with_http_client(assertion, descriptor, ReqwestHttpClient::default()))
	}
}
impl<E> Clone for AuthenticatedClient<E>
where
	E: ?Sized + HttpExecutor,
{
	fn clone(&self) -> Self {
		Self { transport: self.transport.clone() }
	}
}
impl<E> Debug for AuthenticatedClient<E>
where
	E: ?Sized + HttpExecutor,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthenticatedClient").field("transport", &self.transport).finish()
	}
}
impl<'c, E> AsyncHttpClient<'c> for AuthenticatedClient<E>
where
	E: ?Sized + HttpExecutor,
{
	type Error = Error;
	type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		Box::pin(self.execute(request))
	}
}
