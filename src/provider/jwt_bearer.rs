//! RFC 7523 JWT-bearer exchange over an [`HttpExecutor`].
//!
//! One call, one form-encoded POST:
//!
//! ```text
//! grant_type=urn:ietf:params:oauth:grant-type:jwt-bearer&assertion=<signed JWT>
//! ```
//!
//! The endpoint answers with JSON carrying `access_token` + `expires_in` on success or an
//! `error` string on failure. The body is decoded regardless of the HTTP status because token
//! endpoints report OAuth errors with 4xx statuses.

// crates.io
use oauth2::http::{Method, Request, header};
use url::form_urlencoded::Serializer;
// self
use crate::{
	_prelude::*,
	auth::{Assertion, IssuedToken},
	error::{ExchangeError, TransportError},
	http::HttpExecutor,
	obs::{Stage, StageSpan},
	provider::{ExchangeDescriptor, TokenFuture, TokenProvider},
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Token endpoint payload. Absent fields decode to their empty value.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TokenEndpointResponse {
	error: String,
	error_description: Option<String>,
	access_token: String,
	expires_in: i64,
}
impl TokenEndpointResponse {
	fn into_issued(
		self,
		issued_at: OffsetDateTime,
		status: u16,
	) -> Result<IssuedToken, ExchangeError> {
		if !self.error.is_empty() {
			return Err(ExchangeError::Rejected {
				error: self.error,
				description: self.error_description.filter(|value| !value.is_empty()),
				status,
			});
		}
		if self.access_token.is_empty() {
			return Err(ExchangeError::EmptyToken);
		}
		if self.expires_in < 0 {
			return Err(ExchangeError::InvalidLifetime { expires_in: self.expires_in });
		}

		let expires_at = issued_at
			.checked_add(Duration::seconds(self.expires_in))
			.ok_or(ExchangeError::InvalidLifetime { expires_in: self.expires_in })?;

		Ok(IssuedToken::new(self.access_token, expires_at))
	}
}

/// [`TokenProvider`] that trades a signed JWT assertion for an access token.
///
/// The provider talks to the token endpoint through the plain executor, never through an
/// authenticating transport, so exchanges never recurse into themselves.
pub struct JwtBearerProvider<E>
where
	E: ?Sized + HttpExecutor,
{
	descriptor: ExchangeDescriptor,
	assertion: Assertion,
	http_client: Arc<E>,
}
impl<E> JwtBearerProvider<E>
where
	E: ?Sized + HttpExecutor,
{
	/// Binds `assertion` to the endpoint described by `descriptor`.
	pub fn new(
		descriptor: ExchangeDescriptor,
		assertion: Assertion,
		http_client: impl Into<Arc<E>>,
	) -> Self {
		Self { descriptor, assertion, http_client: http_client.into() }
	}

	/// Returns the exchange configuration.
	pub fn descriptor(&self) -> &ExchangeDescriptor {
		&self.descriptor
	}

	/// Performs one exchange.
	///
	/// The expiry is anchored on the instant captured right before the request is dispatched.
	pub async fn exchange(&self) -> Result<IssuedToken, ExchangeError> {
		let span = StageSpan::new(Stage::Exchange, "jwt_bearer_exchange");

		span.instrument(async {
			let request = self.build_request().map_err(|source| ExchangeError::Network {
				source: TransportError::from(source),
			})?;
			let issued_at = OffsetDateTime::now_utc();
			let response = self
				.http_client
				.execute(request)
				.await
				.map_err(|err| ExchangeError::Network { source: TransportError::from(err) })?;
			let status = response.status().as_u16();

			span.record_status(status);

			decode_response(response.body(), status)?.into_issued(issued_at, status)
		})
		.await
	}

	fn build_request(&self) -> Result<HttpRequest, oauth2::http::Error> {
		Request::builder()
			.method(Method::POST)
			.uri(self.descriptor.token_endpoint.as_str())
			.header(header::CONTENT_TYPE, FORM_CONTENT_TYPE)
			.header(header::ACCEPT, "application/json")
			.body(self.form_body())
	}

	fn form_body(&self) -> Vec<u8> {
		Serializer::new(String::new())
			.append_pair("grant_type", &self.descriptor.grant_type)
			.append_pair("assertion", self.assertion.expose())
			.extend_pairs(&self.descriptor.extra_params)
			.finish()
			.into_bytes()
	}
}
impl<E> TokenProvider for JwtBearerProvider<E>
where
	E: ?Sized + HttpExecutor,
{
	fn fetch(&self) -> TokenFuture<'_> {
		Box::pin(self.exchange())
	}
}
impl<E> Debug for JwtBearerProvider<E>
where
	E: ?Sized + HttpExecutor,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("JwtBearerProvider")
			.field("descriptor", &self.descriptor)
			.field("assertion", &self.assertion)
			.finish()
	}
}

fn decode_response(body: &[u8], status: u16) -> Result<TokenEndpointResponse, ExchangeError> {
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| ExchangeError::Decode { source, status })
}
