//! Error types shared by the token provider, the authenticating transport, and the client.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// A `401 Unauthorized` response that survives the retry is *not* an error; it is returned to
/// the caller as a regular [`HttpResponse`].
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// No usable access token could be obtained; the request was aborted.
	#[error("Authorization failed: {0}")]
	Authorization(#[from] ExchangeError),
	/// The underlying executor failed outright while sending the request.
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Configuration and validation failures raised before any network call is made.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Exchange descriptor failed validation.
	#[error(transparent)]
	InvalidDescriptor(#[from] crate::provider::ExchangeDescriptorError),
	/// The signed assertion was empty.
	#[error("Assertion must not be empty.")]
	EmptyAssertion,
	/// Access token contains characters that cannot appear in an HTTP header.
	#[error("Access token cannot be encoded as an Authorization header value.")]
	InvalidBearerValue {
		/// Header encoding failure.
		#[source]
		source: oauth2::http::header::InvalidHeaderValue,
	},
}

/// Failures of a single JWT-bearer token exchange.
#[derive(Debug, ThisError)]
pub enum ExchangeError {
	/// The token endpoint could not be reached.
	#[error("Failed to contact the token endpoint: {source}")]
	Network {
		/// Transport failure reported by the executor.
		#[source]
		source: TransportError,
	},
	/// The token endpoint responded with a body that does not decode as a token response.
	#[error("Failed to decode the token endpoint response: {source}")]
	Decode {
		/// Structured parsing failure, including the JSON path that failed.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// The token endpoint reported an explicit OAuth error.
	#[error("Token endpoint rejected the assertion: {error}.")]
	Rejected {
		/// OAuth `error` code, e.g. `invalid_grant`.
		error: String,
		/// Optional OAuth `error_description`.
		description: Option<String>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// The token endpoint reported no error but returned no access token.
	#[error("No access token received.")]
	EmptyToken,
	/// The issued access token cannot be sent as a bearer header value.
	#[error("Issued access token cannot be used as a bearer credential.")]
	UnusableToken {
		/// Header encoding failure.
		#[source]
		source: oauth2::http::header::InvalidHeaderValue,
	},
	/// The token endpoint returned an `expires_in` that cannot describe a lifetime.
	#[error("The expires_in value {expires_in} is not a valid token lifetime.")]
	InvalidLifetime {
		/// Raw `expires_in` value in seconds.
		expires_in: i64,
	},
}
impl ExchangeError {
	/// Returns the HTTP status attached to the failure, if the endpoint answered at all.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Decode { status, .. } | Self::Rejected { status, .. } => Some(*status),
			_ => None,
		}
	}
}

/// Transport-level failures (network, IO, request construction).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while executing the request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while executing the request.")]
	Io(#[from] std::io::Error),
	/// Request could not be assembled.
	#[error("HTTP request could not be constructed.")]
	Http(#[from] oauth2::http::Error),
	/// Executor-specific failure described by a message.
	#[error("HTTP client error: {0}.")]
	Other(String),
}
impl<E> From<HttpClientError<E>> for TransportError
where
	E: 'static + Send + Sync + StdError,
{
	fn from(err: HttpClientError<E>) -> Self {
		match err {
			HttpClientError::Reqwest(inner) => Self::Network { source: inner },
			HttpClientError::Http(inner) => Self::Http(inner),
			HttpClientError::Io(inner) => Self::Io(inner),
			HttpClientError::Other(message) => Self::Other(message),
			other => Self::Other(other.to_string()),
		}
	}
}
