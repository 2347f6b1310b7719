//! Exchange descriptor: where and how the JWT-bearer exchange is performed.

// std
use std::net::IpAddr;
// crates.io
use url::Host;
// self
use crate::_prelude::*;

/// RFC 7523 grant type identifier for JWT-bearer assertions.
pub const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Google's OAuth 2.0 token endpoint, the default audience for service-account assertions.
pub const GOOGLE_TOKEN_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/token";

const RESERVED_PARAMS: [&str; 2] = ["grant_type", "assertion"];

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ExchangeDescriptorError {
	/// Token endpoint is mandatory.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// Token endpoint could not be parsed.
	#[error("Token endpoint is not a valid URL.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Token endpoint must use HTTPS unless it points at a loopback host.
	#[error("The token endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Grant type must be present.
	#[error("Grant type must not be empty.")]
	EmptyGrantType,
	/// Extra parameters cannot override the fields the exchange always sends.
	#[error("Extra parameter `{name}` is reserved by the JWT-bearer exchange.")]
	ReservedParam {
		/// Offending parameter name.
		name: String,
	},
}

/// Immutable exchange configuration consumed by [`JwtBearerProvider`](super::JwtBearerProvider).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeDescriptor {
	/// Token endpoint receiving the form-encoded exchange.
	pub token_endpoint: Url,
	/// `grant_type` form value.
	#[serde(default = "default_grant_type")]
	pub grant_type: String,
	/// Additional form fields (audience, scope, ...) appended after the assertion.
	#[serde(default)]
	pub extra_params: BTreeMap<String, String>,
}
impl ExchangeDescriptor {
	/// Creates a new builder seeded with the JWT-bearer grant type.
	pub fn builder() -> ExchangeDescriptorBuilder {
		ExchangeDescriptorBuilder::new()
	}

	/// Descriptor for Google's token endpoint.
	pub fn google() -> Result<Self, ExchangeDescriptorError> {
		let url = Url::parse(GOOGLE_TOKEN_ENDPOINT)
			.map_err(|source| ExchangeDescriptorError::InvalidEndpoint { source })?;

		Self::builder().token_endpoint(url).build()
	}

	/// Validates invariants for the descriptor.
	///
	/// Builders call this automatically; call it explicitly on deserialized descriptors.
	pub fn validate(&self) -> Result<(), ExchangeDescriptorError> {
		validate_endpoint(&self.token_endpoint)?;

		if self.grant_type.trim().is_empty() {
			return Err(ExchangeDescriptorError::EmptyGrantType);
		}
		if let Some(name) =
			self.extra_params.keys().find(|key| RESERVED_PARAMS.contains(&key.as_str()))
		{
			return Err(ExchangeDescriptorError::ReservedParam { name: name.clone() });
		}

		Ok(())
	}
}

/// Builder for [`ExchangeDescriptor`] values.
#[derive(Debug)]
pub struct ExchangeDescriptorBuilder {
	/// Token endpoint receiving the exchange.
	pub token_endpoint: Option<Url>,
	/// `grant_type` form value.
	pub grant_type: String,
	/// Additional form fields.
	pub extra_params: BTreeMap<String, String>,
}
impl ExchangeDescriptorBuilder {
	/// Creates a builder using the JWT-bearer grant type and no endpoint.
	pub fn new() -> Self {
		Self {
			token_endpoint: None,
			grant_type: default_grant_type(),
			extra_params: BTreeMap::new(),
		}
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Overrides the grant type (defaults to [`JWT_BEARER_GRANT_TYPE`]).
	pub fn grant_type(mut self, grant_type: impl Into<String>) -> Self {
		self.grant_type = grant_type.into();

		self
	}

	/// Adds an extra form field sent with every exchange.
	pub fn extra_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.extra_params.insert(name.into(), value.into());

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ExchangeDescriptor, ExchangeDescriptorError> {
		let token_endpoint =
			self.token_endpoint.ok_or(ExchangeDescriptorError::MissingTokenEndpoint)?;
		let descriptor = ExchangeDescriptor {
			token_endpoint,
			grant_type: self.grant_type,
			extra_params: self.extra_params,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}
impl Default for ExchangeDescriptorBuilder {
	fn default() -> Self {
		Self::new()
	}
}

fn default_grant_type() -> String {
	JWT_BEARER_GRANT_TYPE.into()
}

fn validate_endpoint(url: &Url) -> Result<(), ExchangeDescriptorError> {
	match url.scheme() {
		"https" => Ok(()),
		"http" if is_loopback(url) => Ok(()),
		_ => Err(ExchangeDescriptorError::InsecureEndpoint { url: url.to_string() }),
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(Host::Ipv4(ip)) => IpAddr::V4(ip).is_loopback(),
		Some(Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
		None => false,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse descriptor test URL.")
	}

	#[test]
	fn google_descriptor_uses_jwt_bearer_grant() {
		let descriptor = ExchangeDescriptor::google().expect("Google descriptor should build.");

		assert_eq!(descriptor.token_endpoint.as_str(), GOOGLE_TOKEN_ENDPOINT);
		assert_eq!(descriptor.grant_type, JWT_BEARER_GRANT_TYPE);
		assert!(descriptor.extra_params.is_empty());
	}

	#[test]
	fn rejects_missing_and_insecure_endpoints() {
		assert_eq!(
			ExchangeDescriptor::builder().build(),
			Err(ExchangeDescriptorError::MissingTokenEndpoint)
		);
		let err = ExchangeDescriptor::builder()
			.token_endpoint(url("http://auth.example.com/token"))
			.build()
			.expect_err("Plain HTTP endpoints on remote hosts should be rejected.");

		assert!(matches!(err, ExchangeDescriptorError::InsecureEndpoint { .. }));
	}

	#[test]
	fn loopback_endpoints_may_use_plain_http() {
		for endpoint in
			["http://127.0.0.1:8080/token", "http://localhost/token", "http://[::1]:9000/token"]
		{
			assert!(
				ExchangeDescriptor::builder().token_endpoint(url(endpoint)).build().is_ok(),
				"{endpoint} should be accepted."
			);
		}
	}

	#[test]
	fn rejects_empty_grant_and_reserved_params() {
		let base =
			|| ExchangeDescriptor::builder().token_endpoint(url("https://auth.example.com/token"));

		assert_eq!(base().grant_type(" ").build(), Err(ExchangeDescriptorError::EmptyGrantType));
		assert_eq!(
			base().extra_param("assertion", "other").build(),
			Err(ExchangeDescriptorError::ReservedParam { name: "assertion".into() })
		);
		assert!(base().extra_param("scope", "email").build().is_ok());
	}

	#[test]
	fn deserializes_with_defaults() {
		let descriptor: ExchangeDescriptor =
			serde_json::from_str(r#"{"token_endpoint":"https://auth.example.com/token"}"#)
				.expect("Descriptor JSON should deserialize.");

		assert_eq!(descriptor.grant_type, JWT_BEARER_GRANT_TYPE);
		assert!(descriptor.validate().is_ok());
	}
}
