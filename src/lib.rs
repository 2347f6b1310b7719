//! OAuth 2.0 JWT-bearer authenticating transport: exchanges a signed assertion for an access
//! token on demand, caches it, attaches it to every outgoing request, and retries once when
//! the upstream API rejects the bearer.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod obs;
pub mod provider;
pub mod transport;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::Assertion,
		client::AuthenticatedClient,
		http::ReqwestHttpClient,
		provider::{ExchangeDescriptor, ExchangeDescriptorError},
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = AuthenticatedClient<ReqwestHttpClient>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Builds a descriptor pointing at a mock token endpoint.
	pub fn test_descriptor(
		token_endpoint: &str,
	) -> Result<ExchangeDescriptor, ExchangeDescriptorError> {
		let url =
			Url::parse(token_endpoint).expect("Mock token endpoint should parse successfully.");

		ExchangeDescriptor::builder().token_endpoint(url).build()
	}

	/// Constructs an [`AuthenticatedClient`] that exchanges `assertion` against the provided mock
	/// token endpoint through the insecure reqwest transport used across integration tests.
	pub fn build_reqwest_test_client(token_endpoint: &str, assertion: &str) -> ReqwestTestClient {
		let descriptor =
			test_descriptor(token_endpoint).expect("Mock exchange descriptor should build.");
		let assertion = Assertion::new(assertion).expect("Test assertion should be non-empty.");

		AuthenticatedClient::with_http_client(assertion, descriptor, test_reqwest_http_client())
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use oauth2::{HttpClientError, HttpRequest, HttpResponse};
	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use oauth2;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
