//! Scoped header mutation with guaranteed rollback.

// crates.io
use oauth2::http::{HeaderMap, HeaderValue, header::AUTHORIZATION};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::{ConfigError, TransportError},
	http,
};

/// Guard that lends a request's header set to the transport for the duration of one call.
///
/// The caller's headers are snapshotted on [`HeaderScope::enter`]. Each attempt starts again
/// from that snapshot, and dropping the guard puts the snapshot back, whatever path the call
/// took out of the transport.
pub struct HeaderScope<'a> {
	request: &'a mut HttpRequest,
	original: HeaderMap,
}
impl<'a> HeaderScope<'a> {
	/// Snapshots the headers of `request`.
	pub fn enter(request: &'a mut HttpRequest) -> Self {
		let original = request.headers().clone();

		Self { request, original }
	}

	/// Resets the working headers to the snapshot, appends `Authorization: Bearer <token>`,
	/// and returns the request to hand to the executor.
	///
	/// Other entries, including a caller-supplied `Authorization`, are kept.
	pub fn authorize(&mut self, token: &TokenSecret) -> Result<HttpRequest> {
		let mut value = HeaderValue::try_from(token.bearer())
			.map_err(|source| ConfigError::InvalidBearerValue { source })?;

		value.set_sensitive(true);

		let headers = self.request.headers_mut();

		*headers = self.original.clone();
		headers.append(AUTHORIZATION, value);

		http::duplicate_request(self.request).map_err(|err| TransportError::from(err).into())
	}
}
impl Drop for HeaderScope<'_> {
	fn drop(&mut self) {
		*self.request.headers_mut() = std::mem::take(&mut self.original);
	}
}
impl Debug for HeaderScope<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("HeaderScope").field("original", &self.original.len()).finish()
	}
}
