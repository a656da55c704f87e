//! Transport contract for retrieving the raw metadata document.
//!
//! [`MetadataSource`] is the feed's only dependency on an HTTP stack. The default
//! [`ReqwestSource`] performs a single GET per call with a hard deadline; retries are left to
//! the cache, which stays empty after a failure so the next request tries again.

// self
use crate::{_prelude::*, error::FetchError};
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

/// Boxed future returned by [`MetadataSource::fetch`].
pub type SourceFuture<'a> = Pin<Box<dyn Future<Output = Result<Bytes, FetchError>> + 'a + Send>>;

/// Anything able to return the bytes published at a URL.
pub trait MetadataSource
where
	Self: Send + Sync,
{
	/// Retrieves the document at `url`.
	fn fetch<'a>(&'a self, url: &'a Url) -> SourceFuture<'a>;
}

/// Reqwest-backed [`MetadataSource`] with a per-request deadline.
///
/// Only 2xx responses are accepted; any other status becomes [`FetchError::Status`] so an
/// upstream error page is never cached as metadata.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestSource {
	client: ReqwestClient,
	timeout: Duration,
}
#[cfg(feature = "reqwest")]
impl ReqwestSource {
	/// Builds a source whose client aborts requests after `timeout`.
	pub fn new(timeout: Duration) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().timeout(timeout).build()?;

		Ok(Self { client, timeout })
	}

	/// Wraps an existing client; `timeout` is only used to label [`FetchError::Timeout`].
	pub fn with_client(client: ReqwestClient, timeout: Duration) -> Self {
		Self { client, timeout }
	}

	/// Deadline applied to each fetch.
	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	fn classify(&self, e: ReqwestError) -> FetchError {
		if e.is_timeout() { FetchError::Timeout { timeout: self.timeout } } else { FetchError::network(e) }
	}
}
#[cfg(feature = "reqwest")]
impl MetadataSource for ReqwestSource {
	fn fetch<'a>(&'a self, url: &'a Url) -> SourceFuture<'a> {
		Box::pin(async move {
			let response =
				self.client.get(url.clone()).send().await.map_err(|e| self.classify(e))?;
			let status = response.status();

			if !status.is_success() {
				return Err(FetchError::Status { status: status.as_u16() });
			}

			response.bytes().await.map_err(|e| self.classify(e))
		})
	}
}

/// Serves a fixed in-memory document; handy for offline runs and tests.
#[derive(Clone, Debug, Default)]
pub struct StaticSource(pub Bytes);
impl StaticSource {
	/// Wraps `document` as the bytes every fetch returns.
	pub fn new(document: impl Into<Bytes>) -> Self {
		Self(document.into())
	}
}
impl MetadataSource for StaticSource {
	fn fetch<'a>(&'a self, _url: &'a Url) -> SourceFuture<'a> {
		let bytes = self.0.clone();

		Box::pin(async move { Ok(bytes) })
	}
}
