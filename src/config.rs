//! Runtime configuration for the feed server.
//!
//! Every knob has a default, can be set with a `with_*` builder method, and can be read from
//! the environment:
//!
//! | Variable | Default |
//! | --- | --- |
//! | `DISCOFEED_SOURCE_URL` | [`DEFAULT_SOURCE_URL`] |
//! | `DISCOFEED_LISTEN` | `127.0.0.1:8081` |
//! | `DISCOFEED_FETCH_TIMEOUT_SECS` | `30` |
//! | `DISCOFEED_PROJECTION` | `full` (`full` or `summary`) |
//! | `DISCOFEED_COLLATION` | `fr` (`fr` or `ordinal`) |
//! | `DISCOFEED_PREFERRED_LANG` | empty (first display name in document order) |

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	feed::{Collation, Projection},
};

/// RENATER main identity-provider metadata aggregate.
pub const DEFAULT_SOURCE_URL: &str =
	"https://metadata.federation.renater.fr/renater/main/main-idps-renater-metadata.xml";
/// Loopback listener used when no address is configured.
pub const DEFAULT_LISTEN: SocketAddr =
	SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST), 8081);
/// Fetch deadline used when none is configured.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

const ENV_SOURCE_URL: &str = "DISCOFEED_SOURCE_URL";
const ENV_LISTEN: &str = "DISCOFEED_LISTEN";
const ENV_FETCH_TIMEOUT_SECS: &str = "DISCOFEED_FETCH_TIMEOUT_SECS";
const ENV_PROJECTION: &str = "DISCOFEED_PROJECTION";
const ENV_COLLATION: &str = "DISCOFEED_COLLATION";
const ENV_PREFERRED_LANG: &str = "DISCOFEED_PREFERRED_LANG";

/// Settings shared by the feed and the HTTP server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedConfig {
	/// Location of the federation metadata document.
	pub source_url: Url,
	/// Socket address the server binds to.
	pub listen: SocketAddr,
	/// Deadline for a single metadata fetch.
	pub fetch_timeout: Duration,
	/// Output shape of `GET /`.
	pub projection: Projection,
	/// Display-name ordering.
	pub collation: Collation,
	/// Language whose display name is used for sorting and summaries.
	pub preferred_lang: String,
}
impl FeedConfig {
	/// Creates a configuration for `source_url` with every other knob at its default.
	pub fn new(source_url: Url) -> Self {
		Self {
			source_url,
			listen: DEFAULT_LISTEN,
			fetch_timeout: DEFAULT_FETCH_TIMEOUT,
			projection: Projection::default(),
			collation: Collation::default(),
			preferred_lang: String::new(),
		}
	}

	/// Sets the listen address.
	pub fn with_listen(mut self, listen: SocketAddr) -> Self {
		self.listen = listen;

		self
	}

	/// Sets the fetch deadline.
	pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
		self.fetch_timeout = timeout;

		self
	}

	/// Sets the output shape.
	pub fn with_projection(mut self, projection: Projection) -> Self {
		self.projection = projection;

		self
	}

	/// Sets the display-name ordering.
	pub fn with_collation(mut self, collation: Collation) -> Self {
		self.collation = collation;

		self
	}

	/// Sets the preferred display-name language.
	pub fn with_preferred_lang(mut self, lang: impl Into<String>) -> Self {
		self.preferred_lang = lang.into();

		self
	}

	/// Reads the configuration from the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Reads the configuration through `lookup`, treating unset and blank values alike.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
		let source_url = match var(ENV_SOURCE_URL) {
			Some(value) => parse_url(&value)?,
			None => parse_url(DEFAULT_SOURCE_URL)?,
		};
		let mut config = Self::new(source_url);

		if let Some(value) = var(ENV_LISTEN) {
			config.listen = value
				.trim()
				.parse()
				.map_err(|_| ConfigError::InvalidListenAddress { value: value.clone() })?;
		}
		if let Some(value) = var(ENV_FETCH_TIMEOUT_SECS) {
			config.fetch_timeout = parse_timeout(&value)?;
		}
		if let Some(value) = var(ENV_PROJECTION) {
			config.projection = value.parse()?;
		}
		if let Some(value) = var(ENV_COLLATION) {
			config.collation = value.parse()?;
		}
		if let Some(value) = var(ENV_PREFERRED_LANG) {
			config.preferred_lang = value.trim().to_owned();
		}

		Ok(config)
	}
}

fn parse_url(value: &str) -> Result<Url, ConfigError> {
	Url::parse(value.trim())
		.map_err(|source| ConfigError::InvalidSourceUrl { value: value.into(), source })
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
	match value.trim().parse::<u64>() {
		Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
		_ => Err(ConfigError::InvalidTimeout { value: value.into() }),
	}
}
