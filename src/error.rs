//! Feed-level error types shared across the source, parser, and server layers.

// self
use crate::_prelude::*;

/// Feed-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type SharedError = Arc<dyn StdError + Send + Sync>;

/// Canonical feed error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// The metadata document could not be retrieved.
	#[error(transparent)]
	Fetch(#[from] FetchError),
	/// The metadata document is malformed.
	#[error(transparent)]
	Parse(#[from] ParseError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The entity list could not be encoded as JSON.
	#[error("Feed could not be serialized to JSON.")]
	Serialization(#[from] serde_json::Error),
	/// Listener or socket failure while serving the feed.
	#[error("I/O error occurred while serving the feed.")]
	Io(#[from] std::io::Error),
}

/// Failures raised while retrieving the metadata document.
///
/// The type is cheap to clone so a single failed refill can be reported to every request
/// that was waiting on it.
#[derive(Clone, Debug, ThisError)]
pub enum FetchError {
	/// Underlying HTTP client reported a network failure (DNS, TCP, TLS, body read).
	#[error("Network error occurred while fetching the metadata document.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: SharedError,
	},
	/// The source did not answer before the configured deadline.
	#[error("Metadata source did not respond within {timeout:?}.")]
	Timeout {
		/// Deadline applied to the request.
		timeout: Duration,
	},
	/// The source answered with a non-success HTTP status.
	#[error("Metadata source responded with HTTP status {status}.")]
	Status {
		/// HTTP status code returned by the source.
		status: u16,
	},
}
impl FetchError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Arc::new(src) }
	}
}

/// Failures raised while decoding the metadata document.
#[derive(Debug, ThisError)]
pub enum ParseError {
	/// The document is not well-formed XML.
	#[error("Metadata document is not well-formed XML near byte {position}.")]
	Xml {
		/// Reader offset at which the failure was detected.
		position: u64,
		/// Underlying reader failure.
		#[source]
		source: quick_xml::Error,
	},
	/// Character data is not valid UTF-8.
	#[error("Metadata document contains invalid UTF-8.")]
	Utf8(#[from] std::str::Utf8Error),
	/// The document has no root element.
	#[error("Metadata document is empty.")]
	Empty,
	/// The document ended before an element was closed.
	#[error("Metadata document ended before `{element}` was closed.")]
	UnclosedElement {
		/// Local name of the innermost open element.
		element: String,
	},
	/// An entity descriptor lacks a usable `entityID`.
	#[error("Entity descriptor #{index} is missing its entityID.")]
	MissingEntityId {
		/// Zero-based position of the descriptor in document order.
		index: usize,
	},
	/// Two entity descriptors share an `entityID`.
	#[error("Entity descriptor `{entity_id}` appears more than once.")]
	DuplicateEntityId {
		/// The repeated identifier.
		entity_id: String,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: Box<dyn StdError + Send + Sync>,
	},
	/// Source document URL cannot be parsed.
	#[error("Source URL `{value}` is invalid.")]
	InvalidSourceUrl {
		/// Rejected value.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Listen address cannot be parsed.
	#[error("Listen address `{value}` is invalid.")]
	InvalidListenAddress {
		/// Rejected value.
		value: String,
	},
	/// Fetch timeout is not a positive number of seconds.
	#[error("Fetch timeout `{value}` must be a positive number of seconds.")]
	InvalidTimeout {
		/// Rejected value.
		value: String,
	},
	/// Projection name is not recognized.
	#[error("Projection `{value}` is unknown; expected `full` or `summary`.")]
	UnknownProjection {
		/// Rejected value.
		value: String,
	},
	/// Collation name is not recognized.
	#[error("Collation `{value}` is unknown; expected `fr` or `ordinal`.")]
	UnknownCollation {
		/// Rejected value.
		value: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
