//! Federation discovery feed adapter: fetch a SAML metadata document once, then serve its
//! identity providers as a scope-filtered, collation-sorted JSON feed.
//!
//! The pipeline is `fetch → parse → filter → sort → serialize`:
//!
//! - [`source`] retrieves the raw document through the [`source::MetadataSource`] contract.
//! - [`cache`] keeps the last-fetched bytes and coalesces concurrent refills.
//! - [`metadata`] decodes `EntitiesDescriptor` XML into [`metadata::EntityDescriptor`] values.
//! - [`feed`] applies the scope term, the locale-aware sort, and the JSON projection.
//! - [`server`] exposes the feed over HTTP (`GET /`, `GET /Reset`, `GET /health`).

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod cache;
pub mod config;
pub mod error;
pub mod feed;
pub mod metadata;
pub mod obs;
pub mod server;
pub mod source;

mod _prelude {
	pub use std::{
		cmp::Ordering,
		collections::HashSet,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		net::SocketAddr,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use bytes::Bytes;
	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
pub use crate::error::{Error, Result};
#[cfg(test)] use {color_eyre as _, http_body_util as _, httpmock as _, tower as _};
