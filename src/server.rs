//! HTTP surface of the feed.
//!
//! | Route | Response |
//! | --- | --- |
//! | `GET /?term=...` | JSON entity list, filtered by `term` when present |
//! | `GET /Reset` | `{"status":"ok"}` after the cached document is dropped |
//! | `GET /health` | `{"status":"ok","cached":bool}` |
//!
//! Failures are answered with `{"error": ..., "code": ...}`: fetch failures map to `502`
//! (`504` on timeout), undecodable metadata to `502`, anything else to `500`.

// crates.io
use axum::{
	Json, Router,
	extract::{RawQuery, State},
	http::{HeaderValue, StatusCode, header},
	response::{IntoResponse, Response},
	routing::get,
};
use tokio::{net::TcpListener, signal};
use tower_http::{
	cors::{Any, CorsLayer},
	trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	error::FetchError,
	feed::{Feed, Term},
};
#[cfg(feature = "reqwest")] use crate::config::FeedConfig;

/// Error body returned by every failing route.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Human-readable failure description.
	pub error: String,
	/// Stable machine-readable code.
	pub code: String,
}

/// Feed error rendered as an HTTP response.
#[derive(Debug, ThisError)]
#[error(transparent)]
pub struct ServerError(#[from] pub Error);
impl ServerError {
	/// Status code and stable code string for the wrapped error.
	pub fn classify(&self) -> (StatusCode, &'static str) {
		match &self.0 {
			Error::Fetch(FetchError::Timeout { .. }) =>
				(StatusCode::GATEWAY_TIMEOUT, "SOURCE_TIMEOUT"),
			Error::Fetch(_) => (StatusCode::BAD_GATEWAY, "SOURCE_UNAVAILABLE"),
			Error::Parse(_) => (StatusCode::BAD_GATEWAY, "METADATA_INVALID"),
			Error::Serialization(_) | Error::Config(_) | Error::Io(_) =>
				(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
		}
	}
}
impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let (status, code) = self.classify();

		tracing::error!(error = %self.0, code, status = status.as_u16(), "feed request failed");

		let body = ErrorResponse { error: self.0.to_string(), code: code.into() };

		(status, Json(body)).into_response()
	}
}

#[derive(Debug, Serialize)]
struct Ack {
	status: &'static str,
}

#[derive(Debug, Serialize)]
struct Health {
	status: &'static str,
	cached: bool,
}

/// Builds the router serving `feed`.
pub fn router(feed: Arc<Feed>) -> Router {
	let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

	Router::new()
		.route("/", get(index))
		.route("/Reset", get(reset))
		.route("/health", get(health))
		.layer(cors)
		.layer(TraceLayer::new_for_http())
		.with_state(feed)
}

async fn index(
	State(feed): State<Arc<Feed>>,
	RawQuery(query): RawQuery,
) -> Result<Response, ServerError> {
	let raw = query.as_deref().and_then(term_param);
	let term = Term::from_query(raw.as_deref());
	let body = feed.render(&term).await?;

	Ok(([(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))], body)
		.into_response())
}

async fn reset(State(feed): State<Arc<Feed>>) -> Json<Ack> {
	feed.reset();

	Json(Ack { status: "ok" })
}

async fn health(State(feed): State<Arc<Feed>>) -> Json<Health> {
	Json(Health { status: "ok", cached: feed.cache.is_populated() })
}

/// Extracts the first `term` value from a raw query string.
///
/// Decoding is lossy: malformed percent-escapes are kept literally and invalid UTF-8 is
/// replaced, so a bad query degrades to a best-effort term instead of a rejection.
pub fn term_param(query: &str) -> Option<String> {
	form_urlencoded::parse(query.as_bytes())
		.find(|(key, _)| key == "term")
		.map(|(_, value)| value.into_owned())
}

/// Serves `feed` on `listen` until Ctrl+C or SIGTERM.
pub async fn serve_feed(feed: Arc<Feed>, listen: SocketAddr) -> Result<()> {
	let listener = TcpListener::bind(listen).await?;

	tracing::info!(
		addr = %listener.local_addr()?,
		source = %feed.source_url,
		"discofeed listening"
	);

	axum::serve(listener, router(feed)).with_graceful_shutdown(shutdown_signal()).await?;

	tracing::info!("discofeed stopped");

	Ok(())
}

/// Builds a reqwest-backed feed from `config` and serves it.
#[cfg(feature = "reqwest")]
pub async fn serve(config: &FeedConfig) -> Result<()> {
	let feed = Feed::from_config(config)?;

	tracing::info!(
		projection = config.projection.as_str(),
		collation = config.collation.as_str(),
		preferred_lang = %config.preferred_lang,
		timeout = ?config.fetch_timeout,
		"feed configured"
	);

	serve_feed(Arc::new(feed), config.listen).await
}

/// Installs the `fmt` subscriber, filtered by `RUST_LOG` and defaulting to `info`.
///
/// Calling it again after a subscriber is installed has no effect.
pub fn init_tracing() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = signal::ctrl_c().await {
			tracing::warn!(error = %e, "Ctrl+C handler could not be installed");
			std::future::pending::<()>().await;
		}
	};
	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;
			},
			Err(e) => {
				tracing::warn!(error = %e, "SIGTERM handler could not be installed");
				std::future::pending::<()>().await;
			},
		}
	};
	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		() = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
		() = terminate => tracing::info!("received SIGTERM, shutting down"),
	}
}
