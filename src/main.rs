//! `discofeed` server binary; configured through `DISCOFEED_*` environment variables.

// self
use discofeed::{config::FeedConfig, server};

#[tokio::main]
async fn main() -> discofeed::Result<()> {
	server::init_tracing();

	let config = FeedConfig::from_env()?;

	server::serve(&config).await
}
