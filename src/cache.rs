//! Process-wide cache of the raw metadata document with singleflight refills.
//!
//! The cache owns bytes only; parsed entities are rebuilt for every request. A refill is
//! serialized behind an async guard, so however many requests arrive while the cache is empty,
//! the source sees one fetch and every waiter receives the same bytes (or the same error).
//! [`MetadataCache::reset`] bumps a generation counter, which keeps a fetch that was already in
//! flight from repopulating the cache with a document that predates the reset.

// self
use crate::{
	_prelude::*,
	error::FetchError,
	obs::{self, FeedOutcome, FeedStage},
	source::MetadataSource,
};

#[derive(Debug, Default)]
struct Slot {
	bytes: Option<Bytes>,
	generation: u64,
	refills: u64,
	last_failure: Option<FetchError>,
}

/// Lock-protected optional byte buffer with a coalesced refill operation.
#[derive(Debug, Default)]
pub struct MetadataCache {
	slot: Mutex<Slot>,
	refill: AsyncMutex<()>,
}
impl MetadataCache {
	/// Creates an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the cached document, fetching it from `source` when the cache is empty.
	///
	/// Fetch failures are returned to every caller waiting on the same refill and leave the
	/// cache empty; the next call after that retries the source.
	pub async fn get_or_fetch(
		&self,
		source: &dyn MetadataSource,
		url: &Url,
	) -> Result<Bytes, FetchError> {
		let observed = {
			let slot = self.slot.lock();

			if let Some(bytes) = &slot.bytes {
				tracing::debug!(bytes = bytes.len(), "serving metadata from cache");

				return Ok(bytes.clone());
			}

			slot.refills
		};
		let _singleflight = self.refill.lock().await;
		let generation = {
			let slot = self.slot.lock();

			if let Some(bytes) = &slot.bytes {
				return Ok(bytes.clone());
			}
			// Another caller finished a refill while this one waited on the guard.
			if slot.refills != observed
				&& let Some(err) = &slot.last_failure
			{
				return Err(err.clone());
			}

			slot.generation
		};

		obs::record_feed_outcome(FeedStage::Fetch, FeedOutcome::Attempt);
		tracing::info!(%url, "fetching metadata document");

		let outcome = source.fetch(url).await;

		obs::record_result(FeedStage::Fetch, &outcome);

		let mut slot = self.slot.lock();

		slot.refills += 1;

		match &outcome {
			Ok(bytes) => {
				slot.last_failure = None;

				if slot.generation == generation {
					tracing::info!(bytes = bytes.len(), "metadata document cached");

					slot.bytes = Some(bytes.clone());
				} else {
					tracing::debug!("cache was reset during the fetch; result not cached");
				}
			},
			Err(err) => {
				tracing::warn!(error = %err, "metadata fetch failed; cache left empty");

				slot.last_failure = Some(err.clone());
			},
		}

		outcome
	}

	/// Clears the cached document; the next [`get_or_fetch`](Self::get_or_fetch) refetches.
	///
	/// Idempotent.
	pub fn reset(&self) {
		let mut slot = self.slot.lock();

		slot.bytes = None;
		slot.last_failure = None;
		slot.generation += 1;

		obs::record_feed_outcome(FeedStage::Reset, FeedOutcome::Success);
		tracing::info!(generation = slot.generation, "metadata cache reset");
	}

	/// Returns true if a document is currently cached.
	pub fn is_populated(&self) -> bool {
		self.slot.lock().bytes.is_some()
	}
}
