//! Observability helpers for the feed pipeline.
//!
//! Every stage runs inside a `tracing` span named `discofeed.feed` carrying a `stage` field.
//!
//! # Feature Flags
//!
//! - Enable `metrics` to increment the `discofeed_feed_total` counter for every
//!   attempt/success/failure, labeled by `stage` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Pipeline stages observed by the feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeedStage {
	/// Retrieval of the raw document from the source.
	Fetch,
	/// Decoding of the cached document.
	Parse,
	/// Filtering, sorting, and JSON projection.
	Render,
	/// Explicit cache invalidation.
	Reset,
}
impl FeedStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FeedStage::Fetch => "fetch",
			FeedStage::Parse => "parse",
			FeedStage::Render => "render",
			FeedStage::Reset => "reset",
		}
	}
}
impl Display for FeedStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeedOutcome {
	/// Entry to a stage.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FeedOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FeedOutcome::Attempt => "attempt",
			FeedOutcome::Success => "success",
			FeedOutcome::Failure => "failure",
		}
	}
}
impl Display for FeedOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records the success or failure of `result` for `stage`.
pub fn record_result<T, E>(stage: FeedStage, result: &Result<T, E>) {
	match result {
		Ok(_) => record_feed_outcome(stage, FeedOutcome::Success),
		Err(_) => record_feed_outcome(stage, FeedOutcome::Failure),
	}
}
