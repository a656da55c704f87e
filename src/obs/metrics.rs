// self
use crate::obs::{FeedOutcome, FeedStage};

/// Records a stage outcome via the global metrics recorder (when enabled).
///
/// The cache labels `fetch` and `reset`; the feed labels `parse` and `render`. Each
/// increments `discofeed_feed_total{stage, outcome}`.
pub fn record_feed_outcome(stage: FeedStage, outcome: FeedOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"discofeed_feed_total",
			"stage" => stage.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (stage, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_feed_outcome_noop_without_metrics() {
		record_feed_outcome(FeedStage::Fetch, FeedOutcome::Failure);
	}
}
