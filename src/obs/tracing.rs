// crates.io
use tracing::{Span, instrument::Instrumented, span::EnteredSpan};
// self
use crate::{_prelude::*, obs::FeedStage};

/// A span builder used by feed stages.
#[derive(Clone, Debug)]
pub struct FeedSpan {
	span: Span,
}
impl FeedSpan {
	/// Creates a new span tagged with the provided stage and call site.
	pub fn new(stage: FeedStage, site: &'static str) -> Self {
		Self { span: tracing::info_span!("discofeed.feed", stage = stage.as_str(), site) }
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> FeedSpanGuard {
		FeedSpanGuard { _guard: self.span.entered() }
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		tracing::Instrument::instrument(fut, self.span.clone())
	}
}

/// RAII guard returned by [`FeedSpan::entered`].
pub struct FeedSpanGuard {
	_guard: EnteredSpan,
}
impl Debug for FeedSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("FeedSpanGuard(..)")
	}
}
