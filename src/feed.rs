//! Feed orchestration: cache → parse → filter → sort → project.

pub mod collate;
pub mod projection;
pub mod term;

pub use collate::*;
pub use projection::*;
pub use term::*;

// self
use crate::{
	_prelude::*,
	cache::MetadataCache,
	config::FeedConfig,
	metadata::{self, EntityDescriptor},
	obs::{self, FeedOutcome, FeedSpan, FeedStage},
	source::MetadataSource,
};
#[cfg(feature = "reqwest")] use crate::source::ReqwestSource;

/// Serves the entity feed for a single metadata source.
///
/// The feed owns the source, the byte cache, and the ordering/projection strategy. Every
/// request re-parses the cached document, so entity lists are never shared between requests
/// and a [`Feed::reset`] takes effect on the very next call.
#[derive(Clone)]
pub struct Feed {
	/// Transport used to retrieve the document.
	pub source: Arc<dyn MetadataSource>,
	/// Location of the federation metadata document.
	pub source_url: Url,
	/// Raw document cache shared by every request.
	pub cache: Arc<MetadataCache>,
	/// Display-name comparator.
	pub collator: Arc<dyn Collator>,
	/// Language whose display name drives sorting and summaries.
	pub preferred_lang: String,
	/// Output shape.
	pub projection: Projection,
}
impl Feed {
	/// Creates a feed with an empty cache, French collation, and the full projection.
	///
	/// Entities are keyed on their first display name until a preferred language is set.
	pub fn new(source: Arc<dyn MetadataSource>, source_url: Url) -> Self {
		Self {
			source,
			source_url,
			cache: Default::default(),
			collator: Collation::French.collator(),
			preferred_lang: String::new(),
			projection: Projection::Full,
		}
	}

	/// Replaces the display-name comparator.
	pub fn with_collator(mut self, collator: Arc<dyn Collator>) -> Self {
		self.collator = collator;

		self
	}

	/// Sets the language used to pick each entity's display name; empty means "first".
	pub fn with_preferred_lang(mut self, lang: impl Into<String>) -> Self {
		self.preferred_lang = lang.into();

		self
	}

	/// Selects the output shape.
	pub fn with_projection(mut self, projection: Projection) -> Self {
		self.projection = projection;

		self
	}

	/// Shares an existing cache instead of the feed's own.
	pub fn with_cache(mut self, cache: Arc<MetadataCache>) -> Self {
		self.cache = cache;

		self
	}

	/// Applies the ordering and projection knobs of `config`.
	pub fn configured(self, config: &FeedConfig) -> Self {
		self.with_collator(config.collation.collator())
			.with_preferred_lang(config.preferred_lang.clone())
			.with_projection(config.projection)
	}

	/// Returns the entities selected by `term`, sorted by display name.
	pub async fn entities(&self, term: &Term) -> Result<Vec<EntityDescriptor>> {
		let bytes = self.cache.get_or_fetch(self.source.as_ref(), &self.source_url).await?;
		let _span = FeedSpan::new(FeedStage::Parse, "entities").entered();

		obs::record_feed_outcome(FeedStage::Parse, FeedOutcome::Attempt);

		let parsed = metadata::parse(&bytes);

		obs::record_result(FeedStage::Parse, &parsed);

		let doc = parsed.inspect_err(|err| {
			tracing::error!(error = %err, "metadata document could not be decoded");
		})?;
		let total = doc.len();
		let mut entities = term.filter(doc.into_entities());

		sort_entities(&mut entities, self.collator.as_ref(), &self.preferred_lang);
		tracing::debug!(%term, total, selected = entities.len(), "entity list prepared");

		Ok(entities)
	}

	/// Produces the JSON body for `term` under the configured projection.
	pub async fn render(&self, term: &Term) -> Result<Vec<u8>> {
		let span = FeedSpan::new(FeedStage::Render, "render");

		obs::record_feed_outcome(FeedStage::Render, FeedOutcome::Attempt);

		let result: Result<Vec<u8>> = span
			.instrument(async move {
				let entities = self.entities(term).await?;

				Ok(projection::render(&entities, self.projection, &self.preferred_lang)?)
			})
			.await;

		obs::record_result(FeedStage::Render, &result);

		result
	}

	/// Invalidates the cached document.
	pub fn reset(&self) {
		self.cache.reset();
	}
}
#[cfg(feature = "reqwest")]
impl Feed {
	/// Builds a reqwest-backed feed from configuration.
	pub fn from_config(config: &FeedConfig) -> Result<Self> {
		let source = ReqwestSource::new(config.fetch_timeout)?;

		Ok(Self::new(Arc::new(source), config.source_url.clone()).configured(config))
	}
}
impl Debug for Feed {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Feed")
			.field("source_url", &self.source_url.as_str())
			.field("preferred_lang", &self.preferred_lang)
			.field("projection", &self.projection)
			.field("cached", &self.cache.is_populated())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
	// crates.io
	use serde_json::Value;
	// self
	use super::*;
	use crate::{
		error::{Error, FetchError, ParseError},
		source::{SourceFuture, StaticSource},
	};

	const FEDERATION: &str = include_str!("../tests/fixtures/federation.xml");

	struct FlakySource {
		calls: AtomicUsize,
	}
	impl MetadataSource for FlakySource {
		fn fetch<'a>(&'a self, _url: &'a Url) -> SourceFuture<'a> {
			Box::pin(async move {
				match self.calls.fetch_add(1, AtomicOrdering::SeqCst) {
					0 => Err(FetchError::Timeout { timeout: Duration::from_secs(1) }),
					_ => Ok(Bytes::from_static(FEDERATION.as_bytes())),
				}
			})
		}
	}

	fn url() -> Url {
		Url::parse("http://metadata.invalid/idps.xml").expect("Fixture URL should parse.")
	}

	fn feed(document: &'static str) -> Feed {
		Feed::new(Arc::new(StaticSource::new(document)), url())
	}

	fn ids(entities: &[EntityDescriptor]) -> Vec<&str> {
		entities.iter().map(|entity| entity.entity_id.as_str()).collect()
	}

	#[tokio::test]
	async fn term_selects_matching_scope_only() {
		let feed = feed(FEDERATION);
		let entities = feed
			.entities(&Term::from_query(Some("unimes.fr")))
			.await
			.expect("Filtered feed should build.");

		assert_eq!(ids(&entities), ["https://federation.unimes.fr/idp/shibboleth"]);
	}

	#[tokio::test]
	async fn absent_term_returns_everything_sorted_by_name() {
		let feed = feed(FEDERATION);
		let entities = feed.entities(&Term::None).await.expect("Full feed should build.");

		assert_eq!(
			ids(&entities),
			[
				"https://idp.univ-lyon1.fr/idp/shibboleth",
				"https://federation.unimes.fr/idp/shibboleth",
			]
		);
	}

	#[tokio::test]
	async fn email_terms_filter_on_the_domain() {
		let feed = feed(FEDERATION);
		let entities = feed
			.entities(&Term::from_query(Some("jane.doe@etu.univ-lyon1.fr")))
			.await
			.expect("Filtered feed should build.");

		assert_eq!(ids(&entities), ["https://idp.univ-lyon1.fr/idp/shibboleth"]);
	}

	#[tokio::test]
	async fn rendered_full_feed_preserves_every_field() {
		let feed = feed(FEDERATION);
		let body = feed.render(&Term::None).await.expect("Rendering should succeed.");
		let value: Value = serde_json::from_slice(&body).expect("Body should be valid JSON.");
		let doc = metadata::parse(FEDERATION.as_bytes()).expect("Fixture should decode.");
		let entries = value.as_array().expect("Body should be a JSON array.");

		assert_eq!(entries.len(), doc.len());

		for entity in &doc.entities {
			let entry = entries
				.iter()
				.find(|entry| entry["entityID"] == entity.entity_id.as_str())
				.expect("Every entity should be rendered.");

			assert_eq!(entry["id"], entity.entity_id.as_str());
			assert_eq!(
				entry["DisplayNames"],
				serde_json::to_value(&entity.display_names).expect("Names should serialize.")
			);

			if !entity.descriptions.is_empty() {
				assert_eq!(
					entry["Descriptions"],
					serde_json::to_value(&entity.descriptions)
						.expect("Descriptions should serialize.")
				);
			}
			if !entity.logos.is_empty() {
				assert_eq!(
					entry["Logos"],
					serde_json::to_value(&entity.logos).expect("Logos should serialize.")
				);
			}

			assert_eq!(
				entry["InformationURLs"],
				serde_json::to_value(&entity.information_urls)
					.expect("Information URLs should serialize.")
			);
			assert_eq!(
				entry["Scopes"],
				serde_json::to_value(&entity.scopes).expect("Scopes should serialize.")
			);
		}
	}

	#[tokio::test]
	async fn summary_projection_is_selectable() {
		let feed =
			feed(FEDERATION).with_projection(Projection::Summary).with_preferred_lang("fr");
		let body = feed
			.render(&Term::from_query(Some("unimes.fr")))
			.await
			.expect("Rendering should succeed.");
		let value: Value = serde_json::from_slice(&body).expect("Body should be valid JSON.");

		assert_eq!(value[0]["text"], "Université de Nîmes");
		assert_eq!(value[0]["scope"][0], "unimes.fr");
	}

	#[tokio::test]
	async fn default_configuration_sorts_on_the_first_display_name() {
		let document = r#"<EntitiesDescriptor>
			<EntityDescriptor entityID="https://b"><IDPSSODescriptor><Extensions><UIInfo>
				<DisplayName xml:lang="en">Alpha University</DisplayName>
				<DisplayName xml:lang="fr">Zénith Université</DisplayName>
			</UIInfo></Extensions></IDPSSODescriptor></EntityDescriptor>
			<EntityDescriptor entityID="https://a"><IDPSSODescriptor><Extensions><UIInfo>
				<DisplayName xml:lang="en">Beta Institute</DisplayName>
				<DisplayName xml:lang="fr">Institut Bêta</DisplayName>
			</UIInfo></Extensions></IDPSSODescriptor></EntityDescriptor>
		</EntitiesDescriptor>"#;
		let config = FeedConfig::from_lookup(|_| None).expect("Defaults should be valid.");
		let default = feed(document).configured(&config);
		let entities = default.entities(&Term::None).await.expect("Feed should build.");

		assert_eq!(ids(&entities), ["https://b", "https://a"]);

		let french = feed(document).configured(&config.with_preferred_lang("fr"));
		let entities = french.entities(&Term::None).await.expect("Feed should build.");

		assert_eq!(ids(&entities), ["https://a", "https://b"]);
	}

	#[tokio::test]
	async fn parse_failure_aborts_the_request() {
		let feed = feed("<EntitiesDescriptor><EntityDescriptor></EntitiesDescriptor>");
		let err = feed.entities(&Term::None).await.expect_err("Malformed XML should fail.");

		assert!(matches!(err, Error::Parse(ParseError::Xml { .. })));
	}

	#[tokio::test]
	async fn fetch_failure_is_reported_and_retried_on_the_next_request() {
		let source = Arc::new(FlakySource { calls: AtomicUsize::new(0) });
		let feed = Feed::new(source.clone(), url());
		let err = feed.entities(&Term::None).await.expect_err("First fetch should time out.");

		assert!(matches!(err, Error::Fetch(FetchError::Timeout { .. })));
		assert!(!feed.cache.is_populated());

		let entities = feed.entities(&Term::None).await.expect("Retry should succeed.");

		assert_eq!(entities.len(), 2);
		assert_eq!(source.calls.load(AtomicOrdering::SeqCst), 2);
	}

	#[tokio::test]
	async fn reset_forces_the_next_request_to_refetch() {
		let source = Arc::new(FlakySource { calls: AtomicUsize::new(1) });
		let feed = Feed::new(source.clone(), url());

		feed.entities(&Term::None).await.expect("First request should succeed.");
		feed.entities(&Term::None).await.expect("Cached request should succeed.");
		assert_eq!(source.calls.load(AtomicOrdering::SeqCst), 2);

		feed.reset();
		feed.reset();
		feed.entities(&Term::None).await.expect("Request after reset should succeed.");
		assert_eq!(source.calls.load(AtomicOrdering::SeqCst), 3);
	}
}
