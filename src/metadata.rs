//! Identity-provider metadata model and the XML decoder that builds it.

pub mod parser;

pub use parser::parse;

// self
use crate::_prelude::*;

/// Root of a decoded metadata document: every entity descriptor in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntitiesDoc {
	/// Entity descriptors found below the document root.
	pub entities: Vec<EntityDescriptor>,
}
impl EntitiesDoc {
	/// Number of decoded entities.
	pub fn len(&self) -> usize {
		self.entities.len()
	}

	/// Returns true if the document holds no entity descriptors.
	pub fn is_empty(&self) -> bool {
		self.entities.is_empty()
	}

	/// Consumes the document, yielding the owned entity list.
	pub fn into_entities(self) -> Vec<EntityDescriptor> {
		self.entities
	}
}

/// One identity provider's published metadata record.
///
/// Every list may be empty; federations do not require localized UI information, so
/// consumers must never assume a first element exists.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntityDescriptor {
	/// Stable identifier (`entityID`), unique within a document.
	pub entity_id: String,
	/// Localized display names in document order.
	pub display_names: Vec<Localized>,
	/// Localized descriptions in document order.
	pub descriptions: Vec<Localized>,
	/// Localized informational URLs in document order.
	pub information_urls: Vec<Localized>,
	/// Logos in document order.
	pub logos: Vec<Logo>,
	/// Email-domain scopes this provider is authoritative for.
	pub scopes: Vec<Scope>,
}
impl EntityDescriptor {
	/// Creates an empty descriptor for `entity_id`.
	pub fn new(entity_id: impl Into<String>) -> Self {
		Self { entity_id: entity_id.into(), ..Default::default() }
	}

	/// Picks the display name used for sorting and summaries.
	///
	/// The first name tagged with `lang` wins; otherwise the first name in document order.
	pub fn display_name(&self, lang: &str) -> Option<&str> {
		self.display_names
			.iter()
			.find(|name| !lang.is_empty() && name.lang == lang)
			.or_else(|| self.display_names.first())
			.map(|name| name.value.as_str())
	}

	/// Returns true if at least one scope contains `needle` (case-sensitive).
	pub fn has_scope_containing(&self, needle: &str) -> bool {
		self.scopes.iter().any(|scope| scope.value.contains(needle))
	}

	/// Adds a display name; used by fixtures and builders.
	pub fn with_display_name(mut self, value: impl Into<String>, lang: impl Into<String>) -> Self {
		self.display_names.push(Localized::new(value, lang));

		self
	}

	/// Adds a scope; used by fixtures and builders.
	pub fn with_scope(mut self, value: impl Into<String>) -> Self {
		self.scopes.push(Scope { value: value.into() });

		self
	}
}

/// Text tagged with an `xml:lang` code (empty when the source omits it).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Localized {
	/// Character data of the element.
	pub value: String,
	/// Language tag.
	pub lang: String,
}
impl Localized {
	/// Creates a localized value.
	pub fn new(value: impl Into<String>, lang: impl Into<String>) -> Self {
		Self { value: value.into(), lang: lang.into() }
	}
}

/// Logo reference: a `data:` URI or an image URL plus the declared pixel size.
///
/// Sizes stay as the attribute strings published by the federation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Logo {
	/// Image data URI or URL.
	pub value: String,
	/// Declared height attribute.
	pub height: String,
	/// Declared width attribute.
	pub width: String,
}

/// Email-domain scope string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
	/// Domain suffix as published, e.g. `unimes.fr`.
	pub value: String,
}
