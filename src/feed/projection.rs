//! JSON projections of the entity list.

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	metadata::{EntityDescriptor, Localized, Logo, Scope},
};

/// Output shape selected by configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Projection {
	/// Every attribute of every entity.
	#[default]
	Full,
	/// Reduced `{id, text, logo, scope}` record per entity.
	Summary,
}
impl Projection {
	/// Returns a stable label suitable for configuration and logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Full => "full",
			Self::Summary => "summary",
		}
	}
}
impl FromStr for Projection {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"full" => Ok(Self::Full),
			"summary" => Ok(Self::Summary),
			_ => Err(ConfigError::UnknownProjection { value: s.into() }),
		}
	}
}

/// Full per-entity record. `Descriptions`, `Logos`, and `Scopes` are omitted when empty.
///
/// `DisplayNames` and `InformationURLs` are always present and render as `[]` when empty,
/// where the Go service this feed replaces emitted `null`.
#[derive(Debug, Serialize)]
pub struct FullEntry<'a> {
	/// Echo of `entityID`, kept for clients that key on `id`.
	pub id: &'a str,
	/// Entity identifier.
	#[serde(rename = "entityID")]
	pub entity_id: &'a str,
	/// Localized display names.
	#[serde(rename = "DisplayNames")]
	pub display_names: &'a [Localized],
	/// Localized descriptions.
	#[serde(rename = "Descriptions", skip_serializing_if = "is_empty")]
	pub descriptions: &'a [Localized],
	/// Localized informational URLs.
	#[serde(rename = "InformationURLs")]
	pub information_urls: &'a [Localized],
	/// Logos.
	#[serde(rename = "Logos", skip_serializing_if = "is_empty")]
	pub logos: &'a [Logo],
	/// Scopes.
	#[serde(rename = "Scopes", skip_serializing_if = "is_empty")]
	pub scopes: &'a [Scope],
}
impl<'a> From<&'a EntityDescriptor> for FullEntry<'a> {
	fn from(entity: &'a EntityDescriptor) -> Self {
		Self {
			id: &entity.entity_id,
			entity_id: &entity.entity_id,
			display_names: &entity.display_names,
			descriptions: &entity.descriptions,
			information_urls: &entity.information_urls,
			logos: &entity.logos,
			scopes: &entity.scopes,
		}
	}
}

/// Reduced per-entity record used by discovery widgets.
#[derive(Debug, Serialize)]
pub struct SummaryEntry<'a> {
	/// Entity identifier.
	pub id: &'a str,
	/// Display name in the preferred language, or an empty string.
	pub text: &'a str,
	/// First logo, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub logo: Option<&'a str>,
	/// Scope strings.
	pub scope: Vec<&'a str>,
}
impl<'a> SummaryEntry<'a> {
	/// Projects `entity`, choosing the display name tagged with `lang` when present.
	pub fn new(entity: &'a EntityDescriptor, lang: &str) -> Self {
		Self {
			id: &entity.entity_id,
			text: entity.display_name(lang).unwrap_or_default(),
			logo: entity.logos.first().map(|logo| logo.value.as_str()),
			scope: entity.scopes.iter().map(|scope| scope.value.as_str()).collect(),
		}
	}
}

fn is_empty<T>(items: &&[T]) -> bool {
	items.is_empty()
}

/// Serializes `entities` under `projection`, followed by a newline.
pub fn render(
	entities: &[EntityDescriptor],
	projection: Projection,
	lang: &str,
) -> Result<Vec<u8>, serde_json::Error> {
	let mut body = match projection {
		Projection::Full =>
			serde_json::to_vec(&entities.iter().map(FullEntry::from).collect::<Vec<_>>())?,
		Projection::Summary => serde_json::to_vec(
			&entities.iter().map(|entity| SummaryEntry::new(entity, lang)).collect::<Vec<_>>(),
		)?,
	};

	body.push(b'\n');

	Ok(body)
}
