//! Locale-aware string comparison and the display-name sort built on it.
//!
//! [`FrenchCollator`] approximates the French tailoring of the Unicode Collation Algorithm
//! with three levels:
//!
//! 1. base letters, case- and accent-insensitive (punctuation < digits < letters);
//! 2. accents, compared from the *end* of the string (French backward secondary ordering, so
//!    `cote < côte < coté < côté`);
//! 3. case, lowercase first.
//!
//! Strings equal on all three levels fall back to ordinal order so the comparison stays total.

// crates.io
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};
// self
use crate::{_prelude::*, metadata::EntityDescriptor};

/// Comparison strategy used to order display names.
pub trait Collator
where
	Self: Send + Sync,
{
	/// Compares two strings under this collation.
	fn compare(&self, a: &str, b: &str) -> Ordering;
}

/// Plain byte-wise ordering; deterministic and locale-free.
#[derive(Clone, Copy, Debug, Default)]
pub struct OrdinalCollator;
impl Collator for OrdinalCollator {
	fn compare(&self, a: &str, b: &str) -> Ordering {
		a.cmp(b)
	}
}

/// French collation (accent- and case-insensitive primary level, backward accents).
#[derive(Clone, Copy, Debug, Default)]
pub struct FrenchCollator;
impl Collator for FrenchCollator {
	fn compare(&self, a: &str, b: &str) -> Ordering {
		let (a_key, b_key) = (CollationKey::new(a), CollationKey::new(b));

		a_key
			.primary
			.cmp(&b_key.primary)
			.then_with(|| a_key.secondary.iter().rev().cmp(b_key.secondary.iter().rev()))
			.then_with(|| a_key.tertiary.cmp(&b_key.tertiary))
			.then_with(|| a.cmp(b))
	}
}

/// Named collation selectable from configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Collation {
	/// [`FrenchCollator`].
	#[default]
	French,
	/// [`OrdinalCollator`].
	Ordinal,
}
impl Collation {
	/// Returns a shared comparator for this collation.
	pub fn collator(self) -> Arc<dyn Collator> {
		match self {
			Self::French => Arc::new(FrenchCollator),
			Self::Ordinal => Arc::new(OrdinalCollator),
		}
	}

	/// Returns a stable label suitable for configuration and logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::French => "fr",
			Self::Ordinal => "ordinal",
		}
	}
}
impl FromStr for Collation {
	type Err = crate::error::ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"fr" | "french" => Ok(Self::French),
			"ordinal" | "binary" => Ok(Self::Ordinal),
			_ => Err(crate::error::ConfigError::UnknownCollation { value: s.into() }),
		}
	}
}

/// Orders entities by display name under `collator`.
///
/// The name tagged with `lang` is preferred, falling back to the first one. Entities without
/// any display name go last, ordered by `entity_id`; equal names also break ties on
/// `entity_id`.
pub fn sort_entities(entities: &mut [EntityDescriptor], collator: &dyn Collator, lang: &str) {
	entities.sort_by(|a, b| {
		let by_id = || a.entity_id.cmp(&b.entity_id);

		match (a.display_name(lang), b.display_name(lang)) {
			(Some(a_name), Some(b_name)) => collator.compare(a_name, b_name).then_with(by_id),
			(Some(_), None) => Ordering::Less,
			(None, Some(_)) => Ordering::Greater,
			(None, None) => by_id(),
		}
	});
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Primary {
	Other(char),
	Digit(char),
	Letter(char),
}

#[derive(Debug, Default)]
struct CollationKey {
	primary: Vec<Primary>,
	secondary: Vec<Vec<char>>,
	tertiary: Vec<bool>,
}
impl CollationKey {
	fn new(s: &str) -> Self {
		let mut key = Self::default();

		for c in s.nfd() {
			if is_combining_mark(c) {
				if let Some(marks) = key.secondary.last_mut() {
					marks.push(c);
				}

				continue;
			}
			if c.is_whitespace() {
				key.push(Primary::Other(' '), false);

				continue;
			}

			match c {
				'œ' | 'Œ' => key.expand("oe", c.is_uppercase()),
				'æ' | 'Æ' => key.expand("ae", c.is_uppercase()),
				'ß' => key.expand("ss", false),
				c if c.is_alphabetic() =>
					for lower in c.to_lowercase() {
						key.push(Primary::Letter(lower), c.is_uppercase());
					},
				c if c.is_numeric() => key.push(Primary::Digit(c), false),
				c => key.push(Primary::Other(c), false),
			}
		}

		key
	}

	fn push(&mut self, primary: Primary, upper: bool) {
		self.primary.push(primary);
		self.secondary.push(Vec::new());
		self.tertiary.push(upper);
	}

	fn expand(&mut self, letters: &str, upper: bool) {
		for letter in letters.chars() {
			self.push(Primary::Letter(letter), upper);
		}
	}
}
