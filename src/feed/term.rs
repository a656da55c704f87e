//! Scope term extraction and filtering.

// self
use crate::{_prelude::*, metadata::EntityDescriptor};

/// Effective filter derived from the raw `term` query parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Term {
	/// No term supplied; the full list is returned.
	None,
	/// Keep entities with at least one scope containing this string.
	Scope(String),
	/// The raw term could not be reduced to a domain; nothing matches.
	Unmatchable,
}
impl Term {
	/// Derives the effective term from the raw query value.
	///
	/// A full email address is reduced to its domain part, so `user@unimes.fr` filters on
	/// `unimes.fr`. Values with more than one `@` match nothing.
	pub fn from_query(raw: Option<&str>) -> Self {
		let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
			return Self::None;
		};

		match raw.split('@').collect::<Vec<_>>().as_slice() {
			[term] => Self::Scope((*term).to_owned()),
			[_, domain] => Self::Scope((*domain).to_owned()),
			_ => Self::Unmatchable,
		}
	}

	/// Returns true if the term restricts the entity list.
	pub fn is_filtering(&self) -> bool {
		!matches!(self, Self::None)
	}

	/// Decides whether `entity` belongs in the result for this term.
	///
	/// Match state is evaluated per entity; an entity without scopes never matches a
	/// filtering term.
	pub fn matches(&self, entity: &EntityDescriptor) -> bool {
		match self {
			Self::None => true,
			Self::Scope(needle) => entity.has_scope_containing(needle),
			Self::Unmatchable => false,
		}
	}

	/// Keeps the entities matching this term, preserving their order.
	pub fn filter(&self, entities: Vec<EntityDescriptor>) -> Vec<EntityDescriptor> {
		if !self.is_filtering() {
			return entities;
		}

		entities.into_iter().filter(|entity| self.matches(entity)).collect()
	}
}
impl Display for Term {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::None => f.write_str("<none>"),
			Self::Scope(needle) => f.write_str(needle),
			Self::Unmatchable => f.write_str("<unmatchable>"),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn entity(id: &str, scopes: &[&str]) -> EntityDescriptor {
		scopes.iter().fold(EntityDescriptor::new(id), |entity, scope| entity.with_scope(*scope))
	}

	#[test]
	fn splits_email_addresses_on_at_sign() {
		assert_eq!(Term::from_query(Some("fr")), Term::Scope("fr".into()));
		assert_eq!(Term::from_query(Some("user@unimes.fr")), Term::Scope("unimes.fr".into()));
		assert_eq!(Term::from_query(Some("user@")), Term::Scope(String::new()));
		assert_eq!(Term::from_query(Some("a@b@c")), Term::Unmatchable);
		assert_eq!(Term::from_query(Some("")), Term::None);
		assert_eq!(Term::from_query(None), Term::None);
	}

	#[test]
	fn filter_requires_any_scope_to_contain_the_term() {
		let entities = vec![
			entity("https://unimes", &["unimes.fr"]),
			entity("https://lyon1", &["univ-lyon1.fr", "etu.univ-lyon1.fr"]),
			entity("https://lyon1-last", &["etu.univ-lyon1.fr", "unimes.fr"]),
			entity("https://unscoped", &[]),
		];
		let ids = |term: &str| {
			Term::from_query(Some(term))
				.filter(entities.clone())
				.into_iter()
				.map(|e| e.entity_id)
				.collect::<Vec<_>>()
		};

		assert_eq!(ids("unimes.fr"), ["https://unimes", "https://lyon1-last"]);
		assert_eq!(ids("prof@univ-lyon1.fr"), ["https://lyon1", "https://lyon1-last"]);
		assert_eq!(ids("fr"), ["https://unimes", "https://lyon1", "https://lyon1-last"]);
		assert!(ids("UNIMES.FR").is_empty());
		assert!(ids("a@b@unimes.fr").is_empty());
	}

	#[test]
	fn unscoped_entities_never_match_a_filtering_term() {
		let unscoped = entity("https://unscoped", &[]);

		for raw in ["fr", "user@", "x@y@z"] {
			assert!(!Term::from_query(Some(raw)).matches(&unscoped), "term {raw:?} matched");
		}

		assert!(Term::None.matches(&unscoped));
	}

	#[test]
	fn absent_term_keeps_everything() {
		let entities = vec![entity("https://a", &[]), entity("https://b", &["b.fr"])];

		assert_eq!(Term::None.filter(entities.clone()), entities);
	}
}
