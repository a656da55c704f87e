//! Event-driven decoder for SAML `EntitiesDescriptor` documents.
//!
//! Elements and attributes are matched by local name, so the usual `md:`, `mdui:` and
//! `shibmd:` prefixes (or none at all) decode identically. Entity descriptors are collected at
//! any depth below the root, which flattens nested `EntitiesDescriptor` groups. Inside an
//! entity only these paths are read:
//!
//! - `IDPSSODescriptor/Extensions/UIInfo/{DisplayName,Description,InformationURL,Logo}`
//! - `IDPSSODescriptor/Extensions/Scope`

// crates.io
use quick_xml::{
	Reader,
	events::{BytesStart, Event},
};
// self
use crate::{
	_prelude::*,
	error::ParseError,
	metadata::{EntitiesDoc, EntityDescriptor, Localized, Logo, Scope},
};

const ENTITY: &[u8] = b"EntityDescriptor";
const UI_INFO_PATH: [&[u8]; 3] = [b"IDPSSODescriptor", b"Extensions", b"UIInfo"];
const SCOPE_PATH: [&[u8]; 2] = [b"IDPSSODescriptor", b"Extensions"];

/// Decodes a metadata document into its entity list.
///
/// Any syntax error, premature end, or identifier violation aborts the whole decode; no
/// partial document is ever returned.
pub fn parse(bytes: &[u8]) -> Result<EntitiesDoc, ParseError> {
	let mut reader = Reader::from_reader(bytes);
	let mut decoder = Decoder::default();

	reader.config_mut().expand_empty_elements = true;

	loop {
		let event = reader.read_event().map_err(|source| ParseError::Xml {
			position: reader.buffer_position(),
			source,
		})?;

		decoder.position = reader.buffer_position();

		match event {
			Event::Start(e) => decoder.open(&e)?,
			Event::End(_) => decoder.close()?,
			Event::Text(t) => {
				if decoder.capturing() {
					let text = t.unescape().map_err(|source| decoder.xml(source))?;

					decoder.push_text(&text);
				}
			},
			Event::CData(c) =>
				if decoder.capturing() {
					let raw = c.into_inner();

					decoder.push_text(std::str::from_utf8(&raw)?);
				},
			Event::Eof => return decoder.finish(),
			_ => {},
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
	DisplayName,
	Description,
	InformationUrl,
	Logo,
	Scope,
}
impl Field {
	/// Maps a path relative to the enclosing entity onto the field it feeds.
	fn resolve(path: &[Vec<u8>]) -> Option<Self> {
		let (leaf, parents) = path.split_last()?;

		if parents.iter().map(Vec::as_slice).eq(UI_INFO_PATH) {
			return match leaf.as_slice() {
				b"DisplayName" => Some(Self::DisplayName),
				b"Description" => Some(Self::Description),
				b"InformationURL" => Some(Self::InformationUrl),
				b"Logo" => Some(Self::Logo),
				_ => None,
			};
		}
		if parents.iter().map(Vec::as_slice).eq(SCOPE_PATH) && leaf.as_slice() == b"Scope" {
			return Some(Self::Scope);
		}

		None
	}
}

#[derive(Debug)]
struct Capture {
	field: Field,
	depth: usize,
	text: String,
	lang: String,
	height: String,
	width: String,
}
impl Capture {
	fn commit(self, entity: &mut EntityDescriptor) {
		match self.field {
			Field::DisplayName => entity.display_names.push(Localized::new(self.text, self.lang)),
			Field::Description => entity.descriptions.push(Localized::new(self.text, self.lang)),
			Field::InformationUrl =>
				entity.information_urls.push(Localized::new(self.text, self.lang)),
			Field::Logo => entity.logos.push(Logo {
				value: self.text,
				height: self.height,
				width: self.width,
			}),
			Field::Scope => entity.scopes.push(Scope { value: self.text }),
		}
	}
}

#[derive(Debug)]
struct OpenEntity {
	entity: EntityDescriptor,
	depth: usize,
	capture: Option<Capture>,
}

#[derive(Debug, Default)]
struct Decoder {
	position: u64,
	stack: Vec<Vec<u8>>,
	seen_root: bool,
	open: Option<OpenEntity>,
	entities: Vec<EntityDescriptor>,
	ids: HashSet<String>,
}
impl Decoder {
	fn xml(&self, source: impl Into<quick_xml::Error>) -> ParseError {
		ParseError::Xml { position: self.position, source: source.into() }
	}

	fn capturing(&self) -> bool {
		let depth = self.stack.len();

		self.open.as_ref().and_then(|open| open.capture.as_ref()).is_some_and(|c| c.depth == depth)
	}

	fn push_text(&mut self, text: &str) {
		if let Some(capture) = self.open.as_mut().and_then(|open| open.capture.as_mut()) {
			capture.text.push_str(text);
		}
	}

	fn open(&mut self, e: &BytesStart) -> Result<(), ParseError> {
		self.seen_root = true;
		self.stack.push(e.local_name().as_ref().to_vec());

		let depth = self.stack.len();
		let Some(open) = self.open.as_mut() else {
			if e.local_name().as_ref() == ENTITY {
				let entity_id = attribute(e, b"entityID").map_err(|source| self.xml(source))?;

				self.open = Some(OpenEntity {
					entity: EntityDescriptor::new(entity_id.unwrap_or_default()),
					depth,
					capture: None,
				});
			}

			return Ok(());
		};

		if open.capture.is_some() {
			return Ok(());
		}

		let Some(field) = Field::resolve(&self.stack[open.depth..]) else {
			return Ok(());
		};
		let position = self.position;
		let read = |name: &[u8]| {
			attribute(e, name)
				.map(Option::unwrap_or_default)
				.map_err(|source| ParseError::Xml { position, source })
		};

		open.capture = Some(Capture {
			field,
			depth,
			text: String::new(),
			lang: read(b"lang")?,
			height: read(b"height")?,
			width: read(b"width")?,
		});

		Ok(())
	}

	fn close(&mut self) -> Result<(), ParseError> {
		let depth = self.stack.len();

		self.stack.pop();

		let Some(open) = self.open.as_mut() else {
			return Ok(());
		};

		if let Some(capture) = open.capture.take_if(|capture| capture.depth == depth) {
			capture.commit(&mut open.entity);

			return Ok(());
		}
		if open.depth == depth
			&& let Some(open) = self.open.take()
		{
			self.accept(open.entity)?;
		}

		Ok(())
	}

	fn accept(&mut self, entity: EntityDescriptor) -> Result<(), ParseError> {
		let index = self.entities.len();

		if entity.entity_id.trim().is_empty() {
			return Err(ParseError::MissingEntityId { index });
		}
		if !self.ids.insert(entity.entity_id.clone()) {
			return Err(ParseError::DuplicateEntityId { entity_id: entity.entity_id });
		}

		self.entities.push(entity);

		Ok(())
	}

	fn finish(self) -> Result<EntitiesDoc, ParseError> {
		if let Some(element) = self.stack.last() {
			return Err(ParseError::UnclosedElement {
				element: String::from_utf8_lossy(element).into_owned(),
			});
		}
		if !self.seen_root {
			return Err(ParseError::Empty);
		}

		Ok(EntitiesDoc { entities: self.entities })
	}
}

fn attribute(e: &BytesStart, name: &[u8]) -> Result<Option<String>, quick_xml::Error> {
	for attr in e.attributes() {
		let attr = attr?;

		if attr.key.local_name().as_ref() == name {
			return Ok(Some(attr.unescape_value()?.into_owned()));
		}
	}

	Ok(None)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const FEDERATION: &str = include_str!("../../tests/fixtures/federation.xml");

	fn parse_str(xml: &str) -> Result<EntitiesDoc, ParseError> {
		parse(xml.as_bytes())
	}

	#[test]
	fn decodes_prefixed_federation_document() {
		let doc = parse_str(FEDERATION).expect("Federation fixture should decode.");

		assert_eq!(doc.len(), 2);

		let unimes = &doc.entities[0];

		assert_eq!(unimes.entity_id, "https://federation.unimes.fr/idp/shibboleth");
		assert_eq!(
			unimes.display_names,
			vec![
				Localized::new("University of Nimes", "en"),
				Localized::new("Université de Nîmes", "fr"),
			]
		);
		assert_eq!(unimes.descriptions.len(), 2);
		assert!(unimes.descriptions[0].value.ends_with("library readers & guests."));
		assert_eq!(unimes.information_urls, vec![Localized::new("http://www.unimes.fr", "fr")]);
		assert_eq!(unimes.logos.len(), 1);
		assert_eq!(unimes.logos[0].height, "16");
		assert_eq!(unimes.logos[0].width, "16");
		assert!(unimes.logos[0].value.starts_with("data:image/png;base64,"));
		assert_eq!(unimes.scopes, vec![Scope { value: "unimes.fr".into() }]);

		let lyon = &doc.entities[1];

		assert_eq!(lyon.entity_id, "https://idp.univ-lyon1.fr/idp/shibboleth");
		assert!(lyon.descriptions.is_empty());
		assert!(lyon.logos.is_empty());
		assert_eq!(lyon.scopes.len(), 2);
	}

	#[test]
	fn unprefixed_and_nested_groups_are_flattened() {
		let xml = r#"<EntitiesDescriptor>
			<EntitiesDescriptor Name="inner">
				<EntityDescriptor entityID="https://a.example.org">
					<IDPSSODescriptor><Extensions><Scope>a.example.org</Scope></Extensions></IDPSSODescriptor>
				</EntityDescriptor>
			</EntitiesDescriptor>
			<EntityDescriptor entityID="https://b.example.org"/>
		</EntitiesDescriptor>"#;
		let doc = parse_str(xml).expect("Nested groups should decode.");
		let ids = doc.entities.iter().map(|e| e.entity_id.as_str()).collect::<Vec<_>>();

		assert_eq!(ids, ["https://a.example.org", "https://b.example.org"]);
		assert_eq!(doc.entities[0].scopes[0].value, "a.example.org");
		assert!(doc.entities[1].display_names.is_empty());
	}

	#[test]
	fn ignores_ui_info_outside_idp_descriptor() {
		let xml = r#"<EntitiesDescriptor>
			<EntityDescriptor entityID="https://sp.example.org">
				<SPSSODescriptor><Extensions><UIInfo>
					<DisplayName xml:lang="en">Service</DisplayName>
				</UIInfo><Scope>sp.example.org</Scope></Extensions></SPSSODescriptor>
			</EntityDescriptor>
		</EntitiesDescriptor>"#;
		let doc = parse_str(xml).expect("Service provider descriptors should decode.");

		assert!(doc.entities[0].display_names.is_empty());
		assert!(doc.entities[0].scopes.is_empty());
	}

	#[test]
	fn keeps_character_data_verbatim() {
		let xml = r#"<EntitiesDescriptor><EntityDescriptor entityID="https://x.example.org">
			<IDPSSODescriptor><Extensions><UIInfo>
				<DisplayName xml:lang="fr"> Grandes &#201;coles &amp; Co </DisplayName>
				<Logo height="32" width="64"><![CDATA[https://x.example.org/logo.png?a=1&b=2]]></Logo>
			</UIInfo></Extensions></IDPSSODescriptor>
		</EntityDescriptor></EntitiesDescriptor>"#;
		let doc = parse_str(xml).expect("Escaped content should decode.");
		let entity = &doc.entities[0];

		assert_eq!(entity.display_names[0].value, " Grandes Écoles & Co ");
		assert_eq!(entity.logos[0].value, "https://x.example.org/logo.png?a=1&b=2");
		assert_eq!(entity.logos[0].height, "32");
		assert_eq!(entity.logos[0].width, "64");
	}

	#[test]
	fn rejects_malformed_documents() {
		assert!(matches!(parse_str(""), Err(ParseError::Empty)));
		assert!(matches!(parse_str("<?xml version=\"1.0\"?>"), Err(ParseError::Empty)));
		assert!(matches!(
			parse_str("<EntitiesDescriptor><EntityDescriptor entityID=\"x\">"),
			Err(ParseError::UnclosedElement { .. } | ParseError::Xml { .. })
		));
		assert!(matches!(
			parse_str("<EntitiesDescriptor></EntityDescriptor>"),
			Err(ParseError::Xml { .. })
		));
	}

	#[test]
	fn rejects_missing_and_duplicate_identifiers() {
		let missing = "<EntitiesDescriptor><EntityDescriptor entityID=\"https://a\"/>\
			<EntityDescriptor/></EntitiesDescriptor>";

		assert!(matches!(parse_str(missing), Err(ParseError::MissingEntityId { index: 1 })));

		let duplicate = "<EntitiesDescriptor><EntityDescriptor entityID=\"https://a\"/>\
			<EntityDescriptor entityID=\"https://a\"/></EntitiesDescriptor>";

		assert!(matches!(
			parse_str(duplicate),
			Err(ParseError::DuplicateEntityId { entity_id }) if entity_id == "https://a"
		));
	}
}
