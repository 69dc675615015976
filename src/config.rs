//! Run configuration, passed explicitly to the walker and the serializer.

use crate::error::DocletError;
use crate::model::{AnnotationUsage, DeclarationKind, DeclarationNode, Visibility};
use regex::Regex;
use std::sync::LazyLock;

static RE_TAG_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z_a-z][A-Za-z0-9_.]*$").unwrap());

#[derive(Debug, Clone)]
pub struct Config {
    pub encoding: OutputEncoding,
    /// Declarations less visible than this are left out.
    pub visibility: Visibility,
    pub unresolved: UnresolvedPolicy,
    pub indent: bool,
    pub filter: TypeFilter,
    pub custom_tags: Vec<CustomTag>,
    /// Creation stamp for the `<meta>` element. Omitted when `None`.
    pub created: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            encoding: OutputEncoding::Utf8,
            visibility: Visibility::Private,
            unresolved: UnresolvedPolicy::Marked,
            indent: true,
            filter: TypeFilter::default(),
            custom_tags: Vec::new(),
            created: None,
        }
    }
}

impl Config {
    pub fn custom_tag(&self, name: &str) -> Option<&CustomTag> {
        self.custom_tags.iter().find(|t| t.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEncoding {
    Utf8,
    Latin1,
    Ascii,
}

impl OutputEncoding {
    /// Parse an encoding label, e.g. `UTF-8`, `latin1`, `US-ASCII`.
    pub fn from_label(label: &str) -> Result<Self, DocletError> {
        let normalized: String = label
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "utf8" => Ok(OutputEncoding::Utf8),
            "iso88591" | "latin1" | "l1" => Ok(OutputEncoding::Latin1),
            "usascii" | "ascii" => Ok(OutputEncoding::Ascii),
            _ => Err(DocletError::Config(format!(
                "unsupported encoding: {}. Use UTF-8, ISO-8859-1 or US-ASCII",
                label
            ))),
        }
    }

    /// Name written in the XML declaration.
    pub fn label(self) -> &'static str {
        match self {
            OutputEncoding::Utf8 => "UTF-8",
            OutputEncoding::Latin1 => "ISO-8859-1",
            OutputEncoding::Ascii => "US-ASCII",
        }
    }

    pub fn can_encode(self, c: char) -> bool {
        match self {
            OutputEncoding::Utf8 => true,
            OutputEncoding::Latin1 => (c as u32) <= 0xFF,
            OutputEncoding::Ascii => c.is_ascii(),
        }
    }
}

/// How link targets that match nothing in the model are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedPolicy {
    /// `<link ... unresolved="true">`
    Marked,
    /// The label (or target) as plain text.
    PlainText,
}

/// Selects top-level types by superclass, interface or annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeFilter {
    pub extends: Option<String>,
    pub implements: Option<String>,
    pub annotated: Option<String>,
}

impl TypeFilter {
    pub fn is_active(&self) -> bool {
        self.extends.is_some() || self.implements.is_some() || self.annotated.is_some()
    }

    pub fn accepts(&self, node: &DeclarationNode) -> bool {
        if let Some(ref base) = self.extends {
            if node.signature.superclass.as_deref() != Some(base.as_str()) {
                return false;
            }
        }
        if let Some(ref iface) = self.implements {
            if !node.signature.interfaces.iter().any(|i| i == iface) {
                return false;
            }
        }
        if let Some(ref annotation) = self.annotated {
            if !node
                .annotations
                .iter()
                .any(|a: &AnnotationUsage| &a.name == annotation)
            {
                return false;
            }
        }
        true
    }
}

/// Where a custom tag may appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagLocation {
    Package,
    Type,
    Constructor,
    Method,
    Field,
}

impl TagLocation {
    pub fn of(kind: &DeclarationKind) -> Option<TagLocation> {
        match kind {
            DeclarationKind::Package => Some(TagLocation::Package),
            DeclarationKind::Constructor => Some(TagLocation::Constructor),
            DeclarationKind::Method => Some(TagLocation::Method),
            DeclarationKind::Field | DeclarationKind::EnumConstant => Some(TagLocation::Field),
            k if k.is_type() => Some(TagLocation::Type),
            _ => None,
        }
    }
}

/// A `name:scope:title` tag definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomTag {
    pub name: String,
    pub locations: Vec<TagLocation>,
    pub title: Option<String>,
}

const ALL_LOCATIONS: [TagLocation; 5] = [
    TagLocation::Package,
    TagLocation::Type,
    TagLocation::Constructor,
    TagLocation::Method,
    TagLocation::Field,
];

impl CustomTag {
    /// Parse `name`, `name:scope` or `name:scope:title`.
    ///
    /// The scope is a set of letters: `a` (all), `o` (overview), `p`
    /// (package), `t` (type), `c` (constructor), `m` (method), `f` (field).
    /// A model has no overview comment, so `o` is accepted but places the
    /// tag nowhere.
    pub fn parse(definition: &str) -> Result<Self, DocletError> {
        let mut parts = definition.splitn(3, ':');
        let name = parts.next().unwrap_or_default();
        if !RE_TAG_NAME.is_match(name) {
            return Err(DocletError::Config(format!("invalid tag name: {}", name)));
        }
        let locations = match parts.next() {
            Some(scope) => parse_scope(scope)?,
            None => ALL_LOCATIONS.to_vec(),
        };
        let title = parts.next().filter(|t| !t.is_empty()).map(str::to_string);
        Ok(Self {
            name: name.to_string(),
            locations,
            title,
        })
    }

    pub fn allowed_on(&self, kind: &DeclarationKind) -> bool {
        TagLocation::of(kind).is_some_and(|l| self.locations.contains(&l))
    }
}

fn parse_scope(scope: &str) -> Result<Vec<TagLocation>, DocletError> {
    let mut seen = String::new();
    for c in scope.chars() {
        if !"aoptcmf".contains(c) || seen.contains(c) {
            return Err(DocletError::Config(format!("invalid tag scope: {}", scope)));
        }
        seen.push(c);
    }
    if seen.contains('a') {
        return Ok(ALL_LOCATIONS.to_vec());
    }
    Ok(seen
        .chars()
        .filter_map(|c| match c {
            'p' => Some(TagLocation::Package),
            't' => Some(TagLocation::Type),
            'c' => Some(TagLocation::Constructor),
            'm' => Some(TagLocation::Method),
            'f' => Some(TagLocation::Field),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_labels() {
        assert_eq!(OutputEncoding::from_label("UTF-8").unwrap(), OutputEncoding::Utf8);
        assert_eq!(OutputEncoding::from_label("latin1").unwrap(), OutputEncoding::Latin1);
        assert_eq!(OutputEncoding::from_label("ISO-8859-1").unwrap(), OutputEncoding::Latin1);
        assert_eq!(OutputEncoding::from_label("us-ascii").unwrap(), OutputEncoding::Ascii);
        assert!(OutputEncoding::from_label("EBCDIC").is_err());
    }

    #[test]
    fn latin1_cannot_encode_euro() {
        assert!(OutputEncoding::Latin1.can_encode('é'));
        assert!(!OutputEncoding::Latin1.can_encode('€'));
        assert!(!OutputEncoding::Ascii.can_encode('é'));
    }

    #[test]
    fn custom_tag_full_definition() {
        let tag = CustomTag::parse("todo:mt:To do").unwrap();
        assert_eq!(tag.name, "todo");
        assert_eq!(tag.title.as_deref(), Some("To do"));
        assert!(tag.allowed_on(&DeclarationKind::Method));
        assert!(tag.allowed_on(&DeclarationKind::Interface));
        assert!(!tag.allowed_on(&DeclarationKind::Field));
    }

    #[test]
    fn custom_tag_name_only_allows_everywhere() {
        let tag = CustomTag::parse("glossary").unwrap();
        assert!(tag.title.is_none());
        assert!(tag.allowed_on(&DeclarationKind::Package));
        assert!(tag.allowed_on(&DeclarationKind::Field));
    }

    #[test]
    fn custom_tag_rejects_bad_input() {
        assert!(CustomTag::parse("9lives").is_err());
        assert!(CustomTag::parse("x:mm").is_err());
        assert!(CustomTag::parse("x:z").is_err());
    }

    #[test]
    fn overview_scope_matches_no_declaration() {
        let tag = CustomTag::parse("intro:o").unwrap();
        assert!(tag.locations.is_empty());
        assert!(!tag.allowed_on(&DeclarationKind::Package));
        let tag = CustomTag::parse("intro:op").unwrap();
        assert_eq!(tag.locations, [TagLocation::Package]);
    }

    #[test]
    fn filter_matches_all_criteria() {
        let mut node = DeclarationNode::new(DeclarationKind::Class, "C");
        node.signature.superclass = Some("p.Base".into());
        let filter = TypeFilter {
            extends: Some("p.Base".into()),
            ..Default::default()
        };
        assert!(filter.accepts(&node));
        let filter = TypeFilter {
            extends: Some("p.Base".into()),
            implements: Some("java.io.Serializable".into()),
            ..Default::default()
        };
        assert!(!filter.accepts(&node));
    }
}
