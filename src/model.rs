//! Output data model: the document tree handed to the serializer.

use crate::error::Diagnostic;

/// The complete output of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentTree {
    pub meta: Option<Meta>,
    /// Package declarations in host order.
    pub packages: Vec<DeclarationNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meta {
    pub created: String,
}

/// One documentable entity.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationNode {
    pub kind: DeclarationKind,
    pub name: String,
    pub qualified_name: String,
    pub modifiers: ModifierSet,
    pub generics: Vec<TypeParameter>,
    pub annotations: Vec<AnnotationUsage>,
    pub signature: Signature,
    pub comment: Option<DocComment>,
    /// Owned children in host order.
    pub children: Vec<DeclarationNode>,
    pub diagnostics: Vec<Diagnostic>,
}

impl DeclarationNode {
    pub fn new(kind: DeclarationKind, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind,
            qualified_name: name.clone(),
            name,
            modifiers: ModifierSet::default(),
            generics: Vec::new(),
            annotations: Vec::new(),
            signature: Signature::default(),
            comment: None,
            children: Vec::new(),
            diagnostics: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Package,
    Class,
    Interface,
    Enum,
    Record,
    AnnotationType,
    Field,
    EnumConstant,
    Constructor,
    Method,
    Parameter,
    TypeParameter,
    /// Anything the host produces that has no dedicated variant. Holds the
    /// host's own label.
    Other(String),
}

impl DeclarationKind {
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            DeclarationKind::Class
                | DeclarationKind::Interface
                | DeclarationKind::Enum
                | DeclarationKind::Record
                | DeclarationKind::AnnotationType
        )
    }

    pub fn is_member(&self) -> bool {
        matches!(
            self,
            DeclarationKind::Field
                | DeclarationKind::EnumConstant
                | DeclarationKind::Constructor
                | DeclarationKind::Method
        )
    }

    /// Value of the `kind` attribute.
    pub fn label(&self) -> &str {
        match self {
            DeclarationKind::Package => "package",
            DeclarationKind::Class => "class",
            DeclarationKind::Interface => "interface",
            DeclarationKind::Enum => "enum",
            DeclarationKind::Record => "record",
            DeclarationKind::AnnotationType => "annotation",
            DeclarationKind::Field => "field",
            DeclarationKind::EnumConstant => "enum-constant",
            DeclarationKind::Constructor => "constructor",
            DeclarationKind::Method => "method",
            DeclarationKind::Parameter => "parameter",
            DeclarationKind::TypeParameter => "type-parameter",
            DeclarationKind::Other(_) => "other",
        }
    }
}

/// Declaration modifiers, in the fixed order used for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Abstract,
    Static,
    Final,
    Sealed,
    NonSealed,
    Default,
    Synchronized,
    Native,
    Transient,
    Volatile,
    Strictfp,
}

impl Modifier {
    pub const ALL: [Modifier; 14] = [
        Modifier::Public,
        Modifier::Protected,
        Modifier::Private,
        Modifier::Abstract,
        Modifier::Static,
        Modifier::Final,
        Modifier::Sealed,
        Modifier::NonSealed,
        Modifier::Default,
        Modifier::Synchronized,
        Modifier::Native,
        Modifier::Transient,
        Modifier::Volatile,
        Modifier::Strictfp,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::Abstract => "abstract",
            Modifier::Static => "static",
            Modifier::Final => "final",
            Modifier::Sealed => "sealed",
            Modifier::NonSealed => "non-sealed",
            Modifier::Default => "default",
            Modifier::Synchronized => "synchronized",
            Modifier::Native => "native",
            Modifier::Transient => "transient",
            Modifier::Volatile => "volatile",
            Modifier::Strictfp => "strictfp",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Modifier> {
        Modifier::ALL.into_iter().find(|m| m.keyword() == word)
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ModifierSet(u16);

impl ModifierSet {
    pub fn insert(&mut self, modifier: Modifier) {
        self.0 |= modifier.bit();
    }

    pub fn contains(&self, modifier: Modifier) -> bool {
        self.0 & modifier.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Modifier> + '_ {
        Modifier::ALL.into_iter().filter(|m| self.contains(*m))
    }

    /// The visibility explicitly declared, if any. Nothing is implied.
    pub fn visibility(&self) -> Option<Visibility> {
        if self.contains(Modifier::Public) {
            Some(Visibility::Public)
        } else if self.contains(Modifier::Protected) {
            Some(Visibility::Protected)
        } else if self.contains(Modifier::Private) {
            Some(Visibility::Private)
        } else {
            None
        }
    }
}

impl FromIterator<Modifier> for ModifierSet {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        let mut set = ModifierSet::default();
        for m in iter {
            set.insert(m);
        }
        set
    }
}

/// Access levels, ordered from most to least restricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Visibility {
    Private,
    Package,
    Protected,
    Public,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Package => "package",
            Visibility::Protected => "protected",
            Visibility::Public => "public",
        }
    }
}

/// A type parameter with its bounds in declaration order (`T extends A & B`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameter {
    pub name: String,
    pub bounds: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationUsage {
    pub name: String,
    pub arguments: Vec<AnnotationArgument>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationArgument {
    /// `None` for the single unnamed `value` shorthand.
    pub name: Option<String>,
    pub value: AnnotationValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationValue {
    Literal(String),
    Array(Vec<AnnotationValue>),
    Annotation(AnnotationUsage),
}

/// Type information of a declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    /// Field type, method return type or parameter type.
    pub type_ref: Option<String>,
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    pub throws: Vec<ThrownType>,
}

/// A declared exception and the `@throws` text describing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThrownType {
    pub type_ref: String,
    pub description: Vec<MarkupNode>,
}

impl ThrownType {
    pub fn new(type_ref: impl Into<String>) -> Self {
        Self {
            type_ref: type_ref.into(),
            description: Vec::new(),
        }
    }

    /// Whether a `@throws` argument names this type. Two qualified names
    /// must match exactly, otherwise simple names are compared.
    pub fn named_by(&self, argument: &str) -> bool {
        fn simple(name: &str) -> &str {
            name.rsplit('.').next().unwrap_or(name)
        }
        if argument == self.type_ref {
            return true;
        }
        let both_qualified = argument.contains('.') && self.type_ref.contains('.');
        !both_qualified && simple(argument) == simple(&self.type_ref)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocComment {
    pub body: Vec<MarkupNode>,
    pub tags: Vec<TagBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    Text(String),
    CodeSpan(String),
    Literal(String),
    LinkRef {
        target: TargetReference,
        label: Option<String>,
        style: LinkStyle,
    },
    /// `{@value}`, optionally naming a constant.
    Value(Option<TargetReference>),
    InlineTagUnknown {
        name: String,
        content: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStyle {
    /// `{@link}` and `@see`
    Code,
    /// `{@linkplain}`
    Plain,
}

impl LinkStyle {
    pub fn tag_name(self) -> &'static str {
        match self {
            LinkStyle::Code => "link",
            LinkStyle::Plain => "linkplain",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetReference {
    Resolved { text: String, qualified: String },
    Unresolved(String),
}

impl TargetReference {
    /// The reference exactly as written in the comment.
    pub fn text(&self) -> &str {
        match self {
            TargetReference::Resolved { text, .. } => text,
            TargetReference::Unresolved(text) => text,
        }
    }

    pub fn qualified(&self) -> Option<&str> {
        match self {
            TargetReference::Resolved { qualified, .. } => Some(qualified),
            TargetReference::Unresolved(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, TargetReference::Resolved { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TagBlock {
    pub name: TagName,
    /// Leading argument tokens (parameter name, exception type, see target).
    pub arguments: Vec<String>,
    pub body: Vec<MarkupNode>,
    /// Display title from a custom tag definition.
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagName {
    Param,
    Return,
    Throws,
    See,
    Since,
    Deprecated,
    Author,
    Version,
    Custom(String),
}

impl TagName {
    pub fn from_name(name: &str) -> TagName {
        match name {
            "param" => TagName::Param,
            "return" => TagName::Return,
            "throws" | "exception" => TagName::Throws,
            "see" => TagName::See,
            "since" => TagName::Since,
            "deprecated" => TagName::Deprecated,
            "author" => TagName::Author,
            "version" => TagName::Version,
            other => TagName::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TagName::Param => "param",
            TagName::Return => "return",
            TagName::Throws => "throws",
            TagName::See => "see",
            TagName::Since => "since",
            TagName::Deprecated => "deprecated",
            TagName::Author => "author",
            TagName::Version => "version",
            TagName::Custom(name) => name,
        }
    }
}
