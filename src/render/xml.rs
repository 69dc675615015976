//! XML renderer: the document tree as one XML document.

use super::escape::{escape_attr, escape_text, EncodedWriter};
use super::Renderer;
use crate::config::{Config, UnresolvedPolicy};
use crate::error::{Diagnostic, DocletError};
use crate::model::{
    AnnotationArgument, AnnotationUsage, AnnotationValue, DeclarationKind, DeclarationNode,
    DocComment, DocumentTree, MarkupNode, Modifier, TagBlock, TargetReference, TypeParameter,
};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

pub struct XmlRenderer {
    config: Config,
}

impl XmlRenderer {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl Renderer for XmlRenderer {
    fn render(&self, tree: &DocumentTree, out: &mut dyn Write) -> Result<(), DocletError> {
        let mut emitter = Emitter::new(out, &self.config);
        emitter.declaration()?;
        emitter.open("root", Vec::new())?;
        if let Some(ref meta) = tree.meta {
            emitter.empty("meta", vec![("created", meta.created.clone())])?;
        }
        for package in &tree.packages {
            emitter.declaration_node(package)?;
        }
        emitter.close("root")?;
        emitter.finish()
    }

    fn file_extension(&self) -> &str {
        "xml"
    }
}

/// Element name for a declaration kind.
pub fn element_name(kind: &DeclarationKind) -> &'static str {
    match kind {
        DeclarationKind::Package => "package",
        DeclarationKind::Class
        | DeclarationKind::Interface
        | DeclarationKind::Enum
        | DeclarationKind::Record
        | DeclarationKind::AnnotationType => "type",
        DeclarationKind::Field | DeclarationKind::EnumConstant => "field",
        DeclarationKind::Constructor => "constructor",
        DeclarationKind::Method => "method",
        DeclarationKind::Parameter => "parameter",
        DeclarationKind::TypeParameter => "type-parameter",
        DeclarationKind::Other(_) => "other",
    }
}

type Attributes = Vec<(&'static str, String)>;

/// Event writer shared by the renderers. Indentation is written only
/// around structural elements, never inside mixed content.
pub(crate) struct Emitter<'a, W: Write> {
    writer: Writer<EncodedWriter<W>>,
    config: &'a Config,
    /// One entry per open structural element: whether it has children yet.
    open: Vec<bool>,
}

impl<'a, W: Write> Emitter<'a, W> {
    pub(crate) fn new(out: W, config: &'a Config) -> Self {
        Self {
            writer: Writer::new(EncodedWriter::new(out, config.encoding)),
            config,
            open: Vec::new(),
        }
    }

    pub(crate) fn declaration(&mut self) -> Result<(), DocletError> {
        let decl = BytesDecl::new("1.0", Some(self.config.encoding.label()), None);
        self.writer.write_event(Event::Decl(decl))?;
        Ok(())
    }

    fn start(&self, name: &'static str, attributes: Attributes) -> BytesStart<'static> {
        let mut start = BytesStart::new(name);
        for (key, value) in attributes {
            let value = escape_attr(&value, self.config.encoding);
            start.push_attribute((key.as_bytes(), value.as_bytes()));
        }
        start
    }

    fn indent(&mut self) -> Result<(), DocletError> {
        if let Some(has_children) = self.open.last_mut() {
            *has_children = true;
        }
        if self.config.indent {
            let mut ws = String::from("\n");
            ws.push_str(&"  ".repeat(self.open.len()));
            self.writer.write_event(Event::Text(BytesText::from_escaped(ws)))?;
        }
        Ok(())
    }

    /// Open a structural element.
    pub(crate) fn open(&mut self, name: &'static str, attributes: Attributes) -> Result<(), DocletError> {
        self.indent()?;
        let start = self.start(name, attributes);
        self.writer.write_event(Event::Start(start))?;
        self.open.push(false);
        Ok(())
    }

    pub(crate) fn close(&mut self, name: &'static str) -> Result<(), DocletError> {
        if self.open.pop() == Some(true) && self.config.indent {
            let mut ws = String::from("\n");
            ws.push_str(&"  ".repeat(self.open.len()));
            self.writer.write_event(Event::Text(BytesText::from_escaped(ws)))?;
        }
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    pub(crate) fn empty(&mut self, name: &'static str, attributes: Attributes) -> Result<(), DocletError> {
        self.indent()?;
        let start = self.start(name, attributes);
        self.writer.write_event(Event::Empty(start))?;
        Ok(())
    }

    /// An element holding mixed content, placed like a structural child.
    fn mixed<F>(&mut self, name: &'static str, attributes: Attributes, content: F) -> Result<(), DocletError>
    where
        F: FnOnce(&mut Self) -> Result<(), DocletError>,
    {
        self.indent()?;
        let start = self.start(name, attributes);
        self.writer.write_event(Event::Start(start))?;
        content(self)?;
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    /// An inline element with text content.
    fn inline(&mut self, name: &'static str, attributes: Attributes, text: &str) -> Result<(), DocletError> {
        let start = self.start(name, attributes);
        if text.is_empty() {
            self.writer.write_event(Event::Empty(start))?;
        } else {
            self.writer.write_event(Event::Start(start))?;
            self.text(text)?;
            self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), DocletError> {
        if !text.is_empty() {
            let escaped = escape_text(text, self.config.encoding);
            self.writer.write_event(Event::Text(BytesText::from_escaped(escaped)))?;
        }
        Ok(())
    }

    /// Flush the sink. Trailing newline when indenting.
    pub(crate) fn finish(mut self) -> Result<(), DocletError> {
        if self.config.indent {
            self.writer
                .write_event(Event::Text(BytesText::from_escaped("\n")))?;
        }
        self.writer.get_mut().flush()?;
        Ok(())
    }

    fn declaration_node(&mut self, node: &DeclarationNode) -> Result<(), DocletError> {
        let name = element_name(&node.kind);
        self.open(name, declaration_attributes(node))?;

        for tp in &node.generics {
            self.type_parameter(tp)?;
        }
        for iface in &node.signature.interfaces {
            self.empty("interface", vec![("type", iface.clone())])?;
        }
        for thrown in &node.signature.throws {
            let attributes = vec![("type", thrown.type_ref.clone())];
            if thrown.description.is_empty() {
                self.empty("exception", attributes)?;
            } else {
                self.mixed("exception", attributes, |e| e.markup(&thrown.description))?;
            }
        }
        for annotation in &node.annotations {
            self.annotation(annotation)?;
        }
        for diagnostic in &node.diagnostics {
            self.diagnostic(diagnostic)?;
        }
        if let Some(ref comment) = node.comment {
            self.comment(comment)?;
        }
        for child in &node.children {
            self.declaration_node(child)?;
        }

        self.close(name)
    }

    fn type_parameter(&mut self, tp: &TypeParameter) -> Result<(), DocletError> {
        let attributes = vec![("name", tp.name.clone())];
        if tp.bounds.is_empty() {
            return self.empty("type-parameter", attributes);
        }
        self.open("type-parameter", attributes)?;
        for bound in &tp.bounds {
            self.empty("bound", vec![("type", bound.clone())])?;
        }
        self.close("type-parameter")
    }

    fn annotation(&mut self, annotation: &AnnotationUsage) -> Result<(), DocletError> {
        let attributes = vec![("name", annotation.name.clone())];
        if annotation.arguments.is_empty() {
            return self.empty("annotation", attributes);
        }
        self.open("annotation", attributes)?;
        for argument in &annotation.arguments {
            self.argument(argument)?;
        }
        self.close("annotation")
    }

    fn argument(&mut self, argument: &AnnotationArgument) -> Result<(), DocletError> {
        let attributes = argument
            .name
            .iter()
            .map(|name| ("name", name.clone()))
            .collect();
        self.open("argument", attributes)?;
        self.annotation_value(&argument.value)?;
        self.close("argument")
    }

    fn annotation_value(&mut self, value: &AnnotationValue) -> Result<(), DocletError> {
        match value {
            AnnotationValue::Literal(literal) => {
                self.mixed("value", Vec::new(), |e| e.text(literal))
            }
            AnnotationValue::Array(items) => {
                if items.is_empty() {
                    return self.empty("array", Vec::new());
                }
                self.open("array", Vec::new())?;
                for item in items {
                    self.annotation_value(item)?;
                }
                self.close("array")
            }
            AnnotationValue::Annotation(nested) => self.annotation(nested),
        }
    }

    fn diagnostic(&mut self, diagnostic: &Diagnostic) -> Result<(), DocletError> {
        let attributes = vec![("kind", diagnostic.kind.as_str().to_string())];
        self.mixed("diagnostic", attributes, |e| e.text(&diagnostic.message))
    }

    fn comment(&mut self, comment: &DocComment) -> Result<(), DocletError> {
        if comment.body.is_empty() && comment.tags.is_empty() {
            return self.empty("comment", Vec::new());
        }
        self.open("comment", Vec::new())?;
        if !comment.body.is_empty() {
            self.mixed("body", Vec::new(), |e| e.markup(&comment.body))?;
        }
        for tag in &comment.tags {
            self.tag(tag)?;
        }
        self.close("comment")
    }

    fn tag(&mut self, tag: &TagBlock) -> Result<(), DocletError> {
        let mut attributes = vec![("name", tag.name.as_str().to_string())];
        if !tag.arguments.is_empty() {
            attributes.push(("argument", tag.arguments.join(" ")));
        }
        if let Some(ref title) = tag.title {
            attributes.push(("title", title.clone()));
        }
        self.mixed("tag", attributes, |e| e.markup(&tag.body))
    }

    fn markup(&mut self, nodes: &[MarkupNode]) -> Result<(), DocletError> {
        for node in nodes {
            match node {
                MarkupNode::Text(text) => self.text(text)?,
                MarkupNode::CodeSpan(code) => self.inline("code", Vec::new(), code)?,
                MarkupNode::Literal(literal) => self.inline("literal", Vec::new(), literal)?,
                MarkupNode::LinkRef {
                    target,
                    label,
                    style,
                } => {
                    let shown = label.as_deref().unwrap_or(target.text());
                    if self.plain(target) {
                        self.text(shown)?;
                    } else {
                        let mut attributes = vec![("kind", style.tag_name().to_string())];
                        attributes.extend(target_attributes(target));
                        self.inline("link", attributes, shown)?;
                    }
                }
                MarkupNode::Value(None) => self.inline("value", Vec::new(), "")?,
                MarkupNode::Value(Some(target)) => {
                    if self.plain(target) {
                        self.text(target.text())?;
                    } else {
                        self.inline("value", target_attributes(target), "")?;
                    }
                }
                MarkupNode::InlineTagUnknown { name, content } => {
                    self.inline("inline", vec![("name", name.clone())], content)?
                }
            }
        }
        Ok(())
    }

    /// Whether an unresolved target is written as plain text.
    fn plain(&self, target: &TargetReference) -> bool {
        !target.is_resolved() && self.config.unresolved == UnresolvedPolicy::PlainText
    }
}

fn target_attributes(target: &TargetReference) -> Attributes {
    let mut attributes = vec![("target", target.text().to_string())];
    match target.qualified() {
        Some(qualified) => attributes.push(("ref", qualified.to_string())),
        None => attributes.push(("unresolved", "true".to_string())),
    }
    attributes
}

fn declaration_attributes(node: &DeclarationNode) -> Attributes {
    let mut attributes = vec![("name", node.name.clone())];
    if node.kind.is_type() || node.kind.is_member() {
        attributes.push(("qualified", node.qualified_name.clone()));
    }
    attributes.push(("kind", node.kind.label().to_string()));
    if let Some(visibility) = node.modifiers.visibility() {
        attributes.push(("visibility", visibility.as_str().to_string()));
    }
    if let Some(ref type_ref) = node.signature.type_ref {
        attributes.push(("type", type_ref.clone()));
    }
    if let Some(ref superclass) = node.signature.superclass {
        attributes.push(("superclass", superclass.clone()));
    }
    for modifier in node.modifiers.iter() {
        if !matches!(
            modifier,
            Modifier::Public | Modifier::Protected | Modifier::Private
        ) {
            attributes.push((modifier.keyword(), "true".to_string()));
        }
    }
    if let DeclarationKind::Other(ref host_kind) = node.kind {
        attributes.push(("host-kind", host_kind.clone()));
    }
    attributes
}
