//! Tree walker: drives mapping, comment extraction, resolution and pruning
//! for one run and returns the finished document tree.

use crate::comment::extract;
use crate::config::Config;
use crate::error::{Diagnostic, DiagnosticKind, HostError};
use crate::host::{HostElement, HostModel};
use crate::mapper::map_declaration;
use crate::model::{
    DeclarationKind, DeclarationNode, DocComment, DocumentTree, MarkupNode, Meta, TagName,
    ThrownType, Visibility,
};
use crate::resolve::resolve_tree;
use log::{info, trace, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub declarations: usize,
    pub placeholders: usize,
    pub diagnostics: usize,
    pub resolved: usize,
    pub unresolved: usize,
    /// Declarations removed by the visibility threshold or the type filter.
    pub pruned: usize,
}

/// Build the document tree for a whole host model.
pub fn walk<H: HostModel>(host: &H, config: &Config) -> (DocumentTree, WalkStats) {
    let mut walker = Walker {
        config,
        stats: WalkStats::default(),
    };
    let packages = host
        .packages()
        .into_iter()
        .map(|package| walker.visit(package, None))
        .collect();
    let mut tree = DocumentTree {
        meta: config.created.clone().map(|created| Meta { created }),
        packages,
    };

    let resolved = resolve_tree(&mut tree);
    walker.stats.resolved = resolved.resolved;
    walker.stats.unresolved = resolved.unresolved;
    walker.stats.diagnostics += resolved.unresolved;
    walker.stats.pruned = prune(&mut tree, config);

    let stats = walker.stats;
    info!(
        "walked {} declarations ({} placeholders, {} diagnostics), {} references resolved, {} unresolved, {} pruned",
        stats.declarations,
        stats.placeholders,
        stats.diagnostics,
        stats.resolved,
        stats.unresolved,
        stats.pruned
    );
    (tree, stats)
}

struct Walker<'c> {
    config: &'c Config,
    stats: WalkStats,
}

impl Walker<'_> {
    fn visit<E: HostElement>(
        &mut self,
        element: Result<E, HostError>,
        scope: Option<&str>,
    ) -> DeclarationNode {
        self.stats.declarations += 1;
        let element = match element {
            Ok(element) => element,
            Err(err) => return self.placeholder("unknown", scope, err),
        };
        let mut node = match map_declaration(&element, scope) {
            Ok(node) => node,
            Err(err) => return self.placeholder(element.kind(), scope, err),
        };
        trace!("mapped {} {}", node.kind.label(), node.qualified_name);

        if let Some(raw) = element.doc_comment() {
            let extracted = extract(raw);
            node.diagnostics.extend(extracted.diagnostics);
            let mut comment = extracted.comment;
            self.apply_titles(&node.kind, &mut comment);
            for thrown in &mut node.signature.throws {
                thrown.description = throws_description(&comment, thrown);
            }
            node.comment = Some(comment);
        }

        for parameter in element.parameters() {
            let mut child = self.visit(parameter, Some(&node.qualified_name));
            if child.kind == DeclarationKind::Parameter && child.comment.is_none() {
                child.comment = param_description(node.comment.as_ref(), &child.name)
                    .map(|body| DocComment {
                        body,
                        tags: Vec::new(),
                    });
            }
            node.children.push(child);
        }
        for member in element.enclosed() {
            let child = self.visit(member, Some(&node.qualified_name));
            node.children.push(child);
        }

        for diagnostic in &node.diagnostics {
            warn!("{}: {}", node.qualified_name, diagnostic);
        }
        self.stats.diagnostics += node.diagnostics.len();
        node
    }

    /// Stand-in for a declaration the host could not deliver.
    fn placeholder(&mut self, kind: &str, scope: Option<&str>, err: HostError) -> DeclarationNode {
        warn!(
            "skipping malformed declaration in {}: {}",
            scope.unwrap_or("<root>"),
            err
        );
        self.stats.placeholders += 1;
        self.stats.diagnostics += 1;
        let mut node = DeclarationNode::new(DeclarationKind::Other(kind.to_string()), "");
        node.diagnostics.push(Diagnostic::new(
            DiagnosticKind::UnmappableDeclaration,
            err.to_string(),
        ));
        node
    }

    fn apply_titles(&self, kind: &DeclarationKind, comment: &mut DocComment) {
        for tag in &mut comment.tags {
            if let TagName::Custom(ref name) = tag.name {
                if let Some(def) = self.config.custom_tag(name) {
                    if def.allowed_on(kind) {
                        tag.title = def.title.clone();
                    }
                }
            }
        }
    }
}

/// Body of the first `@param` naming `name`.
fn param_description(comment: Option<&DocComment>, name: &str) -> Option<Vec<MarkupNode>> {
    comment?
        .tags
        .iter()
        .find(|t| t.name == TagName::Param && t.arguments.first().map(String::as_str) == Some(name))
        .map(|t| t.body.clone())
}

/// Body of the first `@throws` naming `thrown`.
fn throws_description(comment: &DocComment, thrown: &ThrownType) -> Vec<MarkupNode> {
    comment
        .tags
        .iter()
        .find(|t| {
            t.name == TagName::Throws && t.arguments.first().is_some_and(|a| thrown.named_by(a))
        })
        .map(|t| t.body.clone())
        .unwrap_or_default()
}

/// Visibility used for the threshold. Without a declared visibility, enum
/// constants and everything declared in an interface or annotation type are
/// public, other types and members package-private.
fn effective_visibility(node: &DeclarationNode, parent: &DeclarationKind) -> Option<Visibility> {
    if !node.kind.is_type() && !node.kind.is_member() {
        return None;
    }
    if let Some(declared) = node.modifiers.visibility() {
        return Some(declared);
    }
    let implicitly_public = node.kind == DeclarationKind::EnumConstant
        || matches!(
            parent,
            DeclarationKind::Interface | DeclarationKind::AnnotationType
        );
    Some(if implicitly_public {
        Visibility::Public
    } else {
        Visibility::Package
    })
}

/// Apply the visibility threshold and the type filter. Returns the number of
/// declarations removed.
fn prune(tree: &mut DocumentTree, config: &Config) -> usize {
    let mut removed = 0;
    for package in &mut tree.packages {
        removed += prune_visibility(package, config.visibility);
    }

    if config.filter.is_active() {
        for package in &mut tree.packages {
            let before = package.children.len();
            package
                .children
                .retain(|c| !c.kind.is_type() || config.filter.accepts(c));
            removed += before - package.children.len();
        }
        let before = tree.packages.len();
        tree.packages
            .retain(|p| p.children.iter().any(|c| c.kind.is_type()));
        removed += before - tree.packages.len();
    }
    removed
}

fn prune_visibility(node: &mut DeclarationNode, threshold: Visibility) -> usize {
    let before = node.children.len();
    let parent = &node.kind;
    node.children
        .retain(|c| effective_visibility(c, parent).map_or(true, |v| v >= threshold));
    let mut removed = before - node.children.len();
    for child in &mut node.children {
        removed += prune_visibility(child, threshold);
    }
    removed
}
