//! Cross-reference resolution against the finished document tree.
//!
//! A reference is only resolved when it names exactly one declaration of the
//! tree. Anything else stays `Unresolved` with its text as written.

use crate::error::{Diagnostic, DiagnosticKind};
use crate::model::{DeclarationKind, DeclarationNode, DocumentTree, MarkupNode, TargetReference};
use log::debug;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
pub struct SymbolIndex {
    packages: HashSet<String>,
    /// Qualified type name to the names of its members.
    types: HashMap<String, HashSet<String>>,
    /// Simple type name to every qualified name using it.
    simple: HashMap<String, Vec<String>>,
}

/// Where a reference is written.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub package: Option<String>,
    /// Innermost enclosing type, or the type itself for a type's comment.
    pub enclosing: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub resolved: usize,
    pub unresolved: usize,
}

impl SymbolIndex {
    pub fn build(tree: &DocumentTree) -> Self {
        let mut index = SymbolIndex::default();
        for package in &tree.packages {
            index.add(package);
        }
        index
    }

    fn add(&mut self, node: &DeclarationNode) {
        if node.kind == DeclarationKind::Package {
            self.packages.insert(node.qualified_name.clone());
        } else if node.kind.is_type() {
            let members = node
                .children
                .iter()
                .filter(|c| c.kind.is_member())
                .map(|c| c.name.clone())
                .collect();
            self.types.insert(node.qualified_name.clone(), members);
            self.simple
                .entry(node.name.clone())
                .or_default()
                .push(node.qualified_name.clone());
        }
        for child in &node.children {
            self.add(child);
        }
    }

    /// Resolve `Type#member(args)`, `#member`, `Type` or a package name.
    pub fn resolve(&self, text: &str, scope: &Scope) -> TargetReference {
        let unresolved = || TargetReference::Unresolved(text.to_string());
        let trimmed = text.trim();
        let (type_part, member) = match trimmed.split_once('#') {
            Some((t, m)) => (t, Some(m)),
            None => (trimmed, None),
        };

        let owner = if type_part.is_empty() {
            scope.enclosing.clone()
        } else {
            self.lookup_type(type_part, scope)
        };

        let qualified = match (owner, member) {
            (Some(owner), None) => owner,
            (None, None) if self.packages.contains(trimmed) => trimmed.to_string(),
            (Some(owner), Some(member)) => {
                let name = member.split('(').next().unwrap_or_default().trim();
                match self.types.get(&owner) {
                    Some(members) if members.contains(name) => format!("{}#{}", owner, member),
                    _ => return unresolved(),
                }
            }
            _ => return unresolved(),
        };
        TargetReference::Resolved {
            text: text.to_string(),
            qualified,
        }
    }

    fn lookup_type(&self, name: &str, scope: &Scope) -> Option<String> {
        let candidates = [
            Some(name.to_string()),
            scope.package.as_ref().map(|p| format!("{}.{}", p, name)),
            scope.enclosing.as_ref().map(|e| format!("{}.{}", e, name)),
        ];
        if let Some(found) = candidates
            .into_iter()
            .flatten()
            .find(|q| self.types.contains_key(q))
        {
            return Some(found);
        }
        match self.simple.get(name) {
            Some(all) if all.len() == 1 => Some(all[0].clone()),
            _ => None,
        }
    }
}

/// Resolve every link, value and `@see` target of the tree in place. Each
/// miss also leaves an `unresolved-reference` diagnostic on its declaration.
pub fn resolve_tree(tree: &mut DocumentTree) -> ResolveStats {
    let index = SymbolIndex::build(tree);
    let mut stats = ResolveStats::default();
    for package in &mut tree.packages {
        resolve_node(&index, package, &Scope::default(), &mut stats);
    }
    stats
}

fn resolve_node(
    index: &SymbolIndex,
    node: &mut DeclarationNode,
    outer: &Scope,
    stats: &mut ResolveStats,
) {
    let mut scope = outer.clone();
    if node.kind == DeclarationKind::Package {
        scope.package = Some(node.qualified_name.clone());
    } else if node.kind.is_type() {
        scope.enclosing = Some(node.qualified_name.clone());
    }

    let mut bodies: Vec<&mut Vec<MarkupNode>> = Vec::new();
    if let Some(comment) = node.comment.as_mut() {
        bodies.push(&mut comment.body);
        bodies.extend(comment.tags.iter_mut().map(|t| &mut t.body));
    }
    bodies.extend(node.signature.throws.iter_mut().map(|t| &mut t.description));

    let mut missing = Vec::new();
    for markup in bodies.into_iter().flat_map(|body| body.iter_mut()) {
        let target = match markup {
            MarkupNode::LinkRef { target, .. } => target,
            MarkupNode::Value(Some(target)) => target,
            _ => continue,
        };
        *target = index.resolve(target.text(), &scope);
        if target.is_resolved() {
            stats.resolved += 1;
        } else {
            stats.unresolved += 1;
            missing.push(target.text().to_string());
        }
    }
    for text in missing {
        debug!("unresolved reference `{}` in {}", text, node.qualified_name);
        node.diagnostics.push(Diagnostic::new(
            DiagnosticKind::UnresolvedReference,
            format!("unresolved reference {}", text),
        ));
    }

    for child in &mut node.children {
        resolve_node(index, child, &scope, stats);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DocComment, LinkStyle, ThrownType};

    fn node(kind: DeclarationKind, name: &str, qualified: &str) -> DeclarationNode {
        let mut n = DeclarationNode::new(kind, name);
        n.qualified_name = qualified.to_string();
        n
    }

    fn link(target: &str) -> MarkupNode {
        MarkupNode::LinkRef {
            target: TargetReference::Unresolved(target.into()),
            label: None,
            style: LinkStyle::Code,
        }
    }

    fn sample() -> DocumentTree {
        let mut method = node(DeclarationKind::Method, "m", "p.C.m");
        method.comment = Some(DocComment {
            body: vec![link("#f"), link("Other"), link("C#m(int)"), link("NoSuchType")],
            tags: Vec::new(),
        });
        let field = node(DeclarationKind::Field, "f", "p.C.f");
        let inner = node(DeclarationKind::Class, "Inner", "p.C.Inner");
        let mut c = node(DeclarationKind::Class, "C", "p.C");
        c.children = vec![field, method, inner];
        let other = node(DeclarationKind::Class, "Other", "q.Other");
        let mut p = node(DeclarationKind::Package, "p", "p");
        p.children = vec![c];
        let mut q = node(DeclarationKind::Package, "q", "q");
        q.children = vec![other];
        DocumentTree {
            meta: None,
            packages: vec![p, q],
        }
    }

    #[test]
    fn resolves_types_members_and_packages() {
        let index = SymbolIndex::build(&sample());
        let scope = Scope {
            package: Some("p".into()),
            enclosing: Some("p.C".into()),
        };
        assert_eq!(index.resolve("C", &scope).qualified(), Some("p.C"));
        assert_eq!(index.resolve("Inner", &scope).qualified(), Some("p.C.Inner"));
        assert_eq!(index.resolve("q.Other", &scope).qualified(), Some("q.Other"));
        assert_eq!(index.resolve("#f", &scope).qualified(), Some("p.C#f"));
        assert_eq!(index.resolve("q", &scope).qualified(), Some("q"));
        assert!(!index.resolve("C#nothing", &scope).is_resolved());
        assert!(!index.resolve("NoSuchType", &scope).is_resolved());
    }

    #[test]
    fn ambiguous_simple_name_stays_unresolved() {
        let mut tree = sample();
        let dup = node(DeclarationKind::Class, "Other", "p.Other");
        tree.packages[0].children.push(dup);
        let index = SymbolIndex::build(&tree);
        let scope = Scope {
            package: Some("r".into()),
            enclosing: None,
        };
        assert!(!index.resolve("Other", &scope).is_resolved());
    }

    #[test]
    fn resolve_tree_updates_links_in_place() {
        let mut tree = sample();
        let stats = resolve_tree(&mut tree);
        assert_eq!(stats, ResolveStats { resolved: 3, unresolved: 1 });
        let body = &tree.packages[0].children[0].children[1]
            .comment
            .as_ref()
            .unwrap()
            .body;
        match &body[2] {
            MarkupNode::LinkRef { target, .. } => {
                assert_eq!(target.text(), "C#m(int)");
                assert_eq!(target.qualified(), Some("p.C#m(int)"));
            }
            other => panic!("unexpected node {:?}", other),
        }
        match &body[3] {
            MarkupNode::LinkRef { target, .. } => {
                assert_eq!(target, &TargetReference::Unresolved("NoSuchType".into()))
            }
            other => panic!("unexpected node {:?}", other),
        }
        let method = &tree.packages[0].children[0].children[1];
        assert_eq!(method.diagnostics.len(), 1);
        assert_eq!(method.diagnostics[0].kind, DiagnosticKind::UnresolvedReference);
        assert_eq!(method.diagnostics[0].message, "unresolved reference NoSuchType");
    }

    #[test]
    fn exception_descriptions_are_resolved() {
        let mut tree = sample();
        let field = &mut tree.packages[0].children[0].children[0];
        let mut thrown = ThrownType::new("q.Other");
        thrown.description = vec![link("Other")];
        field.signature.throws.push(thrown);
        let stats = resolve_tree(&mut tree);
        assert_eq!(stats.resolved, 4);
        let thrown = &tree.packages[0].children[0].children[0].signature.throws[0];
        match &thrown.description[0] {
            MarkupNode::LinkRef { target, .. } => assert_eq!(target.qualified(), Some("q.Other")),
            other => panic!("unexpected node {:?}", other),
        }
    }
}
