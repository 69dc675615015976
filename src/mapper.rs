//! Declaration mapper: one host element to one `DeclarationNode`.
//!
//! Non-recursive. Children and the doc comment are attached by the walker.

use crate::error::{Diagnostic, DiagnosticKind, HostError};
use crate::host::{HostAnnotation, HostAnnotationValue, HostElement};
use crate::model::{
    AnnotationArgument, AnnotationUsage, AnnotationValue, DeclarationKind, DeclarationNode,
    Modifier, ModifierSet, Signature, ThrownType, TypeParameter,
};

/// Map one host declaration. `scope` is the qualified name of the
/// enclosing declaration, used when the host gives no qualified name.
pub fn map_declaration<E: HostElement>(
    element: &E,
    scope: Option<&str>,
) -> Result<DeclarationNode, HostError> {
    let name = element.name()?;
    let mut node = DeclarationNode::new(classify(element.kind()), name);

    if let DeclarationKind::Other(ref raw) = node.kind {
        node.diagnostics.push(Diagnostic::new(
            DiagnosticKind::UnmappableDeclaration,
            format!("unknown declaration kind `{}` for {}", raw, name),
        ));
    }

    node.qualified_name = match (element.qualified_name(), scope) {
        (Some(qualified), _) => qualified.to_string(),
        (None, Some(scope)) if !scope.is_empty() => format!("{}.{}", scope, name),
        _ => name.to_string(),
    };
    if element.qualified_name().is_none()
        && matches!(node.kind, DeclarationKind::Method | DeclarationKind::Constructor)
    {
        node.qualified_name.push_str(&parameter_list(element));
    }

    let (modifiers, unknown) = map_modifiers(element.modifiers());
    node.modifiers = modifiers;
    for word in unknown {
        node.diagnostics.push(Diagnostic::new(
            DiagnosticKind::UnmappableDeclaration,
            format!("unknown modifier `{}` on {}", word, node.qualified_name),
        ));
    }

    node.generics = element
        .type_parameters()
        .iter()
        .map(|tp| TypeParameter {
            name: tp.name.clone(),
            bounds: tp.bounds.clone(),
        })
        .collect();
    node.annotations = element.annotations().iter().map(map_annotation).collect();
    node.signature = Signature {
        type_ref: element.type_ref().map(str::to_string),
        superclass: element.superclass().map(str::to_string),
        interfaces: element.interfaces().to_vec(),
        throws: element
            .thrown_types()
            .iter()
            .map(|t| ThrownType::new(t.as_str()))
            .collect(),
    };
    Ok(node)
}

/// `(int, String)`: parameter types in order, so overloads stay distinct.
/// A parameter the host cannot deliver leaves an empty slot.
fn parameter_list<E: HostElement>(element: &E) -> String {
    let types: Vec<String> = element
        .parameters()
        .iter()
        .map(|p| match p {
            Ok(p) => p.type_ref().unwrap_or_default().to_string(),
            Err(_) => String::new(),
        })
        .collect();
    format!("({})", types.join(", "))
}

/// Total mapping from a host kind label to a declaration kind.
pub fn classify(kind: &str) -> DeclarationKind {
    let normalized = kind.trim().to_ascii_lowercase().replace(['-', ' '], "_");
    match normalized.as_str() {
        "package" => DeclarationKind::Package,
        "class" => DeclarationKind::Class,
        "interface" => DeclarationKind::Interface,
        "enum" => DeclarationKind::Enum,
        "record" => DeclarationKind::Record,
        "annotation" | "annotation_type" | "@interface" => DeclarationKind::AnnotationType,
        "field" => DeclarationKind::Field,
        "enum_constant" => DeclarationKind::EnumConstant,
        "constructor" => DeclarationKind::Constructor,
        "method" => DeclarationKind::Method,
        "parameter" => DeclarationKind::Parameter,
        "type_parameter" | "type_variable" => DeclarationKind::TypeParameter,
        _ => DeclarationKind::Other(kind.to_string()),
    }
}

/// Exactly the modifiers the host reports. Unrecognized words are returned
/// separately.
fn map_modifiers(words: &[String]) -> (ModifierSet, Vec<&str>) {
    let mut set = ModifierSet::default();
    let mut unknown = Vec::new();
    for word in words {
        match Modifier::from_keyword(word) {
            Some(m) => set.insert(m),
            None => unknown.push(word.as_str()),
        }
    }
    (set, unknown)
}

fn map_annotation(annotation: &HostAnnotation) -> AnnotationUsage {
    AnnotationUsage {
        name: annotation.name.clone(),
        arguments: annotation
            .arguments
            .iter()
            .map(|arg| AnnotationArgument {
                name: arg.name.clone(),
                value: map_value(&arg.value),
            })
            .collect(),
    }
}

fn map_value(value: &HostAnnotationValue) -> AnnotationValue {
    match value {
        HostAnnotationValue::Literal(s) => AnnotationValue::Literal(s.clone()),
        HostAnnotationValue::Bool(b) => AnnotationValue::Literal(b.to_string()),
        HostAnnotationValue::Number(n) => AnnotationValue::Literal(n.to_string()),
        HostAnnotationValue::Array(items) => {
            AnnotationValue::Array(items.iter().map(map_value).collect())
        }
        HostAnnotationValue::Annotation(nested) => {
            AnnotationValue::Annotation(map_annotation(nested))
        }
    }
}
