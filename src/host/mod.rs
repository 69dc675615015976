//! Host declaration model: the read-only traversal API the walker consumes.

pub mod json;

use crate::error::HostError;
use serde::Deserialize;

/// Root scope of a documentation run.
pub trait HostModel {
    type Element: HostElement;

    /// Packages in host order.
    fn packages(&self) -> Vec<Result<Self::Element, HostError>>;
}

/// One declaration as reported by the host.
///
/// Children are produced one `Result` at a time so that a single malformed
/// declaration can be isolated by the caller.
pub trait HostElement: Sized {
    /// Raw kind label, e.g. `class` or `method`.
    fn kind(&self) -> &str;
    fn name(&self) -> Result<&str, HostError>;
    fn qualified_name(&self) -> Option<&str>;
    fn modifiers(&self) -> &[String];
    fn type_parameters(&self) -> &[HostTypeParameter];
    fn annotations(&self) -> &[HostAnnotation];
    /// Field type, method return type or parameter type.
    fn type_ref(&self) -> Option<&str>;
    fn superclass(&self) -> Option<&str>;
    fn interfaces(&self) -> &[String];
    fn thrown_types(&self) -> &[String];
    /// Raw documentation comment text, continuation markers included.
    fn doc_comment(&self) -> Option<&str>;
    fn parameters(&self) -> Vec<Result<Self, HostError>>;
    /// Enclosed declarations (types of a package, members and nested types of
    /// a type) in declaration order.
    fn enclosed(&self) -> Vec<Result<Self, HostError>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostTypeParameter {
    pub name: String,
    #[serde(default)]
    pub bounds: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostAnnotation {
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<HostAnnotationArgument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostAnnotationArgument {
    #[serde(default)]
    pub name: Option<String>,
    pub value: HostAnnotationValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum HostAnnotationValue {
    Literal(String),
    Bool(bool),
    Number(serde_json::Number),
    Array(Vec<HostAnnotationValue>),
    Annotation(HostAnnotation),
}
