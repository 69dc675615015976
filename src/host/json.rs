//! JSON dump of a host declaration model.
//!
//! Children stay as raw `serde_json::Value` until they are visited, so one
//! malformed entry only affects itself.

use super::{HostAnnotation, HostElement, HostModel, HostTypeParameter};
use crate::error::HostError;
use serde::Deserialize;
use serde_json::Value;
use std::io::Read;

#[derive(Debug, Default, Deserialize)]
pub struct JsonModel {
    #[serde(default)]
    packages: Vec<Value>,
}

impl JsonModel {
    pub fn from_json(input: &str) -> Result<Self, HostError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, HostError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Concatenate several models, keeping their order.
    pub fn merge(models: impl IntoIterator<Item = JsonModel>) -> Self {
        let packages = models.into_iter().flat_map(|m| m.packages).collect();
        Self { packages }
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }
}

impl HostModel for JsonModel {
    type Element = JsonElement;

    fn packages(&self) -> Vec<Result<JsonElement, HostError>> {
        decode_all(&self.packages)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonElement {
    kind: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    qualified_name: Option<String>,
    #[serde(default)]
    modifiers: Vec<String>,
    #[serde(default)]
    type_parameters: Vec<HostTypeParameter>,
    #[serde(default)]
    annotations: Vec<HostAnnotation>,
    #[serde(default, rename = "type")]
    type_ref: Option<String>,
    #[serde(default)]
    superclass: Option<String>,
    #[serde(default)]
    interfaces: Vec<String>,
    #[serde(default)]
    throws: Vec<String>,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    parameters: Vec<Value>,
    #[serde(default)]
    members: Vec<Value>,
}

fn decode_all(values: &[Value]) -> Vec<Result<JsonElement, HostError>> {
    values.iter().map(decode).collect()
}

fn decode(value: &Value) -> Result<JsonElement, HostError> {
    if !value.is_object() {
        return Err(HostError::Shape(format!(
            "expected a declaration object, found {}",
            describe(value)
        )));
    }
    Ok(JsonElement::deserialize(value)?)
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl HostElement for JsonElement {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn name(&self) -> Result<&str, HostError> {
        self.name
            .as_deref()
            .ok_or_else(|| HostError::MissingName {
                kind: self.kind.clone(),
            })
    }

    fn qualified_name(&self) -> Option<&str> {
        self.qualified_name.as_deref()
    }

    fn modifiers(&self) -> &[String] {
        &self.modifiers
    }

    fn type_parameters(&self) -> &[HostTypeParameter] {
        &self.type_parameters
    }

    fn annotations(&self) -> &[HostAnnotation] {
        &self.annotations
    }

    fn type_ref(&self) -> Option<&str> {
        self.type_ref.as_deref()
    }

    fn superclass(&self) -> Option<&str> {
        self.superclass.as_deref()
    }

    fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    fn thrown_types(&self) -> &[String] {
        &self.throws
    }

    fn doc_comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    fn parameters(&self) -> Vec<Result<JsonElement, HostError>> {
        decode_all(&self.parameters)
    }

    fn enclosed(&self) -> Vec<Result<JsonElement, HostError>> {
        decode_all(&self.members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostAnnotationValue;

    const MODEL: &str = r#"{
      "packages": [
        {
          "kind": "package",
          "name": "p",
          "members": [
            {
              "kind": "class",
              "name": "C",
              "qualified_name": "p.C",
              "modifiers": ["public"],
              "annotations": [
                {"name": "SuppressWarnings", "arguments": [{"value": ["unchecked", "rawtypes"]}]}
              ],
              "members": [
                {"kind": "method", "name": "m", "type": "void"},
                42
              ]
            }
          ]
        }
      ]
    }"#;

    #[test]
    fn reads_packages_and_members_in_order() {
        let model = JsonModel::from_json(MODEL).unwrap();
        let packages = model.packages();
        assert_eq!(packages.len(), 1);
        let p = packages[0].as_ref().unwrap();
        assert_eq!(p.name().unwrap(), "p");
        let types = p.enclosed();
        let c = types[0].as_ref().unwrap();
        assert_eq!(c.qualified_name(), Some("p.C"));
        assert_eq!(c.modifiers(), ["public"]);
        match &c.annotations()[0].arguments[0].value {
            HostAnnotationValue::Array(items) => assert_eq!(items.len(), 2),
            other => panic!("unexpected value {:?}", other),
        }
    }

    #[test]
    fn malformed_child_fails_alone() {
        let model = JsonModel::from_json(MODEL).unwrap();
        let p = model.packages().remove(0).unwrap();
        let c = p.enclosed().remove(0).unwrap();
        let members = c.enclosed();
        assert!(members[0].is_ok());
        assert!(matches!(members[1], Err(HostError::Shape(_))));
    }

    #[test]
    fn missing_name_is_reported_on_access() {
        let model = JsonModel::from_json(r#"{"packages": [{"kind": "package"}]}"#).unwrap();
        let p = model.packages().remove(0).unwrap();
        assert!(matches!(p.name(), Err(HostError::MissingName { .. })));
    }

    #[test]
    fn merge_keeps_file_order() {
        let a = JsonModel::from_json(r#"{"packages": [{"kind": "package", "name": "a"}]}"#).unwrap();
        let b = JsonModel::from_json(r#"{"packages": [{"kind": "package", "name": "b"}]}"#).unwrap();
        let merged = JsonModel::merge([a, b]);
        let names: Vec<String> = merged
            .packages()
            .into_iter()
            .map(|p| p.unwrap().name().unwrap().to_string())
            .collect();
        assert_eq!(names, ["a", "b"]);
    }
}
