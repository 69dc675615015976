//! Renderer module: trait-based output dispatch.

pub mod escape;
pub mod index;
pub mod xml;

use crate::config::Config;
use crate::error::DocletError;
use crate::model::DocumentTree;
use std::io::Write;

/// Trait for writing a document tree to a sink in one forward pass.
pub trait Renderer {
    fn render(&self, tree: &DocumentTree, out: &mut dyn Write) -> Result<(), DocletError>;
    fn file_extension(&self) -> &str;
}

/// Create a renderer by name.
pub fn create_renderer(name: &str, config: &Config) -> Result<Box<dyn Renderer>, DocletError> {
    match name {
        "xml" => Ok(Box::new(xml::XmlRenderer::new(config.clone()))),
        "index" => Ok(Box::new(index::IndexRenderer::new(config.clone(), false))),
        "index-subfolders" => Ok(Box::new(index::IndexRenderer::new(config.clone(), true))),
        _ => Err(DocletError::Config(format!(
            "unknown renderer: {}. Use xml, index or index-subfolders",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_renderers() {
        let config = Config::default();
        assert_eq!(create_renderer("xml", &config).unwrap().file_extension(), "xml");
        assert_eq!(create_renderer("index", &config).unwrap().file_extension(), "xml");
        assert!(create_renderer("html", &config).is_err());
    }
}
