//! Multiple-document output: one document per top-level type and an index
//! listing them.

use super::xml::Emitter;
use super::Renderer;
use crate::config::Config;
use crate::error::DocletError;
use crate::model::DocumentTree;
use std::io::Write;

pub struct IndexRenderer {
    config: Config,
    subfolders: bool,
}

impl IndexRenderer {
    pub fn new(config: Config, subfolders: bool) -> Self {
        Self { config, subfolders }
    }
}

impl Renderer for IndexRenderer {
    fn render(&self, tree: &DocumentTree, out: &mut dyn Write) -> Result<(), DocletError> {
        let mut emitter = Emitter::new(out, &self.config);
        emitter.declaration()?;
        emitter.open("root", Vec::new())?;
        if let Some(ref meta) = tree.meta {
            emitter.empty("meta", vec![("created", meta.created.clone())])?;
        }
        for package in &tree.packages {
            emitter.open("package", vec![("name", package.qualified_name.clone())])?;
            for ty in package.children.iter().filter(|c| c.kind.is_type()) {
                emitter.empty(
                    "type",
                    vec![
                        ("name", ty.name.clone()),
                        ("qualified", ty.qualified_name.clone()),
                        ("kind", ty.kind.label().to_string()),
                        ("href", document_path(&ty.qualified_name, self.subfolders)),
                    ],
                )?;
            }
            emitter.close("package")?;
        }
        emitter.close("root")?;
        emitter.finish()
    }

    fn file_extension(&self) -> &str {
        "xml"
    }
}

/// Relative path of the document for a top-level type, always with `/`
/// separators: `p.q.Type.xml`, or `p/q/Type.xml` with subfolders.
pub fn document_path(qualified: &str, subfolders: bool) -> String {
    if subfolders {
        format!("{}.xml", qualified.replace('.', "/"))
    } else {
        format!("{}.xml", qualified)
    }
}

/// Split a tree into one tree per top-level type, each holding the type's
/// package (without its other types) and the type itself. Returns the
/// document path with each tree, in document order.
pub fn split_by_type(tree: &DocumentTree, subfolders: bool) -> Vec<(String, DocumentTree)> {
    let mut documents = Vec::new();
    for package in &tree.packages {
        for ty in package.children.iter().filter(|c| c.kind.is_type()) {
            let mut shell = package.clone();
            shell.comment = None;
            shell.children = vec![ty.clone()];
            documents.push((
                document_path(&ty.qualified_name, subfolders),
                DocumentTree {
                    meta: tree.meta.clone(),
                    packages: vec![shell],
                },
            ));
        }
    }
    documents
}
