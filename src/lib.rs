//! xmldoclet: render a compiled-language declaration model and its
//! documentation comments as one stable XML document.
//!
//! The host hands over a read-only [`host::HostModel`]. [`walker::walk`]
//! maps every declaration, parses its comment and resolves references, then
//! a [`render::Renderer`] streams the finished tree to a sink.

pub mod comment;
pub mod config;
pub mod error;
pub mod host;
pub mod mapper;
pub mod model;
pub mod render;
pub mod resolve;
pub mod walker;

pub use config::Config;
pub use error::{Diagnostic, DiagnosticKind, DocletError, HostError};
pub use model::DocumentTree;
pub use walker::{walk, WalkStats};

use host::HostModel;
use render::xml::XmlRenderer;
use render::Renderer;
use std::io::Write;

/// Walk `host` and write it to `out` as one XML document.
///
/// Only a failing sink aborts the run.
pub fn run<H: HostModel>(
    host: &H,
    config: &Config,
    out: &mut dyn Write,
) -> Result<WalkStats, DocletError> {
    let (tree, stats) = walk(host, config);
    XmlRenderer::new(config.clone()).render(&tree, out)?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::json::JsonModel;
    use std::io;

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("sink closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn run_writes_a_document() {
        let model = JsonModel::from_json(r#"{"packages": [{"kind": "package", "name": "p"}]}"#)
            .unwrap();
        let mut out = Vec::new();
        let stats = run(&model, &Config::default(), &mut out).unwrap();
        assert_eq!(stats.declarations, 1);
        let xml = String::from_utf8(out).unwrap();
        assert!(xml.contains(r#"<package name="p" kind="package">"#));
    }

    #[test]
    fn sink_failure_is_fatal() {
        let model = JsonModel::from_json(r#"{"packages": []}"#).unwrap();
        let err = run(&model, &Config::default(), &mut BrokenSink).unwrap_err();
        assert!(matches!(err, DocletError::OutputWriteFailure(_)));
    }
}
