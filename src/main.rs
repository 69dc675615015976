//! xmldoclet: write a declaration model dump as a stable XML document.
//!
//! - **stdin mode**: `xmldoclet < model.json > api.xml`
//! - **file mode**: `xmldoclet -d out models/*.json`
//! - **multiple mode**: `xmldoclet -d out --multiple --subfolders models/*.json`

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use xmldoclet::config::{CustomTag, OutputEncoding, TypeFilter, UnresolvedPolicy};
use xmldoclet::host::json::JsonModel;
use xmldoclet::model::{DocumentTree, Visibility};
use xmldoclet::render::{create_renderer, index};
use xmldoclet::Config;

#[derive(Parser)]
#[command(
    name = "xmldoclet",
    about = "Render a declaration model and its documentation comments as XML"
)]
struct Cli {
    /// Model files in JSON (glob patterns supported). If omitted, reads from stdin.
    files: Vec<String>,

    /// Output directory. Without it the document goes to stdout.
    #[arg(short = 'd', long)]
    directory: Option<PathBuf>,

    /// Name of the output file inside the directory
    #[arg(long, default_value = "xmldoclet.xml")]
    filename: String,

    /// Output encoding: UTF-8 (default), ISO-8859-1, US-ASCII
    #[arg(long, default_value = "UTF-8")]
    docencoding: String,

    /// Leave out declarations less visible than this:
    /// private (default), package, protected, public
    #[arg(long, default_value = "private")]
    visibility: String,

    /// How unresolved link targets are written
    #[arg(long, default_value = "marked", value_parser = ["marked", "text"])]
    unresolved: String,

    /// Write the document without indentation
    #[arg(long)]
    no_indent: bool,

    /// One document per top-level type plus index.xml (requires --directory)
    #[arg(long)]
    multiple: bool,

    /// With --multiple, place documents in package folders
    #[arg(long)]
    subfolders: bool,

    /// Only types extending this class
    #[arg(long)]
    extends: Option<String>,

    /// Only types implementing this interface
    #[arg(long)]
    implements: Option<String>,

    /// Only types carrying this annotation
    #[arg(long)]
    annotated: Option<String>,

    /// Custom block tag, `name:scope:title`. Can be specified multiple times.
    #[arg(long)]
    tag: Vec<String>,

    /// Creation stamp written to the <meta> element
    #[arg(long)]
    created: Option<String>,

    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = build_config(&cli)?;
    let model = load_model(&cli.files)?;
    info!("loaded {} packages", model.package_count());

    if cli.multiple {
        return multiple_mode(&cli, &model, &config);
    }

    match cli.directory {
        Some(ref dir) => {
            let path = dir.join(&cli.filename);
            let mut out = create_output(&path)?;
            xmldoclet::run(&model, &config, &mut out)
                .with_context(|| format!("failed to write {}", path.display()))?;
            out.flush()
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            xmldoclet::run(&model, &config, &mut out).context("failed to write stdout")?;
            out.flush().context("failed to write stdout")?;
        }
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn build_config(cli: &Cli) -> Result<Config> {
    let custom_tags = cli
        .tag
        .iter()
        .map(|def| CustomTag::parse(def))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Config {
        encoding: OutputEncoding::from_label(&cli.docencoding)?,
        visibility: parse_visibility(&cli.visibility)?,
        unresolved: match cli.unresolved.as_str() {
            "text" => UnresolvedPolicy::PlainText,
            _ => UnresolvedPolicy::Marked,
        },
        indent: !cli.no_indent,
        filter: TypeFilter {
            extends: cli.extends.clone(),
            implements: cli.implements.clone(),
            annotated: cli.annotated.clone(),
        },
        custom_tags,
        created: cli.created.clone(),
    })
}

fn parse_visibility(level: &str) -> Result<Visibility> {
    match level {
        "private" => Ok(Visibility::Private),
        "package" => Ok(Visibility::Package),
        "protected" => Ok(Visibility::Protected),
        "public" => Ok(Visibility::Public),
        _ => bail!(
            "unknown visibility: {}. Use private, package, protected or public",
            level
        ),
    }
}

/// Read every model file, or stdin when none are given.
fn load_model(patterns: &[String]) -> Result<JsonModel> {
    if patterns.is_empty() {
        return JsonModel::from_reader(io::stdin().lock())
            .context("failed to read model from stdin");
    }
    let mut models = Vec::new();
    for path in expand_globs(patterns)? {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let model = JsonModel::from_json(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        models.push(model);
    }
    Ok(JsonModel::merge(models))
}

/// Expand glob patterns into files, keeping the order patterns were given.
/// Bare directories are scanned for `.json` files.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        let mut matches: Vec<PathBuf> = if path.is_dir() {
            fs::read_dir(path)
                .with_context(|| format!("failed to read directory: {}", path.display()))?
                .flatten()
                .map(|entry| entry.path())
                .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == "json"))
                .collect()
        } else {
            glob::glob(pattern)
                .with_context(|| format!("invalid glob pattern: {}", pattern))?
                .filter_map(|r| r.ok())
                .filter(|p| p.is_file())
                .collect()
        };
        if matches.is_empty() {
            warn!("no files matched: {}", pattern);
        }
        matches.sort();
        files.extend(matches);
    }
    let mut seen = std::collections::HashSet::new();
    files.retain(|p| seen.insert(p.clone()));
    if files.is_empty() {
        bail!("no model files found");
    }
    Ok(files)
}

fn create_output(path: &Path) -> Result<BufWriter<fs::File>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory: {}", parent.display()))?;
    }
    let file =
        fs::File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// One document per top-level type, plus `index.xml`.
fn multiple_mode(cli: &Cli, model: &JsonModel, config: &Config) -> Result<()> {
    let dir = cli
        .directory
        .as_deref()
        .context("--directory is required with --multiple")?;
    let (tree, _) = xmldoclet::walk(model, config);

    let renderer = create_renderer("xml", config)?;
    let documents = index::split_by_type(&tree, cli.subfolders);
    for (relative, document) in &documents {
        write_document(&dir.join(relative), &*renderer, document)?;
    }

    let index_name = if cli.subfolders {
        "index-subfolders"
    } else {
        "index"
    };
    let index_renderer = create_renderer(index_name, config)?;
    let index_path = dir.join(format!("index.{}", index_renderer.file_extension()));
    write_document(&index_path, &*index_renderer, &tree)?;
    info!("wrote {} documents and {}", documents.len(), index_path.display());
    Ok(())
}

fn write_document(
    path: &Path,
    renderer: &dyn xmldoclet::render::Renderer,
    tree: &DocumentTree,
) -> Result<()> {
    let mut out = create_output(path)?;
    renderer
        .render(tree, &mut out)
        .with_context(|| format!("failed to write {}", path.display()))?;
    out.flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_levels() {
        assert_eq!(parse_visibility("protected").unwrap(), Visibility::Protected);
        assert!(parse_visibility("friend").is_err());
    }

    #[test]
    fn explicit_files_keep_their_order() {
        let dir = tempfile::TempDir::new().unwrap();
        let b = dir.path().join("b.json");
        let a = dir.path().join("a.json");
        fs::write(&b, "{}").unwrap();
        fs::write(&a, "{}").unwrap();
        let patterns = [b.display().to_string(), a.display().to_string()];
        assert_eq!(expand_globs(&patterns).unwrap(), [b, a]);
    }

    #[test]
    fn directory_is_scanned_for_json() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("m.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        let files = expand_globs(&[dir.path().display().to_string()]).unwrap();
        assert_eq!(files.len(), 1);
    }
}
