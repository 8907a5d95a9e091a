//! jsdox — generate documentation from JSDoc-annotated JavaScript files.
//!
//! Scans one or more source roots for documentable files, parses their
//! `/** ... */` comments, and either writes HTML pages, prints a JSON
//! tree, or lists topologically ordered `@dependency` closures.

mod codebase;
mod deps;
mod extract;
mod model;
mod render;
mod split;
mod tags;

use anyhow::{Context, Result};
use clap::Parser;
use codebase::CodeBase;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "jsdox",
    about = "Generate documentation from JSDoc-annotated JavaScript source files"
)]
struct Cli {
    /// Files to document, as keys relative to a search root.
    /// If omitted, every documentable file found is used.
    files: Vec<String>,

    /// Root directories to scan (glob patterns supported). Defaults to
    /// the current directory.
    #[arg(short = 'p', long = "jspath")]
    jspath: Vec<String>,

    /// Output directory for generated HTML
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Print the documentation as a JSON tree to stdout
    #[arg(short = 'j', long)]
    json: bool,

    /// Print the ordered dependency closure of the selected files
    #[arg(short = 'd', long)]
    dependencies: bool,

    /// Include @private entities in the output
    #[arg(long)]
    private: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let roots = expand_roots(&cli.jspath)?;
    let docs = CodeBase::from_roots(&roots, cli.private)?;
    if docs.is_empty() {
        eprintln!("warning: no documentable files found");
    }
    let selected = select_files(&docs, &cli.files);

    if cli.dependencies {
        return print_dependencies(&docs, &selected);
    }
    if cli.json {
        print!("{}", render::json::to_json_string(&docs));
        return Ok(());
    }
    save_docs(&docs, &selected, cli.output.as_deref())
}

/// Expand `--jspath` arguments into existing directories. A missing
/// argument list means the current directory.
fn expand_roots(patterns: &[String]) -> Result<Vec<PathBuf>> {
    if patterns.is_empty() {
        return Ok(vec![PathBuf::from(".")]);
    }
    let mut roots = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_dir() {
            roots.push(path.to_path_buf());
            continue;
        }
        let matches: Vec<PathBuf> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_dir())
            .collect();
        if matches.is_empty() {
            eprintln!("warning: no directories matched: {}", pattern);
        }
        roots.extend(matches);
    }
    roots.sort();
    roots.dedup();
    Ok(roots)
}

/// Resolve positional file arguments against the codebase. Unknown
/// names warn and are dropped; no arguments selects everything.
fn select_files(docs: &CodeBase, requested: &[String]) -> Vec<String> {
    if requested.is_empty() {
        return docs.keys().cloned().collect();
    }
    requested
        .iter()
        .filter(|name| {
            if docs.contains(name) {
                true
            } else {
                eprintln!("warning: File {} does not exist", name);
                false
            }
        })
        .cloned()
        .collect()
}

/// Dependency mode: one file key per line, dependencies before
/// dependents. Graph errors are reported, not fatal.
fn print_dependencies(docs: &CodeBase, selected: &[String]) -> Result<()> {
    match deps::find_dependencies(selected, docs) {
        Ok(order) => {
            for key in order {
                println!("{}", key);
            }
        }
        Err(err) => eprintln!("warning: {}", err),
    }
    Ok(())
}

/// HTML mode. A single selected file with no explicit output directory
/// renders into the working directory without an index page; any other
/// combination gets a full directory with `index.html` and the
/// stylesheet, defaulting to `apidocs`.
fn save_docs(docs: &CodeBase, selected: &[String], output: Option<&Path>) -> Result<()> {
    let single = selected.len() == 1 && output.is_none();
    let output_dir = match output {
        Some(dir) => dir.to_path_buf(),
        None if single => PathBuf::from("."),
        None => PathBuf::from("apidocs"),
    };
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create output directory: {}", output_dir.display()))?;

    write_page(
        &output_dir.join("jsdoc.css"),
        include_str!("../static/jsdoc.css"),
    )?;
    if !single {
        write_page(
            &output_dir.join("index.html"),
            &render::html::codebase_index(docs),
        )?;
    }

    for key in selected {
        let file = match docs.get(key) {
            Some(file) => file,
            None => continue,
        };
        let path = output_dir.join(file.url());
        let page = render::html::file_to_html(docs, file);
        // A failed page write shouldn't abort the remaining pages.
        if let Err(err) = write_page(&path, &page) {
            eprintln!("warning: {:#}", err);
        }
    }
    Ok(())
}

fn write_page(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
    }
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}
