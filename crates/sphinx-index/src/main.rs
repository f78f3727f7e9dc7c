//! Command-line front end for inspecting `searchindex.js` files.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};

use sphinx_index::{SearchIndex, Searcher};

#[derive(Parser)]
#[command(name = "sphinx-index", version, about = "Inspect, validate, and search Sphinx searchindex.js files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run consistency checks and print every violation
    Validate {
        /// Path to a searchindex.js file
        file: PathBuf,

        /// Also fail on warnings, not just errors
        #[arg(long)]
        strict: bool,
    },

    /// Run a ranked query against the index
    Search {
        /// Path to a searchindex.js file
        file: PathBuf,

        /// Query words
        #[arg(required = true)]
        query: Vec<String>,

        /// Maximum number of hits to print
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Dump the object inventory
    Objects {
        /// Path to a searchindex.js file
        file: PathBuf,

        /// Only show symbols under this module prefix
        #[arg(long)]
        module: Option<String>,
    },

    /// Print summary statistics
    Stats {
        /// Path to a searchindex.js file
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Command::Validate { file, strict } => {
            let index = load(&file)?;
            let report = index.validate();
            for violation in report.violations() {
                println!("{}: {}", violation.severity(), violation);
            }
            let failed = !report.is_ok() || (strict && report.warning_count() > 0);
            println!(
                "{}: {} error(s), {} warning(s)",
                file.display(),
                report.error_count(),
                report.warning_count()
            );
            Ok(if failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Command::Search { file, query, limit } => {
            let index = load(&file)?;
            let searcher = Searcher::new(&index);
            let hits = searcher.search(&query.join(" "));
            for hit in hits.iter().take(limit) {
                match &hit.object {
                    Some(object) => {
                        println!("{:>7.1}  {}  [{}]", hit.score, hit.docname, object)
                    }
                    None => println!("{:>7.1}  {}  {}", hit.score, hit.docname, hit.title),
                }
            }
            if hits.is_empty() {
                println!("no results");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Objects { file, module } => {
            let index = load(&file)?;
            for symbol in index.symbols() {
                if let Some(prefix) = &module {
                    if !symbol.module.starts_with(prefix.as_str()) {
                        continue;
                    }
                }
                let kind = index
                    .object_kind(symbol.entry.kind)
                    .map(|k| k.label.as_str())
                    .unwrap_or("unknown kind");
                let docname = index.docname(symbol.entry.doc).unwrap_or("<out of bounds>");
                println!(
                    "{}  ({})  {}#{}",
                    symbol.fullname(),
                    kind,
                    docname,
                    symbol.anchor()
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Stats { file } => {
            let index = load(&file)?;
            println!("documents:   {}", index.doc_count());
            println!("body terms:  {}", index.terms.len());
            println!("title terms: {}", index.titleterms.len());
            println!("objects:     {}", index.object_count());
            println!("kinds:       {}", index.objnames.len());
            if !index.envversion.is_empty() {
                println!("envversion:");
                for (name, version) in &index.envversion {
                    println!("  {name}: {version}");
                }
            }
            let report = index.validate();
            if report.is_ok() {
                println!("consistency: ok ({} warning(s))", report.warning_count());
            } else {
                println!("consistency: {} error(s)", report.error_count());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load(file: &Path) -> anyhow::Result<SearchIndex> {
    SearchIndex::load(file).with_context(|| format!("failed to load {}", file.display()))
}
