//! `exposome` command line
//!
//! One subcommand per catalog operation:
//! - `sync-taxonomy`, `validate`, `inspect-schema`
//! - `export-csv`, `mindmap`, `plot`
//! - `migrate-subdomains`, `strip-normalized`
//!
//! Each command resolves the project layout, runs once and prints a short
//! report on stdout. Fatal errors surface as [`anyhow::Error`].

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod logging;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use exposome_curation::{
    migrate_corpus, strip_normalized, sync_taxonomy, validate_corpus, KeywordClassifier,
    PaperSchema, SchemaSummary, SyncOptions, NORMALIZED_FIELD,
};
use exposome_export::{
    collect_rows, parse_domain_order, plot_corpus, preview, read_rows, resolve_outputs,
    write_mindmap, write_rows, DomainOrder, DEFAULT_DPI, DEFAULT_TITLE, MAX_DPI, PREVIEW_ROWS,
};
use exposome_model::{corpus, ProjectLayout};
use tracing::debug;

// Re-exports
pub use logging::init_tracing;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result of a completed command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Command finished and found nothing wrong
    Success,
    /// Command finished but reported failures (validation)
    Failure,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Failure => ExitCode::from(1),
        }
    }
}

/// Command-line definition
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn build_cli() -> Command {
    Command::new("exposome")
        .version(VERSION)
        .about("Curation and export tools for the exposome paper catalog")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("root")
                .long("root")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Project root (defaults to $EXPOSOME_ROOT or the current directory)"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .help("Tracing filter, e.g. debug or exposome_curation=trace"),
        )
        .subcommand(
            Command::new("sync-taxonomy")
                .about("Add domains and subdomains used by papers to the taxonomy")
                .arg(
                    Arg::new("tax-path")
                        .long("tax-path")
                        .value_parser(value_parser!(PathBuf))
                        .help("Taxonomy file to update"),
                )
                .arg(
                    Arg::new("papers-glob")
                        .long("papers-glob")
                        .help("Glob selecting paper files"),
                )
                .arg(
                    Arg::new("full-keys")
                        .long("full-keys")
                        .action(ArgAction::SetTrue)
                        .help("Store subdomains as full dotted keys instead of tails"),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Report changes without writing the taxonomy"),
                ),
        )
        .subcommand(
            Command::new("validate").about("Check papers against the schema and taxonomy"),
        )
        .subcommand(
            Command::new("export-csv")
                .about("Flatten papers to a domain,subdomain,indicator,paper CSV")
                .arg(
                    Arg::new("out")
                        .long("out")
                        .value_parser(value_parser!(PathBuf))
                        .help("CSV output path"),
                )
                .arg(
                    Arg::new("only-dotted")
                        .long("only-dotted")
                        .action(ArgAction::SetTrue)
                        .help("Ignore subdomain keys without a dot"),
                ),
        )
        .subcommand(
            Command::new("mindmap")
                .about("Render the CSV as markmap Markdown and HTML")
                .arg(
                    Arg::new("csv")
                        .long("csv")
                        .value_parser(value_parser!(PathBuf))
                        .help("Input CSV"),
                )
                .arg(
                    Arg::new("out-dir")
                        .long("out-dir")
                        .value_parser(value_parser!(PathBuf))
                        .help("Output directory"),
                )
                .arg(
                    Arg::new("out-md")
                        .long("out-md")
                        .value_parser(value_parser!(PathBuf))
                        .help("Markdown file name or path"),
                )
                .arg(
                    Arg::new("out-html")
                        .long("out-html")
                        .value_parser(value_parser!(PathBuf))
                        .help("HTML file name or path"),
                )
                .arg(
                    Arg::new("title")
                        .long("title")
                        .default_value(DEFAULT_TITLE)
                        .help("Mindmap title"),
                )
                .arg(
                    Arg::new("domain-order")
                        .long("domain-order")
                        .help("Comma-separated preferred domain order"),
                ),
        )
        .subcommand(
            Command::new("plot")
                .about("Draw the tripartite domain/subdomain/indicator graph")
                .arg(
                    Arg::new("out")
                        .long("out")
                        .value_parser(value_parser!(PathBuf))
                        .help("PNG output path"),
                )
                .arg(
                    Arg::new("dpi")
                        .long("dpi")
                        .default_value("200")
                        .value_parser(value_parser!(u32).range(1..=i64::from(MAX_DPI)))
                        .help("Output resolution"),
                ),
        )
        .subcommand(
            Command::new("migrate-subdomains")
                .about("Write a keyword-normalized subdomains preview into each paper"),
        )
        .subcommand(
            Command::new("strip-normalized")
                .about("Remove the normalized subdomains preview from every paper"),
        )
        .subcommand(
            Command::new("inspect-schema").about("Summarize how permissive the paper schema is"),
        )
}

/// Parse `args` and run the selected command
///
/// # Errors
/// Returns clap usage errors and fatal command errors.
pub fn run_from<I, T>(args: I) -> Result<Outcome>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = build_cli().try_get_matches_from(args)?;
    run(&matches)
}

/// Run the command selected in `matches`
///
/// # Errors
/// Returns fatal command errors with context.
pub fn run(matches: &ArgMatches) -> Result<Outcome> {
    let layout = ProjectLayout::resolve(global_one::<PathBuf>(matches, "root"))
        .context("failed to resolve project layout")?;
    debug!(root = %layout.root().display(), "project layout resolved");

    match matches.subcommand() {
        Some(("sync-taxonomy", args)) => cmd_sync(&layout, args),
        Some(("validate", _)) => cmd_validate(&layout),
        Some(("export-csv", args)) => cmd_export_csv(&layout, args),
        Some(("mindmap", args)) => cmd_mindmap(&layout, args),
        Some(("plot", args)) => cmd_plot(&layout, args),
        Some(("migrate-subdomains", _)) => cmd_migrate(&layout),
        Some(("strip-normalized", _)) => cmd_strip(&layout),
        Some(("inspect-schema", _)) => cmd_inspect_schema(&layout),
        _ => {
            build_cli().print_help()?;
            Ok(Outcome::Success)
        }
    }
}

fn cmd_sync(layout: &ProjectLayout, args: &ArgMatches) -> Result<Outcome> {
    let taxonomy_path = args
        .get_one::<PathBuf>("tax-path")
        .map_or_else(|| layout.taxonomy_path().to_path_buf(), Clone::clone);
    let papers_glob = args
        .get_one::<String>("papers-glob")
        .map_or(layout.papers_glob(), String::as_str);
    let options = SyncOptions {
        full_keys: args.get_flag("full-keys"),
        dry_run: args.get_flag("dry-run"),
    };

    let report = sync_taxonomy(&taxonomy_path, papers_glob, options)
        .with_context(|| format!("taxonomy sync failed for {}", taxonomy_path.display()))?;
    print!("{}", report.render());
    Ok(Outcome::Success)
}

fn cmd_validate(layout: &ProjectLayout) -> Result<Outcome> {
    println!("Using schema:   {}", layout.schema_path().display());
    println!("Using taxonomy: {}", layout.taxonomy_path().display());
    let report = validate_corpus(layout).context("validation could not run")?;
    println!("{}", report.render());
    Ok(if report.passed() {
        Outcome::Success
    } else {
        Outcome::Failure
    })
}

fn cmd_export_csv(layout: &ProjectLayout, args: &ArgMatches) -> Result<Outcome> {
    let out = args
        .get_one::<PathBuf>("out")
        .cloned()
        .unwrap_or_else(|| layout.csv_path());
    let rows = collect_rows(layout, args.get_flag("only-dotted")).context("CSV export failed")?;
    write_rows(&out, &rows).context("CSV export failed")?;

    println!("CSV saved: {} ({} rows)", out.display(), rows.len());
    if !rows.is_empty() {
        print!("{}", preview(&rows, PREVIEW_ROWS));
    }
    Ok(Outcome::Success)
}

fn cmd_mindmap(layout: &ProjectLayout, args: &ArgMatches) -> Result<Outcome> {
    let csv_path = args
        .get_one::<PathBuf>("csv")
        .cloned()
        .unwrap_or_else(|| layout.csv_path());
    let out_dir = args
        .get_one::<PathBuf>("out-dir")
        .map_or_else(|| layout.plot_dir().to_path_buf(), Clone::clone);
    let title = args
        .get_one::<String>("title")
        .map_or(DEFAULT_TITLE, String::as_str);
    let base_order = args
        .get_one::<String>("domain-order")
        .and_then(|raw| parse_domain_order(raw))
        .unwrap_or_else(|| layout.domain_order().to_vec());

    let rows = read_rows(&csv_path)
        .with_context(|| format!("cannot build mindmap from {}", csv_path.display()))?;
    let order = DomainOrder::for_rows(&base_order, &rows);
    let outputs = resolve_outputs(
        &out_dir,
        args.get_one::<PathBuf>("out-md").cloned(),
        args.get_one::<PathBuf>("out-html").cloned(),
    );
    write_mindmap(&rows, &order, title, &outputs).context("mindmap rendering failed")?;

    println!("Mindmap Markdown: {}", outputs.markdown.display());
    println!("Mindmap HTML:     {}", outputs.html.display());
    Ok(Outcome::Success)
}

fn cmd_plot(layout: &ProjectLayout, args: &ArgMatches) -> Result<Outcome> {
    let out = args
        .get_one::<PathBuf>("out")
        .cloned()
        .unwrap_or_else(|| layout.plot_path());
    let dpi = args.get_one::<u32>("dpi").copied().unwrap_or(DEFAULT_DPI);

    let graph = plot_corpus(layout, &out, dpi).context("plot failed")?;
    let (domains, subdomains, indicators) = graph.counts();
    println!(
        "Nodes: {domains} domains, {subdomains} subdomains, {indicators} indicators; {} edges",
        graph.edge_count()
    );
    println!("Saved figure: {}", out.display());
    Ok(Outcome::Success)
}

fn cmd_migrate(layout: &ProjectLayout) -> Result<Outcome> {
    let classifier = KeywordClassifier::builtin().context("built-in classifier rules")?;
    let paths = corpus::discover_papers(layout.papers_glob())?;
    let migrated = migrate_corpus(&paths, &classifier).context("subdomain migration failed")?;
    for path in &migrated {
        println!(
            "✓ Migrated preview added to {} ({NORMALIZED_FIELD}).",
            file_name(path)
        );
    }
    Ok(Outcome::Success)
}

fn cmd_strip(layout: &ProjectLayout) -> Result<Outcome> {
    let paths = corpus::discover_papers(layout.papers_glob())?;
    let stripped = strip_normalized(&paths).context("stripping normalized previews failed")?;
    for path in &stripped {
        println!("stripped: {}", path.display());
    }
    Ok(Outcome::Success)
}

fn cmd_inspect_schema(layout: &ProjectLayout) -> Result<Outcome> {
    let path = layout.schema_path();
    let raw = PaperSchema::read_raw(path)
        .with_context(|| format!("cannot inspect schema {}", path.display()))?;
    println!("Load: {}", path.display());
    print!("{}", SchemaSummary::of(&raw).render());
    Ok(Outcome::Success)
}

/// Value of a global argument, wherever it appeared on the command line
#[must_use]
pub fn global_one<T>(matches: &ArgMatches, id: &str) -> Option<T>
where
    T: Clone + Send + Sync + 'static,
{
    matches
        .subcommand()
        .and_then(|(_, sub)| sub.get_one::<T>(id))
        .or_else(|| matches.get_one::<T>(id))
        .cloned()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}
