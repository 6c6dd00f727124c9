//! tidyfile - AI-assisted file organizer.
//!
//! Usage:
//!   tidy drives                  List mounted locations
//!   tidy ls [PATH]               List a directory
//!   tidy tree [PATH]             Show the folder tree
//!   tidy stats [PATH]            Storage dashboard for a directory
//!   tidy categories              List organizer categories
//!   tidy analyze [PATH]          Classify files with the engine
//!   tidy search QUERY [PATH]     Semantic search over a directory
//!   tidy organize [PATH]         Analyze and move files (with --yes)
//!   tidy config                  Show or change persistent settings
//!   tidy --help                  Show help

mod settings;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use serde_json::json;

use tidyfile_backend::LocalBackend;
use tidyfile_core::{Backend, Classification, DirectoryStats, PathNode, SessionConfig};
use tidyfile_session::{NoticeLevel, Organizer, WorkflowState};

use crate::settings::UserSettings;

#[derive(Parser)]
#[command(
    name = "tidyfile",
    version,
    about = "AI-assisted file organizer",
    long_about = "tidyfile browses, analyzes, and organizes messy directories.\n\n\
                  Analysis and semantic search run the classification engine \
                  as a sidecar process; everything else works directly on the \
                  local filesystem."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List mounted locations offered as browse roots
    Drives {
        /// Output format
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// List a directory
    Ls {
        /// Directory to list
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Include hidden files
        #[arg(long)]
        hidden: bool,

        /// Output format
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// Show the folder tree under a directory
    Tree {
        /// Root directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// How many levels to expand
        #[arg(short, long, default_value = "2")]
        depth: usize,

        /// Include hidden folders
        #[arg(long)]
        hidden: bool,
    },

    /// Storage dashboard for a directory subtree
    Stats {
        /// Directory to analyze
        #[arg(default_value = ".")]
        path: PathBuf,

        /// List the files of one category instead of the dashboard
        #[arg(short, long)]
        category: Option<String>,

        /// Output format
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// List the organizer category names
    Categories {
        /// Output format
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// Classify the files of a directory with the engine
    Analyze {
        /// Directory to analyze
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Engine program override
        #[arg(long)]
        engine: Option<PathBuf>,

        /// Output format
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// Semantic search over a directory
    Search {
        /// Search query
        query: String,

        /// Directory to search
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Engine program override
        #[arg(long)]
        engine: Option<PathBuf>,

        /// Output format
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// Analyze a directory and move the files into suggested folders
    Organize {
        /// Directory to organize
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Destination root (defaults to the directory itself)
        #[arg(short, long)]
        dest: Option<PathBuf>,

        /// Apply AI-suggested renames while moving
        #[arg(long)]
        apply_renaming: bool,

        /// Actually move files (without this, only the plan is printed)
        #[arg(short, long)]
        yes: bool,

        /// Engine program override
        #[arg(long)]
        engine: Option<PathBuf>,
    },

    /// Show or change persistent settings
    Config {
        /// Set the engine program
        #[arg(long)]
        engine: Option<PathBuf>,

        /// Set whether hidden files are listed by default
        #[arg(long)]
        show_hidden: Option<bool>,

        /// Set the default output format
        #[arg(long)]
        default_format: Option<OutputFormat>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let settings = UserSettings::load();

    match cli.command {
        Command::Drives { format } => {
            run_drives(&settings, resolve_format(format, &settings)).await?;
        }
        Command::Ls {
            path,
            hidden,
            format,
        } => {
            run_ls(&settings, &path, hidden, resolve_format(format, &settings)).await?;
        }
        Command::Tree {
            path,
            depth,
            hidden,
        } => {
            run_tree(&settings, &path, depth, hidden).await?;
        }
        Command::Stats {
            path,
            category,
            format,
        } => {
            run_stats(
                &settings,
                &path,
                category,
                resolve_format(format, &settings),
            )
            .await?;
        }
        Command::Categories { format } => {
            run_categories(&settings, resolve_format(format, &settings)).await?;
        }
        Command::Analyze {
            path,
            engine,
            format,
        } => {
            run_analyze(
                &settings,
                &path,
                engine,
                resolve_format(format, &settings),
            )
            .await?;
        }
        Command::Search {
            query,
            path,
            engine,
            format,
        } => {
            run_search(
                &settings,
                &query,
                &path,
                engine,
                resolve_format(format, &settings),
            )
            .await?;
        }
        Command::Organize {
            path,
            dest,
            apply_renaming,
            yes,
            engine,
        } => {
            run_organize(&settings, &path, dest, apply_renaming, yes, engine).await?;
        }
        Command::Config {
            engine,
            show_hidden,
            default_format,
        } => {
            run_config(settings, engine, show_hidden, default_format)?;
        }
    }

    Ok(())
}

/// CLI format flag, falling back to the persisted default.
fn resolve_format(format: Option<OutputFormat>, settings: &UserSettings) -> OutputFormat {
    format.unwrap_or(match settings.format.as_str() {
        "json" => OutputFormat::Json,
        _ => OutputFormat::Text,
    })
}

fn build_config(settings: &UserSettings, engine: Option<PathBuf>, hidden: bool) -> SessionConfig {
    let mut config = settings.session_config();
    if let Some(engine) = engine {
        config.engine_program = engine;
    }
    if hidden {
        config.include_hidden = true;
    }
    config
}

fn organizer_with(config: SessionConfig) -> Organizer {
    Organizer::new(Arc::new(LocalBackend::new(config.clone())), config)
}

/// Fail with the first error notice, if any.
fn bail_on_error(org: &mut Organizer) -> Result<()> {
    for notice in org.take_notices() {
        if notice.level == NoticeLevel::Error {
            bail!("{}", notice.message);
        }
    }
    Ok(())
}

/// List mounted locations.
async fn run_drives(settings: &UserSettings, format: OutputFormat) -> Result<()> {
    let backend = LocalBackend::new(settings.session_config());
    let drives = backend.mounted_drives().await?;

    match format {
        OutputFormat::Text => {
            for drive in &drives {
                println!(
                    " {:<6} {:<16} {:<28} {:>10} free of {}",
                    drive.kind.as_str(),
                    drive.name,
                    drive.path.display(),
                    format_size(drive.available_space),
                    format_size(drive.total_space),
                );
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&drives)?),
    }

    Ok(())
}

/// List one directory through the session layer.
async fn run_ls(
    settings: &UserSettings,
    path: &Path,
    hidden: bool,
    format: OutputFormat,
) -> Result<()> {
    let path = path.canonicalize().context("Invalid path")?;
    let mut org = organizer_with(build_config(settings, None, hidden));

    org.navigate(path)?;
    org.run_until_settled().await;
    bail_on_error(&mut org)?;

    let Some(listing) = org.listing() else {
        bail!("No listing produced");
    };

    match format {
        OutputFormat::Text => {
            println!(
                " {} - {} files, {} folders",
                listing.path.display(),
                listing.total_files,
                listing.total_folders
            );
            println!("{}", "─".repeat(64));

            for entry in &listing.entries {
                let name = if entry.is_dir {
                    format!("{}/", entry.filename)
                } else {
                    entry.filename.clone()
                };
                let size = if entry.is_dir {
                    "-".to_string()
                } else {
                    format_size(entry.size_bytes)
                };
                println!(
                    " {:<40} {:>10}  {}",
                    truncate(&name, 40),
                    size,
                    format_time(entry.modified)
                );
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(listing)?),
    }

    Ok(())
}

/// Show the folder tree, expanding level by level through the cache.
async fn run_tree(settings: &UserSettings, path: &Path, depth: usize, hidden: bool) -> Result<()> {
    let path = path.canonicalize().context("Invalid path")?;
    let mut org = organizer_with(build_config(settings, None, hidden));

    org.select_tree_root(path.clone());
    org.run_until_settled().await;
    bail_on_error(&mut org)?;

    let mut frontier: Vec<PathNode> = org.tree().roots().to_vec();
    for _ in 1..depth {
        if frontier.is_empty() {
            break;
        }
        for node in &frontier {
            org.toggle_folder(node);
        }
        org.run_until_settled().await;
        bail_on_error(&mut org)?;

        let mut next = Vec::new();
        for node in &frontier {
            if let Some(children) = org.tree().children_of(&node.path) {
                next.extend_from_slice(children);
            }
        }
        frontier = next;
    }

    println!(" {}", path.display());
    let roots: Vec<PathNode> = org.tree().roots().to_vec();
    print_tree(&org, &roots, 1);

    Ok(())
}

/// Print tree nodes and their fetched children.
fn print_tree(org: &Organizer, nodes: &[PathNode], depth: usize) {
    for node in nodes {
        let marker = if org.tree().is_expanded(&node.path) {
            "▾ "
        } else if node.has_children {
            "▸ "
        } else {
            "  "
        };
        println!(" {}{}{}", "  ".repeat(depth), marker, node.name);

        if org.tree().is_expanded(&node.path) {
            if let Some(children) = org.tree().children_of(&node.path) {
                print_tree(org, children, depth + 1);
            }
        }
    }
}

/// Storage dashboard, or the file list of one category.
async fn run_stats(
    settings: &UserSettings,
    path: &Path,
    category: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let path = path.canonicalize().context("Invalid path")?;
    let backend = LocalBackend::new(settings.session_config());

    if let Some(category) = category {
        let files = backend.files_by_category(&path, &category).await?;
        match format {
            OutputFormat::Text => {
                println!(" {} files in category {}", files.len(), category);
                println!("{}", "─".repeat(64));
                for file in &files {
                    println!(
                        " {:<40} {:>10}  {}",
                        truncate(&file.filename, 40),
                        format_size(file.size_bytes),
                        file.filepath.display()
                    );
                }
            }
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&files)?),
        }
        return Ok(());
    }

    let stats = backend.directory_stats(&path).await?;
    match format {
        OutputFormat::Text => print_stats(&path, &stats),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
    }

    Ok(())
}

fn print_stats(path: &Path, stats: &DirectoryStats) {
    println!(
        " {} - {} in {} files",
        path.display(),
        format_size(stats.total_size),
        stats.total_files
    );
    println!("{}", "─".repeat(64));

    println!(" Categories:");
    let max_size = stats
        .categories
        .iter()
        .map(|c| c.size_bytes)
        .max()
        .unwrap_or(1);
    for cat in &stats.categories {
        let bar = make_bar(cat.size_bytes as f64 / max_size as f64, 20);
        println!(
            "   {:<16} {:>6} files {:>10}  {}",
            cat.category,
            cat.count,
            format_size(cat.size_bytes),
            bar
        );
    }

    if !stats.largest_files.is_empty() {
        println!();
        println!(" Largest files:");
        for file in &stats.largest_files {
            println!(
                "   {:>10}  {}",
                format_size(file.size_bytes),
                file.filepath.display()
            );
        }
    }

    if !stats.recent_files.is_empty() {
        println!();
        println!(" Recently modified:");
        for file in &stats.recent_files {
            println!(
                "   {}  {}",
                format_time(file.modified),
                file.filepath.display()
            );
        }
    }
}

/// List the fixed organizer categories.
async fn run_categories(settings: &UserSettings, format: OutputFormat) -> Result<()> {
    let backend = LocalBackend::new(settings.session_config());
    let categories = backend.available_categories().await?;

    match format {
        OutputFormat::Text => {
            for category in &categories {
                println!(" {category}");
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&categories)?),
    }

    Ok(())
}

/// Run the engine over a directory and print the suggestions.
async fn run_analyze(
    settings: &UserSettings,
    path: &Path,
    engine: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let path = path.canonicalize().context("Invalid path")?;
    let mut org = organizer_with(build_config(settings, engine, false));

    org.navigate(path.clone())?;
    org.run_until_settled().await;
    bail_on_error(&mut org)?;

    eprintln!("Analyzing {}...", path.display());
    org.analyze()?;
    org.run_until_settled().await;
    bail_on_error(&mut org)?;

    match format {
        OutputFormat::Text => {
            if let Some(summary) = org.summary() {
                println!(
                    " {} files ({} images, {} documents, {} other), {} duplicates, {:.1}s",
                    summary.total_files,
                    summary.images,
                    summary.documents,
                    summary.other_files,
                    summary.total_duplicates,
                    summary.scan_time
                );
                println!("{}", "─".repeat(64));
            }
            print_classifications(org.review().entries());
        }
        OutputFormat::Json => {
            let output = json!({
                "summary": org.summary(),
                "classifications": org.review().entries(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Semantic search over a directory.
async fn run_search(
    settings: &UserSettings,
    query: &str,
    path: &Path,
    engine: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let path = path.canonicalize().context("Invalid path")?;
    let mut org = organizer_with(build_config(settings, engine, false));

    org.navigate(path.clone())?;
    org.run_until_settled().await;
    bail_on_error(&mut org)?;

    eprintln!("Searching {} for \"{query}\"...", path.display());
    org.search(query)?;
    org.run_until_settled().await;
    bail_on_error(&mut org)?;

    match format {
        OutputFormat::Text => {
            println!(" {} matching files", org.review().len());
            println!("{}", "─".repeat(64));
            print_classifications(org.review().entries());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(org.review().entries())?);
        }
    }

    Ok(())
}

/// Analyze a directory and, with --yes, move the selected files.
async fn run_organize(
    settings: &UserSettings,
    path: &Path,
    dest: Option<PathBuf>,
    apply_renaming: bool,
    yes: bool,
    engine: Option<PathBuf>,
) -> Result<()> {
    let path = path.canonicalize().context("Invalid path")?;
    let mut org = organizer_with(build_config(settings, engine, false));

    org.navigate(path.clone())?;
    org.run_until_settled().await;
    bail_on_error(&mut org)?;

    eprintln!("Analyzing {}...", path.display());
    org.analyze()?;
    org.run_until_settled().await;
    bail_on_error(&mut org)?;

    if org.review().is_empty() {
        println!(" Nothing to organize.");
        return Ok(());
    }

    println!(
        " Plan: {} of {} files selected",
        org.review().selected_count(),
        org.review().len()
    );
    println!("{}", "─".repeat(64));
    print_classifications(org.review().entries());

    if !yes {
        println!();
        println!(" Dry run. Pass --yes to move the selected files.");
        return Ok(());
    }

    org.move_selected(dest, apply_renaming)?;
    org.run_until_settled().await;
    bail_on_error(&mut org)?;

    if org.state() != WorkflowState::Complete {
        bail!("Move did not complete");
    }
    if let Some(outcome) = org.last_move() {
        println!();
        println!(
            " Moved {} files ({} failed, {} skipped)",
            outcome.successful, outcome.failed, outcome.skipped
        );
    }

    Ok(())
}

/// Show or persist settings.
fn run_config(
    mut settings: UserSettings,
    engine: Option<PathBuf>,
    show_hidden: Option<bool>,
    default_format: Option<OutputFormat>,
) -> Result<()> {
    let changed = engine.is_some() || show_hidden.is_some() || default_format.is_some();

    if let Some(engine) = engine {
        settings.engine = engine;
    }
    if let Some(show_hidden) = show_hidden {
        settings.show_hidden = show_hidden;
    }
    if let Some(format) = default_format {
        settings.format = format.as_str().to_string();
    }

    if changed {
        settings.save().context("Could not save settings")?;
    }

    println!(" engine      = {}", settings.engine.display());
    println!(" show_hidden = {}", settings.show_hidden);
    println!(" format      = {}", settings.format);
    if let Some(path) = UserSettings::config_path() {
        println!(" file        = {}", path.display());
    }

    Ok(())
}

/// Print suggestion rows with selection markers.
fn print_classifications(entries: &[Classification]) {
    for entry in entries {
        let marker = if entry.selected { "[x]" } else { "[ ]" };
        let mut line = format!(
            " {} {:>3}  {:<32} -> {:<20} {:>3.0}%",
            marker,
            entry.index,
            truncate(&entry.filename, 32),
            truncate(&entry.suggested_folder, 20),
            entry.confidence * 100.0
        );
        if let Some(name) = &entry.suggested_name {
            line.push_str(&format!("  rename: {name}"));
        }
        if entry.is_duplicate {
            match &entry.duplicate_of {
                Some(of) => line.push_str(&format!("  duplicate of {}", of.display())),
                None => line.push_str("  duplicate"),
            }
        }
        println!("{line}");
    }
}

/// Create a simple ASCII bar.
fn make_bar(ratio: f64, width: usize) -> String {
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Format an optional timestamp.
fn format_time(time: Option<chrono::DateTime<chrono::Local>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Truncate a string to max length.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len - 1).collect();
        format!("{cut}…")
    }
}
