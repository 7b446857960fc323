//! guide-kit command line
//!
//! Validates guide files, prints the guide JSON Schema, synthesizes selectors for nodes
//! of a DOM snapshot, and dry-runs guides against a snapshot.

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use guide_kit::guide::{DirectoryGuideStore, GuideStore, import_guide};
use guide_kit::{Config, DomTree, GuideDocument, GuidePlayer, ResolutionPolicy, StepView, TourRenderer};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Policy {
    /// Skip steps whose target is missing
    Skip,
    /// Show the popover without a highlight
    ShowUnanchored,
}

impl From<Policy> for ResolutionPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Skip => ResolutionPolicy::Skip,
            Policy::ShowUnanchored => ResolutionPolicy::ShowUnanchored,
        }
    }
}

#[derive(Parser)]
#[command(name = "guide-kit")]
#[command(version)]
#[command(about = "Author, check and dry-run guided product tours", long_about = None)]
struct Cli {
    /// Directory holding guide files (overrides GUIDE_KIT_GUIDES_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    guides_dir: Option<PathBuf>,

    /// What to do with steps whose target is missing (overrides GUIDE_KIT_RESOLUTION_POLICY)
    #[arg(long, global = true, value_enum)]
    policy: Option<Policy>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that a file is a well-formed guide
    Validate {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the JSON Schema of the guide format
    Schema,

    /// Print the selector for a node of a DOM snapshot
    Synthesize {
        /// ElementNode JSON snapshot
        #[arg(long, value_name = "FILE")]
        dom: PathBuf,

        /// Child indices from the root, e.g. 1/0/2
        #[arg(long, default_value = "")]
        path: String,
    },

    /// Walk a guide against a DOM snapshot and print every step shown
    Play {
        #[arg(long, value_name = "FILE")]
        dom: PathBuf,

        /// Guide file, or the id of a guide in the guides directory
        guide: String,
    },

    /// List the guides in the guides directory
    List,
}

/// Prints each step instead of drawing it
struct ConsoleRenderer;

impl TourRenderer for ConsoleRenderer {
    fn show_step(&mut self, view: &StepView) {
        println!("[{}] {}", view.progress_text, view.title);
        println!("    target: {}", view.selector);
        match view.bounds {
            Some(bounds) => println!(
                "    at ({}, {}) {}, popover {} / {}",
                bounds.x,
                bounds.y,
                bounds.dimension_label(),
                view.placement,
                view.alignment
            ),
            None => println!("    no highlight, popover {} / {}", view.placement, view.alignment),
        }
        if !view.description.is_empty() {
            println!("    {}", view.description);
        }
    }

    fn clear(&mut self) {}
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = Config::from_env().context("Invalid GUIDE_KIT_* environment")?;
    if let Some(dir) = cli.guides_dir {
        config = config.guides_dir(dir);
    }
    if let Some(policy) = cli.policy {
        config = config.resolution_policy(policy.into());
    }

    match cli.command {
        Command::Validate { file } => validate(&file),
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&GuideDocument::json_schema())?);
            Ok(())
        }
        Command::Synthesize { dom, path } => synthesize(&config, &dom, &path),
        Command::Play { dom, guide } => play(&config, &dom, &guide),
        Command::List => list(&config),
    }
}

fn read_guide(path: &Path) -> anyhow::Result<GuideDocument> {
    let json = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(import_guide(&json)?)
}

fn read_dom(path: &Path) -> anyhow::Result<DomTree> {
    let json = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    DomTree::from_json(&json).with_context(|| format!("{} is not an element snapshot", path.display()))
}

fn validate(file: &Path) -> anyhow::Result<()> {
    let guide = read_guide(file)?;
    println!(
        "{}: '{}' is valid ({} step{})",
        file.display(),
        guide.name,
        guide.len(),
        if guide.len() == 1 { "" } else { "s" }
    );
    Ok(())
}

fn synthesize(config: &Config, dom: &Path, path: &str) -> anyhow::Result<()> {
    let doc = read_dom(dom)?;
    let Some(node) = doc.node_at_path_str(path)? else {
        bail!("No element at path '{}'", path);
    };

    let (selector, rule) = config.synthesizer().synthesize_with_rule(&doc, node)?;
    let matches = selector.resolve_all(&doc)?;
    println!("{}", selector);
    log::info!("Rule {:?}, {} match(es), first is target: {}", rule, matches.len(), matches.first() == Some(&node));
    Ok(())
}

fn play(config: &Config, dom: &Path, guide: &str) -> anyhow::Result<()> {
    let doc = read_dom(dom)?;
    let guide_path = Path::new(guide);
    let guide = if guide_path.is_file() {
        read_guide(guide_path)?
    } else {
        DirectoryGuideStore::new(&config.guides_dir).load(guide)?
    };

    let mut player = GuidePlayer::with_policy(ConsoleRenderer, config.resolution_policy);
    let report = player.start(&guide, &doc);
    for skipped in &report.skipped {
        println!("skipped step {}: {} ({})", skipped.index + 1, skipped.selector, skipped.reason);
    }

    let mut last_index = player.active_index();
    while player.is_active() {
        player.advance(&doc);
        if let Some(index) = player.active_index() {
            for skipped in last_index.map_or(0, |i| i + 1)..index {
                println!("skipped step {}: {}", skipped + 1, guide.steps[skipped].element);
            }
        }
        last_index = player.active_index().or(last_index);
    }

    println!("tour ended: {:?}", player.status());
    Ok(())
}

fn list(config: &Config) -> anyhow::Result<()> {
    let store = DirectoryGuideStore::new(&config.guides_dir);
    for id in store.list()? {
        match store.load(&id) {
            Ok(guide) => println!("{:<24} {} ({} steps)", id, guide.name, guide.len()),
            Err(e) => println!("{:<24} unreadable: {}", id, e),
        }
    }
    Ok(())
}
