//! # CLI Module
//!
//! Command-line interface for the event image deduplicator.
//!
//! ## Usage
//! ```bash
//! # Remove near-duplicates from one directory and renumber the rest
//! image-dedup dedup public/events/acme/event-7/images
//!
//! # Stricter threshold, report only
//! image-dedup dedup public/events/acme/event-7/images --threshold 3 --dry-run
//!
//! # Admit freshly downloaded images, stopping at 9
//! image-dedup ingest public/events/acme/event-7/images downloads/*.jpg --limit 9
//!
//! # Deduplicate a catalog event and refresh its inventory
//! image-dedup event dedup 7 --catalog public/events/details.json --logo-first
//!
//! # Refresh every inventory
//! image-dedup event inventory --all --catalog public/events/details.json
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use event_image_dedup::core::catalog::{EventStore, ImageInventory, JsonCatalog};
use event_image_dedup::core::comparator::{MatchStrategy, ThresholdStrategy};
use event_image_dedup::core::dedup::{DecodeFailurePolicy, RemovalReason, RemovedImage};
use event_image_dedup::core::pipeline::{
    CatalogWorkflow, DedupConfig, DedupReport, DirectoryDeduper, IngestReport, Ingestor,
};
use event_image_dedup::error::{DedupError, Result};
use event_image_dedup::events::{
    self, DedupEvent, Event, EventReceiver, FingerprintEvent, PipelineEvent,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

/// Event Image Dedup - keep promo image folders free of near-duplicates
#[derive(Parser, Debug)]
#[command(name = "image-dedup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Remove duplicates from a directory and renumber the survivors
    Dedup {
        /// Directory of image-<N>.<ext> files
        dir: PathBuf,

        #[command(flatten)]
        matching: MatchArgs,

        /// First index of the renumbered sequence
        #[arg(long, default_value = "0")]
        start_index: u32,

        /// Keep image-0 as the logo and number the rest from 1
        #[arg(long)]
        logo_first: bool,

        /// Keep images that cannot be decoded instead of deleting them
        #[arg(long)]
        keep_undecodable: bool,

        /// Report what would happen without touching any file
        #[arg(long)]
        dry_run: bool,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Admit candidate images into a directory, skipping duplicates
    Ingest {
        /// Target directory of image-<N>.<ext> files
        dir: PathBuf,

        /// Candidate image files, in priority order
        #[arg(required = true)]
        candidates: Vec<PathBuf>,

        #[command(flatten)]
        matching: MatchArgs,

        /// Stop once the directory holds this many images
        #[arg(long)]
        limit: Option<usize>,

        /// Delete rejected candidates
        #[arg(long)]
        discard_rejected: bool,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Work with events listed in details.json
    Event {
        #[command(subcommand)]
        command: EventCommands,
    },
}

#[derive(Subcommand, Debug)]
enum EventCommands {
    /// Deduplicate an event's images, then refresh its inventory
    Dedup {
        /// Event id
        id: u64,

        #[command(flatten)]
        location: CatalogArgs,

        #[command(flatten)]
        matching: MatchArgs,

        /// Keep image-0 as the logo and number the rest from 1
        #[arg(long)]
        logo_first: bool,

        /// Keep images that cannot be decoded instead of deleting them
        #[arg(long)]
        keep_undecodable: bool,

        /// Report what would happen without touching any file
        #[arg(long)]
        dry_run: bool,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Rewrite the image inventory of one event or all events
    Inventory {
        /// Event id
        #[arg(required_unless_present = "all")]
        id: Option<u64>,

        /// Update every event in the catalog
        #[arg(long, conflicts_with = "id")]
        all: bool,

        #[command(flatten)]
        location: CatalogArgs,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
}

#[derive(Args, Debug)]
struct MatchArgs {
    /// Hamming distance below which images are duplicates (0-64)
    #[arg(short, long, default_value_t = ThresholdStrategy::DEFAULT_THRESHOLD)]
    threshold: u32,

    /// How images are compared
    #[arg(short, long, default_value = "perceptual")]
    strategy: Strategy,
}

#[derive(Args, Debug)]
struct CatalogArgs {
    /// Path to details.json
    #[arg(long)]
    catalog: PathBuf,

    /// Directory holding <brand>/event-<id>/images (defaults to the
    /// catalog's directory)
    #[arg(long)]
    events_root: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Strategy {
    /// dHash with a Hamming-distance threshold (default)
    Perceptual,
    /// Byte-identical files only
    Exact,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (removed paths only)
    Minimal,
}

impl MatchArgs {
    fn strategy(&self) -> Result<MatchStrategy> {
        match self.strategy {
            Strategy::Perceptual => Ok(MatchStrategy::perceptual(self.threshold)?),
            Strategy::Exact => Ok(MatchStrategy::Exact),
        }
    }
}

impl CatalogArgs {
    fn store(&self) -> EventStore {
        let root = self.events_root.clone().unwrap_or_else(|| {
            match self.catalog.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            }
        });
        EventStore::new(root)
    }
}

fn decode_policy(keep_undecodable: bool) -> DecodeFailurePolicy {
    if keep_undecodable {
        DecodeFailurePolicy::Keep
    } else {
        DecodeFailurePolicy::Discard
    }
}

/// Run the CLI
pub fn run() -> Result<()> {
    event_image_dedup::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Dedup {
            dir,
            matching,
            start_index,
            logo_first,
            keep_undecodable,
            dry_run,
            output,
        } => {
            let config = DedupConfig::new()
                .strategy(matching.strategy()?)
                .decode_failure(decode_policy(keep_undecodable))
                .start_index(start_index)
                .logo_first(logo_first)
                .dry_run(dry_run);
            run_dedup(&dir, config, output)
        }
        Commands::Ingest {
            dir,
            candidates,
            matching,
            limit,
            discard_rejected,
            output,
        } => {
            let ingestor = Ingestor::new(matching.strategy()?)?
                .limit(limit)
                .discard_rejected(discard_rejected);
            run_ingest(&dir, &candidates, &ingestor, output)
        }
        Commands::Event { command } => match command {
            EventCommands::Dedup {
                id,
                location,
                matching,
                logo_first,
                keep_undecodable,
                dry_run,
                output,
            } => {
                let config = DedupConfig::new()
                    .strategy(matching.strategy()?)
                    .decode_failure(decode_policy(keep_undecodable))
                    .logo_first(logo_first)
                    .dry_run(dry_run);
                run_event_dedup(id, &location, config, output)
            }
            EventCommands::Inventory {
                id,
                all,
                location,
                output,
            } => run_inventory(id, all, &location, output),
        },
    }
}

fn run_dedup(dir: &Path, config: DedupConfig, output: OutputFormat) -> Result<()> {
    let term = Term::stderr();
    print_header(&term, output);

    let deduper = DirectoryDeduper::new(config)?;
    let (sender, receiver) = events::channel();
    let progress = spawn_progress(receiver, output);

    let result = deduper.run_with_events(dir, &sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    progress.join().ok();

    let report = result?;
    match output {
        OutputFormat::Pretty => print_dedup_pretty(&term, &report),
        OutputFormat::Json => print_json(&report),
        OutputFormat::Minimal => print_removed_minimal(&report.removed),
    }
    Ok(())
}

fn run_ingest(
    dir: &Path,
    candidates: &[PathBuf],
    ingestor: &Ingestor,
    output: OutputFormat,
) -> Result<()> {
    let term = Term::stderr();
    print_header(&term, output);

    let (sender, receiver) = events::channel();
    let progress = spawn_progress(receiver, output);

    let result = ingestor.ingest_with_events(dir, candidates, &sender);

    drop(sender);
    progress.join().ok();

    let report = result?;
    match output {
        OutputFormat::Pretty => print_ingest_pretty(&term, &report),
        OutputFormat::Json => print_json(&report),
        OutputFormat::Minimal => {
            for step in &report.admitted {
                println!("{}", step.to.display());
            }
        }
    }
    Ok(())
}

fn run_event_dedup(
    id: u64,
    location: &CatalogArgs,
    config: DedupConfig,
    output: OutputFormat,
) -> Result<()> {
    let term = Term::stderr();
    print_header(&term, output);

    let catalog = JsonCatalog::new(&location.catalog);
    let workflow = CatalogWorkflow::new(&catalog, location.store());

    let (sender, receiver) = events::channel();
    let progress = spawn_progress(receiver, output);

    let result = workflow.dedup_event_with_events(id, config, &sender);

    drop(sender);
    progress.join().ok();

    let report = result?;
    match output {
        OutputFormat::Pretty => {
            print_dedup_pretty(&term, &report.dedup);
            if let Some(inventory) = &report.inventory {
                print_inventory_line(&term, id, inventory);
            }
        }
        OutputFormat::Json => print_json(&report),
        OutputFormat::Minimal => print_removed_minimal(&report.dedup.removed),
    }
    Ok(())
}

fn run_inventory(
    id: Option<u64>,
    all: bool,
    location: &CatalogArgs,
    output: OutputFormat,
) -> Result<()> {
    let term = Term::stderr();
    let catalog = JsonCatalog::new(&location.catalog);
    let workflow = CatalogWorkflow::new(&catalog, location.store());

    let results: Vec<(u64, Result<ImageInventory>)> = match (id, all) {
        (Some(id), false) => vec![(id, Ok(workflow.refresh_inventory(id)?))],
        (None, true) => workflow.refresh_all()?,
        _ => {
            return Err(DedupError::Config(
                "pass either an event id or --all".to_string(),
            ))
        }
    };

    match output {
        OutputFormat::Pretty => {
            for (id, result) in &results {
                match result {
                    Ok(inventory) => print_inventory_line(&term, *id, inventory),
                    Err(e) => {
                        term.write_line(&format!(
                            "  {} Event {}: {}",
                            style("✗").red(),
                            id,
                            e
                        ))
                        .ok();
                    }
                }
            }
            let total: usize = results
                .iter()
                .filter_map(|(_, r)| r.as_ref().ok())
                .map(|inventory| inventory.total_images)
                .sum();
            term.write_line(&format!(
                "\n  {} images across {} events",
                style(total).cyan(),
                results.len()
            ))
            .ok();
        }
        OutputFormat::Json => {
            let output: Vec<_> = results
                .iter()
                .map(|(id, result)| match result {
                    Ok(inventory) => serde_json::json!({ "id": id, "inventory": inventory }),
                    Err(e) => serde_json::json!({ "id": id, "error": e.to_string() }),
                })
                .collect();
            print_json(&output);
        }
        OutputFormat::Minimal => {
            for inventory in results.iter().filter_map(|(_, r)| r.as_ref().ok()) {
                for image in &inventory.images {
                    println!("{}", image.path);
                }
            }
        }
    }
    Ok(())
}

fn print_header(term: &Term, output: OutputFormat) {
    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Event Image Dedup").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }
}

/// Drive a progress bar from pipeline events on a separate thread
fn spawn_progress(receiver: EventReceiver, output: OutputFormat) -> JoinHandle<()> {
    // Progress bar for pretty output
    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(0);
        let template = "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}";
        if let Ok(bar_style) = ProgressStyle::default_bar().template(template) {
            pb.set_style(bar_style.progress_chars("█▓░"));
        }
        Some(pb)
    } else {
        None
    };

    thread::spawn(move || {
        for event in receiver.iter() {
            let Some(pb) = &progress else { continue };
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(format!("{}", phase));
                }
                Event::Fingerprint(FingerprintEvent::Started { total_images }) => {
                    pb.set_length(total_images as u64);
                    pb.set_position(0);
                }
                Event::Fingerprint(FingerprintEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                }
                Event::Dedup(DedupEvent::Undecodable { path, .. }) => {
                    pb.println(format!(
                        "  {} cannot decode {}",
                        style("!").yellow(),
                        path.display()
                    ));
                }
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Pipeline(PipelineEvent::Error { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    })
}

fn print_dedup_pretty(term: &Term, report: &DedupReport) {
    term.write_line(&format!(
        "{} {}",
        style("✓").green().bold(),
        if report.dry_run { "Dry run complete" } else { "Dedup complete" }
    ))
    .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} images scanned in {:.1}s",
        style(report.total_images).cyan(),
        report.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!("  {} kept", style(report.kept.len()).cyan())).ok();
    term.write_line(&format!(
        "  {} duplicates removed",
        style(report.duplicate_count()).cyan()
    ))
    .ok();
    if report.undecodable_count() > 0 {
        term.write_line(&format!(
            "  {} undecodable images removed",
            style(report.undecodable_count()).yellow()
        ))
        .ok();
    }
    term.write_line(&format!("  {} renamed", style(report.renames.len()).cyan()))
        .ok();
    term.write_line("").ok();

    print_removed_pretty(term, &report.removed);

    if !report.renames.is_empty() {
        term.write_line(&format!("{}", style("Renames:").bold().underlined()))
            .ok();
        for step in &report.renames {
            term.write_line(&format!(
                "    {} → {}",
                file_name(&step.from),
                style(file_name(&step.to)).green()
            ))
            .ok();
        }
        term.write_line("").ok();
    }

    print_errors(term, &report.errors);

    if report.dry_run {
        term.write_line(&format!(
            "{}",
            style("No files were changed (dry run).").dim()
        ))
        .ok();
    }
}

fn print_ingest_pretty(term: &Term, report: &IngestReport) {
    term.write_line(&format!("{} Ingest complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();
    term.write_line(&format!(
        "  {} images already present",
        style(report.baseline).cyan()
    ))
    .ok();
    term.write_line(&format!("  {} admitted", style(report.admitted.len()).green()))
        .ok();
    term.write_line(&format!("  {} rejected", style(report.rejected.len()).cyan()))
        .ok();
    if !report.skipped.is_empty() {
        term.write_line(&format!(
            "  {} skipped (limit reached)",
            style(report.skipped.len()).dim()
        ))
        .ok();
    }
    term.write_line("").ok();

    for step in &report.admitted {
        term.write_line(&format!(
            "    {} {} → {}",
            style("+").green(),
            step.from.display(),
            style(file_name(&step.to)).green()
        ))
        .ok();
    }
    print_removed_pretty(term, &report.rejected);
    print_errors(term, &report.errors);
}

fn print_removed_pretty(term: &Term, removed: &[RemovedImage]) {
    if removed.is_empty() {
        return;
    }
    term.write_line(&format!("{}", style("Removed:").bold().underlined()))
        .ok();
    for entry in removed {
        let detail = match &entry.reason {
            RemovalReason::Duplicate {
                of,
                distance,
                match_type,
            } => format!(
                "{} of {} (distance {})",
                style(match_type).yellow(),
                file_name(of),
                distance
            ),
            RemovalReason::Undecodable { reason } => {
                format!("{} {}", style("undecodable:").red(), reason)
            }
        };
        term.write_line(&format!(
            "    {} {} {}",
            style("○").dim(),
            entry.image.path.display(),
            detail
        ))
        .ok();
    }
    term.write_line("").ok();
}

fn print_errors(term: &Term, errors: &[String]) {
    for error in errors {
        term.write_line(&format!("  {} {}", style("⚠").yellow(), error))
            .ok();
    }
}

fn print_inventory_line(term: &Term, id: u64, inventory: &ImageInventory) {
    term.write_line(&format!(
        "  {} Event {}: {} images ({} promotional)",
        style("✓").green(),
        id,
        inventory.total_images,
        inventory.promotional_count()
    ))
    .ok();
}

fn print_removed_minimal(removed: &[RemovedImage]) {
    for entry in removed {
        println!("{}", entry.image.path.display());
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("failed to serialize output: {}", e),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
