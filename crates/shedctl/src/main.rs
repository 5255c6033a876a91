//! Woodshed control CLI.
//!
//! Thin wrappers over the pipeline and curation jobs: `seed` generates
//! and persists progressions, `dedup` collapses duplicates, `regen`
//! processes pending reports, `report` and `like` drive the intake paths.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use chordsmith::{GenerationOrchestrator, GenerationParams, OpenAiChordModel};
use curator::{dedup, regen, DedupConfig};
use shedconf::ShedConfig;
use shedstore::{NewProgression, ProgressionStore};

#[derive(Parser)]
#[command(name = "shedctl", about = "Woodshed chord-progression corpus tools")]
struct Cli {
    /// Path to a config file (overrides ./woodshed.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate progressions and persist them
    Seed {
        /// How many progressions to generate
        #[arg(long, default_value_t = 1)]
        count: usize,

        #[arg(long, default_value = "C")]
        key: String,

        #[arg(long, default_value = "major")]
        scale: String,

        #[arg(long, default_value = "happy")]
        mood: String,

        #[arg(long, default_value = "any style")]
        style: String,

        /// Optional chord to start the progression on
        #[arg(long)]
        starting_chord: Option<String>,

        /// Delete every existing progression first
        #[arg(long)]
        clear: bool,

        /// Delete every existing report first
        #[arg(long)]
        clear_reports: bool,
    },

    /// Collapse duplicate progressions, keeping the best-scored member
    Dedup {
        /// Compute the keep/delete plan without committing
        #[arg(long)]
        dry_run: bool,

        /// Print per-group details
        #[arg(long)]
        verbose: bool,

        /// Accepted for compatibility; matching is exact content-key equality
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Run one regeneration pass over pending reports
    Regen,

    /// File a report against a progression
    Report {
        progression_id: String,

        #[arg(long)]
        reason: String,

        #[arg(long, default_value = "")]
        details: String,
    },

    /// Like a progression
    Like { progression_id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = ShedConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Command::Seed {
            count,
            key,
            scale,
            mood,
            style,
            starting_chord,
            clear,
            clear_reports,
        } => {
            let store = open_store(&config)?;
            if clear_reports {
                let removed = store.clear_reports()?;
                info!(removed, "cleared reports");
            }
            if clear {
                let removed = store.clear_progressions()?;
                info!(removed, "cleared progressions");
            }

            let orchestrator = orchestrator_from(&config)?;
            let params = GenerationParams {
                key,
                scale,
                mood,
                style,
                starting_chord,
            };

            for _ in 0..count {
                let generated = orchestrator.generate(&params).await;
                let record = store.insert_progression(NewProgression {
                    key: params.key.clone(),
                    scale: params.scale.clone(),
                    mood: params.mood.clone(),
                    style: params.style.clone(),
                    chords: generated.chords,
                    numerals: generated.numerals,
                    insights: generated.insights,
                })?;
                println!("{}  {}  [{:?}]", record.id, record.chords.join(" "), generated.source);
            }
        }

        Command::Dedup {
            dry_run,
            verbose,
            threshold,
        } => {
            let dedup_config = DedupConfig {
                dry_run,
                threshold,
                ..Default::default()
            };

            // errors are logged, never reflected in the exit status
            let outcome = open_store(&config).and_then(|store| {
                dedup::run(&store, &dedup_config).map_err(Into::into)
            });
            match outcome {
                Ok(report) => {
                    if verbose {
                        for group in &report.groups {
                            println!("group {}", group.content_key);
                            for (id, score) in &group.members {
                                let marker = if *id == group.keep { "keep" } else { "drop" };
                                println!("  {} {} ({:.1})", marker, id, score);
                            }
                        }
                    }
                    println!(
                        "scanned {} progressions, {} duplicate groups, {} planned, {} deleted in {} batches{}",
                        report.scanned,
                        report.groups.len(),
                        report.planned_deletions,
                        report.deleted,
                        report.batches_committed,
                        if report.dry_run { " (dry run)" } else { "" },
                    );
                    if let Some(reason) = &report.aborted {
                        error!(reason = %reason, "dedup run aborted before finishing its batches");
                    }
                }
                Err(e) => error!(error = %e, "dedup run failed"),
            }
        }

        Command::Regen => {
            let store = open_store(&config)?;
            let orchestrator = orchestrator_from(&config)?;
            let summary = regen::run(&store, &orchestrator).await?;
            println!(
                "{} groups: {} regenerated, {} skipped (missing), {} failed",
                summary.groups, summary.regenerated, summary.skipped_missing, summary.failed,
            );
        }

        Command::Report {
            progression_id,
            reason,
            details,
        } => {
            let store = open_store(&config)?;
            let report = store.file_report(&progression_id, &reason, &details)?;
            println!("filed report {} against {}", report.id, progression_id);
        }

        Command::Like { progression_id } => {
            let store = open_store(&config)?;
            store.increment_likes(&progression_id)?;
            println!("liked {}", progression_id);
        }
    }

    Ok(())
}

fn open_store(config: &ShedConfig) -> Result<ProgressionStore> {
    ProgressionStore::open(&config.store.db_path)
        .with_context(|| format!("opening store at {}", config.store.db_path.display()))
}

/// Build the generation pipeline from config. Missing credentials surface
/// here as a fatal error - the pipeline has no fallback for those.
fn orchestrator_from(config: &ShedConfig) -> Result<GenerationOrchestrator> {
    let model = OpenAiChordModel::from_config(&config.model).context("configuring model client")?;
    Ok(GenerationOrchestrator::new(Arc::new(model)))
}
