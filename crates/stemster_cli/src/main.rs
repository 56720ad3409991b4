//! Command-line front end for the Stemster separation pipeline.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use stemster_core::config::ConfigManager;
use stemster_core::logging::init_tracing;
use stemster_core::models::{Device, ExportFormat, JobParameters, SeparationModel, StemKind};
use stemster_core::orchestrator::JobOrchestrator;

#[derive(Parser)]
#[command(name = "stemster", version, about = "Split audio tracks into stems")]
struct Cli {
    /// Path to the settings file. Created with defaults if missing.
    #[arg(long, global = true, default_value = "stemster.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run separation on an audio file and stage the resulting stems.
    Separate {
        /// Input audio file.
        input: PathBuf,

        /// Separation model (htdemucs, demucs48_hq, mdx_extra).
        #[arg(long)]
        model: Option<SeparationModel>,

        /// Number of random shifts, 1-10. More is slower and better.
        #[arg(long)]
        shifts: Option<u32>,

        /// Window overlap fraction in [0, 1].
        #[arg(long)]
        overlap: Option<f64>,

        /// Compute device (cpu, cuda).
        #[arg(long)]
        device: Option<Device>,

        /// Stems to keep, comma-separated (vocals,drums,bass,other).
        /// Defaults to all four.
        #[arg(long, value_delimiter = ',')]
        stems: Vec<StemKind>,

        /// Output format for the staged stems (wav, mp3).
        #[arg(long)]
        format: Option<ExportFormat>,

        /// Print the full job outcome as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// List staged tracks, most recently modified first.
    List {
        /// Print tracks as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Delete a track and its cached archive.
    Delete {
        /// Track name as shown by `list`.
        track: String,
    },

    /// Produce a zip archive of a track's stems and print its path.
    Archive {
        /// Track name as shown by `list`.
        track: String,

        /// Discard any cached archive and rebuild from current stems.
        #[arg(long)]
        rebuild: bool,
    },
}

fn main() -> Result<()> {
    init_tracing("stemster=info");

    let cli = Cli::parse();

    let mut manager = ConfigManager::new(&cli.config);
    manager
        .load_or_create()
        .with_context(|| format!("loading settings from {}", cli.config.display()))?;
    manager.ensure_dirs_exist()?;
    let settings = manager.settings().clone();

    match cli.command {
        Command::Separate {
            input,
            model,
            shifts,
            overlap,
            device,
            stems,
            format,
            json,
        } => {
            let mut params = JobParameters::new(input)
                .with_model(model.unwrap_or(settings.separation.default_model))
                .with_device(device.unwrap_or(settings.separation.default_device))
                .with_shifts(shifts.unwrap_or(settings.separation.default_shifts))
                .with_overlap(overlap.unwrap_or(settings.separation.default_overlap));
            if !stems.is_empty() {
                params = params.with_stems(stems);
            }
            if let Some(format) = format {
                params = params.with_export_format(format);
            }

            let mut orchestrator = JobOrchestrator::new(settings);
            if !json {
                orchestrator =
                    orchestrator.with_progress_callback(Box::new(|percent, message| {
                        println!("[{percent:>3}%] {message}");
                    }));
            }

            let outcome = orchestrator.run(&params);
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
                if !outcome.success() {
                    std::process::exit(1);
                }
            } else if outcome.success() {
                println!(
                    "Done in {:.1}s: {}",
                    outcome.elapsed_seconds,
                    outcome
                        .stem_dir
                        .as_deref()
                        .map(|d| d.display().to_string())
                        .unwrap_or_default()
                );
                for warning in &outcome.warnings {
                    println!("warning: {warning}");
                }
            } else {
                // The tail of the tool output usually carries the real
                // cause; its length comes from the logging settings.
                for line in &outcome.log_tail {
                    eprintln!("  {line}");
                }
                bail!(
                    "separation failed: {}",
                    outcome.error.as_deref().unwrap_or("unknown error")
                );
            }
        }

        Command::List { json } => {
            let orchestrator = JobOrchestrator::new(settings);
            let tracks = orchestrator.repository().list()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tracks)?);
                return Ok(());
            }
            if tracks.is_empty() {
                println!("No tracks staged yet.");
            }
            for track in tracks {
                println!(
                    "{:<32} {:>2} files  {}",
                    track.name,
                    track.stem_files.len(),
                    track.modified_local().format("%Y-%m-%d %H:%M")
                );
            }
        }

        Command::Delete { track } => {
            let orchestrator = JobOrchestrator::new(settings);
            orchestrator.repository().delete(&track)?;
            println!("Deleted '{track}'.");
        }

        Command::Archive { track, rebuild } => {
            let orchestrator = JobOrchestrator::new(settings);
            let cache = orchestrator.archive_cache();
            if rebuild {
                cache.invalidate(&track)?;
            }
            let record = orchestrator.repository().track(&track)?;
            let path = cache.get_or_build(&record)?;
            println!("{}", path.display());
        }
    }

    Ok(())
}
