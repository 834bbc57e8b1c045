//! Offload Report - comparative charts for UAV task-offload experiments.
//!
//! Reads the `graphe_result_<strategy>.csv` tables written by the offload
//! simulation, together with the hand-recorded offload-time and peer-latency
//! results, and renders them as SVG figures.

mod error;
mod experiment;
mod hatch;
mod plot;
mod report;
mod results;
mod strategy;
mod summary;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::fs;
use std::path::PathBuf;
use summary::RunSummary;

/// Render UAV battery, availability, offload-time and latency charts
#[derive(Parser, Debug)]
#[command(name = "offload-report")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding graphe_result_<strategy>.csv files
    #[arg(short, long, default_value = ".")]
    input_dir: PathBuf,

    /// Output directory for generated figures
    #[arg(short, long, default_value = "plots")]
    output_dir: PathBuf,

    /// Column plotted in the offload-proportion figure
    #[arg(long, default_value = "TotalTaskUAV (%)")]
    proportion_column: String,

    /// Write a JSON summary of the run to this file
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Skip the four-panel performance figure
    #[arg(long)]
    no_performance: bool,

    /// Skip the offload-proportion figure
    #[arg(long)]
    no_offload: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let inputs = results::discover(&args.input_dir)
        .with_context(|| format!("Failed to scan input directory: {}", args.input_dir.display()))?;
    if inputs.is_empty() {
        warn!(
            "No {}*.{} files in {}, only the literal results will be drawn",
            results::FILE_PREFIX,
            results::FILE_EXTENSION,
            args.input_dir.display()
        );
    }
    for path in &inputs {
        info!("Found result table: {}", path.display());
    }

    let runs = report::load_runs(&inputs)?;

    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Failed to create output directory: {}", args.output_dir.display()))?;

    let mut generated = Vec::new();

    if !args.no_performance {
        let figure = report::build_performance_figure(&runs)?;
        generated.push(plot::write_performance_figure(&figure, &args.output_dir)?);
    }

    let offload = if args.no_offload {
        None
    } else {
        let figure = report::build_offload_figure(&runs, &args.proportion_column)?;
        generated.push(plot::write_offload_figure(&figure, &args.output_dir)?);
        Some(figure)
    };

    if let Some(ref summary_path) = args.summary {
        RunSummary::new(&runs, offload.as_ref(), generated.clone())?.write(summary_path)?;
        info!("Wrote run summary to {}", summary_path.display());
    }

    println!("Generated {} figures:", generated.len());
    for path in &generated {
        println!("  {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["offload-report"]);
        assert_eq!(args.input_dir, PathBuf::from("."));
        assert_eq!(args.output_dir, PathBuf::from("plots"));
        assert_eq!(args.proportion_column, "TotalTaskUAV (%)");
        assert!(args.summary.is_none());
        assert!(!args.no_performance && !args.no_offload);
    }

    #[test]
    fn test_flags() {
        let args = Args::parse_from([
            "offload-report",
            "-i",
            "results",
            "-o",
            "out",
            "--proportion-column",
            "TotalTaskEC (%)",
            "--summary",
            "run.json",
            "--no-offload",
        ]);
        assert_eq!(args.input_dir, PathBuf::from("results"));
        assert_eq!(args.output_dir, PathBuf::from("out"));
        assert_eq!(args.proportion_column, "TotalTaskEC (%)");
        assert_eq!(args.summary, Some(PathBuf::from("run.json")));
        assert!(args.no_offload);
    }
}
