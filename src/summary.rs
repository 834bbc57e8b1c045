//! JSON summary of a rendering run.

use crate::experiment::{self, OffloadBar};
use crate::report::{OffloadFigure, StrategyRun};
use crate::results::{clamp_available, clamp_battery, TOTAL_TASKS, UAV_AVAILABLE, UAV_BATTERY_AVG};
use crate::strategy::Strategy;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub inputs: Vec<PathBuf>,
    pub figures: Vec<PathBuf>,
    pub strategies: Vec<StrategySummary>,
    pub offload_time: Vec<OffloadTimeSummary>,
}

/// Facts about one result file
#[derive(Debug, Clone, Serialize)]
pub struct StrategySummary {
    pub label: String,
    /// `None` when the label isn't a known strategy
    pub strategy: Option<Strategy>,
    pub rows: usize,
    pub first_task: Option<f64>,
    pub last_task: Option<f64>,
    /// Battery average of the last row, after clamping
    pub final_battery: Option<f64>,
    /// Lowest UAV availability, after clamping
    pub min_available: Option<f64>,
    /// (mean total tasks, mean offload proportion) per 50-task bucket
    pub offload_buckets: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OffloadTimeSummary {
    pub strategy: Strategy,
    pub confidence_percent: f64,
    pub bars: Vec<OffloadBar>,
}

impl RunSummary {
    pub fn new(runs: &[StrategyRun], offload: Option<&OffloadFigure>, figures: Vec<PathBuf>) -> Result<Self> {
        // Proportion traces are built in run order
        let strategies = runs
            .iter()
            .enumerate()
            .map(|(i, run)| {
                let buckets = offload
                    .and_then(|f| f.proportion.get(i))
                    .map(|t| t.points.clone())
                    .unwrap_or_default();
                StrategySummary::new(run, buckets)
            })
            .collect::<Result<Vec<_>>>()?;

        let offload_time = Strategy::ALL
            .into_iter()
            .map(|s| OffloadTimeSummary {
                strategy: s,
                confidence_percent: s.confidence_percent(),
                bars: experiment::offload_bars(s),
            })
            .collect();

        Ok(Self {
            generated_at: Utc::now(),
            inputs: runs.iter().map(|r| r.path().to_path_buf()).collect(),
            figures,
            strategies,
            offload_time,
        })
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create summary file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

impl StrategySummary {
    fn new(run: &StrategyRun, offload_buckets: Vec<(f64, f64)>) -> Result<Self> {
        let table = &run.table;
        let tasks = table.column(TOTAL_TASKS)?;
        let battery = table.column(UAV_BATTERY_AVG)?;
        let available = table.column(UAV_AVAILABLE)?;

        Ok(Self {
            label: run.label.clone(),
            strategy: run.strategy,
            rows: table.len(),
            first_task: tasks.first().copied(),
            last_task: tasks.last().copied(),
            final_battery: battery.last().copied().map(clamp_battery),
            min_available: available
                .into_iter()
                .map(clamp_available)
                .reduce(f64::min),
            offload_buckets,
        })
    }
}
