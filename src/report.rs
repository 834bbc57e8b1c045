//! Assembles the series drawn on each figure from the loaded result tables.

use crate::experiment::{self, OffloadBar, CONSENSUS_TIMES, PEER_COUNTS, TRANSACTION_TIMES};
use crate::results::{self, ResultTable, TOTAL_TASKS, UAV_AVAILABLE, UAV_BATTERY_AVG};
use crate::strategy::{self, MarkerShape, SeriesStyle, Strategy};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use plotters::style::RGBColor;
use std::path::{Path, PathBuf};

/// Markers on the battery panel are drawn on every Nth row
pub const BATTERY_MARKER_EVERY: usize = 10;
/// Markers on the availability panel are drawn on every Nth row
pub const AVAILABLE_MARKER_EVERY: usize = 5;

/// One simulation result file, loaded
#[derive(Debug, Clone)]
pub struct StrategyRun {
    pub label: String,
    pub strategy: Option<Strategy>,
    pub table: ResultTable,
}

impl StrategyRun {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let label = results::strategy_label(path);
        let strategy = Strategy::from_label(&label);
        if strategy.is_none() {
            warn!("Unknown strategy '{}' in {}, drawing it in black", label, path.display());
        }
        let table = ResultTable::load(path)
            .with_context(|| format!("Failed to load result table: {}", path.display()))?;
        debug!("{}: {} rows for '{}'", path.display(), table.len(), label);
        Ok(Self { label, strategy, table })
    }

    pub fn style(&self) -> SeriesStyle {
        strategy::style_for_label(&self.label)
    }

    pub fn path(&self) -> &Path {
        &self.table.path
    }
}

/// Load every run, in the order given
pub fn load_runs(paths: &[PathBuf]) -> Result<Vec<StrategyRun>> {
    paths.iter().map(StrategyRun::load).collect()
}

/// A labelled line with markers on a subset of its points
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub label: String,
    pub style: SeriesStyle,
    pub points: Vec<(f64, f64)>,
    pub marker_every: usize,
}

impl Trace {
    /// Points at rows 0, n, 2n, ...
    pub fn marker_points(&self) -> Vec<(f64, f64)> {
        if self.marker_every == 0 {
            return Vec::new();
        }
        self.points.iter().copied().step_by(self.marker_every).collect()
    }

    pub fn max_y(&self) -> f64 {
        self.points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Offload-time bars of one strategy
#[derive(Debug, Clone, PartialEq)]
pub struct BarGroup {
    pub strategy: Strategy,
    pub style: SeriesStyle,
    pub bars: Vec<OffloadBar>,
}

/// Data behind the four-panel performance figure
#[derive(Debug, Clone)]
pub struct PerformanceFigure {
    pub battery: Vec<Trace>,
    pub availability: Vec<Trace>,
    pub offload_time: Vec<BarGroup>,
    pub latency: Vec<Trace>,
}

/// Data behind the offload-proportion figure
#[derive(Debug, Clone)]
pub struct OffloadFigure {
    pub proportion: Vec<Trace>,
}

fn xy_trace(
    table: &ResultTable,
    label: &str,
    style: SeriesStyle,
    y_column: &str,
    marker_every: usize,
) -> Result<Trace> {
    let xs = table.column(TOTAL_TASKS)?;
    let ys = table.column(y_column)?;
    Ok(Trace {
        label: label.to_string(),
        style,
        points: xs.into_iter().zip(ys).collect(),
        marker_every,
    })
}

pub fn build_performance_figure(runs: &[StrategyRun]) -> Result<PerformanceFigure> {
    let mut battery = Vec::with_capacity(runs.len());
    let mut availability = Vec::with_capacity(runs.len());

    for run in runs {
        let mut table = run.table.clone();
        table
            .clamp_uav_columns()
            .with_context(|| format!("Invalid result table: {}", run.path().display()))?;
        let style = run.style();
        battery.push(xy_trace(&table, &run.label, style, UAV_BATTERY_AVG, BATTERY_MARKER_EVERY)?);
        availability.push(xy_trace(&table, &run.label, style, UAV_AVAILABLE, AVAILABLE_MARKER_EVERY)?);
    }

    let offload_time = Strategy::ALL
        .into_iter()
        .map(|s| BarGroup {
            strategy: s,
            style: s.style(),
            bars: experiment::offload_bars(s),
        })
        .collect();

    Ok(PerformanceFigure {
        battery,
        availability,
        offload_time,
        latency: latency_traces(),
    })
}

fn latency_traces() -> Vec<Trace> {
    let peers = PEER_COUNTS.map(f64::from);
    let trace = |label: &str, color: RGBColor, marker: MarkerShape, values: &[f64; 5]| Trace {
        label: label.to_string(),
        style: SeriesStyle {
            color,
            marker,
            hatch: strategy::HatchPattern::None,
        },
        points: peers.iter().copied().zip(values.iter().copied()).collect(),
        marker_every: 1,
    };
    vec![
        trace("Transaction Time", strategy::BLUE, MarkerShape::Circle, &TRANSACTION_TIMES),
        trace("Consensus Time", strategy::RED, MarkerShape::Square, &CONSENSUS_TIMES),
    ]
}

pub fn build_offload_figure(runs: &[StrategyRun], proportion_column: &str) -> Result<OffloadFigure> {
    let mut proportion = Vec::with_capacity(runs.len());

    for run in runs {
        let grouped = run
            .table
            .bucket_means()
            .with_context(|| format!("Failed to group result table: {}", run.path().display()))?;
        let (idx, positional) = grouped.proportion_column(proportion_column)?;
        if positional {
            warn!(
                "{}: no '{}' column, plotting '{}' instead",
                run.path().display(),
                proportion_column,
                grouped.headers[idx]
            );
        }

        let xs = grouped.column(TOTAL_TASKS)?;
        let ys = grouped.column_at(idx);
        proportion.push(Trace {
            label: run.label.clone(),
            style: run.style(),
            points: xs.into_iter().zip(ys).collect(),
            marker_every: 0,
        });
    }

    info!("Aggregated {} runs into {}-task buckets", runs.len(), results::BUCKET_TASKS);
    Ok(OffloadFigure { proportion })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{BLACK, DARK_VIOLET, ORANGE};
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str = "Total Tasks,UAV Battery Avg,UAV Available,Time Delay,TotalTaskUAV (%),TotalTaskEC (%)";

    fn fixture(dir: &TempDir, label: &str) -> PathBuf {
        let mut body = String::from(HEADER);
        for i in 0..30 {
            let tasks = i * 10;
            let battery = 100.0 - i as f64 * 4.0;
            let available = 10 - i / 3;
            body.push_str(&format!("\n{tasks},{battery:.2},{available},0.5,{:.2},{:.2}", 40.0 + i as f64, 60.0 - i as f64));
        }
        let path = dir.path().join(format!("graphe_result_{label}.csv"));
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_two_strategies_give_two_series_per_panel() {
        let dir = TempDir::new().unwrap();
        fixture(&dir, "RoundRobin");
        fixture(&dir, "Random");
        let paths = results::discover(dir.path()).unwrap();
        let runs = load_runs(&paths).unwrap();

        let perf = build_performance_figure(&runs).unwrap();
        let offload = build_offload_figure(&runs, "TotalTaskUAV (%)").unwrap();
        for traces in [&perf.battery, &perf.availability, &offload.proportion] {
            let labels: Vec<&str> = traces.iter().map(|t| t.label.as_str()).collect();
            assert_eq!(labels, vec!["Random", "RoundRobin"]);
            assert_eq!(traces[0].style.color, ORANGE);
            assert_eq!(traces[1].style.color, DARK_VIOLET);
        }
        assert_eq!(perf.offload_time.len(), Strategy::ALL.len());
        assert_eq!(perf.latency.len(), 2);
    }

    #[test]
    fn test_clamping_applies_to_performance_only() {
        let dir = TempDir::new().unwrap();
        let runs = load_runs(&[fixture(&dir, "Cobra")]).unwrap();
        let perf = build_performance_figure(&runs).unwrap();

        let battery = &perf.battery[0];
        assert!(battery.points.iter().all(|&(_, y)| y >= 0.0));
        // 100 - 24*4 = 4 is below the floor
        assert_eq!(battery.points[24].1, 0.0);
        assert_eq!(battery.points[23].1, 8.0);
        assert!(perf.availability[0].points.iter().all(|&(_, y)| y >= 0.0));

        // raw table is untouched
        assert_eq!(runs[0].table.column(UAV_BATTERY_AVG).unwrap()[24], 4.0);
    }

    #[test]
    fn test_marker_points_follow_row_interval() {
        let dir = TempDir::new().unwrap();
        let runs = load_runs(&[fixture(&dir, "Cobra")]).unwrap();
        let perf = build_performance_figure(&runs).unwrap();

        let xs: Vec<f64> = perf.battery[0].marker_points().iter().map(|p| p.0).collect();
        assert_eq!(xs, vec![0.0, 100.0, 200.0]);
        assert_eq!(perf.availability[0].marker_points().len(), 6);
    }

    #[test]
    fn test_offload_buckets() {
        let dir = TempDir::new().unwrap();
        let runs = load_runs(&[fixture(&dir, "Cobra")]).unwrap();
        let offload = build_offload_figure(&runs, "TotalTaskUAV (%)").unwrap();

        let points = &offload.proportion[0].points;
        // rows 0..=4 fall in bucket 0: tasks 0..40, proportion 40..44
        assert_eq!(points[0], (20.0, 42.0));
        assert_eq!(points.len(), 6);
    }

    #[test]
    fn test_unknown_strategy_uses_fallback() {
        let dir = TempDir::new().unwrap();
        let runs = load_runs(&[fixture(&dir, "Foo")]).unwrap();
        assert_eq!(runs[0].label, "Foo");
        assert_eq!(runs[0].strategy, None);

        let perf = build_performance_figure(&runs).unwrap();
        assert_eq!(perf.battery[0].style.color, BLACK);
        assert_eq!(perf.battery[0].style.marker, MarkerShape::Circle);
    }

    #[test]
    fn test_load_failure_names_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graphe_result_Cobra.csv");
        fs::write(&path, "Total Tasks,UAV Available\nten,3\n").unwrap();
        let err = load_runs(&[path]).unwrap_err();
        assert!(format!("{err:#}").contains("graphe_result_Cobra.csv"));
    }
}
