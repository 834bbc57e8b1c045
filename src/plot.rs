//! SVG rendering of the performance and offload-proportion figures.

use crate::experiment::TASK_COUNTS;
use crate::hatch;
use crate::report::{BarGroup, OffloadFigure, PerformanceFigure, Trace};
use crate::strategy::{MarkerShape, SeriesStyle};
use anyhow::{Context, Result};
use log::info;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};

pub const PERFORMANCE_FILE: &str = "performance.svg";
pub const OFFLOAD_FILE: &str = "offload_proportion.svg";

pub const PERFORMANCE_SIZE: (u32, u32) = (1000, 1800);
pub const OFFLOAD_SIZE: (u32, u32) = (1000, 600);

/// Width of one bar, in task-count clusters
pub const BAR_WIDTH: f64 = 0.15;

/// Pixels between hatch lines
const HATCH_SPACING: f64 = 6.0;

type Root<'a> = DrawingArea<SVGBackend<'a>, Shift>;
type Chart<'a, 'b> = ChartContext<'a, SVGBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Axis ranges and descriptions of a line panel
struct Axes<'a> {
    x: Range<f64>,
    y: Range<f64>,
    x_labels: usize,
    y_labels: usize,
    x_desc: &'a str,
    y_desc: &'a str,
}

/// Render the four-panel figure into `output_dir`
pub fn write_performance_figure<P: AsRef<Path>>(figure: &PerformanceFigure, output_dir: P) -> Result<PathBuf> {
    let path = output_dir.as_ref().join(PERFORMANCE_FILE);
    {
        let root = SVGBackend::new(&path, PERFORMANCE_SIZE).into_drawing_area();
        draw_performance_figure(&root, figure)?;
        root.present()
            .with_context(|| format!("Failed to write figure: {}", path.display()))?;
    }
    info!("Wrote performance figure to {}", path.display());
    Ok(path)
}

/// Render the offload-proportion figure into `output_dir`
pub fn write_offload_figure<P: AsRef<Path>>(figure: &OffloadFigure, output_dir: P) -> Result<PathBuf> {
    let path = output_dir.as_ref().join(OFFLOAD_FILE);
    {
        let root = SVGBackend::new(&path, OFFLOAD_SIZE).into_drawing_area();
        draw_offload_figure(&root, figure)?;
        root.present()
            .with_context(|| format!("Failed to write figure: {}", path.display()))?;
    }
    info!("Wrote offload-proportion figure to {}", path.display());
    Ok(path)
}

pub fn draw_performance_figure(root: &Root<'_>, figure: &PerformanceFigure) -> Result<()> {
    root.fill(&WHITE)?;
    let panels = root.split_evenly((4, 1));

    // Battery (top)
    draw_line_panel(
        &panels[0],
        &figure.battery,
        &Axes {
            x: 0.0..1000.0,
            y: 0.0..100.0,
            x_labels: 11,
            y_labels: 11,
            x_desc: "Total Tasks Offload",
            y_desc: "Average UAV Battery (%)",
        },
    )?;

    // Availability
    let max_available = figure
        .availability
        .iter()
        .map(Trace::max_y)
        .fold(0.0_f64, f64::max)
        .max(1.0)
        * 1.1;
    draw_line_panel(
        &panels[1],
        &figure.availability,
        &Axes {
            x: 500.0..1000.0,
            y: 0.0..max_available,
            x_labels: 6,
            y_labels: 10,
            x_desc: "Total Tasks Offload",
            y_desc: "Number of Available UAV",
        },
    )?;

    // Offload time bars
    draw_bar_panel(&panels[2], &figure.offload_time)?;

    // Latency (bottom)
    draw_line_panel(
        &panels[3],
        &figure.latency,
        &Axes {
            x: 0.0..45.0,
            y: latency_y_range(&figure.latency),
            x_labels: 10,
            y_labels: 7,
            x_desc: "Number of Peers",
            y_desc: "Latency (S)",
        },
    )?;

    Ok(())
}

pub fn draw_offload_figure(root: &Root<'_>, figure: &OffloadFigure) -> Result<()> {
    root.fill(&WHITE)?;
    draw_line_panel(
        root,
        &figure.proportion,
        &Axes {
            x: 100.0..1000.0,
            y: 0.0..100.0,
            x_labels: 10,
            y_labels: 11,
            x_desc: "Total Tasks Offloaded",
            y_desc: "Proportion of task offload on the UAV (%)",
        },
    )
}

fn draw_line_panel(area: &Root<'_>, traces: &[Trace], axes: &Axes<'_>) -> Result<()> {
    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(axes.x.clone(), axes.y.clone())?;

    chart.configure_mesh()
        .x_labels(axes.x_labels)
        .y_labels(axes.y_labels)
        .x_desc(axes.x_desc)
        .y_desc(axes.y_desc)
        .draw()?;

    for trace in traces {
        let color = trace.style.color;
        chart.draw_series(LineSeries::new(
            clip(&trace.points, &axes.x, &axes.y),
            color.stroke_width(2),
        ))?
        .label(trace.label.as_str())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

        let markers = clip(&trace.marker_points(), &axes.x, &axes.y);
        draw_markers(&mut chart, &markers, trace.style)?;
    }

    if !traces.is_empty() {
        chart.configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .position(SeriesLabelPosition::UpperRight)
            .draw()?;
    }

    Ok(())
}

fn draw_markers(chart: &mut Chart<'_, '_>, points: &[(f64, f64)], style: SeriesStyle) -> Result<()> {
    let color = style.color;
    match style.marker {
        MarkerShape::Circle => {
            chart.draw_series(points.iter().map(|&p| Circle::new(p, 4, color.filled())))?;
        }
        MarkerShape::Triangle => {
            chart.draw_series(points.iter().map(|&p| TriangleMarker::new(p, 5, color.filled())))?;
        }
        MarkerShape::Square => {
            chart.draw_series(points.iter().map(|&p| {
                EmptyElement::at(p) + Rectangle::new([(-4, -4), (4, 4)], color.filled())
            }))?;
        }
        MarkerShape::Diamond => {
            chart.draw_series(points.iter().map(|&p| {
                EmptyElement::at(p) + Polygon::new(vec![(0, -5), (5, 0), (0, 5), (-5, 0)], color.filled())
            }))?;
        }
        MarkerShape::Cross => {
            chart.draw_series(points.iter().map(|&p| Cross::new(p, 4, color.stroke_width(2))))?;
        }
    }
    Ok(())
}

/// At least 0-30 s, widened to fit the slowest measurement
fn latency_y_range(traces: &[Trace]) -> Range<f64> {
    let max_y = traces.iter().map(Trace::max_y).fold(30.0_f64, f64::max);
    0.0..max_y * 1.05
}

/// Drop points outside the x range and pin the rest inside the y range
fn clip(points: &[(f64, f64)], x: &Range<f64>, y: &Range<f64>) -> Vec<(f64, f64)> {
    points
        .iter()
        .filter(|p| p.0 >= x.start && p.0 <= x.end)
        .map(|&(px, py)| (px, py.clamp(y.start, y.end)))
        .collect()
}

/// Center of bar `index` out of `count` in cluster `cluster`
pub fn bar_center(cluster: usize, index: usize, count: usize) -> f64 {
    cluster as f64 + (index as f64 - (count as f64 - 1.0) / 2.0) * BAR_WIDTH
}

fn draw_bar_panel(area: &Root<'_>, groups: &[BarGroup]) -> Result<()> {
    let clusters = TASK_COUNTS.len();
    let x_range = -0.5..(clusters as f64 - 0.5);
    let y_range = 0.0..250.0;

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.clone(), y_range.clone())?;

    chart.configure_mesh()
        .x_labels(clusters + 1)
        .y_labels(6)
        .x_label_formatter(&|x| task_label(*x))
        .x_desc("Tasks Offload Executed")
        .y_desc("Time Delay (S)")
        .draw()?;

    let (w, h) = chart.plotting_area().dim_in_pixel();
    let scale = (
        w as f64 / (x_range.end - x_range.start),
        h as f64 / (y_range.end - y_range.start),
    );

    for (index, group) in groups.iter().enumerate() {
        let color = group.style.color;
        let rects: Vec<((f64, f64), (f64, f64))> = group
            .bars
            .iter()
            .enumerate()
            .map(|(cluster, bar)| {
                let center = bar_center(cluster, index, groups.len());
                let top = bar.seconds.min(y_range.end);
                ((center - BAR_WIDTH / 2.0, 0.0), (center + BAR_WIDTH / 2.0, top))
            })
            .collect();

        chart.draw_series(rects.iter().map(|&(a, b)| Rectangle::new([a, b], color.filled())))?
            .label(group.strategy.name())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));

        let hatch_lines: Vec<hatch::Segment> = rects
            .iter()
            .flat_map(|&(a, b)| hatch::segments(group.style.hatch, a, b, scale, HATCH_SPACING))
            .collect();
        chart.draw_series(
            hatch_lines
                .iter()
                .map(|s| PathElement::new(s.to_vec(), BLACK.mix(0.6).stroke_width(1))),
        )?;

        chart.draw_series(rects.iter().map(|&(a, b)| Rectangle::new([a, b], BLACK.stroke_width(1))))?;

        chart.draw_series(group.bars.iter().enumerate().map(|(cluster, bar)| {
            ErrorBar::new_vertical(
                bar_center(cluster, index, groups.len()),
                (bar.seconds - bar.error).max(y_range.start),
                bar.seconds,
                (bar.seconds + bar.error).min(y_range.end),
                BLACK.stroke_width(1),
                10,
            )
        }))?;
    }

    chart.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    Ok(())
}

/// Axis label for a cluster position; blank between clusters
fn task_label(x: f64) -> String {
    let rounded = x.round();
    if (x - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    TASK_COUNTS
        .get(rounded as usize)
        .map(|t| t.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{self, StrategyRun};
    use crate::results::ResultTable;
    use std::fs;
    use tempfile::TempDir;

    fn run(label: &str) -> StrategyRun {
        let headers = ["Total Tasks", "UAV Battery Avg", "UAV Available", "TotalTaskUAV (%)", "TotalTaskEC (%)"];
        let rows = (0..120)
            .map(|i| {
                let tasks = i as f64 * 10.0;
                vec![tasks, 100.0 - i as f64 * 0.8, 12.0 - i as f64 * 0.1, 30.0 + i as f64 * 0.2, 70.0 - i as f64 * 0.2]
            })
            .collect();
        StrategyRun {
            label: label.to_string(),
            strategy: crate::strategy::Strategy::from_label(label),
            table: ResultTable {
                path: PathBuf::from(format!("graphe_result_{label}.csv")),
                headers: headers.iter().map(|h| h.to_string()).collect(),
                rows,
            },
        }
    }

    fn render_performance(runs: &[StrategyRun]) -> String {
        let figure = report::build_performance_figure(runs).unwrap();
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, PERFORMANCE_SIZE).into_drawing_area();
            draw_performance_figure(&root, &figure).unwrap();
            root.present().unwrap();
        }
        svg
    }

    #[test]
    fn test_performance_svg_has_labels_and_colors() {
        let svg = render_performance(&[run("Random"), run("RoundRobin")]);
        let lower = svg.to_lowercase();
        assert!(svg.contains("RoundRobin"));
        assert!(svg.contains("Random"));
        assert!(svg.contains("Transaction Time"));
        assert!(svg.contains("Consensus Time"));
        assert!(svg.contains("Average UAV Battery (%)"));
        // darkviolet, orange
        assert!(lower.contains("#9400d3"));
        assert!(lower.contains("#ffa500"));
    }

    #[test]
    fn test_unknown_strategy_renders_in_black() {
        let runs = [run("Foo")];
        let figure = report::build_performance_figure(&runs).unwrap();
        for trace in [&figure.battery[0], &figure.availability[0]] {
            assert_eq!(trace.style, crate::strategy::FALLBACK_STYLE);
            assert_eq!(trace.style.color, crate::strategy::BLACK);
            assert_eq!(trace.style.marker, MarkerShape::Circle);
        }

        let svg = render_performance(&runs);
        assert!(svg.contains("Foo"));
    }

    #[test]
    fn test_latency_panel_keeps_slowest_transaction() {
        let figure = report::build_performance_figure(&[]).unwrap();
        let y = latency_y_range(&figure.latency);
        assert!(y.end >= 30.35);

        let drawn = clip(&figure.latency[0].points, &(0.0..45.0), &y);
        assert_eq!(drawn.last(), Some(&(40.0, 30.35)));
        assert_eq!(drawn.len(), 5);
    }

    #[test]
    fn test_offload_svg() {
        let runs = [run("Cobra")];
        let figure = report::build_offload_figure(&runs, "TotalTaskUAV (%)").unwrap();
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, OFFLOAD_SIZE).into_drawing_area();
            draw_offload_figure(&root, &figure).unwrap();
            root.present().unwrap();
        }
        assert!(svg.contains("Cobra"));
        assert!(svg.to_lowercase().contains("#4169e1"));
    }

    #[test]
    fn test_write_figures_to_disk() {
        let dir = TempDir::new().unwrap();
        let runs = [run("ECP")];
        let perf = write_performance_figure(&report::build_performance_figure(&runs).unwrap(), dir.path()).unwrap();
        let offload =
            write_offload_figure(&report::build_offload_figure(&runs, "TotalTaskUAV (%)").unwrap(), dir.path()).unwrap();
        assert!(fs::read_to_string(perf).unwrap().contains("<svg"));
        assert!(fs::metadata(offload).unwrap().len() > 0);
    }

    #[test]
    fn test_bar_centers_straddle_cluster() {
        let n = 5;
        assert!((bar_center(3, 2, n) - 3.0).abs() < 1e-12);
        assert!((bar_center(0, 0, n) + 2.0 * BAR_WIDTH).abs() < 1e-12);
        assert!((bar_center(0, 4, n) - 2.0 * BAR_WIDTH).abs() < 1e-12);
    }

    #[test]
    fn test_task_labels() {
        assert_eq!(task_label(0.0), "10");
        assert_eq!(task_label(7.0), "80");
        assert_eq!(task_label(0.5), "");
        assert_eq!(task_label(8.0), "");
        assert_eq!(task_label(-0.5), "");
    }

    #[test]
    fn test_clip() {
        let points = [(400.0, 3.0), (500.0, -1.0), (750.0, 20.0), (1100.0, 2.0)];
        assert_eq!(clip(&points, &(500.0..1000.0), &(0.0..10.0)), vec![(500.0, 0.0), (750.0, 10.0)]);
    }
}
