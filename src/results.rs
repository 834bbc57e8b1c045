//! Result tables written by the offload simulation (`graphe_result_<strategy>.csv`).

use crate::error::ReportError;
use csv::{ReaderBuilder, Trim};
use log::debug;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const FILE_PREFIX: &str = "graphe_result_";
pub const FILE_EXTENSION: &str = "csv";

pub const TOTAL_TASKS: &str = "Total Tasks";
pub const UAV_BATTERY_AVG: &str = "UAV Battery Avg";
pub const UAV_AVAILABLE: &str = "UAV Available";

/// Width of a bucket in the offload-proportion chart, in tasks
pub const BUCKET_TASKS: f64 = 50.0;

/// Battery readings at or below this level are plotted as empty
const BATTERY_FLOOR: f64 = 5.0;

/// Find result files in `dir`, sorted by file name
pub fn discover<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>, ReportError> {
    let dir = dir.as_ref();
    let io_err = |source| ReportError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let is_csv = path.extension().and_then(|e| e.to_str()) == Some(FILE_EXTENSION);
        if name.starts_with(FILE_PREFIX) && is_csv {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Series label encoded in a result file name.
///
/// Takes the text between the last `_` and the following `.`, then drops the
/// simulation's `TaskOffload` function prefix: `graphe_result_TaskOffloadCobra.csv`
/// gives `Cobra`.
pub fn strategy_label<P: AsRef<Path>>(path: P) -> String {
    let name = path
        .as_ref()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let token = name.rsplit('_').next().unwrap_or_default();
    let token = token.split('.').next().unwrap_or_default();
    token.replace("TaskOffload", "")
}

/// A numeric table with named columns
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl ResultTable {
    /// Load a CSV file whose fields are all finite numbers
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ReportError> {
        let path = path.as_ref().to_path_buf();
        let csv_err = |source| ReportError::Csv {
            path: path.clone(),
            source,
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .flexible(true)
            .from_path(&path)
            .map_err(csv_err)?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(csv_err)?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_err)?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            if record.len() != headers.len() {
                return Err(ReportError::RaggedRow {
                    path: path.clone(),
                    line,
                    expected: headers.len(),
                    found: record.len(),
                });
            }

            let row = record
                .iter()
                .zip(&headers)
                .map(|(field, column)| {
                    field
                        .parse::<f64>()
                        .ok()
                        .filter(|v| v.is_finite())
                        .ok_or_else(|| ReportError::InvalidNumber {
                            path: path.clone(),
                            line,
                            column: column.clone(),
                            value: field.to_string(),
                        })
                })
                .collect::<Result<Vec<f64>, _>>()?;
            rows.push(row);
        }

        debug!("Loaded {} rows x {} columns from {}", rows.len(), headers.len(), path.display());
        Ok(Self { path, headers, rows })
    }

    pub fn column_index(&self, name: &str) -> Result<usize, ReportError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ReportError::MissingColumn {
                path: self.path.clone(),
                column: name.to_string(),
            })
    }

    pub fn column(&self, name: &str) -> Result<Vec<f64>, ReportError> {
        let idx = self.column_index(name)?;
        Ok(self.column_at(idx))
    }

    pub fn column_at(&self, idx: usize) -> Vec<f64> {
        self.rows.iter().map(|r| r[idx]).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Apply `f` to every value of the named column
    pub fn map_column<F: Fn(f64) -> f64>(&mut self, name: &str, f: F) -> Result<(), ReportError> {
        let idx = self.column_index(name)?;
        for row in &mut self.rows {
            row[idx] = f(row[idx]);
        }
        Ok(())
    }

    /// Zero out near-empty battery readings and floor availability at zero
    pub fn clamp_uav_columns(&mut self) -> Result<(), ReportError> {
        self.map_column(UAV_BATTERY_AVG, clamp_battery)?;
        self.map_column(UAV_AVAILABLE, clamp_available)
    }

    /// Group rows by `floor(Total Tasks / 50)` and average every column per group.
    ///
    /// Groups come out in ascending bucket order.
    pub fn bucket_means(&self) -> Result<ResultTable, ReportError> {
        let tasks_idx = self.column_index(TOTAL_TASKS)?;

        let mut buckets: BTreeMap<i64, (Vec<f64>, usize)> = BTreeMap::new();
        for row in &self.rows {
            let key = bucket_of(row[tasks_idx]);
            let (sums, count) = buckets
                .entry(key)
                .or_insert_with(|| (vec![0.0; self.headers.len()], 0));
            for (sum, value) in sums.iter_mut().zip(row) {
                *sum += value;
            }
            *count += 1;
        }

        let rows = buckets
            .into_values()
            .map(|(sums, count)| sums.into_iter().map(|s| s / count as f64).collect())
            .collect::<Vec<Vec<f64>>>();

        debug!("{}: {} rows grouped into {} buckets", self.path.display(), self.len(), rows.len());
        Ok(ResultTable {
            path: self.path.clone(),
            headers: self.headers.clone(),
            rows,
        })
    }

    /// Index of the offload-proportion column.
    ///
    /// Prefers `name`; without it, falls back to the second-to-last column, which
    /// is where the simulation writes `TotalTaskUAV (%)`. Returns whether the
    /// fallback was taken.
    pub fn proportion_column(&self, name: &str) -> Result<(usize, bool), ReportError> {
        if let Ok(idx) = self.column_index(name) {
            return Ok((idx, false));
        }
        if self.headers.len() < 2 {
            return Err(ReportError::TooFewColumns {
                path: self.path.clone(),
                found: self.headers.len(),
            });
        }
        Ok((self.headers.len() - 2, true))
    }
}

pub fn clamp_battery(value: f64) -> f64 {
    if value <= BATTERY_FLOOR {
        0.0
    } else {
        value
    }
}

pub fn clamp_available(value: f64) -> f64 {
    value.max(0.0)
}

pub fn bucket_of(total_tasks: f64) -> i64 {
    (total_tasks / BUCKET_TASKS).floor() as i64
}
