//! Results recorded by hand from the blockchain experiments.

use crate::strategy::Strategy;
use serde::Serialize;

/// Task counts the offload-time table was measured at
pub const TASK_COUNTS: [u32; 8] = [10, 20, 30, 40, 50, 60, 70, 80];

/// Seconds needed to offload `TASK_COUNTS[i]` tasks
pub fn offload_times(strategy: Strategy) -> &'static [f64; 8] {
    match strategy {
        Strategy::RoundRobin => &[26.84, 52.36, 79.03, 105.80, 137.26, 160.05, 178.01, 206.87],
        Strategy::Random => &[26.14, 52.62, 80.85, 104.24, 135.39, 159.48, 177.86, 205.09],
        Strategy::Ecp => &[27.35, 56.58, 84.12, 110.40, 141.04, 170.49, 193.82, 221.74],
        Strategy::EnergyAware => &[28.29, 59.02, 88.95, 116.62, 144.53, 172.11, 194.6, 223.463],
        Strategy::Cobra => &[28.78, 57.46, 87.03, 109.46, 141.92, 165.07, 188.27, 215.22],
    }
}

/// Half-height of the error bar drawn on an offload-time bar
pub fn error_bar(value: f64, confidence_percent: f64) -> f64 {
    value * (100.0 - confidence_percent) / 100.0
}

/// One bar of the offload-time chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OffloadBar {
    pub tasks: u32,
    pub seconds: f64,
    pub error: f64,
}

/// Bars for one strategy, in `TASK_COUNTS` order
pub fn offload_bars(strategy: Strategy) -> Vec<OffloadBar> {
    let confidence = strategy.confidence_percent();
    TASK_COUNTS
        .iter()
        .zip(offload_times(strategy))
        .map(|(&tasks, &seconds)| OffloadBar {
            tasks,
            seconds,
            error: error_bar(seconds, confidence),
        })
        .collect()
}

/// Peer counts of the blockchain network the latency was measured with
pub const PEER_COUNTS: [u32; 5] = [5, 10, 20, 30, 40];
/// Transaction latency in seconds, per `PEER_COUNTS`
pub const TRANSACTION_TIMES: [f64; 5] = [2.87, 5.94, 12.32, 21.24, 30.35];
/// Consensus latency in seconds, per `PEER_COUNTS`
pub const CONSENSUS_TIMES: [f64; 5] = [0.7, 1.89, 4.12, 6.90, 9.24];
