use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::{
    metric::{Case, Metric},
    summary::RunSummary,
};

/// Run x case table of one metric.
///
/// Rows follow the run order, columns follow the [`global_case_order`]. A case a run did not
/// record is stored as `0.0`, so absence and a measured zero look the same here; see
/// [`Comparison::present`] to tell them apart.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedMatrix {
    metric: Metric,
    rows: Vec<Vec<f64>>,
}

impl AlignedMatrix {
    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row(&self, run_idx: usize) -> Option<&[f64]> {
        self.rows.get(run_idx).map(Vec::as_slice)
    }

    pub fn cell(&self, run_idx: usize, case_idx: usize) -> Option<f64> {
        self.rows.get(run_idx)?.get(case_idx).copied()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_cols(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }
}

/// One line of the combined export: a case a run actually recorded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow<'a> {
    #[serde(rename = "file")]
    pub case: &'a str,
    pub run: &'a str,
    #[serde(rename = "bandwidth_MiB_s")]
    pub bandwidth: f64,
    #[serde(rename = "iops")]
    pub throughput: f64,
    #[serde(rename = "avg_cpu_percent")]
    pub cpu_percent: f64,
}

/// Highest bandwidth any run recorded for `case`, with absent cases counting as zero.
fn max_bandwidth(runs: &BTreeMap<String, RunSummary>, case: &str) -> f64 {
    runs.values()
        .map(|summary| summary.get(case).map(|m| m.bandwidth).unwrap_or(0.0))
        .fold(0.0, f64::max)
}

/// Every case seen in any run, once, ascending by its maximum bandwidth across runs.
///
/// Bandwidth is the key regardless of the metric being compared, so all matrices share the
/// same columns. Equal keys fall back to the case name.
pub fn global_case_order(runs: &BTreeMap<String, RunSummary>) -> Vec<Case> {
    let mut keyed: HashMap<&str, f64> = HashMap::new();
    for summary in runs.values() {
        for case in summary.cases() {
            keyed
                .entry(case)
                .or_insert_with(|| max_bandwidth(runs, case));
        }
    }

    let mut order: Vec<(&str, f64)> = keyed.into_iter().collect();
    order.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));
    order.into_iter().map(|(case, _)| case.to_owned()).collect()
}

/// Cross-run view of a set of runs: shared case order, one matrix per metric and the flattened
/// export rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison<'a> {
    runs: Vec<(&'a str, &'a RunSummary)>,
    order: Vec<Case>,
    bandwidth: AlignedMatrix,
    throughput: AlignedMatrix,
    cpu: AlignedMatrix,
}

impl<'a> Comparison<'a> {
    /// Aligns all runs. Needs every run fully summarized since the column order depends on all of
    /// them. Runs are labelled by their map key. Returns `None` when there are no runs.
    pub fn align(runs: &'a BTreeMap<String, RunSummary>) -> Option<Self> {
        if runs.is_empty() {
            debug!("No runs to align");
            return None;
        }

        let order = global_case_order(runs);
        let runs = runs
            .iter()
            .map(|(name, summary)| (name.as_str(), summary))
            .collect::<Vec<_>>();
        let matrix = |metric: Metric| AlignedMatrix {
            metric,
            rows: runs
                .iter()
                .map(|(_, summary)| {
                    order
                        .iter()
                        .map(|case| summary.get(case).map(|m| m.get(metric)).unwrap_or(0.0))
                        .collect()
                })
                .collect(),
        };
        let bandwidth = matrix(Metric::Bandwidth);
        let throughput = matrix(Metric::Throughput);
        let cpu = matrix(Metric::Cpu);
        debug!("Aligned {} runs over {} cases", runs.len(), order.len());

        Some(Self {
            runs,
            order,
            bandwidth,
            throughput,
            cpu,
        })
    }

    /// Run ids in row order
    pub fn runs(&self) -> Vec<&'a str> {
        self.runs.iter().map(|(name, _)| *name).collect()
    }

    pub fn order(&self) -> &[Case] {
        &self.order
    }

    pub fn matrix(&self, metric: Metric) -> &AlignedMatrix {
        match metric {
            Metric::Bandwidth => &self.bandwidth,
            Metric::Throughput => &self.throughput,
            Metric::Cpu => &self.cpu,
        }
    }

    /// Run x case mask, `true` where the run recorded the case.
    pub fn present(&self) -> Vec<Vec<bool>> {
        self.runs
            .iter()
            .map(|(_, summary)| self.order.iter().map(|case| summary.contains(case)).collect())
            .collect()
    }

    /// Recorded (case, run) pairs grouped by case in column order, then by run order.
    pub fn rows(&self) -> Vec<ExportRow<'_>> {
        self.order
            .iter()
            .flat_map(|case| {
                self.runs.iter().filter_map(move |(run, summary)| {
                    summary.get(case).map(|m| ExportRow {
                        case,
                        run: *run,
                        bandwidth: m.bandwidth,
                        throughput: m.throughput,
                        cpu_percent: m.cpu_percent,
                    })
                })
            })
            .collect()
    }
}
