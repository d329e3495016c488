use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::metric::{Case, MetricTriple, Record};

/// Normalized results of one run.
///
/// `entries` is ordered by ascending bandwidth and `lookup` indexes exactly the same cases.
/// Both are built together and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    run: String,
    entries: Vec<(Case, MetricTriple)>,
    lookup: HashMap<Case, MetricTriple>,
}

/// One line of the per-run summary table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow<'a> {
    #[serde(rename = "file")]
    pub case: &'a str,
    #[serde(rename = "bandwidth_MiB_s")]
    pub bandwidth: f64,
    #[serde(rename = "iops")]
    pub throughput: f64,
    #[serde(rename = "avg_cpu_percent")]
    pub cpu_percent: f64,
}

impl RunSummary {
    /// Normalizes every record of a run and orders the cases by bandwidth.
    ///
    /// Ties keep their input order. A case that appears twice keeps its first record.
    pub fn new<R, I>(run: impl Into<String>, records: I) -> Self
    where
        R: Record,
        I: IntoIterator<Item = (Case, R)>,
    {
        let run = run.into();
        let mut lookup = HashMap::new();
        let mut entries = Vec::new();
        for (case, record) in records {
            if lookup.contains_key(&case) {
                warn!("Duplicate case {case} in run {run}, keeping the first record");
                continue;
            }
            let metrics = record.metrics();
            lookup.insert(case.clone(), metrics);
            entries.push((case, metrics));
        }
        entries.sort_by(|a, b| a.1.bandwidth.total_cmp(&b.1.bandwidth));
        debug!(
            "Sorted entries for {run}: {:?}",
            entries.iter().map(|(case, _)| case).collect::<Vec<_>>()
        );

        Self {
            run,
            entries,
            lookup,
        }
    }

    pub fn run(&self) -> &str {
        &self.run
    }

    /// Cases with their metrics, ascending by bandwidth
    pub fn entries(&self) -> &[(Case, MetricTriple)] {
        &self.entries
    }

    pub fn get(&self, case: &str) -> Option<&MetricTriple> {
        self.lookup.get(case)
    }

    pub fn contains(&self, case: &str) -> bool {
        self.lookup.contains_key(case)
    }

    pub fn cases(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(case, _)| case.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tabular view for the per-run summary export
    pub fn rows(&self) -> Vec<SummaryRow<'_>> {
        self.entries
            .iter()
            .map(|(case, m)| SummaryRow {
                case,
                bandwidth: m.bandwidth,
                throughput: m.throughput,
                cpu_percent: m.cpu_percent,
            })
            .collect()
    }
}
