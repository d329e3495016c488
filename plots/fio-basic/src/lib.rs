use std::path::Path;

use common::{
    align::Comparison,
    config::Settings,
    metric::Metric,
    plot::{BarChartJob, Plot, PlotData, render_bar_charts},
    summary::RunSummary,
    util::ensure_dirs,
};
use eyre::Result;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

fn all_metrics() -> Vec<Metric> {
    Metric::ALL.to_vec()
}

/// One bar per case for a single run, ascending by bandwidth
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FioBasic {
    #[serde(default = "all_metrics")]
    pub metrics: Vec<Metric>,
}

impl Default for FioBasic {
    fn default() -> Self {
        Self {
            metrics: all_metrics(),
        }
    }
}

/// Grouped bars, one group per case and one bar per run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FioComparison {
    #[serde(default = "all_metrics")]
    pub metrics: Vec<Metric>,
}

impl Default for FioComparison {
    fn default() -> Self {
        Self {
            metrics: all_metrics(),
        }
    }
}

#[async_trait::async_trait]
#[typetag::serde]
impl Plot for FioBasic {
    async fn plot(&self, data: &PlotData<'_>, plot_path: &Path, settings: &Settings) -> Result<()> {
        let PlotData::Individual(summary) = data else {
            return Ok(());
        };
        if summary.is_empty() {
            debug!("Nothing to plot for {}", summary.run());
            return Ok(());
        }

        ensure_dirs(&[plot_path.to_path_buf()]).await?;
        let jobs = self.bar_jobs(summary, plot_path);
        render_bar_charts(&jobs, settings.chart_size)
    }
}

impl FioBasic {
    fn bar_jobs(&self, summary: &RunSummary, plot_path: &Path) -> Vec<BarChartJob> {
        let labels = summary.cases().map(|case| case.to_owned()).collect::<Vec<_>>();
        self.metrics
            .iter()
            .map(|metric| BarChartJob {
                filepath: plot_path.join(format!("{}.svg", metric.filename())),
                title: format!("{} for {}", metric.title(), summary.run()),
                y_label: metric.label().to_owned(),
                labels: labels.clone(),
                series: vec![(
                    summary.run().to_owned(),
                    summary.entries().iter().map(|(_, m)| m.get(*metric)).collect(),
                )],
            })
            .collect()
    }
}

#[async_trait::async_trait]
#[typetag::serde]
impl Plot for FioComparison {
    async fn plot(&self, data: &PlotData<'_>, plot_path: &Path, settings: &Settings) -> Result<()> {
        let PlotData::Total(comparison) = data else {
            return Ok(());
        };

        ensure_dirs(&[plot_path.to_path_buf()]).await?;
        let jobs = self.bar_jobs(comparison, plot_path);
        debug!(
            "Comparing runs [{}] over cases [{}]",
            comparison.runs().iter().join(", "),
            comparison.order().iter().join(", ")
        );
        render_bar_charts(&jobs, settings.chart_size)
    }
}

impl FioComparison {
    fn bar_jobs(&self, comparison: &Comparison<'_>, plot_path: &Path) -> Vec<BarChartJob> {
        let runs = comparison.runs();
        self.metrics
            .iter()
            .map(|metric| {
                let matrix = comparison.matrix(*metric);
                BarChartJob {
                    filepath: plot_path.join(format!("{}.svg", metric.filename())),
                    title: format!("{} comparison", metric.title()),
                    y_label: metric.label().to_owned(),
                    labels: comparison.order().to_vec(),
                    series: runs
                        .iter()
                        .zip(matrix.rows())
                        .map(|(run, row)| (run.to_string(), row.clone()))
                        .collect(),
                }
            })
            .collect()
    }
}
