use core::fmt::Debug;
use std::path::{Path, PathBuf};

use dyn_clone::{DynClone, clone_trait_object};
use eyre::Result;
use plotters::prelude::*;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, info};

use crate::{align::Comparison, config::Settings, error::ReportError, summary::RunSummary};

const TITLE_FONT_SIZE: u32 = 28;
const AXIS_LABEL_FONT_SIZE: u32 = 18;
const TICK_LABEL_FONT_SIZE: u32 = 14;
const LEGEND_FONT_SIZE: u32 = 14;
/// Share of a case's slot covered by its bars
const GROUP_WIDTH: f64 = 0.8;

/// What a plot is asked to render
#[derive(Debug, Clone, Copy)]
pub enum PlotData<'a> {
    /// A single run
    Individual(&'a RunSummary),
    /// All runs aligned against each other
    Total(&'a Comparison<'a>),
}

#[typetag::serde(tag = "type")]
#[async_trait::async_trait]
pub trait Plot: Debug + DynClone + Send + Sync {
    /// Plots the data
    ///
    /// Arguments:
    /// * `data` - One run for [`PlotData::Individual`], every run for [`PlotData::Total`]
    /// * `plot_path` - Directory the charts are written to
    /// * `settings` - The settings from the config
    async fn plot(&self, data: &PlotData<'_>, plot_path: &Path, settings: &Settings)
    -> Result<()>;
}
clone_trait_object!(Plot);

/// One bar chart. A single series gives one bar per label, several series give one group of
/// bars per label with a legend.
#[derive(Debug, Clone)]
pub struct BarChartJob {
    pub filepath: PathBuf,
    pub title: String,
    pub y_label: String,
    pub labels: Vec<String>,
    pub series: Vec<(String, Vec<f64>)>,
}

pub fn render_bar_charts(jobs: &[BarChartJob], size: (u32, u32)) -> Result<()> {
    if jobs.is_empty() {
        return Ok(());
    }
    jobs.par_iter()
        .map(|job| plot_bar_chart(job, size))
        .collect::<Result<Vec<_>>>()?;
    Ok(())
}

pub fn plot_bar_chart(job: &BarChartJob, size: (u32, u32)) -> Result<()> {
    draw_bar_chart(job, size).map_err(|err| ReportError::Chart {
        path: job.filepath.clone(),
        reason: format!("{err:#}"),
    })?;
    info!("Saved {:?}", job.filepath);
    Ok(())
}

fn draw_bar_chart(job: &BarChartJob, size: (u32, u32)) -> Result<()> {
    let num_labels = job.labels.len();
    let num_series = job.series.len().max(1);
    let max_value = job
        .series
        .iter()
        .flat_map(|(_, values)| values.iter().copied())
        .fold(0.0, f64::max);
    let y_max = if max_value > 0.0 { max_value * 1.1 } else { 1.0 };
    debug!(
        "Bar chart {:?}: {num_labels} labels, {num_series} series",
        job.filepath
    );

    let root = SVGBackend::new(&job.filepath, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&job.title, ("sans-serif", TITLE_FONT_SIZE))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.5..(num_labels.max(1) as f64 - 0.5), 0.0..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(num_labels.max(1))
        .x_label_formatter(&|x| {
            let idx = x.round();
            if idx >= 0.0 && (x - idx).abs() < 0.3 {
                job.labels.get(idx as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .y_desc(job.y_label.as_str())
        .label_style(("sans-serif", TICK_LABEL_FONT_SIZE))
        .axis_desc_style(("sans-serif", AXIS_LABEL_FONT_SIZE))
        .draw()?;

    let bar_width = GROUP_WIDTH / num_series as f64;
    for (series_idx, (name, values)) in job.series.iter().enumerate() {
        let color = Palette99::pick(series_idx).to_rgba();
        let offset = (series_idx as f64 - (num_series as f64 - 1.0) / 2.0) * bar_width;
        chart.draw_series(values.iter().enumerate().map(|(label_idx, value)| {
            let center = label_idx as f64 + offset;
            Rectangle::new(
                [(center - bar_width / 2.0, 0.0), (center + bar_width / 2.0, *value)],
                color.filled(),
            )
        }))?;

        if job.series.len() > 1 {
            chart
                .draw_series(std::iter::once(Circle::new((0.0, 0.0), 0, color.filled())))?
                .label(name.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], color.filled()));
        }
    }

    if job.series.len() > 1 {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(("sans-serif", LEGEND_FONT_SIZE))
            .draw()?;
    }

    root.present()?;
    Ok(())
}

pub async fn plot(
    plots: &[Box<dyn Plot>],
    data: &PlotData<'_>,
    plot_path: &Path,
    settings: &Settings,
) -> Result<()> {
    if plots.is_empty() {
        debug!("No plots");
        return Ok(());
    }

    for plot in plots {
        plot.plot(data, plot_path, settings).await?;
    }
    Ok(())
}
