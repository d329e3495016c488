use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use common::{
    align::Comparison,
    config::{Config, DEFAULT_CONFIG},
    export::{save_comparison, save_run_summary, write_comparison},
    plot::{PlotData, plot},
    summary::RunSummary,
    util::{discover_runs, ensure_dirs},
};
use eyre::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

pub async fn load_config(root: &Path, config_file: Option<&Path>) -> Result<Config> {
    let path = match config_file {
        Some(path) => path.to_path_buf(),
        None => root.join(DEFAULT_CONFIG),
    };
    Config::load(&path)
        .await
        .context(format!("Load config {path:?}"))
}

fn progress_bar(len: usize, no_progress: bool) -> Result<ProgressBar> {
    if no_progress {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new(len as u64);
    bar.set_style(ProgressStyle::with_template(
        "{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}",
    )?);
    Ok(bar)
}

/// Summarizes every run under `root`, one after the other.
async fn load_runs(
    root: &Path,
    config: &Config,
    no_progress: bool,
) -> Result<BTreeMap<String, (PathBuf, RunSummary)>> {
    let pattern = config.settings.run_regex()?;
    let dirs = discover_runs(root, &pattern).await?;
    let bar = progress_bar(dirs.len(), no_progress)?;

    let mut runs = BTreeMap::new();
    for (name, dir) in dirs {
        bar.set_message(name.clone());
        let summary = fio::summarize_run(&name, &dir)
            .await
            .context(format!("Summarize run {name}"))?;
        debug!("Run {name} has {} cases", summary.len());
        runs.insert(name, (dir, summary));
        bar.inc(1);
    }
    bar.finish_and_clear();
    Ok(runs)
}

fn summaries(runs: BTreeMap<String, (PathBuf, RunSummary)>) -> BTreeMap<String, RunSummary> {
    runs.into_iter()
        .map(|(name, (_, summary))| (name, summary))
        .collect()
}

pub async fn run_report(
    root: &Path,
    config: &Config,
    no_progress: bool,
    skip_plot: bool,
) -> Result<()> {
    let plots = match &config.plots {
        Some(plots) => plots.clone(),
        None => default_plots::default_plots(),
    };
    let settings = &config.settings;
    let runs = load_runs(root, config, no_progress).await?;

    for (name, (dir, summary)) in &runs {
        if summary.is_empty() {
            info!("No json files found in {dir:?}");
            continue;
        }
        let output_dir = dir.join(&settings.output_dir);
        ensure_dirs(&[output_dir.clone()]).await?;
        save_run_summary(&output_dir.join("summary.csv"), summary)?;
        if !skip_plot {
            plot(&plots, &PlotData::Individual(summary), &output_dir, settings)
                .await
                .context(format!("Plot run {name}"))?;
        }
    }

    let runs = summaries(runs);
    let Some(comparison) = Comparison::align(&runs) else {
        info!("No runs found");
        return Ok(());
    };

    let output_dir = root.join(&settings.output_dir);
    ensure_dirs(&[output_dir.clone()]).await?;
    save_comparison(&output_dir.join("summary.csv"), &comparison)?;
    if !skip_plot {
        plot(&plots, &PlotData::Total(&comparison), &output_dir, settings)
            .await
            .context("Plot comparison")?;
    }
    Ok(())
}

pub async fn list_runs(root: &Path, config: &Config) -> Result<()> {
    for (name, (dir, summary)) in load_runs(root, config, true).await? {
        println!("{name} -> {} cases ({})", summary.len(), dir.display());
    }
    Ok(())
}

pub async fn print_summary(root: &Path, config: &Config) -> Result<()> {
    let runs = summaries(load_runs(root, config, true).await?);
    match Comparison::align(&runs) {
        Some(comparison) => write_comparison(std::io::stdout().lock(), &comparison),
        None => {
            println!("No runs found in {}", root.display());
            Ok(())
        }
    }
}
