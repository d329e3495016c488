//! CSV summaries of runs and comparisons.

use std::{io::Write, path::Path};

use eyre::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::{align::Comparison, summary::RunSummary};

const RUN_HEADER: [&str; 4] = ["file", "bandwidth_MiB_s", "iops", "avg_cpu_percent"];
const COMPARISON_HEADER: [&str; 5] = ["file", "run", "bandwidth_MiB_s", "iops", "avg_cpu_percent"];

fn write_rows<W: Write, R: Serialize>(writer: W, header: &[&str], rows: &[R]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_run_summary<W: Write>(writer: W, summary: &RunSummary) -> Result<()> {
    write_rows(writer, &RUN_HEADER, &summary.rows())
}

pub fn write_comparison<W: Write>(writer: W, comparison: &Comparison<'_>) -> Result<()> {
    write_rows(writer, &COMPARISON_HEADER, &comparison.rows())
}

pub fn save_run_summary(path: &Path, summary: &RunSummary) -> Result<()> {
    let file = std::fs::File::create(path).context(format!("Create {path:?}"))?;
    write_run_summary(file, summary)?;
    info!("Wrote {path:?}");
    Ok(())
}

pub fn save_comparison(path: &Path, comparison: &Comparison<'_>) -> Result<()> {
    let file = std::fs::File::create(path).context(format!("Create {path:?}"))?;
    write_comparison(file, comparison)?;
    info!("Wrote {path:?}");
    Ok(())
}
