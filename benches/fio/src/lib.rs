use std::path::Path;

use common::{
    KIB_PER_MIB,
    metric::{Case, MetricTriple, Record},
    summary::RunSummary,
    util::{file_stem, files_with_extension, read_json_file},
};
use eyre::Result;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::result::{FioResult, IoStats, Job};


/// First non-zero value of `field` across the write then the read phase.
fn write_then_read(job: Option<&Job>, field: fn(&IoStats) -> Option<f64>) -> f64 {
    let Some(job) = job else {
        return 0.0;
    };
    [job.write.as_ref(), job.read.as_ref()]
        .into_iter()
        .flatten()
        .filter_map(field)
        .find(|value| *value != 0.0)
        .unwrap_or(0.0)
}

impl Record for FioResult {
    /// Only the first job is considered. Bandwidth prefers the write phase and is converted
    /// from KiB/s to MiB/s, IOPS follows the same preference, CPU is user plus system time.
    fn metrics(&self) -> MetricTriple {
        let job = self.jobs.first();
        let bandwidth = write_then_read(job, |stats| stats.bw) / KIB_PER_MIB;
        let iops = write_then_read(job, |stats| stats.iops);
        let usr_cpu = job.and_then(|j| j.usr_cpu).or(self.usr_cpu).unwrap_or(0.0);
        let sys_cpu = job.and_then(|j| j.sys_cpu).or(self.sys_cpu).unwrap_or(0.0);
        MetricTriple::new(bandwidth, iops, usr_cpu + sys_cpu)
    }
}

/// Normalizes one fio report
pub fn normalize(record: &FioResult) -> MetricTriple {
    record.metrics()
}

/// Reads every `*.json` report directly inside `dir`, keyed by file stem.
///
/// Reports that cannot be read or parsed are skipped with a warning so a single broken file
/// does not take the whole run down.
pub async fn load_records(dir: &Path) -> Result<Vec<(Case, FioResult)>> {
    let files = files_with_extension(dir, "json").await?;
    if files.is_empty() {
        debug!("No json files found in {dir:?}");
        return Ok(Vec::new());
    }

    let parsed = join_all(files.iter().map(|file| async move {
        (file, read_json_file::<FioResult>(file).await)
    }))
    .await;

    let mut records = Vec::with_capacity(parsed.len());
    for (file, result) in parsed {
        match (result, file_stem(file)) {
            (Ok(record), Ok(case)) => records.push((case, record)),
            (Err(err), _) | (_, Err(err)) => warn!("Skipping {file:?}: {err:#}"),
        }
    }
    Ok(records)
}

/// Loads and summarizes one run directory
pub async fn summarize_run(run: &str, dir: &Path) -> Result<RunSummary> {
    debug!("Processing {dir:?}");
    let records = load_records(dir).await?;
    Ok(RunSummary::new(run, records))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse(value: serde_json::Value) -> FioResult {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn write_phase_is_preferred() {
        let record = parse(json!({
            "jobs": [{
                "write": {"bw": 2048, "iops": 500.0},
                "read": {"bw": 4096, "iops": 900.0},
                "usr_cpu": 10.0,
                "sys_cpu": 5.0
            }]
        }));
        assert_eq!(normalize(&record), MetricTriple::new(2.0, 500.0, 15.0));
    }

    #[test]
    fn read_phase_used_without_write() {
        let record = parse(json!({"jobs": [{"read": {"bw": 3072, "iops": 42.5}}]}));
        let m = normalize(&record);
        assert_eq!(m.bandwidth, 3.0);
        assert_eq!(m.throughput, 42.5);
        assert_eq!(m.cpu_percent, 0.0);
    }

    #[test]
    fn zero_write_falls_back_to_read() {
        let record = parse(json!({
            "jobs": [{"write": {"bw": 0, "iops": 0}, "read": {"bw": 1024, "iops": 7}}]
        }));
        assert_eq!(normalize(&record), MetricTriple::new(1.0, 7.0, 0.0));
    }

    #[test]
    fn missing_everything_is_zero() {
        assert_eq!(normalize(&parse(json!({}))), MetricTriple::default());
        assert_eq!(normalize(&parse(json!({"jobs": []}))), MetricTriple::default());
        assert_eq!(
            normalize(&parse(json!({"jobs": [{"write": {}, "read": {}}]}))),
            MetricTriple::default()
        );
    }

    #[test]
    fn only_first_job_counts() {
        let record = parse(json!({
            "jobs": [
                {"read": {"bw": 1024}},
                {"write": {"bw": 8192}}
            ]
        }));
        assert_eq!(normalize(&record).bandwidth, 1.0);
    }

    #[test]
    fn top_level_cpu_used_when_job_lacks_it() {
        let record = parse(json!({
            "jobs": [{"write": {"bw": 1024}, "usr_cpu": 1.5}],
            "usr_cpu": 99.0,
            "sys_cpu": 2.0
        }));
        assert_eq!(normalize(&record).cpu_percent, 3.5);
    }

    #[test]
    fn full_report_parses() {
        let record = parse(json!({
            "fio version": "fio-3.36",
            "timestamp": 1700000000,
            "time": "Tue Nov 14 22:13:20 2023",
            "jobs": [{
                "jobname": "seqwrite",
                "groupid": 0,
                "error": 0,
                "job options": {"name": "seqwrite", "rw": "write", "bs": "128k"},
                "read": {"io_bytes": 0, "bw": 0, "iops": 0.0, "lat_ns": {"min": 0, "max": 0, "mean": 0.0, "stddev": 0.0, "N": 0}},
                "write": {"io_bytes": 1073741824, "bw": 524288, "iops": 4096.0, "bw_mean": 524000.5},
                "job_runtime": 2000,
                "usr_cpu": 3.25,
                "sys_cpu": 12.5,
                "ctx": 8000,
                "latency_ns": {"2": 0.0}
            }],
            "disk_util": [{"name": "nvme0n1", "read_ios": 0, "write_ios": 8192, "util": 97.1}]
        }));
        assert_eq!(
            record.jobs[0].job_options.as_ref().unwrap().bs.as_deref(),
            Some("128k")
        );
        assert_eq!(normalize(&record), MetricTriple::new(512.0, 4096.0, 15.75));
    }
}
