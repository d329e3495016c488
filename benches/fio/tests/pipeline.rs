use std::collections::BTreeMap;

use common::{
    align::Comparison,
    export::{save_comparison, save_run_summary},
    metric::Metric,
    util::discover_runs,
};
use fio::{normalize, result::FioResult, summarize_run};
use proptest::prelude::*;
use regex::Regex;
use serde_json::json;
use tokio::fs::{create_dir, read_to_string, write};

async fn write_report(dir: &std::path::Path, case: &str, bw: u64, iops: f64) {
    let report = json!({"jobs": [{"write": {"bw": bw, "iops": iops}, "usr_cpu": 1.0, "sys_cpu": 1.0}]});
    write(dir.join(format!("{case}.json")), report.to_string())
        .await
        .unwrap();
}

#[tokio::test]
async fn runs_are_aligned_end_to_end() {
    let root = tempfile::tempdir().unwrap();
    let a = root.path().join("A_results");
    let b = root.path().join("B_results");
    create_dir(&a).await.unwrap();
    create_dir(&b).await.unwrap();
    create_dir(root.path().join("scratch")).await.unwrap();

    write_report(&a, "x", 10 * 1024, 100.0).await;
    write_report(&a, "y", 30 * 1024, 300.0).await;
    write_report(&b, "y", 20 * 1024, 200.0).await;
    write_report(&b, "z", 5 * 1024, 50.0).await;
    write(b.join("broken.json"), "{ not json").await.unwrap();

    let mut runs = BTreeMap::new();
    for (name, dir) in discover_runs(root.path(), &Regex::new("_results$").unwrap())
        .await
        .unwrap()
    {
        let summary = summarize_run(&name, &dir).await.unwrap();
        runs.insert(name, summary);
    }
    assert_eq!(runs.len(), 2);
    assert_eq!(runs["B_results"].len(), 2);

    let cmp = Comparison::align(&runs).unwrap();
    assert_eq!(cmp.order(), ["z", "x", "y"]);
    let bw = cmp.matrix(Metric::Bandwidth);
    assert_eq!(bw.row(0).unwrap(), [0.0, 10.0, 30.0]);
    assert_eq!(bw.row(1).unwrap(), [5.0, 0.0, 20.0]);

    let out = root.path().join("summary.csv");
    save_comparison(&out, &cmp).unwrap();
    let csv = read_to_string(&out).await.unwrap();
    assert_eq!(
        csv.lines().nth(1).unwrap(),
        "z,B_results,5.0,50.0,2.0"
    );

    let run_out = root.path().join("run.csv");
    save_run_summary(&run_out, &runs["A_results"]).unwrap();
    let csv = read_to_string(&run_out).await.unwrap();
    assert_eq!(csv.lines().count(), 3);
}

#[cfg(unix)]
#[tokio::test]
async fn undecodable_file_name_is_skipped() {
    use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

    let root = tempfile::tempdir().unwrap();
    write_report(root.path(), "good", 2048, 10.0).await;
    let bad = root.path().join(OsStr::from_bytes(b"bad\xff.json"));
    write(&bad, json!({"jobs": []}).to_string()).await.unwrap();

    let summary = summarize_run("mixed_results", root.path()).await.unwrap();
    assert_eq!(summary.len(), 1);
    assert!(summary.contains("good"));
}

#[tokio::test]
async fn run_without_reports_is_empty() {
    let root = tempfile::tempdir().unwrap();
    let summary = summarize_run("empty_results", root.path()).await.unwrap();
    assert!(summary.is_empty());
}

proptest! {
    #[test]
    fn read_only_bandwidth_is_converted(bw in 0u32..u32::MAX) {
        let record: FioResult = serde_json::from_value(json!({"jobs": [{"read": {"bw": bw}}]})).unwrap();
        prop_assert_eq!(normalize(&record).bandwidth, bw as f64 / 1024.0);
    }

    #[test]
    fn no_bandwidth_is_zero(iops in 0.0f64..1e6, usr in 0.0f64..100.0) {
        let record: FioResult = serde_json::from_value(
            json!({"jobs": [{"write": {"iops": iops}, "usr_cpu": usr}]})
        ).unwrap();
        let m = normalize(&record);
        prop_assert_eq!(m.bandwidth, 0.0);
        prop_assert_eq!(m.cpu_percent, usr);
    }
}
