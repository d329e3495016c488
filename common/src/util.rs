use std::path::{Path, PathBuf};

use eyre::{Context, ContextCompat, Result};
use futures::future::join_all;
use regex::Regex;
use serde::de::DeserializeOwned;
use tokio::fs::{create_dir_all, read_dir, read_to_string};
use tracing::debug;

use crate::error::ReportError;

pub async fn read_json_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let data = read_to_string(path)
        .await
        .context(format!("Read {path:?}"))?;
    serde_json::from_str(&data).context(format!("Parse {path:?}"))
}

pub async fn ensure_dirs(dirs: &[PathBuf]) -> Result<()> {
    let create_jobs = dirs.iter().map(create_dir_all);
    for res in join_all(create_jobs).await {
        res?;
    }
    Ok(())
}

/// File name without its extension, used as a case identifier
pub fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_owned())
        .context(format!("Invalid file name {path:?}"))
}

/// Directories directly under `root` whose name matches `pattern`, sorted by name.
pub async fn discover_runs(root: &Path, pattern: &Regex) -> Result<Vec<(String, PathBuf)>> {
    if !root.is_dir() {
        return Err(ReportError::MissingRoot(root.to_path_buf()).into());
    }

    let mut items = read_dir(root).await?;
    let mut runs = Vec::new();
    while let Some(entry) = items.next_entry().await? {
        if !entry.file_type().await?.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(|s| s.to_owned()) else {
            continue;
        };
        if pattern.is_match(&name) {
            runs.push((name, entry.path()));
        }
    }
    runs.sort_by(|a, b| a.0.cmp(&b.0));
    debug!("Discovered runs {:?}", runs.iter().map(|x| &x.0).collect::<Vec<_>>());
    Ok(runs)
}

/// Files directly inside `dir` with the given extension, sorted by path.
pub async fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut items = read_dir(dir).await.context(format!("Read dir {dir:?}"))?;
    let mut files = Vec::new();
    while let Some(entry) = items.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_file()
            && path.extension().is_some_and(|ext| ext == extension)
        {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
