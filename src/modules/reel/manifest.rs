use std::path::{Path, PathBuf};

use tokio::fs;

use crate::common::error::{JobError, JobResult};

#[derive(Debug, Clone, PartialEq)]
pub struct ManifestEntry {
    pub path: PathBuf,
    pub duration_secs: f64,
}

pub fn build(dir: &Path, files: &[String], duration_secs: f64) -> JobResult<Vec<ManifestEntry>> {
    files
        .iter()
        .map(|name| {
            let joined = dir.join(name);
            let path = std::path::absolute(&joined).map_err(|e| JobError::fs(&joined, e))?;
            Ok(ManifestEntry {
                path,
                duration_secs,
            })
        })
        .collect()
}

fn quote(path: &Path) -> String {
    format!("'{}'", path.to_string_lossy().replace('\'', r"'\''"))
}

fn unquote(raw: &str) -> String {
    let raw = raw.trim();
    match raw.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')) {
        Some(inner) => inner.replace(r"'\''", "'"),
        None => raw.to_string(),
    }
}

pub fn render(entries: &[ManifestEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!("file {}\n", quote(&entry.path)));
        out.push_str(&format!("duration {}\n", entry.duration_secs));
    }
    out
}

pub fn parse(text: &str) -> Vec<ManifestEntry> {
    let mut entries: Vec<ManifestEntry> = Vec::new();

    for line in text.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix("file ") {
            entries.push(ManifestEntry {
                path: PathBuf::from(unquote(rest)),
                duration_secs: 0.0,
            });
        } else if let Some(rest) = line.strip_prefix("duration ") {
            if let (Some(last), Ok(secs)) = (entries.last_mut(), rest.trim().parse::<f64>()) {
                last.duration_secs = secs;
            }
        }
    }

    entries
}

pub async fn write(path: &Path, entries: &[ManifestEntry]) -> JobResult<()> {
    fs::write(path, render(entries))
        .await
        .map_err(|e| JobError::fs(path, e))
}

pub async fn read(path: &Path) -> JobResult<Vec<ManifestEntry>> {
    match fs::read_to_string(path).await {
        Ok(text) => Ok(parse(&text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(JobError::MissingManifest(path.to_path_buf()))
        }
        Err(e) => Err(JobError::fs(path, e)),
    }
}
