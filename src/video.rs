use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{DiscoveryConfig, ProbeConfig};
use crate::duration::format_seconds;
use crate::error::{PlanError, Result};

/// A probed video file on disk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocalVideoFile {
    pub file_name: String,
    pub path: PathBuf,
    /// Duration rounded to whole seconds (0 when probing failed)
    pub duration_seconds: u64,
    /// Reason the probe failed, if it did
    pub probe_error: Option<String>,
}

impl LocalVideoFile {
    /// Whether this file can take part in matching
    pub fn is_usable(&self) -> bool {
        self.probe_error.is_none() && self.duration_seconds > 0
    }
}

/// Returns the duration of a media file in seconds
#[async_trait]
pub trait DurationProbe: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<f64>;
}

/// Duration probe backed by an external `ffprobe`-style process
#[derive(Debug, Clone)]
pub struct FfprobeDurationProbe {
    command: String,
    args: Vec<String>,
}

impl FfprobeDurationProbe {
    pub fn new(config: &ProbeConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
        }
    }
}

#[async_trait]
impl DurationProbe for FfprobeDurationProbe {
    async fn probe(&self, path: &Path) -> Result<f64> {
        let file = path.display().to_string();

        let output = tokio::process::Command::new(&self.command)
            .args(&self.args)
            .arg(path)
            .output()
            .await
            .map_err(|e| PlanError::Probe {
                file: file.clone(),
                reason: format!("failed to run {}: {}", self.command, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PlanError::Probe {
                file,
                reason: format!("{} exited with {}: {}", self.command, output.status, stderr.trim()),
            });
        }

        parse_probe_output(&String::from_utf8_lossy(&output.stdout)).ok_or_else(|| PlanError::Probe {
            file,
            reason: "no parseable duration in probe output".to_string(),
        })
    }
}

/// Parse the first line of probe output as a non-negative number of seconds
pub fn parse_probe_output(stdout: &str) -> Option<f64> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.parse::<f64>().ok())
        .filter(|seconds| seconds.is_finite() && *seconds >= 0.0)
}

/// Lists candidate video files in a directory
#[derive(Debug, Clone)]
pub struct VideoDiscovery {
    /// Supported video extensions (lowercase, no dot)
    supported_extensions: Vec<String>,
}

impl VideoDiscovery {
    pub fn new(config: &DiscoveryConfig) -> Self {
        Self {
            supported_extensions: config
                .video_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// List video files directly inside `dir`, sorted by file name
    pub fn discover_videos(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(PlanError::VideoDirectoryMissing(dir.to_path_buf()));
        }

        let mut videos = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| PlanError::Io(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let supported = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map_or(false, |ext| self.supported_extensions.contains(&ext.to_lowercase()));

            if supported {
                videos.push(path.to_path_buf());
            }
        }

        videos.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        debug!("Discovered {} video files in {}", videos.len(), dir.display());
        Ok(videos)
    }
}

/// Probe every file concurrently and wait for all of them to settle.
///
/// Results keep the order of `paths`. A failed probe yields a file with zero
/// duration and `probe_error` set instead of failing the batch.
pub async fn probe_all(
    probe: Arc<dyn DurationProbe>,
    paths: Vec<PathBuf>,
    max_concurrent: usize,
) -> Vec<LocalVideoFile> {
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let total = paths.len();

    info!("⏱️ Probing durations for {} files", total);

    let tasks = paths.into_iter().map(|path| {
        let probe = Arc::clone(&probe);
        let semaphore = Arc::clone(&semaphore);
        async move {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();

            let outcome = match semaphore.acquire().await {
                Ok(_permit) => probe.probe(&path).await,
                Err(e) => Err(PlanError::Probe {
                    file: file_name.clone(),
                    reason: e.to_string(),
                }),
            };

            match outcome {
                Ok(seconds) => {
                    let duration_seconds = seconds.round() as u64;
                    debug!("📹 {}: {}", file_name, format_seconds(duration_seconds));
                    LocalVideoFile {
                        file_name,
                        path,
                        duration_seconds,
                        probe_error: None,
                    }
                }
                Err(e) => {
                    warn!("⚠️ Could not probe {}: {}", file_name, e);
                    LocalVideoFile {
                        file_name,
                        path,
                        duration_seconds: 0,
                        probe_error: Some(e.to_string()),
                    }
                }
            }
        }
    });

    let files = join_all(tasks).await;

    let failures = files.iter().filter(|f| f.probe_error.is_some()).count();
    if failures > 0 {
        warn!("⚠️ {} of {} files could not be probed and will be skipped", failures, total);
    } else {
        info!("✅ Probed {} files", total);
    }

    files
}
