use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command as AsyncCommand;
use tracing::{debug, info};

use crate::config::ToolsConfig;
use crate::downloader::{DownloadOptions, ProgressFn, SourceDownloader, SourceKind};
use crate::errors::{MusicDownloaderError, Result};

/// SoundCloud downloader delegating to the scdl command line tool
pub struct SoundcloudDownloader {
    executable_path: String,
}

impl SoundcloudDownloader {
    /// Create a new SoundCloud downloader using scdl from PATH
    pub fn new() -> Self {
        Self {
            executable_path: "scdl".to_string(),
        }
    }

    /// Create a downloader with the configured tool path
    pub fn from_tools(tools: &ToolsConfig) -> Self {
        Self {
            executable_path: tools.scdl.clone(),
        }
    }

    /// Hand the URL to scdl, pointing it at the output directory. scdl
    /// names and tags its own files, so no output path comes back.
    pub async fn download(&self, url: &str, options: &DownloadOptions) -> Result<()> {
        tokio::fs::create_dir_all(&options.output_dir).await?;
        info!("Delegating {} to {}", url, self.executable_path);

        let output = AsyncCommand::new(&self.executable_path)
            .arg("-l")
            .arg(url)
            .arg("--path")
            .arg(&options.output_dir)
            .output()
            .await
            .map_err(|e| {
                MusicDownloaderError::ExternalTool(format!(
                    "Failed to execute {}: {}",
                    self.executable_path, e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MusicDownloaderError::ExternalTool(format!(
                "scdl failed: {}",
                stderr.trim()
            )));
        }

        debug!("scdl finished for {}", url);
        Ok(())
    }
}

impl Default for SoundcloudDownloader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceDownloader for SoundcloudDownloader {
    fn kind(&self) -> SourceKind {
        SourceKind::Soundcloud
    }

    async fn fetch(
        &self,
        reference: &str,
        options: &DownloadOptions,
        _on_progress: Option<ProgressFn>,
    ) -> Result<Option<PathBuf>> {
        self.download(reference, options).await?;
        Ok(None)
    }
}
