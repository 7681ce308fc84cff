use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::Deserialize;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::process::Command as AsyncCommand;
use tracing::{debug, info};

use crate::config::ToolsConfig;
use crate::downloader::converter::AudioConverter;
use crate::downloader::metadata;
use crate::downloader::{DownloadOptions, ProgressFn, SourceDownloader, SourceKind};
use crate::errors::{MusicDownloaderError, Result};
use crate::utils::fs::TempFile;

/// YouTube downloader: resolves the stream with yt-dlp, fetches the best
/// audio-only format over HTTP, then converts and tags the result.
pub struct YoutubeDownloader {
    executable_path: String,
    client: reqwest::Client,
    converter: AudioConverter,
}

impl YoutubeDownloader {
    /// Create a new YouTube downloader using tools from PATH
    pub fn new() -> Self {
        Self {
            executable_path: "yt-dlp".to_string(),
            client: reqwest::Client::new(),
            converter: AudioConverter::new(),
        }
    }

    /// Create a downloader with the configured tool paths
    pub fn from_tools(tools: &ToolsConfig) -> Self {
        Self {
            executable_path: tools.yt_dlp.clone(),
            client: reqwest::Client::new(),
            converter: AudioConverter::with_path(tools.ffmpeg.clone()),
        }
    }

    /// Run the full pipeline for one URL: resolve, stream to a temp file,
    /// extract metadata from the stream title, convert and tag. The temp
    /// file is removed once the guard drops, whether the pipeline
    /// succeeded or failed; on success that happens after tagging.
    pub async fn download(
        &self,
        url: &str,
        options: &DownloadOptions,
        on_progress: Option<ProgressFn>,
    ) -> Result<PathBuf> {
        let info = self.probe(url).await?;
        let format = self.best_audio_format(&info)?;
        let stream_url = format.url.as_deref().ok_or_else(|| {
            MusicDownloaderError::Resolution(format!(
                "Stream format {} carries no URL",
                format.format_id
            ))
        })?;

        info!(
            "Resolved '{}' to format {} ({})",
            info.title, format.format_id, format.ext
        );

        let temp = TempFile::new("youtube", &format.ext);
        self.fetch_stream(stream_url, format.filesize, temp.path(), &on_progress)
            .await?;

        let tags = metadata::extract_metadata(&info.title);
        debug!(
            "Extracted tags: '{}' by '{}' on '{}'",
            tags.title, tags.artist, tags.label
        );

        let output_path = self
            .converter
            .convert_and_tag(temp.path(), options, &tags)
            .await?;

        Ok(output_path)
    }

    /// Resolve a URL to its stream description via yt-dlp
    async fn probe(&self, url: &str) -> Result<StreamInfo> {
        let mut cmd = AsyncCommand::new(&self.executable_path);
        cmd.arg(url)
            .arg("--dump-json")
            .arg("--no-playlist")
            .arg("--quiet");

        let output = cmd.output().await.map_err(|e| {
            MusicDownloaderError::Resolution(format!(
                "Failed to execute {}: {}",
                self.executable_path, e
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MusicDownloaderError::Resolution(format!(
                "yt-dlp failed: {}",
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let info: StreamInfo = serde_json::from_str(&stdout).map_err(|e| {
            MusicDownloaderError::Resolution(format!("Failed to parse yt-dlp output: {}", e))
        })?;
        debug!("yt-dlp resolved stream {} ('{}')", info.id, info.title);

        Ok(info)
    }

    /// Pick the audio-only format with the highest average bitrate
    fn best_audio_format<'a>(&self, info: &'a StreamInfo) -> Result<&'a StreamFormat> {
        info.formats
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .filter(|f| {
                f.url.is_some()
                    && f.acodec.as_deref().map_or(false, |a| a != "none")
                    && f.vcodec.as_deref().unwrap_or("none") == "none"
            })
            .max_by(|a, b| a.abr.unwrap_or(0.0).total_cmp(&b.abr.unwrap_or(0.0)))
            .ok_or_else(|| {
                MusicDownloaderError::Resolution(format!(
                    "No audio-only stream available for '{}'",
                    info.title
                ))
            })
    }

    /// Stream the format URL into `dest`, reporting percent progress as
    /// chunks arrive. Duplicate percentages are coalesced; the sequence
    /// always ends at 100 on success.
    async fn fetch_stream(
        &self,
        stream_url: &str,
        fallback_total: Option<u64>,
        dest: &Path,
        on_progress: &Option<ProgressFn>,
    ) -> Result<()> {
        let response = self
            .client
            .get(stream_url)
            .send()
            .await
            .map_err(|e| {
                MusicDownloaderError::Resolution(format!("Failed to fetch stream: {}", e))
            })?
            .error_for_status()
            .map_err(|e| {
                MusicDownloaderError::Resolution(format!("Stream request failed: {}", e))
            })?;

        let total_size = response.content_length().or(fallback_total).unwrap_or(0);
        debug!("Streaming {} bytes to {}", total_size, dest.display());

        let file = tokio::fs::File::create(dest).await?;
        let mut writer = BufWriter::new(file);
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;
        let mut last_percent = None;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                MusicDownloaderError::Resolution(format!("Stream interrupted: {}", e))
            })?;
            writer.write_all(&chunk).await?;
            downloaded = downloaded.saturating_add(chunk.len() as u64);

            if let Some(callback) = on_progress {
                let remaining = total_size.saturating_sub(downloaded);
                let percent = percent_complete(total_size, remaining);
                if last_percent != Some(percent) {
                    callback(percent);
                    last_percent = Some(percent);
                }
            }
        }

        writer.flush().await?;

        // the stream can end early on a wrong content length
        if let Some(callback) = on_progress {
            if last_percent != Some(100) {
                callback(100);
            }
        }

        Ok(())
    }
}

impl Default for YoutubeDownloader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceDownloader for YoutubeDownloader {
    fn kind(&self) -> SourceKind {
        SourceKind::Youtube
    }

    async fn fetch(
        &self,
        reference: &str,
        options: &DownloadOptions,
        on_progress: Option<ProgressFn>,
    ) -> Result<Option<PathBuf>> {
        self.download(reference, options, on_progress).await.map(Some)
    }
}

/// Percent complete given the total size and bytes still to arrive.
/// A zero/unknown total counts as 1 to avoid division errors.
fn percent_complete(total_size: u64, bytes_remaining: u64) -> u8 {
    let total = if total_size == 0 { 1 } else { total_size };
    let downloaded = total.saturating_sub(bytes_remaining);
    ((downloaded as u128 * 100) / total as u128) as u8
}

/// Stream description from `yt-dlp --dump-json`
#[derive(Debug, Clone, Deserialize)]
pub struct StreamInfo {
    pub id: String,
    pub title: String,
    pub formats: Option<Vec<StreamFormat>>,
}

/// One downloadable format within a stream description
#[derive(Debug, Clone, Deserialize)]
pub struct StreamFormat {
    pub format_id: String,
    pub ext: String,
    pub acodec: Option<String>,
    pub vcodec: Option<String>,
    pub abr: Option<f32>,
    pub filesize: Option<u64>,
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_monotonic_and_ends_at_100() {
        let total = 1000u64;
        let mut last = 0u8;
        for remaining in (0..=total).rev() {
            let percent = percent_complete(total, remaining);
            assert!(percent >= last, "{} < {} at {remaining}", percent, last);
            last = percent;
        }
        assert_eq!(last, 100);
    }

    #[test]
    fn progress_guards_unknown_total() {
        // unknown totals are treated as 1 byte
        assert_eq!(percent_complete(0, 0), 100);
        assert_eq!(percent_complete(0, 7), 0);
    }

    #[test]
    fn progress_caps_at_100_when_total_is_low() {
        assert_eq!(percent_complete(10, 0), 100);
        assert_eq!(percent_complete(10, 25), 0);
    }

    fn stream_format(
        format_id: &str,
        acodec: Option<&str>,
        vcodec: Option<&str>,
        abr: Option<f32>,
    ) -> StreamFormat {
        StreamFormat {
            format_id: format_id.to_string(),
            ext: "m4a".to_string(),
            acodec: acodec.map(str::to_string),
            vcodec: vcodec.map(str::to_string),
            abr,
            filesize: Some(1024),
            url: Some(format!("https://example.com/{}", format_id)),
        }
    }

    #[test]
    fn best_audio_format_prefers_highest_audio_only_bitrate() {
        let info = StreamInfo {
            id: "x".to_string(),
            title: "t".to_string(),
            formats: Some(vec![
                stream_format("muxed", Some("mp4a.40.2"), Some("avc1"), Some(999.0)),
                stream_format("low", Some("opus"), Some("none"), Some(64.0)),
                stream_format("high", Some("mp4a.40.2"), Some("none"), Some(129.5)),
                stream_format("no-audio", Some("none"), Some("none"), Some(512.0)),
            ]),
        };

        let downloader = YoutubeDownloader::new();
        let best = downloader.best_audio_format(&info).unwrap();
        assert_eq!(best.format_id, "high");
    }

    #[test]
    fn best_audio_format_errors_without_audio_only_stream() {
        let downloader = YoutubeDownloader::new();

        let muxed_only = StreamInfo {
            id: "x".to_string(),
            title: "t".to_string(),
            formats: Some(vec![stream_format(
                "muxed",
                Some("mp4a.40.2"),
                Some("avc1"),
                Some(128.0),
            )]),
        };
        let err = downloader.best_audio_format(&muxed_only).unwrap_err();
        assert!(matches!(err, MusicDownloaderError::Resolution(_)));

        let no_formats = StreamInfo {
            id: "x".to_string(),
            title: "t".to_string(),
            formats: None,
        };
        assert!(downloader.best_audio_format(&no_formats).is_err());
    }

    #[test]
    fn stream_info_parses_dump_json_payload() {
        let payload = r#"{
            "id": "FGBhQbmPwH8",
            "title": "Daft Punk - One More Time [Virgin]",
            "uploader": "Daft Punk",
            "formats": [
                {"format_id": "140", "ext": "m4a", "acodec": "mp4a.40.2",
                 "vcodec": "none", "abr": 129.5, "filesize": 3200000,
                 "url": "https://example.com/audio"},
                {"format_id": "160", "ext": "mp4", "acodec": "none",
                 "vcodec": "avc1.4d400c"}
            ]
        }"#;

        let info: StreamInfo = serde_json::from_str(payload).unwrap();
        assert_eq!(info.id, "FGBhQbmPwH8");
        assert_eq!(info.title, "Daft Punk - One More Time [Virgin]");
        let formats = info.formats.unwrap();
        assert_eq!(formats.len(), 2);
        assert_eq!(formats[0].ext, "m4a");
        assert!(formats[1].url.is_none());
    }
}
