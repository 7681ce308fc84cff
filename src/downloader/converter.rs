use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, info};

use crate::config::AudioFormat;
use crate::downloader::metadata::{TagWriter, TrackTags};
use crate::downloader::DownloadOptions;
use crate::errors::{MusicDownloaderError, Result};
use crate::utils::Utils;

/// MP3 output is always encoded at this bitrate
const MP3_BITRATE_KBPS: u32 = 320;

/// Decodes and re-encodes audio through ffmpeg, then embeds tags
pub struct AudioConverter {
    ffmpeg_path: String,
    tag_writer: TagWriter,
}

impl AudioConverter {
    /// Create a new audio converter using `ffmpeg` from PATH
    pub fn new() -> Self {
        Self::with_path("ffmpeg".to_string())
    }

    /// Create a converter with a custom ffmpeg path
    pub fn with_path(ffmpeg_path: String) -> Self {
        Self {
            ffmpeg_path,
            tag_writer: TagWriter::new(),
        }
    }

    /// Convert `source` into the configured output directory and embed
    /// `tags`, returning the final "{artist} - {title}.{ext}" path. The
    /// source file is left in place.
    pub async fn convert_and_tag(
        &self,
        source: &Path,
        options: &DownloadOptions,
        tags: &TrackTags,
    ) -> Result<PathBuf> {
        let output_path = self.output_path(options, tags);

        info!(
            "Converting {} -> {}",
            source.display(),
            output_path.display()
        );
        self.convert(source, &output_path, options.format).await?;

        debug!("Embedding tags into {}", output_path.display());
        self.tag_writer
            .write_tags(&output_path, options.format, tags)?;

        Ok(output_path)
    }

    /// Final on-disk path for a track in the configured output directory
    pub fn output_path(&self, options: &DownloadOptions, tags: &TrackTags) -> PathBuf {
        let file_name =
            Utils::output_file_name(&tags.artist, &tags.title, options.format.extension());
        options.output_dir.join(file_name)
    }

    /// Convert an audio file to the requested format
    pub async fn convert(
        &self,
        input_path: &Path,
        output_path: &Path,
        format: AudioFormat,
    ) -> Result<()> {
        self.check_availability().await?;

        // Ensure output directory exists
        if let Some(parent) = output_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                MusicDownloaderError::Conversion(format!(
                    "Failed to create output directory: {}",
                    e
                ))
            })?;
        }

        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.arg("-i").arg(input_path);
        cmd.arg("-acodec").arg(codec_for(format));
        if format == AudioFormat::Mp3 {
            cmd.arg("-b:a").arg(format!("{}k", MP3_BITRATE_KBPS));
        }
        cmd.arg("-loglevel").arg("error");
        cmd.arg("-y");
        cmd.arg(output_path);

        let output = cmd.output().await.map_err(|e| {
            MusicDownloaderError::Conversion(format!(
                "Failed to execute {}: {}",
                self.ffmpeg_path, e
            ))
        })?;

        if !output.status.success() {
            let error_msg = String::from_utf8_lossy(&output.stderr);
            return Err(MusicDownloaderError::Conversion(format!(
                "ffmpeg conversion failed: {}",
                error_msg.trim()
            )));
        }

        Ok(())
    }

    /// Check that the configured ffmpeg binary runs
    async fn check_availability(&self) -> Result<()> {
        let output = Command::new(&self.ffmpeg_path).arg("-version").output().await;

        match output {
            Ok(output) if output.status.success() => Ok(()),
            Ok(_) => Err(MusicDownloaderError::Conversion(format!(
                "{} is not working properly",
                self.ffmpeg_path
            ))),
            Err(_) => Err(MusicDownloaderError::Conversion(format!(
                "{} not found in PATH. Install FFmpeg or point tools.ffmpeg at it",
                self.ffmpeg_path
            ))),
        }
    }
}

impl Default for AudioConverter {
    fn default() -> Self {
        Self::new()
    }
}

/// ffmpeg codec used for each output format
fn codec_for(format: AudioFormat) -> &'static str {
    match format {
        AudioFormat::Mp3 => "libmp3lame",
        AudioFormat::Flac => "flac",
        AudioFormat::Wav => "pcm_s16le",
    }
}
