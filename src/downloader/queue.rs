use std::collections::VecDeque;
use std::path::PathBuf;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::ToolsConfig;
use crate::downloader::soundcloud::SoundcloudDownloader;
use crate::downloader::spotify::SpotifyDownloader;
use crate::downloader::youtube::YoutubeDownloader;
use crate::downloader::{DownloadOptions, ProgressFn, QueueEvent, SourceDownloader, SourceKind};
use crate::errors::{MusicDownloaderError, Result};

/// Drains a queue of track references one at a time on a background
/// task, reporting per-track status over a channel.
pub struct QueueProcessor {
    downloaders: Vec<Box<dyn SourceDownloader>>,
}

impl QueueProcessor {
    /// Create a processor with the standard downloader set
    pub fn new(tools: &ToolsConfig) -> Self {
        Self {
            downloaders: vec![
                Box::new(YoutubeDownloader::from_tools(tools)),
                Box::new(SpotifyDownloader::from_tools(tools)),
                Box::new(SoundcloudDownloader::from_tools(tools)),
            ],
        }
    }

    /// Create a processor over a custom downloader set
    pub fn with_downloaders(downloaders: Vec<Box<dyn SourceDownloader>>) -> Self {
        Self { downloaders }
    }

    /// Spawn the worker and return the event stream. Every queued
    /// reference produces a Completed or Failed event in queue order;
    /// the channel closes once the queue is drained.
    pub fn process(
        self,
        queue: Vec<String>,
        options: DownloadOptions,
    ) -> mpsc::UnboundedReceiver<QueueEvent> {
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let mut pending = VecDeque::from(queue);
            while let Some(reference) = pending.pop_front() {
                let _ = tx.send(QueueEvent::Started {
                    reference: reference.clone(),
                });

                match self.dispatch(&reference, &options, &tx).await {
                    Ok(output_path) => {
                        let _ = tx.send(QueueEvent::Completed {
                            reference,
                            output_path,
                        });
                    }
                    Err(error) => {
                        warn!("Download failed: {}", error);
                        let _ = tx.send(QueueEvent::Failed { reference, error });
                    }
                }
            }
        });

        rx
    }

    async fn dispatch(
        &self,
        reference: &str,
        options: &DownloadOptions,
        tx: &mpsc::UnboundedSender<QueueEvent>,
    ) -> Result<Option<PathBuf>> {
        let kind = SourceKind::classify(reference);
        if kind == SourceKind::Unrecognized {
            return Err(MusicDownloaderError::UnrecognizedSource(
                reference.to_string(),
            ));
        }

        let downloader = self
            .downloaders
            .iter()
            .find(|d| d.kind() == kind)
            .ok_or_else(|| MusicDownloaderError::UnrecognizedSource(reference.to_string()))?;

        info!("Dispatching {} to the {} downloader", reference, kind);

        let progress_tx = tx.clone();
        let progress_reference = reference.to_string();
        let on_progress: ProgressFn = Box::new(move |percent| {
            let _ = progress_tx.send(QueueEvent::Progress {
                reference: progress_reference.clone(),
                percent,
            });
        });

        downloader.fetch(reference, options, Some(on_progress)).await
    }
}
