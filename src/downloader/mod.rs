pub mod converter;
pub mod metadata;
pub mod queue;
pub mod soundcloud;
pub mod spotify;
pub mod youtube;

pub use queue::QueueProcessor;

use crate::config::AudioFormat;
use crate::errors::{MusicDownloaderError, Result};
use async_trait::async_trait;
use std::path::PathBuf;

/// The known download sources a track reference can resolve to.
/// Classification happens once, before dispatch; `Unrecognized` is an
/// explicit variant so unmatched references surface as errors instead of
/// being skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Youtube,
    Spotify,
    Soundcloud,
    Unrecognized,
}

impl SourceKind {
    /// Classify a track reference by first-match, case-sensitive
    /// substring test against the known source domains.
    pub fn classify(reference: &str) -> Self {
        if reference.contains("youtube.com") || reference.contains("youtu.be") {
            SourceKind::Youtube
        } else if reference.contains("spotify.com") {
            SourceKind::Spotify
        } else if reference.contains("soundcloud.com") {
            SourceKind::Soundcloud
        } else {
            SourceKind::Unrecognized
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Youtube => write!(f, "YouTube"),
            SourceKind::Spotify => write!(f, "Spotify"),
            SourceKind::Soundcloud => write!(f, "SoundCloud"),
            SourceKind::Unrecognized => write!(f, "Unrecognized"),
        }
    }
}

/// Progress callback handed into a downloader call; receives percentages
/// in 0..=100.
pub type ProgressFn = Box<dyn Fn(u8) + Send + Sync>;

/// Download options applied to every entry of one processing run
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub format: AudioFormat,
    pub output_dir: PathBuf,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            format: AudioFormat::Mp3,
            output_dir: PathBuf::from("."),
        }
    }
}

/// Status updates posted by the queue worker while draining
#[derive(Debug)]
pub enum QueueEvent {
    Started {
        reference: String,
    },
    Progress {
        reference: String,
        percent: u8,
    },
    Completed {
        reference: String,
        /// Final on-disk path when the pipeline controls naming;
        /// `None` when the external tool owns the output.
        output_path: Option<PathBuf>,
    },
    Failed {
        reference: String,
        error: MusicDownloaderError,
    },
}

impl std::fmt::Display for QueueEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueEvent::Started { reference } => write!(f, "Downloading {}...", reference),
            QueueEvent::Progress { reference, percent } => {
                write!(f, "Downloading {}... {}%", reference, percent)
            }
            QueueEvent::Completed {
                reference,
                output_path,
            } => match output_path {
                Some(path) => write!(f, "Downloaded {} -> {}", reference, path.display()),
                None => write!(f, "Downloaded {}", reference),
            },
            QueueEvent::Failed { reference, error } => {
                write!(f, "Error downloading {}: {}", reference, error)
            }
        }
    }
}

/// One download source behind the queue's dispatch seam
#[async_trait]
pub trait SourceDownloader: Send + Sync {
    /// The source this downloader serves
    fn kind(&self) -> SourceKind;

    /// Fetch `reference`, reporting progress through the injected callback
    /// when the source supports it. Returns the final output path when the
    /// pipeline controls naming, `None` when the external tool does.
    async fn fetch(
        &self,
        reference: &str,
        options: &DownloadOptions,
        on_progress: Option<ProgressFn>,
    ) -> Result<Option<PathBuf>>;
}

/// Resolve a free-text query into queueable track references.
/// No search backend is wired up; the query itself is the only candidate.
pub fn search_tracks(query: &str) -> Vec<String> {
    vec![query.to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_recognizes_each_source_domain() {
        assert_eq!(
            SourceKind::classify("https://www.youtube.com/watch?v=FGBhQbmPwH8"),
            SourceKind::Youtube
        );
        assert_eq!(
            SourceKind::classify("https://youtu.be/FGBhQbmPwH8"),
            SourceKind::Youtube
        );
        assert_eq!(
            SourceKind::classify("https://music.youtube.com/watch?v=abc"),
            SourceKind::Youtube
        );
        assert_eq!(
            SourceKind::classify("https://open.spotify.com/track/0DiWol3AO6WpXZgp0goxAV"),
            SourceKind::Spotify
        );
        assert_eq!(
            SourceKind::classify("https://soundcloud.com/artist/track"),
            SourceKind::Soundcloud
        );
    }

    #[test]
    fn classify_rejects_unknown_references() {
        assert_eq!(
            SourceKind::classify("https://bandcamp.com/track/x"),
            SourceKind::Unrecognized
        );
        assert_eq!(
            SourceKind::classify("daft punk one more time"),
            SourceKind::Unrecognized
        );
        assert_eq!(SourceKind::classify(""), SourceKind::Unrecognized);
    }

    #[test]
    fn classify_is_first_match_and_case_sensitive() {
        // youtube wins even when a later domain also appears
        assert_eq!(
            SourceKind::classify("https://open.spotify.com/?next=youtube.com"),
            SourceKind::Youtube
        );
        // substring test is case-sensitive
        assert_eq!(
            SourceKind::classify("https://YOUTUBE.COM/watch?v=abc"),
            SourceKind::Unrecognized
        );
    }

    #[test]
    fn search_returns_query_as_single_candidate() {
        let results = search_tracks("daft punk");
        assert_eq!(results, vec!["daft punk".to_string()]);
    }

    #[test]
    fn default_options_target_the_working_directory() {
        let options = DownloadOptions::default();
        assert_eq!(options.format, AudioFormat::Mp3);
        assert_eq!(options.output_dir, PathBuf::from("."));
    }

    #[test]
    fn queue_events_render_status_lines() {
        let started = QueueEvent::Started {
            reference: "https://youtu.be/x".to_string(),
        };
        assert_eq!(started.to_string(), "Downloading https://youtu.be/x...");

        let completed = QueueEvent::Completed {
            reference: "https://open.spotify.com/track/x".to_string(),
            output_path: None,
        };
        assert_eq!(
            completed.to_string(),
            "Downloaded https://open.spotify.com/track/x"
        );
    }
}
