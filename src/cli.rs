use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::{AudioFormat, Config};
use crate::downloader::{self, DownloadOptions, QueueEvent, QueueProcessor};
use crate::errors::Result;

/// Music Downloader - download, convert and tag tracks from YouTube,
/// Spotify and SoundCloud
#[derive(Parser)]
#[command(name = "music-downloader")]
#[command(about = "Download, convert and tag music from YouTube, Spotify and SoundCloud")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download one or more tracks
    Download {
        /// Track URLs (YouTube, Spotify or SoundCloud)
        references: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<AudioFormat>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Read additional URLs from a file, one per line
        #[arg(long)]
        from_file: Option<PathBuf>,
    },

    /// Search for tracks
    Search {
        /// Search query
        query: String,
    },

    /// Configure application settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set download directory
    SetDir {
        /// Directory path
        path: PathBuf,
    },

    /// Set default audio format
    SetFormat {
        /// Audio format
        format: AudioFormat,
    },

    /// Reset to default settings
    Reset,
}

impl Cli {
    /// Execute the parsed command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Download {
                references,
                format,
                output,
                from_file,
            } => Self::handle_download(references, format, output, from_file).await,
            Commands::Search { query } => {
                Self::handle_search(&query);
                Ok(())
            }
            Commands::Config { command } => Self::handle_config(command),
        }
    }

    async fn handle_download(
        references: Vec<String>,
        format: Option<AudioFormat>,
        output: Option<PathBuf>,
        from_file: Option<PathBuf>,
    ) -> Result<()> {
        let config = Config::load()?;

        let mut queue = references;
        if let Some(path) = from_file {
            queue.extend(read_queue_file(&path)?);
        }

        if queue.is_empty() {
            println!("Nothing to download");
            return Ok(());
        }

        let options = DownloadOptions {
            format: format.unwrap_or(config.default_format),
            output_dir: output.unwrap_or_else(|| config.download_directory.clone()),
        };

        println!("Format: {}", options.format);
        println!("Output directory: {}", options.output_dir.display());

        let mut events = QueueProcessor::new(&config.tools).process(queue, options);

        let mut downloaded = 0u32;
        let mut failed = 0u32;

        while let Some(event) = events.recv().await {
            match &event {
                QueueEvent::Started { .. } => println!("{}", event),
                QueueEvent::Progress { percent, .. } => {
                    print!("\r  {:>3}%", percent);
                    let _ = std::io::stdout().flush();
                }
                QueueEvent::Completed { .. } => {
                    downloaded += 1;
                    println!("\r{}", event);
                }
                QueueEvent::Failed { .. } => {
                    failed += 1;
                    println!("\r{}", event);
                }
            }
        }

        println!("{} downloaded, {} failed", downloaded, failed);
        Ok(())
    }

    fn handle_search(query: &str) {
        println!("Searching for: {}", query);
        for result in downloader::search_tracks(query) {
            println!("  {}", result);
        }
    }

    fn handle_config(command: ConfigCommands) -> Result<()> {
        match command {
            ConfigCommands::Show => {
                let config = Config::load()?;
                println!("Current configuration:");
                println!(
                    "  Download directory: {}",
                    config.download_directory.display()
                );
                println!("  Default format: {}", config.default_format);
                println!("  yt-dlp: {}", config.tools.yt_dlp);
                println!("  ffmpeg: {}", config.tools.ffmpeg);
                println!("  spotdl: {}", config.tools.spotdl);
                println!("  scdl: {}", config.tools.scdl);
            }
            ConfigCommands::SetDir { path } => {
                let mut config = Config::load()?;
                config.download_directory = path;
                config.save()?;
                println!("Download directory updated");
            }
            ConfigCommands::SetFormat { format } => {
                let mut config = Config::load()?;
                config.default_format = format;
                config.save()?;
                println!("Default format updated to: {}", format);
            }
            ConfigCommands::Reset => {
                Config::default().save()?;
                println!("Configuration reset to defaults");
            }
        }
        Ok(())
    }
}

/// Read queued references from a file, skipping blanks and `#` comments
fn read_queue_file(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
