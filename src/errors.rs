use thiserror::Error;

/// Main error type for the music downloader application
#[derive(Error, Debug)]
pub enum MusicDownloaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Resolution error: {0}")]
    Resolution(String),

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Tagging error: {0}")]
    Tagging(String),

    #[error("External tool error: {0}")]
    ExternalTool(String),

    #[error("Unrecognized source: {0}")]
    UnrecognizedSource(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, MusicDownloaderError>;
