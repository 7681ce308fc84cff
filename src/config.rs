use crate::errors::{MusicDownloaderError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Supported output audio formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum AudioFormat {
    Mp3,
    Wav,
    Flac,
}

impl AudioFormat {
    /// File extension for this format, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
            AudioFormat::Flac => "flac",
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for AudioFormat {
    type Err = MusicDownloaderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mp3" => Ok(AudioFormat::Mp3),
            "wav" => Ok(AudioFormat::Wav),
            "flac" => Ok(AudioFormat::Flac),
            _ => Err(MusicDownloaderError::Config(format!(
                "Invalid audio format: {}",
                s
            ))),
        }
    }
}

/// Paths to the external tools the downloader shells out to.
/// Bare command names are resolved through PATH.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    pub yt_dlp: String,
    pub ffmpeg: String,
    pub spotdl: String,
    pub scdl: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            yt_dlp: "yt-dlp".to_string(),
            ffmpeg: "ffmpeg".to_string(),
            spotdl: "spotdl".to_string(),
            scdl: "scdl".to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub download_directory: PathBuf,
    pub default_format: AudioFormat,
    pub tools: ToolsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            download_directory: PathBuf::from("."),
            default_format: AudioFormat::Mp3,
            tools: ToolsConfig::default(),
        }
    }
}

impl Config {
    /// Get the configuration directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .ok_or_else(|| {
                MusicDownloaderError::Config("Could not find config directory".to_string())
            })
            .map(|dir| dir.join("music-downloader"))
    }

    /// Get the settings file path. The `MUSIC_DOWNLOADER_CONFIG` environment
    /// variable overrides the platform config directory.
    pub fn settings_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os("MUSIC_DOWNLOADER_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        Ok(Self::config_dir()?.join("settings.toml"))
    }

    /// Load configuration from file, writing defaults when none exists yet
    pub fn load() -> Result<Self> {
        let settings_path = Self::settings_path()?;

        if !settings_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&settings_path).map_err(|e| {
            MusicDownloaderError::Config(format!("Failed to read settings file: {}", e))
        })?;

        Ok(toml::from_str(&content)?)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let settings_path = Self::settings_path()?;
        if let Some(parent) = settings_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                MusicDownloaderError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let toml_content = toml::to_string_pretty(self)?;

        std::fs::write(&settings_path, toml_content).map_err(|e| {
            MusicDownloaderError::Config(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    // Serializes the tests that redirect MUSIC_DOWNLOADER_CONFIG.
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    struct ConfigPathGuard {
        _lock: MutexGuard<'static, ()>,
    }

    impl ConfigPathGuard {
        fn set(path: &std::path::Path) -> Self {
            let lock = ENV_LOCK
                .get_or_init(|| Mutex::new(()))
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            std::env::set_var("MUSIC_DOWNLOADER_CONFIG", path);
            ConfigPathGuard { _lock: lock }
        }
    }

    impl Drop for ConfigPathGuard {
        fn drop(&mut self) {
            std::env::remove_var("MUSIC_DOWNLOADER_CONFIG");
        }
    }

    #[test]
    fn format_parsing_accepts_known_formats() {
        assert_eq!(AudioFormat::from_str("mp3").unwrap(), AudioFormat::Mp3);
        assert_eq!(AudioFormat::from_str("WAV").unwrap(), AudioFormat::Wav);
        assert_eq!(AudioFormat::from_str("Flac").unwrap(), AudioFormat::Flac);
        assert!(AudioFormat::from_str("ogg").is_err());
    }

    #[test]
    fn format_extension_matches_display() {
        for format in [AudioFormat::Mp3, AudioFormat::Wav, AudioFormat::Flac] {
            assert_eq!(format.to_string(), format.extension());
        }
    }

    #[test]
    fn default_config_points_at_working_directory() {
        let config = Config::default();
        assert_eq!(config.download_directory, PathBuf::from("."));
        assert_eq!(config.default_format, AudioFormat::Mp3);
        assert_eq!(config.tools.yt_dlp, "yt-dlp");
        assert_eq!(config.tools.scdl, "scdl");
    }

    #[test]
    fn save_and_load_round_trips_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let settings = dir.path().join("settings.toml");
        let _guard = ConfigPathGuard::set(&settings);

        let mut config = Config::default();
        config.download_directory = PathBuf::from("/tmp/music");
        config.default_format = AudioFormat::Flac;
        config.tools.ffmpeg = "/opt/ffmpeg/bin/ffmpeg".to_string();
        config.save().unwrap();

        let loaded = Config::load().unwrap();
        assert_eq!(loaded.download_directory, PathBuf::from("/tmp/music"));
        assert_eq!(loaded.default_format, AudioFormat::Flac);
        assert_eq!(loaded.tools.ffmpeg, "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(loaded.tools.spotdl, "spotdl");
    }

    #[test]
    fn load_with_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = dir.path().join("nested").join("settings.toml");
        let _guard = ConfigPathGuard::set(&settings);

        let loaded = Config::load().unwrap();
        assert_eq!(loaded.default_format, AudioFormat::Mp3);
        assert!(settings.exists());
    }
}
