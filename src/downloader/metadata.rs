use std::path::Path;

use id3::{Tag, TagLike, Version};
use lofty::{
    config::WriteOptions,
    file::{AudioFile, TaggedFileExt},
    read_from_path,
    tag::{Accessor, ItemKey, Tag as LoftyTag, TagType},
};
use regex::Regex;

use crate::config::AudioFormat;
use crate::errors::{MusicDownloaderError, Result};

/// Tags extracted from a stream title and embedded into the output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackTags {
    pub title: String,
    pub artist: String,
    pub label: String,
}

/// Parse a free-text stream title of the form "Artist - Title [Label]".
/// Captures are greedy, so multi-dash titles keep the extra segments in
/// the artist group. Unmatched titles fall back to placeholder fields.
pub fn extract_metadata(title: &str) -> TrackTags {
    let pattern = Regex::new(r"^(.+) - (.+) \[(.+)\]").unwrap();

    if let Some(captures) = pattern.captures(title) {
        TrackTags {
            title: captures[2].trim().to_string(),
            artist: captures[1].trim().to_string(),
            label: captures[3].trim().to_string(),
        }
    } else {
        TrackTags {
            title: title.trim().to_string(),
            artist: "Unknown Artist".to_string(),
            label: "Unknown Label".to_string(),
        }
    }
}

/// Writes title/artist/album tags through the backend matching the
/// container: id3 for MP3, lofty for WAV and FLAC.
pub struct TagWriter;

impl TagWriter {
    pub fn new() -> Self {
        Self
    }

    /// Embed `tags` into the file at `file_path`. The album field is set
    /// to the record label for every format, WAV included.
    pub fn write_tags(&self, file_path: &Path, format: AudioFormat, tags: &TrackTags) -> Result<()> {
        match format {
            AudioFormat::Mp3 => self.write_id3_tags(file_path, tags),
            AudioFormat::Wav | AudioFormat::Flac => self.write_lofty_tags(file_path, format, tags),
        }
    }

    /// Read tags back from a file; missing fields come back empty
    pub fn read_tags(&self, file_path: &Path, format: AudioFormat) -> Result<TrackTags> {
        match format {
            AudioFormat::Mp3 => self.read_id3_tags(file_path),
            AudioFormat::Wav | AudioFormat::Flac => self.read_lofty_tags(file_path),
        }
    }

    fn write_id3_tags(&self, file_path: &Path, tags: &TrackTags) -> Result<()> {
        // Read existing tag or create new one
        let mut tag = match Tag::read_from_path(file_path) {
            Ok(tag) => tag,
            Err(_) => Tag::new(),
        };

        tag.set_title(&tags.title);
        tag.set_artist(&tags.artist);
        tag.set_album(&tags.label);

        tag.write_to_path(file_path, Version::Id3v24)
            .map_err(|e| MusicDownloaderError::Tagging(format!("Failed to write MP3 tags: {}", e)))?;

        Ok(())
    }

    fn write_lofty_tags(&self, file_path: &Path, format: AudioFormat, tags: &TrackTags) -> Result<()> {
        let mut tagged_file = read_from_path(file_path).map_err(|e| {
            MusicDownloaderError::Tagging(format!(
                "Failed to read {}: {}",
                file_path.display(),
                e
            ))
        })?;

        let tag_type = match format {
            AudioFormat::Flac => TagType::VorbisComments,
            _ => TagType::Id3v2, // WAV carries an ID3v2 chunk
        };

        let tag = if let Some(tag) = tagged_file.primary_tag_mut() {
            tag
        } else {
            tagged_file.insert_tag(LoftyTag::new(tag_type));
            tagged_file.primary_tag_mut().unwrap()
        };

        tag.insert_text(ItemKey::TrackTitle, tags.title.clone());
        tag.insert_text(ItemKey::TrackArtist, tags.artist.clone());
        tag.insert_text(ItemKey::AlbumTitle, tags.label.clone());

        tagged_file
            .save_to_path(file_path, WriteOptions::default())
            .map_err(|e| {
                MusicDownloaderError::Tagging(format!("Failed to save tags with lofty: {}", e))
            })?;

        Ok(())
    }

    fn read_id3_tags(&self, file_path: &Path) -> Result<TrackTags> {
        let tag = Tag::read_from_path(file_path)
            .map_err(|e| MusicDownloaderError::Tagging(format!("Failed to read MP3 tags: {}", e)))?;

        Ok(TrackTags {
            title: tag.title().unwrap_or_default().to_string(),
            artist: tag.artist().unwrap_or_default().to_string(),
            label: tag.album().unwrap_or_default().to_string(),
        })
    }

    fn read_lofty_tags(&self, file_path: &Path) -> Result<TrackTags> {
        let tagged_file = read_from_path(file_path).map_err(|e| {
            MusicDownloaderError::Tagging(format!(
                "Failed to read {}: {}",
                file_path.display(),
                e
            ))
        })?;

        let tags = match tagged_file.primary_tag() {
            Some(tag) => TrackTags {
                title: tag.title().unwrap_or_default().to_string(),
                artist: tag.artist().unwrap_or_default().to_string(),
                label: tag.album().unwrap_or_default().to_string(),
            },
            None => TrackTags {
                title: String::new(),
                artist: String::new(),
                label: String::new(),
            },
        };

        Ok(tags)
    }
}

impl Default for TagWriter {
    fn default() -> Self {
        Self::new()
    }
}
