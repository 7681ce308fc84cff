pub mod fs;
pub mod logger;

/// Utility functions for the application
pub struct Utils;

impl Utils {
    /// Replace characters that are unsafe in file names across platforms
    pub fn sanitize_filename(filename: &str) -> String {
        filename
            .chars()
            .map(|c| match c {
                '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
                ';' => ',',
                _ => c,
            })
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// Build the on-disk file name for a tagged track: "{artist} - {title}.{ext}"
    pub fn output_file_name(artist: &str, title: &str, extension: &str) -> String {
        let base = Self::sanitize_filename(&format!("{} - {}", artist, title));
        format!("{}.{}", base, extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_invalid_characters() {
        assert_eq!(
            Utils::sanitize_filename("AC/DC: Back \"In\" Black?"),
            "AC_DC_ Back _In_ Black_"
        );
        assert_eq!(Utils::sanitize_filename("a;b"), "a,b");
        assert_eq!(Utils::sanitize_filename("  padded  "), "padded");
    }

    #[test]
    fn output_file_name_joins_artist_and_title() {
        assert_eq!(
            Utils::output_file_name("Daft Punk", "One More Time", "mp3"),
            "Daft Punk - One More Time.mp3"
        );
        assert_eq!(
            Utils::output_file_name("a/b", "c*d", "flac"),
            "a_b - c_d.flac"
        );
    }
}
