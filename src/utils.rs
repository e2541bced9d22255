/*!
 * Utility functions and constant tables for dirsnap
 */

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Prefix marking a hidden file or directory
pub const HIDDEN_MARKER: char = '.';

/// Whether a name follows the hidden-file convention
pub fn is_hidden(name: &str) -> bool {
    name.starts_with(HIDDEN_MARKER)
}

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

/// Image and video extensions listed without content
pub static MEDIA_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "png", "jpg", "jpeg", "gif", "bmp", "svg", "ico", "webp", "tiff", // images
        "mp4", "mov", "avi", "mkv", "flv", "wmv", "webm", // video
    ]
    .into_iter()
    .collect()
});

/// Whether an extension (lowercase, no dot) names a media type
pub fn is_media_extension(ext: &str) -> bool {
    MEDIA_EXTENSIONS.contains(ext)
}

/// Built-in ignore rules, evaluated before any ignore file
pub static DEFAULT_IGNORE: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        // Version Control
        ".svn/",
        ".hg/",
        ".bzr/",
        // OS Files
        ".DS_Store",
        "Thumbs.db",
        "desktop.ini",
        "ehthumbs.db",
        // Dependencies
        "node_modules/",
        "bower_components/",
        ".pnpm-store/",
        // Python
        "__pycache__/",
        ".pytest_cache/",
        "*.pyc",
        "*.pyo",
        // Editors
        "*.swp",
        "*.swo",
        "*~",
        // Other Build Tools
        "*.class",
    ]
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_sizes() {
        assert_eq!(format_file_size(12), "12 bytes");
        assert_eq!(format_file_size(2048), "2.00 KB");
        assert_eq!(format_file_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn hidden_names() {
        assert!(is_hidden(".env"));
        assert!(!is_hidden("env"));
    }

    #[test]
    fn media_lookup() {
        assert!(is_media_extension("png"));
        assert!(!is_media_extension("rs"));
    }
}
