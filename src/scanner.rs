/*!
 * Directory and file scanning functionality
 *
 * A single depth-first pass: each directory first extends the rule set with
 * its own ignore files, then asks the inclusion engine about every child in
 * name order. Rules added for a directory are dropped again on the way out.
 */

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use indicatif::ProgressBar;
use tracing::{debug, info, trace, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Result, SnapshotError};
use crate::filter::InclusionEngine;
use crate::rules::RuleSet;
use crate::types::{
    file_extension, DirectoryNode, Entry, EntryKind, FileContent, FileNode, Node, Suppression,
};
use crate::utils::is_media_extension;

/// Bytes inspected when sniffing for binary content
const SNIFF_LEN: usize = 8192;

/// Scanner for directory contents
pub struct Scanner {
    /// Scanner configuration
    config: Config,
    /// Compiled filtering policy
    engine: InclusionEngine,
    /// Progress bar
    pub progress: Arc<ProgressBar>,
}

impl Scanner {
    /// Create a new scanner; fails if the configured globs are invalid
    pub fn new(config: Config, progress: Arc<ProgressBar>) -> Result<Self> {
        let engine = InclusionEngine::new(&config)?;
        Ok(Self {
            config,
            engine,
            progress,
        })
    }

    /// Scan the root directory and return the filtered tree
    pub fn scan(&self) -> Result<DirectoryNode> {
        let root = &self.config.root;
        if !root.exists() {
            crate::bail!(Traversal, "Path not found: {}", root.display());
        }
        if !root.is_dir() {
            crate::bail!(Traversal, "Not a directory: {}", root.display());
        }
        let abs_path = fs::canonicalize(root)
            .map_err(|e| crate::error!(Traversal, "{}: {}", root.display(), e))?;

        let mut rules = if self.config.default_ignores {
            RuleSet::with_defaults()
        } else {
            RuleSet::new()
        };
        if let Some(path) = &self.config.ignore_path {
            rules
                .load_file(path, &[])
                .map_err(|e| crate::error!(Config, "{}", e))?;
        }

        let tree = self.scan_directory(Entry::root(abs_path), &mut rules);
        info!(
            root = %root.display(),
            files = tree.files().len(),
            "scan complete"
        );
        Ok(tree)
    }

    /// Scan a directory and return its node representation
    fn scan_directory(&self, dir: Entry, rules: &mut RuleSet) -> DirectoryNode {
        let mark = rules.mark();
        if self.config.respect_ignore_files {
            self.load_ignore_files(&dir, rules);
        }

        let (entries, error) = self.read_children(&dir);
        let mut children = Vec::new();

        for entry in entries {
            let decision = self.engine.decide(&entry, rules);
            if !decision.keep {
                debug!(path = %entry.display_path(), reason = %decision.reason, "skipped");
                continue;
            }
            trace!(path = %entry.display_path(), reason = %decision.reason, "kept");

            match entry.kind {
                EntryKind::Directory if decision.prune => {
                    // Never read, so nothing below can match an include glob
                    if self.engine.has_include() {
                        debug!(path = %entry.display_path(), "depth-limited under include");
                        continue;
                    }
                    children.push(Node::Directory(DirectoryNode {
                        entry,
                        children: Vec::new(),
                        error: None,
                    }));
                }
                EntryKind::Directory => {
                    let sub = self.scan_directory(entry, rules);
                    // Include globs only keep directories that lead to a file
                    if self.engine.has_include() && !sub.has_files() && sub.error.is_none() {
                        debug!(path = %sub.entry.display_path(), "no included files below");
                        continue;
                    }
                    children.push(Node::Directory(sub));
                }
                EntryKind::File => {
                    let node = self.process_file(entry, decision.suppress_content);
                    children.push(Node::File(node));
                }
            }
        }

        rules.restore(mark);
        DirectoryNode {
            entry: dir,
            children,
            error,
        }
    }

    /// Append the rules of every ignore file present in `dir`
    fn load_ignore_files(&self, dir: &Entry, rules: &mut RuleSet) {
        for name in &self.config.ignore_file_names {
            let path = dir.abs_path.join(name);
            if !path.is_file() {
                continue;
            }
            match rules.load_file(&path, &dir.rel_path) {
                Ok(count) => debug!(file = %path.display(), rules = count, "loaded ignore file"),
                Err(e) => warn!("{}", e),
            }
        }
    }

    /// List the direct children of `dir` in name order, without following links
    fn read_children(&self, dir: &Entry) -> (Vec<Entry>, Option<String>) {
        let mut entries = Vec::new();
        let mut error = None;

        let walker = WalkDir::new(&dir.abs_path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        for result in walker {
            match result {
                Ok(de) => {
                    let name = de.file_name().to_string_lossy().to_string();
                    let file_type = de.file_type();
                    let kind = if file_type.is_dir() {
                        EntryKind::Directory
                    } else {
                        EntryKind::File
                    };
                    let is_media = kind == EntryKind::File
                        && file_extension(&name).is_some_and(|ext| is_media_extension(&ext));
                    let mut rel_path = dir.rel_path.clone();
                    rel_path.push(name);

                    entries.push(Entry {
                        rel_path,
                        abs_path: de.path().to_path_buf(),
                        kind,
                        depth: dir.depth + 1,
                        size: de.metadata().map(|m| m.len()).unwrap_or(0),
                        is_symlink: file_type.is_symlink(),
                        is_media,
                    });
                }
                Err(e) => {
                    warn!("Error reading directory {}: {}", dir.abs_path.display(), e);
                    if error.is_none() {
                        error = Some(e.to_string());
                    }
                }
            }
        }

        (entries, error)
    }

    /// Process a single kept file and attach its content
    fn process_file(&self, entry: Entry, suppress_content: bool) -> FileNode {
        self.progress.inc(1);
        self.progress
            .set_message(format!("Current file: {}", entry.display_path()));

        let content = if entry.is_symlink {
            FileContent::Suppressed(Suppression::Symlink)
        } else if suppress_content {
            FileContent::Suppressed(Suppression::Media)
        } else {
            match read_content(&entry.abs_path, self.config.max_file_size) {
                Ok(content) => content,
                Err(e) => {
                    warn!("{}", e);
                    FileContent::Unreadable(e.to_string())
                }
            }
        };

        FileNode { entry, content }
    }
}

/// Read a file's content, cut at `max_size` bytes (0 = unlimited).
///
/// Binary content is reported as suppressed rather than decoded.
pub fn read_content(path: &Path, max_size: u64) -> Result<FileContent> {
    let read_error = |source| SnapshotError::Read {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(read_error)?;
    let limit = if max_size == 0 {
        u64::MAX
    } else {
        max_size.saturating_add(1)
    };
    let mut bytes = Vec::new();
    file.take(limit)
        .read_to_end(&mut bytes)
        .map_err(read_error)?;

    if looks_binary(&bytes[..bytes.len().min(SNIFF_LEN)]) {
        return Ok(FileContent::Suppressed(Suppression::Binary));
    }

    let truncated = max_size > 0 && bytes.len() as u64 > max_size;
    if truncated {
        bytes.truncate(max_size as usize);
    }

    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        // The cut landed inside a multi-byte character
        Err(e) if truncated && e.utf8_error().error_len().is_none() => {
            let valid = e.utf8_error().valid_up_to();
            let mut bytes = e.into_bytes();
            bytes.truncate(valid);
            String::from_utf8_lossy(&bytes).into_owned()
        }
        Err(_) => return Ok(FileContent::Suppressed(Suppression::Binary)),
    };

    Ok(FileContent::Text { text, truncated })
}

/// NUL bytes, invalid UTF-8 or too many control characters
fn looks_binary(sample: &[u8]) -> bool {
    if sample.is_empty() {
        return false;
    }
    if sample.contains(&0) {
        return true;
    }
    if let Err(e) = std::str::from_utf8(sample) {
        // A character split by the sample boundary is fine
        if e.error_len().is_some() {
            return true;
        }
    }

    // Count binary characters (0x00-0x08, 0x0E-0x1F)
    let binary_count = sample
        .iter()
        .filter(|&&b| (b < 9) || (b > 13 && b < 32))
        .count();
    binary_count as f32 / sample.len() as f32 >= 0.1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_read_whole() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "hello\n").unwrap();
        assert_eq!(
            read_content(&path, 0).unwrap(),
            FileContent::Text {
                text: "hello\n".to_string(),
                truncated: false
            }
        );
    }

    #[test]
    fn long_text_is_truncated_on_char_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        // 'é' is two bytes; a 4-byte cut lands inside the second one
        fs::write(&path, "aéé b").unwrap();
        assert_eq!(
            read_content(&path, 4).unwrap(),
            FileContent::Text {
                text: "aé".to_string(),
                truncated: true
            }
        );
    }

    #[test]
    fn exact_size_is_not_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "abcd").unwrap();
        assert!(matches!(
            read_content(&path, 4).unwrap(),
            FileContent::Text { truncated: false, .. }
        ));
    }

    #[test]
    fn binary_is_suppressed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        fs::write(&path, [0u8, 1, 2, 3, 0xff]).unwrap();
        assert_eq!(
            read_content(&path, 0).unwrap(),
            FileContent::Suppressed(Suppression::Binary)
        );
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_content(&dir.path().join("gone.txt"), 0).unwrap_err();
        assert!(matches!(err, SnapshotError::Read { .. }));
        assert!(err.to_string().contains("gone.txt"));
    }

    #[test]
    fn binary_sniffing() {
        assert!(!looks_binary(b""));
        assert!(!looks_binary(b"plain text\n\twith tabs\r\n"));
        assert!(looks_binary(b"nul\0byte"));
        assert!(looks_binary(&[0xc3, 0x28, b'a']));
        // Truncated multi-byte char at the end of the sample
        assert!(!looks_binary(&[b'a', 0xc3]));
    }
}
