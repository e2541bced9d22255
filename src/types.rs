/*!
 * Core types and data structures for the snapshot tree
 */

use std::path::PathBuf;

/// Kind of a filesystem entry; symlinks are reported as opaque files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// A filesystem node discovered during traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Path segments from the scan root; empty for the root itself
    pub rel_path: Vec<String>,
    /// Absolute path on disk
    pub abs_path: PathBuf,
    pub kind: EntryKind,
    /// Root is 0, its children 1
    pub depth: usize,
    /// Size in bytes
    pub size: u64,
    /// Symbolic link (never followed)
    pub is_symlink: bool,
    /// Media file by extension
    pub is_media: bool,
}

impl Entry {
    /// Entry for the scan root
    pub fn root(abs_path: PathBuf) -> Self {
        Self {
            rel_path: Vec::new(),
            abs_path,
            kind: EntryKind::Directory,
            depth: 0,
            size: 0,
            is_symlink: false,
            is_media: false,
        }
    }

    /// Final path segment, empty for the root
    pub fn name(&self) -> &str {
        self.rel_path.last().map(String::as_str).unwrap_or("")
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Lowercased extension after the last dot, if any
    pub fn extension(&self) -> Option<String> {
        file_extension(self.name())
    }

    /// `/`-joined relative path, `.` for the root
    pub fn display_path(&self) -> String {
        if self.rel_path.is_empty() {
            ".".to_string()
        } else {
            self.rel_path.join("/")
        }
    }
}

/// Lowercased extension of a file name; `.bashrc` has none
pub fn file_extension(name: &str) -> Option<String> {
    match name.rfind('.') {
        Some(0) | None => None,
        Some(pos) => Some(name[pos + 1..].to_lowercase()),
    }
}

/// Why a file's content is left out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suppression {
    /// Image or video by extension
    Media,
    /// Content sniffed as binary
    Binary,
    /// Symbolic link
    Symlink,
}

impl Suppression {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Media => "media",
            Self::Binary => "binary",
            Self::Symlink => "symlink",
        }
    }
}

/// Content attached to a file node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    /// UTF-8 text, possibly cut at the size limit
    Text { text: String, truncated: bool },
    /// Listed without content
    Suppressed(Suppression),
    /// Inline error marker
    Unreadable(String),
}

/// A kept file
#[derive(Debug, Clone)]
pub struct FileNode {
    pub entry: Entry,
    pub content: FileContent,
}

/// A kept directory and its kept children, in name order
#[derive(Debug, Clone)]
pub struct DirectoryNode {
    pub entry: Entry,
    pub children: Vec<Node>,
    /// Listing failure, if the directory could not be read
    pub error: Option<String>,
}

/// A generic tree node
#[derive(Debug, Clone)]
pub enum Node {
    Directory(DirectoryNode),
    File(FileNode),
}

impl Node {
    pub fn entry(&self) -> &Entry {
        match self {
            Node::Directory(dir) => &dir.entry,
            Node::File(file) => &file.entry,
        }
    }
}

impl DirectoryNode {
    /// Files in depth-first, name order
    pub fn files(&self) -> Vec<&FileNode> {
        let mut out = Vec::new();
        collect_files(self, &mut out);
        out
    }

    /// Relative paths of every node below this one
    pub fn paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        for child in &self.children {
            out.push(child.entry().display_path());
            if let Node::Directory(dir) = child {
                out.extend(dir.paths());
            }
        }
        out
    }

    /// Whether any file survives anywhere beneath this directory
    pub fn has_files(&self) -> bool {
        self.children.iter().any(|child| match child {
            Node::File(_) => true,
            Node::Directory(dir) => dir.has_files(),
        })
    }
}

fn collect_files<'a>(dir: &'a DirectoryNode, out: &mut Vec<&'a FileNode>) {
    for child in &dir.children {
        match child {
            Node::File(file) => out.push(file),
            Node::Directory(sub) => collect_files(sub, out),
        }
    }
}
