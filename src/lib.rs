/*!
 * dirsnap - Snapshot a directory tree and its file contents
 *
 * This library walks a directory once, decides for every entry whether it
 * belongs in the snapshot (hidden-file policy, include/exclude globs, ignore
 * files, extension list, depth limit) and renders the surviving tree as
 * text, JSON, YAML, Markdown or XML.
 */

pub mod config;
pub mod error;
pub mod filter;
pub mod pattern;
pub mod report;
pub mod rules;
pub mod scanner;
pub mod types;
pub mod utils;
pub mod writer;


// Re-export main components for easier access
pub use config::{Config, OutputFormat};
pub use error::{Result, SnapshotError};
pub use filter::{Decision, InclusionEngine, Reason};
pub use pattern::Pattern;
pub use report::{FileReportInfo, ScanReport};
pub use rules::RuleSet;
pub use scanner::Scanner;
pub use types::{DirectoryNode, Entry, EntryKind, FileContent, FileNode, Node, Suppression};
pub use utils::format_file_size;
pub use writer::{render, write_output, NodeRecord, NodeType};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
