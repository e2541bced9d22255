/*!
 * Output rendering for the filtered tree
 *
 * Every format is a pure function of the tree: nothing here decides what is
 * included.
 */

mod markdown;
mod record;
mod text;
mod xml;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::config::OutputFormat;
use crate::error::Result;
use crate::types::{DirectoryNode, FileContent, Node};

pub use record::{NodeRecord, NodeType};

/// Render the tree in the requested format
pub fn render(tree: &DirectoryNode, format: OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Text => Ok(text::render(tree).into_bytes()),
        OutputFormat::Markdown => Ok(markdown::render(tree).into_bytes()),
        OutputFormat::Json => {
            let mut out = serde_json::to_vec_pretty(&NodeRecord::from_directory(tree))?;
            out.push(b'\n');
            Ok(out)
        }
        OutputFormat::Yaml => Ok(serde_yaml::to_string(&NodeRecord::from_directory(tree))?.into_bytes()),
        OutputFormat::Xml => xml::render(tree),
    }
}

/// Write rendered output to a file, or stdout when `output` is `None`
pub fn write_output(bytes: &[u8], output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            writer.write_all(bytes)?;
            writer.flush()?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Display name of the scan root
pub(crate) fn root_name(tree: &DirectoryNode) -> String {
    tree.entry
        .abs_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| tree.entry.abs_path.display().to_string())
}

/// Box-drawing tree listing, root first
pub(crate) fn tree_listing(tree: &DirectoryNode) -> String {
    let mut out = format!("{}/\n", root_name(tree));
    push_children(tree, "", &mut out);
    out
}

fn push_children(dir: &DirectoryNode, prefix: &str, out: &mut String) {
    let count = dir.children.len();
    for (i, child) in dir.children.iter().enumerate() {
        let is_last = i + 1 == count;
        let connector = if is_last { "└── " } else { "├── " };
        out.push_str(prefix);
        out.push_str(connector);
        out.push_str(child.entry().name());

        match child {
            Node::Directory(sub) => {
                out.push('/');
                if let Some(error) = &sub.error {
                    out.push_str(&format!(" [error: {}]", error));
                }
                out.push('\n');
                let next = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
                push_children(sub, &next, out);
            }
            Node::File(file) => {
                match &file.content {
                    FileContent::Suppressed(why) => out.push_str(&format!(" [{}]", why.as_str())),
                    FileContent::Unreadable(_) => out.push_str(" [unreadable]"),
                    FileContent::Text { .. } => {}
                }
                out.push('\n');
            }
        }
    }
}

/// A backtick fence longer than any backtick run inside `content`
pub(crate) fn fence_for(content: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in content.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}
