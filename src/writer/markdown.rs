//! Markdown output
//!
//! The tree goes into a fenced `text` block under `## Structure`; each file
//! with content gets its own `###` section with a fence tagged by extension.

use crate::types::{DirectoryNode, FileContent};
use crate::utils::format_file_size;

use super::{fence_for, root_name, tree_listing};

pub fn render(tree: &DirectoryNode) -> String {
    let mut out = format!("# {}\n\n## Structure\n\n```text\n", root_name(tree));
    out.push_str(&tree_listing(tree));
    out.push_str("```\n\n## Files\n");

    for file in tree.files() {
        let path = file.entry.display_path();
        match &file.content {
            FileContent::Text { text, truncated } => {
                let fence = fence_for(text);
                let lang = file.entry.extension().unwrap_or_default();
                out.push_str(&format!("\n### `{}`\n\n{}{}\n", path, fence, lang));
                out.push_str(text);
                if !text.is_empty() && !text.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str(&fence);
                out.push('\n');
                if *truncated {
                    out.push_str(&format!(
                        "\n> Truncated: file is {}.\n",
                        format_file_size(file.entry.size)
                    ));
                }
            }
            FileContent::Unreadable(message) => {
                out.push_str(&format!("\n### `{}`\n\n> Error: {}\n", path, message));
            }
            FileContent::Suppressed(_) => {}
        }
    }

    out
}
