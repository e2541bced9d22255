//! Plain text output: tree listing, then one fenced block per file

use crate::types::{DirectoryNode, FileContent};
use crate::utils::format_file_size;

use super::{fence_for, tree_listing};

pub fn render(tree: &DirectoryNode) -> String {
    let mut out = String::from("Directory structure:\n");
    out.push_str(&tree_listing(tree));
    out.push_str("\nFile contents:\n");

    for file in tree.files() {
        let body = match &file.content {
            FileContent::Text { text, truncated } => {
                let mut body = text.clone();
                if !body.is_empty() && !body.ends_with('\n') {
                    body.push('\n');
                }
                if *truncated {
                    body.push_str(&format!(
                        "[... truncated, file is {}]\n",
                        format_file_size(file.entry.size)
                    ));
                }
                body
            }
            FileContent::Unreadable(message) => format!("[error: {}]\n", message),
            FileContent::Suppressed(_) => continue,
        };

        let fence = fence_for(&body);
        out.push_str(&format!("\n=== {} ===\n", file.entry.display_path()));
        out.push_str(&fence);
        out.push('\n');
        out.push_str(&body);
        out.push_str(&fence);
        out.push('\n');
    }

    out
}
