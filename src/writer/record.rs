//! Serde shape shared by the JSON and YAML outputs

use serde::{Deserialize, Serialize};

use crate::types::{DirectoryNode, FileContent, FileNode, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    File,
    Directory,
}

/// One entry of the structured output, nested through `children`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NodeRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncated: Option<bool>,
    /// Why the content is absent (`media`, `binary`, `symlink`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suppressed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NodeRecord {
    pub fn from_directory(dir: &DirectoryNode) -> Self {
        Self {
            path: dir.entry.display_path(),
            kind: NodeType::Directory,
            children: Some(
                dir.children
                    .iter()
                    .map(|child| match child {
                        Node::Directory(sub) => Self::from_directory(sub),
                        Node::File(file) => Self::from_file(file),
                    })
                    .collect(),
            ),
            content: None,
            truncated: None,
            suppressed: None,
            error: dir.error.clone(),
        }
    }

    pub fn from_file(file: &FileNode) -> Self {
        let mut record = Self {
            path: file.entry.display_path(),
            kind: NodeType::File,
            children: None,
            content: None,
            truncated: None,
            suppressed: None,
            error: None,
        };
        match &file.content {
            FileContent::Text { text, truncated } => {
                record.content = Some(text.clone());
                record.truncated = truncated.then_some(true);
            }
            FileContent::Suppressed(why) => record.suppressed = Some(why.as_str().to_string()),
            FileContent::Unreadable(message) => record.error = Some(message.clone()),
        }
        record
    }
}
