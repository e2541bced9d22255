/*!
 * XML output
 */

use std::borrow::Cow;
use std::io::{self, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{Result, SnapshotError};
use crate::types::{DirectoryNode, FileContent, FileNode, Node};

use super::root_name;

/// Render the tree as an indented XML document
pub fn render(tree: &DirectoryNode) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_document(tree, &mut writer)
        .map_err(|e| SnapshotError::Serialization(format!("XML: {}", e)))?;

    let mut out = writer.into_inner();
    out.push(b'\n');
    Ok(out)
}

fn write_document<W: Write>(tree: &DirectoryNode, writer: &mut Writer<W>) -> io::Result<()> {
    // Write XML declaration
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let root = root_name(tree);
    let mut start_tag = BytesStart::new("directory_snapshot");
    start_tag.push_attribute(("root", xml_safe(&root).as_ref()));
    writer.write_event(Event::Start(start_tag))?;

    write_directory(tree, writer)?;

    writer.write_event(Event::End(BytesEnd::new("directory_snapshot")))?;
    Ok(())
}

/// Write a directory node to XML
fn write_directory<W: Write>(dir: &DirectoryNode, writer: &mut Writer<W>) -> io::Result<()> {
    let path = dir.entry.display_path();
    let mut start_tag = BytesStart::new("directory");
    start_tag.push_attribute(("name", xml_safe(dir.entry.name()).as_ref()));
    start_tag.push_attribute(("path", xml_safe(&path).as_ref()));
    if let Some(error) = &dir.error {
        start_tag.push_attribute(("error", xml_safe(error).as_ref()));
    }

    if dir.children.is_empty() {
        return writer.write_event(Event::Empty(start_tag));
    }

    writer.write_event(Event::Start(start_tag))?;
    for node in &dir.children {
        match node {
            Node::Directory(sub) => write_directory(sub, writer)?,
            Node::File(file) => write_file(file, writer)?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new("directory")))?;

    Ok(())
}

/// Write a file node to XML
fn write_file<W: Write>(file: &FileNode, writer: &mut Writer<W>) -> io::Result<()> {
    let path = file.entry.display_path();
    let mut start_tag = BytesStart::new("file");
    start_tag.push_attribute(("name", xml_safe(file.entry.name()).as_ref()));
    start_tag.push_attribute(("path", xml_safe(&path).as_ref()));

    match &file.content {
        FileContent::Suppressed(why) => {
            start_tag.push_attribute(("suppressed", why.as_str()));
            writer.write_event(Event::Empty(start_tag))
        }
        FileContent::Text { text, truncated } => {
            if *truncated {
                start_tag.push_attribute(("truncated", "true"));
            }
            writer.write_event(Event::Start(start_tag))?;
            write_text_element("content", text, writer)?;
            writer.write_event(Event::End(BytesEnd::new("file")))
        }
        FileContent::Unreadable(message) => {
            writer.write_event(Event::Start(start_tag))?;
            write_text_element("error", message, writer)?;
            writer.write_event(Event::End(BytesEnd::new("file")))
        }
    }
}

fn write_text_element<W: Write>(name: &str, text: &str, writer: &mut Writer<W>) -> io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(&xml_safe(text))))?;
    writer.write_event(Event::End(BytesEnd::new(name)))
}

/// Replace chars XML 1.0 cannot carry, such as C0 controls, with U+FFFD
fn xml_safe(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.chars()
            .map(|c| if is_xml_char(c) { c } else { char::REPLACEMENT_CHARACTER })
            .collect(),
    )
}

fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}
