/*!
 * Reporting functionality for dirsnap
 *
 * Summarises a finished snapshot using the tabled library. The report is
 * derived from the filtered tree and never re-decides inclusion.
 */

use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::types::{DirectoryNode, FileContent, Node};

/// Number of largest files listed in the report
const TOP_FILES: usize = 10;

/// Information about a file in the report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileReportInfo {
    /// Relative path
    pub path: String,
    /// Number of lines in the included content
    pub lines: usize,
    /// Number of characters in the included content
    pub chars: usize,
}

/// Statistics for a snapshot
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Output destination label
    pub output: String,
    /// Time taken to scan and write
    pub duration: Duration,
    /// Number of directories listed, root excluded
    pub directories: usize,
    /// Number of files listed
    pub files: usize,
    /// Files listed without content
    pub suppressed: usize,
    /// Files whose content could not be read
    pub unreadable: usize,
    /// Files whose content was cut at the size limit
    pub truncated: usize,
    /// Total number of lines
    pub total_lines: usize,
    /// Total number of characters
    pub total_chars: usize,
    /// Details for each file with content
    pub file_details: Vec<FileReportInfo>,
}

impl ScanReport {
    /// Collect statistics from a filtered tree
    pub fn from_tree(tree: &DirectoryNode, output: impl Into<String>, duration: Duration) -> Self {
        let mut report = Self {
            output: output.into(),
            duration,
            ..Self::default()
        };
        report.visit(tree);
        report
    }

    fn visit(&mut self, dir: &DirectoryNode) {
        for child in &dir.children {
            match child {
                Node::Directory(sub) => {
                    self.directories += 1;
                    self.visit(sub);
                }
                Node::File(file) => {
                    self.files += 1;
                    match &file.content {
                        FileContent::Text { text, truncated } => {
                            let info = FileReportInfo {
                                path: file.entry.display_path(),
                                lines: text.lines().count(),
                                chars: text.chars().count(),
                            };
                            self.total_lines += info.lines;
                            self.total_chars += info.chars;
                            self.truncated += usize::from(*truncated);
                            self.file_details.push(info);
                        }
                        FileContent::Suppressed(_) => self.suppressed += 1,
                        FileContent::Unreadable(_) => self.unreadable += 1,
                    }
                }
            }
        }
    }

    /// Rough token estimate, four characters per token
    pub fn estimated_tokens(&self) -> usize {
        self.total_chars / 4
    }
}

/// Format a number with human-readable units
fn format_number(num: usize) -> String {
    if num >= 1_000_000 {
        format!("{:.1}M", num as f64 / 1_000_000.0)
    } else if num >= 1_000 {
        format!("{:.1}K", num as f64 / 1_000.0)
    } else {
        num.to_string()
    }
}

// Create a summary table using the tabled crate
fn summary_table(report: &ScanReport) -> String {
    #[derive(Tabled)]
    struct SummaryRow {
        #[tabled(rename = "Metric")]
        key: &'static str,

        #[tabled(rename = "Value")]
        value: String,
    }

    let rows = vec![
        SummaryRow {
            key: "Output",
            value: report.output.clone(),
        },
        SummaryRow {
            key: "Process Time",
            value: format!("{:.4?}", report.duration),
        },
        SummaryRow {
            key: "Directories",
            value: format_number(report.directories),
        },
        SummaryRow {
            key: "Files",
            value: format_number(report.files),
        },
        SummaryRow {
            key: "Without Content",
            value: format_number(report.suppressed),
        },
        SummaryRow {
            key: "Truncated",
            value: format_number(report.truncated),
        },
        SummaryRow {
            key: "Read Errors",
            value: format_number(report.unreadable),
        },
        SummaryRow {
            key: "Total Lines",
            value: format_number(report.total_lines),
        },
        SummaryRow {
            key: "Total Characters",
            value: format_number(report.total_chars),
        },
        SummaryRow {
            key: "LLM Tokens",
            value: format!("{} (estimated)", format_number(report.estimated_tokens())),
        },
    ];

    styled(Table::new(rows))
}

// Create a files table using the tabled crate
fn files_table(report: &ScanReport) -> String {
    #[derive(Tabled)]
    struct FileRow {
        #[tabled(rename = "File Path")]
        path: String,

        #[tabled(rename = "Lines")]
        lines: String,

        #[tabled(rename = "Est. Tokens")]
        tokens: String,
    }

    let mut files: Vec<_> = report.file_details.iter().collect();
    files.sort_by(|a, b| b.chars.cmp(&a.chars).then_with(|| a.path.cmp(&b.path)));

    let rows: Vec<FileRow> = files
        .into_iter()
        .take(TOP_FILES)
        .map(|info| FileRow {
            path: info.path.clone(),
            lines: format_number(info.lines),
            tokens: format_number(info.chars / 4),
        })
        .collect();

    styled(Table::new(rows))
}

fn styled(mut table: Table) -> String {
    table
        .with(Style::rounded())
        .with(Padding::new(1, 1, 0, 0))
        .with(Modify::new(Columns::new(..)).with(Alignment::left()));
    table.to_string()
}

/// Render the full report: largest files first, then the summary
pub fn generate_report(report: &ScanReport) -> String {
    let files_title = if report.file_details.len() > TOP_FILES {
        "LARGEST FILES BY CHARACTER COUNT"
    } else {
        "PROCESSED FILES"
    };

    format!(
        "{}\n{}\n\n{}\n{}",
        files_title,
        files_table(report),
        "SNAPSHOT COMPLETE",
        summary_table(report)
    )
}

/// Print the report to stderr, keeping stdout for the snapshot
pub fn print_report(report: &ScanReport) {
    eprintln!("\n{}", generate_report(report));
}
