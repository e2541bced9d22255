/*!
 * Configuration handling for dirsnap
 */

use std::fmt;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, ValueEnum};
use clap_complete::Shell;

use crate::error::Result;
use crate::{ensure, pattern::Pattern};

/// Default cap on included file content (1 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_048_576;

/// Default ignore file name looked up in every directory
pub const DEFAULT_IGNORE_FILE: &str = ".gitignore";

/// Serialization format of the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Tree listing followed by fenced file contents
    #[default]
    Text,
    /// Nested JSON object per entry
    Json,
    /// Same shape as JSON, in YAML
    Yaml,
    /// Headed section per file with fenced content
    Markdown,
    /// XML document
    Xml,
}

impl OutputFormat {
    /// Guess the format from an output file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "md" | "markdown" => Some(Self::Markdown),
            "xml" => Some(Self::Xml),
            "txt" => Some(Self::Text),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Markdown => "markdown",
            Self::Xml => "xml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Command-line arguments for dirsnap
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "dirsnap",
    version = env!("CARGO_PKG_VERSION"),
    about = "Snapshot a directory tree and its file contents",
    long_about = "Renders the directory hierarchy and the contents of included files as text, JSON, YAML, Markdown or XML, honouring hidden-file policy, ignore files and include/exclude globs."
)]
pub struct Args {
    /// Root directory to snapshot
    #[clap(required_unless_present = "generate")]
    pub root: Option<PathBuf>,

    /// Output file (default: stdout)
    #[clap(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (default: inferred from the output extension, else text)
    #[clap(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Include hidden files and directories
    #[clap(short = 'H', long)]
    pub hidden: bool,

    /// File extensions (without dot) to leave out, e.g. html,json
    #[clap(short = 'e', long, num_args = 1.., value_delimiter = ',')]
    pub ignore_ext: Vec<String>,

    /// Comma-separated globs; when given, only matching files are included
    #[clap(short, long, value_delimiter = ',')]
    pub include: Vec<String>,

    /// Comma-separated globs of files and directories to leave out
    #[clap(short = 'x', long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Maximum directory depth to descend (0 = root listing only)
    #[clap(short = 'd', long)]
    pub max_depth: Option<usize>,

    /// Do not read ignore files
    #[clap(long)]
    pub no_ignore: bool,

    /// Ignore file name to look for in each directory
    #[clap(long, default_value = DEFAULT_IGNORE_FILE)]
    pub ignore_file: Vec<String>,

    /// Extra ignore file applied at the root
    #[clap(long)]
    pub ignore_path: Option<PathBuf>,

    /// Disable the built-in ignore rules
    #[clap(long)]
    pub no_default_ignores: bool,

    /// Largest amount of content included per file, in bytes (0 = unlimited)
    #[clap(long, default_value_t = DEFAULT_MAX_FILE_SIZE)]
    pub max_file_size: u64,

    /// No progress spinner and no summary report
    #[clap(short, long)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[clap(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Root directory to snapshot
    pub root: PathBuf,

    /// Output file; `None` writes to stdout
    pub output: Option<PathBuf>,

    /// Output format
    pub format: OutputFormat,

    /// Whether hidden entries are included
    pub hidden: bool,

    /// Extensions to leave out (lowercase, no dot)
    pub ignore_extensions: Vec<String>,

    /// File whitelist globs (if empty, include all)
    pub include: Vec<String>,

    /// Exclusion globs
    pub exclude: Vec<String>,

    /// Maximum descent depth; `None` is unbounded
    pub max_depth: Option<usize>,

    /// Whether ignore files are read while descending
    pub respect_ignore_files: bool,

    /// Ignore file names looked up in each directory
    pub ignore_file_names: Vec<String>,

    /// Extra ignore file applied at the root
    pub ignore_path: Option<PathBuf>,

    /// Whether the built-in ignore rules apply
    pub default_ignores: bool,

    /// VCS metadata directories that are always skipped
    pub vcs_dirs: Vec<String>,

    /// Content cap per file in bytes, 0 for unlimited
    pub max_file_size: u64,

    /// Suppress progress and report output
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            output: None,
            format: OutputFormat::default(),
            hidden: false,
            ignore_extensions: Vec::new(),
            include: Vec::new(),
            exclude: Vec::new(),
            max_depth: None,
            respect_ignore_files: true,
            ignore_file_names: vec![DEFAULT_IGNORE_FILE.to_string()],
            ignore_path: None,
            default_ignores: true,
            vcs_dirs: vec![".git".to_string()],
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            quiet: false,
        }
    }
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Self {
        let format = args
            .format
            .or_else(|| args.output.as_deref().and_then(OutputFormat::from_path))
            .unwrap_or_default();

        Self {
            root: args.root.unwrap_or_else(|| PathBuf::from(".")),
            output: args.output,
            format,
            hidden: args.hidden,
            ignore_extensions: args.ignore_ext.iter().map(|e| normalize_extension(e)).collect(),
            include: args.include,
            exclude: args.exclude,
            max_depth: args.max_depth,
            respect_ignore_files: !args.no_ignore,
            ignore_file_names: args.ignore_file,
            ignore_path: args.ignore_path,
            default_ignores: !args.no_default_ignores,
            max_file_size: args.max_file_size,
            quiet: args.quiet,
            ..Self::default()
        }
    }

    /// Validate the configuration before any traversal
    pub fn validate(&self) -> Result<()> {
        compile_globs(&self.include, "include")?;
        compile_globs(&self.exclude, "exclude")?;

        for ext in &self.ignore_extensions {
            ensure!(
                !normalize_extension(ext).is_empty(),
                Config,
                "empty extension in ignore list"
            );
        }

        for name in &self.ignore_file_names {
            ensure!(
                !name.is_empty() && !name.contains('/'),
                Config,
                "ignore file name must be a plain file name: {:?}",
                name
            );
        }

        // Check if output file directory exists
        if let Some(parent) = self.output.as_deref().and_then(Path::parent) {
            ensure!(
                parent.as_os_str().is_empty() || parent.is_dir(),
                Config,
                "Output directory not found: {}",
                parent.display()
            );
        }

        // Check if custom ignore file exists
        if let Some(path) = &self.ignore_path {
            ensure!(
                path.is_file(),
                Config,
                "Custom ignore file not found: {}",
                path.display()
            );
        }

        Ok(())
    }
}

/// Lowercase and strip leading dots, so `.HTML` and `html` agree
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// Parse include/exclude globs, rejecting ones that cannot match anything
pub fn compile_globs(globs: &[String], flag: &str) -> Result<Vec<Pattern>> {
    globs
        .iter()
        .map(|glob| {
            ensure!(
                !glob.trim().starts_with('!'),
                Config,
                "negated {} glob is not supported: {}",
                flag,
                glob
            );
            Pattern::parse_glob(glob)
                .ok_or_else(|| crate::error!(Config, "empty {} glob: {:?}", flag, glob))
        })
        .collect()
}
