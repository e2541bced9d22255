/*!
 * Inclusion engine: one keep/skip decision per entry
 *
 * Checks run in a fixed order and the first decisive one wins:
 *
 * 1. the output file itself, then VCS metadata directories
 * 2. hidden entries (unless hidden files are enabled)
 * 3. include globs, which whitelist files only
 * 4. exclude globs
 * 5. ignored extensions, except for files an include glob matched
 * 6. media extensions (annotation only: content is suppressed)
 * 7. ignore rules
 * 8. depth limit
 */

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{compile_globs, normalize_extension, Config};
use crate::error::Result;
use crate::pattern::Pattern;
use crate::rules::RuleSet;
use crate::types::Entry;
use crate::utils::is_hidden;

/// Which check produced a decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// No check objected
    Included,
    /// Kept, content left out because of a media extension
    Media,
    /// The entry is the snapshot's own output file
    OutputFile,
    /// VCS metadata directory
    VcsDir,
    /// Hidden entry with hidden files disabled
    Hidden,
    /// File matched no include glob
    NotIncluded,
    /// Matched an exclude glob
    Excluded(String),
    /// Extension is in the ignore list
    IgnoredExtension(String),
    /// Ignored by an ignore rule
    IgnoreRule(String),
    /// Beyond the depth limit
    TooDeep,
    /// Directory kept but not descended because of the depth limit
    DepthLimit,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Included => f.write_str("included"),
            Reason::Media => f.write_str("media file"),
            Reason::OutputFile => f.write_str("output file"),
            Reason::VcsDir => f.write_str("vcs metadata"),
            Reason::Hidden => f.write_str("hidden"),
            Reason::NotIncluded => f.write_str("no include glob matched"),
            Reason::Excluded(glob) => write!(f, "excluded by {}", glob),
            Reason::IgnoredExtension(ext) => write!(f, "ignored extension .{}", ext),
            Reason::IgnoreRule(rule) => write!(f, "ignore rule {}", rule),
            Reason::TooDeep => f.write_str("beyond max depth"),
            Reason::DepthLimit => f.write_str("at max depth"),
        }
    }
}

/// Verdict for one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// Entry appears in the tree
    pub keep: bool,
    /// Do not descend (directories only)
    pub prune: bool,
    /// File is listed but its content is left out
    pub suppress_content: bool,
    pub reason: Reason,
}

impl Decision {
    fn keep(reason: Reason) -> Self {
        Self {
            keep: true,
            prune: false,
            suppress_content: false,
            reason,
        }
    }

    fn skip(entry: &Entry, reason: Reason) -> Self {
        Self {
            keep: false,
            prune: entry.is_dir(),
            suppress_content: false,
            reason,
        }
    }
}

/// Filtering policy compiled from a [`Config`]
#[derive(Debug, Clone)]
pub struct InclusionEngine {
    hidden: bool,
    vcs_dirs: HashSet<String>,
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
    ignore_extensions: HashSet<String>,
    max_depth: Option<usize>,
    output_file: Option<PathBuf>,
}

impl InclusionEngine {
    /// Compile the configured globs; fails with a configuration error
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            hidden: config.hidden,
            vcs_dirs: config.vcs_dirs.iter().cloned().collect(),
            include: compile_globs(&config.include, "include")?,
            exclude: compile_globs(&config.exclude, "exclude")?,
            ignore_extensions: config
                .ignore_extensions
                .iter()
                .map(|ext| normalize_extension(ext))
                .collect(),
            max_depth: config.max_depth,
            output_file: config.output.as_deref().and_then(resolve_output),
        })
    }

    /// Whether include globs restrict the file set
    pub fn has_include(&self) -> bool {
        !self.include.is_empty()
    }

    /// Decide whether `entry` is kept, given the rules in scope
    pub fn decide(&self, entry: &Entry, rules: &RuleSet) -> Decision {
        let name = entry.name();
        let path = &entry.rel_path;
        let is_dir = entry.is_dir();

        if !is_dir && self.output_file.as_deref() == Some(entry.abs_path.as_path()) {
            return Decision::skip(entry, Reason::OutputFile);
        }

        if is_dir && self.vcs_dirs.contains(name) {
            return Decision::skip(entry, Reason::VcsDir);
        }

        if !self.hidden && is_hidden(name) {
            return Decision::skip(entry, Reason::Hidden);
        }

        let whitelisted = !is_dir && self.has_include();
        if whitelisted && !self.include.iter().any(|p| p.matches(path, false)) {
            return Decision::skip(entry, Reason::NotIncluded);
        }

        if let Some(glob) = self.exclude.iter().find(|p| p.matches(path, is_dir)) {
            return Decision::skip(entry, Reason::Excluded(glob.raw().to_string()));
        }

        let extension = if is_dir || whitelisted {
            None
        } else {
            entry.extension()
        };
        if let Some(ext) = extension.filter(|ext| self.ignore_extensions.contains(ext)) {
            return Decision::skip(entry, Reason::IgnoredExtension(ext));
        }

        let media = !is_dir && entry.is_media;

        if let Some(rule) = rules.deciding_rule(path, is_dir) {
            if !rule.is_negated() {
                return Decision::skip(entry, Reason::IgnoreRule(rule.raw().to_string()));
            }
        }

        if let Some(max) = self.max_depth {
            if entry.depth > max + 1 {
                return Decision::skip(entry, Reason::TooDeep);
            }
            if is_dir && entry.depth > max {
                return Decision {
                    prune: true,
                    ..Decision::keep(Reason::DepthLimit)
                };
            }
        }

        if media {
            Decision {
                suppress_content: true,
                ..Decision::keep(Reason::Media)
            }
        } else {
            Decision::keep(Reason::Included)
        }
    }
}

/// Absolute path of the output file, even before it exists
fn resolve_output(path: &Path) -> Option<PathBuf> {
    if let Ok(abs) = fs::canonicalize(path) {
        return Some(abs);
    }
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    Some(fs::canonicalize(parent).ok()?.join(path.file_name()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::parse_rules;
    use crate::types::{file_extension, EntryKind};
    use crate::utils::is_media_extension;

    fn entry(path: &str, kind: EntryKind) -> Entry {
        let rel_path: Vec<String> = path.split('/').map(str::to_string).collect();
        let is_media = kind == EntryKind::File
            && file_extension(rel_path.last().unwrap()).is_some_and(|e| is_media_extension(&e));
        Entry {
            depth: rel_path.len(),
            abs_path: PathBuf::from("/snapshot-root").join(path),
            rel_path,
            kind,
            size: 0,
            is_symlink: false,
            is_media,
        }
    }

    fn file(path: &str) -> Entry {
        entry(path, EntryKind::File)
    }

    fn dir(path: &str) -> Entry {
        entry(path, EntryKind::Directory)
    }

    fn engine(config: Config) -> InclusionEngine {
        InclusionEngine::new(&config).unwrap()
    }

    fn rules(lines: &[&str]) -> RuleSet {
        let mut set = RuleSet::new();
        set.extend(parse_rules(lines.iter().copied(), &[]));
        set
    }

    #[test]
    fn plain_file_is_included() {
        let d = engine(Config::default()).decide(&file("src/main.rs"), &RuleSet::new());
        assert!(d.keep);
        assert!(!d.prune);
        assert!(!d.suppress_content);
        assert_eq!(d.reason, Reason::Included);
    }

    #[test]
    fn git_dir_is_pruned_even_with_hidden_enabled() {
        let e = engine(Config {
            hidden: true,
            ..Config::default()
        });
        let d = e.decide(&dir(".git"), &rules(&["!.git/"]));
        assert!(!d.keep);
        assert!(d.prune);
        assert_eq!(d.reason, Reason::VcsDir);

        // A file named .git (worktree pointer) is not VCS metadata
        assert!(e.decide(&file(".git"), &RuleSet::new()).keep);
    }

    #[test]
    fn hidden_entries_follow_policy() {
        let default = engine(Config::default());
        let d = default.decide(&dir(".cache"), &RuleSet::new());
        assert!(!d.keep);
        assert!(d.prune);
        assert_eq!(d.reason, Reason::Hidden);

        let hidden = engine(Config {
            hidden: true,
            ..Config::default()
        });
        assert!(hidden.decide(&file(".env"), &RuleSet::new()).keep);
    }

    #[test]
    fn hidden_wins_over_negated_ignore_rule() {
        let d = engine(Config::default()).decide(&file(".env"), &rules(&["!.env"]));
        assert_eq!(d.reason, Reason::Hidden);
    }

    #[test]
    fn include_globs_restrict_files_only() {
        let e = engine(Config {
            include: vec!["*.py".to_string()],
            ..Config::default()
        });
        assert!(e.decide(&file("pkg/a.py"), &RuleSet::new()).keep);
        let d = e.decide(&file("pkg/a.rs"), &RuleSet::new());
        assert_eq!(d.reason, Reason::NotIncluded);
        assert!(!d.prune);
        assert!(e.decide(&dir("pkg"), &RuleSet::new()).keep);
    }

    #[test]
    fn include_match_overrides_extension_list() {
        let e = engine(Config {
            include: vec!["*.json".to_string()],
            ignore_extensions: vec!["json".to_string(), "md".to_string()],
            ..Config::default()
        });
        // An include match overrides the extension list
        assert!(e.decide(&file("a.json"), &RuleSet::new()).keep);
        let d = e.decide(&file("b.md"), &RuleSet::new());
        assert_eq!(d.reason, Reason::NotIncluded);
    }

    #[test]
    fn exclude_applies_to_directories_and_prunes() {
        let e = engine(Config {
            exclude: vec!["build/".to_string()],
            ..Config::default()
        });
        let d = e.decide(&dir("build"), &RuleSet::new());
        assert!(!d.keep);
        assert!(d.prune);
        assert_eq!(d.reason, Reason::Excluded("build/".to_string()));
        assert!(e.decide(&file("build"), &RuleSet::new()).keep);
    }

    #[test]
    fn extension_list_is_case_insensitive() {
        let e = engine(Config {
            ignore_extensions: vec![".HTML".to_string()],
            ..Config::default()
        });
        assert!(!e.decide(&file("index.Html"), &RuleSet::new()).keep);
        assert!(e.decide(&dir("docs.html"), &RuleSet::new()).keep);
    }

    #[test]
    fn media_is_kept_with_content_suppressed() {
        let d = engine(Config::default()).decide(&file("img.png"), &RuleSet::new());
        assert!(d.keep);
        assert!(d.suppress_content);
        assert_eq!(d.reason, Reason::Media);
    }

    #[test]
    fn excluded_media_is_skipped_entirely() {
        let e = engine(Config {
            exclude: vec!["*.png".to_string()],
            ..Config::default()
        });
        let d = e.decide(&file("img.png"), &RuleSet::new());
        assert!(!d.keep);
        assert_eq!(d.reason, Reason::Excluded("*.png".to_string()));
    }

    #[test]
    fn ignored_media_is_skipped() {
        let d = engine(Config::default()).decide(&file("img.png"), &rules(&["*.png"]));
        assert!(!d.keep);
        assert_eq!(d.reason, Reason::IgnoreRule("*.png".to_string()));
    }

    #[test]
    fn ignore_rules_skip_and_prune() {
        let e = engine(Config::default());
        let set = rules(&["sub/", "*.log", "!keep.log"]);
        let d = e.decide(&dir("sub"), &set);
        assert!(!d.keep && d.prune);
        assert!(!e.decide(&file("x.log"), &set).keep);
        assert!(e.decide(&file("keep.log"), &set).keep);
    }

    #[test]
    fn depth_limit_lists_but_does_not_descend() {
        let e = engine(Config {
            max_depth: Some(0),
            ..Config::default()
        });
        let d = e.decide(&dir("sub"), &RuleSet::new());
        assert!(d.keep);
        assert!(d.prune);
        assert_eq!(d.reason, Reason::DepthLimit);
        assert!(e.decide(&file("a.py"), &RuleSet::new()).keep);

        let d = e.decide(&file("sub/b.py"), &RuleSet::new());
        assert!(!d.keep);
        assert_eq!(d.reason, Reason::TooDeep);
    }

    #[test]
    fn depth_limit_allows_within_range() {
        let e = engine(Config {
            max_depth: Some(2),
            ..Config::default()
        });
        assert!(!e.decide(&dir("a/b"), &RuleSet::new()).prune);
        assert!(e.decide(&dir("a/b/c"), &RuleSet::new()).prune);
        assert!(e.decide(&file("a/b/c.txt"), &RuleSet::new()).keep);
    }

    #[test]
    fn output_file_is_never_included() {
        let root = tempfile::tempdir().unwrap();
        let root_path = fs::canonicalize(root.path()).unwrap();
        let e = engine(Config {
            output: Some(root_path.join("snapshot.txt")),
            ..Config::default()
        });
        let mut out = file("snapshot.txt");
        out.abs_path = root_path.join("snapshot.txt");
        assert_eq!(e.decide(&out, &RuleSet::new()).reason, Reason::OutputFile);
    }
}
