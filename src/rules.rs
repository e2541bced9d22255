/*!
 * Ordered ignore rules with directory-scoped inheritance
 */

use std::fs;
use std::path::Path;

use crate::error::{Result, SnapshotError};
use crate::pattern::Pattern;
use crate::utils::DEFAULT_IGNORE;

/// Position in the rule list to restore when leaving a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeMark(usize);

/// Ordered rules; the last matching rule decides.
///
/// The scanner owns one `RuleSet` for the whole walk and uses
/// [`RuleSet::mark`] / [`RuleSet::restore`] around each directory so rules
/// read in a subtree never reach its siblings.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Pattern>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rule set seeded with the built-in defaults
    pub fn with_defaults() -> Self {
        let mut set = Self::new();
        set.extend(parse_rules(DEFAULT_IGNORE.iter().copied(), &[]));
        set
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn extend(&mut self, patterns: impl IntoIterator<Item = Pattern>) {
        self.rules.extend(patterns);
    }

    pub fn mark(&self) -> ScopeMark {
        ScopeMark(self.rules.len())
    }

    /// Drop every rule appended since `mark`
    pub fn restore(&mut self, mark: ScopeMark) {
        self.rules.truncate(mark.0);
    }

    /// Read an ignore file whose rules are relative to `origin`
    pub fn load_file(&mut self, path: &Path, origin: &[String]) -> Result<usize> {
        let text = fs::read_to_string(path).map_err(|source| SnapshotError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let before = self.rules.len();
        self.extend(parse_rules(text.lines(), origin));
        Ok(self.rules.len() - before)
    }

    /// Whether the last rule matching `path` ignores it
    pub fn is_ignored<S: AsRef<str>>(&self, path: &[S], is_dir: bool) -> bool {
        self.rules
            .iter()
            .rev()
            .find(|rule| rule.matches(path, is_dir))
            .is_some_and(|rule| !rule.is_negated())
    }

    /// The rule that decides `path`, if any
    pub fn deciding_rule<S: AsRef<str>>(&self, path: &[S], is_dir: bool) -> Option<&Pattern> {
        self.rules.iter().rev().find(|rule| rule.matches(path, is_dir))
    }
}

/// Parse ignore-file lines, dropping blanks and comments
pub fn parse_rules<'a>(
    lines: impl IntoIterator<Item = &'a str>,
    origin: &[String],
) -> Vec<Pattern> {
    lines
        .into_iter()
        .filter_map(|line| Pattern::parse(line, origin))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn path(p: &str) -> Vec<String> {
        p.split('/').map(str::to_string).collect()
    }

    fn rules(lines: &str) -> RuleSet {
        let mut set = RuleSet::new();
        set.extend(parse_rules(lines.lines(), &[]));
        set
    }

    #[test]
    fn no_match_means_not_ignored() {
        let set = rules("*.log");
        assert!(!set.is_ignored(&path("main.rs"), false));
        assert!(!RuleSet::new().is_ignored(&path("main.rs"), false));
    }

    #[test]
    fn last_matching_rule_wins() {
        let set = rules("*.txt\n!keep.txt");
        assert!(set.is_ignored(&path("drop.txt"), false));
        assert!(!set.is_ignored(&path("keep.txt"), false));

        let reversed = rules("!keep.txt\n*.txt");
        assert!(reversed.is_ignored(&path("keep.txt"), false));
    }

    #[test]
    fn deciding_rule_reports_the_match() {
        let set = rules("*.txt\n!keep.txt");
        let rule = set.deciding_rule(&path("keep.txt"), false).unwrap();
        assert_eq!(rule.raw(), "!keep.txt");
        assert!(set.deciding_rule(&path("a.rs"), false).is_none());
    }

    #[test]
    fn comments_and_blanks_are_skipped() {
        let set = rules("# comment\n\n   \n*.o\n");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn restore_drops_subtree_rules() {
        let mut set = rules("*.log");
        let mark = set.mark();
        set.extend(parse_rules(["*.tmp"], &path("sub")));
        assert!(set.is_ignored(&path("sub/a.tmp"), false));

        set.restore(mark);
        assert_eq!(set.len(), 1);
        assert!(!set.is_ignored(&path("sub/a.tmp"), false));
        assert!(set.is_ignored(&path("sub/a.log"), false));
    }

    #[test]
    fn nested_rules_only_apply_under_their_origin() {
        let mut set = RuleSet::new();
        set.extend(parse_rules(["*.gen"], &path("a")));
        assert!(set.is_ignored(&path("a/x.gen"), false));
        assert!(!set.is_ignored(&path("b/x.gen"), false));
    }

    #[test]
    fn nested_negation_overrides_inherited_rule() {
        let mut set = rules("*.json");
        set.extend(parse_rules(["!package.json"], &path("web")));
        assert!(!set.is_ignored(&path("web/package.json"), false));
        assert!(set.is_ignored(&path("package.json"), false));
    }

    #[test]
    fn defaults_can_be_negated_by_later_rules() {
        let mut set = RuleSet::with_defaults();
        assert!(set.is_ignored(&path("node_modules"), true));
        set.extend(parse_rules(["!node_modules/"], &[]));
        assert!(!set.is_ignored(&path("node_modules"), true));
    }

    #[test]
    fn load_file_reads_patterns() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(".gitignore");
        let mut f = fs::File::create(&file).unwrap();
        writeln!(f, "# generated\n/dist/\n*.bak").unwrap();

        let mut set = RuleSet::new();
        assert_eq!(set.load_file(&file, &[]).unwrap(), 2);
        assert!(set.is_ignored(&path("dist"), true));
        assert!(set.is_ignored(&path("x/y.bak"), false));
    }

    #[test]
    fn load_file_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut set = RuleSet::new();
        let err = set.load_file(&dir.path().join("nope"), &[]).unwrap_err();
        assert!(matches!(err, SnapshotError::Read { .. }));
    }
}
