/*!
 * Glob patterns as found in ignore files and include/exclude flags
 *
 * Matching is done segment by segment over the relative path, so `*` never
 * crosses a `/` and `**` consumes whole segments.
 */

/// One token of a single-segment glob
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(char),
    /// `?`
    AnyChar,
    /// `*`
    Star,
    /// `[...]`, `[!...]`
    Class {
        negated: bool,
        ranges: Vec<(char, char)>,
    },
}

impl Token {
    fn matches_char(&self, c: char) -> bool {
        match self {
            Token::Literal(l) => *l == c,
            Token::AnyChar => true,
            Token::Star => false,
            Token::Class { negated, ranges } => {
                let hit = ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi);
                hit != *negated
            }
        }
    }
}

/// One `/`-separated piece of a pattern
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// `**`: zero or more whole path segments
    AnyDepth,
    Glob(Vec<Token>),
}

/// A single parsed glob rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    negated: bool,
    dir_only: bool,
    anchored: bool,
    origin: Vec<String>,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Parse one ignore-file line. `origin` is the directory holding the
    /// ignore file, as segments relative to the scan root.
    ///
    /// Blank lines, comments and patterns that reduce to nothing yield `None`.
    pub fn parse(line: &str, origin: &[String]) -> Option<Self> {
        let raw = trim_unescaped_end(line);
        if raw.is_empty() || raw.starts_with('#') {
            return None;
        }

        let mut body = raw;
        let negated = body.starts_with('!');
        if negated {
            body = &body[1..];
        }
        // `\#` and `\!` keep their literal meaning
        if body.starts_with("\\#") || body.starts_with("\\!") {
            body = &body[1..];
        }

        let dir_only = body.ends_with('/');
        let body = body.trim_end_matches('/');
        let anchored = body.starts_with('/');
        let body = body.trim_start_matches('/');
        if body.is_empty() {
            return None;
        }

        let segments = body
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s == "**" {
                    Segment::AnyDepth
                } else {
                    Segment::Glob(tokenize(s))
                }
            })
            .collect();

        Some(Self {
            raw: raw.to_string(),
            negated,
            dir_only,
            anchored,
            origin: origin.to_vec(),
            segments,
        })
    }

    /// Parse a command-line glob, rooted at the scan root
    pub fn parse_glob(glob: &str) -> Option<Self> {
        Self::parse(glob, &[])
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn is_dir_only(&self) -> bool {
        self.dir_only
    }

    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    /// Test the pattern against a path relative to the scan root.
    ///
    /// Negation is not applied here; it only matters to the rule set.
    pub fn matches<S: AsRef<str>>(&self, path: &[S], is_dir: bool) -> bool {
        if self.segments.is_empty() || (self.dir_only && !is_dir) {
            return false;
        }
        if path.len() < self.origin.len()
            || !self
                .origin
                .iter()
                .zip(path)
                .all(|(o, p)| o.as_str() == p.as_ref())
        {
            return false;
        }

        let rest: Vec<&str> = path[self.origin.len()..]
            .iter()
            .map(|s| s.as_ref())
            .collect();
        if rest.is_empty() {
            return false;
        }

        let last_start = if self.anchored { 0 } else { rest.len() - 1 };
        let mut memo = vec![None::<bool>; (self.segments.len() + 1) * (rest.len() + 1)];
        (0..=last_start).any(|start| match_segments(&self.segments, &rest, 0, start, &mut memo))
    }
}

/// Match `pattern[p..]` against `path[s..]`.
///
/// `memo` holds one slot per `(p, s)` pair so `**` backtracking stays
/// polynomial in the number of segments.
fn match_segments(
    pattern: &[Segment],
    path: &[&str],
    p: usize,
    s: usize,
    memo: &mut [Option<bool>],
) -> bool {
    let key = p * (path.len() + 1) + s;
    if let Some(hit) = memo[key] {
        return hit;
    }

    let hit = match pattern.get(p) {
        None => s == path.len(),
        Some(Segment::AnyDepth) => {
            // A trailing `**` only matches inside its parent, never the parent itself
            let min = s + usize::from(p + 1 == pattern.len());
            (min..=path.len()).any(|next| match_segments(pattern, path, p + 1, next, memo))
        }
        Some(Segment::Glob(tokens)) => match path.get(s) {
            Some(name) => {
                match_tokens(tokens, name) && match_segments(pattern, path, p + 1, s + 1, memo)
            }
            None => false,
        },
    };

    memo[key] = Some(hit);
    hit
}

/// Trim trailing whitespace unless its first char is escaped with a backslash
fn trim_unescaped_end(line: &str) -> &str {
    let trimmed = line.trim_end();
    let Some(first) = line[trimmed.len()..].chars().next() else {
        return trimmed;
    };
    let backslashes = trimmed.chars().rev().take_while(|&c| c == '\\').count();
    if backslashes % 2 == 1 {
        &line[..trimmed.len() + first.len_utf8()]
    } else {
        trimmed
    }
}

/// Single-segment glob match with star backtracking
fn match_tokens(tokens: &[Token], name: &str) -> bool {
    let chars: Vec<char> = name.chars().collect();
    let (mut t, mut n) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while n < chars.len() {
        match tokens.get(t) {
            Some(Token::Star) => {
                backtrack = Some((t, n));
                t += 1;
            }
            Some(token) if token.matches_char(chars[n]) => {
                t += 1;
                n += 1;
            }
            _ => match backtrack {
                Some((star, resume)) => {
                    t = star + 1;
                    n = resume + 1;
                    backtrack = Some((star, resume + 1));
                }
                None => return false,
            },
        }
    }

    tokens[t..].iter().all(|token| *token == Token::Star)
}

fn tokenize(segment: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = segment.chars();

    while let Some(c) = chars.next() {
        match c {
            '*' => {
                // `**` inside a segment behaves like `*`
                if tokens.last() != Some(&Token::Star) {
                    tokens.push(Token::Star);
                }
            }
            '?' => tokens.push(Token::AnyChar),
            '\\' => tokens.push(Token::Literal(chars.next().unwrap_or('\\'))),
            '[' => {
                let rest: String = chars.clone().collect();
                match parse_class(&rest) {
                    Some((token, consumed)) => {
                        tokens.push(token);
                        for _ in 0..consumed {
                            chars.next();
                        }
                    }
                    None => tokens.push(Token::Literal('[')),
                }
            }
            other => tokens.push(Token::Literal(other)),
        }
    }

    tokens
}

/// Parse the body of a `[...]` class; returns the token and the number of
/// chars consumed after the opening bracket, including the closing one.
fn parse_class(body: &str) -> Option<(Token, usize)> {
    let chars: Vec<char> = body.chars().collect();
    let mut i = 0;
    let negated = matches!(chars.first(), Some('!') | Some('^'));
    if negated {
        i += 1;
    }

    let mut ranges = Vec::new();
    let mut first = true;
    while i < chars.len() {
        let c = chars[i];
        if c == ']' && !first {
            return Some((Token::Class { negated, ranges }, i + 1));
        }
        first = false;
        if i + 2 < chars.len() && chars[i + 1] == '-' && chars[i + 2] != ']' {
            ranges.push((c, chars[i + 2]));
            i += 3;
        } else {
            ranges.push((c, c));
            i += 1;
        }
    }
    None
}
