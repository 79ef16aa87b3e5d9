//! `.gitignore` pattern compiler and matcher.
//!
//! Each non-blank, non-comment line becomes one rule. Wildmatch syntax:
//! `?` matches one byte except `/`; `*` matches any run of bytes except `/`;
//! `**` crosses directory boundaries when it stands alone between slashes
//! (or at the start/end of the pattern); `[...]` character classes support
//! `[!...]` negation; a backslash escapes the following character.
//!
//! Evaluation is last-match-wins over the rule list. A leading `!` negates
//! (un-ignores), a trailing `/` restricts the rule to directories, and a
//! slash anywhere else anchors the pattern to the repository root. Files
//! inside an ignored directory stay ignored regardless of later negations,
//! matching Git's precedence.

use regex::Regex;
use std::path::Path;

const IGNORE_FILE: &str = ".gitignore";

#[derive(Debug)]
struct IgnoreRule {
    regex: Regex,
    negated: bool,
    dir_only: bool,
}

/// The compiled rule list for one repository, built once per command.
#[derive(Debug, Default)]
pub struct IgnoreRules {
    rules: Vec<IgnoreRule>,
}

impl IgnoreRules {
    /// Read and compile `.gitignore` at the repository root. A missing file
    /// yields an empty rule set; unparsable lines are skipped.
    pub fn load(repo_root: &Path) -> anyhow::Result<Self> {
        let ignore_file = repo_root.join(IGNORE_FILE);
        if !ignore_file.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&ignore_file)?;
        Ok(Self::parse(&content))
    }

    pub fn parse(content: &str) -> Self {
        let rules = content
            .lines()
            .filter_map(compile_line)
            .collect::<Vec<_>>();
        IgnoreRules { rules }
    }

    /// Decide whether a repo-relative path (with `/` separators) is ignored.
    pub fn is_ignored(&self, path: &str, is_dir: bool) -> bool {
        if self.rules.is_empty() || path.is_empty() {
            return false;
        }

        // an ignored ancestor directory ignores the whole subtree
        for (i, byte) in path.bytes().enumerate() {
            if byte == b'/' && self.decide(&path[..i], true) == Some(true) {
                return true;
            }
        }

        self.decide(path, is_dir).unwrap_or(false)
    }

    fn decide(&self, path: &str, is_dir: bool) -> Option<bool> {
        let mut decision = None;
        for rule in &self.rules {
            if rule.dir_only && !is_dir {
                continue;
            }
            if rule.regex.is_match(path) {
                decision = Some(!rule.negated);
            }
        }
        decision
    }
}

fn compile_line(line: &str) -> Option<IgnoreRule> {
    let line = line.trim_end();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (negated, pattern) = match line.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, line),
    };

    let (dir_only, pattern) = match pattern.strip_suffix('/') {
        Some(rest) => (true, rest),
        None => (false, pattern),
    };
    if pattern.is_empty() {
        return None;
    }

    // a slash anywhere (now that a trailing one is stripped) anchors the
    // pattern to the repo root; otherwise it matches at any depth
    let anchored = pattern.contains('/');
    let pattern = pattern.strip_prefix('/').unwrap_or(pattern);

    let body = translate_wildmatch(pattern)?;
    let prefix = if anchored { "" } else { "(?:.*/)?" };
    let regex = Regex::new(&format!("^{prefix}{body}$")).ok()?;

    Some(IgnoreRule {
        regex,
        negated,
        dir_only,
    })
}

/// Translate one wildmatch pattern into a regex body.
fn translate_wildmatch(pattern: &str) -> Option<String> {
    let chars = pattern.chars().collect::<Vec<_>>();
    let mut out = String::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => {
                let double = chars.get(i + 1) == Some(&'*');
                let at_start = i == 0 || chars.get(i.wrapping_sub(1)) == Some(&'/');
                if double && at_start && chars.get(i + 2) == Some(&'/') {
                    // "**/": any chain of complete components
                    out.push_str("(?:[^/]+/)*");
                    i += 3;
                } else if double && at_start && i + 2 == chars.len() {
                    // trailing "/**" or a bare "**": everything beneath
                    out.push_str(".*");
                    i += 2;
                } else {
                    // plain '*' (and "**" not on a component boundary)
                    out.push_str("[^/]*");
                    i += if double { 2 } else { 1 };
                }
            }
            '?' => {
                out.push_str("[^/]");
                i += 1;
            }
            '[' => {
                let (class, consumed) = translate_class(&chars[i..])?;
                out.push_str(&class);
                i += consumed;
            }
            '\\' => {
                let next = chars.get(i + 1)?;
                out.push_str(&regex::escape(&next.to_string()));
                i += 2;
            }
            other => {
                out.push_str(&regex::escape(&other.to_string()));
                i += 1;
            }
        }
    }

    Some(out)
}

/// Translate a `[...]` class starting at `chars[0] == '['`; returns the
/// regex fragment and the number of pattern chars consumed.
fn translate_class(chars: &[char]) -> Option<(String, usize)> {
    let mut out = String::from("[");
    let mut i = 1;

    if chars.get(i) == Some(&'!') {
        out.push('^');
        i += 1;
    }

    let mut closed = false;
    let mut first = true;
    while i < chars.len() {
        let c = chars[i];
        if c == ']' && !first {
            closed = true;
            i += 1;
            break;
        }
        match c {
            '\\' => {
                let next = chars.get(i + 1)?;
                out.push('\\');
                out.push(*next);
                i += 2;
            }
            '^' | '[' => {
                out.push('\\');
                out.push(c);
                i += 1;
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
        first = false;
    }

    if !closed {
        return None;
    }
    out.push(']');
    Some((out, i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn rules(content: &str) -> IgnoreRules {
        IgnoreRules::parse(content)
    }

    #[rstest]
    #[case("a.log", true)]
    #[case("keep.log", false)]
    #[case("sub/a.log", true)]
    #[case("sub/keep.log", false)]
    fn negation_wins_as_last_match(#[case] path: &str, #[case] ignored: bool) {
        let rules = rules("*.log\n!keep.log\n");
        assert_eq!(rules.is_ignored(path, false), ignored);
    }

    #[test]
    fn question_mark_matches_one_byte_but_not_slash() {
        let rules = rules("a?c\n");
        assert!(rules.is_ignored("abc", false));
        assert!(!rules.is_ignored("abbc", false));
        assert!(!rules.is_ignored("a/c", false));
    }

    #[test]
    fn star_does_not_cross_directories() {
        let rules = rules("src/*.rs\n");
        assert!(rules.is_ignored("src/lib.rs", false));
        assert!(!rules.is_ignored("src/nested/lib.rs", false));
    }

    #[test]
    fn double_star_crosses_directories() {
        let rules = rules("logs/**/debug.log\n");
        assert!(rules.is_ignored("logs/debug.log", false));
        assert!(rules.is_ignored("logs/a/debug.log", false));
        assert!(rules.is_ignored("logs/a/b/debug.log", false));
        assert!(!rules.is_ignored("other/debug.log", false));
    }

    #[test]
    fn leading_double_star_matches_any_prefix() {
        let rules = rules("**/build\n");
        assert!(rules.is_ignored("build", true));
        assert!(rules.is_ignored("a/b/build", true));
    }

    #[test]
    fn trailing_double_star_matches_whole_subtree() {
        let rules = rules("target/**\n");
        assert!(rules.is_ignored("target/debug", false));
        assert!(rules.is_ignored("target/debug/deps/x.o", false));
        assert!(!rules.is_ignored("target", false));
    }

    #[test]
    fn anchored_pattern_only_matches_at_root() {
        let rules = rules("/todo.txt\n");
        assert!(rules.is_ignored("todo.txt", false));
        assert!(!rules.is_ignored("docs/todo.txt", false));
    }

    #[test]
    fn dir_only_rule_ignores_directory_contents() {
        let rules = rules("build/\n");
        assert!(rules.is_ignored("build", true));
        assert!(rules.is_ignored("build/out.txt", false));
        assert!(!rules.is_ignored("build", false)); // a plain file named build
    }

    #[test]
    fn negation_cannot_rescue_file_in_ignored_directory() {
        let rules = rules("build/\n!build/keep.log\n");
        assert!(rules.is_ignored("build/keep.log", false));
    }

    #[test]
    fn character_classes_and_negated_classes() {
        let rules1 = rules("file[0-9].txt\n");
        assert!(rules1.is_ignored("file3.txt", false));
        assert!(!rules1.is_ignored("filex.txt", false));

        let rules2 = rules("file[!0-9].txt\n");
        assert!(rules2.is_ignored("filex.txt", false));
        assert!(!rules2.is_ignored("file3.txt", false));
    }

    #[test]
    fn backslash_escapes_metacharacters() {
        let rules = rules("\\*.txt\n");
        assert!(rules.is_ignored("*.txt", false));
        assert!(!rules.is_ignored("a.txt", false));
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let rules = rules("# noise\n\n*.tmp\n");
        assert!(rules.is_ignored("x.tmp", false));
        assert!(!rules.is_ignored("# noise", false));
    }
}
