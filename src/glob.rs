//! Path, branch and tag pattern matching.
//!
//! Only `*` and `**` are wildcards: `*` matches within one path segment,
//! `**` matches any number of whole segments. Every other character is
//! literal. Matching is case-sensitive and anchored at both ends. A pattern
//! that fails to compile matches nothing.

use globset::{GlobBuilder, GlobMatcher};

/// Characters globset would treat as syntax that must stay literal here.
const LITERAL_SPECIALS: &[char] = &['?', '[', ']', '{', '}', '\\', '!'];

/// Compile one pattern, escaping everything except `*`.
fn compile(pattern: &str) -> Result<GlobMatcher, globset::Error> {
    let mut escaped = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if LITERAL_SPECIALS.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    GlobBuilder::new(&escaped)
        .literal_separator(true)
        .backslash_escape(true)
        .build()
        .map(|g| g.compile_matcher())
}

/// Match a single candidate against a single pattern.
pub fn match_glob(pattern: &str, candidate: &str) -> bool {
    match compile(pattern) {
        Ok(m) => m.is_match(candidate),
        Err(e) => {
            log::warn!("invalid glob pattern {pattern:?}: {e}");
            false
        }
    }
}

/// A list of compiled patterns from a trigger field such as `paths`.
///
/// Remembers whether the field was declared at all, so an include list
/// whose only pattern is malformed still matches nothing instead of
/// falling back to "match all".
#[derive(Debug, Clone, Default)]
pub struct PatternList {
    declared: bool,
    matchers: Vec<GlobMatcher>,
    errors: Vec<String>,
}

impl PatternList {
    pub fn new(patterns: &[String]) -> Self {
        let mut matchers = Vec::with_capacity(patterns.len());
        let mut errors = Vec::new();
        for pattern in patterns {
            match compile(pattern) {
                Ok(m) => matchers.push(m),
                Err(e) => errors.push(format!("invalid glob pattern {pattern:?}: {e}")),
            }
        }
        Self {
            declared: !patterns.is_empty(),
            matchers,
            errors,
        }
    }

    /// Whether the field listed any patterns.
    pub fn is_declared(&self) -> bool {
        self.declared
    }

    /// Whether any pattern matches.
    pub fn any_match(&self, candidate: &str) -> bool {
        self.matchers.iter().any(|m| m.is_match(candidate))
    }

    /// Include-list semantics: an undeclared list matches everything.
    pub fn includes(&self, candidate: &str) -> bool {
        !self.declared || self.any_match(candidate)
    }

    /// Compile errors, one message per malformed pattern.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

/// An include list paired with its ignore list (`paths` / `paths-ignore`).
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub include: PatternList,
    pub ignore: PatternList,
}

impl Filter {
    pub fn new(include: &[String], ignore: &[String]) -> Self {
        Self {
            include: PatternList::new(include),
            ignore: PatternList::new(ignore),
        }
    }

    /// Whether either list is declared.
    pub fn is_declared(&self) -> bool {
        self.include.is_declared() || self.ignore.is_declared()
    }

    /// Included (or no include list) and not ignored.
    pub fn passes(&self, candidate: &str) -> bool {
        self.include.includes(candidate) && !self.ignore.any_match(candidate)
    }

    pub fn errors(&self) -> impl Iterator<Item = &String> {
        self.include.errors().iter().chain(self.ignore.errors())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(patterns: &[&str]) -> Vec<String> {
        patterns.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn star_within_segment() {
        assert!(match_glob("*.js", "test.js"));
        assert!(!match_glob("*.js", "test.ts"));
        assert!(!match_glob("*.js", "src/test.js"));
    }

    #[test]
    fn double_star_crosses_segments() {
        assert!(match_glob("**/*.js", "src/test.js"));
        assert!(match_glob("**/*.js", "deep/nested/test.js"));
        assert!(match_glob("**/*.js", "test.js"));
    }

    #[test]
    fn double_star_in_middle() {
        assert!(match_glob("src/**/*.go", "src/pkg/main.go"));
        assert!(match_glob("src/**/*.go", "src/main.go"));
        assert!(!match_glob("src/**/*.go", "other/main.go"));
        assert!(match_glob("src/**/test_*.go", "src/pkg/test_main.go"));
    }

    #[test]
    fn trailing_double_star() {
        assert!(match_glob("feature/**", "feature/new-thing"));
        assert!(match_glob("release/**", "release/1.0/hotfix"));
        assert!(!match_glob("feature/**", "main"));
    }

    #[test]
    fn anchored_and_case_sensitive() {
        assert!(!match_glob("main", "main2"));
        assert!(!match_glob("Main", "main"));
        assert!(match_glob("v*", "v1.0.0"));
        assert!(match_glob("v*-beta", "v1.0.0-beta"));
    }

    #[test]
    fn other_characters_are_literal() {
        assert!(match_glob("file?.txt", "file?.txt"));
        assert!(!match_glob("file?.txt", "file1.txt"));
        assert!(match_glob("[abc].md", "[abc].md"));
        assert!(!match_glob("{a,b}.md", "a.md"));
    }

    #[test]
    fn filter_include_and_ignore() {
        let f = Filter::new(&list(&["**/*.go"]), &list(&["**/test_*.go"]));
        assert!(f.passes("src/main.go"));
        assert!(!f.passes("src/test_main.go"));
        assert!(!f.passes("README.md"));
    }

    #[test]
    fn empty_filter_passes_everything() {
        let f = Filter::default();
        assert!(!f.is_declared());
        assert!(f.passes("anything.txt"));
    }

    #[test]
    fn ignore_only_filter() {
        let f = Filter::new(&[], &list(&["**/*_test.go"]));
        assert!(f.is_declared());
        assert!(f.passes("src/main.go"));
        assert!(!f.passes("src/main_test.go"));
    }
}
