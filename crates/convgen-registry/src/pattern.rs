//! Priority patterns.
//!
//! A pattern matches a converter's qualified name either exactly or as a glob
//! (`*`, `?`, `[...]`, `{a,b}`). When several patterns match, the longest
//! pattern string wins; between equally long matches the one listed first wins.

use globset::{GlobBuilder, GlobMatcher};
use tracing::warn;

#[derive(Debug, Clone)]
struct Pattern {
    text: String,
    glob: Option<GlobMatcher>,
}

impl Pattern {
    fn matches(&self, name: &str) -> bool {
        self.text == name || self.glob.as_ref().is_some_and(|g| g.is_match(name))
    }
}

/// An ordered list of priority patterns.
///
/// # Example
///
/// ```
/// use convgen_registry::PriorityPatterns;
///
/// let patterns = PriorityPatterns::new(["pkg::*", "pkg::Specific"]);
/// assert_eq!(patterns.best_match("pkg::Specific"), Some(1));
/// assert_eq!(patterns.best_match("pkg::Other"), Some(0));
/// assert_eq!(patterns.best_match("elsewhere::Thing"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PriorityPatterns {
    patterns: Vec<Pattern>,
}

impl PriorityPatterns {
    /// Compile patterns. Patterns that are not valid globs only match exactly.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let text = p.as_ref().to_string();
                let glob = match GlobBuilder::new(&text).literal_separator(false).build() {
                    Ok(glob) => Some(glob.compile_matcher()),
                    Err(err) => {
                        warn!(pattern = %text, %err, "invalid priority pattern, matching exactly");
                        None
                    }
                };
                Pattern { text, glob }
            })
            .collect();
        Self { patterns }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Index of the pattern governing `name`, if any.
    pub fn best_match(&self, name: &str) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for (index, pattern) in self.patterns.iter().enumerate() {
            if !pattern.matches(name) {
                continue;
            }
            let len = pattern.text.len();
            // strictly longer only, so the earliest pattern keeps a tie
            if best.is_none_or(|(_, best_len)| len > best_len) {
                best = Some((index, len));
            }
        }
        best.map(|(index, _)| index)
    }
}
