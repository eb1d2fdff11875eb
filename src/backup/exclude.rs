use regex::Regex;
use std::path::Path;
use tracing::{debug, warn};

/// Exclusion rules compiled from user-supplied regular expressions.
///
/// Each pattern is matched against a path's full string form with
/// whole-string semantics: the pattern must cover the entire path, not a
/// substring of it. A pattern meant to exclude a filename suffix therefore
/// has to account for the leading directories (`.*\.tmp`, not `\.tmp`).
/// Invalid patterns are dropped with a warning at construction time.
#[derive(Debug, Default)]
pub struct ExclusionFilter {
    patterns: Vec<Regex>,
}

impl ExclusionFilter {
    pub fn new<S: AsRef<str>, I: IntoIterator<Item = S>>(pattern_strings: I) -> Self {
        let mut patterns = Vec::new();
        for pattern in pattern_strings {
            let pattern = pattern.as_ref();
            // Anchor both ends so `is_match` behaves as a whole-string test.
            match Regex::new(&format!(r"\A(?:{pattern})\z")) {
                Ok(re) => {
                    debug!("Added exclusion pattern: {}", pattern);
                    patterns.push(re);
                }
                Err(e) => {
                    warn!("Invalid exclusion pattern {:?}: {}", pattern, e);
                }
            }
        }
        Self { patterns }
    }

    pub fn is_excluded<P: AsRef<Path>>(&self, path: P) -> bool {
        if self.patterns.is_empty() {
            return false;
        }

        let path_str = path.as_ref().to_string_lossy();
        self.patterns.iter().any(|re| re.is_match(&path_str))
    }
}
