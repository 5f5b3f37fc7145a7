//! Deterministic cache keys.

use std::fmt;

/// Identifies one logical query, e.g. `featured-projects-2`.
///
/// A key is a fixed prefix followed by its parameters in call order, joined
/// by `-`. Parameters escape `%` and `-`, so two different parameter lists
/// under the same prefix never render to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub const SEPARATOR: char = '-';

    /// Start a key from a prefix naming the logical query. The prefix is used verbatim.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self(prefix.into())
    }

    /// Append a parameter.
    #[must_use]
    pub fn param(mut self, value: impl fmt::Display) -> Self {
        self.0.push(Self::SEPARATOR);
        for c in value.to_string().chars() {
            match c {
                '%' => self.0.push_str("%25"),
                '-' => self.0.push_str("%2D"),
                c => self.0.push(c),
            }
        }
        self
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
