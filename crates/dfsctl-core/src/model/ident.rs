// ── Identity types ──
//
// Every DFS key is compared the way Windows compares it: case-insensitively.
// `UncPath` and `Name` keep the text exactly as declared for display and
// serialization, and normalize only for equality and hashing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

// ── UncPath ─────────────────────────────────────────────────────────

/// A UNC path such as `\\domain.example.com\dfs\folder`.
///
/// Equality ignores case (Unicode lowercase) and a trailing backslash, so
/// `\\DC1\Share\` and `\\dc1\share` identify the same target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct UncPath(String);

impl UncPath {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Build a UNC path from its components: `["host", "dfs"]` becomes
    /// `\\host\dfs`. Leading and trailing separators on each part are dropped.
    pub fn join<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = parts
            .into_iter()
            .map(|p| p.as_ref().trim_matches(['\\', '/']).to_owned())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("\\");
        Self(format!("\\\\{joined}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path components after the leading `\\` (host first).
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0
            .strip_prefix("\\\\")
            .unwrap_or(&self.0)
            .split('\\')
            .filter(|c| !c.is_empty())
    }

    /// `true` for `\\host\share[\...]` with no empty interior components.
    pub fn is_well_formed(&self) -> bool {
        let Some(rest) = self.0.strip_prefix("\\\\") else {
            return false;
        };
        let rest = rest.strip_suffix('\\').unwrap_or(rest);
        let parts: Vec<&str> = rest.split('\\').collect();
        parts.len() >= 2 && parts.iter().all(|p| !p.trim().is_empty())
    }

    /// `true` when `self` lies strictly below `parent`.
    pub fn is_descendant_of(&self, parent: &UncPath) -> bool {
        let own = self.key();
        let mut prefix = parent.key();
        prefix.push('\\');
        own.starts_with(&prefix)
    }

    fn key(&self) -> String {
        self.0.trim_end_matches('\\').to_lowercase()
    }
}

impl PartialEq for UncPath {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for UncPath {}

impl Hash for UncPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for UncPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UncPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<String> for UncPath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UncPath {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<UncPath> for String {
    fn from(p: UncPath) -> Self {
        p.0
    }
}

// ── Name ────────────────────────────────────────────────────────────

/// Case-insensitive name: replication group, replicated folder, or member
/// host. A trailing dot on a fully-qualified host name is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Name(String);

impl Name {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    fn key(&self) -> String {
        self.0.trim().trim_end_matches('.').to_lowercase()
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<Name> for String {
    fn from(n: Name) -> Self {
        n.0
    }
}
