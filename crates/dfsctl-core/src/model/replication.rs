// ── Replication group domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::common::GroupState;
use super::ident::{Name, UncPath};
use crate::diff::CollectionPolicy;

/// Default staging and conflict-and-deleted quota, in megabytes.
pub const DEFAULT_QUOTA_MB: u32 = 4096;

/// Connection topology among the members of a group.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Topology {
    /// Every member connects to every other member.
    #[default]
    Mesh,
}

impl Topology {
    /// Members a newcomer must connect to, given the current roster.
    pub fn peers_for<'a>(self, member: &Name, roster: &'a [Name]) -> Vec<&'a Name> {
        match self {
            Self::Mesh => roster.iter().filter(|m| *m != member).collect(),
        }
    }
}

// ── GlobList ────────────────────────────────────────────────────────

/// File or directory wildcards excluded from replication.
///
/// Accepts either a list or a comma-separated string (`"~*, *.bak"`).
/// Two lists are equal when they hold the same patterns, ignoring order,
/// duplicates, surrounding whitespace and ASCII case.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "GlobListRepr", into = "Vec<String>")]
pub struct GlobList(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum GlobListRepr {
    Csv(String),
    List(Vec<String>),
}

impl From<GlobListRepr> for GlobList {
    fn from(repr: GlobListRepr) -> Self {
        match repr {
            GlobListRepr::Csv(s) => Self::parse(&s),
            GlobListRepr::List(items) => Self::new(items),
        }
    }
}

impl From<GlobList> for Vec<String> {
    fn from(list: GlobList) -> Self {
        list.0
    }
}

impl GlobList {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            patterns
                .into_iter()
                .map(|p| p.as_ref().trim().to_owned())
                .filter(|p| !p.is_empty())
                .collect(),
        )
    }

    /// Parse the comma-separated form.
    pub fn parse(csv: &str) -> Self {
        Self::new(csv.split(','))
    }

    pub fn patterns(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn normalized(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.0.iter().map(|p| p.to_ascii_lowercase()).collect();
        keys.sort();
        keys.dedup();
        keys
    }
}

impl PartialEq for GlobList {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Eq for GlobList {}

impl std::fmt::Display for GlobList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

// ── Declared ────────────────────────────────────────────────────────

/// Declared replicated folder within a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicatedFolder {
    pub name: Name,
    /// Local path on every member. Must be identical group-wide.
    pub content_path: Option<String>,
    pub description: Option<String>,
    /// Namespace path publishing this folder. Informational only.
    pub dfsn_path: Option<UncPath>,
    pub exclude_files: Option<GlobList>,
    pub exclude_dirs: Option<GlobList>,
}

impl ReplicatedFolder {
    pub fn new(name: impl Into<Name>, content_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content_path: Some(content_path.into()),
            description: None,
            dfsn_path: None,
            exclude_files: None,
            exclude_dirs: None,
        }
    }
}

/// Declared state of a replication group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationGroup {
    pub name: Name,
    #[serde(default)]
    pub state: GroupState,
    /// `None` leaves membership alone; `Some(vec![])` removes every member.
    pub members: Option<Vec<Name>>,
    #[serde(default)]
    pub folders: Vec<ReplicatedFolder>,
    pub description: Option<String>,
    #[serde(default)]
    pub topology: Topology,
    pub staging_quota: Option<u32>,
    pub conflict_and_deleted_quota: Option<u32>,
}

impl ReplicationGroup {
    pub const MEMBERS_POLICY: CollectionPolicy = CollectionPolicy::PruneOnReconcile;
    pub const FOLDERS_POLICY: CollectionPolicy = CollectionPolicy::AdditiveOnly;

    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            state: GroupState::Present,
            members: None,
            folders: Vec::new(),
            description: None,
            topology: Topology::Mesh,
            staging_quota: None,
            conflict_and_deleted_quota: None,
        }
    }

    pub fn with_state(mut self, state: GroupState) -> Self {
        self.state = state;
        self
    }

    pub fn with_members<I, T>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Name>,
    {
        self.members = Some(members.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_folder(mut self, folder: ReplicatedFolder) -> Self {
        self.folders.push(folder);
        self
    }
}

// ── Observed ────────────────────────────────────────────────────────

/// Live state of a replicated folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicatedFolderState {
    pub name: Name,
    pub content_path: String,
    pub description: Option<String>,
    pub dfsn_path: Option<UncPath>,
    #[serde(default)]
    pub exclude_files: GlobList,
    #[serde(default)]
    pub exclude_dirs: GlobList,
}

/// A bidirectional replication connection between two members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub left: Name,
    pub right: Name,
}

impl Connection {
    pub fn new(left: Name, right: Name) -> Self {
        Self { left, right }
    }

    pub fn touches(&self, member: &Name) -> bool {
        self.left == *member || self.right == *member
    }

    pub fn links(&self, a: &Name, b: &Name) -> bool {
        (self.left == *a && self.right == *b) || (self.left == *b && self.right == *a)
    }
}

/// Live state of a replication group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationGroupState {
    pub name: Name,
    pub description: Option<String>,
    #[serde(default)]
    pub topology: Topology,
    #[serde(default)]
    pub members: Vec<Name>,
    #[serde(default)]
    pub folders: Vec<ReplicatedFolderState>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    pub staging_quota: u32,
    pub conflict_and_deleted_quota: u32,
}

impl ReplicationGroupState {
    /// A freshly created group: no members, no folders.
    pub fn empty(
        name: Name,
        topology: Topology,
        description: Option<String>,
        staging_quota: u32,
        conflict_and_deleted_quota: u32,
    ) -> Self {
        Self {
            name,
            description,
            topology,
            members: Vec::new(),
            folders: Vec::new(),
            connections: Vec::new(),
            staging_quota,
            conflict_and_deleted_quota,
        }
    }

    pub fn folder(&self, name: &Name) -> Option<&ReplicatedFolderState> {
        self.folders.iter().find(|f| f.name == *name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn glob_list_parses_comma_separated_string() {
        let list: GlobList = serde_json::from_str(r#""~*, *.bak ,*.tmp,""#).unwrap();
        assert_eq!(list.patterns(), ["~*", "*.bak", "*.tmp"]);
    }

    #[test]
    fn glob_list_accepts_sequence() {
        let list: GlobList = serde_json::from_str(r#"["*.iso", " *.vhdx "]"#).unwrap();
        assert_eq!(list.patterns(), ["*.iso", "*.vhdx"]);
    }

    #[test]
    fn glob_list_equality_is_set_based() {
        assert_eq!(GlobList::parse("*.TMP, ~*"), GlobList::parse("~*,*.tmp,~*"));
        assert_ne!(GlobList::parse("*.tmp"), GlobList::parse("*.bak"));
    }

    #[test]
    fn mesh_peers_exclude_self() {
        let roster = vec![Name::from("a"), Name::from("b")];
        let peers = Topology::Mesh.peers_for(&Name::from("A"), &roster);
        assert_eq!(peers, vec![&Name::from("b")]);
    }

    #[test]
    fn connection_links_either_direction() {
        let c = Connection::new(Name::from("a"), Name::from("b"));
        assert!(c.links(&Name::from("b"), &Name::from("a")));
        assert!(c.touches(&Name::from("B")));
        assert!(!c.touches(&Name::from("c")));
    }

    #[test]
    fn group_defaults_from_minimal_document() {
        let group: ReplicationGroup = serde_json::from_str(r#"{"name": "dfsr"}"#).unwrap();
        assert_eq!(group.state, GroupState::Present);
        assert_eq!(group.topology, Topology::Mesh);
        assert!(group.members.is_none());
        assert!(group.folders.is_empty());
    }
}
