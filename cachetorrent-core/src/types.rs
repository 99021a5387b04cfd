use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Separator between the partition prefix and the rest of a node id
pub const PARTITION_SEPARATOR: char = '.';

/// Identity of a node in the overlay (e.g. "as3.17")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The autonomous system this node belongs to.
    ///
    /// The partition is the prefix up to the first separator; an id without a
    /// separator forms its own partition.
    pub fn partition(&self) -> PartitionId {
        let prefix = self
            .0
            .split_once(PARTITION_SEPARATOR)
            .map(|(prefix, _)| prefix)
            .unwrap_or(&self.0);
        PartitionId(prefix.to_string())
    }

    /// Identity of this node inside overlay layer `layer`.
    ///
    /// The layer index is appended as a suffix so the partition prefix is
    /// left untouched: `id.layer_scoped(i).partition() == id.partition()`.
    pub fn layer_scoped(&self, layer: usize) -> NodeId {
        NodeId(format!("{}{}{}", self.0, PARTITION_SEPARATOR, layer))
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Autonomous system ("partition") key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionId(pub String);

impl PartitionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PartitionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PartitionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A node offering itself for leadership, with its link capacities
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    pub id: NodeId,
    /// Upload capacity
    pub upload: u64,
    /// Download capacity
    pub download: u64,
}

impl Candidate {
    pub fn new(id: impl Into<NodeId>, upload: u64, download: u64) -> Self {
        Self {
            id: id.into(),
            upload,
            download,
        }
    }

    pub fn partition(&self) -> PartitionId {
        self.id.partition()
    }

    /// Ranking used by elections: higher upload first, then higher download,
    /// then ascending id. Two candidates compare equal only if all three match.
    pub fn rank(&self, other: &Candidate) -> Ordering {
        other
            .upload
            .cmp(&self.upload)
            .then_with(|| other.download.cmp(&self.download))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Leader-set notification sent to the members of a partition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaders {
    pub ids: Vec<NodeId>,
}

impl Leaders {
    pub fn new(ids: Vec<NodeId>) -> Self {
        Self { ids }
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Inbound events understood by the election engines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectionMessage {
    /// A node joined the overlay
    Join(NodeId),
    /// A node submitted its candidacy to the tracker
    Candidate(Candidate),
}

impl From<Candidate> for ElectionMessage {
    fn from(candidate: Candidate) -> Self {
        ElectionMessage::Candidate(candidate)
    }
}
