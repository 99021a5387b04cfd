// Common helpers for election integration tests
#![allow(dead_code)]

use std::sync::Arc;

use cachetorrent_core::{
    error::{ElectionError, ElectionResult},
    Candidate, ControlTransport, Election, ElectionConfig, Leaders, NodeId, RecordingTransport,
};

/// Engine wired to a recording transport
pub fn recording_engine(limit: usize, percent: u32) -> (Election, Arc<RecordingTransport>) {
    let transport = Arc::new(RecordingTransport::new());
    let election = Election::new(&ElectionConfig::new(limit, percent), transport.clone())
        .expect("valid test configuration");
    (election, transport)
}

pub fn node(id: &str) -> NodeId {
    NodeId::from(id)
}

pub fn nodes(ids: &[&str]) -> Vec<NodeId> {
    ids.iter().map(|id| NodeId::from(*id)).collect()
}

pub fn leaders(ids: &[&str]) -> Leaders {
    Leaders::new(nodes(ids))
}

pub fn candidate(id: &str, upload: u64, download: u64) -> Candidate {
    Candidate::new(id, upload, download)
}

/// Transport refusing deliveries to a fixed set of nodes
pub struct FlakyTransport {
    pub unreachable: Vec<NodeId>,
    pub inner: RecordingTransport,
}

impl ControlTransport for FlakyTransport {
    fn control_send(&self, to: &NodeId, message: Leaders) -> ElectionResult<()> {
        if self.unreachable.contains(to) {
            return Err(ElectionError::Transport {
                target: to.to_string(),
                details: "peer unreachable".to_string(),
            });
        }
        self.inner.control_send(to, message)
    }
}
