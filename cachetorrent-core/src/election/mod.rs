//! Leader election engines
//!
//! [`Election`] runs one quorum-triggered election per overlay instance.
//! [`MultiElection`] fans the same events out to several independent
//! engines, one per overlay layer.

pub mod engine;
pub mod multi;
pub mod ranking;

pub use engine::Election;
pub use multi::MultiElection;
pub use ranking::{quorum_size, select_leaders};

use crate::types::{Candidate, ElectionMessage, NodeId};

/// Inbound side shared by the election engines
pub trait ElectionHandler: Send + Sync {
    /// A node entered the overlay
    fn join(&self, id: NodeId);

    /// A node submitted its candidacy
    fn register_candidate(&self, candidate: Candidate);

    /// Dispatch a raw inbound message
    fn recv(&self, message: ElectionMessage) {
        match message {
            ElectionMessage::Join(id) => self.join(id),
            ElectionMessage::Candidate(candidate) => self.register_candidate(candidate),
        }
    }
}
