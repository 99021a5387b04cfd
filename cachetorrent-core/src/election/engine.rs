//! Tracker-side leader election across autonomous systems
//!
//! Every autonomous system (partition) forms its own election camera. Nodes
//! join cameras as they enter the overlay and some of them submit their
//! candidacy. Once `quorum_limit` candidacies have been registered across the
//! whole engine, every known partition elects its leaders at once and each
//! camera member is told who they are. Candidates registering after that
//! point take no part in the election; they are answered directly.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, trace, warn};

use super::ranking::select_leaders;
use super::ElectionHandler;
use crate::{
    config::ElectionConfig,
    error::ElectionResult,
    transport::ControlTransport,
    types::{Candidate, Leaders, NodeId, PartitionId},
};

type Outbox = Vec<(NodeId, Leaders)>;

/// Mutable engine state. Every helper taking `&mut ElectionState` runs with
/// the engine lock held.
#[derive(Debug, Default)]
struct ElectionState {
    /// Joined nodes per partition, in arrival order
    membership: BTreeMap<PartitionId, Vec<NodeId>>,
    /// Registered candidates per partition, in arrival order
    registry: BTreeMap<PartitionId, Vec<Candidate>>,
    /// Leader sets, written once when the election fires
    elected: BTreeMap<PartitionId, Vec<NodeId>>,
    /// Candidate registrations seen so far
    registrations: usize,
    /// Set once the election has run
    fired: bool,
}

impl ElectionState {
    fn known_partitions(&self) -> Vec<PartitionId> {
        let mut partitions: Vec<PartitionId> = self
            .membership
            .keys()
            .chain(self.registry.keys())
            .cloned()
            .collect();
        partitions.sort();
        partitions.dedup();
        partitions
    }

    fn elect(&self, partition: &PartitionId, leader_percent: u32) -> Vec<NodeId> {
        let candidates = self
            .registry
            .get(partition)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let members = self
            .membership
            .get(partition)
            .map(Vec::as_slice)
            .unwrap_or_default();
        select_leaders(candidates, members, leader_percent)
    }

    /// Compute and store every partition's leaders, then address the result
    /// to each camera member.
    fn run_election(&mut self, leader_percent: u32) -> Outbox {
        self.fired = true;

        for partition in self.known_partitions() {
            let leaders = self.elect(&partition, leader_percent);
            self.elected.insert(partition, leaders);
        }

        let mut outbox = Vec::new();
        for (partition, members) in &self.membership {
            let leaders = Leaders::new(self.elected.get(partition).cloned().unwrap_or_default());
            for member in members {
                outbox.push((member.clone(), leaders.clone()));
            }
        }
        outbox
    }

    /// Leaders handed to a candidate registering after the election.
    ///
    /// A partition without a stored (non-empty) result names the candidate as
    /// its own leader, so it keeps talking to the tracker directly.
    fn late_leaders(&self, candidate: &NodeId) -> Leaders {
        match self.elected.get(&candidate.partition()) {
            Some(leaders) if !leaders.is_empty() => Leaders::new(leaders.clone()),
            _ => Leaders::new(vec![candidate.clone()]),
        }
    }
}

/// Quorum-triggered, per-partition leader election
pub struct Election {
    quorum_limit: usize,
    leader_percent: u32,
    state: Mutex<ElectionState>,
    transport: Arc<dyn ControlTransport>,
}

impl Election {
    /// Create an engine for one overlay instance
    pub fn new(config: &ElectionConfig, transport: Arc<dyn ControlTransport>) -> ElectionResult<Self> {
        config.validate()?;
        Ok(Self {
            quorum_limit: config.quorum_limit,
            leader_percent: config.leader_percent,
            state: Mutex::new(ElectionState::default()),
            transport,
        })
    }

    /// Record that `id` joined the overlay. Duplicate joins are kept.
    pub fn join(&self, id: NodeId) {
        let partition = id.partition();
        debug!(node = %id, %partition, "Node joined election camera");
        self.state.lock().membership.entry(partition).or_default().push(id);
    }

    /// Register a candidacy.
    ///
    /// Before the election this only feeds the registry; the registration
    /// that brings the count to the quorum limit runs the election. Later
    /// registrations are answered with the current leaders of their
    /// partition.
    pub fn register_candidate(&self, candidate: Candidate) {
        let outbox = {
            let mut state = self.state.lock();
            state.registrations += 1;

            let id = candidate.id.clone();
            let partition = candidate.partition();
            debug!(
                node = %id,
                %partition,
                upload = candidate.upload,
                download = candidate.download,
                registrations = state.registrations,
                "Candidate registered"
            );
            state.registry.entry(partition).or_default().push(candidate);

            if state.fired {
                vec![(id.clone(), state.late_leaders(&id))]
            } else if state.registrations >= self.quorum_limit {
                let outbox = state.run_election(self.leader_percent);
                self.log_fired(&state);
                outbox
            } else {
                Vec::new()
            }
        };

        self.deliver(outbox);
    }

    /// Drop the first registered candidacy of `id`, if any.
    ///
    /// Neither the registration count nor stored leader sets change.
    pub fn remove_candidate(&self, id: &NodeId) {
        let mut state = self.state.lock();
        let Some(candidates) = state.registry.get_mut(&id.partition()) else {
            return;
        };
        if let Some(pos) = candidates.iter().position(|c| &c.id == id) {
            candidates.remove(pos);
            debug!(node = %id, "Candidate removed");
        }
    }

    /// Run the election now, unless it already ran.
    ///
    /// Returns `true` if leader sets were computed by this call.
    pub fn run_election(&self) -> bool {
        let outbox = {
            let mut state = self.state.lock();
            if state.fired {
                debug!("Election already ran, ignoring request");
                return false;
            }
            let outbox = state.run_election(self.leader_percent);
            self.log_fired(&state);
            outbox
        };

        self.deliver(outbox);
        true
    }

    /// Leaders `partition` would elect from its current registry and camera
    pub fn elect(&self, partition: &PartitionId) -> Vec<NodeId> {
        self.state.lock().elect(partition, self.leader_percent)
    }

    /// All elected leaders, grouped by partition in ascending partition order
    pub fn get_elected(&self) -> Vec<NodeId> {
        self.state.lock().elected.values().flatten().cloned().collect()
    }

    pub fn elected_for(&self, partition: &PartitionId) -> Option<Vec<NodeId>> {
        self.state.lock().elected.get(partition).cloned()
    }

    pub fn is_elected(&self) -> bool {
        self.state.lock().fired
    }

    pub fn registrations(&self) -> usize {
        self.state.lock().registrations
    }

    pub fn quorum_limit(&self) -> usize {
        self.quorum_limit
    }

    pub fn leader_percent(&self) -> u32 {
        self.leader_percent
    }

    pub fn members(&self, partition: &PartitionId) -> Vec<NodeId> {
        self.state
            .lock()
            .membership
            .get(partition)
            .cloned()
            .unwrap_or_default()
    }

    pub fn candidates(&self, partition: &PartitionId) -> Vec<Candidate> {
        self.state
            .lock()
            .registry
            .get(partition)
            .cloned()
            .unwrap_or_default()
    }

    /// Partitions with at least one joined node or registered candidate
    pub fn partitions(&self) -> Vec<PartitionId> {
        self.state.lock().known_partitions()
    }

    fn log_fired(&self, state: &ElectionState) {
        info!(
            quorum_limit = self.quorum_limit,
            registrations = state.registrations,
            partitions = state.elected.len(),
            leaders = state.elected.values().map(Vec::len).sum::<usize>(),
            "Election quorum reached, leaders elected"
        );
    }

    fn deliver(&self, outbox: Outbox) {
        for (to, leaders) in outbox {
            trace!(node = %to, leaders = leaders.len(), "Sending leader notification");
            if let Err(e) = self.transport.control_send(&to, leaders) {
                warn!(node = %to, error = %e, "Failed to deliver leader notification");
            }
        }
    }
}

impl std::fmt::Debug for Election {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Election")
            .field("quorum_limit", &self.quorum_limit)
            .field("leader_percent", &self.leader_percent)
            .field("state", &*self.state.lock())
            .finish()
    }
}

impl ElectionHandler for Election {
    fn join(&self, id: NodeId) {
        Election::join(self, id);
    }

    fn register_candidate(&self, candidate: Candidate) {
        Election::register_candidate(self, candidate);
    }
}
