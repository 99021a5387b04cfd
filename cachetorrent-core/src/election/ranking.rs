//! Leader selection for a single partition

use crate::types::{Candidate, NodeId};

/// Number of leaders kept out of `candidates` registrations.
///
/// `floor(candidates * leader_percent / 100)`, raised to 1 and capped at
/// `candidates`. Zero candidates yields zero leaders.
pub fn quorum_size(candidates: usize, leader_percent: u32) -> usize {
    let size = candidates.saturating_mul(leader_percent as usize) / 100;
    size.max(1).min(candidates)
}

/// Pick the leaders of one partition.
///
/// With no candidates every member of the partition is a leader, in join
/// order. Otherwise the candidates are ranked by [`Candidate::rank`] and the
/// top [`quorum_size`] are returned in rank order.
pub fn select_leaders(
    candidates: &[Candidate],
    members: &[NodeId],
    leader_percent: u32,
) -> Vec<NodeId> {
    if candidates.is_empty() {
        return members.to_vec();
    }

    let mut ranked: Vec<&Candidate> = candidates.iter().collect();
    ranked.sort_by(|a, b| a.rank(b));

    ranked
        .into_iter()
        .take(quorum_size(candidates.len(), leader_percent))
        .map(|candidate| candidate.id.clone())
        .collect()
}
