//! Synthetic populations for exercising the election engines

use cachetorrent_core::{Candidate, Election, ElectionHandler, NodeId, PartitionId};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

/// Shape of a generated population
#[derive(Debug, Clone)]
pub struct ScenarioOptions {
    pub nodes: usize,
    pub partitions: usize,
    /// Percentage of nodes that register as candidates
    pub candidate_ratio: u32,
    pub seed: u64,
}

/// Joins and candidacies in the order they will be delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Population {
    pub joins: Vec<NodeId>,
    pub candidates: Vec<Candidate>,
}

impl Population {
    pub fn generate(options: &ScenarioOptions) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(options.seed);
        let partitions = options.partitions.max(1);

        let joins: Vec<NodeId> = (0..options.nodes)
            .map(|i| NodeId::new(format!("as{}.{}", i % partitions, i)))
            .collect();

        let mut candidates = Vec::new();
        for id in &joins {
            if rng.gen_range(0..100) >= options.candidate_ratio {
                continue;
            }
            candidates.push(Candidate {
                id: id.clone(),
                upload: rng.gen_range(1..=100),
                download: rng.gen_range(1..=100),
            });
        }
        candidates.shuffle(&mut rng);

        Self { joins, candidates }
    }

    /// Feed every join, then every candidacy, into `handler`
    pub fn drive(&self, handler: &dyn ElectionHandler) {
        for id in &self.joins {
            handler.join(id.clone());
        }
        for candidate in &self.candidates {
            handler.register_candidate(candidate.clone());
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PartitionSummary {
    pub partition: PartitionId,
    pub members: usize,
    pub candidates: usize,
    pub leaders: Option<Vec<NodeId>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayerSummary {
    pub layer: usize,
    pub elected: bool,
    pub registrations: usize,
    pub partitions: Vec<PartitionSummary>,
}

impl LayerSummary {
    pub fn of(layer: usize, election: &Election) -> Self {
        let partitions = election
            .partitions()
            .into_iter()
            .map(|partition| PartitionSummary {
                members: election.members(&partition).len(),
                candidates: election.candidates(&partition).len(),
                leaders: election.elected_for(&partition),
                partition,
            })
            .collect();

        Self {
            layer,
            elected: election.is_elected(),
            registrations: election.registrations(),
            partitions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachetorrent_core::{ElectionConfig, RecordingTransport};
    use std::sync::Arc;

    fn options(seed: u64) -> ScenarioOptions {
        ScenarioOptions {
            nodes: 60,
            partitions: 3,
            candidate_ratio: 50,
            seed,
        }
    }

    #[test]
    fn test_generation_is_seeded() {
        assert_eq!(Population::generate(&options(7)), Population::generate(&options(7)));

        let population = Population::generate(&options(7));
        assert_eq!(population.joins.len(), 60);
        assert!(population.candidates.len() <= 60);
        assert!(population.candidates.iter().all(|c| c.upload >= 1 && c.upload <= 100));
    }

    #[test]
    fn test_drive_and_summarize() {
        let population = Population::generate(&ScenarioOptions {
            candidate_ratio: 100,
            ..options(1)
        });
        let transport = Arc::new(RecordingTransport::new());
        let election = Election::new(&ElectionConfig::new(60, 10), transport.clone()).unwrap();

        population.drive(&election);

        let summary = LayerSummary::of(0, &election);
        assert!(summary.elected);
        assert_eq!(summary.registrations, 60);
        assert_eq!(summary.partitions.len(), 3);
        for partition in &summary.partitions {
            assert_eq!(partition.members, 20);
            assert_eq!(partition.leaders.as_ref().map(Vec::len), Some(2));
        }
        assert_eq!(transport.len(), 60);
    }
}
