//! Registration bursts from many threads against one engine

mod common;

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use cachetorrent_core::{Candidate, Election, ElectionConfig, NodeId, PartitionId, RecordingTransport};
use common::*;

const PARTITIONS: usize = 4;
const PER_PARTITION: usize = 25;

fn burst(election: &Arc<Election>, offset: usize) {
    let barrier = Arc::new(Barrier::new(PARTITIONS));
    let handles: Vec<_> = (0..PARTITIONS)
        .map(|p| {
            let election = Arc::clone(election);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for n in 0..PER_PARTITION {
                    let id = format!("as{}.{}", p, offset + n);
                    election.register_candidate(Candidate::new(id.as_str(), (n % 7) as u64, n as u64));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_burst_fires_exactly_once() {
    let transport = Arc::new(RecordingTransport::new());
    let limit = PARTITIONS * PER_PARTITION;
    let election = Arc::new(Election::new(&ElectionConfig::new(limit, 20), transport.clone()).unwrap());

    for p in 0..PARTITIONS {
        for n in 0..PER_PARTITION {
            election.join(NodeId::new(format!("as{}.{}", p, n)));
        }
    }

    burst(&election, 0);

    assert!(election.is_elected());
    assert_eq!(election.registrations(), limit);
    // One notification per camera member, nothing else
    assert_eq!(transport.len(), limit);

    let elected = election.get_elected();
    assert_eq!(elected.len(), PARTITIONS * 5);
    let distinct: HashSet<_> = elected.iter().collect();
    assert_eq!(distinct.len(), elected.len());

    // A second burst past the quorum only produces direct answers
    let snapshot: Vec<_> = (0..PARTITIONS)
        .map(|p| election.elected_for(&PartitionId::new(format!("as{p}"))))
        .collect();
    transport.clear();
    burst(&election, PER_PARTITION);

    assert_eq!(transport.len(), limit);
    for (p, before) in snapshot.into_iter().enumerate() {
        assert_eq!(election.elected_for(&PartitionId::new(format!("as{p}"))), before);
    }
    assert!(!election.run_election());
}

#[test]
fn test_burst_past_limit_still_fires() {
    let (election, transport) = recording_engine(10, 50);
    let election = Arc::new(election);

    // 100 registrations race past a limit of 10
    burst(&election, 0);

    assert!(election.is_elected());
    assert_eq!(election.registrations(), PARTITIONS * PER_PARTITION);
    assert!(!election.get_elected().is_empty());
    // Everyone registering after the trigger got exactly one answer
    let answered: HashSet<_> = transport.sent().into_iter().map(|n| n.to).collect();
    assert_eq!(answered.len(), PARTITIONS * PER_PARTITION - 10);
    assert_eq!(transport.len(), PARTITIONS * PER_PARTITION - 10);
    assert!(!answered.contains(&node("nobody.0")));
}
