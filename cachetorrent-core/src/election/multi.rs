//! Elections for nodes taking part in several overlay layers at once
//!
//! Each layer owns an independent [`Election`] with its own counter, registry
//! and leader sets. Joins are recorded under layer-scoped ids; candidacies are
//! forwarded as-is. Layer scoping never changes a node's partition, so a
//! candidate lands in the same partition as its scoped joins on every layer.

use std::sync::Arc;

use tracing::debug;

use super::{Election, ElectionHandler};
use crate::{
    config::ElectionConfig,
    error::{ElectionError, ElectionResult},
    transport::ControlTransport,
    types::{Candidate, NodeId},
};

pub struct MultiElection {
    layers: Vec<Election>,
}

impl MultiElection {
    /// Build `layers` engines sharing the quorum settings and transport
    pub fn new(
        layers: usize,
        config: &ElectionConfig,
        transport: Arc<dyn ControlTransport>,
    ) -> ElectionResult<Self> {
        if layers == 0 {
            return Err(ElectionError::InvalidConfiguration {
                message: "a multi-layer election needs at least one layer".to_string(),
            });
        }

        let layers = (0..layers)
            .map(|_| Election::new(config, transport.clone()))
            .collect::<ElectionResult<Vec<_>>>()?;
        Ok(Self { layers })
    }

    /// Build as many engines as `config.layers` asks for
    pub fn from_config(
        config: &ElectionConfig,
        transport: Arc<dyn ControlTransport>,
    ) -> ElectionResult<Self> {
        Self::new(config.layers, config, transport)
    }

    pub fn join(&self, id: NodeId) {
        for (layer, election) in self.layers.iter().enumerate() {
            election.join(id.layer_scoped(layer));
        }
    }

    pub fn register_candidate(&self, candidate: Candidate) {
        debug!(node = %candidate.id, layers = self.layers.len(), "Forwarding candidate to all layers");
        for election in &self.layers {
            election.register_candidate(candidate.clone());
        }
    }

    pub fn layers(&self) -> &[Election] {
        &self.layers
    }

    pub fn layer(&self, layer: usize) -> Option<&Election> {
        self.layers.get(layer)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Elected leaders of every layer, indexed by layer
    pub fn elected_per_layer(&self) -> Vec<Vec<NodeId>> {
        self.layers.iter().map(Election::get_elected).collect()
    }
}

impl ElectionHandler for MultiElection {
    fn join(&self, id: NodeId) {
        MultiElection::join(self, id);
    }

    fn register_candidate(&self, candidate: Candidate) {
        MultiElection::register_candidate(self, candidate);
    }
}
