//! Control-message transport seam
//!
//! The election engines never deliver messages themselves; they hand leader
//! notifications to a [`ControlTransport`]. Ordering and reliability of the
//! delivery belong to the transport.

use crate::{
    error::{ElectionError, ElectionResult},
    types::{Leaders, NodeId},
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Point-to-point control sends towards overlay nodes
pub trait ControlTransport: Send + Sync {
    /// Deliver `message` to the node identified by `to`
    fn control_send(&self, to: &NodeId, message: Leaders) -> ElectionResult<()>;
}

/// A leader notification addressed to one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub to: NodeId,
    pub leaders: Leaders,
}

/// Transport that keeps every send in memory, in send order
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all notifications sent so far
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }

    /// Notifications addressed to `id`, oldest first
    pub fn sent_to(&self, id: &NodeId) -> Vec<Leaders> {
        self.sent
            .lock()
            .iter()
            .filter(|n| &n.to == id)
            .map(|n| n.leaders.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.lock().is_empty()
    }

    pub fn clear(&self) {
        self.sent.lock().clear();
    }
}

impl ControlTransport for RecordingTransport {
    fn control_send(&self, to: &NodeId, message: Leaders) -> ElectionResult<()> {
        self.sent.lock().push(Notification {
            to: to.clone(),
            leaders: message,
        });
        Ok(())
    }
}

/// Transport that forwards notifications into a tokio channel
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelTransport {
    pub fn new(tx: mpsc::UnboundedSender<Notification>) -> Self {
        Self { tx }
    }

    /// Create a transport together with the receiving half of its channel
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ControlTransport for ChannelTransport {
    fn control_send(&self, to: &NodeId, message: Leaders) -> ElectionResult<()> {
        self.tx
            .send(Notification {
                to: to.clone(),
                leaders: message,
            })
            .map_err(|_| ElectionError::TransportClosed {
                target: to.to_string(),
            })
    }
}
