pub mod config;
pub mod election;
pub mod error;
pub mod transport;
pub mod types;

pub use config::{Config, ElectionConfig, LoggingConfig};
pub use election::{Election, ElectionHandler, MultiElection};
pub use error::{ElectionError, ElectionResult};
pub use transport::{ChannelTransport, ControlTransport, Notification, RecordingTransport};
pub use types::{Candidate, ElectionMessage, Leaders, NodeId, PartitionId};
