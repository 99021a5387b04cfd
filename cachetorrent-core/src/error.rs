use thiserror::Error;

#[derive(Error, Debug)]
pub enum ElectionError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Invalid input for {field}: {message}")]
    InvalidInput { field: String, message: String },

    #[error("Failed to parse TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Transport to {target} is closed")]
    TransportClosed { target: String },

    #[error("Failed to deliver control message to {target}: {details}")]
    Transport { target: String, details: String },
}

pub type ElectionResult<T> = std::result::Result<T, ElectionError>;

impl ElectionError {
    /// Whether the error came from the transport collaborator rather than
    /// from local configuration or input.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ElectionError::TransportClosed { .. } | ElectionError::Transport { .. }
        )
    }
}
