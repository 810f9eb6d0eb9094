use thiserror::Error;

/// A filter expression the BPF compiler rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid filter `{expression}`: {reason}")]
pub struct FilterError {
    pub expression: String,
    pub reason: String,
}

/// Returned synchronously from `CaptureEngine::start`.
#[derive(Debug, Error)]
pub enum StartError {
    #[error(transparent)]
    InvalidFilter(#[from] FilterError),

    #[error("interface `{interface}` unavailable: {reason}")]
    InterfaceUnavailable { interface: String, reason: String },

    #[error("capture already running on `{0}`")]
    AlreadyRunning(String),

    #[error("failed to spawn capture thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// The capture primitive ended on its own, e.g. the interface went down.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("capture on `{interface}` terminated: {reason}")]
pub struct CaptureTerminated {
    pub interface: String,
    pub reason: String,
}

/// Failure reported by a `PacketSource` while reading frames.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("capture source closed")]
    Closed,

    #[error("pcap error: {0}")]
    Pcap(#[from] pcap::Error),
}
