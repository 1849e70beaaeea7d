use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// The host-managed upload queue cannot accept more work right now.
    ///
    /// This is an expected steady-state signal, not a failure. Callers branch
    /// on it to stop enqueueing and try again on a later invocation.
    #[error("Host capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Whether this error is the host's "queue is full" signal.
    pub fn is_capacity_exceeded(&self) -> bool {
        matches!(self, BridgeError::CapacityExceeded(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
