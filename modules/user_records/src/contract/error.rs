use thiserror::Error;

/// Failures reported by a record store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordStoreError {
    /// Duplicate identity (the store answers 400).
    #[error("Record already exists: {message}")]
    Conflict { message: String },

    /// Anything else: connection failures, unexpected statuses, undecodable bodies.
    #[error("Record store unavailable: {message}")]
    Transport { message: String },
}

impl RecordStoreError {
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
