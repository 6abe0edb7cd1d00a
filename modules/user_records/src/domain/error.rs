use thiserror::Error;

use crate::contract::model::Field;
use crate::domain::mode::ModeKind;

/// Misuse of the controllers by the view layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Field '{field}' is read-only")]
    ReadOnlyField { field: Field },

    #[error("Cannot {event} while in {from} mode")]
    InvalidTransition { from: ModeKind, event: &'static str },
}

impl DomainError {
    pub fn read_only_field(field: Field) -> Self {
        Self::ReadOnlyField { field }
    }

    pub fn invalid_transition(from: ModeKind, event: &'static str) -> Self {
        Self::InvalidTransition { from, event }
    }
}
