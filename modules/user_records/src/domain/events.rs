use crate::contract::model::UserRecord;

/// Confirmed writes, published after the store accepted them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordEvent {
    /// The store assigns the id and the create response carries none.
    Created { name: String },
    Updated(UserRecord),
}
