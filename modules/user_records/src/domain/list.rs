use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use crate::contract::{
    client::RecordStoreApi,
    model::{RecordId, UserRecord},
};
use crate::domain::error::DomainError;
use crate::domain::events::RecordEvent;
use crate::domain::form::UserFormController;
use crate::domain::mode::{ModeHandle, ModeKind};
use crate::domain::ports::{Confirmer, EventPublisher, Notice, Notifier};

pub const MSG_FETCH_FAILED: &str = "Failed to fetch users. Please try again.";
pub const MSG_DELETE_FAILED: &str = "Failed to delete user. Please try again.";
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this user?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded(usize),
    /// A fetch is already outstanding; nothing was sent.
    AlreadyLoading,
    /// The operator navigated away before the response arrived; it was dropped.
    Superseded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The operator did not confirm; nothing was sent.
    Declined,
    /// No such record in the local collection; nothing was sent.
    NotFound,
    /// A delete for this record is already in flight; nothing was sent.
    Busy,
    Failed,
}

#[derive(Default)]
struct ListState {
    records: Vec<UserRecord>,
    loading: bool,
    error: Option<String>,
    pending_deletes: HashSet<RecordId>,
}

/// Holds the authoritative local collection. It changes only after the store
/// confirmed a read or a write.
pub struct UserListController {
    store: Arc<dyn RecordStoreApi>,
    notifier: Arc<dyn Notifier>,
    confirmer: Arc<dyn Confirmer>,
    modes: ModeHandle,
    state: Mutex<ListState>,
}

impl UserListController {
    pub fn new(
        store: Arc<dyn RecordStoreApi>,
        notifier: Arc<dyn Notifier>,
        confirmer: Arc<dyn Confirmer>,
        modes: ModeHandle,
    ) -> Self {
        Self {
            store,
            notifier,
            confirmer,
            modes,
            state: Mutex::new(ListState::default()),
        }
    }

    pub fn records(&self) -> Vec<UserRecord> {
        self.state.lock().records.clone()
    }

    pub fn find(&self, id: &RecordId) -> Option<UserRecord> {
        self.state
            .lock()
            .records
            .iter()
            .find(|r| &r.id == id)
            .cloned()
    }

    /// True while a fetch is outstanding; the view disables its fetch trigger.
    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    /// Message of the last failed fetch or delete.
    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    pub fn is_visible(&self) -> bool {
        self.modes.kind() == ModeKind::List
    }

    /// Replace the local collection with the store's and show the list.
    #[instrument(name = "user_records.list.fetch_all", skip(self))]
    pub async fn fetch_all(&self) -> FetchOutcome {
        let generation = {
            let mut state = self.state.lock();
            if state.loading {
                debug!("Fetch ignored, one is already outstanding");
                return FetchOutcome::AlreadyLoading;
            }
            state.loading = true;
            state.error = None;
            self.modes.generation()
        };

        let result = self.store.list_records().await;

        let mut state = self.state.lock();
        state.loading = false;
        if self.modes.generation() != generation {
            debug!("Discarding fetch result, mode changed while it was outstanding");
            return FetchOutcome::Superseded;
        }

        match result {
            Ok(records) => {
                let count = records.len();
                state.records = records;
                drop(state);
                self.modes.show_list();
                info!("Fetched {} users", count);
                FetchOutcome::Loaded(count)
            }
            Err(e) => {
                error!("Error fetching users: {}", e);
                state.error = Some(MSG_FETCH_FAILED.to_string());
                drop(state);
                self.notifier.notify(Notice::error(MSG_FETCH_FAILED));
                FetchOutcome::Failed
            }
        }
    }

    /// Hand the record with `id` to the form and switch to Edit mode.
    /// Returns `false` when the id is not in the local collection.
    pub fn begin_edit(
        &self,
        id: &RecordId,
        form: &UserFormController,
    ) -> Result<bool, DomainError> {
        let Some(record) = self.find(id) else {
            debug!(record_id = %id, "Edit requested for unknown record");
            return Ok(false);
        };
        form.begin_edit(record)?;
        debug!(record_id = %id, "Editing user");
        Ok(true)
    }

    /// Delete after explicit confirmation; the local entry goes only once the
    /// store confirmed.
    #[instrument(name = "user_records.list.delete_record", skip_all, fields(record_id = %id))]
    pub async fn delete_record(&self, id: &RecordId) -> DeleteOutcome {
        {
            let state = self.state.lock();
            if state.pending_deletes.contains(id) {
                return DeleteOutcome::Busy;
            }
            if !state.records.iter().any(|r| &r.id == id) {
                debug!("Delete requested for unknown record");
                return DeleteOutcome::NotFound;
            }
        }

        if !self.confirmer.confirm(DELETE_PROMPT).await {
            info!("Delete declined");
            return DeleteOutcome::Declined;
        }

        if !self.state.lock().pending_deletes.insert(id.clone()) {
            return DeleteOutcome::Busy;
        }

        let result = self.store.delete_record(id).await;

        let mut state = self.state.lock();
        state.pending_deletes.remove(id);
        match result {
            Ok(()) => {
                state.records.retain(|r| &r.id != id);
                info!("User deleted");
                DeleteOutcome::Deleted
            }
            Err(e) => {
                error!("Error deleting user: {}", e);
                state.error = Some(MSG_DELETE_FAILED.to_string());
                drop(state);
                self.notifier.notify(Notice::error(MSG_DELETE_FAILED));
                DeleteOutcome::Failed
            }
        }
    }
}

impl EventPublisher<RecordEvent> for UserListController {
    fn publish(&self, event: &RecordEvent) {
        match event {
            RecordEvent::Updated(record) => {
                let mut state = self.state.lock();
                if let Some(slot) = state.records.iter_mut().find(|r| r.id == record.id) {
                    *slot = record.clone();
                    debug!(record_id = %record.id, "Applied confirmed update to list");
                }
            }
            // The list is refreshed explicitly, never on create.
            RecordEvent::Created { .. } => {}
        }
    }
}
