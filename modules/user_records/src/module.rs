use std::sync::Arc;

use tracing::info;
use url::Url;

use crate::contract::client::RecordStoreApi;
use crate::domain::dates::Clock;
use crate::domain::events::RecordEvent;
use crate::domain::form::UserFormController;
use crate::domain::list::UserListController;
use crate::domain::mode::{EntryPoint, ModeHandle};
use crate::domain::ports::{Confirmer, EventPublisher, Notifier};
use crate::infra::http::{HttpRecordStore, TracedClient};

/// One wired instance: a single mode coordinator shared by the list and the
/// form, with confirmed updates flowing from the form into the list.
pub struct UserRecords {
    modes: ModeHandle,
    list: Arc<UserListController>,
    form: UserFormController,
}

impl UserRecords {
    pub fn new(
        store: Arc<dyn RecordStoreApi>,
        notifier: Arc<dyn Notifier>,
        confirmer: Arc<dyn Confirmer>,
        clock: Arc<dyn Clock>,
        entry: EntryPoint,
    ) -> Self {
        let modes = ModeHandle::new(entry);
        let list = Arc::new(UserListController::new(
            store.clone(),
            notifier.clone(),
            confirmer,
            modes.clone(),
        ));
        let events: Arc<dyn EventPublisher<RecordEvent>> = list.clone();
        let form = UserFormController::new(store, notifier, events, clock, modes.clone());
        info!(entry = ?entry, "user_records wired");
        Self { modes, list, form }
    }

    /// Wire against the REST store at `base_url`.
    pub fn over_http(
        client: TracedClient,
        base_url: Url,
        notifier: Arc<dyn Notifier>,
        confirmer: Arc<dyn Confirmer>,
        clock: Arc<dyn Clock>,
        entry: EntryPoint,
    ) -> Self {
        let store: Arc<dyn RecordStoreApi> = Arc::new(HttpRecordStore::new(client, base_url));
        Self::new(store, notifier, confirmer, clock, entry)
    }

    pub fn modes(&self) -> &ModeHandle {
        &self.modes
    }

    pub fn list(&self) -> &UserListController {
        &self.list
    }

    pub fn form(&self) -> &UserFormController {
        &self.form
    }
}
