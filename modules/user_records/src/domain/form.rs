use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::contract::{
    client::RecordStoreApi,
    model::{iso_date, Field, RecordId, UserPayload, UserRecord},
};
use crate::domain::dates::{years_between, Clock};
use crate::domain::draft::UserDraft;
use crate::domain::error::DomainError;
use crate::domain::events::RecordEvent;
use crate::domain::mode::{ModeHandle, ModeKind};
use crate::domain::ports::{EventPublisher, Notice, Notifier};
use crate::domain::validator::{validate, validate_draft, ValidationContext, ValidationErrorSet};

pub const DEFAULT_GENDERS: [&str; 3] = ["Male", "Female", "Other"];

pub const MSG_CREATED: &str = "User registered successfully!";
pub const MSG_CREATE_FAILED: &str = "Registration failed!";
pub const MSG_UPDATED: &str = "User updated successfully!";
pub const MSG_UPDATE_FAILED: &str = "Failed to update user. Please try again.";
pub const MSG_CONFLICT: &str = "User already exists!";

/// Mode of the form, derived from the shared coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

/// What a submit attempt ended with. The matching notice has already been issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Local validation failed; nothing was sent.
    Invalid,
    /// Another submit from this form is still in flight; nothing was sent.
    Busy,
    /// The list is showing, not the form; nothing was sent.
    NotShown,
    Created,
    Updated(UserRecord),
    Conflict,
    Failed,
}

/// Age is derived and the name is fixed once the record exists.
pub fn is_field_editable(field: Field, mode: FormMode) -> bool {
    match field {
        Field::Age => false,
        Field::Name => mode == FormMode::Create,
        _ => true,
    }
}

struct FormState {
    draft: UserDraft,
    errors: ValidationErrorSet,
    genders: Vec<String>,
    submitting: bool,
    /// Coordinator generation the draft belongs to; any later transition abandons it.
    generation: u64,
}

impl FormState {
    fn revalidate(&mut self, fields: &[Field]) {
        let ctx = ValidationContext {
            password: &self.draft.password,
            genders: &self.genders,
        };
        for &field in fields {
            let result = validate(field, self.draft.get(field), &ctx);
            self.errors.record(field, result);
        }
    }

    fn reset(&mut self, generation: u64) {
        self.draft = UserDraft::default();
        self.errors.clear();
        self.generation = generation;
    }
}

/// Owns the draft, validates it incrementally and submits it.
pub struct UserFormController {
    store: Arc<dyn RecordStoreApi>,
    notifier: Arc<dyn Notifier>,
    events: Arc<dyn EventPublisher<RecordEvent>>,
    clock: Arc<dyn Clock>,
    modes: ModeHandle,
    state: Mutex<FormState>,
}

impl UserFormController {
    pub fn new(
        store: Arc<dyn RecordStoreApi>,
        notifier: Arc<dyn Notifier>,
        events: Arc<dyn EventPublisher<RecordEvent>>,
        clock: Arc<dyn Clock>,
        modes: ModeHandle,
    ) -> Self {
        let state = FormState {
            draft: UserDraft::default(),
            errors: ValidationErrorSet::default(),
            genders: DEFAULT_GENDERS.iter().map(|g| g.to_string()).collect(),
            submitting: false,
            generation: modes.generation(),
        };
        Self {
            store,
            notifier,
            events,
            clock,
            modes,
            state: Mutex::new(state),
        }
    }

    /// Form mode for the current view. The list view reports `Create`, the
    /// mode the form reopens in; input is refused there regardless.
    pub fn mode(&self) -> FormMode {
        match self.modes.kind() {
            ModeKind::Edit => FormMode::Edit,
            ModeKind::Create | ModeKind::List => FormMode::Create,
        }
    }

    pub fn is_editable(&self, field: Field) -> bool {
        is_field_editable(field, self.mode())
    }

    pub fn draft(&self) -> UserDraft {
        self.lock_state().draft.clone()
    }

    pub fn errors(&self) -> ValidationErrorSet {
        self.lock_state().errors.clone()
    }

    pub fn error(&self, field: Field) -> Option<String> {
        self.lock_state().errors.get(field).map(str::to_string)
    }

    pub fn genders(&self) -> Vec<String> {
        self.state.lock().genders.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.state.lock().submitting
    }

    /// Fetch the gender options; falls back to the built-in set on any failure.
    #[instrument(name = "user_records.form.load_gender_options", skip(self))]
    pub async fn load_gender_options(&self) -> Vec<String> {
        let genders = match self.store.list_genders().await {
            Ok(list) if !list.is_empty() => list,
            Ok(_) => {
                warn!("Store returned no gender options, using defaults");
                DEFAULT_GENDERS.iter().map(|g| g.to_string()).collect()
            }
            Err(e) => {
                warn!("Error fetching genders (using defaults): {}", e);
                DEFAULT_GENDERS.iter().map(|g| g.to_string()).collect()
            }
        };
        self.state.lock().genders = genders.clone();
        genders
    }

    /// Show the form with a fresh empty draft.
    pub fn start_create(&self) {
        self.modes.show_create();
        let generation = self.modes.generation();
        self.state.lock().reset(generation);
        debug!("Started a new draft");
    }

    /// Enter Edit mode with a copy of `record` as the draft. Called by the list
    /// when it hands a record over.
    pub fn begin_edit(&self, record: UserRecord) -> Result<(), DomainError> {
        let draft = UserDraft::from_record(&record, self.clock.today());
        self.modes.begin_edit(record)?;
        let generation = self.modes.generation();
        let mut state = self.state.lock();
        state.draft = draft;
        state.errors.clear();
        state.generation = generation;
        Ok(())
    }

    /// Abandon the edit and return to the list.
    pub fn cancel_edit(&self) -> Result<(), DomainError> {
        let record = self.modes.finish_edit()?;
        debug!(record_id = %record.id, "Edit cancelled");
        let generation = self.modes.generation();
        self.state.lock().reset(generation);
        Ok(())
    }

    /// Update the draft and re-validate what changed.
    ///
    /// A `dob` change re-derives `age` and validates both together. A
    /// `password` change re-checks the confirmation once it has been entered.
    pub fn on_field_change(&self, field: Field, value: &str) -> Result<(), DomainError> {
        if self.modes.kind() == ModeKind::List {
            return Err(DomainError::invalid_transition(ModeKind::List, "edit a field"));
        }
        if !self.is_editable(field) {
            return Err(DomainError::read_only_field(field));
        }
        let today = self.clock.today();

        let mut state = self.lock_state();
        state.draft.set(field, value);
        match field {
            Field::Dob => {
                state.draft.age = iso_date::parse(value)
                    .map(|dob| years_between(dob, today).to_string())
                    .unwrap_or_default();
                state.revalidate(&[Field::Dob, Field::Age]);
            }
            Field::Password => {
                let confirm_touched = !state.draft.confirm_password.is_empty()
                    || state.errors.get(Field::ConfirmPassword).is_some();
                if confirm_touched {
                    state.revalidate(&[Field::Password, Field::ConfirmPassword]);
                } else {
                    state.revalidate(&[Field::Password]);
                }
            }
            _ => state.revalidate(&[field]),
        }
        Ok(())
    }

    /// Re-validate a field the operator left, typed into or not.
    pub fn on_field_blur(&self, field: Field) {
        self.lock_state().revalidate(&[field]);
    }

    /// Validate everything and, when clean, send the draft to the store.
    #[instrument(name = "user_records.form.submit", skip(self))]
    pub async fn on_submit(&self) -> SubmitOutcome {
        if self.modes.kind() == ModeKind::List {
            debug!("Submit ignored, the form is not shown");
            return SubmitOutcome::NotShown;
        }
        let mode = self.mode();
        let (payload, id, generation) = {
            let mut state = self.lock_state();
            if state.submitting {
                debug!("Submit ignored, request already in flight");
                return SubmitOutcome::Busy;
            }

            state.errors = validate_draft(&state.draft, &state.genders);
            if !state.errors.is_empty() {
                debug!("Submit blocked by {} invalid field(s)", state.errors.len());
                return SubmitOutcome::Invalid;
            }

            let payload = match state.draft.to_payload() {
                Ok(payload) => payload,
                Err(field) => {
                    state
                        .errors
                        .record(field, Some(format!("Invalid value for {field}")));
                    return SubmitOutcome::Invalid;
                }
            };
            state.submitting = true;
            (payload, state.draft.id.clone(), state.generation)
        };

        let outcome = match mode {
            FormMode::Create => self.submit_create(payload, generation).await,
            FormMode::Edit => self.submit_update(id, payload, generation).await,
        };

        self.state.lock().submitting = false;
        outcome
    }

    async fn submit_create(&self, payload: UserPayload, generation: u64) -> SubmitOutcome {
        info!("Registering new user");
        match self.store.create_record(&payload).await {
            Ok(()) => {
                info!("User registered successfully");
                self.notifier.notify(Notice::success(MSG_CREATED));
                if self.is_current(generation) {
                    self.reset();
                } else {
                    debug!("Mode changed while registering, keeping the current draft");
                }
                self.events
                    .publish(&RecordEvent::Created { name: payload.name });
                SubmitOutcome::Created
            }
            Err(e) if e.is_conflict() => {
                warn!("Registration rejected as duplicate: {}", e);
                self.notifier.notify(Notice::error(MSG_CONFLICT));
                SubmitOutcome::Conflict
            }
            Err(e) => {
                error!("Error registering user: {}", e);
                self.notifier.notify(Notice::error(MSG_CREATE_FAILED));
                SubmitOutcome::Failed
            }
        }
    }

    async fn submit_update(
        &self,
        id: Option<RecordId>,
        payload: UserPayload,
        generation: u64,
    ) -> SubmitOutcome {
        let Some(id) = id else {
            error!("Edit draft has no record id, refusing to update");
            self.notifier.notify(Notice::error(MSG_UPDATE_FAILED));
            return SubmitOutcome::Failed;
        };

        info!(record_id = %id, "Updating user");
        match self.store.update_record(&id, &payload).await {
            Ok(()) => {
                let record = payload.into_record(id);
                info!(record_id = %record.id, "User updated successfully");
                self.notifier.notify(Notice::success(MSG_UPDATED));
                self.events.publish(&RecordEvent::Updated(record.clone()));
                if !self.is_current(generation) {
                    debug!("Edit left before the update resolved, keeping the current mode");
                } else if let Err(e) = self.modes.finish_edit() {
                    debug!("Could not leave edit after update: {}", e);
                } else {
                    self.reset();
                }
                SubmitOutcome::Updated(record)
            }
            Err(e) if e.is_conflict() => {
                warn!(record_id = %id, "Update rejected as duplicate: {}", e);
                self.notifier.notify(Notice::error(MSG_CONFLICT));
                SubmitOutcome::Conflict
            }
            Err(e) => {
                error!(record_id = %id, "Error updating user: {}", e);
                self.notifier.notify(Notice::error(MSG_UPDATE_FAILED));
                SubmitOutcome::Failed
            }
        }
    }

    /// Whether the mode the submit started in is still the current one.
    fn is_current(&self, generation: u64) -> bool {
        self.modes.generation() == generation
    }

    fn reset(&self) {
        let generation = self.modes.generation();
        self.state.lock().reset(generation);
    }

    /// Lock the state, first dropping a draft whose mode has since been left.
    fn lock_state(&self) -> MutexGuard<'_, FormState> {
        let generation = self.modes.generation();
        let mut state = self.state.lock();
        if state.generation != generation {
            debug!("Mode changed, abandoning draft");
            state.reset(generation);
        }
        state
    }
}
