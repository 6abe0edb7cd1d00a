use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::contract::model::UserRecord;
use crate::domain::error::DomainError;

/// Discriminant of [`ViewMode`], for logs and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    List,
    Create,
    Edit,
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModeKind::List => "list",
            ModeKind::Create => "create",
            ModeKind::Edit => "edit",
        })
    }
}

/// Which view is shown first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntryPoint {
    #[default]
    Create,
    List,
}

/// The single active top-level view. Edit always carries its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewMode {
    List,
    Create,
    Edit(Box<UserRecord>),
}

impl ViewMode {
    pub fn kind(&self) -> ModeKind {
        match self {
            ViewMode::List => ModeKind::List,
            ViewMode::Create => ModeKind::Create,
            ViewMode::Edit(_) => ModeKind::Edit,
        }
    }

    pub fn edit_target(&self) -> Option<&UserRecord> {
        match self {
            ViewMode::Edit(record) => Some(record),
            _ => None,
        }
    }

    pub fn shows_list(&self) -> bool {
        matches!(self, ViewMode::List)
    }

    pub fn shows_form(&self) -> bool {
        !self.shows_list()
    }
}

/// State machine over [`ViewMode`].
///
/// | From | Event      | To           |
/// |------|------------|--------------|
/// | List | begin_edit | Edit(record) |
/// | Edit | finish_edit (update success / cancel) | List |
/// | any  | show_list  | List         |
/// | any  | show_create| Create       |
///
/// Every transition that changes the mode bumps `generation`.
#[derive(Debug)]
pub struct ModeCoordinator {
    mode: ViewMode,
    generation: u64,
}

impl ModeCoordinator {
    pub fn new(entry: EntryPoint) -> Self {
        let mode = match entry {
            EntryPoint::Create => ViewMode::Create,
            EntryPoint::List => ViewMode::List,
        };
        Self {
            mode,
            generation: 0,
        }
    }

    pub fn mode(&self) -> &ViewMode {
        &self.mode
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn begin_edit(&mut self, record: UserRecord) -> Result<(), DomainError> {
        match self.mode {
            ViewMode::List => {
                self.transition(ViewMode::Edit(Box::new(record)));
                Ok(())
            }
            _ => Err(DomainError::invalid_transition(self.mode.kind(), "begin edit")),
        }
    }

    /// Leave Edit mode; returns the record that was being edited.
    pub fn finish_edit(&mut self) -> Result<UserRecord, DomainError> {
        match std::mem::replace(&mut self.mode, ViewMode::List) {
            ViewMode::Edit(record) => {
                self.generation += 1;
                debug!(generation = self.generation, "mode edit -> list");
                Ok(*record)
            }
            other => {
                let from = other.kind();
                self.mode = other;
                Err(DomainError::invalid_transition(from, "finish edit"))
            }
        }
    }

    pub fn show_list(&mut self) {
        self.transition(ViewMode::List);
    }

    pub fn show_create(&mut self) {
        self.transition(ViewMode::Create);
    }

    fn transition(&mut self, to: ViewMode) {
        if self.mode == to {
            return;
        }
        let from = self.mode.kind();
        self.mode = to;
        self.generation += 1;
        debug!(generation = self.generation, "mode {} -> {}", from, self.mode.kind());
    }
}

/// Shared handle to the one [`ModeCoordinator`]. The lock is only held for the
/// duration of a call, never across an await.
#[derive(Debug, Clone)]
pub struct ModeHandle(Arc<Mutex<ModeCoordinator>>);

impl ModeHandle {
    pub fn new(entry: EntryPoint) -> Self {
        Self(Arc::new(Mutex::new(ModeCoordinator::new(entry))))
    }

    /// Current mode (cloned).
    pub fn current(&self) -> ViewMode {
        self.0.lock().mode().clone()
    }

    pub fn kind(&self) -> ModeKind {
        self.0.lock().mode().kind()
    }

    pub fn generation(&self) -> u64 {
        self.0.lock().generation()
    }

    pub fn begin_edit(&self, record: UserRecord) -> Result<(), DomainError> {
        self.0.lock().begin_edit(record)
    }

    pub fn finish_edit(&self) -> Result<UserRecord, DomainError> {
        self.0.lock().finish_edit()
    }

    pub fn show_list(&self) {
        self.0.lock().show_list();
    }

    pub fn show_create(&self) {
        self.0.lock().show_create();
    }
}
