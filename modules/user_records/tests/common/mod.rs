//! Shared fakes for the controller tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use tokio::sync::Notify;

use user_records::contract::{
    client::RecordStoreApi,
    error::RecordStoreError,
    model::{RecordId, UserPayload, UserRecord},
};
use user_records::domain::dates::FixedClock;
use user_records::domain::mode::EntryPoint;
use user_records::domain::ports::{Confirmer, Notice, Notifier};
use user_records::UserRecords;

/// Operation names used to script the fake store.
pub const LIST_GENDERS: &str = "list_genders";
pub const LIST_RECORDS: &str = "list_records";
pub const CREATE: &str = "create_record";
pub const UPDATE: &str = "update_record";
pub const DELETE: &str = "delete_record";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListGenders,
    ListRecords,
    Create(UserPayload),
    Update(RecordId, UserPayload),
    Delete(RecordId),
}

/// In-memory store that records every call. Failures and gates are scripted
/// per operation; a gated operation waits for [`MockStore::release`].
#[derive(Default)]
pub struct MockStore {
    records: Mutex<Vec<UserRecord>>,
    genders: Mutex<Vec<String>>,
    failures: Mutex<HashMap<&'static str, RecordStoreError>>,
    gated: Mutex<HashSet<&'static str>>,
    gate: Notify,
    calls: Mutex<Vec<Call>>,
}

impl MockStore {
    pub fn with_records(records: Vec<UserRecord>) -> Arc<Self> {
        let store = Self::default();
        *store.records.lock() = records;
        Arc::new(store)
    }

    pub fn set_genders(&self, genders: &[&str]) {
        *self.genders.lock() = genders.iter().map(|g| g.to_string()).collect();
    }

    pub fn fail(&self, op: &'static str, err: RecordStoreError) {
        self.failures.lock().insert(op, err);
    }

    pub fn hold(&self, op: &'static str) {
        self.gated.lock().insert(op);
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    async fn enter(&self, op: &'static str, call: Call) -> Result<(), RecordStoreError> {
        self.calls.lock().push(call);
        let gated = self.gated.lock().contains(op);
        if gated {
            self.gate.notified().await;
        }
        match self.failures.lock().get(op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RecordStoreApi for MockStore {
    async fn list_genders(&self) -> Result<Vec<String>, RecordStoreError> {
        self.enter(LIST_GENDERS, Call::ListGenders).await?;
        Ok(self.genders.lock().clone())
    }

    async fn list_records(&self) -> Result<Vec<UserRecord>, RecordStoreError> {
        self.enter(LIST_RECORDS, Call::ListRecords).await?;
        Ok(self.records.lock().clone())
    }

    async fn create_record(&self, payload: &UserPayload) -> Result<(), RecordStoreError> {
        self.enter(CREATE, Call::Create(payload.clone())).await?;
        let id = RecordId::new(format!("r{}", self.records.lock().len() + 1));
        self.records.lock().push(payload.clone().into_record(id));
        Ok(())
    }

    async fn update_record(
        &self,
        id: &RecordId,
        payload: &UserPayload,
    ) -> Result<(), RecordStoreError> {
        self.enter(UPDATE, Call::Update(id.clone(), payload.clone()))
            .await?;
        let mut records = self.records.lock();
        if let Some(slot) = records.iter_mut().find(|r| &r.id == id) {
            *slot = payload.clone().into_record(id.clone());
        }
        Ok(())
    }

    async fn delete_record(&self, id: &RecordId) -> Result<(), RecordStoreError> {
        self.enter(DELETE, Call::Delete(id.clone())).await?;
        self.records.lock().retain(|r| &r.id != id);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices.lock().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

/// Answers every prompt with a fixed decision and remembers the prompts.
pub struct FixedConfirmer {
    answer: bool,
    prompts: Mutex<Vec<String>>,
}

impl FixedConfirmer {
    pub fn new(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl Confirmer for FixedConfirmer {
    async fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().push(prompt.to_string());
        self.answer
    }
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

pub fn record(id: &str, name: &str) -> UserRecord {
    UserRecord {
        id: RecordId::new(id),
        name: name.to_string(),
        age: 36,
        dob: NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
        password: "Secret123@".to_string(),
        confirm_password: "Secret123@".to_string(),
        gender: "Female".to_string(),
        about: "Wrote the first program".to_string(),
    }
}

pub struct Harness {
    pub store: Arc<MockStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub confirmer: Arc<FixedConfirmer>,
    pub app: UserRecords,
}

pub fn harness(store: Arc<MockStore>, confirm: bool, entry: EntryPoint) -> Harness {
    let notifier = Arc::new(RecordingNotifier::default());
    let confirmer = FixedConfirmer::new(confirm);
    let app = UserRecords::new(
        store.clone(),
        notifier.clone(),
        confirmer.clone(),
        Arc::new(FixedClock(today())),
        entry,
    );
    Harness {
        store,
        notifier,
        confirmer,
        app,
    }
}
