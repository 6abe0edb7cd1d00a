//! The instrumented controller paths run cleanly under a tracing subscriber.

mod common;

use tracing_test::traced_test;

use common::{harness, record, MockStore, CREATE};
use user_records::contract::error::RecordStoreError;
use user_records::contract::model::{Field, RecordId};
use user_records::domain::form::SubmitOutcome;
use user_records::domain::list::{DeleteOutcome, FetchOutcome};
use user_records::domain::mode::EntryPoint;

#[traced_test]
#[tokio::test]
async fn list_paths_emit_spans() {
    let h = harness(
        MockStore::with_records(vec![record("r1", "Grace")]),
        true,
        EntryPoint::List,
    );

    assert_eq!(h.app.list().fetch_all().await, FetchOutcome::Loaded(1));
    assert_eq!(
        h.app.list().delete_record(&RecordId::new("r1")).await,
        DeleteOutcome::Deleted
    );
}

#[traced_test]
#[tokio::test]
async fn failed_submit_emits_spans() {
    let store = MockStore::with_records(vec![]);
    store.fail(CREATE, RecordStoreError::transport("refused"));
    let h = harness(store, true, EntryPoint::Create);
    let form = h.app.form();

    form.on_field_change(Field::Name, "Ada").unwrap();
    form.on_field_change(Field::Dob, "1990-05-17").unwrap();
    form.on_field_change(Field::Password, "Secret123@").unwrap();
    form.on_field_change(Field::ConfirmPassword, "Secret123@")
        .unwrap();
    form.on_field_change(Field::Gender, "Other").unwrap();
    form.on_field_change(Field::About, "Analyst").unwrap();

    assert_eq!(form.on_submit().await, SubmitOutcome::Failed);
}
