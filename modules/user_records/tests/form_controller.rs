mod common;

use common::{harness, record, Call, MockStore, CREATE, LIST_GENDERS, UPDATE};
use user_records::contract::error::RecordStoreError;
use user_records::contract::model::{Field, RecordId};
use user_records::domain::error::DomainError;
use user_records::domain::form::{
    FormMode, SubmitOutcome, UserFormController, DEFAULT_GENDERS, MSG_CONFLICT, MSG_CREATED,
    MSG_CREATE_FAILED, MSG_UPDATED, MSG_UPDATE_FAILED,
};
use user_records::domain::list::FetchOutcome;
use user_records::domain::mode::{EntryPoint, ModeKind};
use user_records::domain::ports::{Notice, NoticeLevel};

fn fill_valid(form: &UserFormController) {
    form.on_field_change(Field::Name, "Ada Lovelace").unwrap();
    form.on_field_change(Field::Dob, "1990-05-17").unwrap();
    form.on_field_change(Field::Password, "Secret123@").unwrap();
    form.on_field_change(Field::ConfirmPassword, "Secret123@")
        .unwrap();
    form.on_field_change(Field::Gender, "Female").unwrap();
    form.on_field_change(Field::About, "Wrote the first program")
        .unwrap();
}

#[test]
fn dob_change_derives_age() {
    let h = harness(MockStore::with_records(vec![]), true, EntryPoint::Create);
    let form = h.app.form();

    form.on_field_change(Field::Dob, "2006-10-18").unwrap();

    assert_eq!(form.draft().age, "20");
    assert_eq!(form.error(Field::Dob), None);
    assert_eq!(form.error(Field::Age), None);

    form.on_field_change(Field::Dob, "2006-10-19").unwrap();
    assert_eq!(form.draft().age, "19");
}

#[test]
fn future_dob_fails_age_range() {
    let h = harness(MockStore::with_records(vec![]), true, EntryPoint::Create);
    let form = h.app.form();

    form.on_field_change(Field::Dob, "2030-01-01").unwrap();

    assert_eq!(form.draft().age, "-4");
    assert_eq!(
        form.error(Field::Age).as_deref(),
        Some("Age must be between 0 and 120")
    );
}

#[test]
fn unparseable_dob_clears_age() {
    let h = harness(MockStore::with_records(vec![]), true, EntryPoint::Create);
    let form = h.app.form();

    form.on_field_change(Field::Dob, "2006-10-18").unwrap();
    form.on_field_change(Field::Dob, "18/10/2006").unwrap();

    assert_eq!(form.draft().age, "");
    assert_eq!(
        form.error(Field::Dob).as_deref(),
        Some("Date of Birth must be a valid date (YYYY-MM-DD)")
    );
}

#[test]
fn age_is_never_editable() {
    let h = harness(MockStore::with_records(vec![]), true, EntryPoint::Create);
    let form = h.app.form();

    assert!(!form.is_editable(Field::Age));
    assert_eq!(
        form.on_field_change(Field::Age, "33"),
        Err(DomainError::read_only_field(Field::Age))
    );
    assert_eq!(form.draft().age, "");
}

#[test]
fn password_change_rechecks_entered_confirmation() {
    let h = harness(MockStore::with_records(vec![]), true, EntryPoint::Create);
    let form = h.app.form();

    form.on_field_change(Field::Password, "Secret123@").unwrap();
    assert_eq!(form.error(Field::ConfirmPassword), None);

    form.on_field_change(Field::ConfirmPassword, "Secret123@")
        .unwrap();
    assert_eq!(form.error(Field::ConfirmPassword), None);

    form.on_field_change(Field::Password, "Secret123@x").unwrap();
    assert_eq!(
        form.error(Field::ConfirmPassword).as_deref(),
        Some("Passwords do not match")
    );
}

#[test]
fn blur_validates_untouched_field() {
    let h = harness(MockStore::with_records(vec![]), true, EntryPoint::Create);
    let form = h.app.form();

    form.on_field_blur(Field::About);

    assert_eq!(
        form.error(Field::About).as_deref(),
        Some("About section is required")
    );
}

#[tokio::test]
async fn invalid_submit_sends_nothing() {
    let h = harness(MockStore::with_records(vec![]), true, EntryPoint::Create);
    let form = h.app.form();
    form.on_field_change(Field::Name, "A").unwrap();

    let outcome = form.on_submit().await;

    assert_eq!(outcome, SubmitOutcome::Invalid);
    assert!(h.store.calls().is_empty());
    assert!(h.notifier.notices().is_empty());
    let errors = form.errors();
    assert_eq!(
        errors.get(Field::Name),
        Some("Name must be at least 2 characters")
    );
    assert_eq!(errors.get(Field::Dob), Some("Date of Birth is required"));
    assert_eq!(errors.get(Field::Gender), Some("Please select a gender"));
    assert_eq!(form.draft().name, "A");
}

#[tokio::test]
async fn create_success_notifies_and_resets() {
    let h = harness(MockStore::with_records(vec![]), true, EntryPoint::Create);
    let form = h.app.form();
    fill_valid(form);

    let outcome = form.on_submit().await;

    assert_eq!(outcome, SubmitOutcome::Created);
    assert_eq!(h.notifier.notices(), vec![Notice::success(MSG_CREATED)]);
    let calls = h.store.calls();
    assert_eq!(calls.len(), 1);
    match &calls[0] {
        Call::Create(payload) => {
            assert_eq!(payload.name, "Ada Lovelace");
            assert_eq!(payload.age, 36);
            assert_eq!(payload.confirm_password, "Secret123@");
        }
        other => panic!("unexpected call {other:?}"),
    }
    assert_eq!(form.draft().name, "");
    assert!(form.errors().is_empty());
    assert_eq!(h.app.modes().kind(), ModeKind::Create);
    assert!(!form.is_submitting());
}

#[tokio::test]
async fn create_conflict_keeps_draft() {
    let store = MockStore::with_records(vec![]);
    store.fail(CREATE, RecordStoreError::conflict("User already exists"));
    let h = harness(store, true, EntryPoint::Create);
    let form = h.app.form();
    fill_valid(form);

    let outcome = form.on_submit().await;

    assert_eq!(outcome, SubmitOutcome::Conflict);
    assert_eq!(h.notifier.last(), Some(Notice::error(MSG_CONFLICT)));
    assert_eq!(form.draft().name, "Ada Lovelace");
}

#[tokio::test]
async fn create_transport_failure_is_generic() {
    let store = MockStore::with_records(vec![]);
    store.fail(CREATE, RecordStoreError::transport("connection refused"));
    let h = harness(store, true, EntryPoint::Create);
    let form = h.app.form();
    fill_valid(form);

    assert_eq!(form.on_submit().await, SubmitOutcome::Failed);
    assert_eq!(h.notifier.last(), Some(Notice::error(MSG_CREATE_FAILED)));
    assert!(!form.is_submitting());
}

#[tokio::test]
async fn second_submit_while_in_flight_is_busy() {
    let store = MockStore::with_records(vec![]);
    store.hold(CREATE);
    let h = harness(store, true, EntryPoint::Create);
    let form = h.app.form();
    fill_valid(form);

    let (first, second) = tokio::join!(form.on_submit(), async {
        let outcome = form.on_submit().await;
        h.store.release();
        outcome
    });

    assert_eq!(first, SubmitOutcome::Created);
    assert_eq!(second, SubmitOutcome::Busy);
    assert_eq!(h.store.calls().len(), 1);
}

#[tokio::test]
async fn gender_options_fall_back_to_defaults() {
    let store = MockStore::with_records(vec![]);
    store.fail(LIST_GENDERS, RecordStoreError::transport("down"));
    let h = harness(store, true, EntryPoint::Create);

    let genders = h.app.form().load_gender_options().await;

    assert_eq!(genders, DEFAULT_GENDERS.map(String::from).to_vec());
}

#[tokio::test]
async fn empty_gender_list_falls_back_to_defaults() {
    let h = harness(MockStore::with_records(vec![]), true, EntryPoint::Create);

    let genders = h.app.form().load_gender_options().await;

    assert_eq!(genders.len(), DEFAULT_GENDERS.len());
}

#[tokio::test]
async fn loaded_genders_drive_validation() {
    let store = MockStore::with_records(vec![]);
    store.set_genders(&["Woman", "Man"]);
    let h = harness(store, true, EntryPoint::Create);
    let form = h.app.form();

    assert_eq!(form.load_gender_options().await, vec!["Woman", "Man"]);

    form.on_field_change(Field::Gender, "Female").unwrap();
    assert_eq!(
        form.error(Field::Gender).as_deref(),
        Some("Please select a valid gender")
    );
    form.on_field_change(Field::Gender, "Woman").unwrap();
    assert_eq!(form.error(Field::Gender), None);
}

#[tokio::test]
async fn edit_preloads_draft_and_locks_name() {
    let store = MockStore::with_records(vec![record("r1", "Grace")]);
    let h = harness(store, true, EntryPoint::List);
    h.app.list().fetch_all().await;

    assert!(h
        .app
        .list()
        .begin_edit(&RecordId::new("r1"), h.app.form())
        .unwrap());
    let form = h.app.form();

    assert_eq!(form.mode(), FormMode::Edit);
    let draft = form.draft();
    assert_eq!(draft.id, Some(RecordId::new("r1")));
    assert_eq!(draft.name, "Grace");
    assert_eq!(draft.age, "36");
    assert_eq!(draft.confirm_password, draft.password);
    assert_eq!(
        form.on_field_change(Field::Name, "Hopper"),
        Err(DomainError::read_only_field(Field::Name))
    );
    assert_eq!(form.draft().name, "Grace");
}

#[tokio::test]
async fn edit_success_returns_to_list_with_update_applied() {
    let store = MockStore::with_records(vec![record("r1", "Grace"), record("r2", "Alan")]);
    let h = harness(store, true, EntryPoint::List);
    h.app.list().fetch_all().await;
    h.app
        .list()
        .begin_edit(&RecordId::new("r1"), h.app.form())
        .unwrap();
    let form = h.app.form();

    form.on_field_change(Field::About, "Invented the compiler")
        .unwrap();
    let outcome = form.on_submit().await;

    let SubmitOutcome::Updated(updated) = outcome else {
        panic!("expected update, got {outcome:?}");
    };
    assert_eq!(updated.id, RecordId::new("r1"));
    assert_eq!(h.notifier.last(), Some(Notice::success(MSG_UPDATED)));
    assert_eq!(h.app.modes().kind(), ModeKind::List);
    assert!(h.app.list().is_visible());
    assert_eq!(
        h.app.list().find(&RecordId::new("r1")).unwrap().about,
        "Invented the compiler"
    );
    assert_eq!(h.app.list().records().len(), 2);
    assert!(matches!(
        h.store.calls().last(),
        Some(Call::Update(id, _)) if id == &RecordId::new("r1")
    ));
    assert_eq!(form.draft().id, None);
}

#[tokio::test]
async fn edit_failure_stays_in_edit() {
    let store = MockStore::with_records(vec![record("r1", "Grace")]);
    store.fail(UPDATE, RecordStoreError::transport("boom"));
    let h = harness(store, true, EntryPoint::List);
    h.app.list().fetch_all().await;
    h.app
        .list()
        .begin_edit(&RecordId::new("r1"), h.app.form())
        .unwrap();

    assert_eq!(h.app.form().on_submit().await, SubmitOutcome::Failed);
    assert_eq!(h.notifier.last(), Some(Notice::error(MSG_UPDATE_FAILED)));
    assert_eq!(h.app.modes().kind(), ModeKind::Edit);
    assert_eq!(
        h.app.list().find(&RecordId::new("r1")).unwrap().about,
        "Wrote the first program"
    );
}

#[tokio::test]
async fn cancel_edit_returns_to_list_and_drops_draft() {
    let store = MockStore::with_records(vec![record("r1", "Grace")]);
    let h = harness(store, true, EntryPoint::List);
    h.app.list().fetch_all().await;
    h.app
        .list()
        .begin_edit(&RecordId::new("r1"), h.app.form())
        .unwrap();

    h.app.form().cancel_edit().unwrap();

    assert_eq!(h.app.modes().kind(), ModeKind::List);
    assert_eq!(h.app.form().draft().name, "");
    assert!(h.store.calls().iter().all(|c| !matches!(c, Call::Update(..))));
}

#[test]
fn begin_edit_outside_list_is_rejected() {
    let h = harness(MockStore::with_records(vec![]), true, EntryPoint::Create);

    let err = h.app.form().begin_edit(record("r1", "Grace")).unwrap_err();

    assert_eq!(
        err,
        DomainError::invalid_transition(ModeKind::Create, "begin edit")
    );
    assert_eq!(h.app.form().mode(), FormMode::Create);
}

#[tokio::test]
async fn leaving_edit_abandons_the_draft() {
    let store = MockStore::with_records(vec![record("r1", "Grace")]);
    let h = harness(store, true, EntryPoint::List);
    h.app.list().fetch_all().await;
    h.app
        .list()
        .begin_edit(&RecordId::new("r1"), h.app.form())
        .unwrap();
    h.app.form().on_field_change(Field::About, "changed").unwrap();

    h.app.modes().show_create();

    let form = h.app.form();
    assert_eq!(form.mode(), FormMode::Create);
    assert_eq!(form.draft().about, "");
    assert!(form.is_editable(Field::Name));
    assert_eq!(
        h.notifier
            .notices()
            .iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .count(),
        0
    );
}

#[tokio::test]
async fn edit_draft_age_comes_from_dob() {
    let mut stale = record("r1", "Grace");
    stale.age = 99;
    let h = harness(MockStore::with_records(vec![stale]), true, EntryPoint::List);
    h.app.list().fetch_all().await;

    h.app
        .list()
        .begin_edit(&RecordId::new("r1"), h.app.form())
        .unwrap();
    assert_eq!(h.app.form().draft().age, "36");

    let outcome = h.app.form().on_submit().await;
    assert!(matches!(outcome, SubmitOutcome::Updated(ref r) if r.age == 36));
    assert!(matches!(
        h.store.calls().last(),
        Some(Call::Update(_, payload)) if payload.age == 36
    ));
}

#[tokio::test]
async fn edit_conflict_stays_in_edit() {
    let store = MockStore::with_records(vec![record("r1", "Grace")]);
    store.fail(UPDATE, RecordStoreError::conflict("User already exists"));
    let h = harness(store, true, EntryPoint::List);
    h.app.list().fetch_all().await;
    h.app
        .list()
        .begin_edit(&RecordId::new("r1"), h.app.form())
        .unwrap();
    let form = h.app.form();
    form.on_field_change(Field::About, "Invented the compiler")
        .unwrap();

    assert_eq!(form.on_submit().await, SubmitOutcome::Conflict);

    assert_eq!(h.notifier.last(), Some(Notice::error(MSG_CONFLICT)));
    assert!(!h.notifier.notices().contains(&Notice::error(MSG_UPDATE_FAILED)));
    assert_eq!(h.app.modes().kind(), ModeKind::Edit);
    let draft = form.draft();
    assert_eq!(draft.id, Some(RecordId::new("r1")));
    assert_eq!(draft.about, "Invented the compiler");
    assert_eq!(
        h.app.list().find(&RecordId::new("r1")).unwrap().about,
        "Wrote the first program"
    );
    assert!(!form.is_submitting());
}

#[tokio::test]
async fn late_create_keeps_edit_started_meanwhile() {
    let store = MockStore::with_records(vec![record("r1", "Grace")]);
    store.hold(CREATE);
    let h = harness(store, true, EntryPoint::Create);
    let form = h.app.form();
    fill_valid(form);

    let (outcome, _) = tokio::join!(form.on_submit(), async {
        assert_eq!(h.app.list().fetch_all().await, FetchOutcome::Loaded(1));
        h.app
            .list()
            .begin_edit(&RecordId::new("r1"), form)
            .unwrap();
        form.on_field_change(Field::About, "Invented the compiler")
            .unwrap();
        h.store.release();
    });

    assert_eq!(outcome, SubmitOutcome::Created);
    assert_eq!(h.notifier.last(), Some(Notice::success(MSG_CREATED)));
    assert_eq!(h.app.modes().kind(), ModeKind::Edit);
    let draft = form.draft();
    assert_eq!(draft.id, Some(RecordId::new("r1")));
    assert_eq!(draft.name, "Grace");
    assert_eq!(draft.about, "Invented the compiler");
    assert!(!form.is_submitting());
}

#[tokio::test]
async fn late_update_keeps_the_next_edit() {
    let store = MockStore::with_records(vec![record("r1", "Grace"), record("r2", "Alan")]);
    store.hold(UPDATE);
    let h = harness(store, true, EntryPoint::List);
    h.app.list().fetch_all().await;
    let form = h.app.form();
    h.app
        .list()
        .begin_edit(&RecordId::new("r1"), form)
        .unwrap();
    form.on_field_change(Field::About, "Invented the compiler")
        .unwrap();

    let (outcome, _) = tokio::join!(form.on_submit(), async {
        form.cancel_edit().unwrap();
        h.app
            .list()
            .begin_edit(&RecordId::new("r2"), form)
            .unwrap();
        form.on_field_change(Field::About, "Broke the cipher").unwrap();
        h.store.release();
    });

    let SubmitOutcome::Updated(updated) = outcome else {
        panic!("expected update, got {outcome:?}");
    };
    assert_eq!(updated.id, RecordId::new("r1"));
    assert_eq!(h.notifier.last(), Some(Notice::success(MSG_UPDATED)));
    assert_eq!(
        h.app.list().find(&RecordId::new("r1")).unwrap().about,
        "Invented the compiler"
    );
    assert_eq!(h.app.modes().kind(), ModeKind::Edit);
    let draft = form.draft();
    assert_eq!(draft.id, Some(RecordId::new("r2")));
    assert_eq!(draft.about, "Broke the cipher");
}

#[tokio::test]
async fn list_view_refuses_form_input() {
    let store = MockStore::with_records(vec![record("r1", "Grace")]);
    let h = harness(store, true, EntryPoint::List);
    h.app.list().fetch_all().await;
    let form = h.app.form();

    assert_eq!(
        form.on_field_change(Field::About, "typed into a hidden form"),
        Err(DomainError::invalid_transition(ModeKind::List, "edit a field"))
    );
    assert_eq!(form.on_submit().await, SubmitOutcome::NotShown);

    assert_eq!(form.draft().about, "");
    assert_eq!(h.store.calls(), vec![Call::ListRecords]);
    assert!(h.notifier.notices().is_empty());
    assert!(h.app.list().is_visible());
}
