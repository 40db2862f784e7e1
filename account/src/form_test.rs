use super::*;
use crate::api::UpdateOutcome;
use crate::identity::ProviderState;
use crate::roles::RoleLevel;
use crate::test_helpers::{ann, harness, provider_user};
use std::sync::atomic::Ordering;

fn signed_in() -> ProviderState {
    ProviderState::SignedIn(provider_user("g1"))
}

fn other_user() -> crate::profile::Profile {
    crate::profile::Profile { gid: "g2".to_owned(), name: None, email: "g2@x.com".to_owned(), role: 5 }
}

// =============================================================================
// Unready -> Ready
// =============================================================================

#[tokio::test]
async fn signed_out_form_stays_unready() {
    let h = harness(Some(ann()));
    h.session.on_provider_state(ProviderState::SignedOut).await.unwrap();

    let mut form = AccountForm::new(h.session.clone());
    assert_eq!(form.state(), FormState::Unready);
    assert!(!form.poll_ready());
    assert!(form.draft().is_none());
    assert!(!form.can_save());
    assert!(form.role_display().is_none());
}

#[tokio::test]
async fn form_populates_immediately_when_profile_exists() {
    let h = harness(Some(ann()));
    h.session.on_provider_state(signed_in()).await.unwrap();

    let form = AccountForm::new(h.session.clone());
    assert_eq!(form.state(), FormState::Ready);
    let draft = form.draft().unwrap();
    assert_eq!(draft.gid, "g1");
    assert_eq!(draft.name.as_deref(), Some("Ann"));
    assert_eq!(draft.email, "a@x.com");
    assert_eq!(draft.role, 5);
    assert!(!form.can_save());
}

#[tokio::test]
async fn form_becomes_ready_on_next_profile() {
    let h = harness(Some(ann()));
    let mut form = AccountForm::new(h.session.clone());
    assert!(!form.poll_ready());

    h.session.on_provider_state(signed_in()).await.unwrap();
    assert!(form.poll_ready());
    assert!(h.session.role().is(RoleLevel::Registered));
    assert_eq!(form.draft().unwrap().email, "a@x.com");
    assert!(!form.can_save());
}

#[tokio::test]
async fn ready_waits_for_profile() {
    let h = harness(Some(ann()));
    let mut form = AccountForm::new(h.session.clone());

    let session = h.session.clone();
    let signer = tokio::spawn(async move { session.on_provider_state(signed_in()).await });

    let draft = form.ready().await.unwrap().clone();
    assert_eq!(draft.gid, "g1");
    signer.await.unwrap().unwrap();
}

#[tokio::test]
async fn reset_form_resubscribes_while_waiting() {
    let h = harness(None);
    let mut form = AccountForm::new(h.session.clone());
    form.reset_form();
    form.reset_form();

    h.session.set_profile(ann());
    assert!(form.poll_ready());
}

#[tokio::test]
async fn reset_form_picks_up_latest_session_profile() {
    let h = harness(Some(ann()));
    h.session.on_provider_state(signed_in()).await.unwrap();
    let mut form = AccountForm::new(h.session.clone());

    h.session.set_profile(crate::profile::Profile { email: "c@x.com".to_owned(), ..ann() });
    assert_eq!(form.draft().unwrap().email, "a@x.com");
    form.reset_form();
    assert_eq!(form.draft().unwrap().email, "c@x.com");
}

#[tokio::test]
async fn sign_out_and_new_user_rebuild_the_draft() {
    let h = harness(Some(ann()));
    h.session.on_provider_state(signed_in()).await.unwrap();
    let mut form = AccountForm::new(h.session.clone());
    assert!(form.is_ready());

    h.session.on_provider_state(ProviderState::SignedOut).await.unwrap();
    assert!(!form.can_save());
    assert!(!form.poll_ready());
    assert!(form.draft().is_none());

    h.session.set_profile(other_user());
    assert!(form.poll_ready());
    assert_eq!(form.draft().unwrap().gid, "g2");
    assert!(!form.can_save());
}

#[tokio::test]
async fn draft_for_previous_user_is_never_submitted() {
    let h = harness(Some(ann()));
    h.session.on_provider_state(signed_in()).await.unwrap();
    let mut form = AccountForm::new(h.session.clone());
    form.draft_mut().unwrap().set_email("b@x.com");

    h.session.set_profile(other_user());
    assert!(!form.can_save());
    assert!(matches!(form.on_submit().await, Err(FormError::Stale)));
    assert!(h.api.updates().is_empty());
    assert_eq!(form.draft().unwrap().gid, "g2");
}

// =============================================================================
// profile_changed
// =============================================================================

#[tokio::test]
async fn editing_email_enables_save() {
    let h = harness(Some(ann()));
    h.session.on_provider_state(signed_in()).await.unwrap();
    let mut form = AccountForm::new(h.session.clone());

    form.draft_mut().unwrap().set_email("b@x.com");
    assert!(form.profile_changed());
    assert!(form.can_save());
}

#[tokio::test]
async fn editing_role_or_gid_does_not_enable_save() {
    let h = harness(Some(ann()));
    h.session.on_provider_state(signed_in()).await.unwrap();
    let mut form = AccountForm::new(h.session.clone());

    let draft = form.draft_mut().unwrap();
    draft.role = 10;
    draft.gid = "g2".to_owned();
    assert!(!form.profile_changed());
}

#[tokio::test]
async fn blank_name_against_unnamed_profile_is_clean() {
    let unnamed = crate::profile::Profile { name: None, ..ann() };
    let h = harness(Some(unnamed));
    h.session.on_provider_state(signed_in()).await.unwrap();
    let mut form = AccountForm::new(h.session.clone());

    form.draft_mut().unwrap().name = Some(String::new());
    assert!(!form.profile_changed());

    form.draft_mut().unwrap().set_name("Ann");
    assert!(form.profile_changed());
}

// =============================================================================
// on_submit
// =============================================================================

#[tokio::test]
async fn submit_sends_edited_email_and_repopulates() {
    let h = harness(Some(ann()));
    h.session.on_provider_state(signed_in()).await.unwrap();
    let mut form = AccountForm::new(h.session.clone());

    form.draft_mut().unwrap().set_email("b@x.com");
    form.on_submit().await.unwrap();

    let sent = h.api.updates();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].email, "b@x.com");
    assert_eq!(sent[0].gid, "g1");
    assert_eq!(sent[0].name.as_deref(), Some("Ann"));
    assert_eq!(sent[0].role, 5);

    assert_eq!(form.state(), FormState::Ready);
    assert_eq!(form.draft().unwrap().email, "b@x.com");
    assert!(!form.can_save());
}

#[tokio::test]
async fn submit_takes_server_copy_over_draft() {
    let h = harness(Some(ann()));
    h.session.on_provider_state(signed_in()).await.unwrap();
    *h.api.update_response.lock().unwrap() = Some(UpdateOutcome { ok: false, profile: ann() });
    let mut form = AccountForm::new(h.session.clone());

    form.draft_mut().unwrap().set_email("b@x.com");
    form.on_submit().await.unwrap();
    assert_eq!(form.draft().unwrap().email, "a@x.com");
    assert!(!form.can_save());
}

#[tokio::test]
async fn failed_submit_keeps_typed_draft() {
    let h = harness(Some(ann()));
    h.session.on_provider_state(signed_in()).await.unwrap();
    h.api.fail_updates.store(true, Ordering::SeqCst);
    let mut form = AccountForm::new(h.session.clone());

    form.draft_mut().unwrap().set_email("b@x.com");
    assert!(matches!(form.on_submit().await, Err(FormError::Session(_))));
    assert_eq!(form.draft().unwrap().email, "b@x.com");
    assert!(form.can_save());
}

#[tokio::test]
async fn submit_without_profile_is_not_ready() {
    let h = harness(None);
    let mut form = AccountForm::new(h.session.clone());
    assert!(matches!(form.on_submit().await, Err(FormError::NotReady)));
    assert!(h.api.updates().is_empty());
}

// =============================================================================
// role_display
// =============================================================================

#[tokio::test]
async fn role_display_resolves_registered_level() {
    let h = harness(Some(ann()));
    h.session.on_provider_state(signed_in()).await.unwrap();
    let form = AccountForm::new(h.session.clone());
    assert_eq!(form.role_display().unwrap().name, "registered");
}

#[tokio::test]
async fn role_display_survives_unregistered_level() {
    let h = harness(Some(crate::profile::Profile { role: 99, ..ann() }));
    h.session.on_provider_state(signed_in()).await.unwrap();
    let form = AccountForm::new(h.session.clone());

    let role = form.role_display().unwrap();
    assert_eq!(role.name, crate::roles::UNRECOGNIZED_ROLE_NAME);
    assert_eq!(role.access_level, 99);
}
