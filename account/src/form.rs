//! Account Form Controller.
//!
//! DESIGN
//! ======
//! Two states: `Unready` (no profile yet) and `Ready` (draft populated).
//! `reset_form` populates the draft straight away when the session already
//! has a profile, and otherwise joins the session's next "profile available"
//! cycle. The transition completes through `poll_ready` or `ready().await`.
//! A draft whose gid no longer matches the session's profile (sign-out or a
//! different user) is stale: it never counts as changed, and `poll_ready`
//! rebuilds it through `reset_form`.
//!
//! Submitting sends the draft through the session and re-enters the same
//! transition with the server's canonical answer, so after every save the
//! draft is rebuilt from what the server stored, not what the user typed.

#[cfg(test)]
#[path = "form_test.rs"]
mod form_test;

use std::sync::Arc;

use crate::error::FormError;
use crate::profile::{Profile, ProfileDraft};
use crate::roles::Role;
use crate::session::UserSession;
use crate::signal::{ProfileWaiter, WaiterPoll};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormState {
    Unready,
    Ready,
}

/// Editable view over the session's current profile.
pub struct AccountForm {
    session: Arc<UserSession>,
    draft: Option<ProfileDraft>,
    waiter: Option<ProfileWaiter>,
}

impl AccountForm {
    #[must_use]
    pub fn new(session: Arc<UserSession>) -> Self {
        let mut form = Self { session, draft: None, waiter: None };
        form.reset_form();
        form
    }

    #[must_use]
    pub fn state(&self) -> FormState {
        if self.draft.is_some() { FormState::Ready } else { FormState::Unready }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state() == FormState::Ready
    }

    /// Rebuild the draft from the session, or wait for the next profile.
    pub fn reset_form(&mut self) {
        match self.session.profile() {
            Some(profile) => self.populate(&profile),
            None => {
                self.draft = None;
                self.waiter = Some(self.session.next_profile());
            }
        }
    }

    /// Complete a pending transition without waiting. Returns readiness.
    pub fn poll_ready(&mut self) -> bool {
        if self.is_stale() {
            tracing::debug!("session profile changed under the form; resetting draft");
            self.reset_form();
        }
        if let Some(waiter) = self.waiter.as_mut() {
            match waiter.poll() {
                WaiterPoll::Ready(profile) => self.populate(&profile),
                WaiterPoll::Pending => {}
                WaiterPoll::Closed => self.waiter = None,
            }
        }
        self.is_ready()
    }

    /// Wait until the draft is populated.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::SessionClosed`] if the session's notification
    /// goes away before a profile arrives.
    pub async fn ready(&mut self) -> Result<&ProfileDraft, FormError> {
        if self.draft.is_none() {
            let waiter = match self.waiter.take() {
                Some(waiter) => waiter,
                None => self.session.next_profile(),
            };
            let profile = waiter.wait().await.ok_or(FormError::SessionClosed)?;
            self.populate(&profile);
        }
        self.draft.as_ref().ok_or(FormError::NotReady)
    }

    fn is_stale(&self) -> bool {
        match (&self.draft, self.session.profile()) {
            (Some(draft), Some(stored)) => draft.gid != stored.gid,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    fn populate(&mut self, profile: &Profile) {
        self.draft = Some(ProfileDraft::from(profile));
        self.waiter = None;
    }

    #[must_use]
    pub fn draft(&self) -> Option<&ProfileDraft> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut ProfileDraft> {
        self.draft.as_mut()
    }

    /// Whether the draft's name or email differs from the stored profile.
    ///
    /// Gid and role never count. Always `false` while unready or while the
    /// draft belongs to a profile the session no longer holds.
    #[must_use]
    pub fn profile_changed(&self) -> bool {
        match (&self.draft, self.session.profile()) {
            (Some(draft), Some(stored)) if draft.gid == stored.gid => draft.differs_from(&stored),
            _ => false,
        }
    }

    /// Whether the save action is enabled.
    #[must_use]
    pub fn can_save(&self) -> bool {
        self.profile_changed()
    }

    /// Role shown (read-only) in the form; unregistered levels render as
    /// "unrecognized".
    #[must_use]
    pub fn role_display(&self) -> Option<Arc<Role>> {
        self.draft
            .as_ref()
            .map(|draft| self.session.registry().resolve(draft.role))
    }

    /// Submit the draft and repopulate from the server's answer.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::NotReady`] without a draft, or the session error
    /// if the update fails; the draft is left as typed in both cases. A stale
    /// draft is discarded with [`FormError::Stale`] and never sent.
    pub async fn on_submit(&mut self) -> Result<(), FormError> {
        if self.is_stale() {
            self.reset_form();
            return Err(FormError::Stale);
        }
        let draft = self.draft.clone().ok_or(FormError::NotReady)?;
        self.session.update_profile(&Profile::from(draft)).await?;
        self.reset_form();
        Ok(())
    }
}
