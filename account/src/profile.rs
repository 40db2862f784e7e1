//! Profile records and the editable draft shown in the account form.
//!
//! A `Profile` is always the server's canonical copy: it is replaced
//! wholesale on every fetch or update, never merged field by field.

#[cfg(test)]
#[path = "profile_test.rs"]
mod profile_test;

use serde::{Deserialize, Serialize};

/// A user's account record as stored server-side.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Opaque identity-provider user id.
    pub gid: String,
    /// Display name. Absent until the user sets one.
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    /// Integer access level; see [`crate::roles::RoleLevel`].
    pub role: i32,
}

/// Working copy of the four editable profile fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileDraft {
    pub gid: String,
    pub name: Option<String>,
    pub email: String,
    pub role: i32,
}

impl ProfileDraft {
    /// Whether the draft differs from `stored` in a way that enables saving.
    ///
    /// Only email and name participate; gid and role are carried along but
    /// never make the draft dirty. Email compares textually. Name treats
    /// "empty" and "absent" as the same value, so a form field that
    /// initialized to `""` against a profile with no name stays clean.
    #[must_use]
    pub fn differs_from(&self, stored: &Profile) -> bool {
        self.email != stored.email || name_changed(self.name.as_deref(), stored.name.as_deref())
    }

    /// Set the display name; an empty string clears it.
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.name = if name.is_empty() { None } else { Some(name) };
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }
}

impl From<&Profile> for ProfileDraft {
    fn from(profile: &Profile) -> Self {
        Self {
            gid: profile.gid.clone(),
            name: profile.name.clone(),
            email: profile.email.clone(),
            role: profile.role,
        }
    }
}

impl From<ProfileDraft> for Profile {
    fn from(draft: ProfileDraft) -> Self {
        Self { gid: draft.gid, name: draft.name, email: draft.email, role: draft.role }
    }
}

fn name_changed(draft: Option<&str>, stored: Option<&str>) -> bool {
    let draft = draft.unwrap_or_default();
    let stored = stored.unwrap_or_default();
    if draft.is_empty() && stored.is_empty() {
        return false;
    }
    draft != stored
}
