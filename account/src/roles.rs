//! Role registry: access levels and their descriptive roles.
//!
//! DESIGN
//! ======
//! Roles are keyed by their integer access level. The registry is built once
//! with the fixed set below and shared behind an `Arc`; holders keep
//! `Arc<Role>` handles into it instead of copies.
//!
//! A profile can carry a level the registry does not know (the server is free
//! to return anything). `RoleRegistry::get` reports that as `None`, while
//! `RoleRegistry::resolve` synthesizes an "unrecognized" role so display code
//! always has a name and description to render.

#[cfg(test)]
#[path = "roles_test.rs"]
mod roles_test;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Name given to roles synthesized for levels missing from the registry.
pub const UNRECOGNIZED_ROLE_NAME: &str = "unrecognized";

/// The fixed access levels known to the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum RoleLevel {
    /// Identity provider not yet initialized.
    Unknown = -1,
    /// No user signed in.
    SignedOut = 0,
    /// Signed in, profile not yet fetched or never registered.
    Unregistered = 1,
    /// Regular registered user.
    Registered = 5,
    /// Administrator.
    Admin = 10,
}

impl RoleLevel {
    /// All fixed levels in registry order.
    pub const ALL: [Self; 5] = [Self::Unknown, Self::SignedOut, Self::Unregistered, Self::Registered, Self::Admin];

    /// Raw integer access level.
    #[must_use]
    pub const fn value(self) -> i32 {
        self as i32
    }

    /// Map a raw integer back to a fixed level.
    #[must_use]
    pub fn from_value(level: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.value() == level)
    }

    fn name(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::SignedOut => "signed-out",
            Self::Unregistered => "unregistered",
            Self::Registered => "registered",
            Self::Admin => "admin",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::Unknown => "Identity provider has not finished loading",
            Self::SignedOut => "No user is signed in",
            Self::Unregistered => "Signed in, but no registered profile yet",
            Self::Registered => "Registered user",
            Self::Admin => "Administrator with access to all profiles",
        }
    }
}

impl From<RoleLevel> for i32 {
    fn from(level: RoleLevel) -> Self {
        level.value()
    }
}

/// A named access tier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub description: String,
    pub access_level: i32,
}

impl Role {
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, access_level: i32) -> Self {
        Self { name: name.into(), description: description.into(), access_level }
    }

    /// Placeholder for a level the registry does not know.
    #[must_use]
    pub fn unrecognized(access_level: i32) -> Self {
        Self::new(UNRECOGNIZED_ROLE_NAME, format!("Access level {access_level} is not registered"), access_level)
    }

    /// Whether this role is one of the fixed levels with the given value.
    #[must_use]
    pub fn is(&self, level: RoleLevel) -> bool {
        self.access_level == level.value()
    }
}

impl From<RoleLevel> for Role {
    fn from(level: RoleLevel) -> Self {
        Self::new(level.name(), level.description(), level.value())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.access_level)
    }
}

/// Registry of roles keyed by access level.
#[derive(Clone, Debug)]
pub struct RoleRegistry {
    roles: BTreeMap<i32, Arc<Role>>,
}

impl RoleRegistry {
    /// Registry preloaded with the five fixed roles.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self { roles: BTreeMap::new() };
        for level in RoleLevel::ALL {
            registry.add_role(Role::from(level));
        }
        registry
    }

    /// Insert a role, replacing any entry with the same access level.
    pub fn add_role(&mut self, role: Role) {
        self.roles.insert(role.access_level, Arc::new(role));
    }

    /// Look up the role registered for `level`.
    #[must_use]
    pub fn get(&self, level: i32) -> Option<Arc<Role>> {
        self.roles.get(&level).cloned()
    }

    /// Look up one of the fixed levels.
    ///
    /// Falls back to a freshly built role if the entry was never registered,
    /// which only happens for registries assembled by hand.
    #[must_use]
    pub fn fixed(&self, level: RoleLevel) -> Arc<Role> {
        self.get(level.value())
            .unwrap_or_else(|| Arc::new(Role::from(level)))
    }

    /// Look up `level`, synthesizing an unrecognized role when absent.
    #[must_use]
    pub fn resolve(&self, level: i32) -> Arc<Role> {
        self.get(level)
            .unwrap_or_else(|| Arc::new(Role::unrecognized(level)))
    }

    /// Registered roles in ascending access-level order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Role>> {
        self.roles.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
