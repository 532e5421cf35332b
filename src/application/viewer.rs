//! The authenticated principal viewing the admin surface.

use std::collections::BTreeSet;

use crate::domain::types::ADMIN_ROLE;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewer {
    name: Option<String>,
    roles: BTreeSet<String>,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn new<I, S>(name: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: Some(name.into()),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// Resolve a viewer from raw header values. Roles are comma-separated and
    /// ignored entirely when no user is present.
    pub fn from_header_values(user: Option<&str>, roles: Option<&str>) -> Self {
        let Some(name) = user.map(str::trim).filter(|value| !value.is_empty()) else {
            return Self::anonymous();
        };

        let roles = roles
            .unwrap_or("")
            .split(',')
            .map(|role| role.trim().to_ascii_lowercase())
            .filter(|role| !role.is_empty());

        Self::new(name, roles)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name recorded in logs for writes made by this viewer.
    pub fn actor(&self) -> &str {
        self.name().unwrap_or("anonymous")
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }
}
