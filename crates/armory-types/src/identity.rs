//! Caller identity as supplied by the auth collaborator.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Officer,
    Administrator,
}

/// Identity attached to every mutating call. Resolved once at the API
/// boundary; the engine trusts it as given and never reaches for a global.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub officer_id: String,
    pub role: Role,
}

impl CallerIdentity {
    pub const UNKNOWN_OFFICER: &'static str = "Unknown";

    pub fn new(officer_id: impl Into<String>, role: Role) -> Self {
        Self {
            officer_id: officer_id.into(),
            role,
        }
    }

    /// Resolve a possibly-absent identity. Missing or blank caller ids fall
    /// back to `"Unknown"` with the least-privileged role, here at the
    /// boundary rather than deep inside the engine.
    pub fn resolve(officer_id: Option<&str>, role: Option<Role>) -> Self {
        let officer_id = officer_id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(Self::UNKNOWN_OFFICER);
        Self {
            officer_id: officer_id.to_string(),
            role: role.unwrap_or_default(),
        }
    }

    pub fn is_administrator(&self) -> bool {
        self.role == Role::Administrator
    }
}
