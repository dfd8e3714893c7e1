use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub mod client;
pub mod store;

/// Role attached to a platform account. Creators build and manage surveys;
/// respondents browse and answer public ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(rename = "CREATOR")]
    Creator,
    #[serde(rename = "RESPONDENT")]
    Respondent,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Creator => "CREATOR",
            UserRole::Respondent => "RESPONDENT",
        }
    }

    /// Landing page for an authenticated user of this role.
    pub fn home(&self) -> &'static str {
        match self {
            UserRole::Creator => "/dashboard",
            UserRole::Respondent => "/respondent",
        }
    }
}

impl FromStr for UserRole {
    type Err = InvalidRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATOR" => Ok(UserRole::Creator),
            "RESPONDENT" => Ok(UserRole::Respondent),
            other => Err(InvalidRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A session carried a role string outside the closed CREATOR/RESPONDENT set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid user role: {0:?}")]
pub struct InvalidRole(pub String);

/// Account profile as returned by the platform auth API and held by the
/// client auth store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub role: UserRole,
}
