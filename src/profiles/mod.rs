mod github;

use serde::{Deserialize, Serialize};

pub use github::{ProfileError, ProfileResolver};

/// Public identity resolved from the profile API and kept in the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub avatar_url: String,
    pub login: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl Profile {
    pub fn is_empty(&self) -> bool {
        self.login.is_empty()
    }

    /// Name shown as the sender of chat messages.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.login)
    }
}

/// Outcome of a single username lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Username too short to look up.
    Cleared,
    Found(Profile),
    /// Request failed; whatever was shown before stays.
    Failed,
}

impl Lookup {
    pub fn apply(self, current: Option<Profile>) -> Option<Profile> {
        match self {
            Lookup::Cleared => None,
            Lookup::Found(profile) => Some(profile),
            Lookup::Failed => current,
        }
    }
}
