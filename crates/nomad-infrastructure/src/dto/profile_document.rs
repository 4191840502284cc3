//! Profile document: `users/{uid}`.

use chrono::{DateTime, Utc};
use nomad_core::identity::UserProfile;
use serde::{Deserialize, Serialize};

/// Stored profile. Guest markers written as `{uid, isGuest: true}` carry no
/// creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDocument {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub is_guest: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ProfileDocument {
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            uid: profile.uid.clone(),
            email: profile.email.clone(),
            is_guest: profile.is_guest,
            // The guest marker stays minimal
            created_at: (!profile.is_guest).then_some(profile.created_at),
        }
    }

    pub fn into_profile(self) -> UserProfile {
        UserProfile {
            uid: self.uid,
            email: self.email,
            is_guest: self.is_guest,
            created_at: self.created_at.unwrap_or(DateTime::UNIX_EPOCH),
        }
    }
}
