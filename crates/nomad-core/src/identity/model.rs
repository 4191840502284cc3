//! Identity domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The user currently driving the application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Identity {
    /// A signed-in account. Chat sessions and favorites are persisted.
    Authenticated {
        uid: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        email: Option<String>,
    },
    /// An anonymous visitor. Data lives in memory only.
    Guest { uid: String },
}

impl Identity {
    pub fn authenticated(uid: impl Into<String>, email: Option<String>) -> Self {
        Self::Authenticated {
            uid: uid.into(),
            email,
        }
    }

    pub fn guest(uid: impl Into<String>) -> Self {
        Self::Guest { uid: uid.into() }
    }

    pub fn uid(&self) -> &str {
        match self {
            Self::Authenticated { uid, .. } | Self::Guest { uid } => uid,
        }
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Authenticated { email, .. } => email.as_deref(),
            Self::Guest { .. } => None,
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest { .. })
    }

    /// Whether chat and favorites data of this identity go to the store.
    pub fn persists_data(&self) -> bool {
        !self.is_guest()
    }

    /// Short label for prompts and logs.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Authenticated { email: Some(email), .. } => email.as_str(),
            Self::Authenticated { uid, .. } => uid.as_str(),
            Self::Guest { .. } => "guest",
        }
    }
}

/// State-change notification pushed by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityEvent {
    SignedIn(Identity),
    SignedOut,
}

impl IdentityEvent {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::SignedIn(identity) => Some(identity),
            Self::SignedOut => None,
        }
    }
}

/// Credential obtained from an external OAuth flow (e.g. a Google popup).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCredential {
    /// Provider identifier such as `google.com`
    pub provider_id: String,
    /// ID token issued by the provider
    pub id_token: String,
}

impl OAuthCredential {
    pub fn google(id_token: impl Into<String>) -> Self {
        Self {
            provider_id: "google.com".to_string(),
            id_token: id_token.into(),
        }
    }
}

/// Profile document stored per uid.
///
/// Guests get a minimal marker so downstream reads can tell them apart from
/// accounts, even though their chat and favorites are never written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub is_guest: bool,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn for_identity(identity: &Identity) -> Self {
        Self {
            uid: identity.uid().to_string(),
            email: identity.email().map(str::to_string),
            is_guest: identity.is_guest(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guest_does_not_persist() {
        let guest = Identity::guest("anon-1");
        assert!(guest.is_guest());
        assert!(!guest.persists_data());
        assert_eq!(guest.email(), None);
        assert_eq!(guest.display_name(), "guest");
    }

    #[test]
    fn test_authenticated_display_name_prefers_email() {
        let user = Identity::authenticated("u1", Some("ana@example.com".into()));
        assert!(user.persists_data());
        assert_eq!(user.display_name(), "ana@example.com");
        assert_eq!(Identity::authenticated("u2", None).display_name(), "u2");
    }

    #[test]
    fn test_guest_profile_marker() {
        let profile = UserProfile::for_identity(&Identity::guest("anon-1"));
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["isGuest"], true);
        assert_eq!(json["uid"], "anon-1");
        assert!(json.get("email").is_none());
    }
}
