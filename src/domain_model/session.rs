use crate::domain_model::TokenGrant;
use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch.
pub type EpochMillis = i64;

/// In-memory session credentials.
///
/// Either every field is set or none is: the only constructors are
/// [`SessionState::default`] and the full-grant conversions below.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<EpochMillis>,
    user_id: Option<String>,
}

impl SessionState {
    pub fn from_grant(grant: &TokenGrant, now: EpochMillis) -> Self {
        let lifetime = grant.expires_in.saturating_mul(1000);
        Self {
            access_token: Some(grant.access_token.clone()),
            refresh_token: Some(grant.refresh_token.clone()),
            expires_at: Some(now.saturating_add(lifetime)),
            user_id: Some(grant.user_id.clone()),
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn expires_at(&self) -> Option<EpochMillis> {
        self.expires_at
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none()
    }

    pub fn is_authenticated_at(&self, now: EpochMillis) -> bool {
        match (&self.access_token, self.expires_at) {
            (Some(_), Some(expires_at)) => now < expires_at,
            _ => false,
        }
    }

    /// Whole seconds left before expiry, zero when expired or absent.
    pub fn remaining_seconds_at(&self, now: EpochMillis) -> u64 {
        match self.expires_at {
            Some(expires_at) if expires_at > now => {
                (expires_at.saturating_sub(now) / 1000) as u64
            }
            _ => 0,
        }
    }

    pub fn to_persisted(&self) -> Option<PersistedSession> {
        Some(PersistedSession {
            access_token: self.access_token.clone()?,
            refresh_token: self.refresh_token.clone()?,
            expires_at: self.expires_at?,
            user_id: self.user_id.clone()?,
        })
    }
}

impl From<PersistedSession> for SessionState {
    fn from(persisted: PersistedSession) -> Self {
        Self {
            access_token: Some(persisted.access_token),
            refresh_token: Some(persisted.refresh_token),
            expires_at: Some(persisted.expires_at),
            user_id: Some(persisted.user_id),
        }
    }
}

/// Durable form of a session, stored as camelCase JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: EpochMillis,
    pub user_id: String,
}
