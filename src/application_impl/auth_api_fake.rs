use crate::application_port::*;
use crate::domain_model::*;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

const DEFAULT_EXPIRES_IN: i64 = 3600;

/// Auth backend that keeps its accounts in process memory.
///
/// Accounts live only as long as the value: a CLI run with the fake backend
/// starts with no users beyond those seeded through [`FakeAuthApi::with_user`].
#[derive(Debug)]
pub struct FakeAuthApi {
    expires_in: i64,
    users: Mutex<HashMap<String, String>>, // email -> password
}

impl FakeAuthApi {
    pub fn new() -> Self {
        Self::with_expires_in(DEFAULT_EXPIRES_IN)
    }

    pub fn with_expires_in(expires_in: i64) -> Self {
        Self {
            expires_in,
            users: Mutex::new(HashMap::new()),
        }
    }

    /// Seeds an account, as if it had registered earlier.
    pub fn with_user(self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.users().insert(email.into(), password.into());
        self
    }

    fn users(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn grant(&self, email: &str) -> TokenGrant {
        TokenGrant {
            access_token: format!("fake-access-token:{}", email),
            refresh_token: format!("fake-refresh-token:{}", email),
            expires_in: self.expires_in,
            user_id: get_fake_id(email),
        }
    }
}

impl Default for FakeAuthApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AuthApi for FakeAuthApi {
    async fn register(&self, payload: RegisterPayload) -> Result<TokenGrant, AuthApiError> {
        if payload.password.is_empty() {
            return Err(rejected(
                AuthOperation::Register,
                400,
                "Bad Request",
                "invalid_password",
                "password must not be empty",
            ));
        }
        let mut users = self.users();
        if users.contains_key(&payload.email) {
            return Err(rejected(
                AuthOperation::Register,
                409,
                "Conflict",
                "email_taken",
                "email is already registered",
            ));
        }
        users.insert(payload.email.clone(), payload.password);
        Ok(self.grant(&payload.email))
    }

    async fn login(&self, payload: LoginPayload) -> Result<TokenGrant, AuthApiError> {
        let known = self
            .users()
            .get(&payload.email)
            .is_some_and(|password| *password == payload.password);
        if !known {
            return Err(rejected(
                AuthOperation::Login,
                401,
                "Unauthorized",
                "invalid_credentials",
                "invalid email or password",
            ));
        }
        Ok(self.grant(&payload.email))
    }

    async fn logout(&self, _access_token: Option<&str>) -> bool {
        true
    }
}

fn rejected(
    operation: AuthOperation,
    status: u16,
    status_text: &str,
    error: &str,
    message: &str,
) -> AuthApiError {
    let body = ApiErrorBody {
        error: Some(error.to_string()),
        message: Some(message.to_string()),
        errors: None,
    };
    AuthApiError::RequestFailure {
        operation,
        status,
        status_text: status_text.to_string(),
        detail: serde_json::to_string(&body).ok(),
        body: Some(body),
    }
}

fn get_fake_id(email: &str) -> String {
    uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, email.as_bytes()).to_string()
}
