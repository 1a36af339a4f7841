use crate::domain_model::*;

#[derive(Debug, thiserror::Error)]
pub enum AuthApiError {
    #[error("{operation} failed: {status} {status_text}{}", detail_suffix(.detail))]
    RequestFailure {
        operation: AuthOperation,
        status: u16,
        status_text: String,
        detail: Option<String>,
        body: Option<ApiErrorBody>,
    },
    #[error("{operation} request could not be sent: {message}")]
    Transport {
        operation: AuthOperation,
        message: String,
    },
    #[error("{operation} response could not be decoded: {message}")]
    Decode {
        operation: AuthOperation,
        message: String,
    },
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(" - {}", d))
        .unwrap_or_default()
}

impl AuthApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            AuthApiError::RequestFailure { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Best human-readable reason from the error body, if the server sent one.
    pub fn server_message(&self) -> Option<&str> {
        let AuthApiError::RequestFailure {
            body: Some(body), ..
        } = self
        else {
            return None;
        };
        body.message
            .as_deref()
            .or(body.error.as_deref())
            .or_else(|| {
                body.errors
                    .iter()
                    .flatten()
                    .find_map(|e| e.message.as_deref())
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOperation {
    Register,
    Login,
}

impl std::fmt::Display for AuthOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthOperation::Register => write!(f, "register"),
            AuthOperation::Login => write!(f, "login"),
        }
    }
}

/// Result of a logout: the local session is always gone, the server may or
/// may not have confirmed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoutOutcome {
    pub cleared_locally: bool,
    pub server_ack: bool,
}

/// Stateless client for the backend's auth endpoints. It never touches the
/// session store; callers feed the returned grant into it.
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    async fn register(&self, payload: RegisterPayload) -> Result<TokenGrant, AuthApiError>;
    async fn login(&self, payload: LoginPayload) -> Result<TokenGrant, AuthApiError>;
    /// Best effort. Returns whether the server acknowledged with a 2xx; never fails.
    async fn logout(&self, access_token: Option<&str>) -> bool;
}
