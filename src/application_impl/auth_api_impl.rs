use crate::application_port::*;
use crate::domain_model::*;
use crate::logger::*;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;

const REGISTER_PATH: &str = "/auth/register";
const LOGIN_PATH: &str = "/auth/login";
const LOGOUT_PATH: &str = "/auth/logout";

pub struct HttpAuthApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuthApi {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        HttpAuthApi { client, base_url }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_for_grant<B: Serialize + Sync>(
        &self,
        operation: AuthOperation,
        path: &str,
        body: &B,
    ) -> Result<TokenGrant, AuthApiError> {
        let response = self
            .client
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await
            .map_err(|e| AuthApiError::Transport {
                operation,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(request_failure(operation, status, response).await);
        }

        response
            .json::<TokenGrant>()
            .await
            .map_err(|e| AuthApiError::Decode {
                operation,
                message: e.to_string(),
            })
    }
}

async fn request_failure(
    operation: AuthOperation,
    status: StatusCode,
    response: reqwest::Response,
) -> AuthApiError {
    let text = response.text().await.unwrap_or_default();
    let (detail, body) = match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(json) => {
            let body = serde_json::from_value::<ApiErrorBody>(json.clone()).ok();
            (Some(json.to_string()), body)
        }
        Err(_) if text.is_empty() => (None, None),
        Err(_) => (Some(text), None),
    };

    AuthApiError::RequestFailure {
        operation,
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
        detail,
        body,
    }
}

#[async_trait::async_trait]
impl AuthApi for HttpAuthApi {
    async fn register(&self, payload: RegisterPayload) -> Result<TokenGrant, AuthApiError> {
        self.post_for_grant(AuthOperation::Register, REGISTER_PATH, &payload)
            .await
    }

    async fn login(&self, payload: LoginPayload) -> Result<TokenGrant, AuthApiError> {
        self.post_for_grant(AuthOperation::Login, LOGIN_PATH, &payload)
            .await
    }

    async fn logout(&self, access_token: Option<&str>) -> bool {
        let mut request = self
            .client
            .post(self.endpoint(LOGOUT_PATH))
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = access_token {
            request = request.bearer_auth(token);
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => true,
            // token already revoked, or no such endpoint on this backend
            Ok(response)
                if matches!(
                    response.status(),
                    StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND
                ) =>
            {
                debug!(status = %response.status(), "logout not acknowledged by server");
                false
            }
            Ok(response) => {
                warn!(status = %response.status(), "logout request failed");
                false
            }
            Err(e) => {
                warn!(error = %e, "logout endpoint unreachable");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use warp::Filter;
    use warp::Reply;
    use warp::filters::BoxedFilter;
    use warp::http::StatusCode as WarpStatus;
    use warp::reply::Response;

    fn spawn_server(routes: BoxedFilter<(Response,)>) -> HttpAuthApi {
        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        HttpAuthApi::new(reqwest::Client::new(), format!("http://{}/", addr))
    }

    fn grant_json() -> serde_json::Value {
        serde_json::json!({
            "$schema": "http://localhost:8888/schemas/LoginOutputBody.json",
            "access_token": "at",
            "refresh_token": "rt",
            "expires_in": 900,
            "user_id": "u-42",
        })
    }

    fn login_payload() -> LoginPayload {
        LoginPayload {
            email: "ada@example.com".to_string(),
            password: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn login_posts_json_and_returns_grant() {
        let seen = Arc::new(Mutex::new(None));
        let captured = seen.clone();
        let routes = warp::path!("auth" / "login")
            .and(warp::post())
            .and(warp::body::json())
            .map(move |body: serde_json::Value| {
                *captured.lock().unwrap() = Some(body);
                warp::reply::json(&grant_json()).into_response()
            })
            .boxed();
        let api = spawn_server(routes);

        let grant = api.login(login_payload()).await.unwrap();

        assert_eq!(
            grant,
            TokenGrant {
                access_token: "at".to_string(),
                refresh_token: "rt".to_string(),
                expires_in: 900,
                user_id: "u-42".to_string(),
            }
        );
        assert_eq!(
            seen.lock().unwrap().clone().unwrap(),
            serde_json::json!({"email": "ada@example.com", "password": "secret"})
        );
    }

    #[tokio::test]
    async fn register_failure_carries_json_detail() {
        let routes = warp::path!("auth" / "register")
            .and(warp::post())
            .map(|| {
                let body = serde_json::json!({
                    "message": "validation failed",
                    "errors": [{"field": "email", "message": "already in use"}],
                });
                warp::reply::with_status(warp::reply::json(&body), WarpStatus::CONFLICT)
                    .into_response()
            })
            .boxed();
        let api = spawn_server(routes);

        let err = api
            .register(RegisterPayload {
                email: "ada@example.com".to_string(),
                password: "secret".to_string(),
                username: "ada".to_string(),
            })
            .await
            .unwrap_err();

        match &err {
            AuthApiError::RequestFailure {
                operation,
                status,
                status_text,
                detail,
                body,
            } => {
                assert_eq!(*operation, AuthOperation::Register);
                assert_eq!(*status, 409);
                assert_eq!(status_text, "Conflict");
                assert!(detail.as_deref().unwrap().contains("already in use"));
                assert_eq!(body.as_ref().unwrap().message.as_deref(), Some("validation failed"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.server_message(), Some("validation failed"));
    }

    #[tokio::test]
    async fn failure_detail_falls_back_to_text_then_none() {
        let routes = warp::path!("auth" / "login")
            .and(warp::header::optional::<String>("x-empty"))
            .map(|empty: Option<String>| {
                let text = if empty.is_some() { "" } else { "gateway exploded" };
                warp::reply::with_status(text, WarpStatus::BAD_GATEWAY).into_response()
            })
            .boxed();
        let api = spawn_server(routes);

        let err = api.login(login_payload()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "login failed: 502 Bad Gateway - gateway exploded"
        );

        let client = reqwest::Client::builder()
            .default_headers(
                [(
                    reqwest::header::HeaderName::from_static("x-empty"),
                    reqwest::header::HeaderValue::from_static("1"),
                )]
                .into_iter()
                .collect(),
            )
            .build()
            .unwrap();
        let api = HttpAuthApi::new(client, api.base_url.clone());
        let err = api.login(login_payload()).await.unwrap_err();
        assert!(matches!(
            err,
            AuthApiError::RequestFailure {
                status: 502,
                detail: None,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_decode_error() {
        let routes = warp::path!("auth" / "login")
            .map(|| warp::reply::json(&serde_json::json!({"token": "x"})).into_response())
            .boxed();
        let api = spawn_server(routes);

        let err = api.login(login_payload()).await.unwrap_err();
        assert!(matches!(err, AuthApiError::Decode { .. }));
    }

    #[tokio::test]
    async fn logout_sends_bearer_and_acknowledges_2xx() {
        let seen = Arc::new(Mutex::new(None));
        let captured = seen.clone();
        let routes = warp::path!("auth" / "logout")
            .and(warp::post())
            .and(warp::header::optional::<String>("authorization"))
            .map(move |auth: Option<String>| {
                *captured.lock().unwrap() = auth;
                warp::reply::with_status(warp::reply(), WarpStatus::NO_CONTENT).into_response()
            })
            .boxed();
        let api = spawn_server(routes);

        assert!(api.logout(Some("at")).await);
        assert_eq!(seen.lock().unwrap().as_deref(), Some("Bearer at"));

        assert!(api.logout(None).await);
        assert_eq!(seen.lock().unwrap().as_deref(), None);
    }

    #[tokio::test]
    async fn logout_swallows_every_failure() {
        for status in [
            WarpStatus::UNAUTHORIZED,
            WarpStatus::NOT_FOUND,
            WarpStatus::INTERNAL_SERVER_ERROR,
        ] {
            let routes = warp::any()
                .map(move || warp::reply::with_status("nope", status).into_response())
                .boxed();
            let api = spawn_server(routes);
            assert!(!api.logout(Some("at")).await, "status {status}");
        }

        let unreachable = HttpAuthApi::new(reqwest::Client::new(), "http://127.0.0.1:1");
        assert!(!unreachable.logout(Some("at")).await);
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error_for_login() {
        let api = HttpAuthApi::new(reqwest::Client::new(), "http://127.0.0.1:1");
        let err = api.login(login_payload()).await.unwrap_err();
        assert!(matches!(
            err,
            AuthApiError::Transport {
                operation: AuthOperation::Login,
                ..
            }
        ));
    }
}
