use crate::client::SessionStore;
use reqwest::{IntoUrl, Method, RequestBuilder};
use std::sync::Arc;

/// Outgoing requests carrying `Authorization: Bearer <token>` while the
/// session is valid. Expired or absent sessions leave headers untouched.
#[derive(Clone)]
pub struct AuthenticatedHttpClient {
    client: reqwest::Client,
    store: Arc<SessionStore>,
}

impl AuthenticatedHttpClient {
    pub fn new(client: reqwest::Client, store: Arc<SessionStore>) -> Self {
        AuthenticatedHttpClient { client, store }
    }

    pub fn request<U: IntoUrl>(&self, method: Method, url: U) -> RequestBuilder {
        self.authorize(self.client.request(method, url))
    }

    pub fn get<U: IntoUrl>(&self, url: U) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    pub fn post<U: IntoUrl>(&self, url: U) -> RequestBuilder {
        self.request(Method::POST, url)
    }

    /// Attaches the bearer credential to a request built elsewhere.
    pub fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.store.bearer_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}
