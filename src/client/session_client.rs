use crate::application_impl::*;
use crate::application_port::*;
use crate::client::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::infra_file::*;
use crate::infra_memory::*;
use crate::logger::*;
use crate::settings::{self, Settings};
use anyhow::anyhow;
use std::sync::Arc;
use std::time::Duration;

/// Composes the session store, auth API, route guard and authenticated
/// HTTP client around one shared [`SessionStore`].
pub struct SessionClient {
    pub store: Arc<SessionStore>,
    pub guard: RouteGuard,
    pub http: AuthenticatedHttpClient,
    api: Arc<dyn AuthApi>,
}

impl SessionClient {
    pub fn new(
        store: Arc<SessionStore>,
        api: Arc<dyn AuthApi>,
        routes: RouteTable,
        http: reqwest::Client,
    ) -> Self {
        SessionClient {
            guard: RouteGuard::new(store.clone(), routes),
            http: AuthenticatedHttpClient::new(http, store.clone()),
            store,
            api,
        }
    }

    pub fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let storage: Arc<dyn KeyValueStorage> = match settings.storage.backend.as_str() {
            "memory" => Arc::new(MemoryKeyValueStorage::new()),
            "file" => Arc::new(FileKeyValueStorage::new(settings.storage.dir.clone())),
            other => return Err(anyhow!("unknown storage backend: {:?}", other)),
        };
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let store = Arc::new(SessionStore::new(SessionPersistence::new(storage), clock));

        // one client, shared by the auth API and authenticated requests
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = settings.api.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build()?;

        let api: Arc<dyn AuthApi> = match settings.api.backend.as_str() {
            "fake" => Arc::new(FakeAuthApi::new()),
            "real" => Arc::new(HttpAuthApi::new(http.clone(), &settings.api.base_url)),
            other => return Err(anyhow!("unknown api backend: {:?}", other)),
        };

        info!(
            api = %settings.api.backend,
            storage = %settings.storage.backend,
            "session client ready"
        );
        Ok(Self::new(store, api, RouteTable::from(&settings.routes), http))
    }

    pub async fn register(&self, payload: RegisterPayload) -> Result<(), AuthApiError> {
        let grant = self.api.register(payload).await?;
        self.store.set_tokens(&grant);
        Ok(())
    }

    pub async fn login(&self, payload: LoginPayload) -> Result<(), AuthApiError> {
        let grant = self.api.login(payload).await?;
        self.store.set_tokens(&grant);
        Ok(())
    }

    /// Always ends the local session; the server's answer is informational.
    pub async fn logout(&self) -> LogoutOutcome {
        self.store.hydrate();
        let token = self.store.access_token();
        let server_ack = self.api.logout(token.as_deref()).await;
        self.store.clear();
        LogoutOutcome {
            cleared_locally: true,
            server_ack,
        }
    }

    pub fn navigate(&self, target: &str) -> NavigationDecision {
        self.guard.before_each(target)
    }

    /// Where to go after signing in from `login_page`: its return target
    /// when safe, the landing route otherwise.
    pub fn post_login_destination(&self, login_page: &Location) -> Location {
        login_page
            .return_target()
            .unwrap_or_else(|| self.guard.home(true))
    }
}

impl From<&settings::Routes> for RouteTable {
    fn from(routes: &settings::Routes) -> Self {
        RouteTable {
            login: routes.login.clone(),
            register: routes.register.clone(),
            logout: routes.logout.clone(),
            landing: routes.landing.clone(),
            protected: routes.protected.clone(),
        }
    }
}
