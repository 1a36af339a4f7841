use crate::client::SessionStore;
use crate::domain_model::*;
use crate::logger::*;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// The root path, which only ever redirects.
    Entry,
    /// Login, registration and logout pages.
    Public,
    /// Requires an authenticated session.
    Protected,
    /// No route definition matches.
    Other,
}

/// Route definitions the guard classifies against.
///
/// Matching is case-insensitive and ignores a single trailing slash.
#[derive(Debug, Clone)]
pub struct RouteTable {
    pub login: String,
    pub register: String,
    pub logout: String,
    pub landing: String,
    pub protected: Vec<String>,
}

impl Default for RouteTable {
    fn default() -> Self {
        RouteTable {
            login: "/login".to_string(),
            register: "/register".to_string(),
            logout: "/logout".to_string(),
            landing: "/home".to_string(),
            protected: ["/home", "/onebook", "/books", "/filmstv"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl RouteTable {
    pub fn classify(&self, path: &str) -> RouteClass {
        let path = normalize(path);
        if path == "/" {
            RouteClass::Entry
        } else if [&self.login, &self.register, &self.logout]
            .into_iter()
            .any(|p| normalize(p) == path)
        {
            RouteClass::Public
        } else if self.protected.iter().any(|p| normalize(p) == path) {
            RouteClass::Protected
        } else {
            RouteClass::Other
        }
    }

    /// Login and registration, which an authenticated user is sent away from.
    pub fn is_sign_in_page(&self, path: &str) -> bool {
        let path = normalize(path);
        normalize(&self.login) == path || normalize(&self.register) == path
    }
}

fn normalize(path: &str) -> String {
    let trimmed = match path.strip_suffix('/') {
        Some(rest) if !rest.is_empty() => rest,
        _ => path,
    };
    trimmed.to_ascii_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    Allow,
    Redirect(Location),
    Block(BlockReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// The target is not an absolute path.
    NotAbsolute,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::NotAbsolute => write!(f, "target is not an absolute path"),
        }
    }
}

/// Decides, before each navigation, whether the target is reachable with
/// the current session.
pub struct RouteGuard {
    store: Arc<SessionStore>,
    routes: RouteTable,
}

impl RouteGuard {
    pub fn new(store: Arc<SessionStore>, routes: RouteTable) -> Self {
        RouteGuard { store, routes }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn before_each(&self, target: &str) -> NavigationDecision {
        let to = Location::parse(target);
        if !to.is_absolute() {
            debug!(target, "navigation blocked");
            return NavigationDecision::Block(BlockReason::NotAbsolute);
        }

        // covers a fresh start or deep link where nothing is loaded yet
        if !self.store.has_access_token() {
            self.store.hydrate();
        }
        let authenticated = self.store.is_authenticated();

        let decision = match self.routes.classify(&to.path) {
            RouteClass::Protected if !authenticated => {
                let login = Location::new(self.routes.login.clone())
                    .with_query(RETURN_TARGET_PARAM, to.full_path());
                NavigationDecision::Redirect(login)
            }
            RouteClass::Public if authenticated && self.routes.is_sign_in_page(&to.path) => {
                NavigationDecision::Redirect(self.home(authenticated))
            }
            RouteClass::Entry | RouteClass::Other => {
                NavigationDecision::Redirect(self.home(authenticated))
            }
            RouteClass::Public | RouteClass::Protected => NavigationDecision::Allow,
        };

        debug!(target, authenticated, ?decision, "navigation evaluated");
        decision
    }

    /// Where a session-less or post-login user should land.
    pub fn home(&self, authenticated: bool) -> Location {
        if authenticated {
            Location::new(self.routes.landing.clone())
        } else {
            Location::new(self.routes.login.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{SESSION_KEY, SessionPersistence};
    use crate::domain_port::KeyValueStorage;
    use crate::infra_memory::{ManualClock, MemoryKeyValueStorage};
    use std::time::Duration;

    struct Fixture {
        storage: Arc<MemoryKeyValueStorage>,
        clock: Arc<ManualClock>,
        store: Arc<SessionStore>,
        guard: RouteGuard,
    }

    fn fixture() -> Fixture {
        let storage = Arc::new(MemoryKeyValueStorage::new());
        let clock = Arc::new(ManualClock::new(1_000_000));
        let store = Arc::new(SessionStore::new(
            SessionPersistence::new(storage.clone()),
            clock.clone(),
        ));
        let guard = RouteGuard::new(store.clone(), RouteTable::default());
        Fixture {
            storage,
            clock,
            store,
            guard,
        }
    }

    fn sign_in(store: &SessionStore) {
        store.set_tokens(&TokenGrant {
            access_token: "at".to_string(),
            refresh_token: "rt".to_string(),
            expires_in: 600,
            user_id: "u".to_string(),
        });
    }

    fn redirect(path: &str) -> NavigationDecision {
        NavigationDecision::Redirect(Location::parse(path))
    }

    #[test]
    fn classifies_routes() {
        let routes = RouteTable::default();
        assert_eq!(routes.classify("/"), RouteClass::Entry);
        assert_eq!(routes.classify("/login"), RouteClass::Public);
        assert_eq!(routes.classify("/logout/"), RouteClass::Public);
        assert_eq!(routes.classify("/Onebook"), RouteClass::Protected);
        assert_eq!(routes.classify("/books"), RouteClass::Protected);
        assert_eq!(routes.classify("/nope"), RouteClass::Other);
        assert_eq!(routes.classify("/books/1"), RouteClass::Other);
    }

    #[test]
    fn unauthenticated_protected_redirects_to_login_with_return_path() {
        let f = fixture();

        let decision = f.guard.before_each("/books?page=2");

        let NavigationDecision::Redirect(login) = decision else {
            panic!("expected redirect, got {decision:?}");
        };
        assert_eq!(login.path, "/login");
        assert_eq!(login.query_value(RETURN_TARGET_PARAM), Some("/books?page=2"));
        assert_eq!(login.return_target().unwrap().full_path(), "/books?page=2");
    }

    #[test]
    fn authenticated_sign_in_pages_redirect_to_landing() {
        let f = fixture();
        sign_in(&f.store);

        assert_eq!(f.guard.before_each("/login"), redirect("/home"));
        assert_eq!(f.guard.before_each("/register"), redirect("/home"));
        assert_eq!(f.guard.before_each("/logout"), NavigationDecision::Allow);
    }

    #[test]
    fn unauthenticated_public_is_allowed() {
        let f = fixture();
        assert_eq!(f.guard.before_each("/login"), NavigationDecision::Allow);
        assert_eq!(f.guard.before_each("/register"), NavigationDecision::Allow);
        assert_eq!(f.guard.before_each("/logout"), NavigationDecision::Allow);
    }

    #[test]
    fn authenticated_protected_is_allowed() {
        let f = fixture();
        sign_in(&f.store);
        assert_eq!(f.guard.before_each("/home"), NavigationDecision::Allow);
        assert_eq!(f.guard.before_each("/filmsTV"), NavigationDecision::Allow);
    }

    #[test]
    fn unmatched_and_root_fall_back_by_session() {
        let f = fixture();
        assert_eq!(f.guard.before_each("/missing"), redirect("/login"));
        assert_eq!(f.guard.before_each("/"), redirect("/login"));

        sign_in(&f.store);
        assert_eq!(f.guard.before_each("/missing"), redirect("/home"));
        assert_eq!(f.guard.before_each("/"), redirect("/home"));
    }

    #[test]
    fn relative_targets_are_blocked() {
        let f = fixture();
        assert_eq!(
            f.guard.before_each("home"),
            NavigationDecision::Block(BlockReason::NotAbsolute)
        );
    }

    #[test]
    fn deep_link_hydrates_from_storage() {
        let f = fixture();
        sign_in(&f.store);
        let fresh_store = Arc::new(SessionStore::new(
            SessionPersistence::new(f.storage.clone()),
            f.clock.clone(),
        ));
        let guard = RouteGuard::new(fresh_store.clone(), RouteTable::default());

        assert_eq!(guard.before_each("/books"), NavigationDecision::Allow);
        assert!(fresh_store.has_access_token());
    }

    #[test]
    fn expired_session_is_treated_as_unauthenticated() {
        let f = fixture();
        sign_in(&f.store);
        f.clock.advance(Duration::from_secs(600));

        assert!(matches!(
            f.guard.before_each("/home"),
            NavigationDecision::Redirect(ref l) if l.path == "/login"
        ));
        assert_eq!(f.guard.before_each("/login"), NavigationDecision::Allow);
    }

    #[test]
    fn corrupted_storage_does_not_break_navigation() {
        let f = fixture();
        f.storage.set(SESSION_KEY, "{not json").unwrap();

        assert_eq!(f.guard.before_each("/login"), NavigationDecision::Allow);
        assert!(!f.store.has_access_token());
    }
}
