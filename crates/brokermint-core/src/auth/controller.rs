//! Session & navigation controller.
//!
//! `SessionController` is the single owner of the current session. It
//! decides which navigation partition is reachable, writes the durable
//! session record, publishes the credential to the gateway, and reacts to
//! the gateway's authorization-failure events.
//!
//! Every transition that touches both the durable record and the in-memory
//! state runs inside one synchronous method, so no other task can observe
//! one updated without the other.

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::api::{ApiError, Gateway, GatewayEvent, GatewayLink};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest};
use crate::navigation::{Partition, View};

use super::session::{Credential, Session, UserProfile};
use super::store::KeyValueStore;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Session has not been restored yet")]
    NotRestored,

    #[error("Already signed in as {0}")]
    AlreadyAuthenticated(String),
}

impl SessionError {
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Api(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Uninitialized,
    Restoring,
    Authenticated(Session),
    Anonymous,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    /// Reachable partition. Transient states only reach the anonymous graph.
    pub fn partition(&self) -> Partition {
        Partition::for_session(self.is_authenticated())
    }
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndReason {
    Logout,
    Rejected,
}

pub struct SessionController {
    store: Box<dyn KeyValueStore>,
    gateway: Gateway,
    credential: watch::Sender<Option<Credential>>,
    events: mpsc::UnboundedReceiver<GatewayEvent>,
    state: SessionState,
    active_view: View,
}

impl SessionController {
    pub fn new(store: Box<dyn KeyValueStore>, gateway: Gateway, link: GatewayLink) -> Self {
        Self {
            store,
            gateway,
            credential: link.credential,
            events: link.events,
            state: SessionState::Uninitialized,
            active_view: Partition::Anonymous.default_view(),
        }
    }

    /// Gateway handle for screens. Clones share the credential this
    /// controller publishes and report back to it.
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    pub fn current_user(&self) -> Option<&UserProfile> {
        match &self.state {
            SessionState::Authenticated(session) => Some(&session.user),
            _ => None,
        }
    }

    pub fn active_view(&self) -> View {
        self.active_view
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Rebuild the session from durable storage. Runs once per process;
    /// later calls leave the state alone.
    ///
    /// The stored token is trusted without asking the service. A revoked
    /// token surfaces on the first call that gets a `401`.
    pub fn restore(&mut self) -> &SessionState {
        if !matches!(self.state, SessionState::Uninitialized) {
            warn!("Session restore already ran, ignoring");
            return &self.state;
        }

        self.state = SessionState::Restoring;
        self.state = match Session::load(self.store.as_ref()) {
            Some(session) => {
                info!(username = %session.user.username, "Session restored");
                self.credential.send_replace(Some(session.credential.clone()));
                SessionState::Authenticated(session)
            }
            None => {
                debug!("No stored session, starting anonymous");
                SessionState::Anonymous
            }
        };
        self.active_view = self.state.partition().default_view();
        &self.state
    }

    pub async fn login(&mut self, credentials: &LoginRequest) -> Result<&UserProfile, SessionError> {
        self.ensure_anonymous()?;
        let result = self.gateway.authenticate(credentials).await;
        self.finish_exchange(result)
    }

    pub async fn register(&mut self, profile: &RegisterRequest) -> Result<&UserProfile, SessionError> {
        self.ensure_anonymous()?;
        let result = self.gateway.register_account(profile).await;
        self.finish_exchange(result)
    }

    /// Sign out. Does nothing (storage included) when no session is held.
    pub fn logout(&mut self) {
        if !self.is_authenticated() {
            debug!("Logout requested without a session");
            return;
        }
        self.end_session(EndReason::Logout);
    }

    /// Apply pending gateway events. Returns how many were handled.
    pub fn process_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            match event {
                GatewayEvent::Unauthorized { path } => {
                    warn!(path = %path, "Credential rejected, ending session");
                    self.end_session(EndReason::Rejected);
                }
            }
            handled += 1;
        }
        handled
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Route guard. Returns the view that is active afterwards.
    pub fn navigate(&mut self, requested: View) -> View {
        let landed = self.state.partition().guard(requested);
        if landed != requested {
            debug!(requested = %requested, landed = %landed, "Navigation redirected");
        }
        self.active_view = landed;
        landed
    }

    pub fn navigate_path(&mut self, path: &str) -> View {
        let landed = self.state.partition().resolve(path);
        self.active_view = landed;
        landed
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn ensure_anonymous(&mut self) -> Result<(), SessionError> {
        // A rejection observed since the last tick may already have ended the session
        self.process_events();
        match &self.state {
            SessionState::Anonymous => Ok(()),
            SessionState::Authenticated(session) => Err(SessionError::AlreadyAuthenticated(
                session.user.username.clone(),
            )),
            SessionState::Uninitialized | SessionState::Restoring => Err(SessionError::NotRestored),
        }
    }

    fn finish_exchange(
        &mut self,
        result: Result<AuthResponse, ApiError>,
    ) -> Result<&UserProfile, SessionError> {
        self.process_events();
        let auth = result?;
        if self.is_authenticated() {
            // Another exchange finished first; keep the one already established
            return Err(SessionError::AlreadyAuthenticated(
                self.current_user().map(|u| u.username.clone()).unwrap_or_default(),
            ));
        }
        Ok(self.establish(auth))
    }

    fn establish(&mut self, auth: AuthResponse) -> &UserProfile {
        let session = Session::new(auth.user, Credential::new(auth.token));

        if let Err(e) = session.save(self.store.as_mut()) {
            warn!(error = %e, "Failed to persist session");
        }
        self.credential.send_replace(Some(session.credential.clone()));

        info!(username = %session.user.username, role = %session.user.role, "Signed in");
        self.state = SessionState::Authenticated(session);
        self.active_view = Partition::Authenticated.default_view();

        match &self.state {
            SessionState::Authenticated(session) => &session.user,
            _ => unreachable!("state was just set to Authenticated"),
        }
    }

    fn end_session(&mut self, reason: EndReason) {
        if let Err(e) = Session::clear(self.store.as_mut()) {
            warn!(error = %e, "Failed to clear stored session");
        }
        self.credential.send_replace(None);

        if let SessionState::Authenticated(ref session) = self.state {
            info!(username = %session.user.username, ?reason, "Signed out");
        }
        self.state = SessionState::Anonymous;
        self.active_view = Partition::Anonymous.default_view();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::auth::session::{TOKEN_KEY, USER_KEY};
    use crate::auth::store::{FileStore, MemoryStore};
    use crate::testing::{FailingStore, FakeService};

    fn controller_with(base_url: &str, store: Box<dyn KeyValueStore>) -> SessionController {
        let (gateway, link) = Gateway::new(base_url, Duration::from_secs(5)).unwrap();
        SessionController::new(store, gateway, link)
    }

    fn admin_record() -> MemoryStore {
        MemoryStore::with_entries([
            (TOKEN_KEY, "t1"),
            (USER_KEY, r#"{"username":"admin","role":"admin"}"#),
        ])
    }

    fn stored(controller: &SessionController, key: &str) -> Option<String> {
        controller.store().get(key).unwrap()
    }

    #[tokio::test]
    async fn test_login_scenario() {
        let service = FakeService::start().await;
        let mut controller = controller_with(&service.base_url, Box::new(MemoryStore::default()));
        assert_eq!(controller.restore(), &SessionState::Anonymous);
        assert_eq!(controller.active_view(), View::Login);

        let user = controller
            .login(&LoginRequest::new("admin", "admin"))
            .await
            .expect("login")
            .clone();

        assert_eq!(user, UserProfile::new("admin", "admin"));
        assert!(controller.is_authenticated());
        assert_eq!(stored(&controller, TOKEN_KEY).as_deref(), Some("t1"));
        assert_eq!(
            stored(&controller, USER_KEY).as_deref(),
            Some(r#"{"username":"admin","role":"admin"}"#)
        );
        assert_eq!(controller.active_view(), View::Dashboard);
        assert!(controller.gateway().has_credential());
    }

    #[tokio::test]
    async fn test_unpersisted_login_never_pairs_token_with_stray_profile() {
        let service = FakeService::start().await;
        let store = FailingStore::new(
            MemoryStore::with_entries([(USER_KEY, r#"{"username":"mallory","role":"admin"}"#)]),
            USER_KEY,
        );
        let mut controller = controller_with(&service.base_url, Box::new(store));
        controller.restore();

        controller
            .login(&LoginRequest::new("admin", "admin"))
            .await
            .expect("login");

        // Signed in for this run, but nothing durable survives the failed write
        assert_eq!(controller.current_user().map(|u| u.username.as_str()), Some("admin"));
        assert_eq!(stored(&controller, TOKEN_KEY), None);
        assert_eq!(stored(&controller, USER_KEY), None);
        assert!(Session::load(controller.store()).is_none());
    }

    #[tokio::test]
    async fn test_failed_login_leaves_state_and_surfaces_message() {
        let service = FakeService::start().await;
        let mut controller = controller_with(&service.base_url, Box::new(MemoryStore::default()));
        controller.restore();

        let err = controller
            .login(&LoginRequest::new("admin", "wrong"))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Invalid credentials");
        assert_eq!(controller.state(), &SessionState::Anonymous);
        assert_eq!(controller.active_view(), View::Login);
        assert!(controller.current_user().is_none());
    }

    #[tokio::test]
    async fn test_register_establishes_session() {
        let service = FakeService::start().await;
        let mut controller = controller_with(&service.base_url, Box::new(MemoryStore::default()));
        controller.restore();
        controller.navigate(View::Register);

        let request = RegisterRequest {
            username: "jdoe".to_string(),
            email: "jdoe@example.com".to_string(),
            password: "pw".to_string(),
            full_name: "Jane Doe".to_string(),
            ..Default::default()
        };
        let user = controller.register(&request).await.expect("register").clone();
        assert_eq!(user.username, "jdoe");
        assert_eq!(user.role, "user");
        assert_eq!(user.full_name(), Some("Jane Doe"));
        assert_eq!(controller.active_view(), View::Dashboard);

        controller.logout();
        let taken = RegisterRequest {
            username: "taken".to_string(),
            ..Default::default()
        };
        let err = controller.register(&taken).await.unwrap_err();
        assert_eq!(err.user_message(), "User already exists");
        assert!(!controller.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_requires_restore_and_anonymous_state() {
        let service = FakeService::start().await;
        let mut controller = controller_with(&service.base_url, Box::new(admin_record()));

        let err = controller.login(&LoginRequest::new("admin", "admin")).await.unwrap_err();
        assert!(matches!(err, SessionError::NotRestored));

        controller.restore();
        let err = controller.login(&LoginRequest::new("admin", "admin")).await.unwrap_err();
        assert!(matches!(err, SessionError::AlreadyAuthenticated(ref u) if u == "admin"));
    }

    #[test]
    fn test_logout_is_idempotent() {
        let mut controller =
            controller_with("http://127.0.0.1:9/api", Box::new(admin_record()));
        controller.restore();
        assert!(controller.is_authenticated());

        controller.logout();
        assert_eq!(controller.state(), &SessionState::Anonymous);
        assert_eq!(stored(&controller, TOKEN_KEY), None);
        assert_eq!(stored(&controller, USER_KEY), None);
        assert_eq!(controller.active_view(), View::Login);
        assert!(!controller.gateway().has_credential());

        controller.logout();
        assert_eq!(controller.state(), &SessionState::Anonymous);
        assert_eq!(controller.active_view(), View::Login);
    }

    #[test]
    fn test_logout_when_anonymous_leaves_storage_untouched() {
        let partial = MemoryStore::with_entries([(TOKEN_KEY, "orphan")]);
        let mut controller = controller_with("http://127.0.0.1:9/api", Box::new(partial));
        controller.restore();
        assert_eq!(controller.state(), &SessionState::Anonymous);

        controller.logout();
        assert_eq!(stored(&controller, TOKEN_KEY).as_deref(), Some("orphan"));
        assert_eq!(stored(&controller, USER_KEY), None);
    }

    #[test]
    fn test_restore_with_one_key_is_anonymous() {
        let user_json = r#"{"username":"admin","role":"admin"}"#;
        let cases = [
            MemoryStore::with_entries([(TOKEN_KEY, "t1")]),
            MemoryStore::with_entries([(USER_KEY, user_json)]),
        ];

        for store in cases {
            let before = store.clone();
            let mut controller = controller_with("http://127.0.0.1:9/api", Box::new(store));
            assert_eq!(controller.restore(), &SessionState::Anonymous);
            assert_eq!(controller.active_view(), View::Login);
            assert!(!controller.gateway().has_credential());

            // Nothing was written or removed
            for key in [TOKEN_KEY, USER_KEY] {
                assert_eq!(stored(&controller, key), before.get(key).unwrap());
            }
        }
    }

    #[test]
    fn test_restore_runs_once() {
        let mut controller =
            controller_with("http://127.0.0.1:9/api", Box::new(admin_record()));
        assert_eq!(controller.state(), &SessionState::Uninitialized);
        controller.restore();
        controller.logout();
        // A second restore must not resurrect anything
        assert_eq!(controller.restore(), &SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_session_survives_restart() {
        let service = FakeService::start().await;
        let dir = tempfile::tempdir().unwrap();

        let mut first = controller_with(&service.base_url, Box::new(FileStore::new(dir.path())));
        first.restore();
        let user = first
            .login(&LoginRequest::new("admin", "admin"))
            .await
            .expect("login")
            .clone();
        drop(first);

        let mut second = controller_with(&service.base_url, Box::new(FileStore::new(dir.path())));
        match second.restore() {
            SessionState::Authenticated(session) => {
                assert_eq!(session.user, user);
                assert_eq!(session.credential, Credential::new("t1"));
            }
            other => panic!("expected restored session, got {:?}", other),
        }
        assert_eq!(second.active_view(), View::Dashboard);

        // The restored credential is what the gateway sends
        second.gateway().fetch_dashboard().await.expect("dashboard");
        assert_eq!(service.last_authorization().as_deref(), Some("Bearer t1"));
    }

    #[tokio::test]
    async fn test_unauthorized_converges_to_anonymous() {
        let service = FakeService::start().await;
        let mut controller = controller_with(&service.base_url, Box::new(MemoryStore::default()));
        controller.restore();
        controller.login(&LoginRequest::new("admin", "admin")).await.expect("login");
        controller.navigate(View::Audit);

        // A screen's call runs on its own gateway clone while the token is revoked
        let screen_gateway = controller.gateway().clone();
        service.revoke("t1");
        let err = screen_gateway.fetch_audit_trail(10).await.unwrap_err();
        assert!(err.is_unauthorized());

        assert_eq!(controller.process_events(), 1);
        assert_eq!(controller.state(), &SessionState::Anonymous);
        assert_eq!(stored(&controller, TOKEN_KEY), None);
        assert_eq!(stored(&controller, USER_KEY), None);
        assert_eq!(controller.active_view(), View::Login);
        assert!(!screen_gateway.has_credential());

        // Later rejections are handled the same way without error
        let _ = screen_gateway.fetch_dashboard().await;
        assert_eq!(controller.process_events(), 1);
        assert_eq!(controller.active_view(), View::Login);
    }

    #[tokio::test]
    async fn test_unauthorized_after_navigation_still_redirects() {
        let service = FakeService::start().await;
        let mut controller = controller_with(&service.base_url, Box::new(MemoryStore::default()));
        controller.restore();
        controller.login(&LoginRequest::new("admin", "admin")).await.expect("login");

        controller.navigate(View::Reports);
        let in_flight = {
            let gateway = controller.gateway().clone();
            tokio::spawn(async move { gateway.generate_report().await })
        };
        service.revoke("t1");
        controller.navigate(View::Ekyc);

        // The report may or may not have been served before the revoke;
        // only a rejection has side effects.
        let outcome = in_flight.await.unwrap();
        controller.process_events();
        match outcome {
            Ok(_) => assert_eq!(controller.active_view(), View::Ekyc),
            Err(e) => {
                assert!(e.is_unauthorized());
                assert_eq!(controller.active_view(), View::Login);
                assert!(!controller.is_authenticated());
            }
        }
    }

    #[tokio::test]
    async fn test_route_guard_follows_state() {
        let service = FakeService::start().await;
        let mut controller = controller_with(&service.base_url, Box::new(MemoryStore::default()));

        // Before restore only the anonymous graph is reachable
        assert_eq!(controller.navigate(View::Dashboard), View::Login);

        controller.restore();
        for view in View::ALL {
            let landed = controller.navigate(view);
            assert_eq!(landed.partition(), Partition::Anonymous);
        }
        assert_eq!(controller.navigate_path("/audit"), View::Login);
        assert_eq!(controller.navigate_path("/register"), View::Register);

        controller.login(&LoginRequest::new("admin", "admin")).await.expect("login");
        assert_eq!(controller.navigate(View::Login), View::Dashboard);
        assert_eq!(controller.navigate(View::Anomalies), View::Anomalies);
        assert_eq!(controller.navigate_path("/"), View::Dashboard);
        assert_eq!(controller.navigate_path("/nowhere"), View::Dashboard);
    }
}
