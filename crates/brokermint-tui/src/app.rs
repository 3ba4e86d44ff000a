//! Application state management for the BrokerMint console.
//!
//! This module contains the core `App` struct: the session controller, form
//! and per-view state, and coordination of the background requests each
//! screen issues.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::io::{self, Write};

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use brokermint_core::api::ApiError;
use brokermint_core::auth::{KeyValueStore, MemoryStore};
use brokermint_core::models::{
    parse_tickers, AnomalyResult, AuditTrail, ComplianceReport, Dashboard, DocumentType,
    LoginRequest, RegisterRequest, VerificationRequest, VerificationResult,
};
use brokermint_core::{Config, Gateway, Partition, SessionController, View};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

const MAX_FIELD_LENGTH: usize = 100;

/// Number of rows to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Environment variables that prefill the login form
pub const USERNAME_ENV: &str = "BROKERMINT_USERNAME";
pub const PASSWORD_ENV: &str = "BROKERMINT_PASSWORD";

const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please log in again.";

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    /// Keystrokes go to the active view's text field
    Editing,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
    Register,
}

impl LoginFocus {
    pub fn next(&self) -> Self {
        match self {
            LoginFocus::Username => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::Button,
            LoginFocus::Button => LoginFocus::Register,
            LoginFocus::Register => LoginFocus::Username,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            LoginFocus::Username => LoginFocus::Register,
            LoginFocus::Password => LoginFocus::Username,
            LoginFocus::Button => LoginFocus::Password,
            LoginFocus::Register => LoginFocus::Button,
        }
    }
}

/// Registration form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterFocus {
    Username,
    Email,
    FullName,
    Password,
    Button,
    BackToLogin,
}

impl RegisterFocus {
    pub const FIELDS: [RegisterFocus; 4] = [
        RegisterFocus::Username,
        RegisterFocus::Email,
        RegisterFocus::FullName,
        RegisterFocus::Password,
    ];

    pub fn next(&self) -> Self {
        match self {
            RegisterFocus::Username => RegisterFocus::Email,
            RegisterFocus::Email => RegisterFocus::FullName,
            RegisterFocus::FullName => RegisterFocus::Password,
            RegisterFocus::Password => RegisterFocus::Button,
            RegisterFocus::Button => RegisterFocus::BackToLogin,
            RegisterFocus::BackToLogin => RegisterFocus::Username,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            RegisterFocus::Username => RegisterFocus::BackToLogin,
            RegisterFocus::Email => RegisterFocus::Username,
            RegisterFocus::FullName => RegisterFocus::Email,
            RegisterFocus::Password => RegisterFocus::FullName,
            RegisterFocus::Button => RegisterFocus::Password,
            RegisterFocus::BackToLogin => RegisterFocus::Button,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RegisterFocus::Username => "Username",
            RegisterFocus::Email => "Email",
            RegisterFocus::FullName => "Full name",
            RegisterFocus::Password => "Password",
            RegisterFocus::Button => "Create account",
            RegisterFocus::BackToLogin => "Back to login",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
}

impl RegisterForm {
    pub fn field(&self, focus: RegisterFocus) -> Option<&str> {
        match focus {
            RegisterFocus::Username => Some(&self.username),
            RegisterFocus::Email => Some(&self.email),
            RegisterFocus::FullName => Some(&self.full_name),
            RegisterFocus::Password => Some(&self.password),
            RegisterFocus::Button | RegisterFocus::BackToLogin => None,
        }
    }

    fn field_mut(&mut self, focus: RegisterFocus) -> Option<&mut String> {
        match focus {
            RegisterFocus::Username => Some(&mut self.username),
            RegisterFocus::Email => Some(&mut self.email),
            RegisterFocus::FullName => Some(&mut self.full_name),
            RegisterFocus::Password => Some(&mut self.password),
            RegisterFocus::Button | RegisterFocus::BackToLogin => None,
        }
    }

    fn to_request(&self) -> RegisterRequest {
        RegisterRequest {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            full_name: self.full_name.trim().to_string(),
            ..Default::default()
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results of requests issued by the screens.
///
/// Each is tagged with the session epoch it was issued under, so nothing
/// fetched for a session that has since ended is ever displayed.
#[derive(Debug)]
enum ViewResult {
    Dashboard(Dashboard),
    Anomalies(Vec<AnomalyResult>),
    Verification(VerificationResult),
    Report(ComplianceReport),
    AuditTrail(AuditTrail),
    Failed { view: View, error: ApiError },
}

type TaggedResult = (u64, ViewResult);

fn into_view_result<T>(
    view: View,
    result: Result<T, ApiError>,
    wrap: impl FnOnce(T) -> ViewResult,
) -> ViewResult {
    match result {
        Ok(data) => wrap(data),
        Err(error) => ViewResult::Failed { view, error },
    }
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    pub config: Config,
    pub controller: SessionController,

    pub state: AppState,
    pub status_message: Option<String>,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Register form state
    pub register: RegisterForm,
    pub register_focus: RegisterFocus,
    pub register_error: Option<String>,

    // Per-view data. Kept when navigating away; dropped when the session ends.
    pub dashboard: Option<Dashboard>,
    pub ticker_input: String,
    pub anomaly_results: Vec<AnomalyResult>,
    pub document_type: DocumentType,
    pub document_number: String,
    pub verification: Option<VerificationResult>,
    pub report: Option<ComplianceReport>,
    pub report_scroll: usize,
    pub audit_trail: Option<AuditTrail>,
    pub audit_selection: usize,

    /// Views with a request in flight
    pub loading: HashSet<View>,
    /// Last failure per view, shown inline
    pub view_errors: HashMap<View, String>,

    session_epoch: u64,
    results_rx: mpsc::Receiver<TaggedResult>,
    results_tx: mpsc::Sender<TaggedResult>,
}

impl App {
    /// Create the app with the configured session store
    pub fn new(config: Config) -> Result<Self> {
        let store: Box<dyn KeyValueStore> = match config.open_store() {
            Ok(store) => store,
            Err(e) => {
                warn!(error = %e, "Session store unavailable, session will not persist");
                Box::new(MemoryStore::default())
            }
        };
        Self::with_store(config, store)
    }

    pub fn with_store(config: Config, store: Box<dyn KeyValueStore>) -> Result<Self> {
        let (gateway, link) = Gateway::new(config.api_base_url(), config.request_timeout())
            .context("Failed to create HTTP client")?;
        debug!(base_url = %gateway.base_url(), "Gateway ready");
        let controller = SessionController::new(store, gateway, link);

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let login_username = std::env::var(USERNAME_ENV)
            .ok()
            .or_else(|| config.last_username.clone())
            .unwrap_or_default();
        let login_password = std::env::var(PASSWORD_ENV).unwrap_or_default();
        let ticker_input = config.default_tickers.clone();

        Ok(Self {
            config,
            controller,

            state: AppState::Normal,
            status_message: None,

            login_username,
            login_password,
            login_focus: LoginFocus::Username,
            login_error: None,

            register: RegisterForm::default(),
            register_focus: RegisterFocus::Username,
            register_error: None,

            dashboard: None,
            ticker_input,
            anomaly_results: Vec::new(),
            document_type: DocumentType::default(),
            document_number: String::new(),
            verification: None,
            report: None,
            report_scroll: 0,
            audit_trail: None,
            audit_selection: 0,

            loading: HashSet::new(),
            view_errors: HashMap::new(),

            session_epoch: 0,
            results_rx: rx,
            results_tx: tx,
        })
    }

    pub fn active_view(&self) -> View {
        self.controller.active_view()
    }

    pub fn is_authenticated(&self) -> bool {
        self.controller.is_authenticated()
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Restore the stored session and land on the matching default view
    pub fn restore_session(&mut self) {
        if self.controller.restore().is_authenticated() {
            self.begin_session();
        } else {
            self.focus_login_form();
        }
    }

    /// Interactive login (used for CLI mode)
    pub async fn login_interactive(&mut self) -> Result<()> {
        println!("\n=== BrokerMint Login ===\n");

        if let Some(user) = self.controller.current_user() {
            println!("Already signed in as {} ({}).", user.username, user.role);
            println!("Run with --logout to sign out first.\n");
            return Ok(());
        }

        let username = match self.config.last_username.clone() {
            Some(last_user) => {
                print!("Username [{}]: ", last_user);
                io::stdout().flush()?;

                let mut input = String::new();
                io::stdin().read_line(&mut input)?;
                let input = input.trim();

                if input.is_empty() {
                    last_user
                } else {
                    input.to_string()
                }
            }
            None => Self::prompt_username()?,
        };
        let password = Self::prompt_password()?;

        println!("\nAuthenticating...");

        let user = self
            .controller
            .login(&LoginRequest::new(username.as_str(), password))
            .await
            .map(|user| user.username.clone())
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;

        self.remember_username(&user);
        println!("Login successful!\n");
        Ok(())
    }

    fn prompt_username() -> Result<String> {
        print!("Username: ");
        io::stdout().flush()?;

        let mut username = String::new();
        io::stdin().read_line(&mut username)?;
        Ok(username.trim().to_string())
    }

    fn prompt_password() -> Result<String> {
        let password = rpassword::prompt_password("Password: ")?;
        Ok(password)
    }

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) -> Result<()> {
        let username = self.login_username.trim().to_string();
        let password = self.login_password.clone();

        if username.is_empty() || password.is_empty() {
            self.login_error = Some("Username and password required".to_string());
            return Err(anyhow::anyhow!("Username and password required"));
        }

        self.login_error = None;

        let outcome = self
            .controller
            .login(&LoginRequest::new(username.as_str(), password))
            .await
            .map(|user| user.username.clone());

        match outcome {
            Ok(user) => {
                self.remember_username(&user);
                self.login_password.clear();
                self.begin_session();
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                let message = e.user_message();
                self.login_error = Some(message.clone());
                Err(anyhow::anyhow!(message))
            }
        }
    }

    /// Attempt registration with the registration form
    pub async fn attempt_register(&mut self) -> Result<()> {
        let request = self.register.to_request();
        if request.username.is_empty() || request.email.is_empty() || request.password.is_empty() {
            let message = "Username, email and password required";
            self.register_error = Some(message.to_string());
            return Err(anyhow::anyhow!(message));
        }

        self.register_error = None;

        let outcome = self
            .controller
            .register(&request)
            .await
            .map(|user| user.username.clone());

        match outcome {
            Ok(user) => {
                info!(username = %user, "Account created");
                self.remember_username(&user);
                self.login_username = user;
                self.register = RegisterForm::default();
                self.register_focus = RegisterFocus::Username;
                self.begin_session();
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Registration failed");
                let message = e.user_message();
                self.register_error = Some(message.clone());
                Err(anyhow::anyhow!(message))
            }
        }
    }

    pub fn logout(&mut self) {
        if !self.is_authenticated() {
            return;
        }
        self.controller.logout();
        self.end_session();
        self.status_message = Some("Signed out".to_string());
    }

    fn remember_username(&mut self, username: &str) {
        self.config.last_username = Some(username.to_string());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    /// A session was just established (login, registration or restore)
    fn begin_session(&mut self) {
        self.session_epoch += 1;
        self.clear_view_data();
        self.status_message = None;
        self.prefetch();
    }

    /// The controller already ended the session; drop what it displayed
    fn end_session(&mut self) {
        self.session_epoch += 1;
        self.clear_view_data();
        self.state = AppState::Normal;
        self.focus_login_form();
    }

    fn clear_view_data(&mut self) {
        self.dashboard = None;
        self.anomaly_results.clear();
        self.ticker_input = self.config.default_tickers.clone();
        self.document_type = DocumentType::default();
        self.document_number.clear();
        self.verification = None;
        self.report = None;
        self.report_scroll = 0;
        self.audit_trail = None;
        self.audit_selection = 0;
        self.loading.clear();
        self.view_errors.clear();
    }

    fn focus_login_form(&mut self) {
        self.login_focus = if self.login_username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Request a view through the route guard, loading its data if needed
    pub fn navigate(&mut self, requested: View) -> View {
        let landed = self.controller.navigate(requested);
        if landed != requested {
            self.status_message = Some(format!("{} is not available", requested.title()));
        }
        if self.state == AppState::Editing {
            self.state = AppState::Normal;
        }
        self.on_view_entered(landed);
        landed
    }

    /// View bound to number key `n` (1-based) in the current partition
    pub fn view_for_key(&self, n: usize) -> Option<View> {
        let partition = self.controller.state().partition();
        n.checked_sub(1).and_then(|i| partition.views().get(i).copied())
    }

    fn on_view_entered(&mut self, view: View) {
        match view {
            View::Dashboard if self.dashboard.is_none() => self.refresh_dashboard(),
            View::Audit if self.audit_trail.is_none() => self.refresh_audit_trail(),
            View::Login => self.focus_login_form(),
            _ => {}
        }
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Load the dashboard and audit trail together after sign-in
    fn prefetch(&mut self) {
        if !self.is_authenticated() {
            return;
        }
        self.loading.insert(View::Dashboard);
        self.loading.insert(View::Audit);

        let gateway = self.controller.gateway().clone();
        let limit = self.config.audit_limit;
        let tx = self.results_tx.clone();
        let epoch = self.session_epoch;

        tokio::spawn(async move {
            let (dashboard, audit) = futures::join!(
                gateway.fetch_dashboard(),
                gateway.fetch_audit_trail(limit)
            );
            Self::send_result(
                &tx,
                epoch,
                into_view_result(View::Dashboard, dashboard, ViewResult::Dashboard),
            )
            .await;
            Self::send_result(
                &tx,
                epoch,
                into_view_result(View::Audit, audit, ViewResult::AuditTrail),
            )
            .await;
        });
    }

    /// Spawn a request for `view`; its result is applied on a later tick
    fn spawn_request<F>(&mut self, view: View, request: F)
    where
        F: Future<Output = ViewResult> + Send + 'static,
    {
        if self.loading.contains(&view) {
            debug!(view = %view, "Request already in flight");
            return;
        }
        self.loading.insert(view);
        self.view_errors.remove(&view);

        let tx = self.results_tx.clone();
        let epoch = self.session_epoch;
        tokio::spawn(async move {
            let result = request.await;
            Self::send_result(&tx, epoch, result).await;
        });
    }

    async fn send_result(tx: &mpsc::Sender<TaggedResult>, epoch: u64, result: ViewResult) {
        if let Err(e) = tx.send((epoch, result)).await {
            error!(error = %e, "Failed to send view result - channel closed");
        }
    }

    pub fn refresh_dashboard(&mut self) {
        let gateway = self.controller.gateway().clone();
        self.spawn_request(View::Dashboard, async move {
            into_view_result(
                View::Dashboard,
                gateway.fetch_dashboard().await,
                ViewResult::Dashboard,
            )
        });
    }

    pub fn refresh_audit_trail(&mut self) {
        let gateway = self.controller.gateway().clone();
        let limit = self.config.audit_limit;
        self.spawn_request(View::Audit, async move {
            into_view_result(
                View::Audit,
                gateway.fetch_audit_trail(limit).await,
                ViewResult::AuditTrail,
            )
        });
    }

    pub fn detect_anomalies(&mut self) {
        let tickers = parse_tickers(&self.ticker_input);
        if tickers.is_empty() {
            self.view_errors
                .insert(View::Anomalies, "Enter at least one ticker".to_string());
            return;
        }

        let gateway = self.controller.gateway().clone();
        self.spawn_request(View::Anomalies, async move {
            into_view_result(
                View::Anomalies,
                gateway.detect_anomalies(&tickers).await,
                ViewResult::Anomalies,
            )
        });
    }

    pub fn verify_document(&mut self) {
        let request = VerificationRequest::new(self.document_type, self.document_number.trim());
        let gateway = self.controller.gateway().clone();
        self.spawn_request(View::Ekyc, async move {
            into_view_result(
                View::Ekyc,
                gateway.verify_identity(&request).await,
                ViewResult::Verification,
            )
        });
    }

    pub fn generate_report(&mut self) {
        let gateway = self.controller.gateway().clone();
        self.spawn_request(View::Reports, async move {
            into_view_result(
                View::Reports,
                gateway.generate_report().await,
                ViewResult::Report,
            )
        });
    }

    /// Write the generated report into the download directory
    pub fn save_report(&mut self) {
        let Some(ref report) = self.report else {
            self.status_message = Some("Generate a report first".to_string());
            return;
        };

        let dir = self.config.download_dir();
        match report.save_to(&dir) {
            Ok(path) => {
                info!(path = %path.display(), "Report saved");
                self.status_message = Some(format!("Report saved to {}", path.display()));
            }
            Err(e) => {
                warn!(error = %e, "Failed to save report");
                self.status_message = Some(format!("Error: {}", e));
            }
        }
    }

    // =========================================================================
    // Background results
    // =========================================================================

    /// Apply session events and completed requests. Called every tick.
    pub fn check_background_tasks(&mut self) {
        let was_authenticated = self.is_authenticated();
        if self.controller.process_events() > 0 && was_authenticated {
            self.end_session();
            self.status_message = Some(SESSION_EXPIRED_MESSAGE.to_string());
        }

        while let Ok((epoch, result)) = self.results_rx.try_recv() {
            if epoch != self.session_epoch {
                debug!("Discarding result from an ended session");
                continue;
            }
            self.process_view_result(result);
        }
    }

    fn process_view_result(&mut self, result: ViewResult) {
        match result {
            ViewResult::Dashboard(data) => {
                self.loading.remove(&View::Dashboard);
                self.dashboard = Some(data);
            }
            ViewResult::Anomalies(data) => {
                self.loading.remove(&View::Anomalies);
                if data.is_empty() {
                    self.status_message = Some("No anomalies returned".to_string());
                }
                self.anomaly_results = data;
            }
            ViewResult::Verification(data) => {
                self.loading.remove(&View::Ekyc);
                self.verification = Some(data);
            }
            ViewResult::Report(data) => {
                self.loading.remove(&View::Reports);
                self.report_scroll = 0;
                self.report = Some(data);
            }
            ViewResult::AuditTrail(data) => {
                self.loading.remove(&View::Audit);
                self.audit_selection = 0;
                self.audit_trail = Some(data);
            }
            ViewResult::Failed { view, error } => {
                self.loading.remove(&view);
                if error.is_unauthorized() {
                    // The session controller already handled it
                    return;
                }
                warn!(view = %view, error = %error, "Request failed");
                self.view_errors.insert(view, error.user_message());
            }
        }
    }

    // =========================================================================
    // Text input
    // =========================================================================

    /// Append a character to the focused form field of an anonymous view
    pub fn push_form_char(&mut self, c: char) {
        match self.active_view() {
            View::Login => match self.login_focus {
                LoginFocus::Username => {
                    if can_add_username_char(self.login_username.chars().count(), c) {
                        self.login_username.push(c);
                    }
                }
                LoginFocus::Password => {
                    if can_add_password_char(self.login_password.chars().count(), c) {
                        self.login_password.push(c);
                    }
                }
                LoginFocus::Button | LoginFocus::Register => {}
            },
            View::Register => {
                let focus = self.register_focus;
                if let Some(field) = self.register.field_mut(focus) {
                    let allowed = match focus {
                        RegisterFocus::Username => can_add_username_char(field.chars().count(), c),
                        RegisterFocus::Password => can_add_password_char(field.chars().count(), c),
                        _ => can_add_field_char(field.chars().count(), c),
                    };
                    if allowed {
                        field.push(c);
                    }
                }
            }
            _ => {}
        }
    }

    pub fn pop_form_char(&mut self) {
        match self.active_view() {
            View::Login => match self.login_focus {
                LoginFocus::Username => {
                    self.login_username.pop();
                }
                LoginFocus::Password => {
                    self.login_password.pop();
                }
                LoginFocus::Button | LoginFocus::Register => {}
            },
            View::Register => {
                let focus = self.register_focus;
                if let Some(field) = self.register.field_mut(focus) {
                    field.pop();
                }
            }
            _ => {}
        }
    }

    /// Text field edited in `AppState::Editing` on the active view
    pub fn editing_field_mut(&mut self) -> Option<&mut String> {
        match self.active_view() {
            View::Anomalies => Some(&mut self.ticker_input),
            View::Ekyc => Some(&mut self.document_number),
            _ => None,
        }
    }

    pub fn audit_len(&self) -> usize {
        self.audit_trail.as_ref().map(|t| t.entries.len()).unwrap_or(0)
    }

    pub fn partition(&self) -> Partition {
        self.controller.state().partition()
    }
}

// ============================================================================
// Input Validation
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a username character should be accepted
pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

/// Any other free-text field (email, full name, tickers, document number)
pub fn can_add_field_char(current_len: usize, c: char) -> bool {
    current_len < MAX_FIELD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================
