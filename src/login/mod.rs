//!
//! login form
//! ----------
//! Headless login form: validates credentials locally, performs a single
//! authentication call, stores the token in a [`SessionContext`] and decides
//! where to go next. Rendering is left to the caller, which reads a
//! [`FormView`] after each submit.
//!
//! State machine: `Idle -> Submitting -> {Success, Failed}`. A submit while a
//! request is in flight is refused with [`SubmitOutcome::Busy`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;

pub mod api;
pub mod errors;
pub mod links;
mod session_context;

pub use api::{ApiFailure, AuthApi, HttpAuthApi};
pub use links::{login_links, EntryPoint, IntegrationParams, LoginLinks};
pub use session_context::SessionContext;

/// Landing route after a direct (non-integration) login.
pub const LANDING_ROUTE: &str = "/templates";

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("valid email regex"));

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool { self.email.is_none() && self.password.is_none() }
}

/// Client-side checks run before any network call.
pub fn validate(creds: &Credentials) -> Result<(), FieldErrors> {
    let mut errs = FieldErrors::default();
    if creds.email.is_empty() {
        errs.email = Some("Please provide an email".into());
    } else if !EMAIL_PATTERN.is_match(&creds.email) {
        errs.email = Some("Please provide a valid email".into());
    }
    if creds.password.is_empty() {
        errs.password = Some("Please input a password".into());
    }
    if errs.is_empty() { Ok(()) } else { Err(errs) }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoginState {
    #[default]
    Idle,
    Submitting,
    Success,
    Failed,
}

/// What the form shows right now.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormView {
    pub state: LoginState,
    pub fields: FieldErrors,
    /// Generic error text; never set together with a field message.
    pub banner: Option<String>,
}

impl FormView {
    /// The submit control shows a spinner and ignores clicks while true.
    pub fn submitting(&self) -> bool { self.state == LoginState::Submitting }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Invalid(FieldErrors),
    Busy,
    LoggedIn { navigated_to: Option<String> },
    Failed(ApiFailure),
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

pub trait ErrorReporter: Send + Sync {
    fn capture(&self, failure: &ApiFailure);
}

/// Logs the route change instead of switching screens.
#[derive(Debug, Default, Clone)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: &str) {
        tracing::info!(route, "navigate");
    }
}

#[derive(Debug, Default, Clone)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn capture(&self, failure: &ApiFailure) {
        tracing::error!(status = ?failure.status, code = ?failure.code, "login failed: {}", failure.message);
    }
}

pub struct LoginForm {
    api: Arc<dyn AuthApi>,
    session: SessionContext,
    navigator: Arc<dyn Navigator>,
    reporter: Arc<dyn ErrorReporter>,
    entry: EntryPoint,
    in_flight: AtomicBool,
    view: Mutex<FormView>,
}

/// Clears the in-flight flag even if the submit future is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) { self.0.store(false, Ordering::Release); }
}

impl LoginForm {
    pub fn new(
        api: Arc<dyn AuthApi>,
        session: SessionContext,
        navigator: Arc<dyn Navigator>,
        reporter: Arc<dyn ErrorReporter>,
        entry: EntryPoint,
    ) -> Self {
        Self { api, session, navigator, reporter, entry, in_flight: AtomicBool::new(false), view: Mutex::new(FormView::default()) }
    }

    pub fn view(&self) -> FormView { self.view.lock().clone() }

    pub async fn submit(&self, creds: Credentials) -> SubmitOutcome {
        if self.in_flight.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
            return SubmitOutcome::Busy;
        }
        let _guard = InFlight(&self.in_flight);

        if let Err(fields) = validate(&creds) {
            *self.view.lock() = FormView { state: LoginState::Idle, fields: fields.clone(), banner: None };
            return SubmitOutcome::Invalid(fields);
        }
        *self.view.lock() = FormView { state: LoginState::Submitting, ..FormView::default() };

        match self.api.login(&creds.email, &creds.password).await {
            Ok(token) => {
                self.session.set(token);
                *self.view.lock() = FormView { state: LoginState::Success, ..FormView::default() };
                if self.entry.is_integration() {
                    tracing::debug!("integration handoff; staying on the login page");
                    return SubmitOutcome::LoggedIn { navigated_to: None };
                }
                self.navigator.navigate(LANDING_ROUTE);
                SubmitOutcome::LoggedIn { navigated_to: Some(LANDING_ROUTE.to_string()) }
            }
            Err(failure) => {
                if !failure.is_validation() {
                    self.reporter.capture(&failure);
                }
                let (fields, banner) = errors::present(&failure);
                *self.view.lock() = FormView { state: LoginState::Failed, fields, banner };
                SubmitOutcome::Failed(failure)
            }
        }
    }
}

#[cfg(test)]
#[path = "login_tests.rs"]
mod tests;
