//! Page-level glue between the views and the two state machines.
//!
//! [`UiController`] validates form input, forwards it to [`SessionStore`] and
//! [`MapController`], and turns every outcome into a notification. The page
//! shown is never set directly: it follows the session lifecycle signal, so a
//! logout from anywhere lands on the login page with the map released.
//!
//! Network-bound actions come in three parts (`prepare_*`, an await the caller
//! performs on a cloned client, `finish_*`) so a view can keep the controller
//! in a reactive cell without holding it across the await. `submit_*` runs all
//! three in place.

use std::time::Duration;

use api::models::{LoginResponse, UserRecord};
use api::{AnalysisApi, ApiError, AuthApi, CafeType};
use store::KeyValueStore;
use thiserror::Error;
use tokio::sync::watch;

use crate::notify::{NotificationLevel, Notifications};
use crate::report::FullReport;
use crate::selection::{
    AnalysisCompletion, AnalysisOutcome, AnalysisTicket, MapController,
    PointSelected, ReportCompletion, ReportTicket,
};
use crate::session::{AuthError, SessionPhase, SessionStore};

pub const MIN_PASSWORD_LEN: usize = 6;

pub const LOGIN_SUCCESS: &str = "Login successful!";
pub const REGISTRATION_SUCCESS: &str = "Registration successful! Please login.";
pub const GUEST_WELCOME: &str = "Welcome! You are now browsing as a guest.";
pub const CHOOSE_CATEGORY: &str = "Please select a café type first!";
pub const PIN_LOCATION: &str = "Pin a location first to generate a report.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Login,
    Map,
}

impl Page {
    fn for_phase(phase: SessionPhase) -> Self {
        if phase.is_active() {
            Page::Map
        } else {
            Page::Login
        }
    }
}

/// Which card the login page shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthForm {
    #[default]
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in all fields")]
    MissingFields,
    #[error("Password must be at least 6 characters long")]
    PasswordTooShort,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FormError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Validated login input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn parse(username: &str, password: &str) -> Result<Self, ValidationError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ValidationError::MissingFields);
        }
        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

/// Validated registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    pub fn parse(username: &str, email: &str, password: &str) -> Result<Self, ValidationError> {
        let (username, email) = (username.trim(), email.trim());
        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(ValidationError::MissingFields);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort);
        }
        Ok(Self {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        })
    }
}

pub struct UiController<S, A, M> {
    session: SessionStore<S, A>,
    map: MapController<M>,
    notifications: Notifications,
    lifecycle: watch::Receiver<SessionPhase>,
    page: Page,
    form: AuthForm,
    busy: bool,
}

impl<S, A, M> UiController<S, A, M>
where
    S: KeyValueStore,
    A: AuthApi,
    M: AnalysisApi,
{
    pub fn new(session: SessionStore<S, A>, map: MapController<M>, timeout: Duration) -> Self {
        let lifecycle = session.subscribe();
        let page = Page::for_phase(session.phase());
        Self {
            session,
            map,
            notifications: Notifications::new(timeout),
            lifecycle,
            page,
            form: AuthForm::Login,
            busy: false,
        }
    }

    /// Restore a persisted session and show the matching page.
    pub fn start(&mut self) -> Page {
        self.session.restore_session();
        self.sync_lifecycle()
    }

    /// Follow the lifecycle signal: an active session shows the map, anything
    /// else shows the login page and releases the map.
    pub fn sync_lifecycle(&mut self) -> Page {
        let phase = *self.lifecycle.borrow_and_update();
        let page = Page::for_phase(phase);
        match page {
            Page::Map => self.map.activate(),
            Page::Login if self.map.is_active() => self.map.release(),
            Page::Login => {}
        }
        if page != self.page {
            tracing::debug!(?page, "switching page");
            self.page = page;
        }
        page
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn form(&self) -> AuthForm {
        self.form
    }

    pub fn show_form(&mut self, form: AuthForm) {
        self.form = form;
    }

    /// Whether a login or registration request is outstanding.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn session(&self) -> &SessionStore<S, A> {
        &self.session
    }

    pub fn map(&self) -> &MapController<M> {
        &self.map
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn dismiss(&mut self, id: u64) {
        self.notifications.dismiss(id);
    }

    fn warn(&mut self, err: ValidationError) -> FormError {
        self.notifications.push(NotificationLevel::Warning, err.to_string());
        FormError::Invalid(err)
    }

    // Auth forms

    pub fn prepare_login(&mut self, username: &str, password: &str) -> Result<Credentials, FormError> {
        let credentials = Credentials::parse(username, password).map_err(|e| self.warn(e))?;
        self.busy = true;
        Ok(credentials)
    }

    pub fn finish_login(
        &mut self,
        result: Result<LoginResponse, ApiError>,
    ) -> Result<UserRecord, FormError> {
        self.busy = false;
        let outcome = self.session.finish_login(result);
        match &outcome {
            Ok(_) => {
                self.notifications.push(NotificationLevel::Success, LOGIN_SUCCESS);
            }
            Err(err) => {
                self.notifications.push(NotificationLevel::Error, err.message());
            }
        }
        self.sync_lifecycle();
        outcome.map_err(FormError::from)
    }

    pub async fn submit_login(&mut self, username: &str, password: &str) -> Result<UserRecord, FormError> {
        let credentials = self.prepare_login(username, password)?;
        let result = self
            .session
            .api()
            .login(&credentials.username, &credentials.password)
            .await;
        self.finish_login(result)
    }

    pub fn prepare_register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Registration, FormError> {
        let registration =
            Registration::parse(username, email, password).map_err(|e| self.warn(e))?;
        self.busy = true;
        Ok(registration)
    }

    /// On success the login card is shown; the session is unchanged.
    pub fn finish_register(&mut self, result: Result<(), ApiError>) -> Result<(), FormError> {
        self.busy = false;
        match SessionStore::<S, A>::finish_register(result) {
            Ok(()) => {
                self.notifications.push(NotificationLevel::Success, REGISTRATION_SUCCESS);
                self.form = AuthForm::Login;
                Ok(())
            }
            Err(err) => {
                self.notifications.push(NotificationLevel::Error, err.message());
                Err(err.into())
            }
        }
    }

    pub async fn submit_register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), FormError> {
        let registration = self.prepare_register(username, email, password)?;
        let result = self
            .session
            .api()
            .register(&registration.username, &registration.email, &registration.password)
            .await;
        self.finish_register(result)
    }

    pub fn guest_login(&mut self) -> UserRecord {
        let user = self.session.guest_login();
        self.notifications.push(NotificationLevel::Info, GUEST_WELCOME);
        self.sync_lifecycle();
        user
    }

    pub fn logout(&mut self) {
        self.session.logout();
        self.form = AuthForm::Login;
        self.sync_lifecycle();
    }

    // Map page

    /// Pin a point. Without a café type a warning is shown and nothing is
    /// dispatched.
    pub fn select_point(&mut self, lat: f64, lng: f64) -> Option<AnalysisTicket> {
        match self.map.select_point(lat, lng) {
            PointSelected::Analyze(ticket) => Some(ticket),
            PointSelected::NeedsCategory => {
                self.notifications.push(NotificationLevel::Warning, CHOOSE_CATEGORY);
                None
            }
        }
    }

    pub fn set_category(&mut self, cafe_type: CafeType) -> Option<AnalysisTicket> {
        self.map.set_category(cafe_type)
    }

    pub fn set_radius(&mut self, meters: u32) -> Option<AnalysisTicket> {
        self.map.set_radius(meters)
    }

    pub fn preview_radius(&mut self, meters: u32) {
        self.map.preview_radius(meters);
    }

    /// Failures stay inline in the results panel; no toast is raised.
    pub fn complete_analysis(&mut self, completion: AnalysisCompletion) -> AnalysisOutcome {
        self.map.complete(completion)
    }

    pub async fn run_analysis(&mut self, ticket: AnalysisTicket) -> AnalysisOutcome {
        let completion = ticket.run(self.map.api()).await;
        self.complete_analysis(completion)
    }

    /// Start the full report. Warns when no point is pinned.
    pub fn begin_report(&mut self) -> Option<ReportTicket> {
        let ticket = self.map.begin_report();
        if ticket.is_none() {
            self.notifications.push(NotificationLevel::Warning, PIN_LOCATION);
        }
        ticket
    }

    pub fn complete_report(&mut self, completion: ReportCompletion) -> Option<FullReport> {
        if !self.map.complete_report(completion) {
            return None;
        }
        self.map.full_report()
    }

    pub async fn open_report(&mut self) -> Option<FullReport> {
        let ticket = self.begin_report()?;
        let completion = ticket.run(self.map.api()).await;
        self.complete_report(completion)
    }
}
