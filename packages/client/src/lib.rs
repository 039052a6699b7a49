//! CafeLocate client logic, independent of any UI framework.
//!
//! - [`session`]: who is using the tab, persisted through a [`store::KeyValueStore`].
//! - [`selection`]: the pinned point, radius, and café type, plus the analysis
//!   and area-report data derived from them.
//! - [`controller`]: form validation, notifications, and page switching on top
//!   of the two.
//! - [`report`]: label tables and text for the results panel and full report.

pub mod controller;
pub mod notify;
pub mod report;
pub mod selection;
pub mod session;

pub use controller::{AuthForm, FormError, Page, UiController, ValidationError};
pub use notify::{Notification, NotificationLevel, Notifications};
pub use report::{FullReport, ResultsPanel};
pub use selection::{
    AnalysisCompletion, AnalysisError, AnalysisOutcome, AnalysisTicket, MapController, Overlays,
    ReportCompletion, ReportTicket,
};
pub use session::{AuthError, Session, SessionPhase, SessionStore};
