//! View models of the CampusFix pages.
//!
//! Each page owns its form or filter state, talks to a [`Service`], reports
//! outcomes through [`Toasts`] and tells its caller where to go next.
//!
//! [`Service`]: crate::client::Service

pub mod login;
pub mod management;
pub mod raise_issue;
pub mod register;
pub mod table;
pub mod track_requests;

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use tracing::{info, warn};

use crate::{api::user::Role, session::Session};

pub use self::{
    login::LoginPage, management::ManagementDashboard, raise_issue::RaiseIssue,
    register::RegisterPage, track_requests::TrackRequests,
};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Route {
    Login,
    Register,
    StudentDashboard,
    RaiseIssue,
    TrackRequests,
    ManagementDashboard,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/",
            Self::Register => "/register",
            Self::StudentDashboard => "/student/dashboard",
            Self::RaiseIssue => "/student/raise-issue",
            Self::TrackRequests => "/student/track-requests",
            Self::ManagementDashboard => "/management/dashboard",
        }
    }

    /// Landing page after login.
    pub fn home(role: Role) -> Self {
        match role {
            Role::Student => Self::StudentDashboard,
            Role::Management => Self::ManagementDashboard,
        }
    }

    /// Unknown pages below `/student/` and `/management/` fall back to the
    /// section's dashboard.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.trim_end_matches('/');
        match path {
            "" => Some(Self::Login),
            "/register" => Some(Self::Register),
            "/student/raise-issue" => Some(Self::RaiseIssue),
            "/student/track-requests" => Some(Self::TrackRequests),
            p if p == "/student" || p.starts_with("/student/") => {
                Some(Self::StudentDashboard)
            }
            p if p == "/management" || p.starts_with("/management/") => {
                Some(Self::ManagementDashboard)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Level {
    Success,
    Error,
}

/// Transient message shown to the user.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

/// Shared queue of notifications, written by views and background polls.
#[derive(Clone, Debug, Default)]
pub struct Toasts(Arc<Mutex<Vec<Notification>>>);

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&self, message: impl Into<String>) {
        let message = message.into();
        info!(%message, "notify");
        self.push(Level::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        warn!(%message, "notify");
        self.push(Level::Error, message);
    }

    fn push(&self, level: Level, message: String) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notification { level, message });
    }

    /// Takes every pending notification, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Forgets the stored credential and returns to the login page.
pub async fn logout(session: &Session, toasts: &Toasts) -> Route {
    match session.clear().await {
        Ok(()) => toasts.success("Logged out"),
        Err(e) => toasts.error(format!("Failed to clear session: {e}")),
    }
    Route::Login
}
