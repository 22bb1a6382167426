use std::sync::Arc;

use tracing::warn;

use crate::{
    api::{require, user::Role, ValidationError},
    client::Service,
};

use super::{Route, Toasts};

pub struct LoginPage {
    service: Arc<dyn Service>,
    toasts: Toasts,
    /// Which login form is shown. `None` is the role picker.
    pub user_type: Option<Role>,
    pub college_id: String,
    pub password: String,
}

impl LoginPage {
    pub fn new(service: Arc<dyn Service>, toasts: Toasts) -> Self {
        Self {
            service,
            toasts,
            user_type: None,
            college_id: String::new(),
            password: String::new(),
        }
    }

    pub fn choose(&mut self, role: Role) {
        self.user_type = Some(role);
    }

    pub fn id_label(&self) -> &'static str {
        match self.user_type {
            Some(Role::Management) => "Management ID",
            Some(Role::Student) | None => "College ID",
        }
    }

    /// Logs in and returns the landing page of the role the server reports,
    /// which may differ from the picked one.
    pub async fn submit(&mut self) -> Option<Route> {
        let filled = require(&self.college_id, ValidationError::MissingCollegeId)
            .and_then(|()| require(&self.password, ValidationError::MissingPassword));
        if let Err(e) = filled {
            self.toasts.error(e.to_string());
            return None;
        }

        match self.service.login(&self.college_id, &self.password).await {
            Ok(credential) => {
                self.password.clear();
                self.toasts.success("Login successful!");
                Some(Route::home(credential.role))
            }
            Err(e) => {
                warn!(error = %e, "login failed");
                self.toasts
                    .error("Login failed. Please check your credentials.");
                None
            }
        }
    }
}
