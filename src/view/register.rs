use std::sync::Arc;

use crate::{
    api::user::{NewUser, Role},
    client::{RegisterError, Service},
};

use super::{Route, Toasts};

pub struct RegisterPage {
    service: Arc<dyn Service>,
    toasts: Toasts,
    pub name: String,
    pub email: String,
    pub college_id: String,
    pub user_type: Role,
    pub password: String,
}

impl RegisterPage {
    pub fn new(service: Arc<dyn Service>, toasts: Toasts) -> Self {
        Self {
            service,
            toasts,
            name: String::new(),
            email: String::new(),
            college_id: String::new(),
            user_type: Role::Student,
            password: String::new(),
        }
    }

    /// Creates the account and sends the user to the login page.
    pub async fn submit(&mut self) -> Option<Route> {
        let user = NewUser {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            college_id: self.college_id.trim().to_string(),
            user_type: self.user_type,
            password: self.password.clone(),
        };
        if let Err(e) = user.validate() {
            self.toasts.error(e.to_string());
            return None;
        }

        match self.service.register(&user).await {
            Ok(_) => {
                self.password.clear();
                self.toasts.success("Registration successful! Please log in.");
                Some(Route::Login)
            }
            Err(RegisterError::Validation(e)) => {
                self.toasts.error(e.to_string());
                None
            }
            Err(RegisterError::Fetch(e)) => {
                self.toasts
                    .error(e.detail().unwrap_or("Registration failed. Please try again."));
                None
            }
        }
    }
}
