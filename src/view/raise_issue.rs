use std::sync::Arc;

use crate::{
    api::{
        ticket::{NewTicket, ServiceType},
        ValidationError,
    },
    client::{CreateTicketError, Service},
    display,
};

use super::{Route, Toasts};

/// Issue form: pick a service, then describe where and what.
pub struct RaiseIssue {
    service: Arc<dyn Service>,
    toasts: Toasts,
    pub service_type: Option<ServiceType>,
    pub location: String,
    pub description: String,
    /// Reference to an already uploaded photo.
    pub image_url: Option<String>,
}

impl RaiseIssue {
    pub fn new(service: Arc<dyn Service>, toasts: Toasts) -> Self {
        Self {
            service,
            toasts,
            service_type: None,
            location: String::new(),
            description: String::new(),
            image_url: None,
        }
    }

    /// Services offered on the picker, with their labels.
    pub fn choices() -> impl Iterator<Item = (ServiceType, &'static str)> {
        ServiceType::ALL
            .into_iter()
            .map(|s| (s, display::service_label(s.code())))
    }

    pub fn choose(&mut self, service_type: ServiceType) {
        self.service_type = Some(service_type);
    }

    /// Returns to the service picker, keeping typed text.
    pub fn back(&mut self) {
        self.service_type = None;
    }

    fn reset(&mut self) {
        self.service_type = None;
        self.location.clear();
        self.description.clear();
        self.image_url = None;
    }

    /// Files the issue. On success the form is cleared and the caller should
    /// move to the tracking page.
    pub async fn submit(&mut self) -> Option<Route> {
        let Some(service_type) = self.service_type else {
            self.toasts
                .error(ValidationError::MissingServiceType.to_string());
            return None;
        };
        let ticket = NewTicket {
            service_type,
            description: self.description.trim().to_string(),
            location: self.location.trim().to_string(),
            image_url: self.image_url.clone().filter(|url| !url.trim().is_empty()),
        };
        if let Err(e) = ticket.validate() {
            self.toasts.error(e.to_string());
            return None;
        }

        match self.service.create_ticket(&ticket).await {
            Ok(created) => {
                self.toasts.success(format!(
                    "Issue submitted successfully! Ticket ID: {}",
                    created.code
                ));
                self.reset();
                Some(Route::TrackRequests)
            }
            Err(CreateTicketError::Validation(e)) => {
                self.toasts.error(e.to_string());
                None
            }
            Err(CreateTicketError::Fetch(e)) => {
                self.toasts.error(
                    e.detail()
                        .unwrap_or("Failed to submit issue. Please try again."),
                );
                None
            }
        }
    }
}
