use std::{
    sync::{Arc, PoisonError, RwLock},
    time::Duration,
};

use futures::FutureExt as _;
use tracing::warn;

use crate::{
    api::{
        ticket::{Code, ListQuery, Status},
        Ticket,
    },
    client::Service,
    display::{self, DisplayTicket},
    filter::Filter,
    poll,
};

use super::{table, Toasts};

type SharedTickets = Arc<RwLock<Vec<Ticket>>>;

/// Every ticket in the system, kept fresh by polling while mounted.
pub struct ManagementDashboard {
    service: Arc<dyn Service>,
    toasts: Toasts,
    tickets: SharedTickets,
    pub filter: Filter,
    period: Duration,
    poll: Option<poll::Handle>,
}

impl ManagementDashboard {
    pub fn new(service: Arc<dyn Service>, toasts: Toasts, period: Duration) -> Self {
        Self {
            service,
            toasts,
            tickets: SharedTickets::default(),
            filter: Filter::default(),
            period,
            poll: None,
        }
    }

    /// Fetches right away and keeps polling until [`unmount`]. Mounting
    /// again replaces the running poll instead of adding a second one.
    ///
    /// [`unmount`]: Self::unmount
    pub fn mount(&mut self) {
        self.unmount();

        let service = Arc::clone(&self.service);
        let tickets = Arc::clone(&self.tickets);
        let toasts = self.toasts.clone();
        self.poll = Some(poll::start(self.period, move || {
            fetch(Arc::clone(&service), Arc::clone(&tickets), toasts.clone()).boxed()
        }));
    }

    pub fn unmount(&mut self) {
        if let Some(poll) = self.poll.take() {
            poll.stop();
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poll.as_ref().is_some_and(poll::Handle::is_active)
    }

    pub async fn refresh(&self) {
        fetch(
            Arc::clone(&self.service),
            Arc::clone(&self.tickets),
            self.toasts.clone(),
        )
        .await;
    }

    /// Asks the server to move a ticket to `status`, then reloads the list.
    /// Nothing changes locally until the reload lands.
    pub async fn change_status(&self, code: &Code, status: Status) -> bool {
        match self.service.update_status(code, status).await {
            Ok(_) => {
                self.toasts
                    .success(format!("Request {code} status updated to {status}"));
                self.refresh().await;
                true
            }
            Err(e) => {
                warn!(%code, error = %e, "status update failed");
                self.toasts.error("Failed to update status");
                false
            }
        }
    }

    /// Status choices offered for every row.
    pub fn status_options() -> impl Iterator<Item = (Status, String)> {
        Status::ALL
            .into_iter()
            .map(|s| (s, display::format_status(s.code())))
    }

    pub fn tickets(&self) -> Vec<Ticket> {
        self.tickets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn rows(&self) -> Vec<DisplayTicket> {
        self.filter
            .apply(self.tickets.read().unwrap_or_else(PoisonError::into_inner).iter())
    }

    pub fn render(&self) -> String {
        let rows = self.rows();
        if rows.is_empty() {
            return "No requests found".to_string();
        }
        table::requests(&rows)
    }
}

/// Replaces the list with a fresh copy, or leaves it alone on failure.
async fn fetch(service: Arc<dyn Service>, tickets: SharedTickets, toasts: Toasts) {
    match service.list_all_tickets(&ListQuery::default()).await {
        Ok(fresh) => {
            *tickets.write().unwrap_or_else(PoisonError::into_inner) = fresh;
        }
        Err(e) => {
            warn!(error = %e, "fetching requests failed");
            toasts.error("Failed to fetch requests");
        }
    }
}
