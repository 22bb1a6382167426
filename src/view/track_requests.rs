use std::sync::Arc;

use crate::{
    api::{
        ticket::{Code, Status},
        Ticket,
    },
    client::Service,
    display::DisplayTicket,
    filter::{Filter, Selector},
};

use super::{table, Toasts};

/// A student's own tickets, with an optional status filter and a detail
/// panel.
pub struct TrackRequests {
    service: Arc<dyn Service>,
    toasts: Toasts,
    status: Selector<Status>,
    tickets: Vec<Ticket>,
    loading: bool,
    error: Option<String>,
    selected: Option<Code>,
}

impl TrackRequests {
    pub fn new(service: Arc<dyn Service>, toasts: Toasts) -> Self {
        Self {
            service,
            toasts,
            status: Selector::All,
            tickets: Vec::new(),
            loading: false,
            error: None,
            selected: None,
        }
    }

    pub async fn mount(&mut self) {
        self.fetch().await;
    }

    pub fn status_filter(&self) -> Selector<Status> {
        self.status
    }

    /// Changing the filter re-queries the server.
    pub async fn set_status_filter(&mut self, status: Selector<Status>) {
        self.status = status;
        self.fetch().await;
    }

    /// Loads the list. On failure the previous list stays and the error is
    /// kept for display until the next attempt.
    pub async fn fetch(&mut self) {
        self.loading = true;
        self.error = None;

        match self.service.list_my_tickets(self.status.only().copied()).await {
            Ok(tickets) => self.tickets = tickets,
            Err(e) => {
                self.error = Some(
                    e.detail().unwrap_or("Failed to fetch requests").to_string(),
                );
                self.toasts.error("Failed to fetch requests");
            }
        }
        self.loading = false;
    }

    /// User-triggered reload ("Refresh" and "Try Again").
    pub async fn refresh(&mut self) {
        self.fetch().await;
        if self.error.is_none() {
            self.toasts.success("Refreshed requests");
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Rows to show. The server already filtered by status, but its answer
    /// is not trusted to.
    pub fn rows(&self) -> Vec<DisplayTicket> {
        Filter {
            status: self.status,
            ..Filter::default()
        }
        .apply(&self.tickets)
    }

    /// Opens the detail panel of a listed ticket.
    pub fn select(&mut self, code: &Code) -> Option<DisplayTicket> {
        let found = self.tickets.iter().find(|t| &t.code == code)?;
        self.selected = Some(found.code.clone());
        Some(DisplayTicket::from(found.clone()))
    }

    pub fn selected(&self) -> Option<DisplayTicket> {
        let code = self.selected.as_ref()?;
        self.tickets
            .iter()
            .find(|t| &t.code == code)
            .cloned()
            .map(DisplayTicket::from)
    }

    pub fn close_details(&mut self) {
        self.selected = None;
    }

    pub fn render(&self) -> String {
        if self.loading {
            return "Loading your requests...".to_string();
        }
        if let Some(e) = &self.error {
            return format!("Error: {e}");
        }
        let rows = self.rows();
        if rows.is_empty() {
            return "You haven't raised any issues yet.".to_string();
        }
        let mut out = table::own_requests(&rows);
        if let Some(details) = self.selected() {
            out.push('\n');
            out.push_str(&table::details(&details));
        }
        out
    }
}
