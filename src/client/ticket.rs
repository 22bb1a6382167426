use tracing::{debug, info};

use crate::api::{
    self,
    ticket::{Code, ListQuery, NewTicket, Status, StatusUpdate},
};

use super::{
    send, Client, CreateTicketError, FetchError, ISSUES, ISSUES_ALL,
    ISSUES_MARK_COMPLETE, ISSUES_MY, ISSUES_RAISE,
};

impl Client {
    /// Every ticket in the system. Management only.
    pub async fn list_all_tickets(
        &self,
        query: &ListQuery,
    ) -> Result<Vec<api::Ticket>, FetchError> {
        let req = self.authorized(self.http.get(self.url(ISSUES_ALL)))?;
        let tickets = send::<Vec<api::Ticket>>(req.query(query)).await?;
        debug!(count = tickets.len(), "fetched all tickets");
        Ok(tickets)
    }

    /// Tickets filed by the logged-in student. The status filter is applied
    /// by the server, callers still filter locally.
    pub async fn list_my_tickets(
        &self,
        status: Option<Status>,
    ) -> Result<Vec<api::Ticket>, FetchError> {
        let mut req = self.authorized(self.http.get(self.url(ISSUES_MY)))?;
        if let Some(status) = status {
            req = req.query(&[("status", status.code())]);
        }
        let tickets = send::<Vec<api::Ticket>>(req).await?;
        debug!(count = tickets.len(), "fetched own tickets");
        Ok(tickets)
    }

    pub async fn create_ticket(
        &self,
        ticket: &NewTicket,
    ) -> Result<api::Ticket, CreateTicketError> {
        ticket.validate()?;

        let req = self.authorized(self.http.post(self.url(ISSUES_RAISE)))?;
        let created = send::<api::Ticket>(req.json(ticket)).await?;
        info!(code = %created.code, service = %ticket.service_type, "ticket raised");
        Ok(created)
    }

    /// Sets the status of a ticket. Management only.
    pub async fn update_status(
        &self,
        code: &Code,
        status: Status,
    ) -> Result<api::Ticket, FetchError> {
        let url = self.url_with(ISSUES_MARK_COMPLETE, code.as_str());
        let req = self.authorized(self.http.put(url))?;
        let updated = send::<api::Ticket>(req.json(&StatusUpdate { status })).await?;
        info!(%code, %status, "ticket status updated");
        Ok(updated)
    }

    pub async fn get_ticket(&self, code: &Code) -> Result<api::Ticket, FetchError> {
        let req = self.authorized(self.http.get(self.url_with(ISSUES, code.as_str())))?;
        send::<api::Ticket>(req).await
    }
}
