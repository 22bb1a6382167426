//! Derivation of display fields from server records.
//!
//! Everything here is pure: the same ticket always yields the same labels.

use itertools::Itertools as _;
use time::macros::format_description;

use crate::api::{
    self,
    ticket::{Created, Timestamp},
};

/// Service codes paired with the labels students pick from.
const SERVICE_LABELS: [(&str, &str); 6] = [
    ("furniture", "Carpenter"),
    ("electrical", "Electrician"),
    ("plumbing", "Plumber"),
    ("cleaning", "Cleaning"),
    ("it_support", "IT Support"),
    ("others", "Other"),
];

/// Label for a service code. Unknown codes come back unchanged.
pub fn service_label(code: &str) -> &str {
    SERVICE_LABELS
        .iter()
        .find(|(c, _)| *c == code)
        .map_or(code, |&(_, label)| label)
}

/// Inverse of [`service_label`]. Unknown labels come back unchanged.
pub fn service_code(label: &str) -> &str {
    SERVICE_LABELS
        .iter()
        .find(|(_, l)| *l == label)
        .map_or(label, |&(code, _)| code)
}

/// Title-cases a raw status code: `in_progress` becomes `In Progress`.
///
/// Only ever feed it the wire code, not a label produced earlier.
pub fn format_status(code: &str) -> String {
    code.split(['_', '-'])
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .join(" ")
}

/// Short en-US date, e.g. `3/7/2024`.
pub fn format_date(at: &Timestamp) -> String {
    let date = at.date_time().date();
    date.format(format_description!(
        "[month padding:none]/[day padding:none]/[year]"
    ))
    .unwrap_or_else(|_| date.to_string())
}

/// Date cell of a ticket; raw values that are not timestamps show as
/// `Invalid Date`.
pub fn format_created(created: &Created) -> String {
    created
        .at()
        .map_or_else(|| "Invalid Date".to_string(), |at| format_date(&at))
}

/// A ticket with its human-readable fields precomputed for one render.
#[derive(Clone, Debug)]
pub struct DisplayTicket {
    pub ticket: api::Ticket,
    pub service: String,
    pub status: String,
    pub date: String,
}

impl From<api::Ticket> for DisplayTicket {
    fn from(ticket: api::Ticket) -> Self {
        Self {
            service: service_label(ticket.service_type.code()).to_string(),
            status: format_status(ticket.status.code()),
            date: format_created(&ticket.timestamp),
            ticket,
        }
    }
}
