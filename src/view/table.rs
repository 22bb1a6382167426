//! Plain-text tables for terminal output.

use tabled::{builder::Builder, settings::Style};

use crate::display::DisplayTicket;

fn render<const N: usize>(
    header: [&str; N],
    rows: impl IntoIterator<Item = [String; N]>,
) -> String {
    let mut builder = Builder::new();
    builder.push_record(header.map(String::from));
    for row in rows {
        builder.push_record(row);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// All-requests table of the management dashboard.
pub fn requests(rows: &[DisplayTicket]) -> String {
    render(
        ["Request", "Description", "Service", "Location", "Status", "Student", "Date"],
        rows.iter().map(|row| {
            [
                row.ticket.code.to_string(),
                row.ticket.description.clone(),
                row.service.clone(),
                row.ticket.location.clone(),
                row.status.clone(),
                row.ticket.student_name.clone(),
                row.date.clone(),
            ]
        }),
    )
}

/// A student's own tickets.
pub fn own_requests(rows: &[DisplayTicket]) -> String {
    render(
        ["Ticket ID", "Service", "Location", "Status", "Date"],
        rows.iter().map(|row| {
            [
                row.ticket.code.to_string(),
                row.service.clone(),
                row.ticket.location.clone(),
                row.status.clone(),
                row.date.clone(),
            ]
        }),
    )
}

/// Field/value listing of a single ticket.
pub fn details(row: &DisplayTicket) -> String {
    let mut fields = vec![
        ["Ticket ID".to_string(), row.ticket.code.to_string()],
        ["Status".to_string(), row.status.clone()],
        ["Service Type".to_string(), row.service.clone()],
        ["Date Raised".to_string(), row.date.clone()],
        ["Location".to_string(), row.ticket.location.clone()],
        ["Description".to_string(), row.ticket.description.clone()],
    ];
    if let Some(url) = &row.ticket.image_url {
        fields.push(["Image".to_string(), url.clone()]);
    }
    render(["Field", "Value"], fields)
}
