use std::str::FromStr;

use crate::{
    api::{
        ticket::{Service, ServiceType, Status},
        Ticket,
    },
    display::DisplayTicket,
};

/// Either every value or exactly one.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Selector<T> {
    #[default]
    All,
    Only(T),
}

impl<T> Selector<T> {
    pub fn only(&self) -> Option<&T> {
        match self {
            Self::All => None,
            Self::Only(value) => Some(value),
        }
    }
}

impl<T: FromStr> FromStr for Selector<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

/// View-local filter state. A ticket passes only when all three parts
/// accept it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Filter {
    pub status: Selector<Status>,
    pub service: Selector<ServiceType>,
    pub search: String,
}

impl Filter {
    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.status
            .only()
            .map_or(true, |&s| ticket.status == s)
            && self
                .service
                .only()
                .map_or(true, |&s| ticket.service_type == Service::Known(s))
            && self.matches_search(ticket)
    }

    /// Case-insensitive substring match over code, description and
    /// location. An empty query matches everything.
    fn matches_search(&self, ticket: &Ticket) -> bool {
        let query = self.search.to_lowercase();
        if query.is_empty() {
            return true;
        }
        [
            ticket.code.as_str(),
            ticket.description.as_str(),
            ticket.location.as_str(),
        ]
        .into_iter()
        .any(|field| field.to_lowercase().contains(&query))
    }

    /// Filters and derives display rows in one pass, keeping input order.
    pub fn apply<'a, I>(&self, tickets: I) -> Vec<DisplayTicket>
    where
        I: IntoIterator<Item = &'a Ticket>,
    {
        tickets
            .into_iter()
            .filter(|ticket| self.matches(ticket))
            .cloned()
            .map(DisplayTicket::from)
            .collect()
    }
}
