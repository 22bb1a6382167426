use std::{fmt, str::FromStr};

use derive_more::Display;
use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use time::{
    format_description::well_known::Rfc3339, macros::format_description,
    OffsetDateTime, PrimitiveDateTime, UtcOffset,
};

use super::{require, ValidationError};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Ticket {
    pub id: String,
    #[serde(rename = "ticket_id")]
    pub code: Code,
    pub service_type: Service,
    pub description: String,
    pub location: String,
    pub status: TicketStatus,
    pub timestamp: Created,
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Human-facing ticket identifier, e.g. `TKT-1A2B3C4D`.
#[derive(
    Clone, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd,
    Serialize,
)]
#[serde(transparent)]
pub struct Code(String);

impl Code {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Code {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Code {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd,
    Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Filed by a student, not yet looked at.
    Pending,

    /// Facilities staff are working on it.
    #[serde(alias = "in-progress")]
    InProgress,

    /// Work is done.
    Completed,

    /// Facilities management declined the request.
    Rejected,
}

impl Status {
    pub const ALL: [Self; 4] =
        [Self::Pending, Self::InProgress, Self::Completed, Self::Rejected];

    /// Wire representation.
    pub fn code(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .ok_or_else(|| format!("unknown status `{s}`"))
    }
}

#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd,
    Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Furniture,
    Electrical,
    Plumbing,
    Cleaning,
    ItSupport,
    Others,
}

impl ServiceType {
    pub const ALL: [Self; 6] = [
        Self::Furniture,
        Self::Electrical,
        Self::Plumbing,
        Self::Cleaning,
        Self::ItSupport,
        Self::Others,
    ];

    /// Wire representation.
    pub fn code(self) -> &'static str {
        match self {
            Self::Furniture => "furniture",
            Self::Electrical => "electrical",
            Self::Plumbing => "plumbing",
            Self::Cleaning => "cleaning",
            Self::ItSupport => "it_support",
            Self::Others => "others",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|service| service.code() == code)
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ServiceType {
    type Err = String;

    /// Accepts either a wire code (`it_support`) or a display label
    /// (`IT Support`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::from_code(&s.to_ascii_lowercase().replace('-', "_"))
            .or_else(|| {
                Self::ALL.into_iter().find(|service| {
                    crate::display::service_label(service.code())
                        .eq_ignore_ascii_case(s)
                })
            })
            .ok_or_else(|| format!("unknown service type `{s}`"))
    }
}

/// Service category as received from the server. Codes outside the known
/// set are kept verbatim instead of failing the whole response.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Service {
    Known(ServiceType),
    Unknown(String),
}

impl Service {
    pub fn code(&self) -> &str {
        match self {
            Self::Known(service) => service.code(),
            Self::Unknown(code) => code,
        }
    }

    pub fn known(&self) -> Option<ServiceType> {
        match self {
            Self::Known(service) => Some(*service),
            Self::Unknown(_) => None,
        }
    }
}

impl From<ServiceType> for Service {
    fn from(value: ServiceType) -> Self {
        Self::Known(value)
    }
}

/// Status as received from the server. Like [`Service`], unknown codes are
/// kept instead of failing the whole response.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TicketStatus {
    Known(Status),
    Unknown(String),
}

impl TicketStatus {
    pub fn code(&self) -> &str {
        match self {
            Self::Known(status) => status.code(),
            Self::Unknown(code) => code,
        }
    }

    pub fn known(&self) -> Option<Status> {
        match self {
            Self::Known(status) => Some(*status),
            Self::Unknown(_) => None,
        }
    }
}

impl From<Status> for TicketStatus {
    fn from(value: Status) -> Self {
        Self::Known(value)
    }
}

impl PartialEq<Status> for TicketStatus {
    fn eq(&self, other: &Status) -> bool {
        self.known() == Some(*other)
    }
}

/// Creation time of a ticket. A value that is not a timestamp is kept raw so
/// the rest of the record still shows.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Created {
    At(Timestamp),
    Unparsed(String),
}

impl Created {
    pub fn at(&self) -> Option<Timestamp> {
        match self {
            Self::At(at) => Some(*at),
            Self::Unparsed(_) => None,
        }
    }
}

impl From<Timestamp> for Created {
    fn from(value: Timestamp) -> Self {
        Self::At(value)
    }
}

/// Creation time in UTC.
///
/// The service writes naive timestamps (`2024-03-01T09:30:00.123456`), but
/// offset-qualified RFC 3339 values are accepted and normalized too.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Timestamp(PrimitiveDateTime);

impl Timestamp {
    pub fn now() -> Self {
        let now = OffsetDateTime::now_utc();
        Self(PrimitiveDateTime::new(now.date(), now.time()))
    }

    pub fn parse(raw: &str) -> Result<Self, time::error::Parse> {
        if let Ok(at) = OffsetDateTime::parse(raw, &Rfc3339) {
            let at = at.to_offset(UtcOffset::UTC);
            return Ok(Self(PrimitiveDateTime::new(at.date(), at.time())));
        }
        PrimitiveDateTime::parse(
            raw,
            format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"
            ),
        )
        .or_else(|_| {
            PrimitiveDateTime::parse(
                raw,
                format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
            )
        })
        .map(Self)
    }

    pub fn date_time(&self) -> PrimitiveDateTime {
        self.0
    }
}

impl From<PrimitiveDateTime> for Timestamp {
    fn from(value: PrimitiveDateTime) -> Self {
        Self(value)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let raw = self
            .0
            .format(format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]"
            ))
            .map_err(ser::Error::custom)?;
        serializer.serialize_str(&raw)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(de::Error::custom)
    }
}

/// Body of `POST /issues/raise`.
#[derive(Clone, Debug, Serialize)]
pub struct NewTicket {
    pub service_type: ServiceType,
    pub description: String,
    pub location: String,
    pub image_url: Option<String>,
}

impl NewTicket {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&self.location, ValidationError::MissingLocation)?;
        require(&self.description, ValidationError::MissingDescription)
    }
}

/// Server-side filters of `GET /issues/all`. Empty means everything.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_type: Option<ServiceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Body of `PUT /issues/mark-complete/{ticket_id}`.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct StatusUpdate {
    pub status: Status,
}
