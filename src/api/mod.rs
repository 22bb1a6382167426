pub mod ticket;
pub mod user;

use derive_more::Display;

pub use self::{ticket::Ticket, user::User};

/// Required form field left empty. Raised before any request is sent.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ValidationError {
    #[display("Please select a service type")]
    MissingServiceType,
    #[display("Please describe the issue")]
    MissingDescription,
    #[display("Please enter a location")]
    MissingLocation,
    #[display("Please enter your name")]
    MissingName,
    #[display("Please enter your email")]
    MissingEmail,
    #[display("Please enter your ID")]
    MissingCollegeId,
    #[display("Please enter your password")]
    MissingPassword,
}

impl std::error::Error for ValidationError {}

/// Fails with `error` when `value` is empty or whitespace.
pub(crate) fn require(
    value: &str,
    error: ValidationError,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error)
    } else {
        Ok(())
    }
}
