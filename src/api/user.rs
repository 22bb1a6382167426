use std::str::FromStr;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use super::{require, ValidationError};

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[display("student")]
    Student,
    #[display("management")]
    Management,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "management" => Ok(Self::Management),
            other => Err(format!("unknown user type `{other}`")),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub college_id: String,
    pub user_type: Role,
}

/// Registration form, sent form-encoded.
#[derive(Clone, Debug, Serialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub college_id: String,
    pub user_type: Role,
    pub password: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), ValidationError> {
        use ValidationError as E;

        require(&self.name, E::MissingName)?;
        require(&self.email, E::MissingEmail)?;
        require(&self.college_id, E::MissingCollegeId)?;
        require(&self.password, E::MissingPassword)
    }
}

/// Successful `/login` response.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user_type: Role,
}
