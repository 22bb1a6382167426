use std::{path::PathBuf, time};

use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: Http,
    pub poll: Poll,
    pub session: Session,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Http {
    /// Root of the CampusFix service, without a trailing slash.
    pub base_url: String,
    #[serde(with = "humantime_serde")]
    pub timeout: time::Duration,
}

impl Default for Http {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout: time::Duration::from_secs(30),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Poll {
    #[serde(with = "humantime_serde")]
    pub interval: time::Duration,
}

impl Default for Poll {
    fn default() -> Self {
        Self {
            interval: time::Duration::from_secs(10),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Session {
    pub path: PathBuf,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".campus-fix/session.toml"),
        }
    }
}
