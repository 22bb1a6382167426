use std::{
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock},
};

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::api::user::Role;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Credential {
    pub token: String,
    pub role: Role,
}

/// Holder of the bearer credential.
///
/// Cloning shares the credential. A session created with [`Session::load`]
/// mirrors every change into its file, so later runs pick it up.
#[derive(Clone, Debug, Default)]
pub struct Session {
    credential: Arc<RwLock<Option<Credential>>>,
    path: Option<PathBuf>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let credential = match fs::read_to_string(&path).await {
            Ok(raw) => toml::from_str::<Stored>(&raw)?.credential,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), logged_in = credential.is_some(), "session loaded");

        Ok(Self {
            credential: Arc::new(RwLock::new(credential)),
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn credential(&self) -> Option<Credential> {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.credential().map(|c| c.token)
    }

    pub fn role(&self) -> Option<Role> {
        self.credential().map(|c| c.role)
    }

    pub async fn set_credential(
        &self,
        token: impl Into<String>,
        role: Role,
    ) -> Result<(), Error> {
        self.replace(Some(Credential {
            token: token.into(),
            role,
        }))
        .await
    }

    /// Logs out locally. The server is not told.
    pub async fn clear(&self) -> Result<(), Error> {
        self.replace(None).await
    }

    /// Persists first. The in-memory value only changes once the file holds
    /// it, so a failed write leaves the session as it was.
    async fn replace(&self, credential: Option<Credential>) -> Result<(), Error> {
        if let Some(path) = &self.path {
            let raw = toml::to_string(&Stored {
                credential: credential.clone(),
            })?;
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir).await?;
            }
            fs::write(path, raw).await?;
        }

        *self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner) = credential;
        Ok(())
    }
}

#[derive(Default, Deserialize, Serialize)]
struct Stored {
    credential: Option<Credential>,
}

#[derive(Debug, Display, From)]
pub enum Error {
    #[display("session file I/O failed: {_0}")]
    Io(std::io::Error),
    #[display("session file is malformed: {_0}")]
    Decode(toml::de::Error),
    #[display("session could not be encoded: {_0}")]
    Encode(toml::ser::Error),
}

impl std::error::Error for Error {}
