use tracing::info;

use crate::{
    api::{self, user::NewUser},
    session::Credential,
};

use super::{send, AuthError, Client, FetchError, RegisterError, LOGIN, REGISTER};

impl Client {
    /// Exchanges a college ID and password for a bearer token and stores
    /// it in the session.
    pub async fn login(
        &self,
        college_id: &str,
        password: &str,
    ) -> Result<Credential, AuthError> {
        let req = self
            .http
            .post(self.url(LOGIN))
            .form(&[("college_id", college_id), ("password", password)]);
        let token = send::<api::user::Token>(req).await.map_err(|e| match e {
            FetchError::Status { status, detail } if status.is_client_error() => {
                AuthError::Rejected { detail }
            }
            e => AuthError::Fetch(e),
        })?;

        self.session
            .set_credential(token.access_token.clone(), token.user_type)
            .await?;
        info!(college_id, role = %token.user_type, "logged in");

        Ok(Credential {
            token: token.access_token,
            role: token.user_type,
        })
    }

    pub async fn register(&self, user: &NewUser) -> Result<api::User, RegisterError> {
        user.validate()?;

        let req = self.http.post(self.url(REGISTER)).form(user);
        let created = send::<api::User>(req).await?;
        info!(college_id = %created.college_id, "registered");

        Ok(created)
    }
}
