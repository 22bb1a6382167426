//! HTTP client of the CampusFix service.

mod error;
mod ticket;
mod user;

use async_trait::async_trait;
use constcat::concat;
use reqwest::{RequestBuilder, Url};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;

use crate::{
    api::{
        self,
        ticket::{Code, ListQuery, NewTicket, Status},
        user::NewUser,
    },
    config,
    session::{Credential, Session},
};

pub use self::error::{
    AuthError, BuildError, CreateTicketError, FetchError, RegisterError,
};

const LOGIN: &str = "/login";
const REGISTER: &str = "/register";
const ISSUES: &str = "/issues";
const ISSUES_ALL: &str = concat!(ISSUES, "/all");
const ISSUES_MY: &str = concat!(ISSUES, "/my");
const ISSUES_RAISE: &str = concat!(ISSUES, "/raise");
const ISSUES_MARK_COMPLETE: &str = concat!(ISSUES, "/mark-complete");

/// Operations the views need from the ticketing service.
#[async_trait]
pub trait Service: Send + Sync {
    async fn login(
        &self,
        college_id: &str,
        password: &str,
    ) -> Result<Credential, AuthError>;

    async fn register(&self, user: &NewUser) -> Result<api::User, RegisterError>;

    async fn list_all_tickets(
        &self,
        query: &ListQuery,
    ) -> Result<Vec<api::Ticket>, FetchError>;

    async fn list_my_tickets(
        &self,
        status: Option<Status>,
    ) -> Result<Vec<api::Ticket>, FetchError>;

    async fn create_ticket(
        &self,
        ticket: &NewTicket,
    ) -> Result<api::Ticket, CreateTicketError>;

    async fn update_status(
        &self,
        code: &Code,
        status: Status,
    ) -> Result<api::Ticket, FetchError>;

    async fn get_ticket(&self, code: &Code) -> Result<api::Ticket, FetchError>;
}

pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    session: Session,
}

impl Client {
    pub fn new(config: &config::Http, session: Session) -> Result<Self, BuildError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        let base_url = Url::parse(&config.base_url)?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let base_path = self.base_url.path().trim_end_matches('/');
        url.set_path(&format!("{base_path}{path}"));
        url
    }

    /// `path` followed by one percent-encoded `segment`.
    fn url_with(&self, path: &str, segment: &str) -> Url {
        let mut url = self.url(path);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(segment);
        }
        url
    }

    /// Attaches the stored bearer token, read fresh for every request.
    fn authorized(&self, req: RequestBuilder) -> Result<RequestBuilder, FetchError> {
        let token = self.session.token().ok_or(FetchError::NoCredential)?;
        Ok(req.bearer_auth(token))
    }
}

#[async_trait]
impl Service for Client {
    async fn login(
        &self,
        college_id: &str,
        password: &str,
    ) -> Result<Credential, AuthError> {
        Client::login(self, college_id, password).await
    }

    async fn register(&self, user: &NewUser) -> Result<api::User, RegisterError> {
        Client::register(self, user).await
    }

    async fn list_all_tickets(
        &self,
        query: &ListQuery,
    ) -> Result<Vec<api::Ticket>, FetchError> {
        Client::list_all_tickets(self, query).await
    }

    async fn list_my_tickets(
        &self,
        status: Option<Status>,
    ) -> Result<Vec<api::Ticket>, FetchError> {
        Client::list_my_tickets(self, status).await
    }

    async fn create_ticket(
        &self,
        ticket: &NewTicket,
    ) -> Result<api::Ticket, CreateTicketError> {
        Client::create_ticket(self, ticket).await
    }

    async fn update_status(
        &self,
        code: &Code,
        status: Status,
    ) -> Result<api::Ticket, FetchError> {
        Client::update_status(self, code, status).await
    }

    async fn get_ticket(&self, code: &Code) -> Result<api::Ticket, FetchError> {
        Client::get_ticket(self, code).await
    }
}

/// Error body of the service.
#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

async fn send<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, FetchError> {
    let res = req.send().await?;
    let status = res.status();
    debug!(url = %res.url(), %status, "response received");

    if !status.is_success() {
        let detail = res.json::<ErrorBody>().await.ok().map(|b| b.detail);
        return Err(FetchError::Status { status, detail });
    }
    Ok(res.json::<T>().await?)
}
