use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::{request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Form, Json, RequestPartsExt as _, Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use campus_fix::{
    api::{
        self,
        ticket::{Code, ListQuery, NewTicket, ServiceType, Status, Timestamp},
        user::{NewUser, Role},
        Ticket,
    },
    client::{AuthError, CreateTicketError, FetchError, RegisterError, Service},
    config,
    session::Credential,
    Client, Session,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net, task::JoinHandle};

const SECRET: &[u8] = b"campus-fix-test-secret";

/// In-process stand-in for the CampusFix HTTP service.
pub struct Server {
    pub base_url: String,
    state: SharedAppState,
    task: JoinHandle<()>,
}

impl Drop for Server {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl Server {
    pub async fn spawn() -> Self {
        let state = Arc::new(AppState::seeded());
        let app = Router::new()
            .route("/login", post(login))
            .route("/register", post(register))
            .route("/issues/all", get(list_all))
            .route("/issues/my", get(list_my))
            .route("/issues/raise", post(raise))
            .route("/issues/mark-complete/:ticket_id", put(mark_complete))
            .route("/issues/:ticket_id", get(get_issue))
            .with_state(Arc::clone(&state));

        let listener = net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind");
        let addr = listener.local_addr().expect("no local address");
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server failed");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            task,
        }
    }

    /// Client with an empty in-memory session.
    pub fn client(&self) -> Client {
        self.client_with(Session::new())
    }

    pub fn client_with(&self, session: Session) -> Client {
        let config = config::Http {
            base_url: self.base_url.clone(),
            ..config::Http::default()
        };
        Client::new(&config, session).expect("failed to build client")
    }

    pub async fn logged_in(&self, college_id: &str) -> Client {
        let client = self.client();
        client
            .login(college_id, "correct")
            .await
            .expect("failed to log in");
        client
    }

    /// Makes every status update answer with 503 until reset.
    pub fn fail_status_updates(&self, fail: bool) {
        self.state.fail_status_updates.store(fail, Ordering::SeqCst);
    }

    pub fn status_of(&self, code: &Code) -> Option<Status> {
        self.state
            .issues
            .lock()
            .unwrap()
            .iter()
            .find(|t| &t.code == code)
            .and_then(|t| t.status.known())
    }
}

type SharedAppState = Arc<AppState>;

struct AppState {
    users: Mutex<Vec<UserRecord>>,
    issues: Mutex<Vec<Ticket>>,
    fail_status_updates: AtomicBool,
}

#[derive(Clone)]
struct UserRecord {
    user: api::User,
    password: String,
}

impl AppState {
    fn seeded() -> Self {
        let user = |id: &str, name: &str, college_id: &str, role| UserRecord {
            user: api::User {
                id: id.to_string(),
                name: name.to_string(),
                email: format!("{}@campus.test", name.to_lowercase()),
                college_id: college_id.to_string(),
                user_type: role,
            },
            password: "correct".to_string(),
        };
        Self {
            users: Mutex::new(vec![
                user("u1", "Alice", "S123", Role::Student),
                user("u2", "Bob", "S456", Role::Student),
                user("u3", "Carol", "M001", Role::Management),
            ]),
            issues: Mutex::new(Vec::new()),
            fail_status_updates: AtomicBool::new(false),
        }
    }

    fn user(&self, college_id: &str) -> Option<UserRecord> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.user.college_id == college_id)
            .cloned()
    }
}

#[derive(Debug)]
struct ApiError(StatusCode, &'static str);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "detail": self.1 }))).into_response()
    }
}

const NOT_AUTHORIZED: ApiError = ApiError(StatusCode::FORBIDDEN, "Not authorized");

#[derive(Deserialize, Serialize)]
struct AuthClaims {
    sub: String,
    exp: i64,
}

struct Caller(api::User);

#[async_trait]
impl FromRequestParts<SharedAppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut request::Parts,
        state: &SharedAppState,
    ) -> Result<Self, Self::Rejection> {
        const INVALID: ApiError = ApiError(
            StatusCode::UNAUTHORIZED,
            "Invalid authentication credentials",
        );

        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| INVALID)?;
        let claims = decode::<AuthClaims>(
            bearer.token(),
            &DecodingKey::from_secret(SECRET),
            &Validation::default(),
        )
        .map_err(|_| INVALID)?
        .claims;

        state.user(&claims.sub).map(|u| Caller(u.user)).ok_or(INVALID)
    }
}

#[derive(Deserialize)]
struct LoginInput {
    college_id: String,
    password: String,
}

async fn login(
    State(state): State<SharedAppState>,
    Form(LoginInput {
        college_id,
        password,
    }): Form<LoginInput>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = state
        .user(&college_id)
        .filter(|u| u.password == password)
        .ok_or(ApiError(
            StatusCode::UNAUTHORIZED,
            "Incorrect college ID or password",
        ))?;

    let exp = time::OffsetDateTime::now_utc().unix_timestamp() + 3600;
    let token = encode(
        &Header::default(),
        &AuthClaims { sub: college_id, exp },
        &EncodingKey::from_secret(SECRET),
    )
    .map_err(|_| ApiError(StatusCode::INTERNAL_SERVER_ERROR, "token"))?;

    Ok(Json(json!({
        "access_token": token,
        "token_type": "bearer",
        "user_type": user.user.user_type,
    })))
}

#[derive(Deserialize)]
struct RegisterInput {
    name: String,
    email: String,
    college_id: String,
    user_type: Role,
    password: String,
}

async fn register(
    State(state): State<SharedAppState>,
    Form(input): Form<RegisterInput>,
) -> Result<Json<api::User>, ApiError> {
    let mut users = state.users.lock().unwrap();
    if users.iter().any(|u| u.user.college_id == input.college_id) {
        return Err(ApiError(
            StatusCode::BAD_REQUEST,
            "College ID already registered",
        ));
    }
    if users.iter().any(|u| u.user.email == input.email) {
        return Err(ApiError(StatusCode::BAD_REQUEST, "Email already registered"));
    }

    let user = api::User {
        id: format!("u{}", users.len() + 1),
        name: input.name,
        email: input.email,
        college_id: input.college_id,
        user_type: input.user_type,
    };
    users.push(UserRecord {
        user: user.clone(),
        password: input.password,
    });
    Ok(Json(user))
}

#[derive(Deserialize)]
struct AllInput {
    status: Option<Status>,
    service_type: Option<ServiceType>,
    location: Option<String>,
}

async fn list_all(
    State(state): State<SharedAppState>,
    Caller(me): Caller,
    Query(AllInput {
        status,
        service_type,
        location,
    }): Query<AllInput>,
) -> Result<Json<Vec<Ticket>>, ApiError> {
    if me.user_type != Role::Management {
        return Err(NOT_AUTHORIZED);
    }
    let issues = state.issues.lock().unwrap();
    Ok(Json(
        issues
            .iter()
            .filter(|t| status.map_or(true, |s| t.status == s))
            .filter(|t| service_type.map_or(true, |s| t.service_type.known() == Some(s)))
            .filter(|t| location.as_ref().map_or(true, |l| &t.location == l))
            .cloned()
            .collect(),
    ))
}

#[derive(Deserialize)]
struct MyInput {
    status: Option<Status>,
}

async fn list_my(
    State(state): State<SharedAppState>,
    Caller(me): Caller,
    Query(MyInput { status }): Query<MyInput>,
) -> Result<Json<Vec<Ticket>>, ApiError> {
    if me.user_type != Role::Student {
        return Err(NOT_AUTHORIZED);
    }
    let issues = state.issues.lock().unwrap();
    Ok(Json(
        issues
            .iter()
            .filter(|t| t.student_id == me.id)
            .filter(|t| status.map_or(true, |s| t.status == s))
            .cloned()
            .collect(),
    ))
}

#[derive(Deserialize)]
struct RaiseInput {
    service_type: ServiceType,
    description: String,
    location: String,
    image_url: Option<String>,
}

async fn raise(
    State(state): State<SharedAppState>,
    Caller(me): Caller,
    Json(input): Json<RaiseInput>,
) -> Result<Json<Ticket>, ApiError> {
    if me.user_type != Role::Student {
        return Err(NOT_AUTHORIZED);
    }
    let hex = uuid::Uuid::new_v4().simple().to_string();
    let mut issues = state.issues.lock().unwrap();
    let ticket = Ticket {
        id: format!("i{}", issues.len() + 1),
        code: Code::from(format!("TKT-{}", hex[..8].to_uppercase())),
        service_type: input.service_type.into(),
        description: input.description,
        location: input.location,
        status: Status::Pending.into(),
        timestamp: Timestamp::now().into(),
        student_id: me.id,
        student_name: me.name,
        image_url: input.image_url,
    };
    issues.push(ticket.clone());
    Ok(Json(ticket))
}

#[derive(Deserialize)]
struct StatusInput {
    status: Status,
}

async fn mark_complete(
    State(state): State<SharedAppState>,
    Caller(me): Caller,
    Path(ticket_id): Path<String>,
    Json(StatusInput { status }): Json<StatusInput>,
) -> Result<Json<Ticket>, ApiError> {
    if me.user_type != Role::Management {
        return Err(NOT_AUTHORIZED);
    }
    if state.fail_status_updates.load(Ordering::SeqCst) {
        return Err(ApiError(StatusCode::SERVICE_UNAVAILABLE, "Try again later"));
    }
    let mut issues = state.issues.lock().unwrap();
    let ticket = issues
        .iter_mut()
        .find(|t| t.code.as_str() == ticket_id)
        .ok_or(ApiError(StatusCode::NOT_FOUND, "Issue not found"))?;
    ticket.status = status.into();
    Ok(Json(ticket.clone()))
}

async fn get_issue(
    State(state): State<SharedAppState>,
    Caller(me): Caller,
    Path(ticket_id): Path<String>,
) -> Result<Json<Ticket>, ApiError> {
    let issues = state.issues.lock().unwrap();
    let ticket = issues
        .iter()
        .find(|t| t.code.as_str() == ticket_id)
        .ok_or(ApiError(StatusCode::NOT_FOUND, "Issue not found"))?;
    if me.user_type == Role::Student && ticket.student_id != me.id {
        return Err(ApiError(
            StatusCode::FORBIDDEN,
            "Not authorized to view this issue",
        ));
    }
    Ok(Json(ticket.clone()))
}

/// Builds a ticket record for in-process tests.
pub fn ticket(code: &str, service: ServiceType, status: Status) -> Ticket {
    Ticket {
        id: code.to_lowercase(),
        code: Code::from(code),
        service_type: service.into(),
        description: format!("{service} problem"),
        location: "Hostel A".to_string(),
        status: status.into(),
        timestamp: Timestamp::parse("2024-03-07T09:30:00")
            .expect("valid timestamp")
            .into(),
        student_id: "u1".to_string(),
        student_name: "Alice".to_string(),
        image_url: None,
    }
}

/// Scriptable [`Service`] that counts calls instead of talking HTTP.
#[derive(Default)]
pub struct FakeService {
    pub tickets: Mutex<Vec<Ticket>>,
    pub list_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub fail_lists: AtomicBool,
    pub fail_updates: AtomicBool,
    /// Answers `list_my_tickets` with everything, like a server that drops
    /// the `status` parameter.
    pub ignore_status_filter: AtomicBool,
}

impl FakeService {
    pub fn with_tickets(tickets: Vec<Ticket>) -> Arc<Self> {
        Arc::new(Self {
            tickets: Mutex::new(tickets),
            ..Self::default()
        })
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn unavailable() -> FetchError {
        FetchError::Status {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            detail: None,
        }
    }
}

#[async_trait]
impl Service for FakeService {
    async fn login(
        &self,
        college_id: &str,
        password: &str,
    ) -> Result<Credential, AuthError> {
        let role = match (college_id, password) {
            ("S123", "correct") => Role::Student,
            ("M001", "correct") => Role::Management,
            _ => return Err(AuthError::Rejected { detail: None }),
        };
        Ok(Credential {
            token: format!("token-{college_id}"),
            role,
        })
    }

    async fn register(&self, user: &NewUser) -> Result<api::User, RegisterError> {
        user.validate()?;
        Ok(api::User {
            id: "u9".to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            college_id: user.college_id.clone(),
            user_type: user.user_type,
        })
    }

    async fn list_all_tickets(
        &self,
        _query: &ListQuery,
    ) -> Result<Vec<Ticket>, FetchError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        Ok(self.tickets.lock().unwrap().clone())
    }

    async fn list_my_tickets(
        &self,
        status: Option<Status>,
    ) -> Result<Vec<Ticket>, FetchError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        let status = status.filter(|_| !self.ignore_status_filter.load(Ordering::SeqCst));
        Ok(self
            .tickets
            .lock()
            .unwrap()
            .iter()
            .filter(|t| status.map_or(true, |s| t.status == s))
            .cloned()
            .collect())
    }

    async fn create_ticket(
        &self,
        new: &NewTicket,
    ) -> Result<Ticket, CreateTicketError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        new.validate()?;
        let mut tickets = self.tickets.lock().unwrap();
        let mut created = ticket(
            &format!("TKT-{:08}", tickets.len() + 1),
            new.service_type,
            Status::Pending,
        );
        created.description = new.description.clone();
        created.location = new.location.clone();
        tickets.push(created.clone());
        Ok(created)
    }

    async fn update_status(
        &self,
        code: &Code,
        status: Status,
    ) -> Result<Ticket, FetchError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        let mut tickets = self.tickets.lock().unwrap();
        let ticket = tickets
            .iter_mut()
            .find(|t| &t.code == code)
            .ok_or(FetchError::Status {
                status: reqwest::StatusCode::NOT_FOUND,
                detail: Some("Issue not found".to_string()),
            })?;
        ticket.status = status.into();
        Ok(ticket.clone())
    }

    async fn get_ticket(&self, code: &Code) -> Result<Ticket, FetchError> {
        self.tickets
            .lock()
            .unwrap()
            .iter()
            .find(|t| &t.code == code)
            .cloned()
            .ok_or(FetchError::Status {
                status: reqwest::StatusCode::NOT_FOUND,
                detail: None,
            })
    }
}
