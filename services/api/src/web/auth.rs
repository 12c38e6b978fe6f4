//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user signup, login, and logout.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use eventify_core::{LoginForm, SignupForm};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpError};
use crate::web::{cookie::session_id_from_headers, state::AppState};

//=========================================================================================
// Request/Response Types
//=========================================================================================

/// Forms post `age` as a string, API clients as a number; both are accepted.
#[derive(Deserialize, ToSchema, Debug, Clone)]
#[serde(untagged)]
pub enum AgeInput {
    Number(i64),
    Text(String),
}

impl AgeInput {
    fn into_text(self) -> String {
        match self {
            AgeInput::Number(n) => n.to_string(),
            AgeInput::Text(s) => s,
        }
    }
}

/// All fields are required; absence is reported as a 400 rather than a parse failure.
#[derive(Deserialize, ToSchema, Default)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub age: Option<AgeInput>,
    pub gender: Option<String>,
    pub state: Option<String>,
}

impl From<SignupRequest> for SignupForm {
    fn from(req: SignupRequest) -> Self {
        SignupForm {
            email: req.email,
            password: req.password,
            firstname: req.firstname,
            lastname: req.lastname,
            age: req.age.map(AgeInput::into_text),
            gender: req.gender,
            state: req.state,
        }
    }
}

#[derive(Deserialize, ToSchema, Default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl From<LoginRequest> for LoginForm {
    fn from(req: LoginRequest) -> Self {
        LoginForm {
            email: req.email,
            password: req.password,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

/// A body the JSON extractor refuses (wrong content type, bad syntax, wrong
/// field types) is treated as an empty form, so it fails validation with 400.
fn body_or_empty<T: Default>(payload: Result<Json<T>, JsonRejection>) -> T {
    match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            debug!(status = %rejection.status(), "Unusable request body: {}", rejection.body_text());
            T::default()
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /signup - Create a new user account
#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = MessageResponse),
        (status = 400, description = "A required field is missing or the body is not usable JSON", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let req = body_or_empty(payload);
    state.credentials.signup(req.into()).await?;

    Ok((
        StatusCode::CREATED,
        MessageResponse::new("User registered successfully"),
    ))
}

/// POST /login - Login with existing account
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookie set", body = MessageResponse),
        (status = 400, description = "Email or password missing, or the body is not usable JSON", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let req = body_or_empty(payload);
    // 1. Verify credentials
    let snapshot = state.credentials.login(req.into()).await?;

    // 2. Drop any session the browser was still holding
    if let Some(previous) = session_id_from_headers(&headers) {
        if let Err(e) = state.sessions.destroy(Some(previous)).await {
            warn!("Failed to drop previous session on login: {}", e);
        }
    }

    // 3. Create the new session and hand its id to the browser
    let session = state.sessions.establish(snapshot).await?;
    let cookie = state.cookies.session_cookie(&session.id);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        MessageResponse::new("Login successful"),
    ))
}

/// POST /logout - Logout and invalidate session
#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Logout successful, cookie cleared", body = MessageResponse),
        (status = 500, description = "Session store failure", body = ErrorResponse)
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HttpError> {
    state
        .sessions
        .destroy(session_id_from_headers(&headers))
        .await?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, state.cookies.clear_cookie())],
        MessageResponse::new("Logout successful"),
    ))
}
