use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::warn;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "planner_session";
const PROTECTED_PREFIXES: [&str; 2] = ["/analytics", "/api/analytics"];

/// Password gate in front of the analytics routes.
///
/// A request passes with `Authorization: Bearer <password>` or with the
/// session cookie handed out by a successful login. With no password
/// configured nothing passes.
#[derive(Debug, Clone)]
pub struct AccessGate {
    password: Option<String>,
    session_token: String,
}

impl AccessGate {
    pub fn new(password: Option<String>) -> Self {
        Self {
            password,
            session_token: Uuid::new_v4().to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.password.is_some()
    }

    pub fn is_protected(path: &str) -> bool {
        PROTECTED_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
    }

    pub fn is_authorized(&self, headers: &HeaderMap) -> bool {
        let Some(password) = &self.password else {
            return false;
        };
        let bearer_ok = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .is_some_and(|given| given == password);
        bearer_ok || self.has_session_cookie(headers)
    }

    fn has_session_cookie(&self, headers: &HeaderMap) -> bool {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .any(|(name, value)| name == SESSION_COOKIE && value == self.session_token)
    }

    /// Returns the `Set-Cookie` value for a correct password.
    pub fn login(&self, attempt: &str) -> Option<String> {
        let password = self.password.as_deref()?;
        (attempt == password).then(|| {
            format!(
                "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Strict",
                self.session_token
            )
        })
    }
}

pub async fn require_access(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path();
    if AccessGate::is_protected(path) && !state.gate.is_authorized(request.headers()) {
        if !state.gate.is_configured() {
            warn!("PLANNER_PASSWORD is not set; refusing {path}");
        }
        return Redirect::to("/").into_response();
    }
    next.run(request).await
}
