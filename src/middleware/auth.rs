//! Per-route authentication.
//!
//! Each protected route is wrapped with exactly one [`AuthStrategy`] when the
//! router is built. The strategy either attaches an [`Identity`] to the
//! request extensions or rejects the request with 401.

use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::MethodRouter,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::auth::LoginRequest,
    error::AppError,
    services::auth_service::{
        Directory, decode_token, find_account_by_email, find_account_by_id, verify_password,
    },
    state::AppState,
};

const LOGIN_BODY_LIMIT: usize = 16 * 1024;
const TOKEN_COOKIE: &str = "access_token";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Employee,
    Customer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Customer => "customer",
        }
    }
}

/// Who the request was authenticated as.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
    EmployeeSession,
    CustomerSession,
    /// Email and password from the JSON body, checked against a directory.
    Local(Directory),
}

impl AuthStrategy {
    pub fn name(self) -> &'static str {
        match self {
            AuthStrategy::EmployeeSession => "employee-session",
            AuthStrategy::CustomerSession => "customer-session",
            AuthStrategy::Local(_) => "local",
        }
    }

    /// Authenticate `request`. The request is handed back because the local
    /// strategy has to buffer and restore the body.
    pub async fn verify(
        self,
        state: &AppState,
        request: Request,
    ) -> Result<(Identity, Request), AppError> {
        match self {
            AuthStrategy::EmployeeSession => {
                let identity = verify_session(state, request.headers(), Directory::Employees).await?;
                Ok((identity, request))
            }
            AuthStrategy::CustomerSession => {
                let identity = verify_session(state, request.headers(), Directory::Customers).await?;
                Ok((identity, request))
            }
            AuthStrategy::Local(directory) => verify_local(state, request, directory).await,
        }
    }
}

async fn verify_session(
    state: &AppState,
    headers: &HeaderMap,
    directory: Directory,
) -> Result<Identity, AppError> {
    let token = bearer_token(headers)
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".into()))?;
    let claims = decode_token(&state.config, &token)?;

    if claims.role != directory.role() {
        return Err(AppError::Unauthorized(format!(
            "A {} session is required",
            directory.role().as_str()
        )));
    }

    let id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid subject in token".into()))?;

    let account = find_account_by_id(&*state.conn(), directory, id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unknown account".into()))?;

    Ok(Identity {
        id: account.id,
        email: account.email,
        role: directory.role(),
    })
}

async fn verify_local(
    state: &AppState,
    request: Request,
    directory: Directory,
) -> Result<(Identity, Request), AppError> {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, LOGIN_BODY_LIMIT)
        .await
        .map_err(|_| AppError::BadRequest("Unreadable request body".into()))?;

    let credentials: LoginRequest = serde_json::from_slice(&bytes)
        .map_err(|_| AppError::Unauthorized("Missing credentials".into()))?;

    let invalid = || AppError::Unauthorized("Invalid email or password".into());
    let account = find_account_by_email(&*state.conn(), directory, &credentials.email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&credentials.password, &account.password_hash) {
        return Err(invalid());
    }

    let identity = Identity {
        id: account.id,
        email: account.email,
        role: directory.role(),
    };
    Ok((identity, Request::from_parts(parts, Body::from(bytes))))
}

/// `Authorization: Bearer <token>`, falling back to the `access_token` cookie.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .or_else(|| {
            headers
                .get(header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies.split(';').find_map(|cookie| {
                        let (name, value) = cookie.trim().split_once('=')?;
                        (name == TOKEN_COOKIE && !value.is_empty()).then(|| value.to_string())
                    })
                })
        })
}

#[derive(Clone)]
pub struct AuthGuard {
    state: AppState,
    strategy: AuthStrategy,
}

async fn authenticate(State(guard): State<AuthGuard>, request: Request, next: Next) -> Response {
    let strategy = guard.strategy;
    match strategy.verify(&guard.state, request).await {
        Ok((identity, mut request)) => {
            tracing::debug!(
                strategy = strategy.name(),
                account_id = %identity.id,
                "authenticated"
            );
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(err) => {
            tracing::debug!(strategy = strategy.name(), error = %err, "authentication failed");
            err.into_response()
        }
    }
}

/// Wrap every handler of `route` with `strategy`.
pub fn protect(
    state: &AppState,
    strategy: AuthStrategy,
    route: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    let guard = AuthGuard {
        state: state.clone(),
        strategy,
    };
    route.route_layer(middleware::from_fn_with_state(guard, authenticate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def"));
    }

    #[test]
    fn falls_back_to_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; access_token=xyz"),
        );
        assert_eq!(bearer_token(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn rejects_other_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert_eq!(bearer_token(&headers), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn strategy_names() {
        assert_eq!(AuthStrategy::EmployeeSession.name(), "employee-session");
        assert_eq!(AuthStrategy::CustomerSession.name(), "customer-session");
        assert_eq!(AuthStrategy::Local(Directory::Customers).name(), "local");
    }
}
