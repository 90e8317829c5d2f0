use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use sandgraph_core::{AppError, AppResult, Authorizations, Requester, UserIdentity, WorkspaceId};

use crate::error::ApiResult;
use crate::state::AppState;

pub const GATEWAY_SECRET_HEADER: &str = "x-gateway-secret";
pub const AUTH_SUBJECT_HEADER: &str = "x-auth-subject";
pub const AUTH_DISPLAY_NAME_HEADER: &str = "x-auth-display-name";
pub const AUTH_WORKSPACES_HEADER: &str = "x-auth-workspaces";

/// Resolves the requester forwarded by the authenticating gateway.
pub async fn require_gateway_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let requester = requester_from_headers(request.headers(), &state.gateway_shared_secret)?;

    request.extensions_mut().insert(requester);
    Ok(next.run(request).await)
}

pub fn requester_from_headers(headers: &HeaderMap, shared_secret: &str) -> AppResult<Requester> {
    let presented_secret = header_value(headers, GATEWAY_SECRET_HEADER).unwrap_or_default();
    if !secrets_match(presented_secret, shared_secret) {
        return Err(AppError::Unauthorized(
            "gateway authentication required".to_owned(),
        ));
    }

    let subject = header_value(headers, AUTH_SUBJECT_HEADER)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;
    let display_name = header_value(headers, AUTH_DISPLAY_NAME_HEADER)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(subject);

    let workspaces = header_value(headers, AUTH_WORKSPACES_HEADER)
        .unwrap_or_default()
        .split(',')
        .filter_map(|workspace| WorkspaceId::from_ambient(Some(workspace)));

    Ok(Requester::new(
        UserIdentity::new(subject, display_name),
        Authorizations::new(workspaces),
    ))
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn secrets_match(presented: &str, expected: &str) -> bool {
    if expected.is_empty() || presented.len() != expected.len() {
        return false;
    }

    presented
        .bytes()
        .zip(expected.bytes())
        .fold(0_u8, |difference, (left, right)| difference | (left ^ right))
        == 0
}
