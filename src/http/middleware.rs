use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::server::AppState;

/// Reject clients whose IP is not on the configured allowlist. An empty
/// allowlist disables the check entirely.
pub async fn ip_whitelist(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if state.whitelist.is_empty() {
        return next.run(request).await;
    }

    let allowed = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| state.whitelist.contains(&info.0.ip()))
        .unwrap_or(false);

    if allowed {
        next.run(request).await
    } else {
        (StatusCode::FORBIDDEN, "Permission denied!").into_response()
    }
}
