//! Session middleware resolving the session cookie to a user

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use crate::{error::ApiError, state::AppState};

/// Resolve the session cookie and attach the [`crate::models::User`] to the
/// request extensions. Requests without a valid session stop here.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let jar = CookieJar::from_headers(req.headers());
    let token = jar
        .get(&state.session_config.cookie_name)
        .map(|cookie| cookie.value().to_string());

    let user = state
        .session_manager
        .resolve(token.as_deref())
        .await
        .inspect_err(|e| {
            if matches!(e, ApiError::Unauthenticated) {
                warn!("Rejected request to {} without a valid session", req.uri().path());
            }
        })?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
