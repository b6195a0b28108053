use std::sync::Arc;

use axum::{
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::{
    auth::{authenticate, require_role},
    error::AppError,
    model::{Identity, Role},
    AppState,
};

// Resolves the session and hands the caller's identity to the handler as an extension.
pub async fn mw_require_auth<B>(
    State(state): State<Arc<AppState>>,
    mut request: Request<B>,
    next: Next<B>,
) -> Result<Response, AppError> {
    let identity = authenticate(&state.sessions, request.headers())?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

// Same as `mw_require_auth`, but anonymous callers are told "Not logged in".
pub async fn mw_require_login<B>(
    State(state): State<Arc<AppState>>,
    mut request: Request<B>,
    next: Next<B>,
) -> Result<Response, AppError> {
    let identity = authenticate(&state.sessions, request.headers())
        .map_err(|_| AppError::Unauthorized("Not logged in".to_string()))?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

// Must run inside `mw_require_auth`.
pub async fn mw_require_admin<B>(request: Request<B>, next: Next<B>) -> Result<Response, AppError> {
    let identity = request
        .extensions()
        .get::<Identity>()
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?;
    require_role(identity, Role::Admin)?;
    Ok(next.run(request).await)
}
