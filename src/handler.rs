use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;
use tracing::{debug, info};

use crate::{
    auth::authenticate,
    error::AppError,
    model::{Identity, UserSummary},
    schema::{
        AppJson, AppPath, AppQuery, CreateTodoSchema, CreateUserSchema, LoginSchema, TodoFilter,
        UpdatePasswordSchema, UpdateUserSchema,
    },
    AppState,
};

// Admin routes report a bad id as "Invalid user ID".
fn user_id(path: Result<AppPath<u32>, AppError>) -> Result<u32, AppError> {
    path.map(|AppPath(id)| id)
        .map_err(|_| AppError::Validation("Invalid user ID".to_string()))
}

pub async fn login(
    State(data): State<Arc<AppState>>,
    AppJson(body): AppJson<LoginSchema>,
) -> Result<impl IntoResponse, AppError> {
    let identity = data.store.login(&body.username, &body.password)?;
    let token = data.sessions.create(&identity)?;

    let user = json!({
        "id": identity.user_id,
        "username": identity.username,
        "role": identity.role,
    });
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, data.sessions.cookie(&token))],
        Json(json!({ "message": "Login successful", "user": user })),
    ))
}

// Always succeeds, whatever state the caller's session was in.
pub async fn logout(State(data): State<Arc<AppState>>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(identity) = data.sessions.read_headers(&headers) {
        info!(username = %identity.username, "logout");
    }
    (
        StatusCode::OK,
        [(header::SET_COOKIE, data.sessions.invalidate())],
        Json(json!({ "message": "Logout successful" })),
    )
}

pub async fn me(
    State(data): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let identity = authenticate(&data.sessions, &headers)
        .map_err(|_| AppError::Unauthorized("Not logged in".to_string()))?;
    Ok(Json(json!({
        "id": identity.user_id,
        "username": identity.username,
        "role": identity.role,
    })))
}

// Runs behind `mw_require_login`, so the session is checked before the body is read.
pub async fn update_password(
    State(data): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    AppJson(body): AppJson<UpdatePasswordSchema>,
) -> Result<impl IntoResponse, AppError> {
    data.store
        .change_own_password(identity.user_id, &body.current_password, &body.new_password)
        .map_err(AppError::into_bad_request)?;
    Ok(Json(json!({ "message": "Password updated successfully" })))
}

pub async fn list_users(State(data): State<Arc<AppState>>) -> Json<Vec<UserSummary>> {
    Json(data.store.list_users())
}

pub async fn create_user(
    State(data): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    AppJson(body): AppJson<CreateUserSchema>,
) -> Result<impl IntoResponse, AppError> {
    let user = data.store.create_user(&body.username, &body.password)?;
    debug!(by = %identity.username, id = user.id, "admin created user");
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(data): State<Arc<AppState>>,
    path: Result<AppPath<u32>, AppError>,
    AppJson(body): AppJson<UpdateUserSchema>,
) -> Result<impl IntoResponse, AppError> {
    let id = user_id(path)?;
    // a clashing username is a 400 here, not a 409
    data.store
        .update_user(id, &body.username, &body.role, body.password.as_deref())
        .map_err(AppError::into_bad_request)?;
    Ok(Json(json!({ "message": "User updated successfully" })))
}

pub async fn delete_user(
    State(data): State<Arc<AppState>>,
    path: Result<AppPath<u32>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let id = user_id(path)?;
    data.store.delete_user(id)?;
    Ok(Json(json!({ "message": "User deleted successfully" })))
}

// Handler for getting all Todo items, optionally only one user's
pub async fn get_todos(
    State(data): State<Arc<AppState>>,
    AppQuery(filter): AppQuery<TodoFilter>,
) -> impl IntoResponse {
    let owner = filter.user.as_deref().filter(|u| !u.is_empty());
    Json(data.store.list_todos(owner))
}

// Handler for creating a new Todo. An explicit `user` may name someone other than the caller.
pub async fn create_todo(
    State(data): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    AppJson(body): AppJson<CreateTodoSchema>,
) -> Result<impl IntoResponse, AppError> {
    let owner = body
        .user
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| identity.username.clone());
    let todo = data.store.add_todo(&body.text, &owner);
    debug!(by = %identity.username, id = todo.id, owner = %todo.user, "todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn complete_todo(
    State(data): State<Arc<AppState>>,
    AppPath(id): AppPath<u32>,
) -> Result<impl IntoResponse, AppError> {
    data.store.complete_todo(id)?;
    Ok(Json(json!({ "message": "Todo completed successfully" })))
}

// Handler for deleting a Todo by ID
pub async fn delete_todo(
    State(data): State<Arc<AppState>>,
    AppPath(id): AppPath<u32>,
) -> Result<impl IntoResponse, AppError> {
    data.store.delete_todo(id)?;
    Ok(StatusCode::NO_CONTENT)
}
