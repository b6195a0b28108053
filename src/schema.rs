use axum::extract::{FromRequest, FromRequestParts};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

// JSON body extractor whose rejections use the `{"error": ...}` shape
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

// Path extractor whose rejections use the `{"error": ...}` shape
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

// Query-string extractor whose rejections use the `{"error": ...}` shape
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

// Absent fields decode as empty strings and fail validation downstream.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginSchema {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdatePasswordSchema {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateUserSchema {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateUserSchema {
    pub username: String,
    pub password: Option<String>,
    pub role: String,
}

// Request body for creating a new Todo. Client-sent id/completed/created_at are ignored.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateTodoSchema {
    pub text: String,
    pub user: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TodoFilter {
    pub user: Option<String>,
}
