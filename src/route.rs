use std::{any::Any, sync::Arc};

use axum::{
    handler::Handler,
    http::{header::CONTENT_TYPE, Method},
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer, cors::CorsLayer, services::ServeFile, trace::TraceLayer,
};
use tracing::error;

use crate::{
    config::Config,
    error::AppError,
    handler::*,
    middleware::{mw_require_admin, mw_require_auth, mw_require_login},
    AppState,
};

pub fn create_router(app_state: Arc<AppState>, config: &Config) -> Router {
    let admin = from_fn(mw_require_admin);

    // every authenticated user may list accounts; only admins change them
    let protected = Router::new()
        .route(
            "/admin/users",
            get(list_users).post(create_user.layer(admin.clone())),
        )
        .route(
            "/admin/users/:id",
            put(update_user).delete(delete_user).route_layer(admin),
        )
        .route("/todos", get(get_todos).post(create_todo))
        .route("/todos/:id", delete(delete_todo))
        .route("/todos/:id/complete", put(complete_todo))
        .route_layer(from_fn_with_state(app_state.clone(), mw_require_auth));

    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.clone())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_credentials(true)
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route(
            "/update-password",
            post(update_password)
                .route_layer(from_fn_with_state(app_state.clone(), mw_require_login)),
        )
        .merge(protected)
        .route_service("/", ServeFile::new(&config.index_file))
        .with_state(app_state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

// A panicking handler becomes a 500; the server keeps running.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!(panic = %detail, "handler panic recovered");
    AppError::Internal("Internal server error".to_string()).into_response()
}
