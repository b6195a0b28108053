use axum::http::HeaderMap;

use crate::{
    error::AppError,
    model::{Identity, Role},
    session::SessionStore,
};

/// Resolves the caller from the request's session cookie.
pub fn authenticate(sessions: &SessionStore, headers: &HeaderMap) -> Result<Identity, AppError> {
    sessions
        .read_headers(headers)
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))
}

pub fn require_role(identity: &Identity, role: Role) -> Result<(), AppError> {
    if identity.role == role {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Forbidden - {} access required",
            capitalize(role.as_str())
        )))
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{header, HeaderValue};

    use super::*;

    fn identity(role: Role) -> Identity {
        Identity {
            user_id: 1,
            username: "admin".to_string(),
            role,
        }
    }

    #[test]
    fn authenticate_without_cookie_is_unauthorized() {
        let sessions = SessionStore::new(b"secret");
        assert!(matches!(
            authenticate(&sessions, &HeaderMap::new()),
            Err(AppError::Unauthorized(_))
        ));

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("todo-session=bogus"));
        assert!(matches!(
            authenticate(&sessions, &headers),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn authenticate_returns_session_identity() {
        let sessions = SessionStore::new(b"secret");
        let token = sessions.create(&identity(Role::Admin)).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("todo-session={token}")).unwrap(),
        );
        assert_eq!(authenticate(&sessions, &headers), Ok(identity(Role::Admin)));
    }

    #[test]
    fn admin_role_gate() {
        assert!(require_role(&identity(Role::Admin), Role::Admin).is_ok());
        assert_eq!(
            require_role(&identity(Role::User), Role::Admin),
            Err(AppError::Forbidden(
                "Forbidden - Admin access required".to_string()
            ))
        );
    }
}
