//! User accounts.
//!
//! Usernames are unique, 1-15 ASCII letters or digits. At least one admin exists at
//! all times. Passwords are stored and compared as plain text.

use tracing::{info, warn};

use crate::{
    error::AppError,
    model::{Identity, Role, User, UserSummary},
};

pub const MAX_USERNAME_LEN: usize = 15;

#[derive(Debug)]
pub struct UserDirectory {
    users: Vec<User>,
    next_id: u32,
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            next_id: 1,
        }
    }
}

pub fn validate_username(username: &str) -> Result<(), AppError> {
    if username.is_empty() {
        return Err(AppError::Validation("Username is required".to_string()));
    }
    // bytes, not characters
    if username.len() > MAX_USERNAME_LEN {
        return Err(AppError::Validation(format!(
            "Username must be {MAX_USERNAME_LEN} characters or less"
        )));
    }
    if username.contains(' ') {
        return Err(AppError::Validation(
            "Username cannot contain spaces".to_string(),
        ));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::Validation(
            "Username can only contain letters and numbers".to_string(),
        ));
    }
    Ok(())
}

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

fn username_taken() -> AppError {
    AppError::Conflict("Username already exists".to_string())
}

impl UserDirectory {
    /// Takes users as-is; the next id continues after the highest one present.
    pub fn from_users(users: Vec<User>) -> Self {
        let next_id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        Self { users, next_id }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn admin_count(&self) -> usize {
        self.users.iter().filter(|u| u.role == Role::Admin).count()
    }

    pub fn get(&self, id: u32) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn login(&self, username: &str, password: &str) -> Result<Identity, AppError> {
        match self
            .users
            .iter()
            .find(|u| u.username == username && u.password == password)
        {
            Some(user) => {
                info!(username, role = %user.role, "login succeeded");
                Ok(Identity::from(user))
            }
            None => {
                warn!(username, "login failed");
                Err(AppError::InvalidCredentials(
                    "Invalid credentials".to_string(),
                ))
            }
        }
    }

    /// New accounts always start with the `user` role.
    pub fn create(&mut self, username: &str, password: &str) -> Result<UserSummary, AppError> {
        validate_username(username)?;
        if self.users.iter().any(|u| u.username == username) {
            return Err(username_taken());
        }

        let user = User {
            id: self.next_id,
            username: username.to_string(),
            password: password.to_string(),
            role: Role::User,
        };
        self.next_id += 1;

        info!(id = user.id, username, "user created");
        let summary = UserSummary::from(&user);
        self.users.push(user);
        Ok(summary)
    }

    pub fn list(&self) -> Vec<UserSummary> {
        self.users.iter().map(UserSummary::from).collect()
    }

    /// Rewrites username and role; the password only changes when `password` is non-empty.
    pub fn update(
        &mut self,
        id: u32,
        username: &str,
        role: &str,
        password: Option<&str>,
    ) -> Result<(), AppError> {
        validate_username(username)?;
        let role: Role = role.parse()?;

        let current = self.get(id).ok_or_else(user_not_found)?;
        if current.role == Role::Admin && role != Role::Admin && self.admin_count() == 1 {
            warn!(id, "refusing to demote the last admin");
            return Err(AppError::LastAdmin);
        }
        if self
            .users
            .iter()
            .any(|u| u.username == username && u.id != id)
        {
            return Err(username_taken());
        }

        let user = self
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(user_not_found)?;
        user.username = username.to_string();
        user.role = role;
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            user.password = password.to_string();
        }

        info!(id, username, %role, "user updated");
        Ok(())
    }

    pub fn change_own_password(
        &mut self,
        id: u32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let user = self
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(user_not_found)?;
        if user.password != current_password {
            return Err(AppError::InvalidCredentials(
                "Current password is incorrect".to_string(),
            ));
        }
        user.password = new_password.to_string();
        info!(id, username = %user.username, "password changed");
        Ok(())
    }

    /// Removes the account and returns its username, for cascading.
    pub fn delete(&mut self, id: u32) -> Result<String, AppError> {
        let index = self
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(user_not_found)?;

        if self.users[index].role == Role::Admin {
            let other_admins = self
                .users
                .iter()
                .filter(|u| u.role == Role::Admin && u.id != id)
                .count();
            if other_admins == 0 {
                warn!(id, "refusing to delete the last admin");
                return Err(AppError::LastAdmin);
            }
        }

        let removed = self.users.remove(index);
        Ok(removed.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> UserDirectory {
        UserDirectory::from_users(vec![
            User {
                id: 1,
                username: "admin".into(),
                password: "admin".into(),
                role: Role::Admin,
            },
            User {
                id: 2,
                username: "alice".into(),
                password: "password123".into(),
                role: Role::User,
            },
        ])
    }

    #[test]
    fn username_length_boundary() {
        let mut dir = seeded();
        assert!(dir.create(&"a".repeat(15), "pw").is_ok());
        assert_eq!(
            dir.create(&"b".repeat(16), "pw"),
            Err(AppError::Validation(
                "Username must be 15 characters or less".into()
            ))
        );
        // 9 characters but 18 bytes
        assert_eq!(
            validate_username(&"é".repeat(9)),
            Err(AppError::Validation(
                "Username must be 15 characters or less".into()
            ))
        );
    }

    #[test]
    fn username_rules() {
        assert!(validate_username("Bob42").is_ok());
        assert_eq!(
            validate_username(""),
            Err(AppError::Validation("Username is required".into()))
        );
        assert_eq!(
            validate_username("bo b"),
            Err(AppError::Validation("Username cannot contain spaces".into()))
        );
        for bad in ["bob!", "bob_1", "bøb", "a-b"] {
            assert_eq!(
                validate_username(bad),
                Err(AppError::Validation(
                    "Username can only contain letters and numbers".into()
                )),
                "{bad}"
            );
        }
    }

    #[test]
    fn duplicate_create_conflicts() {
        let mut dir = seeded();
        let first = dir.create("dave", "pw").unwrap();
        assert_eq!(first.id, 3);
        assert_eq!(first.role, Role::User);
        assert!(matches!(dir.create("dave", "other"), Err(AppError::Conflict(_))));
        assert!(matches!(dir.create("alice", "pw"), Err(AppError::Conflict(_))));
        assert_eq!(dir.len(), 3);
    }

    #[test]
    fn ids_are_sequential_and_not_reused() {
        let mut dir = seeded();
        let a = dir.create("dave", "pw").unwrap();
        dir.delete(a.id).unwrap();
        let b = dir.create("erin", "pw").unwrap();
        assert_eq!(b.id, a.id + 1);
    }

    #[test]
    fn login_matches_username_and_password() {
        let dir = seeded();
        let identity = dir.login("admin", "admin").unwrap();
        assert_eq!(identity.user_id, 1);
        assert_eq!(identity.role, Role::Admin);
        assert!(matches!(
            dir.login("admin", "wrong"),
            Err(AppError::InvalidCredentials(_))
        ));
        assert!(matches!(
            dir.login("nobody", "admin"),
            Err(AppError::InvalidCredentials(_))
        ));
    }

    #[test]
    fn list_has_no_passwords() {
        let dir = seeded();
        let json = serde_json::to_value(dir.list()).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 2);
        assert!(json[0].get("password").is_none());
        assert_eq!(json[0]["role"], "admin");
    }

    #[test]
    fn update_rewrites_fields() {
        let mut dir = seeded();
        dir.update(2, "alicia", "admin", None).unwrap();
        let user = dir.get(2).unwrap();
        assert_eq!(user.username, "alicia");
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.password, "password123");

        dir.update(2, "alicia", "user", Some("")).unwrap();
        assert_eq!(dir.get(2).unwrap().password, "password123");

        dir.update(2, "alicia", "user", Some("fresh")).unwrap();
        assert_eq!(dir.get(2).unwrap().password, "fresh");
    }

    #[test]
    fn update_checks_role_and_collisions() {
        let mut dir = seeded();
        assert_eq!(
            dir.update(2, "alice", "root", None),
            Err(AppError::Validation("Role must be 'admin' or 'user'".into()))
        );
        assert!(matches!(
            dir.update(2, "admin", "user", None),
            Err(AppError::Conflict(_))
        ));
        // keeping one's own name is not a collision
        assert!(dir.update(2, "alice", "user", None).is_ok());
        assert!(matches!(
            dir.update(99, "ghost", "user", None),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn last_admin_cannot_be_demoted() {
        let mut dir = seeded();
        assert_eq!(dir.update(1, "admin", "user", None), Err(AppError::LastAdmin));
        assert_eq!(dir.get(1).unwrap().role, Role::Admin);
        // renaming the last admin is fine
        dir.update(1, "root", "admin", None).unwrap();
        assert_eq!(dir.get(1).unwrap().username, "root");
    }

    #[test]
    fn change_own_password_requires_current() {
        let mut dir = seeded();
        assert!(matches!(
            dir.change_own_password(2, "nope", "new"),
            Err(AppError::InvalidCredentials(_))
        ));
        dir.change_own_password(2, "password123", "new").unwrap();
        assert!(dir.login("alice", "new").is_ok());
        assert!(dir.login("alice", "password123").is_err());
        assert!(matches!(
            dir.change_own_password(42, "x", "y"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn last_admin_cannot_be_deleted() {
        let mut dir = seeded();
        assert_eq!(dir.delete(1), Err(AppError::LastAdmin));
        assert_eq!(dir.admin_count(), 1);
        assert_eq!(dir.len(), 2);
    }

    #[test]
    fn admin_deletable_when_another_remains() {
        let mut dir = seeded();
        dir.update(2, "alice", "admin", None).unwrap();
        assert_eq!(dir.admin_count(), 2);
        assert_eq!(dir.delete(1).unwrap(), "admin");
        assert_eq!(dir.admin_count(), 1);
        assert_eq!(dir.delete(2), Err(AppError::LastAdmin));
    }

    #[test]
    fn delete_unknown_is_not_found() {
        let mut dir = seeded();
        assert!(matches!(dir.delete(7), Err(AppError::NotFound(_))));
    }
}
