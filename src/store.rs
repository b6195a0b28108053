//! Process-wide state: the user directory and the todo ledger behind one lock.
//!
//! Every operation takes the lock for its whole read-modify-write, so uniqueness checks,
//! admin counts, id allocation and cascades are atomic with respect to each other.

use chrono::{Duration, Local};
use parking_lot::Mutex;
use tracing::info;

use crate::{
    directory::UserDirectory,
    error::AppError,
    ledger::TodoLedger,
    model::{Identity, Role, Todo, User, UserSummary},
};

#[derive(Debug, Default)]
struct Inner {
    users: UserDirectory,
    todos: TodoLedger,
}

#[derive(Debug, Default)]
pub struct Store {
    inner: Mutex<Inner>,
}

impl Store {
    pub fn new(users: UserDirectory, todos: TodoLedger) -> Self {
        Self {
            inner: Mutex::new(Inner { users, todos }),
        }
    }

    /// Starting state: one admin, three users, fifteen sample todos.
    pub fn seeded() -> Self {
        let user = |id, username: &str, password: &str, role| User {
            id,
            username: username.to_string(),
            password: password.to_string(),
            role,
        };
        let users = vec![
            user(1, "admin", "admin", Role::Admin),
            user(2, "alice", "password123", Role::User),
            user(3, "bob", "password123", Role::User),
            user(4, "charlie", "password123", Role::User),
        ];

        let now = Local::now().naive_local();
        let samples: [(&str, bool, &str, Duration); 15] = [
            ("Review code changes", false, "alice", Duration::hours(2)),
            ("Update documentation", true, "bob", Duration::hours(1)),
            ("Fix bug in login", false, "alice", Duration::minutes(50)),
            ("Deploy to staging", false, "charlie", Duration::minutes(45)),
            ("Write unit tests", true, "alice", Duration::minutes(40)),
            ("Design new feature", false, "bob", Duration::minutes(35)),
            ("Code review for PR #123", true, "charlie", Duration::minutes(30)),
            ("Update API documentation", false, "alice", Duration::minutes(25)),
            ("Fix database migration", true, "bob", Duration::minutes(20)),
            ("Implement user authentication", false, "charlie", Duration::minutes(15)),
            ("Optimize database queries", true, "alice", Duration::minutes(10)),
            ("Add error handling", false, "bob", Duration::minutes(5)),
            ("Update dependencies", true, "charlie", Duration::minutes(3)),
            ("Create user interface mockups", false, "alice", Duration::minutes(1)),
            ("Set up CI/CD pipeline", true, "bob", Duration::seconds(30)),
        ];
        let todos = samples
            .into_iter()
            .zip(1..)
            .map(|((text, completed, owner, age), id)| Todo {
                id,
                text: text.to_string(),
                completed,
                user: owner.to_string(),
                created_at: now - age,
            })
            .collect();

        let store = Self::new(UserDirectory::from_users(users), TodoLedger::from_todos(todos));
        {
            let inner = store.inner.lock();
            info!(
                users = inner.users.len(),
                todos = inner.todos.len(),
                "seeded in-memory store"
            );
        }
        store
    }

    pub fn login(&self, username: &str, password: &str) -> Result<Identity, AppError> {
        self.inner.lock().users.login(username, password)
    }

    pub fn list_users(&self) -> Vec<UserSummary> {
        self.inner.lock().users.list()
    }

    pub fn create_user(&self, username: &str, password: &str) -> Result<UserSummary, AppError> {
        self.inner.lock().users.create(username, password)
    }

    pub fn update_user(
        &self,
        id: u32,
        username: &str,
        role: &str,
        password: Option<&str>,
    ) -> Result<(), AppError> {
        self.inner.lock().users.update(id, username, role, password)
    }

    pub fn change_own_password(
        &self,
        id: u32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        self.inner
            .lock()
            .users
            .change_own_password(id, current_password, new_password)
    }

    /// Deletes the account and, under the same lock, every todo it owns.
    pub fn delete_user(&self, id: u32) -> Result<String, AppError> {
        let mut inner = self.inner.lock();
        let username = inner.users.delete(id)?;
        let removed = inner.todos.delete_all_by_owner(&username);
        info!(id, username = %username, todos_removed = removed, "user deleted");
        Ok(username)
    }

    pub fn list_todos(&self, owner: Option<&str>) -> Vec<Todo> {
        self.inner.lock().todos.list(owner)
    }

    pub fn add_todo(&self, text: &str, user: &str) -> Todo {
        self.inner.lock().todos.add(text, user)
    }

    pub fn complete_todo(&self, id: u32) -> Result<(), AppError> {
        self.inner.lock().todos.complete(id)
    }

    pub fn delete_todo(&self, id: u32) -> Result<(), AppError> {
        self.inner.lock().todos.delete(id)
    }
}
