use chrono::Local;
use tracing::debug;

use crate::{error::AppError, model::Todo};

// Todo items in insertion order, each owned by a username
#[derive(Debug)]
pub struct TodoLedger {
    todos: Vec<Todo>,
    next_id: u32,
}

impl Default for TodoLedger {
    fn default() -> Self {
        Self {
            todos: Vec::new(),
            next_id: 1,
        }
    }
}

fn todo_not_found() -> AppError {
    AppError::NotFound("Todo not found".to_string())
}

impl TodoLedger {
    pub fn from_todos(todos: Vec<Todo>) -> Self {
        let next_id = todos.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        Self { todos, next_id }
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    #[cfg(test)]
    fn get(&self, id: u32) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    pub fn list(&self, owner: Option<&str>) -> Vec<Todo> {
        self.todos
            .iter()
            .filter(|t| owner.map_or(true, |owner| t.user == owner))
            .cloned()
            .collect()
    }

    /// Appends a new, incomplete todo. The owner is taken on trust.
    pub fn add(&mut self, text: &str, user: &str) -> Todo {
        let todo = Todo {
            id: self.next_id,
            text: text.to_string(),
            completed: false,
            user: user.to_string(),
            created_at: Local::now().naive_local(),
        };
        self.next_id += 1;
        self.todos.push(todo.clone());
        debug!(id = todo.id, user, "todo added");
        todo
    }

    pub fn complete(&mut self, id: u32) -> Result<(), AppError> {
        let todo = self
            .todos
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(todo_not_found)?;
        todo.completed = true;
        Ok(())
    }

    pub fn delete(&mut self, id: u32) -> Result<(), AppError> {
        let index = self
            .todos
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(todo_not_found)?;
        self.todos.remove(index);
        Ok(())
    }

    /// Drops every todo owned by `username`; returns how many went.
    pub fn delete_all_by_owner(&mut self, username: &str) -> usize {
        let before = self.todos.len();
        self.todos.retain(|t| t.user != username);
        before - self.todos.len()
    }
}
