use chrono::Local;
use serde::{Deserialize, Serialize};

/// One todo item. The id is the epoch-millisecond creation time; two items
/// created within the same millisecond would collide, which is accepted for
/// this scope. Only `completed` changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub text: String,
    pub completed: bool,
    pub created_at: String,
}

impl Todo {
    pub fn new(text: impl Into<String>) -> Self {
        let now = Local::now();
        Self {
            id: now.timestamp_millis(),
            text: text.into(),
            completed: false,
            created_at: now.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_todo_starts_open_with_a_timestamp_id() {
        let todo = Todo::new("buy milk");
        assert_eq!(todo.text, "buy milk");
        assert!(!todo.completed);
        assert!(todo.id > 0);
        assert!(chrono::DateTime::parse_from_rfc3339(&todo.created_at).is_ok());
    }
}
