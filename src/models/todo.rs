use chrono::NaiveDateTime;
use diesel::{AsChangeset, Insertable, Queryable};
use serde::{Deserialize, Serialize};

use crate::repository::schema::todos;

/// Full row as persisted. Serializes as the detail shape
/// (id, title, description, created, complete, important).
#[derive(Serialize, Deserialize, Debug, Clone, Queryable)]
pub struct Todo {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub created: NaiveDateTime,
    pub complete: bool,
    pub important: bool,
}

/// Insert record. `id` is assigned by the store, `created` and `complete`
/// are filled in by the repository at insertion time.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = todos)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    pub created: NaiveDateTime,
    pub complete: bool,
    pub important: bool,
}

/// Create request body.
#[derive(Deserialize, Debug, Clone)]
pub struct TodoInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub important: bool,
}

/// Update request body. `title` and `description` are both required;
/// `complete` cannot be changed through an update.
#[derive(Deserialize, Debug, Clone)]
pub struct TodoUpdate {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub important: bool,
}

#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = todos)]
pub struct TodoChangeset {
    pub title: String,
    pub description: String,
    pub important: bool,
}

impl From<TodoUpdate> for TodoChangeset {
    fn from(value: TodoUpdate) -> Self {
        Self {
            title: value.title,
            description: value.description,
            important: value.important,
        }
    }
}

/// Compact shape returned by list, create and update.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TodoCompact {
    pub id: i32,
    pub title: String,
    pub complete: bool,
    pub important: bool,
}

impl From<Todo> for TodoCompact {
    fn from(value: Todo) -> Self {
        Self {
            id: value.id,
            title: value.title,
            complete: value.complete,
            important: value.important,
        }
    }
}
