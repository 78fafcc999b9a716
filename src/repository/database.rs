use anyhow::{anyhow, Result};
use chrono::prelude::*;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, PooledConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::models::todo::{NewTodo, Todo, TodoChangeset, TodoInput};
use crate::repository::schema::todos::dsl::*;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;
type DbConn = PooledConnection<ConnectionManager<SqliteConnection>>;

#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    pub fn new(database_url: &str) -> Result<Self> {
        let manager = ConnectionManager::<SqliteConnection>::new(database_url);
        // An in-memory database lives and dies with its connection, so the
        // pool must never hand out more than one.
        let builder = if database_url == ":memory:" {
            r2d2::Pool::builder().max_size(1)
        } else {
            r2d2::Pool::builder()
        };
        let pool: DbPool = builder.build(manager)?;

        let mut conn = pool.get()?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|err| anyhow!("failed to run migrations: {}", err))?;

        Ok(Database { pool })
    }

    fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    pub fn get_todos(&self, filter: Option<bool>) -> Result<Vec<Todo>> {
        let mut conn = self.conn()?;
        let rows = match filter {
            Some(flag) => todos.filter(complete.eq(flag)).load::<Todo>(&mut conn)?,
            None => todos.load::<Todo>(&mut conn)?,
        };
        Ok(rows)
    }

    pub fn create_todo(&self, input: TodoInput) -> Result<Todo> {
        let new_todo = NewTodo {
            title: input.title,
            description: input.description,
            created: Utc::now().naive_utc(),
            complete: false,
            important: input.important,
        };
        let todo = diesel::insert_into(todos)
            .values(&new_todo)
            .get_result::<Todo>(&mut self.conn()?)?;
        Ok(todo)
    }

    pub fn get_todo_by_id(&self, todo_id: i32) -> Result<Option<Todo>> {
        let todo = todos
            .find(todo_id)
            .first::<Todo>(&mut self.conn()?)
            .optional()?;
        Ok(todo)
    }

    pub fn update_todo_by_id(&self, todo_id: i32, changes: TodoChangeset) -> Result<Option<Todo>> {
        let todo = diesel::update(todos.find(todo_id))
            .set(&changes)
            .get_result::<Todo>(&mut self.conn()?)
            .optional()?;
        Ok(todo)
    }

    pub fn delete_todo_by_id(&self, todo_id: i32) -> Result<Option<Todo>> {
        let mut conn = self.conn()?;
        let removed = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let existing = todos.find(todo_id).first::<Todo>(conn).optional()?;
            let Some(existing) = existing else {
                return Ok(None);
            };
            diesel::delete(todos.find(todo_id)).execute(conn)?;
            Ok(Some(existing))
        })?;
        Ok(removed)
    }

    #[cfg(test)]
    pub fn set_complete(&self, todo_id: i32, flag: bool) -> Result<()> {
        diesel::update(todos.find(todo_id))
            .set(complete.eq(flag))
            .execute(&mut self.conn()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(todo_title: &str, todo_description: &str) -> TodoInput {
        TodoInput {
            title: todo_title.to_string(),
            description: todo_description.to_string(),
            important: false,
        }
    }

    #[test]
    fn create_assigns_id_and_defaults() {
        let db = Database::new(":memory:").unwrap();

        let todo = db.create_todo(input("TodoA", "TodoA description")).unwrap();

        assert_eq!(todo.title, "TodoA");
        assert_eq!(todo.description, "TodoA description");
        assert!(!todo.complete);
        assert!(!todo.important);

        let fetched = db.get_todo_by_id(todo.id).unwrap().unwrap();
        assert_eq!(fetched.id, todo.id);
        assert_eq!(fetched.created, todo.created);
    }

    #[test]
    fn update_preserves_created_and_complete() {
        let db = Database::new(":memory:").unwrap();
        let todo = db.create_todo(input("TodoA", "TodoA description")).unwrap();
        db.set_complete(todo.id, true).unwrap();

        let changes = TodoChangeset {
            title: "renamed".to_string(),
            description: "new description".to_string(),
            important: true,
        };
        let updated = db.update_todo_by_id(todo.id, changes).unwrap().unwrap();

        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.created, todo.created);
        assert!(updated.complete);
        assert!(updated.important);
    }

    #[test]
    fn filter_matches_complete_flag() {
        let db = Database::new(":memory:").unwrap();
        let a = db.create_todo(input("TodoA", "")).unwrap();
        db.create_todo(input("TodoB", "")).unwrap();
        db.create_todo(input("TodoC", "")).unwrap();
        db.set_complete(a.id, true).unwrap();

        assert_eq!(db.get_todos(None).unwrap().len(), 3);
        assert_eq!(db.get_todos(Some(true)).unwrap().len(), 1);
        assert_eq!(db.get_todos(Some(false)).unwrap().len(), 2);
    }

    #[test]
    fn delete_returns_removed_row() {
        let db = Database::new(":memory:").unwrap();
        let todo = db.create_todo(input("TodoA", "TodoA description")).unwrap();

        let removed = db.delete_todo_by_id(todo.id).unwrap().unwrap();
        assert_eq!(removed.id, todo.id);
        assert_eq!(removed.description, "TodoA description");

        assert!(db.get_todo_by_id(todo.id).unwrap().is_none());
        assert!(db.delete_todo_by_id(todo.id).unwrap().is_none());
    }
}
