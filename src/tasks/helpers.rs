use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, Row};

use std::path::Path;

use crate::internal_error::{InternalError, InternalResult};

use super::data::*;

/// Where the store persists its tasks and categories.
pub trait TaskBackend {
    fn load_tasks(&self) -> InternalResult<Vec<Task>>;
    fn load_categories(&self) -> InternalResult<Vec<Category>>;
    fn insert_task(&mut self, task: &Task) -> InternalResult<()>;
    fn update_task(&mut self, task: &Task) -> InternalResult<()>;
    fn insert_category(&mut self, category: &Category) -> InternalResult<()>;
    fn delete_category(&mut self, category_id: &str) -> InternalResult<()>;
}

pub struct SqliteBackend {
    connection: Connection,
}

impl SqliteBackend {
    pub fn open(path: impl AsRef<Path>) -> InternalResult<SqliteBackend> {
        SqliteBackend::new(Connection::open(path)?)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> InternalResult<SqliteBackend> {
        SqliteBackend::new(Connection::open_in_memory()?)
    }

    pub fn new(connection: Connection) -> InternalResult<SqliteBackend> {
        create_tables(&connection)?;
        Ok(SqliteBackend { connection })
    }
}

pub fn create_tables(db_connection: &Connection) -> InternalResult<()> {
    db_connection.execute(
        "CREATE TABLE IF NOT EXISTS categories (id TEXT PRIMARY KEY, name TEXT NOT NULL, color TEXT NOT NULL, icon TEXT NOT NULL)",
        [],
    )?;
    db_connection.execute(
        "CREATE TABLE IF NOT EXISTS tasks (id TEXT PRIMARY KEY, title TEXT NOT NULL, category_id TEXT, completed INTEGER NOT NULL, completed_at TEXT, archived INTEGER NOT NULL, due_date TEXT, created_at TEXT NOT NULL)",
        [],
    )?;

    Ok(())
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn get_task_from_row(row: &Row) -> rusqlite::Result<Task> {
    let id: TaskID = row.get(0)?;
    let created_at = row.get::<usize, String>(7)?;
    let created_at = parse_date(&created_at).unwrap_or_else(|| {
        tracing::warn!(task_id = %id, raw = %created_at, "unreadable creation date");
        DateTime::<Utc>::UNIX_EPOCH
    });

    let mut task = Task::new(id, row.get(1)?, created_at);
    task.category_id = row.get(2)?;
    task.archived = row.get(5)?;

    if let Some(raw) = row.get::<usize, Option<String>>(6)? {
        task.due_date = parse_date(&raw);
        if task.due_date.is_none() {
            tracing::warn!(task_id = %task.id, raw = %raw, "ignoring malformed due date");
        }
    }

    if row.get::<usize, bool>(3)? {
        let completed_at = row
            .get::<usize, Option<String>>(4)?
            .and_then(|raw| parse_date(&raw))
            .unwrap_or_else(|| {
                tracing::warn!(task_id = %task.id, "completed task without completion time");
                created_at
            });
        task.set_completed(true, completed_at);
    }

    Ok(task)
}

impl TaskBackend for SqliteBackend {
    fn load_tasks(&self) -> InternalResult<Vec<Task>> {
        let mut statement = self.connection.prepare(
            "SELECT id, title, category_id, completed, completed_at, archived, due_date, created_at FROM tasks ORDER BY rowid",
        )?;

        let tasks = statement
            .query_map([], get_task_from_row)?
            .collect::<rusqlite::Result<Vec<Task>>>()?;

        Ok(tasks)
    }

    fn load_categories(&self) -> InternalResult<Vec<Category>> {
        let mut statement = self
            .connection
            .prepare("SELECT id, name, color, icon FROM categories ORDER BY rowid")?;

        let category_rows = statement.query_map([], |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
                color: row.get(2)?,
                icon: row.get(3)?,
            })
        })?;

        let mut categories = vec![];
        for row_result in category_rows {
            categories.push(row_result?);
        }

        Ok(categories)
    }

    fn insert_task(&mut self, task: &Task) -> InternalResult<()> {
        self.connection.execute(
            "INSERT INTO tasks VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                task.id,
                task.title,
                task.category_id,
                task.completed,
                task.completed_at.as_ref().map(format_date),
                task.archived,
                task.due_date.as_ref().map(format_date),
                format_date(&task.created_at),
            ],
        )?;

        Ok(())
    }

    fn update_task(&mut self, task: &Task) -> InternalResult<()> {
        let changed = self.connection.execute(
            "UPDATE tasks SET title = (?2), category_id = (?3), completed = (?4), completed_at = (?5), archived = (?6), due_date = (?7) WHERE id = (?1)",
            params![
                task.id,
                task.title,
                task.category_id,
                task.completed,
                task.completed_at.as_ref().map(format_date),
                task.archived,
                task.due_date.as_ref().map(format_date),
            ],
        )?;

        if changed == 0 {
            return Err(InternalError::task_not_found(&task.id));
        }

        Ok(())
    }

    fn insert_category(&mut self, category: &Category) -> InternalResult<()> {
        self.connection.execute(
            "INSERT INTO categories VALUES (?1, ?2, ?3, ?4)",
            params![category.id, category.name, category.color, category.icon],
        )?;

        Ok(())
    }

    fn delete_category(&mut self, category_id: &str) -> InternalResult<()> {
        let changed = self
            .connection
            .execute("DELETE FROM categories WHERE id = (?1)", params![category_id])?;

        if changed == 0 {
            return Err(InternalError::category_not_found(category_id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_task() -> Task {
        let created = Utc.with_ymd_and_hms(2024, 4, 2, 7, 15, 0).unwrap();
        let mut task = Task::new("t1".to_string(), "Renew passport".to_string(), created);
        task.category_id = Some("errands".to_string());
        task.due_date = Some(Utc.with_ymd_and_hms(2024, 4, 20, 17, 0, 0).unwrap());
        task
    }

    #[test]
    fn tasks_come_back_as_written() {
        let mut backend = SqliteBackend::open_in_memory().unwrap();
        let mut task = sample_task();
        backend.insert_task(&task).unwrap();

        task.set_completed(true, Utc.with_ymd_and_hms(2024, 4, 3, 12, 0, 0).unwrap());
        task.archived = true;
        backend.update_task(&task).unwrap();

        assert_eq!(backend.load_tasks().unwrap(), vec![task]);
    }

    #[test]
    fn updating_a_missing_task_fails() {
        let mut backend = SqliteBackend::open_in_memory().unwrap();

        let result = backend.update_task(&sample_task());
        assert!(matches!(result, Err(InternalError::NotFound { kind: "task", .. })));
    }

    #[test]
    fn stored_garbage_due_date_is_dropped() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        backend
            .connection
            .execute(
                "INSERT INTO tasks VALUES ('t9', 'Mystery', NULL, 0, NULL, 0, 'soonish', '2024-04-02T07:15:00Z')",
                [],
            )
            .unwrap();

        let tasks = backend.load_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].due_date, None);
        assert_eq!(tasks[0].completed_at, None);
    }

    #[test]
    fn categories_keep_insertion_order() {
        let mut backend = SqliteBackend::open_in_memory().unwrap();
        for name in ["Work", "Home", "Health"] {
            backend
                .insert_category(&Category {
                    id: name.to_lowercase(),
                    name: name.to_string(),
                    color: String::new(),
                    icon: String::new(),
                })
                .unwrap();
        }
        backend.delete_category("home").unwrap();

        let names: Vec<String> = backend
            .load_categories()
            .unwrap()
            .into_iter()
            .map(|category| category.name)
            .collect();
        assert_eq!(names, vec!["Work", "Health"]);

        assert!(backend.delete_category("home").is_err());
    }
}
