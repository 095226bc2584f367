//! SQLite-backed [`TaskStore`].

use std::collections::HashMap;
use std::path::Path;

use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

use crate::error::{Error, Result};
use crate::store::{DependencyMaps, TaskRow, TaskStore};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    status INTEGER NOT NULL DEFAULT 0,
    type INTEGER NOT NULL DEFAULT 0,
    priority INTEGER NOT NULL DEFAULT 0,
    link TEXT NOT NULL DEFAULT ''
);
CREATE TABLE IF NOT EXISTS dependencies (
    blocker_id TEXT NOT NULL,
    blocked_id TEXT NOT NULL,
    PRIMARY KEY (blocker_id, blocked_id)
);
CREATE INDEX IF NOT EXISTS idx_dependencies_blocked ON dependencies(blocked_id);
CREATE TABLE IF NOT EXISTS labels (
    task_id TEXT NOT NULL,
    label TEXT NOT NULL,
    PRIMARY KEY (task_id, label)
);
CREATE TABLE IF NOT EXISTS config (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create the database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "opening task database");
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;")?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    fn string_column(&self, sql: &str, id: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params![id], |row| row.get::<_, String>(0))?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _) if inner.code == ErrorCode::ConstraintViolation
    )
}

fn read_task_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TaskRow> {
    Ok(TaskRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: row.get(3)?,
        task_type: row.get(4)?,
        priority: row.get(5)?,
        link: row.get(6)?,
    })
}

impl TaskStore for SqliteStore {
    fn create_task(&self, row: &TaskRow) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO tasks (id, title, description, status, type, priority, link)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    row.id,
                    row.title,
                    row.description,
                    row.status,
                    row.task_type,
                    row.priority,
                    row.link
                ],
            )
            .map_err(|err| {
                if is_constraint_violation(&err) {
                    Error::DuplicateId(row.id.clone())
                } else {
                    Error::from(err)
                }
            })?;
        Ok(())
    }

    fn get_task(&self, id: &str) -> Result<TaskRow> {
        self.conn
            .query_row(
                "SELECT id, title, description, status, type, priority, link
                 FROM tasks WHERE id = ?1",
                params![id],
                read_task_row,
            )
            .optional()?
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))
    }

    fn all_tasks(&self) -> Result<Vec<TaskRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, status, type, priority, link
             FROM tasks ORDER BY title",
        )?;
        let rows = stmt.query_map([], read_task_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_task(&self, row: &TaskRow) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET title = ?2, description = ?3, status = ?4, type = ?5, priority = ?6, link = ?7
             WHERE id = ?1",
            params![
                row.id,
                row.title,
                row.description,
                row.status,
                row.task_type,
                row.priority,
                row.link
            ],
        )?;
        if changed == 0 {
            return Err(Error::TaskNotFound(row.id.clone()));
        }
        Ok(())
    }

    fn delete_task(&self, id: &str) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(Error::TaskNotFound(id.to_string()));
        }
        Ok(())
    }

    fn add_dependency(&self, blocker: &str, blocked: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO dependencies (blocker_id, blocked_id) VALUES (?1, ?2)",
            params![blocker, blocked],
        )?;
        Ok(())
    }

    fn remove_dependency(&self, blocker: &str, blocked: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM dependencies WHERE blocker_id = ?1 AND blocked_id = ?2",
            params![blocker, blocked],
        )?;
        Ok(())
    }

    fn remove_all_dependencies(&self, id: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM dependencies WHERE blocker_id = ?1 OR blocked_id = ?1",
            params![id],
        )?;
        Ok(())
    }

    fn blockers(&self, id: &str) -> Result<Vec<String>> {
        self.string_column(
            "SELECT blocker_id FROM dependencies WHERE blocked_id = ?1 ORDER BY rowid",
            id,
        )
    }

    fn blocking(&self, id: &str) -> Result<Vec<String>> {
        self.string_column(
            "SELECT blocked_id FROM dependencies WHERE blocker_id = ?1 ORDER BY rowid",
            id,
        )
    }

    fn all_dependencies(&self) -> Result<DependencyMaps> {
        let mut stmt = self
            .conn
            .prepare("SELECT blocker_id, blocked_id FROM dependencies ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut maps = DependencyMaps::default();
        for row in rows {
            let (blocker, blocked) = row?;
            maps.insert(&blocker, &blocked);
        }
        Ok(maps)
    }

    fn add_label(&self, id: &str, label: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO labels (task_id, label) VALUES (?1, ?2)",
            params![id, label],
        )?;
        Ok(())
    }

    fn remove_label(&self, id: &str, label: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM labels WHERE task_id = ?1 AND label = ?2",
            params![id, label],
        )?;
        Ok(())
    }

    fn remove_all_labels(&self, id: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM labels WHERE task_id = ?1", params![id])?;
        Ok(())
    }

    fn labels(&self, id: &str) -> Result<Vec<String>> {
        self.string_column(
            "SELECT label FROM labels WHERE task_id = ?1 ORDER BY rowid",
            id,
        )
    }

    fn all_labels(&self) -> Result<HashMap<String, Vec<String>>> {
        let mut stmt = self
            .conn
            .prepare("SELECT task_id, label FROM labels ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut labels: HashMap<String, Vec<String>> = HashMap::new();
        for row in rows {
            let (id, label) = row?;
            labels.entry(id).or_default().push(label);
        }
        Ok(labels)
    }

    fn get_config(&self, key: &str) -> Result<String> {
        self.conn
            .query_row(
                "SELECT value FROM config WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?
            .ok_or_else(|| Error::ConfigNotFound(key.to_string()))
    }

    fn set_config(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO config (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn unset_config(&self, key: &str) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM config WHERE key = ?1", params![key])?;
        if changed == 0 {
            return Err(Error::ConfigNotFound(key.to_string()));
        }
        Ok(())
    }

    fn all_config(&self) -> Result<Vec<(String, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM config ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }
}
