mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::models::*;

/// Shared handle to the SQLite store. Cloning is cheap; all clones use one connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::from_connection(conn)
    }

    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        schema::run_migrations(&self.conn())
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database lock poisoned")
    }

    // ============================================================
    // User operations
    // ============================================================

    pub fn create_user(&self, input: NewUser) -> Result<User> {
        if input.auth_provider == AuthProvider::Local && input.password_hash.is_none() {
            return Err(ModelError::PasswordRequired.into());
        }
        if self.get_user_by_email(&input.email)?.is_some() {
            return Err(ModelError::EmailTaken.into());
        }

        let conn = self.conn();
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO users (id, name, email, password_hash, auth_provider, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                &input.name,
                &input.email,
                &input.password_hash,
                input.auth_provider.as_str(),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )
        .map_err(map_unique_email)?;

        Ok(User {
            id,
            name: input.name,
            email: input.email,
            password_hash: input.password_hash,
            auth_provider: input.auth_provider,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let conn = self.conn();
        let user = conn
            .query_row(
                "SELECT id, name, email, password_hash, auth_provider, created_at, updated_at
                 FROM users WHERE id = ?",
                [id.to_string()],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn();
        let user = conn
            .query_row(
                "SELECT id, name, email, password_hash, auth_provider, created_at, updated_at
                 FROM users WHERE email = ?",
                [email],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn update_user(
        &self,
        id: Uuid,
        name: Option<String>,
        email: Option<String>,
    ) -> Result<Option<User>> {
        let Some(existing) = self.get_user(id)? else {
            return Ok(None);
        };

        if let Some(email) = &email {
            if let Some(other) = self.get_user_by_email(email)? {
                if other.id != id {
                    return Err(ModelError::EmailTaken.into());
                }
            }
        }

        let conn = self.conn();
        let now = Utc::now();
        let name = name.unwrap_or(existing.name);
        let email = email.unwrap_or(existing.email);

        conn.execute(
            "UPDATE users SET name = ?, email = ?, updated_at = ? WHERE id = ?",
            (&name, &email, now.to_rfc3339(), id.to_string()),
        )
        .map_err(map_unique_email)?;

        Ok(Some(User {
            id,
            name,
            email,
            password_hash: existing.password_hash,
            auth_provider: existing.auth_provider,
            created_at: existing.created_at,
            updated_at: now,
        }))
    }

    // ============================================================
    // Task operations
    // ============================================================

    pub fn create_task(&self, user_id: Uuid, input: NewTask) -> Result<Task> {
        let conn = self.conn();
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO tasks (id, user_id, title, description, completed, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                user_id.to_string(),
                &input.title,
                &input.description,
                input.completed,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(Task {
            id,
            user_id,
            title: input.title,
            description: input.description,
            completed: input.completed,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn get_tasks(&self, user_id: Uuid) -> Result<Vec<Task>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, title, description, completed, created_at, updated_at
             FROM tasks WHERE user_id = ? ORDER BY created_at, rowid",
        )?;

        let tasks = stmt
            .query_map([user_id.to_string()], row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tasks)
    }

    pub fn get_task(&self, id: Uuid, user_id: Uuid) -> Result<Option<Task>> {
        let conn = self.conn();
        let task = conn
            .query_row(
                "SELECT id, user_id, title, description, completed, created_at, updated_at
                 FROM tasks WHERE id = ? AND user_id = ?",
                [id.to_string(), user_id.to_string()],
                row_to_task,
            )
            .optional()?;
        Ok(task)
    }

    pub fn update_task(
        &self,
        id: Uuid,
        user_id: Uuid,
        input: UpdateTaskInput,
    ) -> Result<Option<Task>> {
        let Some(existing) = self.get_task(id, user_id)? else {
            return Ok(None);
        };

        let conn = self.conn();
        let now = Utc::now();
        let title = input
            .title
            .map(|t| t.trim().to_string())
            .unwrap_or(existing.title);
        let description = match input.description {
            Some(d) => normalize_description(Some(d)),
            None => existing.description,
        };
        let completed = input.completed.unwrap_or(existing.completed);

        conn.execute(
            "UPDATE tasks SET title = ?, description = ?, completed = ?, updated_at = ?
             WHERE id = ? AND user_id = ?",
            (
                &title,
                &description,
                completed,
                now.to_rfc3339(),
                id.to_string(),
                user_id.to_string(),
            ),
        )?;

        Ok(Some(Task {
            id,
            user_id,
            title,
            description,
            completed,
            created_at: existing.created_at,
            updated_at: now,
        }))
    }

    /// Flips the completion flag of an owned task.
    pub fn toggle_task(&self, id: Uuid, user_id: Uuid) -> Result<Option<Task>> {
        {
            let conn = self.conn();
            let rows = conn.execute(
                "UPDATE tasks SET completed = NOT completed, updated_at = ?
                 WHERE id = ? AND user_id = ?",
                (Utc::now().to_rfc3339(), id.to_string(), user_id.to_string()),
            )?;
            if rows == 0 {
                return Ok(None);
            }
        }
        self.get_task(id, user_id)
    }

    /// Deletes an owned task and returns what was removed.
    pub fn delete_task(&self, id: Uuid, user_id: Uuid) -> Result<Option<Task>> {
        let Some(task) = self.get_task(id, user_id)? else {
            return Ok(None);
        };

        let conn = self.conn();
        conn.execute(
            "DELETE FROM tasks WHERE id = ? AND user_id = ?",
            [id.to_string(), user_id.to_string()],
        )?;
        Ok(Some(task))
    }

    pub fn delete_all_tasks(&self, user_id: Uuid) -> Result<usize> {
        let conn = self.conn();
        let rows = conn.execute("DELETE FROM tasks WHERE user_id = ?", [user_id.to_string()])?;
        Ok(rows)
    }

    // ============================================================
    // Note operations
    // ============================================================

    pub fn create_note(&self, user_id: Uuid, content: NoteContent) -> Result<Note> {
        let conn = self.conn();
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO notes (id, user_id, title, text, original_note, summarized_note, downloaded_pdf, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?)",
            (
                id.to_string(),
                user_id.to_string(),
                &content.title,
                &content.text,
                &content.original_note,
                &content.summarized_note,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(Note {
            id,
            user_id,
            title: content.title,
            text: content.text,
            original_note: content.original_note,
            summarized_note: content.summarized_note,
            downloaded_pdf: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// The user's notes, newest first.
    pub fn get_notes(&self, user_id: Uuid) -> Result<Vec<Note>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, title, text, original_note, summarized_note, downloaded_pdf, created_at, updated_at
             FROM notes WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
        )?;

        let notes = stmt
            .query_map([user_id.to_string()], row_to_note)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(notes)
    }

    pub fn get_note(&self, id: Uuid, user_id: Uuid) -> Result<Option<Note>> {
        let conn = self.conn();
        let note = conn
            .query_row(
                "SELECT id, user_id, title, text, original_note, summarized_note, downloaded_pdf, created_at, updated_at
                 FROM notes WHERE id = ? AND user_id = ?",
                [id.to_string(), user_id.to_string()],
                row_to_note,
            )
            .optional()?;
        Ok(note)
    }

    pub fn update_note(
        &self,
        id: Uuid,
        user_id: Uuid,
        content: NoteContent,
    ) -> Result<Option<Note>> {
        let Some(existing) = self.get_note(id, user_id)? else {
            return Ok(None);
        };

        let conn = self.conn();
        let now = Utc::now();

        conn.execute(
            "UPDATE notes SET title = ?, text = ?, original_note = ?, summarized_note = ?, updated_at = ?
             WHERE id = ? AND user_id = ?",
            (
                &content.title,
                &content.text,
                &content.original_note,
                &content.summarized_note,
                now.to_rfc3339(),
                id.to_string(),
                user_id.to_string(),
            ),
        )?;

        Ok(Some(Note {
            id,
            user_id,
            title: content.title,
            text: content.text,
            original_note: content.original_note,
            summarized_note: content.summarized_note,
            downloaded_pdf: existing.downloaded_pdf,
            created_at: existing.created_at,
            updated_at: now,
        }))
    }

    pub fn delete_note(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let conn = self.conn();
        let rows = conn.execute(
            "DELETE FROM notes WHERE id = ? AND user_id = ?",
            [id.to_string(), user_id.to_string()],
        )?;
        Ok(rows > 0)
    }

    // ============================================================
    // Learning guide operations
    // ============================================================

    /// Persists a guide after checking that its day numbers are unique.
    pub fn create_learning_guide(
        &self,
        user_id: Uuid,
        input: NewLearningGuide,
    ) -> Result<LearningGuide> {
        input.check_unique_days()?;

        let conn = self.conn();
        let id = Uuid::new_v4();
        let now = Utc::now();
        let plan_json = serde_json::to_string(&input.daily_plan)?;

        conn.execute(
            "INSERT INTO learning_guides (id, user_id, topic, duration_days, daily_plan, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                user_id.to_string(),
                &input.topic,
                input.duration_days,
                &plan_json,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(LearningGuide {
            id,
            user_id,
            topic: input.topic,
            duration_days: input.duration_days,
            daily_plan: input.daily_plan,
            created_at: now,
            updated_at: now,
        })
    }

    /// One page of the user's guides, newest first, plus the user's total count.
    pub fn get_learning_guides(
        &self,
        user_id: Uuid,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<LearningGuide>, u32)> {
        let conn = self.conn();
        let offset = (page.saturating_sub(1) as i64) * limit as i64;

        let mut stmt = conn.prepare(
            "SELECT id, user_id, topic, duration_days, daily_plan, created_at, updated_at
             FROM learning_guides WHERE user_id = ?
             ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
        )?;
        let guides = stmt
            .query_map((user_id.to_string(), limit as i64, offset), row_to_guide)?
            .collect::<Result<Vec<_>, _>>()?;

        let total: u32 = conn.query_row(
            "SELECT COUNT(*) FROM learning_guides WHERE user_id = ?",
            [user_id.to_string()],
            |row| row.get(0),
        )?;

        Ok((guides, total))
    }

    pub fn get_learning_guide(&self, id: Uuid, user_id: Uuid) -> Result<Option<LearningGuide>> {
        let conn = self.conn();
        let guide = conn
            .query_row(
                "SELECT id, user_id, topic, duration_days, daily_plan, created_at, updated_at
                 FROM learning_guides WHERE id = ? AND user_id = ?",
                [id.to_string(), user_id.to_string()],
                row_to_guide,
            )
            .optional()?;
        Ok(guide)
    }

    pub fn delete_learning_guide(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let conn = self.conn();
        let rows = conn.execute(
            "DELETE FROM learning_guides WHERE id = ? AND user_id = ?",
            [id.to_string(), user_id.to_string()],
        )?;
        Ok(rows > 0)
    }

    pub fn delete_all_learning_guides(&self, user_id: Uuid) -> Result<usize> {
        let conn = self.conn();
        let rows = conn.execute(
            "DELETE FROM learning_guides WHERE user_id = ?",
            [user_id.to_string()],
        )?;
        Ok(rows)
    }

    // ============================================================
    // Stats
    // ============================================================

    pub fn get_user_stats(&self, user_id: Uuid) -> Result<UserStats> {
        let conn = self.conn();
        let stats = conn.query_row(
            "SELECT
                (SELECT COUNT(*) FROM notes WHERE user_id = ?1),
                (SELECT COUNT(*) FROM tasks WHERE user_id = ?1),
                (SELECT COUNT(*) FROM tasks WHERE user_id = ?1 AND completed = 1),
                (SELECT COUNT(*) FROM tasks WHERE user_id = ?1 AND completed = 0),
                (SELECT COUNT(*) FROM learning_guides WHERE user_id = ?1)",
            [user_id.to_string()],
            |row| {
                Ok(UserStats {
                    total_notes: row.get(0)?,
                    total_tasks: row.get(1)?,
                    completed_tasks: row.get(2)?,
                    pending_tasks: row.get(3)?,
                    ai_learnings: row.get(4)?,
                })
            },
        )?;
        Ok(stats)
    }
}

fn default_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "brainboard")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("brainboard.db"))
}

/// Turns a UNIQUE violation on `users.email` into [`ModelError::EmailTaken`].
fn map_unique_email(err: rusqlite::Error) -> anyhow::Error {
    match &err {
        rusqlite::Error::SqliteFailure(e, Some(msg))
            if e.code == rusqlite::ErrorCode::ConstraintViolation && msg.contains("users.email") =>
        {
            ModelError::EmailTaken.into()
        }
        _ => err.into(),
    }
}

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: parse_uuid(row.get::<_, String>(0)?),
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        auth_provider: AuthProvider::from_str(&row.get::<_, String>(4)?)
            .unwrap_or(AuthProvider::Local),
        created_at: parse_datetime(row.get::<_, String>(5)?),
        updated_at: parse_datetime(row.get::<_, String>(6)?),
    })
}

fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: parse_uuid(row.get::<_, String>(0)?),
        user_id: parse_uuid(row.get::<_, String>(1)?),
        title: row.get(2)?,
        description: row.get(3)?,
        completed: row.get(4)?,
        created_at: parse_datetime(row.get::<_, String>(5)?),
        updated_at: parse_datetime(row.get::<_, String>(6)?),
    })
}

fn row_to_note(row: &Row) -> rusqlite::Result<Note> {
    Ok(Note {
        id: parse_uuid(row.get::<_, String>(0)?),
        user_id: parse_uuid(row.get::<_, String>(1)?),
        title: row.get(2)?,
        text: row.get(3)?,
        original_note: row.get(4)?,
        summarized_note: row.get(5)?,
        downloaded_pdf: row.get(6)?,
        created_at: parse_datetime(row.get::<_, String>(7)?),
        updated_at: parse_datetime(row.get::<_, String>(8)?),
    })
}

fn row_to_guide(row: &Row) -> rusqlite::Result<LearningGuide> {
    let plan_json: String = row.get(4)?;
    let daily_plan = serde_json::from_str(&plan_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(LearningGuide {
        id: parse_uuid(row.get::<_, String>(0)?),
        user_id: parse_uuid(row.get::<_, String>(1)?),
        topic: row.get(2)?,
        duration_days: row.get(3)?,
        daily_plan,
        created_at: parse_datetime(row.get::<_, String>(5)?),
        updated_at: parse_datetime(row.get::<_, String>(6)?),
    })
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
