mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;

use crate::models::*;

/// Handle to the SQLite store.
///
/// Cheap to clone; all clones share one connection behind a mutex. The handle
/// is passed explicitly to whoever needs persistence (router state, the
/// workflow engine, tests); there is no process-global client.
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
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "taskdeck")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("taskdeck.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Project operations
    // ============================================================

    pub fn get_all_projects(&self) -> Result<Vec<Project>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, name, description, workflow, created_at, updated_at
             FROM projects ORDER BY name",
        )?;

        let projects = stmt
            .query_map([], |row| {
                Ok(Project {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    workflow: WorkflowKind::from_str(&row.get::<_, String>(3)?)
                        .unwrap_or(WorkflowKind::Automated),
                    created_at: parse_datetime(row.get::<_, String>(4)?),
                    updated_at: parse_datetime(row.get::<_, String>(5)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(projects)
    }

    pub fn get_project(&self, id: i64) -> Result<Option<Project>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, name, description, workflow, created_at, updated_at
             FROM projects WHERE id = ?",
        )?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Project {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                workflow: WorkflowKind::from_str(&row.get::<_, String>(3)?)
                    .unwrap_or(WorkflowKind::Automated),
                created_at: parse_datetime(row.get::<_, String>(4)?),
                updated_at: parse_datetime(row.get::<_, String>(5)?),
            }))
        } else {
            Ok(None)
        }
    }

    pub fn create_project(&self, input: CreateProjectInput) -> Result<Project> {
        if input.name.trim().is_empty() {
            anyhow::bail!("Project name cannot be empty");
        }

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();
        let workflow = input.workflow.unwrap_or(WorkflowKind::Automated);

        conn.execute(
            "INSERT INTO projects (name, description, workflow, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
            (
                &input.name,
                &input.description,
                workflow.as_str(),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;
        let id = conn.last_insert_rowid();

        Ok(Project {
            id,
            name: input.name,
            description: input.description,
            workflow,
            created_at: now,
            updated_at: now,
        })
    }

    /// Update a project's mutable fields. The workflow mode is not among
    /// them: it is fixed for the lifetime of the project.
    pub fn update_project(&self, id: i64, input: UpdateProjectInput) -> Result<Option<Project>> {
        let Some(existing) = self.get_project(id)? else {
            return Ok(None);
        };

        let name = input.name.unwrap_or(existing.name);
        if name.trim().is_empty() {
            anyhow::bail!("Project name cannot be empty");
        }
        let description = input.description.or(existing.description);

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();

        conn.execute(
            "UPDATE projects SET name = ?, description = ?, updated_at = ? WHERE id = ?",
            (&name, &description, now.to_rfc3339(), id),
        )?;

        Ok(Some(Project {
            id,
            name,
            description,
            workflow: existing.workflow,
            created_at: existing.created_at,
            updated_at: now,
        }))
    }

    pub fn delete_project(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM projects WHERE id = ?", [id])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Project member operations
    // ============================================================

    pub fn get_project_members(&self, project_id: i64) -> Result<Vec<ProjectMember>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, project_id, user_id, role, created_at
             FROM project_members WHERE project_id = ? ORDER BY created_at, id",
        )?;

        let members = stmt
            .query_map([project_id], |row| {
                Ok(ProjectMember {
                    id: row.get(0)?,
                    project_id: row.get(1)?,
                    user_id: row.get(2)?,
                    role: MemberRole::from_str(&row.get::<_, String>(3)?)
                        .unwrap_or(MemberRole::Member),
                    created_at: parse_datetime(row.get::<_, String>(4)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(members)
    }

    pub fn add_member(&self, project_id: i64, input: AddMemberInput) -> Result<ProjectMember> {
        self.get_project(project_id)?
            .ok_or_else(|| anyhow::anyhow!("Project not found"))?;

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();
        let role = input.role.unwrap_or(MemberRole::Member);

        conn.execute(
            "INSERT INTO project_members (project_id, user_id, role, created_at)
             VALUES (?, ?, ?, ?)",
            (project_id, input.user_id, role.as_str(), now.to_rfc3339()),
        )?;
        let id = conn.last_insert_rowid();

        Ok(ProjectMember {
            id,
            project_id,
            user_id: input.user_id,
            role,
            created_at: now,
        })
    }

    pub fn remove_member(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM project_members WHERE id = ?", [id])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Custom column operations
    // ============================================================

    pub fn get_project_columns(&self, project_id: i64) -> Result<Vec<CustomColumn>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, project_id, name, position, created_at
             FROM custom_columns WHERE project_id = ? ORDER BY position, id",
        )?;

        let columns = stmt
            .query_map([project_id], |row| {
                Ok(CustomColumn {
                    id: row.get(0)?,
                    project_id: row.get(1)?,
                    name: row.get(2)?,
                    position: row.get(3)?,
                    created_at: parse_datetime(row.get::<_, String>(4)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(columns)
    }

    pub fn create_column(&self, project_id: i64, input: CreateColumnInput) -> Result<CustomColumn> {
        if input.name.trim().is_empty() {
            anyhow::bail!("Column name cannot be empty");
        }
        self.get_project(project_id)?
            .ok_or_else(|| anyhow::anyhow!("Project not found"))?;

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();
        let position = match input.position {
            Some(p) => p,
            None => conn.query_row(
                "SELECT COALESCE(MAX(position) + 1, 0) FROM custom_columns WHERE project_id = ?",
                [project_id],
                |row| row.get(0),
            )?,
        };

        conn.execute(
            "INSERT INTO custom_columns (project_id, name, position, created_at)
             VALUES (?, ?, ?, ?)",
            (project_id, &input.name, position, now.to_rfc3339()),
        )?;
        let id = conn.last_insert_rowid();

        Ok(CustomColumn {
            id,
            project_id,
            name: input.name,
            position,
            created_at: now,
        })
    }

    pub fn get_column(&self, id: i64) -> Result<Option<CustomColumn>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, project_id, name, position, created_at
             FROM custom_columns WHERE id = ?",
        )?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(CustomColumn {
                id: row.get(0)?,
                project_id: row.get(1)?,
                name: row.get(2)?,
                position: row.get(3)?,
                created_at: parse_datetime(row.get::<_, String>(4)?),
            }))
        } else {
            Ok(None)
        }
    }

    pub fn update_column(&self, id: i64, input: UpdateColumnInput) -> Result<Option<CustomColumn>> {
        let Some(existing) = self.get_column(id)? else {
            return Ok(None);
        };

        let conn = self.conn.lock().expect("database lock poisoned");
        let name = input.name.unwrap_or(existing.name);
        let position = input.position.unwrap_or(existing.position);

        conn.execute(
            "UPDATE custom_columns SET name = ?, position = ? WHERE id = ?",
            (&name, position, id),
        )?;

        Ok(Some(CustomColumn {
            id,
            project_id: existing.project_id,
            name,
            position,
            created_at: existing.created_at,
        }))
    }

    pub fn delete_column(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM custom_columns WHERE id = ?", [id])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Task operations
    // ============================================================

    pub fn get_task(&self, id: i64) -> Result<Option<Task>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, project_id, title, description, status, priority, start_date, end_date,
                    position, assignee_id, column_id, tags, created_at, updated_at
             FROM tasks WHERE id = ?",
        )?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Task {
                id: row.get(0)?,
                project_id: row.get(1)?,
                title: row.get(2)?,
                description: row.get(3)?,
                status: TaskStatus::from_str(&row.get::<_, String>(4)?)
                    .unwrap_or(TaskStatus::Backlog),
                priority: TaskPriority::from_str(&row.get::<_, String>(5)?)
                    .unwrap_or(TaskPriority::Medium),
                start_date: parse_date(row.get::<_, Option<String>>(6)?),
                end_date: parse_date(row.get::<_, Option<String>>(7)?),
                position: row.get(8)?,
                assignee_id: row.get(9)?,
                column_id: row.get(10)?,
                tags: parse_tags(&row.get::<_, String>(11)?),
                created_at: parse_datetime(row.get::<_, String>(12)?),
                updated_at: parse_datetime(row.get::<_, String>(13)?),
            }))
        } else {
            Ok(None)
        }
    }

    pub fn get_tasks_by_project(&self, project_id: i64) -> Result<Vec<Task>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, project_id, title, description, status, priority, start_date, end_date,
                    position, assignee_id, column_id, tags, created_at, updated_at
             FROM tasks WHERE project_id = ? ORDER BY position, id",
        )?;

        let tasks = stmt
            .query_map([project_id], |row| {
                Ok(Task {
                    id: row.get(0)?,
                    project_id: row.get(1)?,
                    title: row.get(2)?,
                    description: row.get(3)?,
                    status: TaskStatus::from_str(&row.get::<_, String>(4)?)
                        .unwrap_or(TaskStatus::Backlog),
                    priority: TaskPriority::from_str(&row.get::<_, String>(5)?)
                        .unwrap_or(TaskPriority::Medium),
                    start_date: parse_date(row.get::<_, Option<String>>(6)?),
                    end_date: parse_date(row.get::<_, Option<String>>(7)?),
                    position: row.get(8)?,
                    assignee_id: row.get(9)?,
                    column_id: row.get(10)?,
                    tags: parse_tags(&row.get::<_, String>(11)?),
                    created_at: parse_datetime(row.get::<_, String>(12)?),
                    updated_at: parse_datetime(row.get::<_, String>(13)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tasks)
    }

    pub fn get_task_with_subtasks(&self, id: i64) -> Result<Option<TaskWithSubtasks>> {
        let task = match self.get_task(id)? {
            Some(t) => t,
            None => return Ok(None),
        };

        let subtasks = self.get_subtasks_by_task(id)?;

        Ok(Some(TaskWithSubtasks { task, subtasks }))
    }

    pub fn create_task(&self, project_id: i64, input: CreateTaskInput) -> Result<Task> {
        if input.title.trim().is_empty() {
            anyhow::bail!("Task title cannot be empty");
        }
        self.get_project(project_id)?
            .ok_or_else(|| anyhow::anyhow!("Project not found"))?;

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();
        let status = input.status.unwrap_or(TaskStatus::Backlog);
        let priority = input.priority.unwrap_or(TaskPriority::Medium);
        let position: i64 = conn.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM tasks WHERE project_id = ?",
            [project_id],
            |row| row.get(0),
        )?;

        conn.execute(
            "INSERT INTO tasks (project_id, title, description, status, priority, start_date,
                                end_date, position, assignee_id, column_id, tags, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                project_id,
                &input.title,
                &input.description,
                status.as_str(),
                priority.as_str(),
                input.start_date.map(|d| d.to_string()),
                input.end_date.map(|d| d.to_string()),
                position,
                input.assignee_id,
                input.column_id,
                tags_to_json(&input.tags),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;
        let id = conn.last_insert_rowid();

        Ok(Task {
            id,
            project_id,
            title: input.title,
            description: input.description,
            status,
            priority,
            start_date: input.start_date,
            end_date: input.end_date,
            position,
            assignee_id: input.assignee_id,
            tags: input.tags,
            column_id: input.column_id,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_task(&self, id: i64, input: UpdateTaskInput) -> Result<Option<Task>> {
        let Some(existing) = self.get_task(id)? else {
            return Ok(None);
        };

        let title = input.title.unwrap_or(existing.title);
        if title.trim().is_empty() {
            anyhow::bail!("Task title cannot be empty");
        }

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();
        let description = input.description.or(existing.description);
        let status = input.status.unwrap_or(existing.status);
        let priority = input.priority.unwrap_or(existing.priority);
        let start_date = input.start_date.or(existing.start_date);
        let end_date = input.end_date.or(existing.end_date);
        let position = input.position.unwrap_or(existing.position);
        let assignee_id = input.assignee_id.or(existing.assignee_id);
        let tags = input.tags.unwrap_or(existing.tags);
        let column_id = input.column_id.or(existing.column_id);

        conn.execute(
            "UPDATE tasks SET title = ?, description = ?, status = ?, priority = ?,
                    start_date = ?, end_date = ?, position = ?, assignee_id = ?,
                    column_id = ?, tags = ?, updated_at = ?
             WHERE id = ?",
            (
                &title,
                &description,
                status.as_str(),
                priority.as_str(),
                start_date.map(|d| d.to_string()),
                end_date.map(|d| d.to_string()),
                position,
                assignee_id,
                column_id,
                tags_to_json(&tags),
                now.to_rfc3339(),
                id,
            ),
        )?;

        Ok(Some(Task {
            id,
            project_id: existing.project_id,
            title,
            description,
            status,
            priority,
            start_date,
            end_date,
            position,
            assignee_id,
            tags,
            column_id,
            created_at: existing.created_at,
            updated_at: now,
        }))
    }

    /// Persist a task's status. This is the single write the workflow engine
    /// performs; everything else about the task is left untouched.
    pub fn set_task_status(&self, id: i64, status: TaskStatus) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();
        let rows = conn.execute(
            "UPDATE tasks SET status = ?, updated_at = ? WHERE id = ?",
            (status.as_str(), now.to_rfc3339(), id),
        )?;
        Ok(rows > 0)
    }

    pub fn delete_task(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM tasks WHERE id = ?", [id])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Subtask operations
    // ============================================================

    pub fn get_subtask(&self, id: i64) -> Result<Option<Subtask>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, task_id, title, completed, position, created_at
             FROM subtasks WHERE id = ?",
        )?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Subtask {
                id: row.get(0)?,
                task_id: row.get(1)?,
                title: row.get(2)?,
                completed: row.get::<_, i32>(3)? != 0,
                position: row.get(4)?,
                created_at: parse_datetime(row.get::<_, String>(5)?),
            }))
        } else {
            Ok(None)
        }
    }

    pub fn get_subtasks_by_task(&self, task_id: i64) -> Result<Vec<Subtask>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, task_id, title, completed, position, created_at
             FROM subtasks WHERE task_id = ? ORDER BY position, id",
        )?;

        let subtasks = stmt
            .query_map([task_id], |row| {
                Ok(Subtask {
                    id: row.get(0)?,
                    task_id: row.get(1)?,
                    title: row.get(2)?,
                    completed: row.get::<_, i32>(3)? != 0,
                    position: row.get(4)?,
                    created_at: parse_datetime(row.get::<_, String>(5)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(subtasks)
    }

    pub fn create_subtask(&self, task_id: i64, input: CreateSubtaskInput) -> Result<Subtask> {
        if input.title.trim().is_empty() {
            anyhow::bail!("Subtask title cannot be empty");
        }
        self.get_task(task_id)?
            .ok_or_else(|| anyhow::anyhow!("Task not found"))?;

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();
        let position = match input.position {
            Some(p) => p,
            None => conn.query_row(
                "SELECT COALESCE(MAX(position) + 1, 0) FROM subtasks WHERE task_id = ?",
                [task_id],
                |row| row.get(0),
            )?,
        };

        conn.execute(
            "INSERT INTO subtasks (task_id, title, completed, position, created_at)
             VALUES (?, ?, 0, ?, ?)",
            (task_id, &input.title, position, now.to_rfc3339()),
        )?;
        let id = conn.last_insert_rowid();

        Ok(Subtask {
            id,
            task_id,
            title: input.title,
            completed: false,
            position,
            created_at: now,
        })
    }

    pub fn update_subtask(&self, id: i64, input: UpdateSubtaskInput) -> Result<Option<Subtask>> {
        let Some(existing) = self.get_subtask(id)? else {
            return Ok(None);
        };

        let title = input.title.unwrap_or(existing.title);
        if title.trim().is_empty() {
            anyhow::bail!("Subtask title cannot be empty");
        }

        let conn = self.conn.lock().expect("database lock poisoned");
        let completed = input.completed.unwrap_or(existing.completed);
        let position = input.position.unwrap_or(existing.position);

        conn.execute(
            "UPDATE subtasks SET title = ?, completed = ?, position = ? WHERE id = ?",
            (&title, completed as i32, position, id),
        )?;

        Ok(Some(Subtask {
            id,
            task_id: existing.task_id,
            title,
            completed,
            position,
            created_at: existing.created_at,
        }))
    }

    pub fn delete_subtask(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM subtasks WHERE id = ?", [id])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Comment operations
    // ============================================================

    pub fn get_comments_by_task(&self, task_id: i64) -> Result<Vec<Comment>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, task_id, author_id, content, created_at
             FROM comments WHERE task_id = ? ORDER BY created_at, id",
        )?;

        let comments = stmt
            .query_map([task_id], |row| {
                Ok(Comment {
                    id: row.get(0)?,
                    task_id: row.get(1)?,
                    author_id: row.get(2)?,
                    content: row.get(3)?,
                    created_at: parse_datetime(row.get::<_, String>(4)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(comments)
    }

    pub fn create_comment(&self, task_id: i64, input: CreateCommentInput) -> Result<Comment> {
        if input.content.trim().is_empty() {
            anyhow::bail!("Comment content cannot be empty");
        }
        self.get_task(task_id)?
            .ok_or_else(|| anyhow::anyhow!("Task not found"))?;

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();

        conn.execute(
            "INSERT INTO comments (task_id, author_id, content, created_at)
             VALUES (?, ?, ?, ?)",
            (task_id, input.author_id, &input.content, now.to_rfc3339()),
        )?;
        let id = conn.last_insert_rowid();

        Ok(Comment {
            id,
            task_id,
            author_id: input.author_id,
            content: input.content,
            created_at: now,
        })
    }

    pub fn delete_comment(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM comments WHERE id = ?", [id])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Note operations
    // ============================================================

    pub fn get_note(&self, id: i64) -> Result<Option<Note>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, project_id, title, content, created_at, updated_at
             FROM notes WHERE id = ?",
        )?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Note {
                id: row.get(0)?,
                project_id: row.get(1)?,
                title: row.get(2)?,
                content: row.get(3)?,
                created_at: parse_datetime(row.get::<_, String>(4)?),
                updated_at: parse_datetime(row.get::<_, String>(5)?),
            }))
        } else {
            Ok(None)
        }
    }

    pub fn get_notes_by_project(&self, project_id: i64) -> Result<Vec<Note>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, project_id, title, content, created_at, updated_at
             FROM notes WHERE project_id = ? ORDER BY updated_at DESC, id DESC",
        )?;

        let notes = stmt
            .query_map([project_id], |row| {
                Ok(Note {
                    id: row.get(0)?,
                    project_id: row.get(1)?,
                    title: row.get(2)?,
                    content: row.get(3)?,
                    created_at: parse_datetime(row.get::<_, String>(4)?),
                    updated_at: parse_datetime(row.get::<_, String>(5)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(notes)
    }

    pub fn create_note(&self, project_id: i64, input: CreateNoteInput) -> Result<Note> {
        if input.title.trim().is_empty() {
            anyhow::bail!("Note title cannot be empty");
        }
        self.get_project(project_id)?
            .ok_or_else(|| anyhow::anyhow!("Project not found"))?;

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();

        conn.execute(
            "INSERT INTO notes (project_id, title, content, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
            (
                project_id,
                &input.title,
                &input.content,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;
        let id = conn.last_insert_rowid();

        Ok(Note {
            id,
            project_id,
            title: input.title,
            content: input.content,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_note(&self, id: i64, input: UpdateNoteInput) -> Result<Option<Note>> {
        let Some(existing) = self.get_note(id)? else {
            return Ok(None);
        };

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();
        let title = input.title.unwrap_or(existing.title);
        let content = input.content.unwrap_or(existing.content);

        conn.execute(
            "UPDATE notes SET title = ?, content = ?, updated_at = ? WHERE id = ?",
            (&title, &content, now.to_rfc3339(), id),
        )?;

        Ok(Some(Note {
            id,
            project_id: existing.project_id,
            title,
            content,
            created_at: existing.created_at,
            updated_at: now,
        }))
    }

    pub fn delete_note(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM notes WHERE id = ?", [id])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Activity trail operations
    // ============================================================

    /// Append an activity entry. Entries are write-once: no update or delete
    /// methods exist for this table.
    pub fn insert_activity(&self, entry: &NewActivity) -> Result<ActivityEntry> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();

        conn.execute(
            "INSERT INTO task_activity (project_id, task_id, task_title, field,
                                        old_value, new_value, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                entry.project_id,
                entry.task_id,
                &entry.task_title,
                &entry.field,
                &entry.old_value,
                &entry.new_value,
                now.to_rfc3339(),
            ),
        )?;
        let id = conn.last_insert_rowid();

        Ok(ActivityEntry {
            id,
            project_id: entry.project_id,
            task_id: entry.task_id,
            task_title: entry.task_title.clone(),
            field: entry.field.clone(),
            old_value: entry.old_value.clone(),
            new_value: entry.new_value.clone(),
            created_at: now,
        })
    }

    /// The project's audit feed, most recent first.
    pub fn project_activity(&self, project_id: i64) -> Result<Vec<ActivityEntry>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, project_id, task_id, task_title, field, old_value, new_value, created_at
             FROM task_activity WHERE project_id = ? ORDER BY id DESC",
        )?;

        let entries = stmt
            .query_map([project_id], |row| {
                Ok(ActivityEntry {
                    id: row.get(0)?,
                    project_id: row.get(1)?,
                    task_id: row.get(2)?,
                    task_title: row.get(3)?,
                    field: row.get(4)?,
                    old_value: row.get(5)?,
                    new_value: row.get(6)?,
                    created_at: parse_datetime(row.get::<_, String>(7)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    // ============================================================
    // Notification ledger operations
    // ============================================================

    pub fn create_notification(&self, input: NewNotification) -> Result<Notification> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();

        conn.execute(
            "INSERT INTO notifications (user_id, kind, title, message, is_read, created_at)
             VALUES (?, ?, ?, ?, 0, ?)",
            (
                input.user_id,
                input.kind.as_str(),
                &input.title,
                &input.message,
                now.to_rfc3339(),
            ),
        )?;
        let id = conn.last_insert_rowid();

        Ok(Notification {
            id,
            user_id: input.user_id,
            kind: input.kind,
            title: input.title,
            message: input.message,
            is_read: false,
            created_at: now,
        })
    }

    pub fn get_notification(&self, id: i64) -> Result<Option<Notification>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, user_id, kind, title, message, is_read, created_at
             FROM notifications WHERE id = ?",
        )?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Notification {
                id: row.get(0)?,
                user_id: row.get(1)?,
                kind: NotificationKind::from_str(&row.get::<_, String>(2)?)
                    .unwrap_or(NotificationKind::StatusChange),
                title: row.get(3)?,
                message: row.get(4)?,
                is_read: row.get::<_, i32>(5)? != 0,
                created_at: parse_datetime(row.get::<_, String>(6)?),
            }))
        } else {
            Ok(None)
        }
    }

    /// A user's notifications, most recent first. `page` is 1-based.
    pub fn list_notifications(
        &self,
        user_id: i64,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Notification>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let offset = i64::from(page.max(1) - 1) * i64::from(limit);
        let mut stmt = conn.prepare(
            "SELECT id, user_id, kind, title, message, is_read, created_at
             FROM notifications WHERE user_id = ? ORDER BY id DESC LIMIT ? OFFSET ?",
        )?;

        let notifications = stmt
            .query_map((user_id, limit, offset), |row| {
                Ok(Notification {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    kind: NotificationKind::from_str(&row.get::<_, String>(2)?)
                        .unwrap_or(NotificationKind::StatusChange),
                    title: row.get(3)?,
                    message: row.get(4)?,
                    is_read: row.get::<_, i32>(5)? != 0,
                    created_at: parse_datetime(row.get::<_, String>(6)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(notifications)
    }

    /// Count of UNREAD notifications for a user. Always derived from the
    /// rows; there is no stored counter to drift.
    pub fn unread_count(&self, user_id: i64) -> Result<i64> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = 0",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// UNREAD → READ. Idempotent: re-marking a READ notification is a no-op
    /// that still reports success. Returns false only when the id is unknown.
    pub fn mark_notification_read(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("UPDATE notifications SET is_read = 1 WHERE id = ?", [id])?;
        Ok(rows > 0)
    }

    /// Mark every UNREAD notification for the user as READ in a single
    /// statement; no caller observes a partially marked batch. Returns the
    /// number of notifications that changed state.
    pub fn mark_all_notifications_read(&self, user_id: i64) -> Result<usize> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute(
            "UPDATE notifications SET is_read = 1 WHERE user_id = ? AND is_read = 0",
            [user_id],
        )?;
        Ok(rows)
    }

    pub fn delete_notification(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM notifications WHERE id = ?", [id])?;
        Ok(rows > 0)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn parse_date(s: Option<String>) -> Option<chrono::NaiveDate> {
    s.and_then(|s| chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
}

fn parse_tags(json: &str) -> Vec<String> {
    serde_json::from_str(json).unwrap_or_default()
}

fn tags_to_json(tags: &[String]) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}
