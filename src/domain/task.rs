//! Task domain model
//!
//! Tasks live on the remote service; this module mirrors its wire format.
//! Ids, timestamps, and the `blockers`/`dependents` arrays are assigned
//! server-side and never computed locally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Workflow state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    Backlog,
    #[default]
    Todo,
    InProgress,
    Blocked,
    Done,
}

impl TaskState {
    /// All states in workflow order (also the selector order in the board)
    pub const ALL: [TaskState; 5] = [
        TaskState::Backlog,
        TaskState::Todo,
        TaskState::InProgress,
        TaskState::Blocked,
        TaskState::Done,
    ];

    /// Returns the display label for the state
    pub fn label(&self) -> &'static str {
        match self {
            TaskState::Backlog => "Backlog",
            TaskState::Todo => "To Do",
            TaskState::InProgress => "In Progress",
            TaskState::Blocked => "Blocked",
            TaskState::Done => "Done",
        }
    }

    /// Returns the spelling the service uses in URLs and JSON bodies
    pub fn wire_name(&self) -> &'static str {
        match self {
            TaskState::Backlog => "BACKLOG",
            TaskState::Todo => "TODO",
            TaskState::InProgress => "IN_PROGRESS",
            TaskState::Blocked => "BLOCKED",
            TaskState::Done => "DONE",
        }
    }

    /// Returns true if this state represents completion
    pub fn is_done(&self) -> bool {
        matches!(self, TaskState::Done)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown task state: {0} (expected backlog, todo, in-progress, blocked, or done)")]
pub struct ParseTaskStateError(String);

impl FromStr for TaskState {
    type Err = ParseTaskStateError;

    /// Accepts kebab-case, snake_case, and the wire spellings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "backlog" => Ok(TaskState::Backlog),
            "todo" | "to_do" => Ok(TaskState::Todo),
            "in_progress" => Ok(TaskState::InProgress),
            "blocked" => Ok(TaskState::Blocked),
            "done" => Ok(TaskState::Done),
            _ => Err(ParseTaskStateError(s.to_string())),
        }
    }
}

/// A task as returned by the remote service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Server-assigned identifier (positive)
    pub id: i64,

    /// Human-readable title
    pub title: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,

    /// Current workflow state
    pub state: TaskState,

    /// Optional deadline
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,

    /// When the task was created (server-assigned)
    pub created_at: DateTime<Utc>,

    /// When the task was last updated (server-assigned)
    pub updated_at: DateTime<Utc>,

    /// When the task reached Done (server-assigned)
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,

    /// Ids of tasks that must complete before this one
    #[serde(default)]
    pub blockers: Vec<i64>,

    /// Ids of tasks that wait on this one
    #[serde(default)]
    pub dependents: Vec<i64>,
}

impl Task {
    /// Returns true if the task is past its deadline and not done
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due) => due < now && !self.state.is_done(),
            None => false,
        }
    }
}

/// Body of a create-task call
///
/// Absent fields are omitted from the JSON body; the service fills in
/// its defaults (state defaults to TODO).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCreate {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<TaskState>,
}

impl TaskCreate {
    /// Creates a body with only a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            due_date: None,
            state: None,
        }
    }
}

/// Body of an update-task call (PATCH semantics)
///
/// Only fields that are present are sent; the service leaves the rest
/// unchanged. There is no way to clear a field back to null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<TaskState>,
}

impl TaskUpdate {
    /// Creates an empty update
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no field would be sent
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.state.is_none()
    }
}

/// Trims a title; returns None when nothing remains
pub fn clean_title(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Trims a description; empty input means "no description"
pub fn clean_description(raw: &str) -> Option<String> {
    clean_title(raw)
}
