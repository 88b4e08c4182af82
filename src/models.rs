use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Lifecycle state of a task.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Pending,
    Done,
    Missed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Pending, TaskStatus::Done, TaskStatus::Missed];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Done => "DONE",
            TaskStatus::Missed => "MISSED",
        }
    }

    /// Human-readable label used in listings.
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "To Do",
            TaskStatus::Done => "Completed",
            TaskStatus::Missed => "Missed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(TaskStatus::Pending),
            "DONE" => Ok(TaskStatus::Done),
            "MISSED" => Ok(TaskStatus::Missed),
            _ => Err(ParseError::new("status", s)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 3] = [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "LOW",
            TaskPriority::Medium => "MEDIUM",
            TaskPriority::High => "HIGH",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Low Priority",
            TaskPriority::Medium => "Medium Priority",
            TaskPriority::High => "High Priority",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LOW" => Ok(TaskPriority::Low),
            "MEDIUM" => Ok(TaskPriority::Medium),
            "HIGH" => Ok(TaskPriority::High),
            _ => Err(ParseError::new("priority", s)),
        }
    }
}

/// A reference from a task to one of its categories.
///
/// The name is carried along for display; matching is always done on `id`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CategoryRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Represents a single task.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    /// Unique identifier for the task.
    pub id: u64,
    /// Short title, searched by the text filter.
    pub title: String,
    /// Optional free-form description, also searched by the text filter.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    /// Local due timestamp, if any.
    #[serde(default)]
    pub due_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub categories: Vec<CategoryRef>,
    #[serde(default)]
    pub is_favorite: bool,
    pub created_at: DateTime<Local>,
}

impl Task {
    /// Whether the task references the category with the given id.
    pub fn has_category(&self, category_id: &str) -> bool {
        self.categories.iter().any(|c| c.id == category_id)
    }
}

/// The editable part of a task, as submitted by the task form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct TaskRequest {
    pub title: String,
    pub content: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDateTime>,
    pub category_ids: Vec<String>,
    pub is_favorite: bool,
}

impl From<&Task> for TaskRequest {
    fn from(task: &Task) -> Self {
        TaskRequest {
            title: task.title.clone(),
            content: task.content.clone(),
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
            category_ids: task.categories.iter().map(|c| c.id.clone()).collect(),
            is_favorite: task.is_favorite,
        }
    }
}

/// A user-defined category tasks can be tagged with.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Hex color, e.g. `#3B82F6`.
    pub color: String,
    pub icon: String,
    pub created_at: DateTime<Local>,
}

impl Category {
    pub fn to_ref(&self) -> CategoryRef {
        CategoryRef { id: self.id.clone(), name: self.name.clone() }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CategoryRequest {
    pub name: String,
    pub color: String,
    pub icon: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// The signed-in account.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Local>,
    pub enabled: bool,
}
