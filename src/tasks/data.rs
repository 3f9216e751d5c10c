use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub type TaskID = String;
pub type CategoryID = String;

/// A unit of work.
///
/// `completed_at` is only ever written through [`Task::set_completed`], which
/// keeps it present exactly while `completed` is true.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    pub id: TaskID,
    pub title: String,
    #[serde(default)]
    pub category_id: Option<CategoryID>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default, deserialize_with = "lenient_date")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(id: TaskID, title: String, created_at: DateTime<Utc>) -> Task {
        Task {
            id,
            title,
            category_id: None,
            completed: false,
            completed_at: None,
            archived: false,
            due_date: None,
            created_at,
        }
    }

    pub fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) {
        self.completed = completed;
        self.completed_at = if completed { Some(now) } else { None };
    }

    pub fn is_active(&self) -> bool {
        !self.completed && !self.archived
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryID,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: String,
}

/// Parses an RFC 3339 timestamp, treating anything unparseable as absent.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;

    Ok(match raw {
        Some(serde_json::Value::String(s)) => parse_date(&s),
        _ => None,
    })
}

#[derive(Deserialize, Debug, Clone)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub category_id: Option<CategoryID>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial edit of a task. Absent fields are left untouched; `category_id`
/// and `due_date` take an explicit `null` to clear the value.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct TaskUpdate {
    pub task_id: TaskID,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<CategoryID>>,
    #[serde(default, deserialize_with = "lenient_double_date")]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<CategoryID>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::deserialize(deserializer).map(Some)
}

fn lenient_double_date<'de, D>(deserializer: D) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_date(deserializer).map(Some)
}

#[derive(Deserialize, Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Serialize, Debug)]
pub struct AddTaskResult {
    pub task_id: TaskID,
}

#[derive(Serialize, Debug)]
pub struct AddCategoryResult {
    pub category_id: CategoryID,
}

#[derive(Deserialize, Debug)]
pub struct TaskIDRequest {
    pub task_id: TaskID,
}

#[derive(Deserialize, Debug)]
pub struct DeleteCategoryRequest {
    pub category_id: CategoryID,
}

#[derive(Deserialize, Debug)]
pub struct SetSearchQueryRequest {
    pub query: String,
}
