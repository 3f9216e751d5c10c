use chrono::{DateTime, Utc};
use tokio::sync::watch;
use serde::Serialize;
use uuid::Uuid;

use std::sync::Arc;

use crate::internal_error::{InternalError, InternalResult};
use crate::stats::data::CategoryFilter;
use crate::stats::selection::SelectionState;

use super::data::*;
use super::helpers::TaskBackend;

/// An immutable view of the store. Every mutation publishes a fresh one with
/// the revision bumped.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct TaskSnapshot {
    pub revision: u64,
    pub tasks: Vec<Task>,
    pub categories: Vec<Category>,
}

/// The authoritative task list. Writes hit the backend first and only then
/// replace the published snapshot, so a failed write leaves nothing behind.
pub struct TaskStore {
    backend: Box<dyn TaskBackend + Send>,
    snapshot: watch::Sender<Arc<TaskSnapshot>>,
    selection: SelectionState,
}

fn validate_text(value: &str, what: &str) -> InternalResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(InternalError::invalid_argument(format!("{} must not be empty", what)));
    }

    Ok(value.to_string())
}

impl TaskStore {
    pub fn load(backend: impl TaskBackend + Send + 'static) -> InternalResult<TaskStore> {
        let snapshot = TaskSnapshot {
            revision: 0,
            tasks: backend.load_tasks()?,
            categories: backend.load_categories()?,
        };
        tracing::info!(
            tasks = snapshot.tasks.len(),
            categories = snapshot.categories.len(),
            "loaded task store"
        );

        let (sender, _) = watch::channel(Arc::new(snapshot));

        Ok(TaskStore {
            backend: Box::new(backend),
            snapshot: sender,
            selection: SelectionState::default(),
        })
    }

    pub fn snapshot(&self) -> Arc<TaskSnapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.snapshot().tasks.clone()
    }

    pub fn categories(&self) -> Vec<Category> {
        self.snapshot().categories.clone()
    }

    pub fn task(&self, task_id: &str) -> InternalResult<Task> {
        self.snapshot()
            .tasks
            .iter()
            .find(|task| task.id == task_id)
            .cloned()
            .ok_or_else(|| InternalError::task_not_found(task_id))
    }

    pub fn archived_tasks(&self) -> Vec<Task> {
        self.snapshot()
            .tasks
            .iter()
            .filter(|task| task.archived)
            .cloned()
            .collect()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<TaskSnapshot>> {
        self.snapshot.subscribe()
    }

    fn publish(&mut self, tasks: Vec<Task>, categories: Vec<Category>) {
        let revision = self.snapshot.borrow().revision + 1;
        self.snapshot.send_replace(Arc::new(TaskSnapshot {
            revision,
            tasks,
            categories,
        }));
        tracing::debug!(revision, "published task snapshot");
    }

    pub fn add_task(&mut self, new_task: NewTask, now: DateTime<Utc>) -> InternalResult<Task> {
        let mut task = Task::new(
            Uuid::new_v4().to_string(),
            validate_text(&new_task.title, "task title")?,
            now,
        );
        task.category_id = new_task.category_id;
        task.due_date = new_task.due_date;

        self.backend.insert_task(&task)?;
        tracing::info!(task_id = %task.id, "added task");

        let current = self.snapshot();
        let mut tasks = current.tasks.clone();
        tasks.push(task.clone());
        self.publish(tasks, current.categories.clone());

        Ok(task)
    }

    fn modify_task(&mut self, task_id: &str, edit: impl FnOnce(&mut Task)) -> InternalResult<Task> {
        let current = self.snapshot();
        let mut tasks = current.tasks.clone();

        let task = tasks
            .iter_mut()
            .find(|task| task.id == task_id)
            .ok_or_else(|| InternalError::task_not_found(task_id))?;
        edit(task);
        self.backend.update_task(task)?;
        let updated = task.clone();

        self.publish(tasks, current.categories.clone());

        Ok(updated)
    }

    pub fn update_task(&mut self, update: TaskUpdate) -> InternalResult<Task> {
        let title = match &update.title {
            Some(title) => Some(validate_text(title, "task title")?),
            None => None,
        };

        let task = self.modify_task(&update.task_id, |task| {
            if let Some(title) = title {
                task.title = title;
            }
            if let Some(category_id) = update.category_id {
                task.category_id = category_id;
            }
            if let Some(due_date) = update.due_date {
                task.due_date = due_date;
            }
        })?;
        tracing::info!(task_id = %task.id, "updated task");

        Ok(task)
    }

    pub fn set_completed(
        &mut self,
        task_id: &str,
        completed: bool,
        now: DateTime<Utc>,
    ) -> InternalResult<Task> {
        let task = self.modify_task(task_id, |task| task.set_completed(completed, now))?;
        tracing::info!(task_id = %task.id, completed, "set task completion");

        Ok(task)
    }

    pub fn toggle_completed(&mut self, task_id: &str, now: DateTime<Utc>) -> InternalResult<Task> {
        let completed = self.task(task_id)?.completed;

        self.set_completed(task_id, !completed, now)
    }

    pub fn set_archived(&mut self, task_id: &str, archived: bool) -> InternalResult<Task> {
        let task = self.modify_task(task_id, |task| task.archived = archived)?;
        tracing::info!(task_id = %task.id, archived, "set task archival");

        Ok(task)
    }

    pub fn toggle_archived(&mut self, task_id: &str) -> InternalResult<Task> {
        let archived = self.task(task_id)?.archived;

        self.set_archived(task_id, !archived)
    }

    pub fn add_category(&mut self, new_category: NewCategory) -> InternalResult<Category> {
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: validate_text(&new_category.name, "category name")?,
            color: new_category.color,
            icon: new_category.icon,
        };

        self.backend.insert_category(&category)?;
        tracing::info!(category_id = %category.id, name = %category.name, "added category");

        let current = self.snapshot();
        let mut categories = current.categories.clone();
        categories.push(category.clone());
        self.publish(current.tasks.clone(), categories);

        Ok(category)
    }

    /// Removes the category only. Tasks that point at it keep their
    /// `category_id`.
    pub fn delete_category(&mut self, category_id: &str) -> InternalResult<()> {
        self.backend.delete_category(category_id)?;
        tracing::info!(category_id, "deleted category");

        let current = self.snapshot();
        let categories = current
            .categories
            .iter()
            .filter(|category| category.id != category_id)
            .cloned()
            .collect();
        self.publish(current.tasks.clone(), categories);

        Ok(())
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn set_selected_category(&mut self, filter: CategoryFilter) -> &SelectionState {
        self.selection.set_selected_category(filter);
        &self.selection
    }

    pub fn set_search_query(&mut self, query: &str) -> &SelectionState {
        self.selection.set_search_query(query);
        &self.selection
    }
}
