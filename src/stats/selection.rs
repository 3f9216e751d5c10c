use serde::Serialize;

use super::data::{CategoryFilter, CategoryStats};
use super::engine::{compute_stats, matches};
use crate::tasks::data::Task;

/// The category the user has selected and what they are searching for.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub category_id: CategoryFilter,
    pub search_query: String,
}

impl SelectionState {
    /// Replaces the selection. Ids that name no category are accepted and
    /// simply select nothing.
    pub fn set_selected_category(&mut self, filter: CategoryFilter) {
        self.category_id = filter;
    }

    pub fn set_search_query(&mut self, query: &str) {
        self.search_query = query.trim().to_string();
    }

    pub fn visible_tasks<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks
            .iter()
            .filter(|task| matches(task, &self.category_id, &self.search_query))
            .collect()
    }

    pub fn stats(&self, tasks: &[Task]) -> CategoryStats {
        compute_stats(tasks, &self.category_id, &self.search_query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn tasks() -> Vec<Task> {
        let created = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();
        let mut run = Task::new("1".to_string(), "Morning run".to_string(), created);
        run.category_id = Some("health".to_string());
        let mut report = Task::new("2".to_string(), "Quarterly report".to_string(), created);
        report.category_id = Some("work".to_string());
        report.set_completed(true, created);
        let mut archived = Task::new("3".to_string(), "Old run".to_string(), created);
        archived.category_id = Some("health".to_string());
        archived.archived = true;

        vec![run, report, archived]
    }

    #[test]
    fn defaults_to_everything() {
        let selection = SelectionState::default();
        assert_eq!(selection.category_id, CategoryFilter::All);

        let tasks = tasks();
        let visible: Vec<&str> = selection
            .visible_tasks(&tasks)
            .iter()
            .map(|task| task.id.as_str())
            .collect();
        assert_eq!(visible, vec!["1", "2"]);
    }

    #[test]
    fn visible_tasks_agree_with_stats() {
        let tasks = tasks();
        let mut selection = SelectionState::default();
        selection.set_selected_category(CategoryFilter::Category("health".to_string()));
        selection.set_search_query("  RUN ");

        assert_eq!(selection.search_query, "RUN");
        assert_eq!(selection.visible_tasks(&tasks).len(), 1);
        assert_eq!(selection.stats(&tasks).total, 1);
    }

    #[test]
    fn unknown_category_selects_nothing() {
        let tasks = tasks();
        let mut selection = SelectionState::default();
        selection.set_selected_category(CategoryFilter::Category("gone".to_string()));

        assert!(selection.visible_tasks(&tasks).is_empty());
        assert_eq!(selection.stats(&tasks), CategoryStats::default());
    }
}
