use chrono::{DateTime, TimeZone, Utc};

use super::data::*;
use crate::tasks::data::{Category, Task};

/// Whether `task` belongs to the view described by `filter` and
/// `search_query`. Archived tasks never match.
pub fn matches(task: &Task, filter: &CategoryFilter, search_query: &str) -> bool {
    if task.archived {
        return false;
    }

    let in_category = match filter {
        CategoryFilter::All => true,
        CategoryFilter::Category(id) => task.category_id.as_deref() == Some(id.as_str()),
    };

    in_category
        && (search_query.is_empty()
            || task
                .title
                .to_lowercase()
                .contains(&search_query.to_lowercase()))
}

pub fn compute_stats(tasks: &[Task], filter: &CategoryFilter, search_query: &str) -> CategoryStats {
    let (total, completed) = tasks
        .iter()
        .filter(|task| matches(task, filter, search_query))
        .fold((0, 0), |(total, completed), task| {
            (total + 1, completed + usize::from(task.completed))
        });

    CategoryStats {
        total,
        completed,
        active: total - completed,
        progress: progress_percent(completed, total),
    }
}

// Rounds half up, matching how the progress ring has always displayed it.
fn progress_percent(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }

    ((completed * 200 + total) / (2 * total)) as u32
}

pub fn category_overview(
    tasks: &[Task],
    categories: &[Category],
    search_query: &str,
) -> CategoryOverview {
    CategoryOverview {
        all: compute_stats(tasks, &CategoryFilter::All, search_query),
        categories: categories
            .iter()
            .map(|category| CategoryEntry {
                category: category.clone(),
                stats: compute_stats(
                    tasks,
                    &CategoryFilter::Category(category.id.clone()),
                    search_query,
                ),
            })
            .collect(),
    }
}

/// Counts for the "today" panel. Calendar dates are taken in `now`'s time
/// zone; a task due later today is not overdue yet.
pub fn daily_summary<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>) -> DailySummary {
    let zone = now.timezone();
    let today = now.date_naive();
    let now_utc = now.with_timezone(&Utc);

    let on_today = |date: &DateTime<Utc>| date.with_timezone(&zone).date_naive() == today;

    let mut summary = DailySummary::default();

    for task in tasks {
        if task.completed && task.completed_at.as_ref().is_some_and(on_today) {
            summary.completed_today += 1;
        }

        if !task.is_active() {
            continue;
        }

        summary.active += 1;

        if let Some(due_date) = &task.due_date {
            if *due_date < now_utc && !on_today(due_date) {
                summary.overdue += 1;
            }
        }
    }

    summary
}
