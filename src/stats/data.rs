use serde::{Deserialize, Serialize};

use crate::tasks::data::{Category, CategoryID, Task};

pub const ALL_CATEGORIES: &str = "all";

/// Which category a view is scoped to. On the wire this is the bare category
/// id, or `"all"`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(from = "String", into = "String")]
pub enum CategoryFilter {
    #[default]
    All,
    Category(CategoryID),
}

impl From<String> for CategoryFilter {
    fn from(id: String) -> CategoryFilter {
        if id == ALL_CATEGORIES {
            CategoryFilter::All
        } else {
            CategoryFilter::Category(id)
        }
    }
}

impl From<CategoryFilter> for String {
    fn from(filter: CategoryFilter) -> String {
        match filter {
            CategoryFilter::All => ALL_CATEGORIES.to_string(),
            CategoryFilter::Category(id) => id,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CategoryStats {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
    pub progress: u32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CategoryEntry {
    pub category: Category,
    pub stats: CategoryStats,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CategoryOverview {
    pub all: CategoryStats,
    pub categories: Vec<CategoryEntry>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DailySummary {
    pub completed_today: usize,
    pub active: usize,
    pub overdue: usize,
}

#[derive(Deserialize, Debug)]
pub struct ComputeStatsRequest {
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub category_id: CategoryFilter,
    #[serde(default)]
    pub search_query: String,
}

#[derive(Deserialize, Debug)]
pub struct SetSelectedCategoryRequest {
    pub category_id: CategoryFilter,
}
