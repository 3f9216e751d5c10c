use chrono::{Local, Utc};
use rocket::response::stream::{Event, EventStream};
use rocket::serde::json::Json;
use tokio::select;
use rocket::{get, post, Shutdown, State};

use crate::data::SharedStore;
use crate::internal_error::InternalResult;
use crate::stats::data::*;
use crate::stats::engine::{category_overview, compute_stats, daily_summary};
use crate::stats::selection::SelectionState;

use super::data::*;

#[get("/get_tasks")]
pub fn get_tasks(store: &State<SharedStore>) -> InternalResult<Json<Vec<Task>>> {
    let store = store.lock()?;

    Ok(Json(store.tasks()))
}

#[get("/get_archived_tasks")]
pub fn get_archived_tasks(store: &State<SharedStore>) -> InternalResult<Json<Vec<Task>>> {
    let store = store.lock()?;

    Ok(Json(store.archived_tasks()))
}

#[get("/get_categories")]
pub fn get_categories(store: &State<SharedStore>) -> InternalResult<Json<Vec<Category>>> {
    let store = store.lock()?;

    Ok(Json(store.categories()))
}

#[post("/add_task", format = "json", data = "<new_task>")]
pub fn add_task(
    new_task: Json<NewTask>,
    store: &State<SharedStore>,
) -> InternalResult<Json<AddTaskResult>> {
    let mut store = store.lock()?;

    let task = store.add_task(new_task.into_inner(), Utc::now())?;

    Ok(Json(AddTaskResult { task_id: task.id }))
}

#[post("/update_task", format = "json", data = "<update>")]
pub fn update_task(
    update: Json<TaskUpdate>,
    store: &State<SharedStore>,
) -> InternalResult<Json<Task>> {
    let mut store = store.lock()?;

    store.update_task(update.into_inner()).map(Json)
}

#[post("/toggle_completed", format = "json", data = "<request>")]
pub fn toggle_completed(
    request: Json<TaskIDRequest>,
    store: &State<SharedStore>,
) -> InternalResult<Json<Task>> {
    let mut store = store.lock()?;

    store.toggle_completed(&request.task_id, Utc::now()).map(Json)
}

#[post("/toggle_archived", format = "json", data = "<request>")]
pub fn toggle_archived(
    request: Json<TaskIDRequest>,
    store: &State<SharedStore>,
) -> InternalResult<Json<Task>> {
    let mut store = store.lock()?;

    store.toggle_archived(&request.task_id).map(Json)
}

#[post("/add_category", format = "json", data = "<new_category>")]
pub fn add_category(
    new_category: Json<NewCategory>,
    store: &State<SharedStore>,
) -> InternalResult<Json<AddCategoryResult>> {
    let mut store = store.lock()?;

    let category = store.add_category(new_category.into_inner())?;

    Ok(Json(AddCategoryResult {
        category_id: category.id,
    }))
}

#[post("/delete_category", format = "json", data = "<request>")]
pub fn delete_category(
    request: Json<DeleteCategoryRequest>,
    store: &State<SharedStore>,
) -> InternalResult<()> {
    let mut store = store.lock()?;

    store.delete_category(&request.category_id)
}

#[get("/get_selection")]
pub fn get_selection(store: &State<SharedStore>) -> InternalResult<Json<SelectionState>> {
    let store = store.lock()?;

    Ok(Json(store.selection().clone()))
}

#[post("/set_selected_category", format = "json", data = "<request>")]
pub fn set_selected_category(
    request: Json<SetSelectedCategoryRequest>,
    store: &State<SharedStore>,
) -> InternalResult<Json<SelectionState>> {
    let mut store = store.lock()?;

    let selection = store.set_selected_category(request.into_inner().category_id);

    Ok(Json(selection.clone()))
}

#[post("/set_search_query", format = "json", data = "<request>")]
pub fn set_search_query(
    request: Json<SetSearchQueryRequest>,
    store: &State<SharedStore>,
) -> InternalResult<Json<SelectionState>> {
    let mut store = store.lock()?;

    let selection = store.set_search_query(&request.query);

    Ok(Json(selection.clone()))
}

#[get("/get_visible_tasks")]
pub fn get_visible_tasks(store: &State<SharedStore>) -> InternalResult<Json<Vec<Task>>> {
    let store = store.lock()?;
    let snapshot = store.snapshot();

    let visible = store
        .selection()
        .visible_tasks(&snapshot.tasks)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(visible))
}

#[get("/get_selection_stats")]
pub fn get_selection_stats(store: &State<SharedStore>) -> InternalResult<Json<CategoryStats>> {
    let store = store.lock()?;
    let snapshot = store.snapshot();

    Ok(Json(store.selection().stats(&snapshot.tasks)))
}

/// Stats for "all" and each category. `search` overrides the stored search
/// query for this request only.
#[get("/get_category_stats?<search>")]
pub fn get_category_stats(
    search: Option<&str>,
    store: &State<SharedStore>,
) -> InternalResult<Json<CategoryOverview>> {
    let store = store.lock()?;
    let snapshot = store.snapshot();
    let search = search.unwrap_or(&store.selection().search_query);

    Ok(Json(category_overview(
        &snapshot.tasks,
        &snapshot.categories,
        search,
    )))
}

#[get("/get_daily_summary")]
pub fn get_daily_summary(store: &State<SharedStore>) -> InternalResult<Json<DailySummary>> {
    let store = store.lock()?;
    let snapshot = store.snapshot();

    Ok(Json(daily_summary(&snapshot.tasks, &Local::now())))
}

#[post("/compute_stats", format = "json", data = "<request>")]
pub fn compute_stats_for(request: Json<ComputeStatsRequest>) -> Json<CategoryStats> {
    Json(compute_stats(
        &request.tasks,
        &request.category_id,
        &request.search_query,
    ))
}

#[get("/events")]
pub fn task_events(
    store: &State<SharedStore>,
    mut shutdown: Shutdown,
) -> InternalResult<EventStream![]> {
    let mut receiver = store.lock()?.subscribe();

    Ok(EventStream! {
        loop {
            select! {
                changed = receiver.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = &mut shutdown => break,
            }

            let snapshot = receiver.borrow_and_update().clone();
            yield Event::json(&*snapshot).event("snapshot");
        }
    })
}
