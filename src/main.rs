use rocket::figment::Figment;
use rocket::fs::FileServer;
use rocket::{Build, Rocket};
use tracing_subscriber::EnvFilter;

use std::error::Error;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

mod config;
mod data;
mod internal_error;
mod stats;
mod tasks;


use config::AppConfig;
use tasks::endpoints;
use tasks::helpers::SqliteBackend;
use tasks::store::TaskStore;

#[macro_use]
extern crate rocket;

fn build_rocket(figment: Figment, store: TaskStore, static_dir: Option<PathBuf>) -> Rocket<Build> {
    let rocket = rocket::custom(figment)
        .manage(Arc::new(Mutex::new(store)))
        .mount(
            "/api",
            routes![
                endpoints::get_tasks,
                endpoints::get_archived_tasks,
                endpoints::get_categories,
                endpoints::add_task,
                endpoints::update_task,
                endpoints::toggle_completed,
                endpoints::toggle_archived,
                endpoints::add_category,
                endpoints::delete_category,
                endpoints::get_selection,
                endpoints::set_selected_category,
                endpoints::set_search_query,
                endpoints::get_visible_tasks,
                endpoints::get_selection_stats,
                endpoints::get_category_stats,
                endpoints::get_daily_summary,
                endpoints::compute_stats_for,
                endpoints::task_events,
            ],
        );

    match static_dir {
        Some(dir) if dir.is_dir() => rocket.mount("/", FileServer::from(dir).rank(15)),
        Some(dir) => {
            tracing::warn!(path = %dir.display(), "static directory not found, web client not served");
            rocket
        }
        None => rocket,
    }
}

#[rocket::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let figment = rocket::Config::figment();
    let config = AppConfig::from_figment(&figment)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    let store = TaskStore::load(SqliteBackend::open(&config.database_path)?)?;
    tracing::info!(database = %config.database_path.display(), "starting taskboard");

    build_rocket(figment, store, config.static_dir).launch().await?;

    Ok(())
}
