use std::path::Path;

use tracing::info;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::export;
use crate::store::CourseStore;

const DEMO_SNAPSHOT: &str = include_str!("../../seed/courses.json");

/// The bundled demo courses.
pub fn demo_store() -> Result<CourseStore, AppError> {
    export::load(DEMO_SNAPSHOT)
}

/// Loads a snapshot previously written by the export endpoint.
pub fn store_from_file(path: &Path) -> Result<CourseStore, AppError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        AppError::BadRequest(format!("Failed to read seed file {}: {}", path.display(), e))
    })?;
    let store = export::load(&text)?;
    info!(
        "seeded {} courses from {}",
        store.courses().len(),
        path.display()
    );
    Ok(store)
}

/// The store the server starts with: a configured snapshot file, the demo
/// courses, or nothing.
pub fn initial_store(config: &AppConfig) -> Result<CourseStore, AppError> {
    if let Some(path) = &config.seed_file {
        return store_from_file(path);
    }
    if config.seed_demo_data {
        let store = demo_store()?;
        info!("seeded {} demo courses", store.courses().len());
        return Ok(store);
    }
    Ok(CourseStore::new())
}
