//! JSON dump of the whole store, keyed by course id in store order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::models::{Course, Lecture};
use crate::store::CourseStore;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CourseEntryRef<'a> {
    title: &'a str,
    lectures: &'a [Lecture],
    is_pinned: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CourseEntry {
    title: String,
    #[serde(default)]
    lectures: Vec<Lecture>,
    #[serde(default)]
    is_pinned: bool,
}

pub fn dump(store: &CourseStore) -> Result<Value, AppError> {
    let mut courses = Map::new();
    for course in store.courses() {
        let entry = CourseEntryRef {
            title: &course.title,
            lectures: &course.lectures,
            is_pinned: course.is_pinned,
        };
        courses.insert(course.id.clone(), serde_json::to_value(entry)?);
    }
    Ok(Value::Object(courses))
}

pub fn to_json_string(store: &CourseStore) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(&dump(store)?)?)
}

/// Reads a document produced by [`dump`].
pub fn load(text: &str) -> Result<CourseStore, AppError> {
    let entries: Map<String, Value> = serde_json::from_str(text)?;
    let courses = entries
        .into_iter()
        .map(|(id, value)| {
            let entry: CourseEntry = serde_json::from_value(value)?;
            Ok(Course {
                id,
                title: entry.title,
                lectures: entry.lectures,
                is_pinned: entry.is_pinned,
            })
        })
        .collect::<Result<Vec<_>, serde_json::Error>>()?;
    Ok(CourseStore::from_courses(courses))
}

pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("lecturemark-{}.json", now.format("%Y%m%dT%H%M%SZ"))
}
