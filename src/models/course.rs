use serde::{Deserialize, Serialize};

use crate::models::Lecture;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub lectures: Vec<Lecture>,
    #[serde(default)]
    pub is_pinned: bool,
}

impl Course {
    pub fn new(id: impl Into<String>, title: impl Into<String>, is_pinned: bool) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            lectures: Vec::new(),
            is_pinned,
        }
    }

    pub fn lecture(&self, lecture_id: &str) -> Option<&Lecture> {
        self.lectures.iter().find(|l| l.id == lecture_id)
    }

    pub fn lecture_mut(&mut self, lecture_id: &str) -> Option<&mut Lecture> {
        self.lectures.iter_mut().find(|l| l.id == lecture_id)
    }

    pub fn has_live_lecture(&self) -> bool {
        self.lectures.iter().any(|l| l.is_live)
    }

    pub fn notification_count(&self) -> usize {
        self.lectures.iter().filter(|l| l.has_notification).count()
    }

    /// Unwatched content means a pending notification or a live lecture.
    pub fn has_unwatched_content(&self) -> bool {
        self.notification_count() > 0 || self.has_live_lecture()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourseRequest {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub is_pinned: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub is_pinned: Option<bool>,
}
