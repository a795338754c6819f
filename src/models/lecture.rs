use serde::{Deserialize, Serialize};

use crate::models::{Anchor, GlobalAnchor};
use crate::timestamp::TimeFormat;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lecture {
    pub id: String,
    pub title: String,
    pub date: String,
    #[serde(default)]
    pub is_favorited: bool,
    #[serde(default)]
    pub has_notification: bool,
    #[serde(default)]
    pub is_live: bool,
    #[serde(default)]
    pub video_id: String,
    #[serde(default)]
    pub anchors: Vec<Anchor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_anchors: Option<Vec<GlobalAnchor>>,
    /// Reported by the player once the video is ready.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
}

impl Lecture {
    pub fn time_format(&self) -> TimeFormat {
        TimeFormat::for_duration(self.duration_seconds)
    }

    pub fn is_unwatched(&self) -> bool {
        self.has_notification || self.is_live
    }

    pub fn global_anchors(&self) -> &[GlobalAnchor] {
        self.global_anchors.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLectureRequest {
    pub id: Option<String>,
    pub title: String,
    pub date: String,
    pub is_favorited: Option<bool>,
    #[serde(default)]
    pub has_notification: bool,
    #[serde(default)]
    pub is_live: bool,
    pub video_id: Option<String>,
    pub anchors: Option<Vec<Anchor>>,
    pub global_anchors: Option<Vec<GlobalAnchor>>,
}

impl NewLectureRequest {
    pub fn new(title: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            date: date.into(),
            is_favorited: None,
            has_notification: false,
            is_live: false,
            video_id: None,
            anchors: None,
            global_anchors: None,
        }
    }

    /// Missing fields default to not favorited, no anchors and an empty video id.
    pub fn into_lecture(self, id: String) -> Lecture {
        Lecture {
            id,
            title: self.title,
            date: self.date,
            is_favorited: self.is_favorited.unwrap_or(false),
            has_notification: self.has_notification,
            is_live: self.is_live,
            video_id: self.video_id.unwrap_or_default(),
            anchors: self.anchors.unwrap_or_default(),
            global_anchors: self.global_anchors,
            duration_seconds: None,
        }
    }
}

/// Shallow partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLectureRequest {
    pub title: Option<String>,
    pub date: Option<String>,
    pub is_favorited: Option<bool>,
    pub has_notification: Option<bool>,
    pub is_live: Option<bool>,
    pub video_id: Option<String>,
}
