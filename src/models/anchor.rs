use serde::{Deserialize, Serialize};

use crate::timestamp::{TimeFormat, format_timestamp, to_seconds};

/// A personal timestamped note on a lecture video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anchor {
    pub id: String,
    pub title: String,
    pub timestamp: String,
    pub timestamp_seconds: u32,
    pub description: String,
}

/// A shared note, attributed to an author and open to votes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalAnchor {
    #[serde(flatten)]
    pub anchor: Anchor,
    pub author: String,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub dislikes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineEntry {
    Personal(Anchor),
    Global(GlobalAnchor),
}

impl TimelineEntry {
    pub fn anchor(&self) -> &Anchor {
        match self {
            TimelineEntry::Personal(anchor) => anchor,
            TimelineEntry::Global(global) => &global.anchor,
        }
    }

    pub fn timestamp_seconds(&self) -> u32 {
        self.anchor().timestamp_seconds
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vote {
    Like,
    Dislike,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnchorRequest {
    pub title: String,
    #[serde(default)]
    pub hours: u32,
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub seconds: u32,
    pub description: String,
}

impl NewAnchorRequest {
    pub fn timestamp_seconds(&self) -> u32 {
        to_seconds(self.hours, self.minutes, self.seconds)
    }

    /// The display string uses the long form until the store applies the
    /// lecture's own format.
    pub fn into_anchor(self, id: String) -> Anchor {
        let timestamp_seconds = self.timestamp_seconds();
        Anchor {
            id,
            title: self.title,
            timestamp: format_timestamp(timestamp_seconds, TimeFormat::Long),
            timestamp_seconds,
            description: self.description,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAnchorRequest {
    pub title: Option<String>,
    pub timestamp_seconds: Option<u32>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGlobalAnchorRequest {
    #[serde(flatten)]
    pub anchor: NewAnchorRequest,
    pub author: String,
    /// Also keep a personal copy of the note.
    #[serde(default)]
    pub also_personal: bool,
}

impl NewGlobalAnchorRequest {
    pub fn into_global_anchor(self, id: String) -> GlobalAnchor {
        GlobalAnchor {
            anchor: self.anchor.into_anchor(id),
            author: self.author,
            likes: 0,
            dislikes: 0,
        }
    }
}
