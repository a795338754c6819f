//! Vertical placement of anchors along a lecture's video timeline.

use serde::Serialize;

use crate::models::{Lecture, TimelineEntry};

/// Lowest position, in percent, so markers at the very start are not clipped.
pub const POSITION_FLOOR: f64 = 4.0;
/// Entries closer than this many percentage points share a cluster.
pub const PROXIMITY_THRESHOLD: f64 = 12.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedEntry {
    pub position: f64,
    pub entry: TimelineEntry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineCluster {
    /// Position of the first entry in the cluster.
    pub position: f64,
    pub entries: Vec<PositionedEntry>,
}

/// `max(4, seconds / duration * 100)`, capped at 100 so anchors recorded past
/// the reported duration stay on the track. An unknown (zero) duration places
/// everything at the floor.
pub fn position_percent(timestamp_seconds: u32, duration_seconds: u32) -> f64 {
    let raw = if duration_seconds == 0 {
        0.0
    } else {
        f64::from(timestamp_seconds) * 100.0 / f64::from(duration_seconds)
    };
    raw.clamp(POSITION_FLOOR, 100.0)
}

/// Groups entries in the order given. An entry joins the open cluster when it
/// sits within [`PROXIMITY_THRESHOLD`] of that cluster's first entry.
pub fn group_by_proximity(entries: Vec<TimelineEntry>, duration_seconds: u32) -> Vec<TimelineCluster> {
    let mut clusters: Vec<TimelineCluster> = Vec::new();

    for entry in entries {
        let position = position_percent(entry.timestamp_seconds(), duration_seconds);
        let positioned = PositionedEntry { position, entry };

        match clusters.last_mut() {
            Some(cluster) if (position - cluster.position).abs() < PROXIMITY_THRESHOLD => {
                cluster.entries.push(positioned);
            }
            _ => clusters.push(TimelineCluster {
                position,
                entries: vec![positioned],
            }),
        }
    }

    clusters
}

/// Clusters either the personal or the global anchors of a lecture, ordered
/// by time.
pub fn lecture_timeline(lecture: &Lecture, show_global: bool) -> Vec<TimelineCluster> {
    let mut entries: Vec<TimelineEntry> = if show_global {
        lecture
            .global_anchors()
            .iter()
            .cloned()
            .map(TimelineEntry::Global)
            .collect()
    } else {
        lecture
            .anchors
            .iter()
            .cloned()
            .map(TimelineEntry::Personal)
            .collect()
    };
    entries.sort_by_key(TimelineEntry::timestamp_seconds);

    group_by_proximity(entries, lecture.duration_seconds.unwrap_or(0))
}
