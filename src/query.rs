//! Read-only projections over a store snapshot: search, filters, ordering.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Anchor, Course, GlobalAnchor, Lecture};
use crate::render::RichTextRenderer;
use crate::store::CourseStore;
use crate::timestamp::TimeFormat;

/// Filter flags. An unset flag never excludes anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(default)]
    pub show_live: bool,
    #[serde(default)]
    pub show_unwatched: bool,
}

impl SearchFilters {
    fn admits(&self, is_live: bool, is_unwatched: bool) -> bool {
        (!self.show_live || is_live) && (!self.show_unwatched || is_unwatched)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub id: String,
    pub title: String,
    pub is_pinned: bool,
    pub is_live: bool,
    pub notifications: usize,
    pub has_unwatched_content: bool,
    pub lecture_count: usize,
}

impl From<&Course> for CourseSummary {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id.clone(),
            title: course.title.clone(),
            is_pinned: course.is_pinned,
            is_live: course.has_live_lecture(),
            notifications: course.notification_count(),
            has_unwatched_content: course.has_unwatched_content(),
            lecture_count: course.lectures.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LectureSummary {
    pub id: String,
    pub title: String,
    pub date: String,
    pub is_favorited: bool,
    pub has_notification: bool,
    pub is_live: bool,
    pub video_id: String,
    pub anchor_count: usize,
}

impl From<&Lecture> for LectureSummary {
    fn from(lecture: &Lecture) -> Self {
        Self {
            id: lecture.id.clone(),
            title: lecture.title.clone(),
            date: lecture.date.clone(),
            is_favorited: lecture.is_favorited,
            has_notification: lecture.has_notification,
            is_live: lecture.is_live,
            video_id: lecture.video_id.clone(),
            anchor_count: lecture.anchors.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteLecture {
    pub course_id: String,
    pub course_title: String,
    #[serde(flatten)]
    pub lecture: LectureSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedAnchor {
    #[serde(flatten)]
    pub anchor: Anchor,
    pub description_html: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedGlobalAnchor {
    #[serde(flatten)]
    pub anchor: RenderedAnchor,
    pub author: String,
    pub likes: u32,
    pub dislikes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LectureDetail {
    pub course_id: String,
    pub course_title: String,
    #[serde(flatten)]
    pub lecture: LectureSummary,
    pub duration_seconds: Option<u32>,
    pub time_format: TimeFormat,
    pub anchors: Vec<RenderedAnchor>,
    pub global_anchors: Vec<RenderedGlobalAnchor>,
}

fn matches_query(query: &str, fields: &[&str]) -> bool {
    let needle = query.to_lowercase();
    needle.is_empty() || fields.iter().any(|f| f.to_lowercase().contains(&needle))
}

fn lecture_matches(lecture: &Lecture, query: &str, filters: SearchFilters) -> bool {
    matches_query(query, &[lecture.title.as_str()]) && filters.admits(lecture.is_live, lecture.is_unwatched())
}

/// Courses matching the query by id or title, pinned ones first. Relative
/// order within the pinned and unpinned groups is the store order.
pub fn search_courses(store: &CourseStore, query: &str, filters: SearchFilters) -> Vec<CourseSummary> {
    let (pinned, unpinned): (Vec<CourseSummary>, Vec<CourseSummary>) = store
        .courses()
        .iter()
        .filter(|c| matches_query(query, &[c.id.as_str(), c.title.as_str()]))
        .filter(|c| filters.admits(c.has_live_lecture(), c.has_unwatched_content()))
        .map(CourseSummary::from)
        .partition(|c| c.is_pinned);

    pinned.into_iter().chain(unpinned).collect()
}

/// Reads `YYYY-MM-DD` when the string contains a dash, `DD.MM.YYYY` otherwise.
pub fn parse_lecture_date(date: &str) -> Option<NaiveDate> {
    let date = date.trim();
    if date.contains('-') {
        NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
    } else {
        NaiveDate::parse_from_str(date, "%d.%m.%Y").ok()
    }
}

/// Newest first; equal dates order titles in reverse. Unparseable dates go last.
pub fn compare_lectures(a: &Lecture, b: &Lecture) -> Ordering {
    parse_lecture_date(&b.date)
        .cmp(&parse_lecture_date(&a.date))
        .then_with(|| b.title.cmp(&a.title))
}

pub fn search_lectures(course: &Course, query: &str, filters: SearchFilters) -> Vec<LectureSummary> {
    let mut lectures: Vec<&Lecture> = course
        .lectures
        .iter()
        .filter(|l| lecture_matches(l, query, filters))
        .collect();
    lectures.sort_by(|a, b| compare_lectures(a, b));
    lectures.into_iter().map(LectureSummary::from).collect()
}

/// Favorited lectures across all courses, in store order.
pub fn favorite_lectures(store: &CourseStore, query: &str, filters: SearchFilters) -> Vec<FavoriteLecture> {
    store
        .courses()
        .iter()
        .flat_map(|course| {
            course
                .lectures
                .iter()
                .filter(|l| l.is_favorited)
                .map(move |l| (course, l))
        })
        .filter(|(_, l)| lecture_matches(l, query, filters))
        .map(|(course, l)| FavoriteLecture {
            course_id: course.id.clone(),
            course_title: course.title.clone(),
            lecture: LectureSummary::from(l),
        })
        .collect()
}

fn render_anchor(anchor: &Anchor, renderer: &dyn RichTextRenderer) -> RenderedAnchor {
    RenderedAnchor {
        anchor: anchor.clone(),
        description_html: renderer.render(&anchor.description),
    }
}

fn render_global_anchor(global: &GlobalAnchor, renderer: &dyn RichTextRenderer) -> RenderedGlobalAnchor {
    RenderedGlobalAnchor {
        anchor: render_anchor(&global.anchor, renderer),
        author: global.author.clone(),
        likes: global.likes,
        dislikes: global.dislikes,
    }
}

pub fn lecture_detail(
    store: &CourseStore,
    course_id: &str,
    lecture_id: &str,
    renderer: &dyn RichTextRenderer,
) -> Option<LectureDetail> {
    let course = store.course(course_id)?;
    let lecture = course.lecture(lecture_id)?;

    Some(LectureDetail {
        course_id: course.id.clone(),
        course_title: course.title.clone(),
        lecture: LectureSummary::from(lecture),
        duration_seconds: lecture.duration_seconds,
        time_format: lecture.time_format(),
        anchors: lecture
            .anchors
            .iter()
            .map(|a| render_anchor(a, renderer))
            .collect(),
        global_anchors: lecture
            .global_anchors()
            .iter()
            .map(|g| render_global_anchor(g, renderer))
            .collect(),
    })
}
