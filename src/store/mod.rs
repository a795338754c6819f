pub mod seed;

use tracing::{debug, warn};

use crate::models::{
    Anchor, Course, GlobalAnchor, Lecture, NewCourseRequest, UpdateAnchorRequest, UpdateCourseRequest,
    UpdateLectureRequest, Vote,
};
use crate::timestamp::format_timestamp;

/// In-memory owner of the course -> lecture -> anchor graph.
///
/// Every operation is total: an unknown course or lecture id leaves the store
/// untouched and is reported through the return value (`None` / `false`),
/// never as an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseStore {
    courses: Vec<Course>,
}

impl CourseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a course list. A repeated course id, or a repeated
    /// lecture id within one course, replaces the earlier entry in place.
    pub fn from_courses(courses: impl IntoIterator<Item = Course>) -> Self {
        let mut store = Self::new();
        for mut course in courses {
            course.lectures = dedup_lectures(&course.id, course.lectures);
            for lecture in &mut course.lectures {
                normalize_anchors(lecture);
            }
            store.upsert(course);
        }
        store
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    pub fn course(&self, id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }

    fn course_mut(&mut self, id: &str) -> Option<&mut Course> {
        self.courses.iter_mut().find(|c| c.id == id)
    }

    pub fn lecture(&self, course_id: &str, lecture_id: &str) -> Option<&Lecture> {
        self.course(course_id)?.lecture(lecture_id)
    }

    fn lecture_mut(&mut self, course_id: &str, lecture_id: &str) -> Option<&mut Lecture> {
        self.course_mut(course_id)?.lecture_mut(lecture_id)
    }

    fn upsert(&mut self, course: Course) -> Option<Course> {
        match self.courses.iter_mut().find(|c| c.id == course.id) {
            Some(slot) => Some(std::mem::replace(slot, course)),
            None => {
                self.courses.push(course);
                None
            }
        }
    }

    /// Returns the new pinned flag.
    pub fn toggle_course_pin(&mut self, course_id: &str) -> Option<bool> {
        let course = self.course_mut(course_id)?;
        course.is_pinned = !course.is_pinned;
        debug!("toggled course pin: {} -> {}", course_id, course.is_pinned);
        Some(course.is_pinned)
    }

    /// Returns the new favorited flag.
    pub fn toggle_lecture_favorite(&mut self, course_id: &str, lecture_id: &str) -> Option<bool> {
        let lecture = self.lecture_mut(course_id, lecture_id)?;
        lecture.is_favorited = !lecture.is_favorited;
        debug!(
            "toggled favorite: {}/{} -> {}",
            course_id, lecture_id, lecture.is_favorited
        );
        Some(lecture.is_favorited)
    }

    /// Inserts an empty course. An existing id is overwritten in place, lectures
    /// included, and the replaced course is returned.
    pub fn add_course(&mut self, req: NewCourseRequest) -> Option<Course> {
        let course = Course::new(req.id, req.title, req.is_pinned);
        let id = course.id.clone();
        let previous = self.upsert(course);
        match &previous {
            Some(old) => warn!(
                "course {} already existed, replaced ({} lectures dropped)",
                id,
                old.lectures.len()
            ),
            None => debug!("added course {}", id),
        }
        previous
    }

    pub fn update_course(&mut self, course_id: &str, req: UpdateCourseRequest) -> Option<&Course> {
        let course = self.course_mut(course_id)?;
        if let Some(title) = req.title {
            course.title = title;
        }
        if let Some(is_pinned) = req.is_pinned {
            course.is_pinned = is_pinned;
        }
        Some(&*course)
    }

    /// Removes the course together with its lectures and their anchors.
    pub fn delete_course(&mut self, course_id: &str) -> Option<Course> {
        let idx = self.courses.iter().position(|c| c.id == course_id)?;
        let removed = self.courses.remove(idx);
        debug!(
            "deleted course {} ({} lectures)",
            course_id,
            removed.lectures.len()
        );
        Some(removed)
    }

    /// Appends a lecture to the course's list. Lecture ids are unique within a
    /// course: an id already present leaves the course untouched.
    pub fn add_lecture(&mut self, course_id: &str, lecture: Lecture) -> Option<&Lecture> {
        let course = self.course_mut(course_id)?;
        if course.lecture(&lecture.id).is_some() {
            warn!("lecture {} already exists in {}, not added", lecture.id, course_id);
            return None;
        }
        let mut lecture = lecture;
        normalize_anchors(&mut lecture);
        debug!("added lecture {} to {}", lecture.id, course_id);
        course.lectures.push(lecture);
        course.lectures.last()
    }

    pub fn update_lecture(
        &mut self,
        course_id: &str,
        lecture_id: &str,
        req: UpdateLectureRequest,
    ) -> Option<&Lecture> {
        let lecture = self.lecture_mut(course_id, lecture_id)?;
        if let Some(title) = req.title {
            lecture.title = title;
        }
        if let Some(date) = req.date {
            lecture.date = date;
        }
        if let Some(is_favorited) = req.is_favorited {
            lecture.is_favorited = is_favorited;
        }
        if let Some(has_notification) = req.has_notification {
            lecture.has_notification = has_notification;
        }
        if let Some(is_live) = req.is_live {
            lecture.is_live = is_live;
        }
        if let Some(video_id) = req.video_id {
            lecture.video_id = video_id;
        }
        Some(&*lecture)
    }

    pub fn delete_lecture(&mut self, course_id: &str, lecture_id: &str) -> Option<Lecture> {
        let course = self.course_mut(course_id)?;
        let idx = course.lectures.iter().position(|l| l.id == lecture_id)?;
        debug!("deleted lecture {}/{}", course_id, lecture_id);
        Some(course.lectures.remove(idx))
    }

    /// Marks the lecture as viewed, clearing its notification.
    pub fn open_lecture(&mut self, course_id: &str, lecture_id: &str) -> Option<&Lecture> {
        let lecture = self.lecture_mut(course_id, lecture_id)?;
        if lecture.has_notification {
            debug!("clearing notification on {}/{}", course_id, lecture_id);
            lecture.has_notification = false;
        }
        Some(&*lecture)
    }

    /// Records the video duration and re-derives every anchor display string
    /// under the matching format.
    pub fn set_lecture_duration(&mut self, course_id: &str, lecture_id: &str, duration_seconds: u32) -> bool {
        let Some(lecture) = self.lecture_mut(course_id, lecture_id) else {
            return false;
        };
        if lecture.duration_seconds != Some(duration_seconds) {
            lecture.duration_seconds = Some(duration_seconds);
            normalize_anchors(lecture);
        }
        true
    }

    /// Inserts a personal anchor, keeping the list ordered by time.
    pub fn add_anchor(&mut self, course_id: &str, lecture_id: &str, anchor: Anchor) -> bool {
        let Some(lecture) = self.lecture_mut(course_id, lecture_id) else {
            return false;
        };
        let mut anchor = anchor;
        anchor.timestamp = format_timestamp(anchor.timestamp_seconds, lecture.time_format());
        lecture.anchors.push(anchor);
        sort_anchors(&mut lecture.anchors);
        true
    }

    pub fn update_anchor(
        &mut self,
        course_id: &str,
        lecture_id: &str,
        anchor_id: &str,
        req: UpdateAnchorRequest,
    ) -> Option<&Anchor> {
        let lecture = self.lecture_mut(course_id, lecture_id)?;
        let format = lecture.time_format();
        let anchor = lecture.anchors.iter_mut().find(|a| a.id == anchor_id)?;
        if let Some(title) = req.title {
            anchor.title = title;
        }
        if let Some(description) = req.description {
            anchor.description = description;
        }
        if let Some(seconds) = req.timestamp_seconds {
            anchor.timestamp_seconds = seconds;
            anchor.timestamp = format_timestamp(seconds, format);
            sort_anchors(&mut lecture.anchors);
        }
        lecture.anchors.iter().find(|a| a.id == anchor_id)
    }

    pub fn delete_anchor(&mut self, course_id: &str, lecture_id: &str, anchor_id: &str) -> Option<Anchor> {
        let lecture = self.lecture_mut(course_id, lecture_id)?;
        let idx = lecture.anchors.iter().position(|a| a.id == anchor_id)?;
        Some(lecture.anchors.remove(idx))
    }

    /// Appends to the lecture's global anchors, creating the list if needed.
    pub fn add_global_anchor(&mut self, course_id: &str, lecture_id: &str, global: GlobalAnchor) -> bool {
        let Some(lecture) = self.lecture_mut(course_id, lecture_id) else {
            return false;
        };
        let mut global = global;
        global.anchor.timestamp = format_timestamp(global.anchor.timestamp_seconds, lecture.time_format());
        lecture.global_anchors.get_or_insert_with(Vec::new).push(global);
        true
    }

    /// Publishes a global anchor, optionally keeping a personal copy under
    /// `personal_id`.
    pub fn publish_global_anchor(
        &mut self,
        course_id: &str,
        lecture_id: &str,
        global: GlobalAnchor,
        personal_id: Option<String>,
    ) -> bool {
        let personal = personal_id.map(|id| Anchor {
            id,
            ..global.anchor.clone()
        });
        if !self.add_global_anchor(course_id, lecture_id, global) {
            return false;
        }
        if let Some(anchor) = personal {
            self.add_anchor(course_id, lecture_id, anchor);
        }
        true
    }

    pub fn vote_global_anchor(
        &mut self,
        course_id: &str,
        lecture_id: &str,
        anchor_id: &str,
        vote: Vote,
    ) -> Option<&GlobalAnchor> {
        let lecture = self.lecture_mut(course_id, lecture_id)?;
        let global = lecture
            .global_anchors
            .as_mut()?
            .iter_mut()
            .find(|g| g.anchor.id == anchor_id)?;
        match vote {
            Vote::Like => global.likes = global.likes.saturating_add(1),
            Vote::Dislike => global.dislikes = global.dislikes.saturating_add(1),
        }
        Some(&*global)
    }
}

fn dedup_lectures(course_id: &str, lectures: Vec<Lecture>) -> Vec<Lecture> {
    let mut unique: Vec<Lecture> = Vec::with_capacity(lectures.len());
    for lecture in lectures {
        match unique.iter_mut().find(|l| l.id == lecture.id) {
            Some(slot) => {
                warn!("duplicate lecture {} in {}, keeping the later one", lecture.id, course_id);
                *slot = lecture;
            }
            None => unique.push(lecture),
        }
    }
    unique
}

fn sort_anchors(anchors: &mut [Anchor]) {
    anchors.sort_by_key(|a| a.timestamp_seconds);
}

fn normalize_anchors(lecture: &mut Lecture) {
    let format = lecture.time_format();
    for anchor in &mut lecture.anchors {
        anchor.timestamp = format_timestamp(anchor.timestamp_seconds, format);
    }
    sort_anchors(&mut lecture.anchors);
    if let Some(globals) = lecture.global_anchors.as_mut() {
        for global in globals {
            global.anchor.timestamp = format_timestamp(global.anchor.timestamp_seconds, format);
        }
    }
}
