pub mod anchor;
pub mod course;
pub mod lecture;

pub use anchor::{Anchor, GlobalAnchor, NewAnchorRequest, NewGlobalAnchorRequest, TimelineEntry, UpdateAnchorRequest, Vote};
pub use course::{Course, NewCourseRequest, UpdateCourseRequest};
pub use lecture::{Lecture, NewLectureRequest, UpdateLectureRequest};
