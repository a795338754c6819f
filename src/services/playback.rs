use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::player::{PlaybackState, PlayerEvent, VideoPlayer};
use crate::state::{Workspace, lock};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionStatus {
    Loading,
    Ready,
    Playing,
    Paused,
    Buffering,
    Ended,
    /// The player could not provide the video; no retry is attempted.
    Unavailable { reason: String },
}

/// The lecture currently open in the player.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSession {
    pub course_id: String,
    pub lecture_id: String,
    pub video_id: String,
    #[serde(flatten)]
    pub status: SessionStatus,
    pub duration_seconds: Option<u32>,
}

impl PlaybackSession {
    fn is_for(&self, course_id: &str, lecture_id: &str) -> bool {
        self.course_id == course_id && self.lecture_id == lecture_id
    }

    fn degrade(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(
            "video unavailable for {}/{}: {}",
            self.course_id, self.lecture_id, reason
        );
        self.status = SessionStatus::Unavailable { reason };
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextLecturePrompt {
    pub course_id: String,
    pub lecture_id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventOutcome {
    pub session: Option<PlaybackSession>,
    pub next_lecture: Option<NextLecturePrompt>,
}

/// Drives the video player for the lecture being viewed and folds the
/// player's events back into the store.
pub struct PlaybackService {
    workspace: Arc<Mutex<Workspace>>,
    player: Arc<dyn VideoPlayer>,
}

impl PlaybackService {
    pub fn new(workspace: Arc<Mutex<Workspace>>, player: Arc<dyn VideoPlayer>) -> Self {
        Self { workspace, player }
    }

    /// Opens a lecture for viewing: clears its notification and asks the
    /// player to load the video.
    pub async fn open_lecture(&self, course_id: &str, lecture_id: &str) -> Result<PlaybackSession, AppError> {
        let session = {
            let mut ws = lock(&self.workspace)?;
            let lecture = ws
                .store
                .open_lecture(course_id, lecture_id)
                .ok_or(AppError::NotFound)?;

            let mut session = PlaybackSession {
                course_id: course_id.to_string(),
                lecture_id: lecture_id.to_string(),
                video_id: lecture.video_id.clone(),
                status: SessionStatus::Loading,
                duration_seconds: lecture.duration_seconds,
            };
            if session.video_id.trim().is_empty() {
                session.degrade("lecture has no video");
            }
            ws.session = Some(session.clone());
            session
        };

        if !matches!(session.status, SessionStatus::Loading) {
            return Ok(session);
        }

        info!("loading video {} for {}/{}", session.video_id, course_id, lecture_id);
        if let Err(e) = self.player.load(&session.video_id).await {
            return self.mark_unavailable(course_id, lecture_id, e.to_string());
        }

        Ok(self.current_for(course_id, lecture_id)?.unwrap_or(session))
    }

    /// Seeks the player to an anchor (personal or global) and resumes playback.
    pub async fn seek_to_anchor(
        &self,
        course_id: &str,
        lecture_id: &str,
        anchor_id: &str,
    ) -> Result<PlaybackSession, AppError> {
        let (seconds, session) = {
            let ws = lock(&self.workspace)?;
            let lecture = ws
                .store
                .lecture(course_id, lecture_id)
                .ok_or(AppError::NotFound)?;
            let seconds = lecture
                .anchors
                .iter()
                .find(|a| a.id == anchor_id)
                .or_else(|| {
                    lecture
                        .global_anchors()
                        .iter()
                        .map(|g| &g.anchor)
                        .find(|a| a.id == anchor_id)
                })
                .map(|a| a.timestamp_seconds)
                .ok_or(AppError::NotFound)?;
            let session = ws
                .session
                .clone()
                .filter(|s| s.is_for(course_id, lecture_id))
                .ok_or_else(|| AppError::BadRequest("Lecture is not open".to_string()))?;
            (seconds, session)
        };

        if matches!(session.status, SessionStatus::Unavailable { .. }) {
            return Ok(session);
        }

        debug!("seeking {}/{} to {}s", course_id, lecture_id, seconds);
        if let Err(e) = self.player.seek_to(seconds).await {
            return self.mark_unavailable(course_id, lecture_id, e.to_string());
        }
        if let Err(e) = self.player.play().await {
            return self.mark_unavailable(course_id, lecture_id, e.to_string());
        }

        Ok(self.current_for(course_id, lecture_id)?.unwrap_or(session))
    }

    /// Applies an inbound player event. Events for a lecture other than the
    /// open one are ignored.
    pub fn handle_event(
        &self,
        course_id: &str,
        lecture_id: &str,
        event: PlayerEvent,
    ) -> Result<EventOutcome, AppError> {
        let mut ws = lock(&self.workspace)?;
        let Workspace { store, session } = &mut *ws;

        let Some(current) = session.as_mut().filter(|s| s.is_for(course_id, lecture_id)) else {
            debug!("ignoring {:?} for inactive lecture {}/{}", event, course_id, lecture_id);
            return Ok(EventOutcome {
                session: session.clone(),
                next_lecture: None,
            });
        };

        let mut next_lecture = None;
        match event {
            PlayerEvent::Ready { duration_seconds } => {
                store.set_lecture_duration(course_id, lecture_id, duration_seconds);
                current.duration_seconds = Some(duration_seconds);
                current.status = SessionStatus::Ready;
            }
            PlayerEvent::StateChanged { state } => {
                current.status = match state {
                    PlaybackState::Playing => SessionStatus::Playing,
                    PlaybackState::Paused => SessionStatus::Paused,
                    PlaybackState::Buffering => SessionStatus::Buffering,
                };
            }
            PlayerEvent::Ended => {
                current.status = SessionStatus::Ended;
                next_lecture = store.course(course_id).and_then(|course| {
                    let idx = course.lectures.iter().position(|l| l.id == lecture_id)?;
                    course.lectures.get(idx + 1).map(|next| NextLecturePrompt {
                        course_id: course.id.clone(),
                        lecture_id: next.id.clone(),
                        title: next.title.clone(),
                    })
                });
            }
            PlayerEvent::Error { code } => {
                current.degrade(format!("player error {}", code));
            }
        }

        Ok(EventOutcome {
            session: Some(current.clone()),
            next_lecture,
        })
    }

    pub fn current_session(&self) -> Result<Option<PlaybackSession>, AppError> {
        Ok(lock(&self.workspace)?.session.clone())
    }

    fn current_for(&self, course_id: &str, lecture_id: &str) -> Result<Option<PlaybackSession>, AppError> {
        Ok(self
            .current_session()?
            .filter(|s| s.is_for(course_id, lecture_id)))
    }

    fn mark_unavailable(
        &self,
        course_id: &str,
        lecture_id: &str,
        reason: String,
    ) -> Result<PlaybackSession, AppError> {
        let mut ws = lock(&self.workspace)?;
        match ws.session.as_mut().filter(|s| s.is_for(course_id, lecture_id)) {
            Some(session) => {
                session.degrade(reason);
                Ok(session.clone())
            }
            // another lecture was opened meanwhile
            None => Err(AppError::BadRequest("Lecture is not open".to_string())),
        }
    }
}
