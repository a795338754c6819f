use axum::Json;
use axum::extract::{Path, Query};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{patch, post};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::export;
use crate::models::*;
use crate::player::PlayerEvent;
use crate::query::{self, CourseSummary, FavoriteLecture, LectureDetail, LectureSummary, SearchFilters};
use crate::services::{EventOutcome, PlaybackService, PlaybackSession};
use crate::state::AppState;
use crate::timeline::{self, TimelineCluster};

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
    #[serde(default)]
    live: bool,
    #[serde(default)]
    unwatched: bool,
}

impl SearchParams {
    fn filters(&self) -> SearchFilters {
        SearchFilters {
            show_live: self.live,
            show_unwatched: self.unwatched,
        }
    }
}

#[derive(Deserialize)]
struct TimelineParams {
    #[serde(default)]
    global: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerEventRequest {
    course_id: String,
    lecture_id: String,
    event: PlayerEvent,
}

type LecturePath = Path<(String, String)>;
type AnchorPath = Path<(String, String, String)>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/{id}", patch(update_course).delete(delete_course))
        .route("/courses/{id}/pin", post(toggle_pin))
        .route("/courses/{id}/lectures", get(list_lectures).post(create_lecture))
        .route(
            "/courses/{id}/lectures/{lecture_id}",
            get(get_lecture).patch(update_lecture).delete(delete_lecture),
        )
        .route("/courses/{id}/lectures/{lecture_id}/favorite", post(toggle_favorite))
        .route("/courses/{id}/lectures/{lecture_id}/open", post(open_lecture))
        .route("/courses/{id}/lectures/{lecture_id}/anchors", post(create_anchor))
        .route(
            "/courses/{id}/lectures/{lecture_id}/anchors/{anchor_id}",
            patch(update_anchor).delete(delete_anchor),
        )
        .route(
            "/courses/{id}/lectures/{lecture_id}/anchors/{anchor_id}/seek",
            post(seek_to_anchor),
        )
        .route(
            "/courses/{id}/lectures/{lecture_id}/global-anchors",
            post(publish_global_anchor),
        )
        .route(
            "/courses/{id}/lectures/{lecture_id}/global-anchors/{anchor_id}/{vote}",
            post(vote_global_anchor),
        )
        .route("/courses/{id}/lectures/{lecture_id}/timeline", get(lecture_timeline))
        .route("/favorites", get(list_favorites))
        .route("/player/events", post(player_event))
        .route("/player/session", get(player_session))
        .route("/export", get(export_snapshot))
        .with_state(state)
}

fn require(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{} must not be empty", field)));
    }
    Ok(())
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    drop(state.workspace()?);
    Ok(StatusCode::OK)
}

async fn list_courses(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<CourseSummary>>, AppError> {
    let ws = state.workspace()?;
    Ok(Json(query::search_courses(&ws.store, &params.q, params.filters())))
}

async fn create_course(
    State(state): State<AppState>,
    Json(req): Json<NewCourseRequest>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    require(&req.id, "id")?;
    require(&req.title, "title")?;

    let id = req.id.clone();
    let mut ws = state.workspace()?;
    let replaced = ws.store.add_course(req).is_some();
    let course = ws.store.course(&id).cloned().ok_or(AppError::InternalServerError)?;
    let status = if replaced { StatusCode::OK } else { StatusCode::CREATED };
    Ok((status, Json(course)))
}

async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCourseRequest>,
) -> Result<Json<CourseSummary>, AppError> {
    if let Some(title) = &req.title {
        require(title, "title")?;
    }
    let mut ws = state.workspace()?;
    let course = ws.store.update_course(&id, req).ok_or(AppError::NotFound)?;
    Ok(Json(CourseSummary::from(course)))
}

async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut ws = state.workspace()?;
    if ws.store.delete_course(&id).is_some() {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn toggle_pin(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CourseSummary>, AppError> {
    let mut ws = state.workspace()?;
    ws.store.toggle_course_pin(&id).ok_or(AppError::NotFound)?;
    let course = ws.store.course(&id).ok_or(AppError::NotFound)?;
    Ok(Json(CourseSummary::from(course)))
}

async fn list_lectures(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<LectureSummary>>, AppError> {
    let ws = state.workspace()?;
    let course = ws.store.course(&id).ok_or(AppError::NotFound)?;
    Ok(Json(query::search_lectures(course, &params.q, params.filters())))
}

async fn create_lecture(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut req): Json<NewLectureRequest>,
) -> Result<(StatusCode, Json<Lecture>), AppError> {
    require(&req.title, "title")?;
    require(&req.date, "date")?;

    let lecture_id = req.id.take().unwrap_or_else(|| Uuid::new_v4().to_string());
    let mut ws = state.workspace()?;
    if ws.store.lecture(&id, &lecture_id).is_some() {
        return Err(AppError::Conflict(format!("lecture {} already exists", lecture_id)));
    }
    let lecture = ws
        .store
        .add_lecture(&id, req.into_lecture(lecture_id))
        .cloned()
        .ok_or(AppError::NotFound)?;
    Ok((StatusCode::CREATED, Json(lecture)))
}

async fn get_lecture(
    State(state): State<AppState>,
    Path((id, lecture_id)): LecturePath,
) -> Result<Json<LectureDetail>, AppError> {
    let ws = state.workspace()?;
    let detail = query::lecture_detail(&ws.store, &id, &lecture_id, state.renderer.as_ref())
        .ok_or(AppError::NotFound)?;
    Ok(Json(detail))
}

async fn update_lecture(
    State(state): State<AppState>,
    Path((id, lecture_id)): LecturePath,
    Json(req): Json<UpdateLectureRequest>,
) -> Result<Json<LectureSummary>, AppError> {
    let mut ws = state.workspace()?;
    let lecture = ws
        .store
        .update_lecture(&id, &lecture_id, req)
        .ok_or(AppError::NotFound)?;
    Ok(Json(LectureSummary::from(lecture)))
}

async fn delete_lecture(
    State(state): State<AppState>,
    Path((id, lecture_id)): LecturePath,
) -> Result<StatusCode, AppError> {
    let mut ws = state.workspace()?;
    if ws.store.delete_lecture(&id, &lecture_id).is_some() {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn toggle_favorite(
    State(state): State<AppState>,
    Path((id, lecture_id)): LecturePath,
) -> Result<Json<LectureSummary>, AppError> {
    let mut ws = state.workspace()?;
    ws.store
        .toggle_lecture_favorite(&id, &lecture_id)
        .ok_or(AppError::NotFound)?;
    let lecture = ws.store.lecture(&id, &lecture_id).ok_or(AppError::NotFound)?;
    Ok(Json(LectureSummary::from(lecture)))
}

async fn open_lecture(
    State(state): State<AppState>,
    Path((id, lecture_id)): LecturePath,
) -> Result<Json<PlaybackSession>, AppError> {
    let service = PlaybackService::new(state.workspace.clone(), state.player.clone());
    let session = service.open_lecture(&id, &lecture_id).await?;
    Ok(Json(session))
}

async fn create_anchor(
    State(state): State<AppState>,
    Path((id, lecture_id)): LecturePath,
    Json(req): Json<NewAnchorRequest>,
) -> Result<(StatusCode, Json<Vec<Anchor>>), AppError> {
    require(&req.title, "title")?;
    require(&req.description, "description")?;

    let anchor = req.into_anchor(Uuid::new_v4().to_string());
    let mut ws = state.workspace()?;
    if !ws.store.add_anchor(&id, &lecture_id, anchor) {
        return Err(AppError::NotFound);
    }
    let lecture = ws.store.lecture(&id, &lecture_id).ok_or(AppError::NotFound)?;
    Ok((StatusCode::CREATED, Json(lecture.anchors.clone())))
}

async fn update_anchor(
    State(state): State<AppState>,
    Path((id, lecture_id, anchor_id)): AnchorPath,
    Json(req): Json<UpdateAnchorRequest>,
) -> Result<Json<Anchor>, AppError> {
    if let Some(title) = &req.title {
        require(title, "title")?;
    }
    if let Some(description) = &req.description {
        require(description, "description")?;
    }
    let mut ws = state.workspace()?;
    let anchor = ws
        .store
        .update_anchor(&id, &lecture_id, &anchor_id, req)
        .cloned()
        .ok_or(AppError::NotFound)?;
    Ok(Json(anchor))
}

async fn delete_anchor(
    State(state): State<AppState>,
    Path((id, lecture_id, anchor_id)): AnchorPath,
) -> Result<StatusCode, AppError> {
    let mut ws = state.workspace()?;
    if ws.store.delete_anchor(&id, &lecture_id, &anchor_id).is_some() {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn seek_to_anchor(
    State(state): State<AppState>,
    Path((id, lecture_id, anchor_id)): AnchorPath,
) -> Result<Json<PlaybackSession>, AppError> {
    let service = PlaybackService::new(state.workspace.clone(), state.player.clone());
    let session = service.seek_to_anchor(&id, &lecture_id, &anchor_id).await?;
    Ok(Json(session))
}

async fn publish_global_anchor(
    State(state): State<AppState>,
    Path((id, lecture_id)): LecturePath,
    Json(req): Json<NewGlobalAnchorRequest>,
) -> Result<(StatusCode, Json<LectureDetail>), AppError> {
    require(&req.anchor.title, "title")?;
    require(&req.anchor.description, "description")?;
    require(&req.author, "author")?;

    let personal_id = req.also_personal.then(|| Uuid::new_v4().to_string());
    let global = req.into_global_anchor(Uuid::new_v4().to_string());

    let mut ws = state.workspace()?;
    if !ws.store.publish_global_anchor(&id, &lecture_id, global, personal_id) {
        return Err(AppError::NotFound);
    }
    let detail = query::lecture_detail(&ws.store, &id, &lecture_id, state.renderer.as_ref())
        .ok_or(AppError::NotFound)?;
    Ok((StatusCode::CREATED, Json(detail)))
}

async fn vote_global_anchor(
    State(state): State<AppState>,
    Path((id, lecture_id, anchor_id, vote)): Path<(String, String, String, Vote)>,
) -> Result<Json<GlobalAnchor>, AppError> {
    let mut ws = state.workspace()?;
    let global = ws
        .store
        .vote_global_anchor(&id, &lecture_id, &anchor_id, vote)
        .cloned()
        .ok_or(AppError::NotFound)?;
    Ok(Json(global))
}

async fn lecture_timeline(
    State(state): State<AppState>,
    Path((id, lecture_id)): LecturePath,
    Query(params): Query<TimelineParams>,
) -> Result<Json<Vec<TimelineCluster>>, AppError> {
    let ws = state.workspace()?;
    let lecture = ws.store.lecture(&id, &lecture_id).ok_or(AppError::NotFound)?;
    Ok(Json(timeline::lecture_timeline(lecture, params.global)))
}

async fn list_favorites(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<FavoriteLecture>>, AppError> {
    let ws = state.workspace()?;
    Ok(Json(query::favorite_lectures(&ws.store, &params.q, params.filters())))
}

async fn player_event(
    State(state): State<AppState>,
    Json(req): Json<PlayerEventRequest>,
) -> Result<Json<EventOutcome>, AppError> {
    let service = PlaybackService::new(state.workspace.clone(), state.player.clone());
    let outcome = service.handle_event(&req.course_id, &req.lecture_id, req.event)?;
    Ok(Json(outcome))
}

async fn player_session(
    State(state): State<AppState>,
) -> Result<Json<Option<PlaybackSession>>, AppError> {
    let service = PlaybackService::new(state.workspace.clone(), state.player.clone());
    Ok(Json(service.current_session()?))
}

async fn export_snapshot(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = {
        let ws = state.workspace()?;
        export::to_json_string(&ws.store)?
    };
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export::export_filename(Utc::now())
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}
