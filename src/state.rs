use std::sync::{Arc, Mutex, MutexGuard};

use tracing::error;

use crate::error::AppError;
use crate::player::VideoPlayer;
use crate::render::RichTextRenderer;
use crate::services::PlaybackSession;
use crate::store::CourseStore;

/// Everything that changes in response to user intents.
#[derive(Debug, Default)]
pub struct Workspace {
    pub store: CourseStore,
    pub session: Option<PlaybackSession>,
}

#[derive(Clone)]
pub struct AppState {
    pub workspace: Arc<Mutex<Workspace>>,
    pub player: Arc<dyn VideoPlayer>,
    pub renderer: Arc<dyn RichTextRenderer>,
}

impl AppState {
    pub fn new(
        store: CourseStore,
        player: Arc<dyn VideoPlayer>,
        renderer: Arc<dyn RichTextRenderer>,
    ) -> Self {
        Self {
            workspace: Arc::new(Mutex::new(Workspace {
                store,
                session: None,
            })),
            player,
            renderer,
        }
    }

    pub fn workspace(&self) -> Result<MutexGuard<'_, Workspace>, AppError> {
        lock(&self.workspace)
    }
}

pub fn lock(workspace: &Mutex<Workspace>) -> Result<MutexGuard<'_, Workspace>, AppError> {
    workspace.lock().map_err(|_| {
        error!("workspace lock poisoned");
        AppError::InternalServerError
    })
}
