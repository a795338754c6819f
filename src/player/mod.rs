//! Boundary to the external video player.
//!
//! The core asks the player to load, seek and play; the player reports back
//! through [`PlayerEvent`]s delivered to the playback service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("no video available")]
    NoVideo,

    #[error("player failed to initialize: {0}")]
    Init(String),

    #[error("player command failed: {0}")]
    Command(String),
}

#[async_trait]
pub trait VideoPlayer: Send + Sync {
    async fn load(&self, video_id: &str) -> Result<(), PlayerError>;
    async fn seek_to(&self, seconds: u32) -> Result<(), PlayerError>;
    async fn play(&self) -> Result<(), PlayerError>;
}

/// Accepts every command. Used when playback happens entirely client-side.
pub struct NoopVideoPlayer;

#[async_trait]
impl VideoPlayer for NoopVideoPlayer {
    async fn load(&self, video_id: &str) -> Result<(), PlayerError> {
        debug!("noop player: load {}", video_id);
        Ok(())
    }

    async fn seek_to(&self, seconds: u32) -> Result<(), PlayerError> {
        debug!("noop player: seek to {}s", seconds);
        Ok(())
    }

    async fn play(&self) -> Result<(), PlayerError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    Playing,
    Paused,
    Buffering,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum PlayerEvent {
    Ready { duration_seconds: u32 },
    StateChanged { state: PlaybackState },
    Ended,
    Error { code: i32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_format() {
        let event: PlayerEvent =
            serde_json::from_str(r#"{"type":"ready","durationSeconds":5400}"#).unwrap();
        assert_eq!(event, PlayerEvent::Ready { duration_seconds: 5400 });

        let event: PlayerEvent =
            serde_json::from_str(r#"{"type":"state_changed","state":"paused"}"#).unwrap();
        assert_eq!(
            event,
            PlayerEvent::StateChanged {
                state: PlaybackState::Paused
            }
        );

        let event: PlayerEvent = serde_json::from_str(r#"{"type":"ended"}"#).unwrap();
        assert_eq!(event, PlayerEvent::Ended);
    }

    #[tokio::test]
    async fn test_noop_player_accepts_commands() {
        let player = NoopVideoPlayer;
        assert!(player.load("ZA-tUyM_y7s").await.is_ok());
        assert!(player.seek_to(750).await.is_ok());
        assert!(player.play().await.is_ok());
    }
}
