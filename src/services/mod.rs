pub mod playback;

pub use playback::{EventOutcome, NextLecturePrompt, PlaybackService, PlaybackSession, SessionStatus};
