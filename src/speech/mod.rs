//! Speech synthesis system

pub mod backends;
pub mod engine;
pub mod session;

pub use engine::{EngineEvent, SpeechEngine, Utterance, UtteranceId};
pub use session::{PlaybackRequest, Session, SessionObserver, SessionState};
