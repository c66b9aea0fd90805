//! Speech engine abstraction
//!
//! Provides a unified interface to the platform's speech synthesis. The
//! session manager issues one utterance at a time; the engine reports the
//! utterance lifecycle back asynchronously.

use crate::voices::VoiceDescriptor;
use crate::Result;

/// Identifier the session manager assigns to each utterance
///
/// Lifecycle events carry the id so that events from a cancelled utterance
/// can be told apart from the active one.
pub type UtteranceId = u64;

/// One request to the platform to render text as speech
#[derive(Debug, Clone)]
pub struct Utterance {
    pub id: UtteranceId,

    /// Text to render
    pub text: String,

    /// Resolved voice, or None for the platform default
    pub voice: Option<VoiceDescriptor>,

    /// Pitch multiplier in [0.5, 2.0]
    pub pitch: f32,

    /// Rate multiplier in [0.5, 2.0]
    pub rate: f32,
}

/// Asynchronous lifecycle notification from the engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Audio started playing
    Started(UtteranceId),

    /// Utterance finished naturally (not cancelled)
    Ended(UtteranceId),

    /// The platform reported a synthesis failure
    Error(UtteranceId, String),
}

/// Speech engine trait
///
/// All backends implement this. The platform maintains a single speech
/// queue, so there is at most one engine instance per runtime and
/// `cancel_all` is the serialization point for overlapping requests.
pub trait SpeechEngine: Send {
    /// Issue a speech request; returns before audio finishes
    fn speak(&mut self, utterance: &Utterance) -> Result<()>;

    /// Cancel any active or queued speech; safe to call with nothing active
    fn cancel_all(&mut self) -> Result<()>;

    /// Drain lifecycle events that arrived since the last poll
    fn poll_events(&mut self) -> Vec<EngineEvent>;
}
