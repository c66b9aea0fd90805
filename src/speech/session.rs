//! Playback session manager
//!
//! Owns the mapping from user-selected parameters (text, voice, pitch,
//! rate) to a single active utterance. The invariant is at most one
//! utterance speaking at any time: `start` always cancels prior activity
//! before issuing a new request, so the platform's speech queue is the only
//! serialization point and no lock is needed.

use crate::library::{HistoryEntry, HistorySink};
use crate::speech::engine::{EngineEvent, SpeechEngine, Utterance, UtteranceId};
use crate::voices::{VoiceCatalog, VoiceDescriptor};
use crate::{Result, VoiceLensError};
use log::{debug, warn};

/// Lower bound for pitch and rate multipliers
pub const PARAM_MIN: f32 = 0.5;

/// Upper bound for pitch and rate multipliers
pub const PARAM_MAX: f32 = 2.0;

/// Parameters for one playback attempt
///
/// Constructed fresh per attempt and never persisted. Text must be
/// non-empty after trimming; pitch and rate are clamped into
/// [0.5, 2.0] rather than rejected, since the sliders only produce
/// in-range values and a programmatic caller outside the range gets the
/// nearest legal one.
#[derive(Debug, Clone)]
pub struct PlaybackRequest {
    text: String,
    voice_name: Option<String>,
    pitch: f32,
    rate: f32,
}

impl PlaybackRequest {
    /// Create a request with default pitch and rate
    ///
    /// Returns `InputValidation` for empty or whitespace-only text, before
    /// the engine is ever involved.
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(VoiceLensError::InputValidation(
                "No text to speak. Please enter some text first.".to_string(),
            ));
        }
        Ok(Self {
            text,
            voice_name: None,
            pitch: 1.0,
            rate: 1.0,
        })
    }

    /// Request a voice by name; unknown names fall back to the platform
    /// default at start time
    pub fn with_voice(mut self, name: impl Into<String>) -> Self {
        self.voice_name = Some(name.into());
        self
    }

    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch.clamp(PARAM_MIN, PARAM_MAX);
        self
    }

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate.clamp(PARAM_MIN, PARAM_MAX);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn voice_name(&self) -> Option<&str> {
        self.voice_name.as_deref()
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }
}

/// Whether audio is currently playing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Speaking,
}

/// Notifications the session exposes to the view layer
///
/// `speaking_ended` covers both natural completion and explicit stop.
/// Errors carry the platform's reason; no automatic retry follows.
pub trait SessionObserver {
    fn speaking_started(&mut self) {}

    fn speaking_ended(&mut self) {}

    fn error(&mut self, _reason: &str) {}
}

/// The utterance currently in flight
struct ActiveUtterance {
    id: UtteranceId,
    text: String,
    voice: Option<VoiceDescriptor>,
}

/// Playback session manager
///
/// Runs on the UI thread and never blocks: `start` returns before audio
/// finishes and lifecycle events arrive later through `pump` /
/// `handle_event`. Events from a superseded utterance carry a stale id and
/// are ignored.
pub struct Session {
    engine: Box<dyn SpeechEngine>,
    catalog: VoiceCatalog,
    observer: Option<Box<dyn SessionObserver>>,
    history: Option<Box<dyn HistorySink>>,
    state: SessionState,
    active: Option<ActiveUtterance>,
    next_id: UtteranceId,
}

impl Session {
    pub fn new(engine: Box<dyn SpeechEngine>) -> Self {
        Self {
            engine,
            catalog: VoiceCatalog::new(),
            observer: None,
            history: None,
            state: SessionState::Idle,
            active: None,
            next_id: 0,
        }
    }

    /// Attach the notification receiver
    pub fn set_observer(&mut self, observer: Box<dyn SessionObserver>) {
        self.observer = Some(observer);
    }

    /// Attach a history sink; present only while a user identity exists.
    /// With no sink, completed playbacks are dropped from history, not
    /// queued.
    pub fn set_history_sink(&mut self, sink: Box<dyn HistorySink>) {
        self.history = Some(sink);
    }

    pub fn clear_history_sink(&mut self) {
        self.history = None;
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_speaking(&self) -> bool {
        self.state == SessionState::Speaking
    }

    pub fn catalog(&self) -> &VoiceCatalog {
        &self.catalog
    }

    /// Replace the voice catalog after a platform change notification
    ///
    /// May race with an in-flight start; resolution tolerates an empty or
    /// stale catalog by falling back to no voice.
    pub fn update_catalog(&mut self, voices: Vec<VoiceDescriptor>) {
        self.catalog.replace_all(voices);
    }

    /// Start speaking a request
    ///
    /// Unconditionally cancels any active utterance first, then issues a new
    /// engine request with the resolved voice. Returns immediately; audio
    /// plays asynchronously. A supersede shows no intermediate Idle to the
    /// observer.
    pub fn start(&mut self, request: &PlaybackRequest) -> Result<()> {
        self.engine.cancel_all()?;

        let voice = request
            .voice_name()
            .and_then(|name| self.catalog.resolve(name))
            .cloned();
        if request.voice_name().is_some() && voice.is_none() {
            debug!(
                "Voice {:?} not in catalog, using platform default",
                request.voice_name()
            );
        }

        self.next_id += 1;
        let id = self.next_id;
        let utterance = Utterance {
            id,
            text: request.text().to_string(),
            voice: voice.clone(),
            pitch: request.pitch(),
            rate: request.rate(),
        };

        if let Err(e) = self.engine.speak(&utterance) {
            // A superseded playback was already cancelled above; the view
            // still needs to hear that it ended
            let was_speaking = self.state == SessionState::Speaking;
            self.state = SessionState::Idle;
            self.active = None;
            if was_speaking {
                if let Some(observer) = self.observer.as_mut() {
                    observer.speaking_ended();
                }
            }
            return Err(e);
        }

        debug!("Utterance {} started: {} chars", id, request.text().len());
        self.active = Some(ActiveUtterance {
            id,
            text: request.text().to_string(),
            voice,
        });
        self.state = SessionState::Speaking;
        Ok(())
    }

    /// Stop any active playback
    ///
    /// Idempotent: a stop while Idle is a no-op with no notification.
    /// Cancellation is requested, not awaited; the session transitions to
    /// Idle immediately.
    pub fn stop(&mut self) -> Result<()> {
        if self.state == SessionState::Idle {
            return Ok(());
        }

        self.engine.cancel_all()?;
        self.state = SessionState::Idle;
        self.active = None;
        if let Some(observer) = self.observer.as_mut() {
            observer.speaking_ended();
        }
        Ok(())
    }

    /// Drain and process pending engine events
    pub fn pump(&mut self) {
        for event in self.engine.poll_events() {
            self.handle_event(event);
        }
    }

    /// Process one engine lifecycle event
    ///
    /// Events whose id does not match the active utterance come from a
    /// cancelled or superseded request and are ignored.
    pub fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Started(id) => {
                if !self.is_active(id) {
                    debug!("Ignoring stale start event for utterance {}", id);
                    return;
                }
                if let Some(observer) = self.observer.as_mut() {
                    observer.speaking_started();
                }
            }
            EngineEvent::Ended(id) => {
                if !self.is_active(id) {
                    debug!("Ignoring stale end event for utterance {}", id);
                    return;
                }
                let finished = self.active.take();
                self.state = SessionState::Idle;
                if let Some(observer) = self.observer.as_mut() {
                    observer.speaking_ended();
                }
                if let Some(finished) = finished {
                    self.record_history(&finished);
                }
            }
            EngineEvent::Error(id, reason) => {
                if !self.is_active(id) {
                    debug!("Ignoring stale error event for utterance {}", id);
                    return;
                }
                warn!("Synthesis failed for utterance {}: {}", id, reason);
                self.active = None;
                self.state = SessionState::Idle;
                if let Some(observer) = self.observer.as_mut() {
                    observer.error(&reason);
                }
            }
        }
    }

    /// Write one history row for a naturally completed playback
    ///
    /// A failed write is logged but never surfaced as a playback failure.
    fn record_history(&mut self, finished: &ActiveUtterance) {
        let Some(sink) = self.history.as_mut() else {
            debug!("No user identity present, dropping history entry");
            return;
        };
        let entry = HistoryEntry::for_playback(&finished.text, finished.voice.as_ref());
        if let Err(e) = sink.record(entry) {
            warn!("Failed to record reading history: {}", e);
        }
    }

    fn is_active(&self, id: UtteranceId) -> bool {
        self.active.as_ref().map(|a| a.id) == Some(id)
    }
}
