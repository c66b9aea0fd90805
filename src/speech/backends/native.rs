//! Native speech backend using the tts crate
//!
//! The `tts` crate provides a unified interface to Speech Dispatcher on
//! Linux, AVFoundation on macOS and SAPI on Windows. Utterance lifecycle
//! callbacks are forwarded into an event queue the session manager drains.

use crate::speech::engine::{EngineEvent, SpeechEngine, Utterance, UtteranceId};
use crate::voices::VoiceDescriptor;
use crate::{Result, VoiceLensError};
use log::{debug, warn};
use std::sync::{Arc, Mutex};
use tts::Tts;

/// Correlates platform callbacks with session utterance ids
///
/// The platform reports lifecycle through its own utterance ids. `speak`
/// records the platform id next to the session id, and each callback looks
/// up the id it was delivered. A late callback from a cancelled or
/// superseded utterance finds no entry and is dropped instead of being
/// attributed to the active one.
struct EventBridge<P> {
    active: Vec<(P, UtteranceId)>,
    events: Vec<EngineEvent>,
}

impl<P: PartialEq> EventBridge<P> {
    fn new() -> Self {
        Self {
            active: Vec::new(),
            events: Vec::new(),
        }
    }

    fn register(&mut self, platform_id: P, id: UtteranceId) {
        self.active.push((platform_id, id));
    }

    fn began(&mut self, platform_id: &P) {
        if let Some((_, id)) = self.active.iter().find(|(pid, _)| pid == platform_id) {
            self.events.push(EngineEvent::Started(*id));
        }
    }

    fn ended(&mut self, platform_id: &P) {
        if let Some(pos) = self.active.iter().position(|(pid, _)| pid == platform_id) {
            let (_, id) = self.active.remove(pos);
            self.events.push(EngineEvent::Ended(id));
        }
    }

    /// A stop is session-initiated; the session already transitioned, so
    /// only the mapping is dropped
    fn stopped(&mut self, platform_id: &P) {
        self.active.retain(|(pid, _)| pid != platform_id);
    }

    fn clear(&mut self) {
        self.active.clear();
    }

    fn drain(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Approximated lifecycle for platforms without utterance callbacks
///
/// Driven by polling the platform's busy state; one idle poll is allowed
/// for startup latency before an utterance is declared finished.
struct FallbackTrack {
    id: UtteranceId,
    started: bool,
    grace: bool,
}

impl FallbackTrack {
    fn new(id: UtteranceId) -> Self {
        Self {
            id,
            started: false,
            grace: true,
        }
    }

    /// Advance from one busy-state poll; returns true when the utterance
    /// is done and the track can be discarded
    fn poll(&mut self, busy: bool, events: &mut Vec<EngineEvent>) -> bool {
        if busy {
            self.grace = false;
            if !self.started {
                events.push(EngineEvent::Started(self.id));
                self.started = true;
            }
            return false;
        }
        if self.grace {
            self.grace = false;
            return false;
        }
        if !self.started {
            events.push(EngineEvent::Started(self.id));
        }
        events.push(EngineEvent::Ended(self.id));
        true
    }
}

/// Native TTS backend
pub struct NativeEngine {
    tts: Tts,
    bridge: Arc<Mutex<EventBridge<tts::UtteranceId>>>,
    callbacks_supported: bool,
    fallback: Option<FallbackTrack>,
}

impl NativeEngine {
    /// Create a new native engine and register lifecycle callbacks
    pub fn new() -> Result<Self> {
        debug!("Creating native TTS backend");

        let mut tts = Tts::default()
            .map_err(|e| VoiceLensError::Synthesis(format!("Failed to initialize TTS: {}", e)))?;

        let bridge = Arc::new(Mutex::new(EventBridge::new()));

        let callbacks_supported = tts.supported_features().utterance_callbacks;
        if callbacks_supported {
            let begin_bridge = Arc::clone(&bridge);
            tts.on_utterance_begin(Some(Box::new(move |platform_id| {
                if let Ok(mut bridge) = begin_bridge.lock() {
                    bridge.began(&platform_id);
                }
            })))
            .map_err(|e| VoiceLensError::Synthesis(format!("Failed to set callback: {}", e)))?;

            let end_bridge = Arc::clone(&bridge);
            tts.on_utterance_end(Some(Box::new(move |platform_id| {
                if let Ok(mut bridge) = end_bridge.lock() {
                    bridge.ended(&platform_id);
                }
            })))
            .map_err(|e| VoiceLensError::Synthesis(format!("Failed to set callback: {}", e)))?;

            let stop_bridge = Arc::clone(&bridge);
            tts.on_utterance_stop(Some(Box::new(move |platform_id| {
                if let Ok(mut bridge) = stop_bridge.lock() {
                    bridge.stopped(&platform_id);
                }
            })))
            .map_err(|e| VoiceLensError::Synthesis(format!("Failed to set callback: {}", e)))?;
        } else {
            warn!("Platform does not report utterance callbacks; approximating lifecycle by polling");
        }

        debug!("Native TTS backend created successfully");
        Ok(Self {
            tts,
            bridge,
            callbacks_supported,
            fallback: None,
        })
    }

    /// Typed descriptors for the platform's voices
    ///
    /// Voices the platform exposes here are synthesized on the device, so
    /// they are marked local.
    pub fn voices(&self) -> Result<Vec<VoiceDescriptor>> {
        let voices = self
            .tts
            .voices()
            .map_err(|e| VoiceLensError::Synthesis(format!("Failed to list voices: {}", e)))?;

        Ok(voices
            .iter()
            .map(|v| VoiceDescriptor::new(v.name(), v.language().to_string(), true))
            .collect())
    }

    /// Map a pitch multiplier in [0.5, 2.0] onto the platform's pitch range
    ///
    /// 1.0 maps to the platform's normal pitch; values below interpolate
    /// toward the minimum and values above toward the maximum.
    fn convert_pitch(&self, pitch: f32) -> f32 {
        let normal = self.tts.normal_pitch();
        if pitch < 1.0 {
            let min = self.tts.min_pitch();
            min + (normal - min) * ((pitch - 0.5) / 0.5)
        } else {
            let max = self.tts.max_pitch();
            normal + (max - normal) * (pitch - 1.0)
        }
    }

    /// Map a rate multiplier in [0.5, 2.0] onto the platform's rate range
    fn convert_rate(&self, rate: f32) -> f32 {
        let normal = self.tts.normal_rate();
        if rate < 1.0 {
            let min = self.tts.min_rate();
            min + (normal - min) * ((rate - 0.5) / 0.5)
        } else {
            let max = self.tts.max_rate();
            normal + (max - normal) * (rate - 1.0)
        }
    }

    fn apply_voice(&mut self, descriptor: &VoiceDescriptor) -> Result<()> {
        let voices = self
            .tts
            .voices()
            .map_err(|e| VoiceLensError::Synthesis(format!("Failed to list voices: {}", e)))?;

        match voices.iter().find(|v| v.name() == descriptor.name) {
            Some(voice) => self
                .tts
                .set_voice(voice)
                .map_err(|e| VoiceLensError::Synthesis(format!("Failed to set voice: {}", e))),
            None => {
                // Catalog can be stale relative to the platform list
                warn!(
                    "Voice '{}' no longer available, using platform default",
                    descriptor.name
                );
                Ok(())
            }
        }
    }
}

impl SpeechEngine for NativeEngine {
    fn speak(&mut self, utterance: &Utterance) -> Result<()> {
        let features = self.tts.supported_features();

        if let Some(voice) = &utterance.voice {
            if features.voice {
                self.apply_voice(voice)?;
            } else {
                warn!("Voice selection not supported on this platform");
            }
        }

        if features.pitch {
            let pitch = self.convert_pitch(utterance.pitch);
            self.tts
                .set_pitch(pitch)
                .map_err(|e| VoiceLensError::Synthesis(format!("Failed to set pitch: {}", e)))?;
        }
        if features.rate {
            let rate = self.convert_rate(utterance.rate);
            self.tts
                .set_rate(rate)
                .map_err(|e| VoiceLensError::Synthesis(format!("Failed to set rate: {}", e)))?;
        }

        debug!("Speaking utterance {}: {} chars", utterance.id, utterance.text.len());

        // The bridge lock is held across the speak call so a callback for
        // the new utterance cannot fire before its mapping is recorded
        let mut bridge = self
            .bridge
            .lock()
            .map_err(|_| VoiceLensError::Synthesis("Callback state poisoned".to_string()))?;
        let platform_id = self
            .tts
            .speak(utterance.text.clone(), false)
            .map_err(|e| VoiceLensError::Synthesis(format!("Speak failed: {}", e)))?;

        match platform_id {
            Some(platform_id) if self.callbacks_supported => {
                bridge.register(platform_id, utterance.id);
            }
            _ => {
                // No usable platform id: approximate the lifecycle by
                // polling busy state so completion is still reported
                debug!(
                    "No callback correlation for utterance {}, polling busy state",
                    utterance.id
                );
                self.fallback = Some(FallbackTrack::new(utterance.id));
            }
        }

        Ok(())
    }

    fn cancel_all(&mut self) -> Result<()> {
        debug!("Canceling speech");
        if let Ok(mut bridge) = self.bridge.lock() {
            bridge.clear();
        }
        self.fallback = None;
        self.tts
            .stop()
            .map_err(|e| VoiceLensError::Synthesis(format!("Cancel failed: {}", e)))?;
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<EngineEvent> {
        let mut events = match self.bridge.lock() {
            Ok(mut bridge) => bridge.drain(),
            Err(_) => Vec::new(),
        };

        let mut done = false;
        if let Some(track) = self.fallback.as_mut() {
            let busy = self.tts.supported_features().is_speaking
                && self.tts.is_speaking().unwrap_or(false);
            done = track.poll(busy, &mut events);
        }
        if done {
            self.fallback = None;
        }

        events
    }
}
