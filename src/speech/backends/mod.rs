//! Platform speech backends

// Native TTS backend using the tts crate (cross-platform)
pub mod native;

pub use native::NativeEngine;

use crate::speech::SpeechEngine;
use crate::voices::VoiceDescriptor;
use crate::Result;
use log::info;

/// Create the platform speech engine along with its raw voice list
///
/// The voice list may be empty at startup on platforms that deliver voices
/// asynchronously; callers should re-query after a change notification.
pub fn create_engine() -> Result<(Box<dyn SpeechEngine>, Vec<VoiceDescriptor>)> {
    info!(
        "Creating native speech engine for platform: {}",
        std::env::consts::OS
    );
    let engine = NativeEngine::new()?;
    let voices = engine.voices().unwrap_or_default();
    info!("Platform reports {} voices", voices.len());
    Ok((Box::new(engine), voices))
}
