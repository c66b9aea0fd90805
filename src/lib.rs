//! VoiceLens - text-to-speech reader
//!
//! Converts typed, pasted or uploaded text into speech using the platform's
//! speech synthesis, with a voice gallery, a saved-audio library and a
//! reading history.

pub mod config;
pub mod document;
pub mod error;
pub mod library;
pub mod speech;
pub mod transform;
pub mod voices;

pub use error::{Result, VoiceLensError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "voicelens";
