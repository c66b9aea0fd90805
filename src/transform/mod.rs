//! Remote text transformation
//!
//! Sends text to a remote AI endpoint to be enhanced or summarized before
//! playback. One opaque call, no retry: any failure is surfaced with the
//! underlying message and the caller keeps the original text untouched.

use crate::{Result, VoiceLensError};
use log::debug;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// What the remote endpoint should do with the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformAction {
    /// Improve clarity and flow without changing meaning
    Enhance,
    /// Produce a shorter version
    Summarize,
}

impl TransformAction {
    /// Wire tag sent to the endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformAction::Enhance => "enhance",
            TransformAction::Summarize => "summarize",
        }
    }
}

/// Text transform service trait
pub trait TextTransformer {
    /// Transform text; empty input is rejected before any remote call
    fn transform(&mut self, text: &str, action: TransformAction) -> Result<String>;
}

/// Response body from the transform endpoint
#[derive(Debug, Deserialize)]
struct TransformResponse {
    #[serde(default)]
    text: Option<String>,

    #[serde(default)]
    error: Option<String>,
}

/// Transformer backed by a remote HTTP endpoint
pub struct RemoteTransformer {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl RemoteTransformer {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| VoiceLensError::Transform(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl TextTransformer for RemoteTransformer {
    fn transform(&mut self, text: &str, action: TransformAction) -> Result<String> {
        validate_input(text)?;

        debug!("Requesting '{}' transform: {} chars", action.as_str(), text.len());

        let body = json!({
            "text": text,
            "action": action.as_str(),
        });

        let response = self.client.post(&self.endpoint).json(&body).send()?;

        if !response.status().is_success() {
            return Err(VoiceLensError::Transform(format!(
                "Transform endpoint returned status {}",
                response.status()
            )));
        }

        let payload: TransformResponse = response
            .json()
            .map_err(|e| VoiceLensError::Transform(format!("Invalid transform response: {}", e)))?;

        if let Some(error) = payload.error {
            return Err(VoiceLensError::Transform(error));
        }

        match payload.text {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(VoiceLensError::Transform(
                "Transform endpoint returned no text".to_string(),
            )),
        }
    }
}

/// Reject empty or whitespace-only input before invoking the endpoint
pub fn validate_input(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(VoiceLensError::InputValidation(
            "No text to transform. Please enter some text first.".to_string(),
        ));
    }
    Ok(())
}
