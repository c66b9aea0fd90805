//! Saved audio library and reading history
//!
//! Account features: signed-in users keep saved audio requests and an
//! append-only reading history in the row store. The displayed lists are
//! only mutated after the store confirms an operation, so a failed delete
//! leaves the item visible and a failed save leaves the list unchanged.

pub mod store;

pub use store::{Filter, MemoryStore, RowStore, Selection};

use crate::voices::VoiceDescriptor;
use crate::{Result, VoiceLensError};
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Table holding saved audio requests
pub const SAVED_AUDIO_TABLE: &str = "saved_audio";

/// Table holding the reading history log
pub const READING_HISTORY_TABLE: &str = "reading_history";

/// History rows fetched per refresh
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// History titles are cut to this many characters
const TITLE_MAX_CHARS: usize = 50;

/// Marker appended to a truncated title
const ELLIPSIS: &str = "...";

/// A saved audio request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedAudioRecord {
    pub id: String,
    pub title: String,
    pub text_content: String,
    pub voice_name: Option<String>,
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One reading history row, written after a playback completes naturally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub content_type: String,
    pub title: Option<String>,
    pub voice_used: Option<String>,
    pub language: Option<String>,
    pub read_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Build the history row for a completed playback
    ///
    /// Title is the spoken text cut to 50 characters with an ellipsis marker
    /// when truncated. Falls back to "Default" / "en-US" when no voice was
    /// resolved.
    pub fn for_playback(text: &str, voice: Option<&VoiceDescriptor>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content_type: "text".to_string(),
            title: Some(playback_title(text)),
            voice_used: Some(
                voice
                    .map(|v| v.name.clone())
                    .unwrap_or_else(|| "Default".to_string()),
            ),
            language: Some(
                voice
                    .map(|v| v.language_tag.clone())
                    .unwrap_or_else(|| "en-US".to_string()),
            ),
            read_at: Utc::now(),
        }
    }
}

/// Cut text to the history title length, appending "..." if it was longer
pub fn playback_title(text: &str) -> String {
    let mut title: String = text.chars().take(TITLE_MAX_CHARS).collect();
    if text.chars().count() > TITLE_MAX_CHARS {
        title.push_str(ELLIPSIS);
    }
    title
}

/// Destination for playback history rows
///
/// The session manager writes through this when a user identity is present;
/// with no identity the entry is dropped, not queued.
pub trait HistorySink {
    fn record(&mut self, entry: HistoryEntry) -> Result<()>;
}

/// A signed-in user's library view
pub struct Library {
    store: Box<dyn RowStore>,
    user_id: String,
    saved: Vec<SavedAudioRecord>,
    history: Vec<HistoryEntry>,
    history_limit: usize,
}

impl Library {
    pub fn new(store: Box<dyn RowStore>, user_id: impl Into<String>) -> Self {
        Self {
            store,
            user_id: user_id.into(),
            saved: Vec::new(),
            history: Vec::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Reload both lists from the store
    pub fn refresh(&mut self) -> Result<()> {
        let saved_rows = self.store.select(
            SAVED_AUDIO_TABLE,
            &Selection::filtered(self.user_filter()).order_by("created_at", true),
        )?;
        let history_rows = self.store.select(
            READING_HISTORY_TABLE,
            &Selection::filtered(self.user_filter())
                .order_by("read_at", true)
                .limit(self.history_limit),
        )?;

        // Replace only after both selects succeeded
        self.saved = saved_rows
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<_, _>>()?;
        self.history = history_rows
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<_, _>>()?;

        debug!(
            "Library refreshed: {} saved, {} history rows",
            self.saved.len(),
            self.history.len()
        );
        Ok(())
    }

    /// Saved audio requests, newest first
    pub fn saved_audio(&self) -> &[SavedAudioRecord] {
        &self.saved
    }

    /// Reading history, newest first
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Save an audio request to the library
    ///
    /// Requires a non-empty title. The displayed list gains the item only
    /// after the insert is confirmed.
    pub fn save_audio(
        &mut self,
        title: &str,
        text: &str,
        voice: Option<&VoiceDescriptor>,
    ) -> Result<&SavedAudioRecord> {
        if title.trim().is_empty() {
            return Err(VoiceLensError::InputValidation(
                "A title is required to save audio".to_string(),
            ));
        }
        if text.trim().is_empty() {
            return Err(VoiceLensError::InputValidation(
                "There is no text to save".to_string(),
            ));
        }

        let record = SavedAudioRecord {
            id: Uuid::new_v4().to_string(),
            title: title.trim().to_string(),
            text_content: text.to_string(),
            voice_name: voice.map(|v| v.name.clone()),
            language: voice.map(|v| v.language_tag.clone()),
            created_at: Utc::now(),
        };

        let row = self.owned_row(&record)?;
        self.store.insert(SAVED_AUDIO_TABLE, row)?;

        self.saved.insert(0, record);
        Ok(&self.saved[0])
    }

    /// Delete a saved audio request
    ///
    /// The item leaves the displayed list only after the delete is confirmed.
    pub fn delete_audio(&mut self, id: &str) -> Result<()> {
        self.store.delete(SAVED_AUDIO_TABLE, &Filter::eq("id", id))?;
        self.saved.retain(|r| r.id != id);
        Ok(())
    }

    /// Clear the whole reading history for this user
    pub fn clear_history(&mut self) -> Result<()> {
        let filter = self.user_filter();
        self.store.delete(READING_HISTORY_TABLE, &filter)?;
        self.history.clear();
        Ok(())
    }

    fn user_filter(&self) -> Filter {
        Filter::eq("user_id", self.user_id.as_str())
    }

    /// Serialize a record with the owning user id attached
    fn owned_row<T: Serialize>(&self, record: &T) -> Result<serde_json::Value> {
        let mut row = serde_json::to_value(record)?;
        row["user_id"] = serde_json::Value::String(self.user_id.clone());
        Ok(row)
    }
}

impl HistorySink for Library {
    fn record(&mut self, entry: HistoryEntry) -> Result<()> {
        let row = self.owned_row(&entry)?;
        self.store.insert(READING_HISTORY_TABLE, row)?;
        self.history.insert(0, entry);
        self.history.truncate(self.history_limit);
        Ok(())
    }
}
