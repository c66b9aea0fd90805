//! Best-effort file-to-text loading
//!
//! Reads a local file as plain text for playback. Non-text formats are not
//! parsed; their bytes are converted lossily and passed through.

use crate::Result;
use log::debug;
use std::fs;
use std::path::Path;

/// A loaded document ready for playback
#[derive(Debug, Clone)]
pub struct Document {
    /// File name without directory components
    pub name: String,

    /// Full text content
    pub text: String,
}

impl Document {
    /// First `max_chars` characters, with "..." when the text was longer
    pub fn preview(&self, max_chars: usize) -> String {
        let mut preview: String = self.text.chars().take(max_chars).collect();
        if self.text.chars().count() > max_chars {
            preview.push_str("...");
        }
        preview
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Load a file's content as text
///
/// Invalid UTF-8 sequences are replaced rather than rejected, so binary
/// formats load best-effort instead of failing.
pub fn load(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes).into_owned();

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    debug!("Loaded document '{}': {} chars", name, text.chars().count());
    Ok(Document { name, text })
}
