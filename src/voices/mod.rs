//! Voice catalog management
//!
//! The platform delivers its voice list asynchronously and may replace it
//! wholesale after a change notification. The catalog ingests that raw list
//! into typed descriptors at the boundary, so the rest of the application
//! never handles untyped platform voice data.

pub mod languages;

pub use languages::language_name;

use log::debug;

/// One selectable synthetic voice
///
/// Immutable once ingested; a catalog refresh replaces descriptors wholesale
/// rather than mutating them.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceDescriptor {
    /// Voice name, unique within a session
    pub name: String,

    /// BCP-47-like language tag, e.g. "en-US"
    pub language_tag: String,

    /// Whether the voice is synthesized locally (no network round trip)
    pub is_local: bool,
}

impl VoiceDescriptor {
    pub fn new(name: impl Into<String>, language_tag: impl Into<String>, is_local: bool) -> Self {
        Self {
            name: name.into(),
            language_tag: language_tag.into(),
            is_local,
        }
    }

    /// Primary language subtag: the portion of the tag before the first
    /// region separator ("en" from "en-US" or "en_US")
    pub fn primary_language(&self) -> &str {
        self.language_tag
            .split(['-', '_'])
            .next()
            .unwrap_or(&self.language_tag)
    }
}

/// The set of voices currently available from the platform
///
/// May be empty on first query; consumers treat an empty catalog as "still
/// loading", not an error, since voices can arrive after a change
/// notification.
#[derive(Debug, Default)]
pub struct VoiceCatalog {
    voices: Vec<VoiceDescriptor>,
}

impl VoiceCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self { voices: Vec::new() }
    }

    /// Replace the catalog contents wholesale
    ///
    /// Called after the platform signals a voice list change.
    pub fn replace_all(&mut self, voices: Vec<VoiceDescriptor>) {
        debug!("Voice catalog replaced: {} voices", voices.len());
        self.voices = voices;
    }

    /// Look up a voice by exact name
    ///
    /// Returns None when the name is unknown or the catalog hasn't loaded
    /// yet; callers fall back to the platform default voice.
    pub fn resolve(&self, name: &str) -> Option<&VoiceDescriptor> {
        self.voices.iter().find(|v| v.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    /// All voices in platform order
    pub fn iter(&self) -> impl Iterator<Item = &VoiceDescriptor> {
        self.voices.iter()
    }

    /// One representative voice per language, for the sample gallery
    ///
    /// Groups voices by primary language subtag and keeps a single voice per
    /// group, preferring a local voice over a remote one and breaking ties by
    /// first-seen order. Output order is the first-seen order of each
    /// language group. Pure and idempotent: rerunning on the same raw list
    /// yields the same representatives.
    pub fn representatives(&self) -> Vec<&VoiceDescriptor> {
        let mut order: Vec<&str> = Vec::new();
        let mut chosen: Vec<&VoiceDescriptor> = Vec::new();

        for voice in &self.voices {
            let lang = voice.primary_language();
            match order.iter().position(|&l| l == lang) {
                None => {
                    order.push(lang);
                    chosen.push(voice);
                }
                Some(i) => {
                    // Upgrade to a local voice if the current pick is remote
                    if voice.is_local && !chosen[i].is_local {
                        chosen[i] = voice;
                    }
                }
            }
        }

        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(name: &str, lang: &str, local: bool) -> VoiceDescriptor {
        VoiceDescriptor::new(name, lang, local)
    }

    #[test]
    fn test_primary_language() {
        assert_eq!(voice("A", "en-US", false).primary_language(), "en");
        assert_eq!(voice("B", "pt_BR", false).primary_language(), "pt");
        assert_eq!(voice("C", "fr", false).primary_language(), "fr");
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = VoiceCatalog::new();
        assert!(catalog.is_empty());
        assert!(catalog.representatives().is_empty());
        assert!(catalog.resolve("anything").is_none());
    }

    #[test]
    fn test_resolve_by_name() {
        let mut catalog = VoiceCatalog::new();
        catalog.replace_all(vec![voice("Alice", "en-US", true), voice("Bob", "fr-FR", false)]);

        assert_eq!(catalog.resolve("Bob").unwrap().language_tag, "fr-FR");
        assert!(catalog.resolve("Carol").is_none());
    }

    #[test]
    fn test_representatives_prefer_local() {
        let mut catalog = VoiceCatalog::new();
        catalog.replace_all(vec![
            voice("A", "en-US", false),
            voice("B", "en-GB", true),
            voice("C", "fr-FR", false),
        ]);

        let reps = catalog.representatives();
        let names: Vec<&str> = reps.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C"]);
    }

    #[test]
    fn test_representatives_first_seen_tie_break() {
        let mut catalog = VoiceCatalog::new();
        catalog.replace_all(vec![
            voice("A", "en-US", true),
            voice("B", "en-GB", true),
            voice("C", "de-DE", false),
            voice("D", "de-AT", false),
        ]);

        let reps = catalog.representatives();
        let names: Vec<&str> = reps.iter().map(|v| v.name.as_str()).collect();
        // Both groups keep their first-seen voice
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_representatives_idempotent() {
        let mut catalog = VoiceCatalog::new();
        catalog.replace_all(vec![
            voice("A", "en-US", false),
            voice("B", "en-GB", true),
            voice("C", "fr-FR", false),
        ]);

        let first: Vec<VoiceDescriptor> = catalog.representatives().into_iter().cloned().collect();
        let second: Vec<VoiceDescriptor> = catalog.representatives().into_iter().cloned().collect();
        assert_eq!(first, second);
    }
}
