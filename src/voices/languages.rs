//! Language display names for the voice gallery
//!
//! Maps primary language subtags to English names so gallery cards can show
//! "German" instead of "de-DE".

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Language subtag -> display name
static LANGUAGE_NAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("en", "English");
    m.insert("es", "Spanish");
    m.insert("fr", "French");
    m.insert("de", "German");
    m.insert("it", "Italian");
    m.insert("pt", "Portuguese");
    m.insert("ru", "Russian");
    m.insert("ja", "Japanese");
    m.insert("ko", "Korean");
    m.insert("zh", "Chinese");
    m.insert("ar", "Arabic");
    m.insert("hi", "Hindi");
    m.insert("bn", "Bengali");
    m.insert("pa", "Punjabi");
    m.insert("te", "Telugu");
    m.insert("mr", "Marathi");
    m.insert("ta", "Tamil");
    m.insert("ur", "Urdu");
    m.insert("gu", "Gujarati");
    m.insert("kn", "Kannada");
    m.insert("ml", "Malayalam");
    m.insert("th", "Thai");
    m.insert("vi", "Vietnamese");
    m.insert("id", "Indonesian");
    m.insert("tr", "Turkish");
    m.insert("pl", "Polish");
    m.insert("uk", "Ukrainian");
    m.insert("ro", "Romanian");
    m.insert("nl", "Dutch");
    m.insert("el", "Greek");
    m.insert("cs", "Czech");
    m.insert("sv", "Swedish");
    m.insert("hu", "Hungarian");
    m.insert("fi", "Finnish");
    m.insert("da", "Danish");
    m.insert("no", "Norwegian");
    m.insert("sk", "Slovak");
    m.insert("he", "Hebrew");
    m.insert("af", "Afrikaans");
    m
});

/// Display name for a language tag
///
/// Accepts a full tag ("en-US") or a bare subtag ("en"). Unknown languages
/// fall back to the tag itself.
pub fn language_name(tag: &str) -> &str {
    let subtag = tag.split(['-', '_']).next().unwrap_or(tag);
    LANGUAGE_NAMES.get(subtag).copied().unwrap_or(tag)
}
