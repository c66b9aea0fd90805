//! Playback session integration tests
//!
//! Drives the session manager against a scripted mock engine and verifies
//! the single-active-utterance contract, stop idempotence, error handling
//! and history side effects.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use voicelens::library::{HistoryEntry, HistorySink};
use voicelens::speech::{
    EngineEvent, PlaybackRequest, Session, SessionObserver, SessionState, SpeechEngine, Utterance,
};
use voicelens::voices::VoiceDescriptor;
use voicelens::{Result, VoiceLensError};

/// Everything the mock engine was asked to do, in order
#[derive(Debug, Clone, PartialEq)]
enum EngineCall {
    Speak(u64),
    Cancel,
}

#[derive(Default)]
struct EngineLog {
    calls: Vec<EngineCall>,
    utterances: Vec<Utterance>,
}

/// Scripted speech engine
///
/// Records calls; tests feed lifecycle events through `pending`.
struct MockEngine {
    log: Arc<Mutex<EngineLog>>,
    pending: Arc<Mutex<Vec<EngineEvent>>>,
    fail_speak: Arc<AtomicBool>,
}

impl MockEngine {
    fn new() -> (
        Self,
        Arc<Mutex<EngineLog>>,
        Arc<Mutex<Vec<EngineEvent>>>,
        Arc<AtomicBool>,
    ) {
        let log = Arc::new(Mutex::new(EngineLog::default()));
        let pending = Arc::new(Mutex::new(Vec::new()));
        let fail_speak = Arc::new(AtomicBool::new(false));
        (
            Self {
                log: Arc::clone(&log),
                pending: Arc::clone(&pending),
                fail_speak: Arc::clone(&fail_speak),
            },
            log,
            pending,
            fail_speak,
        )
    }
}

impl SpeechEngine for MockEngine {
    fn speak(&mut self, utterance: &Utterance) -> Result<()> {
        if self.fail_speak.load(Ordering::Relaxed) {
            return Err(VoiceLensError::Synthesis("mock speak failure".to_string()));
        }
        let mut log = self.log.lock().unwrap();
        log.calls.push(EngineCall::Speak(utterance.id));
        log.utterances.push(utterance.clone());
        Ok(())
    }

    fn cancel_all(&mut self) -> Result<()> {
        self.log.lock().unwrap().calls.push(EngineCall::Cancel);
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.pending.lock().unwrap())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Note {
    Started,
    Ended,
    Error(String),
}

/// Observer that records every notification
struct RecordingObserver(Arc<Mutex<Vec<Note>>>);

impl SessionObserver for RecordingObserver {
    fn speaking_started(&mut self) {
        self.0.lock().unwrap().push(Note::Started);
    }

    fn speaking_ended(&mut self) {
        self.0.lock().unwrap().push(Note::Ended);
    }

    fn error(&mut self, reason: &str) {
        self.0.lock().unwrap().push(Note::Error(reason.to_string()));
    }
}

/// History sink that records every entry
struct RecordingSink(Arc<Mutex<Vec<HistoryEntry>>>);

impl HistorySink for RecordingSink {
    fn record(&mut self, entry: HistoryEntry) -> Result<()> {
        self.0.lock().unwrap().push(entry);
        Ok(())
    }
}

struct Harness {
    session: Session,
    log: Arc<Mutex<EngineLog>>,
    pending: Arc<Mutex<Vec<EngineEvent>>>,
    notes: Arc<Mutex<Vec<Note>>>,
    history: Arc<Mutex<Vec<HistoryEntry>>>,
    fail_speak: Arc<AtomicBool>,
}

fn harness() -> Harness {
    let (engine, log, pending, fail_speak) = MockEngine::new();
    let mut session = Session::new(Box::new(engine));

    let notes = Arc::new(Mutex::new(Vec::new()));
    session.set_observer(Box::new(RecordingObserver(Arc::clone(&notes))));

    let history = Arc::new(Mutex::new(Vec::new()));
    session.set_history_sink(Box::new(RecordingSink(Arc::clone(&history))));

    Harness {
        session,
        log,
        pending,
        notes,
        history,
        fail_speak,
    }
}

fn push_events(harness: &Harness, events: &[EngineEvent]) {
    harness
        .pending
        .lock()
        .unwrap()
        .extend(events.iter().cloned());
}

#[test]
fn test_start_then_stop_returns_to_idle_without_history() {
    for (pitch, rate) in [(0.5, 0.5), (1.0, 1.0), (2.0, 2.0), (0.7, 1.3)] {
        let mut h = harness();
        let request = PlaybackRequest::new("some text")
            .unwrap()
            .with_pitch(pitch)
            .with_rate(rate);

        h.session.start(&request).unwrap();
        assert_eq!(h.session.state(), SessionState::Speaking);

        h.session.stop().unwrap();
        assert_eq!(h.session.state(), SessionState::Idle);

        // No completion-triggered history write
        assert!(h.history.lock().unwrap().is_empty());

        // Stop fired exactly one ended notification
        assert_eq!(*h.notes.lock().unwrap(), vec![Note::Ended]);
    }
}

#[test]
fn test_superseding_start_cancels_first_request() {
    let mut h = harness();
    let first = PlaybackRequest::new("first").unwrap();
    let second = PlaybackRequest::new("second").unwrap();

    h.session.start(&first).unwrap();
    h.session.start(&second).unwrap();

    // Engine saw cancel before each speak; second speak follows first's cancel
    let calls = h.log.lock().unwrap().calls.clone();
    assert_eq!(
        calls,
        vec![
            EngineCall::Cancel,
            EngineCall::Speak(1),
            EngineCall::Cancel,
            EngineCall::Speak(2),
        ]
    );

    // No intermediate Idle was observed during the supersede
    assert_eq!(h.session.state(), SessionState::Speaking);
    assert!(h.notes.lock().unwrap().is_empty());

    // Stale events from the cancelled first utterance are ignored; the
    // second request yields exactly one started/ended pair
    push_events(
        &h,
        &[
            EngineEvent::Ended(1),
            EngineEvent::Started(2),
            EngineEvent::Ended(2),
        ],
    );
    h.session.pump();

    assert_eq!(*h.notes.lock().unwrap(), vec![Note::Started, Note::Ended]);
    assert_eq!(h.session.state(), SessionState::Idle);
    assert_eq!(h.history.lock().unwrap().len(), 1);
}

#[test]
fn test_stop_is_idempotent() {
    let mut h = harness();

    h.session.stop().unwrap();
    h.session.stop().unwrap();

    assert_eq!(h.session.state(), SessionState::Idle);
    assert!(h.notes.lock().unwrap().is_empty());
    assert!(h.log.lock().unwrap().calls.is_empty());
}

#[test]
fn test_empty_text_never_reaches_the_engine() {
    let err = PlaybackRequest::new("   \n").unwrap_err();
    assert!(matches!(err, VoiceLensError::InputValidation(_)));
}

#[test]
fn test_natural_completion_writes_one_history_entry() {
    let mut h = harness();
    h.session
        .update_catalog(vec![VoiceDescriptor::new("X", "de-DE", true)]);

    let long_text = "a".repeat(60);
    let request = PlaybackRequest::new(long_text.clone())
        .unwrap()
        .with_voice("X");

    h.session.start(&request).unwrap();
    push_events(&h, &[EngineEvent::Started(1), EngineEvent::Ended(1)]);
    h.session.pump();

    let history = h.history.lock().unwrap();
    assert_eq!(history.len(), 1);
    let entry = &history[0];
    assert_eq!(entry.voice_used.as_deref(), Some("X"));
    assert_eq!(entry.language.as_deref(), Some("de-DE"));
    assert_eq!(
        entry.title.as_deref(),
        Some(format!("{}...", "a".repeat(50)).as_str())
    );
}

#[test]
fn test_history_defaults_without_resolved_voice() {
    let mut h = harness();
    // Voice name not in the (empty) catalog: fall back to platform default
    let request = PlaybackRequest::new("short text").unwrap().with_voice("Ghost");

    h.session.start(&request).unwrap();
    assert!(h.log.lock().unwrap().utterances[0].voice.is_none());

    push_events(&h, &[EngineEvent::Started(1), EngineEvent::Ended(1)]);
    h.session.pump();

    let history = h.history.lock().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].voice_used.as_deref(), Some("Default"));
    assert_eq!(history[0].language.as_deref(), Some("en-US"));
    assert_eq!(history[0].title.as_deref(), Some("short text"));
}

#[test]
fn test_history_dropped_without_user_identity() {
    let (engine, _log, pending, _fail_speak) = MockEngine::new();
    let mut session = Session::new(Box::new(engine));
    // No history sink attached: entry is dropped, not queued

    let request = PlaybackRequest::new("text").unwrap();
    session.start(&request).unwrap();
    pending
        .lock()
        .unwrap()
        .extend([EngineEvent::Started(1), EngineEvent::Ended(1)]);
    session.pump();

    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn test_platform_error_returns_to_idle_with_notification() {
    let mut h = harness();
    let request = PlaybackRequest::new("text").unwrap();

    h.session.start(&request).unwrap();
    push_events(
        &h,
        &[
            EngineEvent::Started(1),
            EngineEvent::Error(1, "no audio device".to_string()),
        ],
    );
    h.session.pump();

    assert_eq!(h.session.state(), SessionState::Idle);
    assert_eq!(
        *h.notes.lock().unwrap(),
        vec![Note::Started, Note::Error("no audio device".to_string())]
    );
    // No history row for a failed playback
    assert!(h.history.lock().unwrap().is_empty());
}

#[test]
fn test_synchronous_speak_failure_leaves_session_idle() {
    let mut h = harness();
    h.fail_speak.store(true, Ordering::Relaxed);

    let request = PlaybackRequest::new("text").unwrap();
    let err = h.session.start(&request).unwrap_err();

    assert!(matches!(err, VoiceLensError::Synthesis(_)));
    assert_eq!(h.session.state(), SessionState::Idle);
    // Nothing was speaking, so no ended notification accompanies the error
    assert!(h.notes.lock().unwrap().is_empty());
}

#[test]
fn test_failed_supersede_still_ends_the_cancelled_playback() {
    let mut h = harness();

    h.session.start(&PlaybackRequest::new("first").unwrap()).unwrap();
    push_events(&h, &[EngineEvent::Started(1)]);
    h.session.pump();

    // The superseding start cancels the first playback, then fails
    h.fail_speak.store(true, Ordering::Relaxed);
    let err = h
        .session
        .start(&PlaybackRequest::new("second").unwrap())
        .unwrap_err();

    assert!(matches!(err, VoiceLensError::Synthesis(_)));
    assert_eq!(h.session.state(), SessionState::Idle);

    // The view hears the cancelled playback end rather than staying stuck
    // on "speaking"
    assert_eq!(*h.notes.lock().unwrap(), vec![Note::Started, Note::Ended]);
    assert!(h.history.lock().unwrap().is_empty());
}

#[test]
fn test_resolved_voice_reaches_the_engine() {
    let mut h = harness();
    h.session.update_catalog(vec![
        VoiceDescriptor::new("Anna", "de-DE", true),
        VoiceDescriptor::new("Brigitte", "fr-FR", false),
    ]);

    let request = PlaybackRequest::new("bonjour")
        .unwrap()
        .with_voice("Brigitte")
        .with_pitch(1.5)
        .with_rate(0.8);
    h.session.start(&request).unwrap();

    let log = h.log.lock().unwrap();
    let utterance = &log.utterances[0];
    let voice = utterance.voice.as_ref().unwrap();
    assert_eq!(voice.name, "Brigitte");
    assert_eq!(voice.language_tag, "fr-FR");
    assert_eq!(utterance.pitch, 1.5);
    assert_eq!(utterance.rate, 0.8);
}
