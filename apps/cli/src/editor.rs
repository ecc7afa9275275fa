//! Editor session state: chat transcript, code buffer, and auto-save.
//!
//! The session holds the transcript and current code in memory. A periodic
//! task persists the code when it drifts from the last-persisted value,
//! guarded by a busy flag so a slow save suppresses the next tick instead
//! of overlapping it. The guard is advisory: cross-tab and cross-device
//! conflicts stay last-write-wins at the database layer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

use crate::client::{Generation, ProjectDetail};

/// Fixed greeting that opens every transcript.
pub const GREETING: &str = "Hello! I am CodeGenesis. Describe what you want to build, \
and I will architect and code it for you.";

/// Fixed acknowledgment appended after each successful generation.
pub const ACKNOWLEDGMENT: &str = "I've updated the code based on your request.";

/// Auto-save interval.
pub const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(10);

/// Placeholder document shown before the first generation.
pub const DEFAULT_PREVIEW_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Preview</title>
</head>
<body>
    <h1>Ready to Build</h1>
    <p>Enter a prompt to start generating your application.</p>
</body>
</html>
"#;

/// Who said a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One transcript message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// In-memory editor session state.
#[derive(Debug)]
pub struct SessionState {
    pub messages: Vec<Message>,
    pub code: String,
    /// Last value successfully persisted; auto-save compares against this.
    pub last_saved_code: String,
    /// Busy flag preventing overlapping saves.
    pub saving: bool,
}

impl SessionState {
    /// Fresh session for an unsaved scratch buffer.
    pub fn new() -> Self {
        Self {
            messages: vec![Message::assistant(GREETING)],
            code: DEFAULT_PREVIEW_HTML.to_string(),
            last_saved_code: DEFAULT_PREVIEW_HTML.to_string(),
            saving: false,
        }
    }

    /// Seed the session from a stored project: code from the file map,
    /// transcript replayed from generations oldest-first, prefixed by the
    /// fixed greeting.
    pub fn from_project(detail: &ProjectDetail) -> Self {
        let code = code_from_files(detail.project.files.as_ref())
            .unwrap_or_else(|| DEFAULT_PREVIEW_HTML.to_string());

        Self {
            messages: replay_transcript(&detail.generations),
            last_saved_code: code.clone(),
            code,
            saving: false,
        }
    }

    /// Append the user's prompt at the start of a turn.
    pub fn begin_turn(&mut self, prompt: &str) {
        self.messages.push(Message::user(prompt));
    }

    /// A generation turn succeeded: replace the code buffer and append the
    /// fixed acknowledgment.
    pub fn complete_turn(&mut self, code: String) {
        self.code = code;
        self.messages.push(Message::assistant(ACKNOWLEDGMENT));
    }

    /// A generation turn failed: record the error in the transcript and
    /// leave the code buffer untouched.
    pub fn fail_turn(&mut self, error: &str) {
        self.messages
            .push(Message::assistant(format!("Error: {}", error)));
    }

    /// Whether the buffer has drifted from the last persisted value.
    pub fn is_dirty(&self) -> bool {
        self.code != self.last_saved_code
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Replay stored generations into transcript order.
pub fn replay_transcript(generations: &[Generation]) -> Vec<Message> {
    let mut messages = vec![Message::assistant(GREETING)];
    for gen in generations {
        messages.push(Message::user(&gen.prompt));
        messages.push(Message::assistant(
            gen.response.as_deref().unwrap_or(ACKNOWLEDGMENT),
        ));
    }
    messages
}

/// Pull the single file's content out of the stored file map.
pub fn code_from_files(files: Option<&JsonValue>) -> Option<String> {
    files?
        .get("index.html")?
        .get("content")?
        .as_str()
        .map(|s| s.to_string())
}

/// Persistence seam for the auto-save loop.
#[async_trait]
pub trait ProjectSaver: Send + Sync {
    async fn save_files(&self, project_id: Uuid, files: &JsonValue) -> Result<(), String>;
}

/// What one auto-save tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Buffer matched the last persisted value; no network call.
    SkippedUnchanged,
    /// A save was already in flight; no network call.
    SkippedInFlight,
    Saved,
    Failed,
}

/// Periodic auto-save over shared session state.
pub struct AutoSaver<S: ProjectSaver> {
    state: Arc<Mutex<SessionState>>,
    saver: S,
    project_id: Uuid,
}

impl<S: ProjectSaver> AutoSaver<S> {
    pub fn new(state: Arc<Mutex<SessionState>>, saver: S, project_id: Uuid) -> Self {
        Self {
            state,
            saver,
            project_id,
        }
    }

    /// Run ticks forever at the auto-save interval.
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(AUTOSAVE_INTERVAL);
        // The first tick of a tokio interval fires immediately; consume it
        // so the loop waits a full interval before the first save attempt.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if let TickOutcome::Failed = self.tick().await {
                // Failure waits for the next tick; no backoff, no queue
                warn!("Auto-save failed; will retry on next tick");
            }
        }
    }

    /// One auto-save tick: skip if unchanged or already in flight,
    /// otherwise persist the current buffer.
    pub async fn tick(&self) -> TickOutcome {
        let code = {
            let mut state = self.state.lock().await;
            if state.saving {
                return TickOutcome::SkippedInFlight;
            }
            if !state.is_dirty() {
                return TickOutcome::SkippedUnchanged;
            }
            state.saving = true;
            state.code.clone()
        };

        let files = crate::files_map(&code);
        let result = self.saver.save_files(self.project_id, &files).await;

        let mut state = self.state.lock().await;
        state.saving = false;
        match result {
            Ok(()) => {
                state.last_saved_code = code;
                TickOutcome::Saved
            }
            Err(e) => {
                warn!("Auto-save error: {}", e);
                TickOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Saver that counts calls and can be told to fail.
    struct FakeSaver {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl ProjectSaver for FakeSaver {
        async fn save_files(&self, _project_id: Uuid, _files: &JsonValue) -> Result<(), String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err("save failed".to_string())
            } else {
                Ok(())
            }
        }
    }

    fn autosaver(state: Arc<Mutex<SessionState>>, fail: bool) -> (AutoSaver<FakeSaver>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let saver = FakeSaver {
            calls: calls.clone(),
            fail,
        };
        (AutoSaver::new(state, saver, Uuid::new_v4()), calls)
    }

    fn sample_generation(prompt: &str, response: Option<&str>) -> Generation {
        Generation {
            id: Uuid::new_v4(),
            prompt: prompt.to_string(),
            response: response.map(|s| s.to_string()),
            model_used: "gpt-4o".to_string(),
            provider: "openai".to_string(),
            success: true,
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn unchanged_buffer_skips_the_save_call() {
        let state = Arc::new(Mutex::new(SessionState::new()));
        let (autosaver, calls) = autosaver(state, false);

        assert_eq!(autosaver.tick().await, TickOutcome::SkippedUnchanged);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn dirty_buffer_saves_once_then_skips() {
        let state = Arc::new(Mutex::new(SessionState::new()));
        state.lock().await.code = "<html>edited</html>".to_string();

        let (autosaver, calls) = autosaver(state.clone(), false);

        assert_eq!(autosaver.tick().await, TickOutcome::Saved);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!state.lock().await.is_dirty());

        // Buffer now matches the persisted value; the next tick is silent
        assert_eq!(autosaver.tick().await, TickOutcome::SkippedUnchanged);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn in_flight_save_suppresses_the_tick() {
        let state = Arc::new(Mutex::new(SessionState::new()));
        {
            let mut s = state.lock().await;
            s.code = "<html>edited</html>".to_string();
            s.saving = true;
        }

        let (autosaver, calls) = autosaver(state, false);

        assert_eq!(autosaver.tick().await, TickOutcome::SkippedInFlight);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_save_keeps_buffer_dirty_and_retries_next_tick() {
        let state = Arc::new(Mutex::new(SessionState::new()));
        state.lock().await.code = "<html>edited</html>".to_string();

        let (autosaver, calls) = autosaver(state.clone(), true);

        assert_eq!(autosaver.tick().await, TickOutcome::Failed);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // last_saved_code unchanged, busy flag released, next tick retries
        let s = state.lock().await;
        assert!(s.is_dirty());
        assert!(!s.saving);
        drop(s);

        assert_eq!(autosaver.tick().await, TickOutcome::Failed);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_buffer_never_saves_as_intervals_elapse() {
        let state = Arc::new(Mutex::new(SessionState::new()));
        let (autosaver, calls) = autosaver(state, false);

        let handle = tokio::spawn(async move { autosaver.run().await });
        // Paused clock auto-advances; three full intervals pass
        tokio::time::sleep(AUTOSAVE_INTERVAL * 3 + Duration::from_secs(1)).await;
        handle.abort();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dirty_buffer_is_saved_after_the_interval() {
        let state = Arc::new(Mutex::new(SessionState::new()));
        state.lock().await.code = "<html>edited</html>".to_string();

        let (autosaver, calls) = autosaver(state.clone(), false);

        let handle = tokio::spawn(async move { autosaver.run().await });
        tokio::time::sleep(AUTOSAVE_INTERVAL + Duration::from_secs(1)).await;
        handle.abort();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!state.lock().await.is_dirty());
    }

    #[test]
    fn transcript_replays_generations_oldest_first_after_greeting() {
        let generations = vec![
            sample_generation("build a todo app", None),
            sample_generation("make it dark mode", Some("Switched to dark mode.")),
        ];

        let messages = replay_transcript(&generations);

        assert_eq!(messages[0], Message::assistant(GREETING));
        assert_eq!(messages[1], Message::user("build a todo app"));
        assert_eq!(messages[2], Message::assistant(ACKNOWLEDGMENT));
        assert_eq!(messages[3], Message::user("make it dark mode"));
        assert_eq!(messages[4], Message::assistant("Switched to dark mode."));
        assert_eq!(messages.len(), 5);
    }

    #[test]
    fn code_is_seeded_from_the_stored_file_map() {
        let files = serde_json::json!({
            "index.html": { "content": "<html>stored</html>", "language": "html" }
        });
        assert_eq!(
            code_from_files(Some(&files)).as_deref(),
            Some("<html>stored</html>")
        );
        assert_eq!(code_from_files(None), None);

        let wrong_shape = serde_json::json!({ "index.html": "just a string" });
        assert_eq!(code_from_files(Some(&wrong_shape)), None);
    }

    #[test]
    fn turn_transitions_update_transcript_and_buffer() {
        let mut state = SessionState::new();

        state.begin_turn("build a timer");
        state.complete_turn("<html>timer</html>".to_string());
        assert_eq!(state.code, "<html>timer</html>");
        assert_eq!(
            state.messages.last(),
            Some(&Message::assistant(ACKNOWLEDGMENT))
        );
        assert!(state.is_dirty());

        let before = state.code.clone();
        state.begin_turn("break it");
        state.fail_turn("provider exploded");
        // Failure records the error and leaves the buffer alone
        assert_eq!(state.code, before);
        assert_eq!(
            state.messages.last().unwrap().content,
            "Error: provider exploded"
        );
    }
}
