//! Code frame state: the held document, AI action lifecycle, and the
//! transient indicators shown around it.
//!
//! Time is passed in explicitly so the timers can be driven by the UI tick.

use std::time::{Duration, Instant};

use crate::ai::{
    AiAction, AiError, AiRequest, AssistantSettings, CodeAssistant, Completion, PendingRequest,
    Ticket,
};
use crate::clipboard::{ClipboardError, ClipboardSink};
use crate::credential::Credential;
use crate::document::CodeDocument;
use crate::fence::strip_code_fences;

pub const NEEDS_CREDENTIAL_MESSAGE: &str = "Please add an API Key above to use AI features.";
pub const ACTION_FAILED_MESSAGE: &str = "Error processing request.";
pub const ADVISORY_TIMEOUT: Duration = Duration::from_secs(3);
pub const COPIED_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameState {
    Idle,
    Pending { ticket: Ticket, action: AiAction },
    /// An explanation panel, kept until replaced or dismissed.
    Displaying(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub text: String,
    pub expires_at: Option<Instant>,
}

pub enum TriggerOutcome {
    Dispatched(PendingRequest),
    NeedsCredential,
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The held code was replaced; the owner should adopt the new text.
    Replaced(String),
    Explained,
    Failed,
    /// The document changed while the request was in flight.
    Discarded,
    /// The completion belongs to a cancelled or superseded request.
    Ignored,
}

pub struct CodeFrame {
    document: CodeDocument,
    revision: u64,
    assistant: CodeAssistant,
    settings: AssistantSettings,
    state: FrameState,
    advisory: Option<Advisory>,
    copied_until: Option<Instant>,
    next_ticket: u64,
}

impl CodeFrame {
    pub fn new(document: CodeDocument, credential: &Credential, settings: AssistantSettings) -> Self {
        Self {
            document,
            revision: 0,
            assistant: CodeAssistant::new(credential, &settings),
            settings,
            state: FrameState::Idle,
            advisory: None,
            copied_until: None,
            next_ticket: 1,
        }
    }

    pub fn document(&self) -> &CodeDocument {
        &self.document
    }

    pub fn code(&self) -> &str {
        &self.document.code
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn state(&self) -> &FrameState {
        &self.state
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.state, FrameState::Pending { .. })
    }

    pub fn advisory(&self) -> Option<&Advisory> {
        self.advisory.as_ref()
    }

    pub fn explanation(&self) -> Option<&str> {
        match &self.state {
            FrameState::Displaying(text) => Some(text),
            _ => None,
        }
    }

    pub fn copied(&self) -> bool {
        self.copied_until.is_some()
    }

    pub fn has_credential(&self) -> bool {
        self.assistant.has_credential()
    }

    /// Adopt the owner's props. A different code string replaces the held
    /// copy and starts a new revision.
    pub fn sync_props(&mut self, props: &CodeDocument) {
        if props.code != self.document.code {
            self.revision += 1;
            tracing::debug!(revision = self.revision, "frame code replaced by owner");
        }
        self.document.clone_from(props);
    }

    pub fn set_credential(&mut self, credential: &Credential) {
        self.assistant = CodeAssistant::new(credential, &self.settings);
    }

    pub fn set_settings(&mut self, settings: AssistantSettings, credential: &Credential) {
        self.settings = settings;
        self.set_credential(credential);
    }

    pub fn trigger(&mut self, action: AiAction, now: Instant) -> TriggerOutcome {
        if self.is_processing() {
            return TriggerOutcome::Busy;
        }

        if !self.assistant.has_credential() {
            if matches!(self.state, FrameState::Displaying(_)) {
                self.state = FrameState::Idle;
            }
            self.advisory = Some(Advisory {
                text: NEEDS_CREDENTIAL_MESSAGE.to_string(),
                expires_at: Some(now + ADVISORY_TIMEOUT),
            });
            return TriggerOutcome::NeedsCredential;
        }

        let ticket = Ticket {
            id: self.next_ticket,
            revision: self.revision,
        };
        self.next_ticket += 1;
        self.advisory = None;
        self.state = FrameState::Pending { ticket, action };

        tracing::info!(?action, ticket = ticket.id, "dispatching frame action");
        let request = AiRequest::Action {
            action,
            code: self.document.code.clone(),
        };
        TriggerOutcome::Dispatched(PendingRequest::new(ticket, request, self.assistant.clone()))
    }

    pub fn resolve(&mut self, completion: Completion) -> Resolution {
        let action = match &self.state {
            FrameState::Pending { ticket, action } if ticket.id == completion.ticket.id => *action,
            _ => {
                tracing::debug!(ticket = completion.ticket.id, "ignoring completion for inactive request");
                return Resolution::Ignored;
            }
        };

        // The owner replaced the code while the request was in flight.
        if completion.ticket.revision != self.revision {
            tracing::info!(ticket = completion.ticket.id, "discarding stale frame action result");
            self.state = FrameState::Idle;
            return Resolution::Discarded;
        }

        match completion.result {
            Ok(text) if action.rewrites_code() => {
                let code = strip_code_fences(&text);
                self.document.code.clone_from(&code);
                self.state = FrameState::Idle;
                Resolution::Replaced(code)
            }
            Ok(text) => {
                self.state = FrameState::Displaying(text);
                Resolution::Explained
            }
            Err(err) => {
                if err == AiError::CredentialMissing {
                    tracing::warn!("frame action ran without a credential");
                }
                self.advisory = Some(Advisory {
                    text: ACTION_FAILED_MESSAGE.to_string(),
                    expires_at: None,
                });
                self.state = FrameState::Idle;
                Resolution::Failed
            }
        }
    }

    /// Forget the in-flight request; its completion will be ignored.
    pub fn cancel(&mut self) -> bool {
        if self.is_processing() {
            self.state = FrameState::Idle;
            true
        } else {
            false
        }
    }

    pub fn dismiss(&mut self) {
        if matches!(self.state, FrameState::Displaying(_)) {
            self.state = FrameState::Idle;
        }
        self.advisory = None;
    }

    pub fn copy_to_clipboard(
        &mut self,
        clipboard: &mut impl ClipboardSink,
        now: Instant,
    ) -> Result<(), ClipboardError> {
        clipboard.set_text(&self.document.code)?;
        self.copied_until = Some(now + COPIED_TIMEOUT);
        Ok(())
    }

    /// Expire the advisory and copied indicator.
    pub fn tick(&mut self, now: Instant) {
        if self
            .advisory
            .as_ref()
            .and_then(|a| a.expires_at)
            .is_some_and(|at| now >= at)
        {
            self.advisory = None;
        }
        if self.copied_until.is_some_and(|at| now >= at) {
            self.copied_until = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;

    fn frame_with_key(code: &str) -> CodeFrame {
        CodeFrame::new(
            CodeDocument::new(code),
            &Credential::new("key"),
            AssistantSettings::default(),
        )
    }

    fn dispatch(frame: &mut CodeFrame, action: AiAction) -> Ticket {
        match frame.trigger(action, Instant::now()) {
            TriggerOutcome::Dispatched(pending) => pending.ticket,
            _ => panic!("expected dispatch"),
        }
    }

    fn ok(ticket: Ticket, text: &str) -> Completion {
        Completion {
            ticket,
            result: Ok(text.to_string()),
        }
    }

    #[test]
    fn test_fenced_response_replaces_code() {
        for action in [AiAction::Refactor, AiAction::FixBugs, AiAction::AddTypes] {
            let mut frame = frame_with_key("let x = 1");
            let ticket = dispatch(&mut frame, action);
            let resolution = frame.resolve(ok(ticket, "```ts\nconst x: number = 1;\n```"));

            assert_eq!(resolution, Resolution::Replaced("const x: number = 1;".into()));
            assert_eq!(frame.code(), "const x: number = 1;");
            assert_eq!(frame.state(), &FrameState::Idle);
        }
    }

    #[test]
    fn test_explain_never_mutates_code() {
        let mut frame = frame_with_key("let x = 1");
        let ticket = dispatch(&mut frame, AiAction::Explain);
        let resolution = frame.resolve(ok(ticket, "```js\nreplacement();\n```"));

        assert_eq!(resolution, Resolution::Explained);
        assert_eq!(frame.code(), "let x = 1");
        assert_eq!(frame.explanation(), Some("```js\nreplacement();\n```"));
    }

    #[test]
    fn test_missing_credential_advisory_expires_after_three_seconds() {
        let mut frame = CodeFrame::new(
            CodeDocument::new("x"),
            &Credential::default(),
            AssistantSettings::default(),
        );
        let start = Instant::now();

        assert!(matches!(frame.trigger(AiAction::Refactor, start), TriggerOutcome::NeedsCredential));
        assert_eq!(frame.state(), &FrameState::Idle);
        assert_eq!(frame.advisory().map(|a| a.text.as_str()), Some(NEEDS_CREDENTIAL_MESSAGE));

        frame.tick(start + Duration::from_millis(2999));
        assert!(frame.advisory().is_some());

        frame.tick(start + ADVISORY_TIMEOUT);
        assert!(frame.advisory().is_none());
    }

    #[test]
    fn test_failure_sets_persistent_advisory() {
        let mut frame = frame_with_key("x");
        let ticket = dispatch(&mut frame, AiAction::FixBugs);
        let resolution = frame.resolve(Completion {
            ticket,
            result: Err(AiError::Upstream("Failed to process code.".into())),
        });

        assert_eq!(resolution, Resolution::Failed);
        assert_eq!(frame.state(), &FrameState::Idle);
        assert_eq!(frame.code(), "x");

        frame.tick(Instant::now() + Duration::from_secs(60));
        assert_eq!(frame.advisory().map(|a| a.text.as_str()), Some(ACTION_FAILED_MESSAGE));
    }

    #[test]
    fn test_second_trigger_while_pending_is_busy() {
        let mut frame = frame_with_key("x");
        dispatch(&mut frame, AiAction::Refactor);
        assert!(matches!(frame.trigger(AiAction::Explain, Instant::now()), TriggerOutcome::Busy));
    }

    #[test]
    fn test_external_update_discards_stale_result() {
        let mut frame = frame_with_key("old");
        let ticket = dispatch(&mut frame, AiAction::Refactor);

        frame.sync_props(&CodeDocument::new("newer from owner"));
        let resolution = frame.resolve(ok(ticket, "refactored old"));

        assert_eq!(resolution, Resolution::Discarded);
        assert_eq!(frame.code(), "newer from owner");
        assert_eq!(frame.state(), &FrameState::Idle);
    }

    #[test]
    fn test_sync_with_same_code_keeps_revision() {
        let mut frame = frame_with_key("same");
        let mut props = CodeDocument::new("same");
        props.title = "Renamed.ts".into();
        frame.sync_props(&props);

        assert_eq!(frame.revision(), 0);
        assert_eq!(frame.document().title, "Renamed.ts");
    }

    #[test]
    fn test_cancelled_request_is_ignored() {
        let mut frame = frame_with_key("x");
        let ticket = dispatch(&mut frame, AiAction::Refactor);
        assert!(frame.cancel());

        assert_eq!(frame.resolve(ok(ticket, "y")), Resolution::Ignored);
        assert_eq!(frame.code(), "x");
    }

    #[test]
    fn test_credential_update_rebuilds_assistant() {
        let mut frame = frame_with_key("x");
        frame.set_credential(&Credential::default());
        assert!(!frame.has_credential());
        assert!(matches!(frame.trigger(AiAction::Refactor, Instant::now()), TriggerOutcome::NeedsCredential));

        frame.set_credential(&Credential::new("fresh"));
        assert!(matches!(frame.trigger(AiAction::Refactor, Instant::now()), TriggerOutcome::Dispatched(_)));
    }

    #[test]
    fn test_copy_sets_indicator_for_two_seconds() {
        let mut frame = frame_with_key("console.log('hi')");
        let mut clipboard = MemoryClipboard::default();
        let start = Instant::now();

        frame.copy_to_clipboard(&mut clipboard, start).unwrap();
        assert_eq!(clipboard.contents.as_deref(), Some("console.log('hi')"));
        assert!(frame.copied());

        frame.tick(start + Duration::from_millis(1999));
        assert!(frame.copied());

        frame.tick(start + COPIED_TIMEOUT);
        assert!(!frame.copied());
    }

    #[test]
    fn test_new_trigger_clears_explanation() {
        let mut frame = frame_with_key("x");
        let ticket = dispatch(&mut frame, AiAction::Explain);
        frame.resolve(ok(ticket, "It assigns x."));
        assert!(frame.explanation().is_some());

        dispatch(&mut frame, AiAction::Refactor);
        assert!(frame.explanation().is_none());
    }
}
