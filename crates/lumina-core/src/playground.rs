//! Playground session: the document being edited, prompt-based generation,
//! image export, and the embedded code frame.

use std::path::PathBuf;
use std::time::Instant;

use crate::ai::{AiRequest, AssistantSettings, CodeAssistant, Completion, PendingRequest, Ticket};
use crate::credential::Credential;
use crate::document::CodeDocument;
use crate::export::ExportError;
use crate::fence::strip_code_fences;
use crate::frame::{CodeFrame, Resolution};

pub const GENERATE_FAILED_ALERT: &str = "Failed to generate code.";
pub const EXPORT_FAILED_ALERT: &str = "Failed to download image.";

pub struct Playground {
    credential: Credential,
    settings: AssistantSettings,
    document: CodeDocument,
    pub prompt: String,
    generating: Option<Ticket>,
    exporting: bool,
    alert: Option<String>,
    last_export: Option<PathBuf>,
    frame: CodeFrame,
    next_ticket: u64,
}

impl Playground {
    pub fn new(credential: Credential, settings: AssistantSettings) -> Self {
        Self::with_document(CodeDocument::playground_default(), credential, settings)
    }

    pub fn with_document(
        document: CodeDocument,
        credential: Credential,
        settings: AssistantSettings,
    ) -> Self {
        let frame = CodeFrame::new(document.clone(), &credential, settings.clone());
        Self {
            credential,
            settings,
            document,
            prompt: String::new(),
            generating: None,
            exporting: false,
            alert: None,
            last_export: None,
            frame,
            next_ticket: 1,
        }
    }

    pub fn document(&self) -> &CodeDocument {
        &self.document
    }

    pub fn frame(&self) -> &CodeFrame {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut CodeFrame {
        &mut self.frame
    }

    pub fn settings(&self) -> &AssistantSettings {
        &self.settings
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn is_generating(&self) -> bool {
        self.generating.is_some()
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn last_export(&self) -> Option<&PathBuf> {
        self.last_export.as_ref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn set_credential(&mut self, credential: Credential) {
        self.frame.set_credential(&credential);
        self.credential = credential;
    }

    pub fn set_settings(&mut self, settings: AssistantSettings) {
        self.frame.set_settings(settings.clone(), &self.credential);
        self.settings = settings;
    }

    /// Apply an edit to the document and push it down to the frame.
    pub fn update(&mut self, edit: impl FnOnce(&mut CodeDocument)) {
        edit(&mut self.document);
        self.frame.sync_props(&self.document);
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        let code = code.into();
        self.update(|doc| doc.code = code);
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        self.update(|doc| doc.title = title);
    }

    pub fn set_language(&mut self, language: impl Into<String>) {
        let language = language.into();
        self.update(|doc| doc.language = language);
    }

    pub fn cycle_theme(&mut self) {
        self.update(|doc| doc.theme = doc.theme.next());
    }

    pub fn cycle_padding(&mut self) {
        self.update(|doc| doc.padding = doc.padding.next());
    }

    pub fn toggle_line_numbers(&mut self) {
        self.update(|doc| doc.show_line_numbers = !doc.show_line_numbers);
    }

    pub fn toggle_wrap(&mut self) {
        self.update(|doc| doc.wrap_long_lines = !doc.wrap_long_lines);
    }

    /// Adopt a code change reported by the frame.
    pub fn apply_frame_resolution(&mut self, resolution: &Resolution) {
        if let Resolution::Replaced(code) = resolution {
            self.document.code.clone_from(code);
            self.frame.sync_props(&self.document);
        }
    }

    /// Resolve a frame action and propagate any code change upward.
    pub fn resolve_frame_action(&mut self, completion: Completion) -> Resolution {
        let resolution = self.frame.resolve(completion);
        self.apply_frame_resolution(&resolution);
        resolution
    }

    pub fn tick(&mut self, now: Instant) {
        self.frame.tick(now);
    }

    /// Start generating code from the prompt. Does nothing without a
    /// credential, with an empty prompt, or while a generation is running.
    pub fn generate(&mut self) -> Option<PendingRequest> {
        if !self.credential.is_present() || self.prompt.trim().is_empty() || self.is_generating() {
            return None;
        }

        let ticket = Ticket {
            id: self.next_ticket,
            revision: self.frame.revision(),
        };
        self.next_ticket += 1;
        self.generating = Some(ticket);

        tracing::info!(ticket = ticket.id, "generating code from prompt");
        let assistant = CodeAssistant::new(&self.credential, &self.settings);
        let request = AiRequest::Generate {
            prompt: self.prompt.trim().to_string(),
        };
        Some(PendingRequest::new(ticket, request, assistant))
    }

    /// Returns true when the document was replaced.
    pub fn finish_generate(&mut self, completion: Completion) -> bool {
        if self.generating.map(|t| t.id) != Some(completion.ticket.id) {
            tracing::debug!(ticket = completion.ticket.id, "ignoring completion for inactive generation");
            return false;
        }
        self.generating = None;

        match completion.result {
            Ok(text) => {
                self.set_code(strip_code_fences(&text));
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "code generation failed");
                self.alert = Some(GENERATE_FAILED_ALERT.to_string());
                false
            }
        }
    }

    pub fn cancel_generate(&mut self) -> bool {
        self.generating.take().is_some()
    }

    /// Mark an export as started. False if one is already running.
    pub fn begin_export(&mut self) -> bool {
        if self.exporting {
            return false;
        }
        self.exporting = true;
        true
    }

    pub fn finish_export(&mut self, result: Result<PathBuf, ExportError>) {
        self.exporting = false;
        match result {
            Ok(path) => self.last_export = Some(path),
            Err(e) => {
                tracing::error!(error = %e, "failed to export frame image");
                self.alert = Some(EXPORT_FAILED_ALERT.to_string());
            }
        }
    }
}
