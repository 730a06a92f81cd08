use std::path::PathBuf;
use std::time::Instant;

use ab_glyph::FontArc;
use lumina_core::export::CAPTURE_SCALE;
use lumina_core::font::{load_font, LABEL_FONT_CANDIDATES, MONO_FONT_CANDIDATES};
use lumina_core::{
    export_image, AiAction, Config, Credential, ExportError, GeminiClient, PendingRequest,
    Playground, Resolution, SystemClipboard, TriggerOutcome,
};
use ratatui::buffer::Buffer;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::capture::BufferCapture;
use crate::input::TextInput;
use crate::tui::AppEvent;
use crate::widget::{max_scroll, render_offscreen, CodeFrameView};

/// Largest frame produced for export, in cells.
const EXPORT_MAX_WIDTH: u16 = 140;
const EXPORT_MAX_HEIGHT: u16 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Playground,
    Docs,
}

impl Screen {
    pub fn all() -> [Screen; 3] {
        [Screen::Home, Screen::Playground, Screen::Docs]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Screen::Home => "Home",
            Screen::Playground => "Playground",
            Screen::Docs => "Docs",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Playground pane that receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Frame,
    Prompt,
    Code,
    Title,
    Language,
}

impl Field {
    pub fn next(&self) -> Self {
        match self {
            Field::Frame => Field::Prompt,
            Field::Prompt => Field::Code,
            Field::Code => Field::Title,
            Field::Title => Field::Language,
            Field::Language => Field::Frame,
        }
    }

    pub fn is_text(&self) -> bool {
        !matches!(self, Field::Frame)
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub focus: Field,

    // Playground state
    pub playground: Playground,
    pub prompt_input: TextInput,
    pub code_input: TextInput,
    pub title_input: TextInput,
    pub language_input: TextInput,
    pub frame_task: Option<JoinHandle<()>>,
    pub generate_task: Option<JoinHandle<()>>,
    pub export_task: Option<JoinHandle<()>>,
    pub status: Option<String>,
    /// First code line shown in the frame preview.
    pub frame_scroll: usize,

    // API key input state
    pub show_api_key_input: bool,
    pub api_key_input: TextInput,

    // Docs state
    pub docs_scroll: u16,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Session resources
    pub export_dir: PathBuf,
    /// Config file the model choice is saved to; `None` keeps it in memory.
    pub config_path: Option<PathBuf>,
    clipboard: SystemClipboard,
    label_font: Option<FontArc>,
    mono_font: Option<FontArc>,

    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(config: &Config, credential: Credential, events: UnboundedSender<AppEvent>) -> Self {
        let document = config.initial_document();
        let playground = Playground::with_document(document.clone(), credential, config.assistant_settings());

        let font_path = config.font_path.as_deref();
        let label_font = load_font(font_path, LABEL_FONT_CANDIDATES);
        let mono_font = load_font(None, MONO_FONT_CANDIDATES);

        Self {
            should_quit: false,
            screen: Screen::Home,
            input_mode: InputMode::Normal,
            focus: Field::Frame,

            prompt_input: TextInput::default(),
            code_input: TextInput::with_value(&document.code),
            title_input: TextInput::with_value(&document.title),
            language_input: TextInput::with_value(&document.language),
            playground,
            frame_task: None,
            generate_task: None,
            export_task: None,
            status: None,
            frame_scroll: 0,

            show_api_key_input: false,
            api_key_input: TextInput::default(),

            docs_scroll: 0,
            animation_frame: 0,

            export_dir: config.export_dir(),
            config_path: None,
            clipboard: SystemClipboard::new(),
            label_font,
            mono_font,

            events,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.playground.frame().is_processing() || self.playground.is_generating() || self.playground.is_exporting()
    }

    /// Tick animation and expire frame timers (called by Tick event)
    pub fn tick(&mut self, now: Instant) {
        self.playground.tick(now);
        if self.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    fn spawn_request(&self, pending: PendingRequest, wrap: fn(lumina_core::Completion) -> AppEvent) -> JoinHandle<()> {
        let tx = self.events.clone();
        tokio::spawn(async move {
            let completion = pending.run().await;
            let _ = tx.send(wrap(completion));
        })
    }

    pub fn trigger_action(&mut self, action: AiAction) {
        match self.playground.frame_mut().trigger(action, Instant::now()) {
            TriggerOutcome::Dispatched(pending) => {
                self.frame_task = Some(self.spawn_request(pending, AppEvent::FrameAction));
            }
            TriggerOutcome::NeedsCredential => {}
            TriggerOutcome::Busy => tracing::debug!(?action, "frame busy, ignoring action"),
        }
    }

    pub fn finish_action(&mut self, completion: lumina_core::Completion) {
        self.frame_task = None;
        if let Resolution::Replaced(_) = self.playground.resolve_frame_action(completion) {
            self.sync_inputs();
        }
    }

    pub fn start_generate(&mut self) {
        self.playground.prompt = self.prompt_input.value.clone();
        if let Some(pending) = self.playground.generate() {
            self.generate_task = Some(self.spawn_request(pending, AppEvent::Generated));
        }
    }

    pub fn finish_generate(&mut self, completion: lumina_core::Completion) {
        self.generate_task = None;
        if self.playground.finish_generate(completion) {
            self.sync_inputs();
        }
    }

    /// Abort in-flight AI requests; their results will not be applied.
    pub fn cancel_requests(&mut self) -> bool {
        let mut cancelled = false;
        if let Some(task) = self.frame_task.take() {
            task.abort();
            cancelled |= self.playground.frame_mut().cancel();
        }
        if let Some(task) = self.generate_task.take() {
            task.abort();
            cancelled |= self.playground.cancel_generate();
        }
        if cancelled {
            tracing::info!("cancelled in-flight AI request");
        }
        cancelled
    }

    pub fn copy_code(&mut self) {
        if let Err(e) = self.playground.frame_mut().copy_to_clipboard(&mut self.clipboard, Instant::now()) {
            tracing::warn!(error = %e, "copy to clipboard failed");
        }
    }

    pub fn start_export(&mut self) {
        if !self.playground.begin_export() {
            return;
        }

        let capture = BufferCapture::new(self.export_buffer(), self.mono_font.clone(), CAPTURE_SCALE);
        let title = self.playground.document().title.clone();
        let dir = self.export_dir.clone();
        let font = self.label_font.clone();
        let tx = self.events.clone();

        self.export_task = Some(tokio::task::spawn_blocking(move || {
            let result = export_image(&capture, &title, &dir, font.as_ref());
            let _ = tx.send(AppEvent::Exported(result));
        }));
    }

    /// The frame as it will be captured: the visible scroll position, size capped.
    pub fn export_buffer(&self) -> Buffer {
        let view = CodeFrameView::new(self.playground.frame()).scroll(self.frame_scroll);
        render_offscreen(view, EXPORT_MAX_WIDTH, EXPORT_MAX_HEIGHT)
    }

    pub fn finish_export(&mut self, result: Result<PathBuf, ExportError>) {
        self.export_task = None;
        let saved = result.is_ok();
        self.playground.finish_export(result);
        self.status = match self.playground.last_export() {
            Some(path) if saved => Some(format!("Saved {}", path.display())),
            _ => None,
        };
    }

    /// Scroll the frame preview by `delta` lines.
    pub fn scroll_frame(&mut self, delta: isize) {
        let limit = max_scroll(self.playground.document());
        self.frame_scroll = self.frame_scroll.min(limit).saturating_add_signed(delta).min(limit);
    }

    /// Switch to the next known Gemini model and remember it as the default
    /// in the session's config file.
    pub fn cycle_model(&mut self) {
        let models = GeminiClient::list_models();
        let mut settings = self.playground.settings().clone();
        let next = models
            .iter()
            .position(|m| *m == settings.model)
            .map(|i| (i + 1) % models.len())
            .unwrap_or(0);
        settings.model = models[next].clone();

        if let Some(path) = &self.config_path {
            if let Err(e) = Config::save_default_model(path, &settings.model) {
                tracing::warn!(error = %e, path = %path.display(), "could not save default model");
            }
        }
        self.status = Some(format!("Model: {}", settings.model));
        self.playground.set_settings(settings);
    }

    pub fn save_api_key(&mut self) {
        let credential = Credential::new(self.api_key_input.value.trim());
        self.playground.set_credential(credential);
        self.api_key_input.clear();
        self.show_api_key_input = false;
    }

    /// Commit the edited text field into the playground document.
    pub fn commit_field(&mut self) {
        match self.focus {
            Field::Prompt => self.playground.prompt = self.prompt_input.value.clone(),
            Field::Code => self.playground.set_code(self.code_input.value.clone()),
            Field::Title => self.playground.set_title(self.title_input.value.clone()),
            Field::Language => self.playground.set_language(self.language_input.value.trim()),
            Field::Frame => {}
        }
    }

    pub fn focused_input(&mut self) -> Option<&mut TextInput> {
        match self.focus {
            Field::Prompt => Some(&mut self.prompt_input),
            Field::Code => Some(&mut self.code_input),
            Field::Title => Some(&mut self.title_input),
            Field::Language => Some(&mut self.language_input),
            Field::Frame => None,
        }
    }

    /// Refresh the editable fields from the playground document.
    pub fn sync_inputs(&mut self) {
        let document = self.playground.document();
        if self.code_input.value != document.code {
            self.code_input.set(&document.code);
        }
        if self.title_input.value != document.title {
            self.title_input.set(&document.title);
        }
        if self.language_input.value != document.language {
            self.language_input.set(&document.language);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn test_app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(&Config::new(), Credential::default(), tx), rx)
    }

    #[test]
    fn test_field_cycle_returns_to_frame() {
        let mut field = Field::Frame;
        for _ in 0..5 {
            field = field.next();
        }
        assert_eq!(field, Field::Frame);
    }

    #[test]
    fn test_commit_title_updates_frame() {
        let (mut app, _rx) = test_app();
        app.focus = Field::Title;
        app.title_input.set("Demo.ts");
        app.commit_field();
        assert_eq!(app.playground.frame().document().title, "Demo.ts");
    }

    #[test]
    fn test_action_without_key_does_not_spawn() {
        let (mut app, _rx) = test_app();
        app.trigger_action(AiAction::Refactor);
        assert!(app.frame_task.is_none());
        assert!(app.playground.frame().advisory().is_some());
    }

    #[test]
    fn test_save_api_key_enables_frame_actions() {
        let (mut app, _rx) = test_app();
        app.api_key_input.set("  key-123 ");
        app.show_api_key_input = true;
        app.save_api_key();

        assert!(!app.show_api_key_input);
        assert!(app.playground.credential().is_present());
        assert!(app.playground.frame().has_credential());
    }

    #[test]
    fn test_failed_export_clears_saved_status() {
        let (mut app, _rx) = test_app();
        app.playground.begin_export();
        app.finish_export(Ok(PathBuf::from("/tmp/Component-lumina-frame.png")));
        assert_eq!(app.status.as_deref(), Some("Saved /tmp/Component-lumina-frame.png"));

        app.playground.begin_export();
        app.finish_export(Err(lumina_core::CaptureError::EmptyRegion.into()));
        assert!(app.status.is_none());
        assert!(app.playground.alert().is_some());
    }

    #[test]
    fn test_model_choice_saved_to_session_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        let (mut app, _rx) = test_app();
        app.config_path = Some(path.clone());

        app.cycle_model();

        let model = app.playground.settings().model.clone();
        assert_ne!(model, lumina_core::ai::gemini::DEFAULT_MODEL);
        assert_eq!(Config::load_from(&path).unwrap().model, Some(model));
    }

    #[test]
    fn test_export_buffer_height_is_capped() {
        let (mut app, _rx) = test_app();
        app.playground.set_code("x".repeat(130) + &"\nconst y = 2;".repeat(3000));

        let buffer = app.export_buffer();
        assert!(buffer.area.width <= EXPORT_MAX_WIDTH);
        assert!(buffer.area.height <= EXPORT_MAX_HEIGHT);
    }

    #[test]
    fn test_frame_scroll_stays_in_range() {
        let (mut app, _rx) = test_app();
        app.playground.set_code("line\n".repeat(100));

        app.scroll_frame(-5);
        assert_eq!(app.frame_scroll, 0);
        app.scroll_frame(1_000);
        assert_eq!(app.frame_scroll, max_scroll(app.playground.document()));
    }
}
