pub mod ai;
pub mod clipboard;
pub mod config;
pub mod credential;
pub mod document;
pub mod export;
pub mod fence;
pub mod font;
pub mod frame;
pub mod playground;

// Re-export main types for convenience
pub use ai::{AiAction, AiError, AssistantSettings, CodeAssistant, Completion, GeminiClient, PendingRequest};
pub use clipboard::{ClipboardSink, SystemClipboard};
pub use config::Config;
pub use credential::Credential;
pub use document::{CodeDocument, Padding, Theme};
pub use export::{export_image, CaptureError, ExportError, FrameCapture};
pub use frame::{CodeFrame, FrameState, Resolution, TriggerOutcome};
pub use playground::Playground;
