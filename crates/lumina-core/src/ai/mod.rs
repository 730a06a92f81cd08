pub mod action;
pub mod gemini;
pub mod request;

pub use action::{AiAction, AiRequest};
pub use gemini::GeminiClient;
pub use request::{Completion, PendingRequest, Ticket};

use crate::credential::Credential;

/// Errors surfaced to the UI by AI operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AiError {
    #[error("API Key is missing")]
    CredentialMissing,

    /// Carries the generic user-facing message; the upstream detail is logged.
    #[error("{0}")]
    Upstream(String),
}

pub const GENERATE_FAILED: &str = "Failed to generate code.";
pub const PROCESS_FAILED: &str = "Failed to process code.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantSettings {
    pub model: String,
    pub base_url: String,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            model: gemini::DEFAULT_MODEL.to_string(),
            base_url: gemini::DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Adapter between code frames and the Gemini model.
///
/// A fresh assistant is built whenever the credential changes; an empty
/// credential produces an assistant that fails every call with
/// [`AiError::CredentialMissing`] without touching the network.
#[derive(Clone)]
pub struct CodeAssistant {
    client: Option<GeminiClient>,
    model: String,
}

impl CodeAssistant {
    pub fn new(credential: &Credential, settings: &AssistantSettings) -> Self {
        let client = credential
            .is_present()
            .then(|| GeminiClient::with_base_url(credential.expose(), &settings.base_url));

        Self {
            client,
            model: settings.model.clone(),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.client.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn generate_from_prompt(&self, prompt: &str) -> Result<String, AiError> {
        self.complete(&AiRequest::Generate { prompt: prompt.to_string() }, GENERATE_FAILED)
            .await
    }

    pub async fn perform_action(&self, code: &str, action: AiAction) -> Result<String, AiError> {
        let request = AiRequest::Action {
            action,
            code: code.to_string(),
        };
        self.complete(&request, PROCESS_FAILED).await
    }

    pub async fn send(&self, request: &AiRequest) -> Result<String, AiError> {
        let failure = match request {
            AiRequest::Action { .. } => PROCESS_FAILED,
            AiRequest::Generate { .. } => GENERATE_FAILED,
        };
        self.complete(request, failure).await
    }

    async fn complete(&self, request: &AiRequest, failure: &str) -> Result<String, AiError> {
        let client = self.client.as_ref().ok_or(AiError::CredentialMissing)?;

        tracing::debug!(model = %self.model, ?request, "sending Gemini request");
        match client.query(&self.model, &request.prompt_text()).await {
            Ok(text) => Ok(text.trim().to_string()),
            Err(e) => {
                tracing::error!(model = %self.model, error = %e, "Gemini request failed");
                Err(AiError::Upstream(failure.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings_for(server: &MockServer) -> AssistantSettings {
        AssistantSettings {
            model: "test-model".to_string(),
            base_url: server.uri(),
        }
    }

    fn reply(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        }))
    }

    #[tokio::test]
    async fn test_missing_credential_fails_fast() {
        let assistant = CodeAssistant::new(&Credential::default(), &AssistantSettings::default());
        assert!(!assistant.has_credential());

        let err = assistant.perform_action("x", AiAction::Refactor).await.unwrap_err();
        assert_eq!(err, AiError::CredentialMissing);

        let err = assistant.generate_from_prompt("a button").await.unwrap_err();
        assert_eq!(err, AiError::CredentialMissing);
    }

    #[tokio::test]
    async fn test_response_is_trimmed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/test-model:generateContent"))
            .respond_with(reply("\n  const a = 1;  \n"))
            .mount(&server)
            .await;

        let assistant = CodeAssistant::new(&Credential::new("key"), &settings_for(&server));
        let text = assistant.generate_from_prompt("a constant").await.unwrap();
        assert_eq!(text, "const a = 1;");
    }

    #[tokio::test]
    async fn test_upstream_failure_is_generic() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal detail"))
            .mount(&server)
            .await;

        let assistant = CodeAssistant::new(&Credential::new("key"), &settings_for(&server));

        let err = assistant.perform_action("x", AiAction::Explain).await.unwrap_err();
        assert_eq!(err, AiError::Upstream(PROCESS_FAILED.to_string()));

        let err = assistant.generate_from_prompt("y").await.unwrap_err();
        assert_eq!(err, AiError::Upstream(GENERATE_FAILED.to_string()));
    }
}
