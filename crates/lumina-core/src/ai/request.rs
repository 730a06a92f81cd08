//! Ownership tokens for in-flight model requests.
//!
//! A component hands out a [`PendingRequest`] when it starts a request and
//! only accepts the matching [`Completion`] back. The ticket carries the
//! document revision observed at dispatch so late results can be recognised
//! as stale.

use super::{AiError, AiRequest, CodeAssistant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub id: u64,
    pub revision: u64,
}

pub struct PendingRequest {
    pub ticket: Ticket,
    pub request: AiRequest,
    assistant: CodeAssistant,
}

impl PendingRequest {
    pub(crate) fn new(ticket: Ticket, request: AiRequest, assistant: CodeAssistant) -> Self {
        Self {
            ticket,
            request,
            assistant,
        }
    }

    pub async fn run(self) -> Completion {
        let result = self.assistant.send(&self.request).await;
        Completion {
            ticket: self.ticket,
            result,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub ticket: Ticket,
    pub result: Result<String, AiError>,
}
