/// AI transforms that operate on the code held by a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AiAction {
    Explain,
    Refactor,
    FixBugs,
    AddTypes,
}

impl AiAction {
    pub fn all() -> [AiAction; 4] {
        [
            AiAction::Refactor,
            AiAction::AddTypes,
            AiAction::FixBugs,
            AiAction::Explain,
        ]
    }

    /// Instruction placed ahead of the code in the model prompt.
    pub fn instruction(&self) -> &'static str {
        match self {
            AiAction::Refactor => "Refactor the following code to be cleaner, more modern, and more performant. Return ONLY the raw code.",
            AiAction::FixBugs => "Fix any potential bugs in the following code. Return ONLY the raw code.",
            AiAction::AddTypes => "Add strict TypeScript types to the following code. Return ONLY the raw code.",
            AiAction::Explain => "Explain what the following code does in less than 50 words. Do not return code, return text.",
        }
    }

    /// Whether a successful response replaces the code.
    pub fn rewrites_code(&self) -> bool {
        !matches!(self, AiAction::Explain)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AiAction::Explain => "Explain",
            AiAction::Refactor => "Refactor",
            AiAction::FixBugs => "Fix Bugs",
            AiAction::AddTypes => "Add Types",
        }
    }
}

/// A single request to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiRequest {
    Action { action: AiAction, code: String },
    Generate { prompt: String },
}

impl AiRequest {
    pub fn prompt_text(&self) -> String {
        match self {
            AiRequest::Action { action, code } => action_prompt(*action, code),
            AiRequest::Generate { prompt } => generation_prompt(prompt),
        }
    }
}

pub fn action_prompt(action: AiAction, code: &str) -> String {
    format!("{}\n\nCode:\n{}", action.instruction(), code)
}

pub fn generation_prompt(request: &str) -> String {
    format!(
        "Write code for the following request: \"{}\".\n\
         Return ONLY the raw code. Do not include markdown backticks (like ```).\n\
         Do not include explanations. If it's a component, make it self-contained.",
        request
    )
}
