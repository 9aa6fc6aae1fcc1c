//! System prompt assembly for conversation modes.

use spark_rs_protocol::{ConversationMode, InterviewSettings};

const BASE_PROMPT: &str = "You are an advanced English communication AI assistant designed to help users improve their English speaking skills. Always respond in a helpful, encouraging, and constructive manner.";

const DEFAULT_ROLE: &str = "Software Developer";
const DEFAULT_FOCUS_AREAS: &str = "general technical skills, problem-solving, communication";

const PRACTICE_GUIDELINES: &str = "PRACTICE MODE:
- Help users practice English conversation
- Correct grammar, pronunciation hints (in text), and vocabulary mistakes gently
- Provide suggestions for better expressions
- Keep conversations engaging and natural
- Ask follow-up questions to maintain dialogue
- Give encouragement and positive feedback
- When correcting, use format: \"That's good! A more natural way to say it would be: '[correction]'\"
- Rate responses from 1-10 for fluency and accuracy
- Suggest improvements for vocabulary and grammar";

const TAG_FORMAT: &str = "ANNOTATIONS:
- Wrap your main correction in [CORRECTION]...[/CORRECTION]
- Give the fluency score as [SCORE]n/10[/SCORE]
- List suggestions one per line inside [SUGGESTIONS]...[/SUGGESTIONS]";

const JSON_FORMAT: &str = "RESPONSE FORMAT:
Reply with a single JSON object and nothing else:
{\"reply\": string, \"corrections\": [string], \"score\": number 0-10, \"suggestions\": [string]}
Leave \"corrections\" and \"suggestions\" empty and omit \"score\" when they do not apply.";

const GENERAL_GUIDELINES: &str = "GENERAL MODE:
- Engage in natural conversation
- Provide helpful responses to questions
- Correct language mistakes when appropriate
- Be supportive and educational
- Adapt to the user's communication style
- Provide explanations when needed";

/// Inputs interpolated into a mode template.
#[derive(Debug, Clone, Default)]
pub struct PromptContext {
    pub interview_settings: Option<InterviewSettings>,
    /// Extracted text of a document the learner wants to discuss.
    pub document: Option<String>,
    /// Extracted resume text.
    pub resume: Option<String>,
    /// Ask for the strict JSON envelope instead of inline tags.
    pub structured: bool,
}

/// Builds the system prompt for one conversation turn.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    base_prompt: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self {
            base_prompt: BASE_PROMPT.to_string(),
        }
    }

    /// Replace the opening persona paragraph.
    pub fn with_base_prompt(mut self, base_prompt: impl Into<String>) -> Self {
        self.base_prompt = base_prompt.into();
        self
    }

    /// Build the system prompt for `mode`. Never fails.
    pub fn build_system_prompt(&self, mode: ConversationMode, context: &PromptContext) -> String {
        let mut sections = vec![self.base_prompt.clone()];
        match mode {
            ConversationMode::Practice => {
                sections.push(PRACTICE_GUIDELINES.to_string());
                sections.push(if context.structured {
                    JSON_FORMAT.to_string()
                } else {
                    TAG_FORMAT.to_string()
                });
            }
            ConversationMode::Interview => {
                sections.push(interview_section(context.interview_settings.as_ref()));
            }
            ConversationMode::General => sections.push(GENERAL_GUIDELINES.to_string()),
        }

        if let Some(resume) = non_blank(context.resume.as_deref()) {
            sections.push(format!("CANDIDATE'S RESUME:\n{resume}"));
        }
        if let Some(document) = non_blank(context.document.as_deref()) {
            sections.push(format!(
                "ADDITIONAL CONTEXT:\nThe user has provided the following context/document to discuss:\n{document}\n\nPlease reference this context in your conversations and help the user practice discussing this topic in English."
            ));
        }
        sections.join("\n\n")
    }
}

/// Sampling temperature used when the learner has not chosen one.
pub fn mode_temperature(mode: ConversationMode) -> f32 {
    match mode {
        ConversationMode::Practice => 0.7,
        ConversationMode::Interview | ConversationMode::General => 0.9,
    }
}

fn interview_section(settings: Option<&InterviewSettings>) -> String {
    let role = settings
        .and_then(|settings| non_blank(Some(settings.role.as_str())))
        .unwrap_or(DEFAULT_ROLE);
    let difficulty = settings
        .map(|settings| settings.difficulty.as_str())
        .unwrap_or("medium");
    let focus_areas = settings
        .filter(|settings| !settings.focus_areas.is_empty())
        .map(|settings| settings.focus_areas.join(", "))
        .unwrap_or_else(|| DEFAULT_FOCUS_AREAS.to_string());

    let mut section = format!(
        "INTERVIEW MODE:
- You are conducting a job interview for a {role} position
- Difficulty level: {difficulty}
- Ask relevant technical and behavioral questions
- Evaluate responses professionally
- Focus areas: {focus_areas}
- Ask follow-up questions based on responses
- Be professional but friendly
- Evaluate: technical knowledge, communication skills, problem-solving ability, experience relevance
- Provide constructive feedback
- Keep interview engaging and realistic"
    );
    if let Some(instructions) =
        settings.and_then(|settings| non_blank(settings.custom_instructions.as_deref()))
    {
        section.push_str("\n\nAdditional instructions: ");
        section.push_str(instructions);
    }
    section
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
