//! Builds the one-shot session configuration payload for the Gemini Live API.
//!
//! This is a pure function of the session parameters: no I/O, fully
//! deterministic, serialized to a single JSON document.

use serde::Serialize;
use serde_json::json;

pub const REALTIME_MODEL: &str = "gemini-2.5-flash-native-audio-preview-12-2025";
pub const DEFAULT_GRADE: &str = "Grade 10";
pub const DEFAULT_SUBJECT: &str = "General Knowledge";

const VOICE_NAME: &str = "Puck";

/// Per-session tutoring parameters, fixed for the session's lifetime.
#[derive(Debug, Clone)]
pub struct SessionParams {
    pub grade: String,
    pub subject: String,
}

impl SessionParams {
    /// Applies the documented defaults for missing or empty values.
    pub fn new(grade: Option<String>, subject: Option<String>) -> Self {
        Self {
            grade: grade
                .filter(|g| !g.is_empty())
                .unwrap_or_else(|| DEFAULT_GRADE.to_string()),
            subject: subject
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
        }
    }
}

impl Default for SessionParams {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// The `BidiGenerateContent` setup envelope, sent exactly once as the first
/// upstream message.
#[derive(Debug, Serialize)]
pub struct SetupMessage {
    setup: Setup,
}

#[derive(Debug, Serialize)]
struct Setup {
    model: String,
    generation_config: GenerationConfig,
    system_instruction: SystemInstruction,
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
    speech_config: SpeechConfig,
}

#[derive(Debug, Serialize)]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
struct PrebuiltVoiceConfig {
    voice_name: &'static str,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct Tool {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct FunctionDeclaration {
    name: &'static str,
    description: &'static str,
    parameters: serde_json::Value,
}

impl SetupMessage {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn tutor_instruction(params: &SessionParams) -> String {
    format!(
        "You are a friendly AI tutor for a {} student studying {}. \
         Engage the student in conversation to check their understanding. \
         IMPORTANT: If you detect the student clearly misunderstands a concept, or is struggling, \
         or at the END of the conversation, you MUST call the 'report_gaps' tool with a summary \
         of the gaps. Make the feedback student friendly for lower classes and deeper for upper classes.",
        params.grade, params.subject
    )
}

/// The schema for the single `report_gaps` callback the tutor may invoke.
fn report_gaps_declaration() -> FunctionDeclaration {
    FunctionDeclaration {
        name: "report_gaps",
        description: "Report detected learning gaps to the system.",
        parameters: json!({
            "type": "OBJECT",
            "properties": {
                "gaps": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "topic": {"type": "STRING"},
                            "gapType": {
                                "type": "STRING",
                                "enum": ["Conceptual", "Factual", "Procedural"],
                            },
                            "reason": {"type": "STRING"},
                            "recommendation": {"type": "STRING"},
                        },
                    },
                }
            },
            "required": ["gaps"],
        }),
    }
}

/// Builds the setup payload for one tutoring session.
pub fn build_setup_message(params: &SessionParams) -> SetupMessage {
    SetupMessage {
        setup: Setup {
            model: format!("models/{}", REALTIME_MODEL),
            generation_config: GenerationConfig {
                response_modalities: vec!["AUDIO"],
                speech_config: SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: VOICE_NAME,
                        },
                    },
                },
            },
            system_instruction: SystemInstruction {
                parts: vec![TextPart {
                    text: tutor_instruction(params),
                }],
            },
            tools: vec![Tool {
                function_declarations: vec![report_gaps_declaration()],
            }],
        },
    }
}
