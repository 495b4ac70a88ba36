//! Mindmap prompt templating and model-output cleanup.

use crate::models::MindmapGraph;
use anyhow::{Context, Result};

// Keeps very large documents under the model's input limits.
const MAX_SOURCE_CHARS: usize = 100_000;

const OUTPUT_CONTRACT: &str = r#"
The output must be strictly valid JSON.

Structure the JSON as a list of nodes and a list of edges.
Nodes should have: { "id": "1", "label": "Main Topic", "type": "root" }
Edges should have: { "source": "1", "target": "2", "label": "connection label" }

Ensure there is one central root node.
Break down the content into logical branches and sub-branches.
Keep labels concise (max 5 words).

IMPORTANT:
1. Do NOT calculate positions (x, y). Just output x:0, y:0. The frontend will handle layout.
2. Return ONLY the JSON string, no markdown formatting like ```json ... ```.
3. Generate at least 8-15 nodes for a comprehensive mindmap."#;

/// Builds the mindmap prompt from a bare topic name.
pub fn topic_prompt(topic: &str) -> String {
    format!(
        "You are an expert educational AI helper. \
         Generate a comprehensive hierarchical structure for a concept map / mind map about: \"{}\"\n\n\
         Create a detailed mindmap covering key concepts, subtopics, and relationships.\n{}",
        topic, OUTPUT_CONTRACT
    )
}

/// Builds the mindmap prompt from extracted document text.
pub fn text_prompt(text: &str) -> String {
    let truncated: String = text.chars().take(MAX_SOURCE_CHARS).collect();
    format!(
        "You are an expert educational AI helper. \
         Analyze the following text and generate a hierarchical structure for a concept map / mind map.\n\n\
         Text to analyze:\n{}\n{}",
        truncated, OUTPUT_CONTRACT
    )
}

/// Parses the model's response into a graph, tolerating markdown code fences
/// the model sometimes adds despite instructions.
pub fn parse_graph(response_text: &str) -> Result<MindmapGraph> {
    let mut cleaned = response_text.trim();
    if let Some(stripped) = cleaned.strip_prefix("```json") {
        cleaned = stripped;
    }
    if let Some(stripped) = cleaned.strip_prefix("```") {
        cleaned = stripped;
    }
    if let Some(stripped) = cleaned.strip_suffix("```") {
        cleaned = stripped;
    }
    serde_json::from_str(cleaned.trim()).context("Failed to parse AI response as JSON")
}
