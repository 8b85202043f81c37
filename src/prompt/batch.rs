//! Batch prompt: several consecutive points in one request, answered as a
//! structured `{ "results": [{ "id", "content" }] }` document.

use crate::outline::OutlinePoint;
use crate::prompt::{item_length_instruction, PromptContext};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct BatchPrompt {
    pub text: String,
    pub schema: Value,
}

/// JSON Schema of the batch response.
pub fn batch_output_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "results": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "content": { "type": "string" }
                    },
                    "required": ["id", "content"]
                }
            }
        },
        "required": ["results"]
    })
}

const LATER_HEADING: &str = "4. CONTENT TO WRITE LATER (DO NOT WRITE OR PREEMPT THIS):\n";

pub fn build_batch_prompt(points: &[OutlinePoint], ctx: &PromptContext<'_>, is_last_batch: bool) -> BatchPrompt {
    let points_list = points
        .iter()
        .map(|p| format!("- [ID: {}] Idea: \"{}\" (Level: {})", p.id, p.text, p.level))
        .collect::<Vec<_>>()
        .join("\n");

    let ending = if is_last_batch {
        "The last item of this list ends the essay: give it a genuinely good and meaningful conclusion."
    } else {
        "Absolutely DO NOT write a concluding sentence (\"In conclusion\", \"To sum up\") anywhere \
         in this batch, because the essay continues after it."
    };

    let text = format!(
        r#"You are a professional writer composing a long and detailed essay.
Below is a group of consecutive outline points that must each be written as prose.

1. FULL ESSAY OUTLINE (reference only):
{outline}

2. PREVIOUSLY WRITTEN CONTENT (context for flow, do not repeat it):
"""
{prior}
"""

3. TASK (BATCH): Write content for EACH item in the list below, one output entry per ID.

LIST TO WRITE:
{points}

{later}IMPORTANT REQUIREMENTS:
- Output language: {language}.
- Tone: {tone}.
- {length}
- For level 0 items (titles): write an evocative introduction of about 3-5 sentences.
- Flow: the paragraph of each item should lead naturally into the next item.
- {ending}

OUTPUT FORMAT:
Return JSON strictly matching the schema: an object with a "results" array of {{"id", "content"}} objects.
Every ID in the list above must appear exactly once. "content" must be plain prose with no markdown.
"#,
        outline = ctx.full_outline,
        prior = ctx.prior_text("[Introduction]"),
        points = points_list,
        later = ctx.look_ahead_block(LATER_HEADING),
        language = ctx.settings.language,
        tone = ctx.settings.tone_descriptor(),
        length = item_length_instruction(ctx.settings.detail_level),
        ending = ending,
    );

    BatchPrompt {
        text,
        schema: batch_output_schema(),
    }
}
