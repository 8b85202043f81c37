//! Single-point prompt: one section of the essay per request.

use crate::outline::OutlinePoint;
use crate::prompt::{section_length_instruction, PromptContext};

const TITLE_ROLE: &str = "This is the MAIN TITLE. Task: write a short introductory paragraph \
    (about 3-4 sentences) that evokes the topic, creates curiosity and transitions smoothly \
    to the detailed points below.";
const ARGUMENT_ROLE: &str = "This is a DETAILED ARGUMENT. Task: analyze this one point in depth, \
    examining it from several angles.";

const AVOID_HEADING: &str =
    "AVOID REPETITION: The following points come later. Do not cover or preempt them: ";

const FINAL_SECTION: &str = "This is the final part. Write a complete and substantive conclusion.";
const OPEN_SECTION: &str =
    "The essay is not finished. DO NOT write any concluding or summarizing sentence.";

pub fn build_single_prompt(point: &OutlinePoint, ctx: &PromptContext<'_>, is_last_point: bool) -> String {
    let role = if point.is_root() { TITLE_ROLE } else { ARGUMENT_ROLE };
    let terminal = if is_last_point { FINAL_SECTION } else { OPEN_SECTION };

    format!(
        r#"You are a professional writer composing a long-form essay, one section at a time.

FULL OUTLINE (reference only):
{outline}

PREVIOUSLY WRITTEN CONTENT (context only, do not repeat or continue it verbatim):
"""
{prior}
"""

CURRENT TASK: Write the section for "{point}"
ROLE OF THIS SECTION: {role}

{avoid}OUTPUT LANGUAGE: {language}.
TONE: {tone}.
REQUIRED LENGTH: {length}
{terminal}
"#,
        outline = ctx.full_outline,
        prior = ctx.prior_text("[None yet]"),
        point = point.text,
        role = role,
        avoid = ctx.look_ahead_block(AVOID_HEADING),
        language = ctx.settings.language,
        tone = ctx.settings.tone_descriptor(),
        length = section_length_instruction(ctx.settings.detail_level),
        terminal = terminal,
    )
}
