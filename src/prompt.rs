//! Prompt Builder
//!
//! Deterministic renderers for the instructions sent to the generation service.
//! Prompts are rebuilt from current state on every call; nothing is cached.

pub mod batch;
pub mod single;

pub use batch::{batch_output_schema, build_batch_prompt, BatchPrompt};
pub use single::build_single_prompt;

use crate::context::trailing_slice;
use crate::settings::{DetailLevel, GenerationConfig};

pub const DEFAULT_CONTEXT_TAIL_CHARS: usize = 2000;

/// Everything a prompt needs besides the point(s) being written.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub full_outline: &'a str,
    pub accumulated_text: &'a str,
    pub look_ahead: &'a [String],
    pub settings: &'a GenerationConfig,
    pub context_tail_chars: usize,
}

impl<'a> PromptContext<'a> {
    pub fn new(
        full_outline: &'a str,
        accumulated_text: &'a str,
        look_ahead: &'a [String],
        settings: &'a GenerationConfig,
    ) -> Self {
        Self {
            full_outline,
            accumulated_text,
            look_ahead,
            settings,
            context_tail_chars: DEFAULT_CONTEXT_TAIL_CHARS,
        }
    }

    pub fn with_tail_chars(mut self, chars: usize) -> Self {
        self.context_tail_chars = chars;
        self
    }

    /// Bounded tail of the prior prose, or `placeholder` when nothing is written yet.
    fn prior_text<'b>(&'b self, placeholder: &'b str) -> &'b str {
        if self.accumulated_text.trim().is_empty() {
            placeholder
        } else {
            trailing_slice(self.accumulated_text, self.context_tail_chars)
        }
    }

    /// `heading` followed by the quoted upcoming points and a blank line; empty
    /// when nothing comes after.
    fn look_ahead_block(&self, heading: &str) -> String {
        if self.look_ahead.is_empty() {
            return String::new();
        }
        format!("{}\"{}...\"\n\n", heading, self.look_ahead.join("; "))
    }
}

/// Length target for a whole section in single-point mode.
pub(crate) fn section_length_instruction(level: DetailLevel) -> &'static str {
    match level {
        DetailLevel::Brief => "Concise (50-80 words), go straight to the point.",
        DetailLevel::Standard => "Medium (100-150 words). Analyze fully, in concise sentences.",
        DetailLevel::Detailed => {
            "VERY LONG AND DETAILED (150-250 words). Write a full-bodied paragraph. Expand the idea \
             as far as it goes with real-world examples, data based on reasonable assumptions, \
             comparisons or counter-arguments. Do not write skimpily."
        }
    }
}

/// Length target for each item in batch mode.
pub(crate) fn item_length_instruction(level: DetailLevel) -> &'static str {
    match level {
        DetailLevel::Brief => "LEVEL: Concise. Each item about 50-80 words.",
        DetailLevel::Standard => "LEVEL: Medium. Each item about 100-150 words, fully fleshed out.",
        DetailLevel::Detailed => {
            "LEVEL: VERY LONG AND IN-DEPTH. Each sub-item (level > 0) must become a large \
             paragraph of at least 150-250 words. Dig deep with reasoning, evidence and \
             illustrative examples, contrasts and reasoned assumptions."
        }
    }
}
