//! Heuristic token estimate.
//!
//! Not a tokenizer: roughly four characters per token for English technical
//! text. Rounds up so non-empty text never reports zero tokens.

use std::fmt;

use serde::Serialize;

/// Characters assumed per token.
pub const CHARS_PER_TOKEN: usize = 4;

/// Character count and approximate token count of a text blob.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenEstimate {
    pub chars: usize,
    pub approx_tokens: usize,
}

/// Estimate `text`. `chars` counts Unicode scalar values, whitespace included.
pub fn estimate(text: &str) -> TokenEstimate {
    let chars = text.chars().count();
    TokenEstimate {
        chars,
        approx_tokens: chars.div_ceil(CHARS_PER_TOKEN),
    }
}

impl fmt::Display for TokenEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "~{} tokens ({} chars)", self.approx_tokens, self.chars)
    }
}
