//! Token estimation for marker documents
//!
//! The project list carries a cheap estimate (characters / 4). Exact counts
//! with a BPE encoding are available for the `show --tokens` command.
//!
//! ```rust
//! use mdscope::core::tokenizer::{estimate_tokens, TokenBand};
//!
//! assert_eq!(estimate_tokens(Some("# Hi")), 1);
//! assert_eq!(estimate_tokens(None), 0);
//! assert_eq!(TokenBand::for_tokens(1500), TokenBand::Yellow);
//! ```

use once_cell::sync::Lazy;
use std::fmt;
use std::str::FromStr;
use tiktoken_rs::{cl100k_base, o200k_base, CoreBPE};

/// Characters per token for the quick estimate
pub const CHARS_PER_TOKEN: usize = 4;

/// Supported token models/encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenModel {
    /// Character count divided by four
    #[default]
    Quarter,
    /// cl100k_base encoding (GPT-4, Claude approximation)
    Cl100k,
    /// o200k_base encoding (GPT-4o)
    O200k,
}

impl TokenModel {
    fn get_bpe(&self) -> Option<&'static CoreBPE> {
        match self {
            TokenModel::Cl100k => CL100K_BPE.as_ref().ok(),
            TokenModel::O200k => O200K_BPE.as_ref().ok(),
            TokenModel::Quarter => None,
        }
    }

    /// List all available models
    pub fn available_models() -> &'static [&'static str] {
        &["quarter", "cl100k", "o200k"]
    }
}

impl fmt::Display for TokenModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenModel::Quarter => "quarter",
            TokenModel::Cl100k => "cl100k",
            TokenModel::O200k => "o200k",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for TokenModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quarter" | "estimate" | "fast" | "default" => Ok(TokenModel::Quarter),
            "cl100k" | "cl100k_base" | "claude" | "gpt4" => Ok(TokenModel::Cl100k),
            "o200k" | "o200k_base" | "gpt4o" => Ok(TokenModel::O200k),
            _ => Err(format!(
                "Unknown model: {}. Available: {}",
                s,
                TokenModel::available_models().join(", ")
            )),
        }
    }
}

// Lazy-initialized BPE encodings (loaded once on first use)
static CL100K_BPE: Lazy<Result<CoreBPE, String>> =
    Lazy::new(|| cl100k_base().map_err(|e| format!("Failed to load cl100k_base: {}", e)));

static O200K_BPE: Lazy<Result<CoreBPE, String>> =
    Lazy::new(|| o200k_base().map_err(|e| format!("Failed to load o200k_base: {}", e)));

/// Quick estimate stored on every project: `chars / 4`, floor division.
pub fn estimate_tokens(content: Option<&str>) -> usize {
    content
        .map(|text| text.chars().count() / CHARS_PER_TOKEN)
        .unwrap_or(0)
}

/// Count tokens in text using the specified model
///
/// Falls back to the quick estimate when a BPE encoding fails to load.
pub fn count_tokens(text: &str, model: TokenModel) -> usize {
    if text.is_empty() {
        return 0;
    }

    match model.get_bpe() {
        Some(bpe) => bpe.encode_with_special_tokens(text).len(),
        None => estimate_tokens(Some(text)),
    }
}

/// Traffic-light band for a token count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenBand {
    /// Up to 1000 tokens
    Green,
    /// 1001 to 2000 tokens
    Yellow,
    /// More than 2000 tokens
    Red,
}

impl TokenBand {
    pub fn for_tokens(tokens: usize) -> Self {
        match tokens {
            0..=1000 => TokenBand::Green,
            1001..=2000 => TokenBand::Yellow,
            _ => TokenBand::Red,
        }
    }
}
