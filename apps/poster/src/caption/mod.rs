//! Caption Extractor: turns a title into a bounded, duplicate-free hashtag string.
//!
//! Tokens come from a `Tokenizer` collaborator as `(text, PartOfSpeech)` pairs.
//! Only proper nouns, common nouns and adjectives (Penn `NNP`, `NN`, `JJ`) become
//! hashtags. Output keeps first-occurrence order and never exceeds the budget.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm_client::LlmError;

pub mod lexicon;
pub mod llm;
pub mod prompts;

pub use lexicon::LexiconTokenizer;
pub use llm::LlmTokenizer;

/// Default caption budget in characters.
pub const MAX_CAPTION_LEN: usize = 2000;

// ────────────────────────────────────────────────────────────────────────────
// Part-of-speech categories
// ────────────────────────────────────────────────────────────────────────────

/// Grammatical category of a token, parsed once from a Penn Treebank tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartOfSpeech {
    /// NNP
    ProperNoun,
    /// NNPS
    ProperNounPlural,
    /// NN
    Noun,
    /// NNS
    NounPlural,
    /// JJ
    Adjective,
    /// JJR
    AdjectiveComparative,
    /// JJS
    AdjectiveSuperlative,
    Determiner,
    Preposition,
    Conjunction,
    Pronoun,
    Modal,
    Verb,
    Adverb,
    Number,
    Punctuation,
    /// Any tag this enum does not name, kept verbatim.
    Other(String),
}

impl PartOfSpeech {
    pub fn from_penn(tag: &str) -> Self {
        match tag {
            "NNP" => Self::ProperNoun,
            "NNPS" => Self::ProperNounPlural,
            "NN" => Self::Noun,
            "NNS" => Self::NounPlural,
            "JJ" => Self::Adjective,
            "JJR" => Self::AdjectiveComparative,
            "JJS" => Self::AdjectiveSuperlative,
            "DT" | "PDT" | "WDT" => Self::Determiner,
            "IN" | "TO" => Self::Preposition,
            "CC" => Self::Conjunction,
            "PRP" | "PRP$" | "WP" | "WP$" => Self::Pronoun,
            "MD" => Self::Modal,
            "VB" | "VBD" | "VBG" | "VBN" | "VBP" | "VBZ" => Self::Verb,
            "RB" | "RBR" | "RBS" | "WRB" => Self::Adverb,
            "CD" => Self::Number,
            "." | "," | ":" | "``" | "''" | "(" | ")" | "-LRB-" | "-RRB-" | "#" | "$" => {
                Self::Punctuation
            }
            other => Self::Other(other.to_string()),
        }
    }

    /// True for the categories that become hashtags: `NNP`, `NN`, `JJ`.
    pub fn is_hashtag_worthy(&self) -> bool {
        matches!(self, Self::ProperNoun | Self::Noun | Self::Adjective)
    }
}

/// A single token produced by a `Tokenizer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub pos: PartOfSpeech,
}

impl Token {
    pub fn new(text: impl Into<String>, pos: PartOfSpeech) -> Self {
        Self {
            text: text.into(),
            pos,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tokenizer collaborator
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TokenizeError {
    #[error("LLM tokenizer failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Tokenizer returned malformed output: {0}")]
    Malformed(String),
}

/// Splits text into tagged tokens. Must be deterministic for a given input and finite.
#[async_trait]
pub trait Tokenizer: Send + Sync {
    async fn tokenize(&self, text: &str) -> Result<Vec<Token>, TokenizeError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Extraction
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionOptions {
    /// Hard cap on output length, in characters.
    pub max_len: usize,
    /// Tokens shorter than this (in characters) are skipped. `None` = no minimum.
    pub min_token_len: Option<usize>,
}

impl Default for CaptionOptions {
    fn default() -> Self {
        Self {
            max_len: MAX_CAPTION_LEN,
            min_token_len: None,
        }
    }
}

/// Builds the hashtag caption from already-tagged tokens.
///
/// Each kept token contributes `"#<text> "`. Extraction stops at the first kept
/// token whose fragment would push the output past `max_len`; later tokens are
/// dropped even if they would have fit.
pub fn extract_caption(tokens: &[Token], options: &CaptionOptions) -> String {
    let mut emitted: HashSet<&str> = HashSet::new();
    let mut caption = String::new();
    let mut caption_len = 0usize;

    for token in tokens {
        let text = token.text.as_str();
        let token_len = text.chars().count();

        if emitted.contains(text) {
            continue;
        }
        if options.min_token_len.is_some_and(|min| token_len < min) {
            continue;
        }
        if !token.pos.is_hashtag_worthy() {
            continue;
        }

        // '#' + text + ' '
        let fragment_len = token_len + 2;
        if caption_len + fragment_len > options.max_len {
            break;
        }

        caption.push('#');
        caption.push_str(text);
        caption.push(' ');
        caption_len += fragment_len;
        emitted.insert(text);
    }

    caption
}

/// Tokenizes `text` and extracts its caption.
pub async fn make_caption(
    tokenizer: &dyn Tokenizer,
    text: &str,
    options: &CaptionOptions,
) -> Result<String, TokenizeError> {
    let tokens = tokenizer.tokenize(text).await?;
    Ok(extract_caption(&tokens, options))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(text: &str, tag: &str) -> Token {
        Token::new(text, PartOfSpeech::from_penn(tag))
    }

    /// Returns tokens as fixed by the test, ignoring the input text.
    struct FixedTokenizer(Vec<Token>);

    #[async_trait]
    impl Tokenizer for FixedTokenizer {
        async fn tokenize(&self, _text: &str) -> Result<Vec<Token>, TokenizeError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_keeps_only_nouns_and_adjectives_in_order() {
        let tokens = vec![
            tok("The", "DT"),
            tok("Quick", "JJ"),
            tok("fox", "NN"),
            tok("jumps", "VBZ"),
        ];
        let caption = extract_caption(&tokens, &CaptionOptions::default());
        assert_eq!(caption, "#Quick #fox ");
    }

    #[test]
    fn test_budget_stops_before_overflowing_fragment() {
        let tokens = vec![tok("Alpha", "JJ"), tok("Beta", "NN")];
        let options = CaptionOptions {
            max_len: 10,
            min_token_len: None,
        };
        assert_eq!(extract_caption(&tokens, &options), "#Alpha ");
    }

    #[test]
    fn test_budget_stop_drops_later_tokens_that_would_fit() {
        let tokens = vec![tok("Alpha", "JJ"), tok("Longword", "NN"), tok("X", "NN")];
        let options = CaptionOptions {
            max_len: 12,
            min_token_len: None,
        };
        // "#X " would fit after "#Alpha " but processing stops at "Longword".
        assert_eq!(extract_caption(&tokens, &options), "#Alpha ");
    }

    #[test]
    fn test_exact_budget_fits() {
        let tokens = vec![tok("Alpha", "JJ")];
        let options = CaptionOptions {
            max_len: 7,
            min_token_len: None,
        };
        assert_eq!(extract_caption(&tokens, &options), "#Alpha ");
    }

    #[test]
    fn test_duplicates_are_suppressed_case_sensitively() {
        let tokens = vec![
            tok("money", "NN"),
            tok("Money", "NNP"),
            tok("money", "NN"),
        ];
        let caption = extract_caption(&tokens, &CaptionOptions::default());
        assert_eq!(caption, "#money #Money ");
    }

    #[test]
    fn test_word_first_seen_with_other_tag_can_still_be_emitted() {
        let tokens = vec![tok("light", "VB"), tok("light", "JJ")];
        let caption = extract_caption(&tokens, &CaptionOptions::default());
        assert_eq!(caption, "#light ");
    }

    #[test]
    fn test_min_token_len_skips_short_tokens() {
        let tokens = vec![tok("a", "NN"), tok("ok", "JJ"), tok("tip", "NN")];
        let options = CaptionOptions {
            max_len: MAX_CAPTION_LEN,
            min_token_len: Some(2),
        };
        assert_eq!(extract_caption(&tokens, &options), "#ok #tip ");
    }

    #[test]
    fn test_plural_and_comparative_tags_are_not_kept() {
        let tokens = vec![
            tok("receipts", "NNS"),
            tok("Americans", "NNPS"),
            tok("cheaper", "JJR"),
            tok("store", "NN"),
        ];
        let caption = extract_caption(&tokens, &CaptionOptions::default());
        assert_eq!(caption, "#store ");
    }

    #[test]
    fn test_output_never_exceeds_budget() {
        let tokens: Vec<Token> = (0..500).map(|i| tok(&format!("word{i}"), "NN")).collect();
        for max_len in [0, 1, 5, 17, 100, 999] {
            let options = CaptionOptions {
                max_len,
                min_token_len: None,
            };
            let caption = extract_caption(&tokens, &options);
            assert!(
                caption.chars().count() <= max_len,
                "caption of {} chars exceeds budget {max_len}",
                caption.chars().count()
            );
        }
    }

    #[test]
    fn test_budget_counts_characters_not_bytes() {
        let tokens = vec![tok("café", "NN")];
        let options = CaptionOptions {
            max_len: 6,
            min_token_len: None,
        };
        assert_eq!(extract_caption(&tokens, &options), "#café ");
    }

    #[test]
    fn test_empty_tokens_give_empty_caption() {
        assert_eq!(extract_caption(&[], &CaptionOptions::default()), "");
    }

    #[test]
    fn test_from_penn_unknown_tag_preserved() {
        assert_eq!(
            PartOfSpeech::from_penn("FW"),
            PartOfSpeech::Other("FW".to_string())
        );
        assert!(!PartOfSpeech::from_penn("FW").is_hashtag_worthy());
    }

    #[tokio::test]
    async fn test_make_caption_uses_tokenizer_output() {
        let tokenizer = FixedTokenizer(vec![tok("Reddit", "NNP"), tok("is", "VBZ")]);
        let caption = make_caption(&tokenizer, "ignored", &CaptionOptions::default())
            .await
            .unwrap();
        assert_eq!(caption, "#Reddit ");
    }
}
