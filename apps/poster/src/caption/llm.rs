use async_trait::async_trait;
use serde::Deserialize;

use crate::caption::prompts::{TAG_PROMPT_TEMPLATE, TAG_SYSTEM};
use crate::caption::{PartOfSpeech, Token, TokenizeError, Tokenizer};
use crate::llm_client::LlmClient;

#[derive(Debug, Deserialize)]
struct TaggedTokens {
    tokens: Vec<RawToken>,
}

#[derive(Debug, Deserialize)]
struct RawToken {
    text: String,
    tag: String,
}

/// Tokenizer backed by the Anthropic API. Tags are mapped to `PartOfSpeech` here,
/// so nothing past this boundary sees raw tag strings.
#[derive(Clone)]
pub struct LlmTokenizer {
    llm: LlmClient,
}

impl LlmTokenizer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Tokenizer for LlmTokenizer {
    async fn tokenize(&self, text: &str) -> Result<Vec<Token>, TokenizeError> {
        let prompt = TAG_PROMPT_TEMPLATE.replace("{text}", text);
        let tagged: TaggedTokens = self.llm.call_json(&prompt, TAG_SYSTEM).await?;
        into_tokens(tagged)
    }
}

fn into_tokens(tagged: TaggedTokens) -> Result<Vec<Token>, TokenizeError> {
    tagged
        .tokens
        .into_iter()
        .map(|raw| {
            let text = raw.text.trim();
            if text.is_empty() {
                return Err(TokenizeError::Malformed(format!(
                    "empty token text (tag {})",
                    raw.tag
                )));
            }
            Ok(Token::new(text, PartOfSpeech::from_penn(raw.tag.trim())))
        })
        .collect()
}
