use thiserror::Error;

use crate::caption::TokenizeError;
use crate::feed::FetchError;
use crate::layout::LayoutError;
use crate::store::StoreError;

/// Run-level error.
/// `is_per_candidate` decides whether the pipeline skips to the next candidate or halts.
#[derive(Debug, Error)]
pub enum PosterError {
    #[error("Dedup store error: {0}")]
    Store(#[from] StoreError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Tokenizer error: {0}")]
    Tokenize(#[from] TokenizeError),

    #[error("No candidate produced a post ({considered} considered)")]
    Exhausted { considered: usize },
}

impl PosterError {
    /// Errors tied to one candidate's content. The run moves on to the next candidate
    /// and leaves this one unmarked.
    pub fn is_per_candidate(&self) -> bool {
        matches!(
            self,
            PosterError::Fetch(_) | PosterError::Layout(_) | PosterError::Tokenize(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;

    #[test]
    fn test_classification() {
        assert!(PosterError::from(FetchError::UnsupportedImage("x".into())).is_per_candidate());
        assert!(PosterError::from(LayoutError::EmptyText).is_per_candidate());
        assert!(PosterError::from(TokenizeError::Malformed("x".into())).is_per_candidate());

        assert!(!PosterError::from(StoreError::InvalidId("".into())).is_per_candidate());
        assert!(!PosterError::Exhausted { considered: 3 }.is_per_candidate());
    }

    #[test]
    fn test_llm_failure_arrives_as_tokenizer_error() {
        let err = PosterError::from(TokenizeError::from(LlmError::EmptyContent));
        assert!(matches!(err, PosterError::Tokenize(TokenizeError::Llm(_))));
        assert!(err.is_per_candidate());
    }

    #[test]
    fn test_exhausted_names_count() {
        let msg = PosterError::Exhausted { considered: 7 }.to_string();
        assert!(msg.contains("7 considered"), "{msg}");
    }
}
