//! Offline rule-based tagger.
//!
//! Closed-class words come from static tables; everything else is tagged from
//! capitalisation and suffix rules, falling back to `NN`. It is deliberately
//! crude: good enough to pull nouns and adjectives out of a one-line title.

use async_trait::async_trait;

use crate::caption::{PartOfSpeech, Token, TokenizeError, Tokenizer};

static DETERMINERS: &[&str] = &[
    "a", "all", "an", "another", "any", "both", "each", "either", "every", "neither", "no",
    "some", "that", "the", "these", "this", "those",
];

static PREPOSITIONS: &[&str] = &[
    "about", "above", "across", "after", "against", "along", "among", "around", "as", "at",
    "before", "behind", "below", "beside", "between", "by", "during", "for", "from", "in",
    "inside", "into", "like", "near", "of", "off", "on", "onto", "out", "over", "per", "since",
    "than", "through", "to", "toward", "towards", "under", "until", "up", "upon", "via", "with",
    "within", "without",
];

static CONJUNCTIONS: &[&str] = &[
    "although", "and", "because", "but", "if", "nor", "or", "so", "though", "unless", "whereas",
    "while", "yet",
];

static PRONOUNS: &[&str] = &[
    "anyone", "anything", "everyone", "everything", "he", "her", "hers", "him", "his", "i", "it",
    "its", "me", "mine", "my", "nobody", "nothing", "our", "ours", "she", "someone", "something",
    "their", "theirs", "them", "they", "us", "we", "what", "which", "who", "whom", "whose", "you",
    "your", "yours", "yourself",
];

static MODALS: &[&str] = &[
    "can", "could", "may", "might", "must", "shall", "should", "will", "would",
];

static VERBS: &[&str] = &[
    "am", "are", "ask", "be", "been", "being", "buy", "call", "come", "did", "do", "does", "get",
    "give", "go", "got", "had", "has", "have", "is", "keep", "know", "leave", "let", "look",
    "make", "need", "pay", "put", "say", "see", "sell", "take", "tell", "think", "try", "use",
    "want", "was", "were",
];

static ADVERBS: &[&str] = &[
    "again", "almost", "also", "always", "instead", "just", "never", "not", "now", "often",
    "only", "really", "still", "then", "there", "too", "very", "when", "where", "why",
];

static ADJECTIVE_SUFFIXES: &[&str] = &[
    "able", "ible", "ful", "ous", "ive", "less", "ish", "ical", "ic", "al",
];

/// Rule-based tokenizer used when no LLM key is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconTokenizer;

impl LexiconTokenizer {
    /// Synchronous core of `Tokenizer::tokenize`.
    pub fn tag(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut sentence_start = true;

        for piece in split_pieces(text) {
            let pos = tag_piece(piece, sentence_start);
            sentence_start = matches!(piece, "." | "!" | "?" | ":");
            tokens.push(Token::new(piece, pos));
        }
        tokens
    }
}

#[async_trait]
impl Tokenizer for LexiconTokenizer {
    async fn tokenize(&self, text: &str) -> Result<Vec<Token>, TokenizeError> {
        Ok(self.tag(text))
    }
}

/// Splits text into words and single punctuation marks.
///
/// Apostrophes and hyphens stay inside a word when both neighbours are alphanumeric
/// ("don't", "long-term").
fn split_pieces(text: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut pieces = Vec::new();
    let mut word_start: Option<usize> = None;

    for (i, &(offset, c)) in chars.iter().enumerate() {
        let joins_word = (c == '\'' || c == '-' || c == '’')
            && word_start.is_some()
            && chars
                .get(i + 1)
                .is_some_and(|&(_, next)| next.is_alphanumeric());

        if c.is_alphanumeric() || joins_word {
            word_start.get_or_insert(offset);
            continue;
        }

        if let Some(start) = word_start.take() {
            pieces.push(&text[start..offset]);
        }
        if !c.is_whitespace() {
            pieces.push(&text[offset..offset + c.len_utf8()]);
        }
    }
    if let Some(start) = word_start {
        pieces.push(&text[start..]);
    }
    pieces
}

fn tag_piece(piece: &str, sentence_start: bool) -> PartOfSpeech {
    let mut chars = piece.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return PartOfSpeech::Other(String::new()),
    };

    if !first.is_alphanumeric() {
        return PartOfSpeech::Punctuation;
    }
    if piece.chars().all(|c| c.is_ascii_digit()) {
        return PartOfSpeech::Number;
    }

    let lower = piece.to_lowercase();
    let word = lower.as_str();

    if DETERMINERS.contains(&word) {
        return PartOfSpeech::Determiner;
    }
    if PREPOSITIONS.contains(&word) {
        return PartOfSpeech::Preposition;
    }
    if CONJUNCTIONS.contains(&word) {
        return PartOfSpeech::Conjunction;
    }
    if PRONOUNS.contains(&word) {
        return PartOfSpeech::Pronoun;
    }
    if MODALS.contains(&word) {
        return PartOfSpeech::Modal;
    }
    if VERBS.contains(&word) {
        return PartOfSpeech::Verb;
    }
    if ADVERBS.contains(&word) {
        return PartOfSpeech::Adverb;
    }

    let is_acronym = piece.chars().count() >= 2 && piece.chars().all(|c| c.is_uppercase());
    if is_acronym || (first.is_uppercase() && !sentence_start) {
        return PartOfSpeech::ProperNoun;
    }

    tag_by_suffix(word)
}

fn tag_by_suffix(word: &str) -> PartOfSpeech {
    let len = word.chars().count();
    if len > 4 && word.ends_with("ly") {
        return PartOfSpeech::Adverb;
    }
    if len > 4 && word.ends_with("ing") {
        return PartOfSpeech::Verb;
    }
    if len > 3 && word.ends_with("ed") {
        return PartOfSpeech::Verb;
    }
    if len > 4
        && ADJECTIVE_SUFFIXES
            .iter()
            .any(|suffix| word.ends_with(suffix))
    {
        return PartOfSpeech::Adjective;
    }
    if len > 3 && word.ends_with('s') && !word.ends_with("ss") && !word.ends_with("us") {
        return PartOfSpeech::NounPlural;
    }
    PartOfSpeech::Noun
}
