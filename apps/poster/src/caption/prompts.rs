//! LLM prompt constants for part-of-speech tagging.
//!
//! The model must return `{"tokens": [{"text": "...", "tag": "..."}]}` JSON only.
//! Callers deserialize via `llm.call_json::<TaggedTokens>()`.

pub const TAG_SYSTEM: &str = "\
You are a part-of-speech tagger. Split the user's text into tokens exactly as written \
(words and punctuation, original casing, original order) and tag each token with its \
Penn Treebank tag (NN, NNS, NNP, NNPS, JJ, JJR, JJS, VB, VBD, VBG, VBN, VBP, VBZ, RB, \
DT, IN, CC, PRP, PRP$, MD, CD, TO, and punctuation tags).\n\
\n\
Respond with valid JSON only: {\"tokens\": [{\"text\": \"...\", \"tag\": \"...\"}]}\n\
Do NOT use markdown code fences. Do NOT add any explanation outside the JSON object.";

pub const TAG_PROMPT_TEMPLATE: &str = "\
Tag every token of the following text.\n\
\n\
TEXT: {text}\n\
\n\
Return JSON only: {\"tokens\": [{\"text\": \"token\", \"tag\": \"TAG\"}]}";
