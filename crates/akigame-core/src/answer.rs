//! Canonical answer tokens and the free-text answer normalizer.
//!
//! Players type answers in free text. The normalizer folds case, trims
//! whitespace and maps the result onto a closed set of tokens. There is no
//! fuzzy matching: anything outside the vocabulary is rejected.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the five answers the oracle understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    /// "Yes".
    Yes,
    /// "No".
    No,
    /// "I don't know".
    Unknown,
    /// "Probably".
    Probably,
    /// "Probably not".
    ProbablyNot,
}

impl Answer {
    /// Numeric code used by the oracle wire protocol.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Yes => 0,
            Self::No => 1,
            Self::Unknown => 2,
            Self::Probably => 3,
            Self::ProbablyNot => 4,
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Unknown => "unknown",
            Self::Probably => "probably",
            Self::ProbablyNot => "probably-not",
        };
        f.write_str(label)
    }
}

/// A canonical token: either an answer to forward to the oracle or a request
/// to revisit the previous question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Token {
    /// Answer the current question.
    Answer(Answer),
    /// Go back one question.
    Back,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Answer(answer) => answer.fmt(f),
            Self::Back => f.write_str("back"),
        }
    }
}

const ENGLISH_FORMS: &[(&str, Token)] = &[
    ("yes", Token::Answer(Answer::Yes)),
    ("y", Token::Answer(Answer::Yes)),
    ("0", Token::Answer(Answer::Yes)),
    ("no", Token::Answer(Answer::No)),
    ("n", Token::Answer(Answer::No)),
    ("1", Token::Answer(Answer::No)),
    ("i", Token::Answer(Answer::Unknown)),
    ("idk", Token::Answer(Answer::Unknown)),
    ("i dont know", Token::Answer(Answer::Unknown)),
    ("i don't know", Token::Answer(Answer::Unknown)),
    ("2", Token::Answer(Answer::Unknown)),
    ("probably", Token::Answer(Answer::Probably)),
    ("p", Token::Answer(Answer::Probably)),
    ("3", Token::Answer(Answer::Probably)),
    ("probably not", Token::Answer(Answer::ProbablyNot)),
    ("pn", Token::Answer(Answer::ProbablyNot)),
    ("4", Token::Answer(Answer::ProbablyNot)),
    ("back", Token::Back),
    ("b", Token::Back),
];

fn fold(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Maps free-text input onto canonical [`Token`]s.
#[derive(Debug, Clone)]
pub struct Normalizer {
    forms: HashMap<String, Token>,
}

impl Normalizer {
    /// The English vocabulary shipped with the game.
    #[must_use]
    pub fn english() -> Self {
        let forms = ENGLISH_FORMS
            .iter()
            .map(|(form, token)| ((*form).to_owned(), *token))
            .collect();
        Self { forms }
    }

    /// Adds an extra surface form, e.g. a localized word for "yes".
    #[must_use]
    pub fn with_alias(mut self, form: &str, token: Token) -> Self {
        self.forms.insert(fold(form), token);
        self
    }

    /// Returns the token for `raw`, or `None` if it is not in the vocabulary.
    #[must_use]
    pub fn normalize(&self, raw: &str) -> Option<Token> {
        self.forms.get(&fold(raw)).copied()
    }

    /// Whether `raw` is an accepted surface form.
    #[must_use]
    pub fn accepts(&self, raw: &str) -> bool {
        self.forms.contains_key(&fold(raw))
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::english()
    }
}

/// Parses a yes/no confirmation. Accepts `yes`, `y`, `no` and `n`.
#[must_use]
pub fn parse_yes_no(raw: &str) -> Option<bool> {
    match fold(raw).as_str() {
        "yes" | "y" => Some(true),
        "no" | "n" => Some(false),
        _ => None,
    }
}
