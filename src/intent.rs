//! Keyword-based intent labelling for message text.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Lead,
    Support,
    Question,
    Spam,
    Other,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Lead => "lead",
            Intent::Support => "support",
            Intent::Question => "question",
            Intent::Spam => "spam",
            Intent::Other => "other",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rules in priority order; the first rule with any matching keyword wins.
pub const INTENT_RULES: [(Intent, &[&str]); 4] = [
    (Intent::Lead, &["price", "cost", "rate", "how much", "subscribe"]),
    (Intent::Support, &["refund", "broken", "issue", "problem", "help"]),
    (Intent::Question, &["how do i", "can you", "where is", "when is"]),
    (Intent::Spam, &["buy now", "promo", "giveaway", "free followers"]),
];

/// Case-insensitive substring match against [`INTENT_RULES`]. Missing text is `Other`.
pub fn classify(text: Option<&str>) -> Intent {
    let t = text.unwrap_or("").to_lowercase();
    INTENT_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| t.contains(k)))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::Other)
}
