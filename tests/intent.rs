use dmetl::{classify, Intent, INTENT_RULES};

#[test]
fn each_rule_matches_its_keywords() {
    assert_eq!(classify(Some("What is the PRICE?")), Intent::Lead);
    assert_eq!(classify(Some("I want a refund")), Intent::Support);
    assert_eq!(classify(Some("Where is the store?")), Intent::Question);
    assert_eq!(classify(Some("GIVEAWAY!!! free followers")), Intent::Spam);
    assert_eq!(classify(Some("Hi! Do you ship to EU?")), Intent::Other);
}

#[test]
fn missing_and_empty_text_is_other() {
    assert_eq!(classify(None), Intent::Other);
    assert_eq!(classify(Some("")), Intent::Other);
    assert_eq!(classify(None), classify(Some("")));
}

/// Spam keywords alone give `spam`; adding any lead keyword flips it to `lead`.
#[test]
fn spam_only_vs_lead_priority() {
    for kw in ["buy now", "promo", "giveaway", "free followers"] {
        let text = format!("limited {} today", kw);
        assert_eq!(classify(Some(&text)), Intent::Spam, "{text}");
        let with_lead = format!("{text}, what does it cost?");
        assert_eq!(classify(Some(&with_lead)), Intent::Lead, "{with_lead}");
    }
}

/// A lead keyword wins over every other category's keywords.
#[test]
fn lead_beats_every_other_category() {
    let (_, lead_kws) = INTENT_RULES[0];
    for lead in lead_kws {
        for (intent, kws) in &INTENT_RULES[1..] {
            for kw in kws.iter() {
                let text = format!("{kw} ... {lead}");
                assert_eq!(classify(Some(&text)), Intent::Lead, "{text} (other rule {intent})");
            }
        }
    }
}

#[test]
fn support_beats_question_and_question_beats_spam() {
    assert_eq!(classify(Some("can you help me")), Intent::Support);
    assert_eq!(classify(Some("how do i join the giveaway")), Intent::Question);
}

/// Containment is plain substring matching, so "rate" hits inside "separate".
#[test]
fn substring_matching_is_not_word_bounded() {
    assert_eq!(classify(Some("two separate orders")), Intent::Lead);
    assert_eq!(classify(Some("this is a promotional post")), Intent::Spam);
}

#[test]
fn labels_serialize_lowercase() {
    assert_eq!(serde_json::to_string(&Intent::Question).unwrap(), "\"question\"");
    assert_eq!(Intent::Support.to_string(), "support");
}
