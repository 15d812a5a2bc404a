//! The Gita Guide: a canned keyword matcher, not a language model.

/// First message shown in the chat panel.
pub const GREETING: &str =
    "Namaste! I'm your Bhagavad Gita guide. How can I assist you today?";

/// Reply when no rule matches.
pub const FALLBACK: &str = "The Bhagavad Gita teaches us about duty, devotion, and \
    self-realization. Could you please rephrase your question about a specific aspect \
    you'd like to learn more about?";

/// Ordered keyword rules; the first matching rule wins, so rule order is
/// part of the contract even though the current keywords are disjoint.
const RULES: &[(&[&str], &str)] = &[
    (
        &["karma"],
        "Karma Yoga teaches us that we should perform our duties without attachment \
         to the results. As Lord Krishna says, 'You have the right to work, but never \
         to the fruit of work.'",
    ),
    (
        &["dharma"],
        "Dharma refers to one's sacred duty or moral obligations. In the Gita, Krishna \
         explains that following one's dharma, even imperfectly, is better than \
         following someone else's dharma perfectly.",
    ),
    (
        &["meditation", "meditate"],
        "The Gita teaches various forms of meditation, particularly in Chapter 6. It \
         emphasizes the importance of controlling the mind and maintaining steady \
         concentration.",
    ),
    (
        &["purpose", "meaning"],
        "The Bhagavad Gita teaches that our ultimate purpose is self-realization and \
         understanding our true nature. We should perform our duties selflessly while \
         maintaining devotion to the Divine.",
    ),
];

/// Deterministic, total, pure: every input maps to some fixed reply.
pub fn respond(user_text: &str) -> &'static str {
    let lower = user_text.to_lowercase();
    for (keywords, reply) in RULES {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return reply;
        }
    }
    FALLBACK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn karma_question_gets_the_karma_reply() {
        assert_eq!(
            respond("Tell me about karma yoga"),
            "Karma Yoga teaches us that we should perform our duties without attachment \
             to the results. As Lord Krishna says, 'You have the right to work, but never \
             to the fruit of work.'",
        );
    }

    #[test]
    fn unmatched_question_gets_the_fallback() {
        assert_eq!(respond("what is the weather"), FALLBACK);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(respond("KARMA?"), respond("karma?"));
    }

    #[test]
    fn meditate_is_an_alias_for_meditation() {
        assert_eq!(respond("how do I meditate"), respond("meditation"));
    }

    #[test]
    fn first_matching_rule_wins() {
        // Mentions dharma and karma; the karma rule is listed first.
        assert_eq!(respond("dharma versus karma"), respond("karma"));
    }

    #[test]
    fn every_input_maps_to_some_reply() {
        for input in ["", "   ", "42", "धर्म"] {
            assert!(!respond(input).is_empty());
        }
    }
}
