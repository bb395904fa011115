//! Keyword classifiers over the conversation window.
//!
//! Two questions are answered here with case-insensitive regular expressions:
//! does the user want music recommendations, and which genre, style or region
//! (if any) have they mentioned. Matching is bounded on word edges so that
//! short terms such as `rap` or `pop` do not fire inside unrelated words.

use crate::models::ConversationHistory;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    MusicRecommendation,
    GeneralConversation,
}

const RECOMMENDATION_PATTERN: &str = r"(?i)\b(recommend|suggest|play).*music";

/// Genre, style and region vocabulary grouped into families. Family order
/// decides precedence when deriving the genre term for a mood query.
const GENRE_FAMILIES: &[&[&str]] = &[
    &[
        "pop", "rock", "hip hop", "rap", "jazz", "classical", "country", "metal", "punk",
        "indie", "folk", "blues", "reggae", "electronic", "dance", "techno",
    ],
    &["alternative", "ambient", "experimental", "instrumental", "soundtrack", "world"],
    &[
        "ethiopian music",
        "ethio-jazz",
        "traditional ethiopian",
        "tizita",
        "eritrean music",
    ],
    &["k-pop", "j-pop", "c-pop", "asian pop", "mandopop", "cantopop"],
    &[
        "bollywood",
        "indian classical",
        "indian folk",
        "punjabi",
        "filmi",
        "nepali folk",
        "nepali pop",
        "bangladeshi folk",
        "bangla rock",
    ],
    &["afrobeats", "highlife", "soukous", "mbalax", "kizomba", "bongo flava"],
    &["samba", "bossa nova", "latin", "salsa", "merengue", "reggaeton"],
    &["fado", "flamenco", "tango", "mariachi"],
    &["gqom", "amapiano", "kwaito", "african house", "kuduro"],
    &["throat singing", "mongolian", "tuvan"],
    &["gamelan", "dangdut", "kroncong", "nanyin"],
    &["soca", "chutney", "bouyon", "kadans"],
    &["enka", "shibuya-kei", "city pop", "kayokyoku"],
];

/// Flat vocabulary for explicit user preferences; the leftmost mention in
/// the text wins.
const PREFERENCE_TERMS: &[&str] = &[
    "pop", "rock", "hip hop", "rap", "jazz", "classical", "country", "metal", "punk", "indie",
    "folk", "blues", "reggae", "electronic", "dance", "techno", "alternative", "ambient",
    "experimental", "instrumental", "soundtrack", "world", "ethiopian", "ethio-jazz",
    "traditional ethiopian", "tizita", "eritrean", "k-pop", "j-pop", "c-pop", "asian pop",
    "mandopop", "cantopop", "bollywood", "indian classical", "indian folk", "punjabi", "filmi",
    "nepali folk", "nepali pop", "bangladeshi folk", "bangla rock", "afrobeats", "highlife",
    "soukous", "mbalax", "kizomba", "bongo flava", "samba", "bossa nova", "latin", "salsa",
    "merengue", "reggaeton", "fado", "flamenco", "tango", "mariachi", "gqom", "amapiano",
    "kwaito", "african house", "kuduro", "throat singing", "mongolian", "tuvan", "gamelan",
    "dangdut", "kroncong", "nanyin", "soca", "chutney", "bouyon", "kadans", "enka",
    "shibuya-kei", "city pop", "kayokyoku",
];

fn alternation(terms: &[&str]) -> Regex {
    let body = terms
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b({})\b", body)).expect("vocabulary terms are escaped")
}

fn recommendation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(RECOMMENDATION_PATTERN).expect("static pattern"))
}

fn preference_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| alternation(PREFERENCE_TERMS))
}

fn family_regexes() -> &'static [Regex] {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    RE.get_or_init(|| GENRE_FAMILIES.iter().map(|f| alternation(f)).collect())
}

pub fn classify_intent(text: &str) -> Intent {
    if recommendation_regex().is_match(text) {
        Intent::MusicRecommendation
    } else {
        Intent::GeneralConversation
    }
}

pub fn extract_preference(text: &str) -> Option<String> {
    preference_regex()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
}

/// Genre term from the first vocabulary family with any match, or an empty
/// string when nothing in the text is recognised.
pub fn extract_genre(text: &str) -> String {
    family_regexes()
        .iter()
        .find_map(|re| re.find(text))
        .map(|m| m.as_str().to_lowercase())
        .unwrap_or_default()
}

pub fn extract_intent_and_preferences(history: &ConversationHistory) -> (Intent, Option<String>) {
    let text = history.joined();
    (classify_intent(&text), extract_preference(&text))
}

pub fn extract_genre_from_conversation(history: &ConversationHistory) -> String {
    extract_genre(&history.joined())
}

/// Whether the conversation, including the assistant's latest reply, asks
/// for music.
pub fn should_recommend_music(history: &ConversationHistory, reply: &str) -> bool {
    let mut text = history.joined();
    text.push(' ');
    text.push_str(reply);
    classify_intent(&text) == Intent::MusicRecommendation
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_intent() {
        assert_eq!(
            classify_intent("recommend some jazz music"),
            Intent::MusicRecommendation
        );
        assert_eq!(
            classify_intent("Could you SUGGEST upbeat Music for running?"),
            Intent::MusicRecommendation
        );
        assert_eq!(classify_intent("play me music"), Intent::MusicRecommendation);
        assert_eq!(classify_intent("how was your day?"), Intent::GeneralConversation);
        assert_eq!(
            classify_intent("music I would recommend"),
            Intent::GeneralConversation
        );
        assert_eq!(
            classify_intent("the display shows music"),
            Intent::GeneralConversation
        );
    }

    #[test]
    fn test_intent_and_preferences_from_history() {
        let history = ConversationHistory::from_turn(["hello"], "recommend some jazz music");
        let (intent, preference) = extract_intent_and_preferences(&history);
        assert_eq!(intent, Intent::MusicRecommendation);
        assert_eq!(preference.as_deref(), Some("jazz"));
    }

    #[test]
    fn test_preference_leftmost_wins() {
        assert_eq!(
            extract_preference("Some Bossa Nova or maybe rock").as_deref(),
            Some("bossa nova")
        );
        assert_eq!(extract_preference("I love reggaeton").as_deref(), Some("reggaeton"));
        assert_eq!(extract_preference("K-Pop please").as_deref(), Some("k-pop"));
        assert_eq!(extract_preference("therapy and popcorn"), None);
        assert_eq!(extract_preference("nothing here"), None);
    }

    #[test]
    fn test_genre_family_precedence() {
        // Core genres are checked before every regional family
        assert_eq!(extract_genre("city pop or salsa"), "pop");
        assert_eq!(extract_genre("enka and tango"), "tango");
        assert_eq!(extract_genre("some ambient gamelan"), "ambient");
        assert_eq!(extract_genre("Throat Singing"), "throat singing");
        assert_eq!(extract_genre("just chatting"), "");
    }

    #[test]
    fn test_should_recommend_uses_reply() {
        let history = ConversationHistory::from_turn(Vec::<String>::new(), "I feel tired");
        assert!(!should_recommend_music(&history, "Take a break."));
        assert!(should_recommend_music(
            &history,
            "Let me suggest some calming music."
        ));
    }

    #[test]
    fn test_vocabularies_agree() {
        for family in GENRE_FAMILIES {
            for term in *family {
                assert!(
                    !extract_genre(term).is_empty(),
                    "family term {} should match",
                    term
                );
            }
        }
        for term in PREFERENCE_TERMS {
            assert_eq!(extract_preference(term).as_deref(), Some(*term));
        }
    }
}
