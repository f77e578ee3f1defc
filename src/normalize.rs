use std::fmt;

use lazy_static::lazy_static;
use phf::{phf_map, Map};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use strum::{AsRefStr, Display, EnumString};

/// Single-letter part of speech shared by Wiktionary defkeys and WordNet synsets.
#[derive(
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Debug,
    Copy,
    Clone,
    Serialize,
    Deserialize,
    EnumString,
    AsRefStr,
    Display,
)]
pub enum ShortPos {
    #[strum(serialize = "n")]
    #[serde(rename = "n")]
    Noun,
    #[strum(serialize = "v")]
    #[serde(rename = "v")]
    Verb,
    #[strum(serialize = "a")]
    #[serde(rename = "a")]
    Adjective,
    #[strum(serialize = "r")]
    #[serde(rename = "r")]
    Adverb,
    #[strum(serialize = "?")]
    #[serde(rename = "?")]
    Unknown,
}

// lexinfo:partOfSpeech labels, already lower-cased by the extractor
static LONG_POS: Map<&'static str, ShortPos> = phf_map! {
    "noun" => ShortPos::Noun,
    "propernoun" => ShortPos::Noun,
    "verb" => ShortPos::Verb,
    "adjective" => ShortPos::Adjective,
    "adverb" => ShortPos::Adverb,
};

impl ShortPos {
    /// The partitions the alignment runs over, in reporting order.
    pub const ALIGNABLE: [ShortPos; 4] = [
        ShortPos::Noun,
        ShortPos::Verb,
        ShortPos::Adjective,
        ShortPos::Adverb,
    ];

    pub fn from_long(label: &str) -> Self {
        LONG_POS
            .get(label.to_lowercase().as_str())
            .copied()
            .unwrap_or(ShortPos::Unknown)
    }

    // WordNet tags satellite adjectives as "s"
    pub fn from_wordnet(tag: &str) -> Self {
        if tag == "s" {
            return ShortPos::Adjective;
        }
        tag.parse().unwrap_or(ShortPos::Unknown)
    }
}

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Comparison form of a lemma: case-folded, with `-_()[]` read as spaces and
/// whitespace collapsed.
pub fn normalize_lemma(lemma: &str) -> String {
    let spaced = lemma
        .to_lowercase()
        .replace(|c: char| matches!(c, '-' | '_' | '(' | ')' | '[' | ']'), " ");
    WHITESPACE_RUN.replace_all(&spaced, " ").trim().to_string()
}

/// Content hash naming one Wiktionary sense across its synonyms and translations.
#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefKey(String);

impl DefKey {
    pub fn new(lang: &str, word: &str, pos: ShortPos, gloss: &str) -> Self {
        let input = format!("{lang}-{word}-{pos}-{gloss}");
        Self(hex::encode(Sha1::digest(input.as_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DefKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
