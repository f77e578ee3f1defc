use crate::{
    error::UnresolvedReference,
    normalize::{normalize_lemma, DefKey, ShortPos},
    records::{LexEntryRecord, Records},
    HashMap,
};

use std::{collections::hash_map::Entry, fmt::Debug};

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use tracing::{debug, info, warn};

/// One lemma of a defkey group or a WordNet synset.
#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Serialize, Deserialize)]
pub struct LemmaEntry {
    pub lemma: String,
    pub lang: String,
    pub pos: ShortPos,
}

impl LemmaEntry {
    pub fn new(lemma: &str, lang: &str, pos: ShortPos) -> Self {
        Self {
            lemma: lemma.to_string(),
            lang: lang.to_string(),
            pos,
        }
    }
}

/// The Wiktionary sense a defkey stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefSummary {
    pub source_lang: String,
    /// Normalized headword of the owning lexical entry.
    pub word: String,
    pub pos: ShortPos,
    pub long_pos: Option<String>,
    pub gloss: Option<String>,
    pub lines: SmallVec<[usize; 2]>,
}

pub type LemmaLists = HashMap<DefKey, Vec<LemmaEntry>>;
pub type Definitions = HashMap<DefKey, DefSummary>;

/// Per-defkey lemma lists and definition summaries.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DefGroups {
    /// Target-language translation lemmas.
    pub translations: LemmaLists,
    /// Source-language lemmas: synonyms, plus the headword of every defkey
    /// first seen through a translation.
    pub synonyms: LemmaLists,
    pub definitions: Definitions,
}

fn push_unique(list: &mut Vec<LemmaEntry>, entry: LemmaEntry) {
    if !list.contains(&entry) {
        list.push(entry);
    }
}

fn short_pos(entry: &LexEntryRecord) -> ShortPos {
    entry
        .lexinfo_pos
        .as_deref()
        .map_or(ShortPos::Unknown, ShortPos::from_long)
}

fn unresolved<R: Debug>(record: &'static str, key: &str, entry: Option<&str>, dump: &R) {
    let e = UnresolvedReference {
        record,
        key: key.to_string(),
        entry: entry.map(str::to_string),
    };
    warn!("{e}, skipping: {dump:#?}");
}

impl DefGroups {
    /// Groups translations and synonym relations under the defkey of the sense
    /// they belong to. Records whose lexical entry cannot be found are skipped.
    pub fn build(lang: &str, records: &Records) -> Self {
        let mut groups = Self::default();
        for (key, translation) in records.translations_in_order() {
            let entry_key = translation.source.as_ref().map(|s| s.entry_key.as_str());
            let (Some(source), Some(entry)) = (
                translation.source.as_ref(),
                entry_key.and_then(|k| records.lex_entries.get(k)),
            ) else {
                unresolved("translation", key, entry_key, translation);
                continue;
            };
            let pos = short_pos(entry);
            let gloss = translation.gloss.as_deref().unwrap_or_default();
            let defkey = DefKey::new(lang, &source.headword, pos, gloss);
            match (&translation.written_form, &translation.target_lang) {
                (Some(form), Some(target)) => push_unique(
                    groups.translations.entry(defkey.clone()).or_default(),
                    LemmaEntry::new(&normalize_lemma(form), target, pos),
                ),
                _ => debug!("translation {key} lacks a written form or target language"),
            }
            match groups.definitions.entry(defkey.clone()) {
                Entry::Occupied(mut def) => def.get_mut().lines.push(translation.line),
                Entry::Vacant(def) => {
                    let word = normalize_lemma(&source.headword);
                    push_unique(
                        groups.synonyms.entry(defkey).or_default(),
                        LemmaEntry::new(&word, lang, pos),
                    );
                    def.insert(DefSummary {
                        source_lang: lang.to_string(),
                        word,
                        pos,
                        long_pos: Some(source.pos.clone()),
                        gloss: translation.gloss.clone(),
                        lines: smallvec![translation.line],
                    });
                }
            }
        }
        for (key, synonym) in records.synonyms_in_order() {
            let entry = records.lex_entries.get(&synonym.entry_key);
            let Some((entry, headword)) =
                entry.and_then(|e| e.lemma.as_deref().map(|lemma| (e, lemma)))
            else {
                unresolved("synonym relation", key, Some(&synonym.entry_key), synonym);
                continue;
            };
            let pos = short_pos(entry);
            let gloss = synonym.gloss.as_deref().unwrap_or_default();
            let defkey = DefKey::new(lang, headword, pos, gloss);
            push_unique(
                groups.synonyms.entry(defkey.clone()).or_default(),
                LemmaEntry::new(&normalize_lemma(&synonym.word), lang, pos),
            );
            match groups.definitions.entry(defkey) {
                Entry::Occupied(mut def) => def.get_mut().lines.push(synonym.line),
                Entry::Vacant(def) => {
                    def.insert(DefSummary {
                        source_lang: lang.to_string(),
                        word: normalize_lemma(headword),
                        pos,
                        long_pos: entry.dbnary_pos.clone(),
                        gloss: synonym.gloss.clone(),
                        lines: smallvec![synonym.line],
                    });
                }
            }
        }
        groups
    }

    pub fn log_sizes(&self) {
        info!("defkeys with translations: {}", self.translations.len());
        info!("defkeys with source-language lemmas: {}", self.synonyms.len());
        info!("defkey definitions: {}", self.definitions.len());
    }
}
