use crate::{error::StoreError, extract::TranslationOf, HashMap};

use std::collections::hash_map::Entry;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRecord {
    pub source: Option<TranslationOf>,
    pub source_lang: String,
    pub target_lang: Option<String>,
    pub gloss: Option<String>,
    pub written_form: Option<String>,
    pub usage: Option<String>,
    pub line: usize,
    pub disambiguated_senses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexEntryRecord {
    pub lemma: Option<String>,
    pub lexinfo_pos: Option<String>,
    pub dbnary_pos: Option<String>,
    pub synonyms: Vec<String>,
    pub senses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenseRecord {
    pub lemma: Option<String>,
    pub sense_id: Option<String>,
    pub definition: Option<String>,
    pub synonyms: Vec<String>,
    pub disambiguated_translations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymRecord {
    pub word: String,
    pub entry_key: String,
    pub gloss: Option<String>,
    pub line: usize,
}

/// Records of one kind keyed by their dump identifier. The first record saved
/// under a key is kept; later ones are rejected.
#[derive(Debug)]
pub struct RecordStore<T> {
    name: &'static str,
    records: HashMap<String, T>,
}

impl<T> RecordStore<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            records: HashMap::default(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn save(&mut self, key: &str, record: T, line: usize) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey {
                store: self.name,
                line,
            });
        }
        match self.records.entry(key.to_string()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateKey {
                store: self.name,
                key: key.to_string(),
                line,
            }),
            Entry::Vacant(entry) => {
                entry.insert(record);
                Ok(())
            }
        }
    }

    /// Saves and logs a rejection instead of returning it.
    pub fn save_logged(&mut self, key: &str, record: T, line: usize) {
        if let Err(e) = self.save(key, record, line) {
            warn!("{e}");
        }
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &T)> {
        self.records.iter()
    }
}

/// Everything the builders collect from one pass over the dump.
#[derive(Debug)]
pub struct Records {
    pub translations: RecordStore<TranslationRecord>,
    pub lex_entries: RecordStore<LexEntryRecord>,
    pub senses: RecordStore<SenseRecord>,
    pub synonyms: RecordStore<SynonymRecord>,
}

impl Default for Records {
    fn default() -> Self {
        Self {
            translations: RecordStore::new("translation"),
            lex_entries: RecordStore::new("lexical entry"),
            senses: RecordStore::new("lexical sense"),
            synonyms: RecordStore::new("synonym relation"),
        }
    }
}

impl Records {
    /// Translations in dump order, so that everything derived from them is
    /// independent of hash iteration order.
    pub fn translations_in_order(&self) -> Vec<(&String, &TranslationRecord)> {
        let mut translations: Vec<_> = self.translations.iter().collect();
        translations.sort_by(|(ka, a), (kb, b)| a.line.cmp(&b.line).then_with(|| ka.cmp(kb)));
        translations
    }

    pub fn synonyms_in_order(&self) -> Vec<(&String, &SynonymRecord)> {
        let mut synonyms: Vec<_> = self.synonyms.iter().collect();
        synonyms.sort_by(|(ka, a), (kb, b)| a.line.cmp(&b.line).then_with(|| ka.cmp(kb)));
        synonyms
    }

    pub fn log_counts(&self) {
        for (name, len) in [
            (self.translations.name(), self.translations.len()),
            (self.lex_entries.name(), self.lex_entries.len()),
            (self.senses.name(), self.senses.len()),
            (self.synonyms.name(), self.synonyms.len()),
        ] {
            info!("{name} records stored: {len}");
        }
    }
}
