use crate::{
    defgroups::LemmaEntry,
    error::LookupError,
    normalize::{normalize_lemma, ShortPos},
    HashMap,
};

use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use tracing::{debug, error, info};

/// Lemma lists keyed by wncode.
pub type SynsetGroups = HashMap<String, Vec<LemmaEntry>>;
/// Gloss text keyed by wncode.
pub type SynsetGlosses = HashMap<String, String>;

const SYNSET_LEMMAS_SQL: &str = "SELECT s.synset, w.lemma, w.pos, s.lang \
    FROM sense s, word w \
    WHERE s.wordid = w.wordid AND s.lang = w.lang AND s.confidence = 1 \
    ORDER BY s.synset, s.lang, w.lemma";

const SYNSET_GLOSSES_SQL: &str = "SELECT synset, def FROM synset_def WHERE lang = ?1";

pub trait SynsetSource {
    /// Lemmas of every synset, lower-cased, with confident senses only.
    fn synset_lemmas(&self) -> Result<SynsetGroups, LookupError>;
    fn synset_glosses(&self, lang: &str) -> Result<SynsetGlosses, LookupError>;
}

/// A multilingual WordNet in the wn-multix SQLite layout.
pub struct SqliteWordNet {
    conn: Connection,
}

impl SqliteWordNet {
    pub fn open(path: &Path) -> Result<Self, LookupError> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|source| LookupError::Unavailable {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self { conn })
    }
}

impl SynsetSource for SqliteWordNet {
    fn synset_lemmas(&self) -> Result<SynsetGroups, LookupError> {
        let mut stmt = self.conn.prepare(SYNSET_LEMMAS_SQL)?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;
        let mut groups = SynsetGroups::default();
        let mut n_rows = 0;
        for row in rows {
            let (synset, lemma, pos, lang) = row?;
            n_rows += 1;
            groups.entry(synset).or_default().push(LemmaEntry {
                lemma: lemma.to_lowercase(),
                lang,
                pos: ShortPos::from_wordnet(&pos),
            });
        }
        info!("WordNet sense rows retrieved: {n_rows}");
        if n_rows == 0 {
            debug!("WordNet sense query returned nothing");
        }
        Ok(groups)
    }

    fn synset_glosses(&self, lang: &str) -> Result<SynsetGlosses, LookupError> {
        let mut stmt = self.conn.prepare(SYNSET_GLOSSES_SQL)?;
        let rows = stmt.query_map([lang], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut glosses = SynsetGlosses::default();
        for row in rows {
            let (synset, gloss) = row?;
            glosses.insert(synset, gloss);
        }
        info!("WordNet {lang} glosses retrieved: {}", glosses.len());
        Ok(glosses)
    }
}

/// Applies the lemma normalization used on the Wiktionary side.
pub fn normalized(groups: SynsetGroups) -> SynsetGroups {
    groups
        .into_iter()
        .map(|(wncode, lemmas)| {
            let lemmas = lemmas
                .into_iter()
                .map(|entry| LemmaEntry {
                    lemma: normalize_lemma(&entry.lemma),
                    ..entry
                })
                .collect();
            (wncode, lemmas)
        })
        .collect()
}

/// Normalized synset lemmas, or an empty map if the database cannot be read.
pub fn load_synset_lemmas(path: &Path) -> SynsetGroups {
    match SqliteWordNet::open(path).and_then(|wn| wn.synset_lemmas()) {
        Ok(groups) => normalized(groups),
        Err(e) => {
            error!("{:#}", anyhow::Error::from(e));
            SynsetGroups::default()
        }
    }
}

/// Synset glosses, or an empty map if the database cannot be read.
pub fn load_synset_glosses(path: &Path, lang: &str) -> SynsetGlosses {
    match SqliteWordNet::open(path).and_then(|wn| wn.synset_glosses(lang)) {
        Ok(glosses) => glosses,
        Err(e) => {
            error!("{:#}", anyhow::Error::from(e));
            SynsetGlosses::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wordnet_file(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("wn.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE word (wordid INTEGER, lang TEXT, lemma TEXT, pos TEXT);
             CREATE TABLE sense (synset TEXT, wordid INTEGER, lang TEXT, confidence INTEGER);
             CREATE TABLE synset_def (synset TEXT, lang TEXT, def TEXT);
             INSERT INTO word VALUES
                 (1, 'eng', 'Mouse', 'n'),
                 (2, 'fra', 'souris', 'n'),
                 (3, 'eng', 'computer_mouse', 'n'),
                 (4, 'eng', 'tiny', 's'),
                 (5, 'ita', 'topo', 'n');
             INSERT INTO sense VALUES
                 ('02330245-n', 1, 'eng', 1),
                 ('02330245-n', 2, 'fra', 1),
                 ('03793489-n', 3, 'eng', 1),
                 ('03793489-n', 1, 'eng', 1),
                 ('01392080-s', 4, 'eng', 1),
                 ('02330245-n', 5, 'ita', 0),
                 ('02330245-n', 2, 'eng', 1);
             INSERT INTO synset_def VALUES
                 ('02330245-n', 'eng', 'any of numerous small rodents'),
                 ('02330245-n', 'fra', 'petit rongeur');",
        )
        .unwrap();
        path
    }

    #[test]
    fn reads_confident_lemmas_per_synset() {
        let dir = tempfile::tempdir().unwrap();
        let wn = SqliteWordNet::open(&wordnet_file(dir.path())).unwrap();
        let groups = wn.synset_lemmas().unwrap();
        assert_eq!(3, groups.len());
        assert_eq!(
            vec![
                LemmaEntry::new("mouse", "eng", ShortPos::Noun),
                LemmaEntry::new("souris", "fra", ShortPos::Noun),
            ],
            groups["02330245-n"]
        );
        assert_eq!(
            vec![LemmaEntry::new("tiny", "eng", ShortPos::Adjective)],
            groups["01392080-s"]
        );
        // ordered by raw lemma, where "Mouse" sorts before "computer_mouse"
        let normalized = normalized(groups);
        assert_eq!(
            vec![
                LemmaEntry::new("mouse", "eng", ShortPos::Noun),
                LemmaEntry::new("computer mouse", "eng", ShortPos::Noun),
            ],
            normalized["03793489-n"]
        );
    }

    #[test]
    fn reads_glosses_for_one_language() {
        let dir = tempfile::tempdir().unwrap();
        let glosses = load_synset_glosses(&wordnet_file(dir.path()), "eng");
        assert_eq!(1, glosses.len());
        assert_eq!("any of numerous small rodents", glosses["02330245-n"]);
    }

    #[test]
    fn missing_database_yields_empty_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.db");
        assert!(matches!(
            SqliteWordNet::open(&path),
            Err(LookupError::Unavailable { .. })
        ));
        assert!(load_synset_lemmas(&path).is_empty());
        assert!(!path.exists());
    }
}
