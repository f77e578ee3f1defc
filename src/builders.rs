//! Turns grouped dump records into typed records. Each record type has a
//! table mapping property names to the extractor that fills the matching
//! field; a missing sub-pattern leaves the field empty and is logged.

use crate::{
    error::{MissKind, PatternMiss},
    extract::{self, SourcePatterns, SYNONYM_PREDICATE},
    reader::{RecordBuffer, RecordKind},
    records::{LexEntryRecord, Records, SenseRecord, SynonymRecord, TranslationRecord},
};

use anyhow::Result;
use tracing::{debug, info};

const TRANSLATION_MARKER: &str = "dbnary:Translation";
const LEX_ENTRY_MARKER: &str = "lemon:LexicalEntry";
const LEX_SENSE_MARKER: &str = "lemon:LexicalSense";
const SYNONYM_PROPERTY: &str = "dbnary:synonym";

type Setter<D> = fn(&mut D, &SourcePatterns, &str) -> Result<(), MissKind>;

static TRANSLATION_PROPERTIES: &[(&str, Setter<TranslationRecord>)] = &[
    ("dbnary:gloss", |t, _, value| {
        t.gloss = Some(extract::quoted(value)?);
        Ok(())
    }),
    ("dbnary:isTranslationOf", |t, patterns, value| {
        t.source = Some(extract::translation_of(patterns, value)?);
        Ok(())
    }),
    ("dbnary:targetLanguage", |t, _, value| {
        t.target_lang = Some(extract::target_language(value)?);
        Ok(())
    }),
    ("dbnary:usage", |t, _, value| {
        t.usage = Some(extract::non_empty_quoted(value)?);
        Ok(())
    }),
    ("dbnary:writtenForm", |t, _, value| {
        t.written_form = Some(extract::non_empty_quoted(value)?);
        Ok(())
    }),
];

static LEX_ENTRY_PROPERTIES: &[(&str, Setter<LexEntryRecord>)] = &[
    ("dbnary:partOfSpeech", |e, _, value| {
        e.dbnary_pos = Some(extract::non_empty_quoted(value)?);
        Ok(())
    }),
    (SYNONYM_PROPERTY, |e, _, value| {
        e.synonyms = extract::synonyms(value)?;
        Ok(())
    }),
    ("lemon:sense", |e, _, value| {
        e.senses = extract::sense_refs(value)?;
        Ok(())
    }),
    ("lexinfo:partOfSpeech", |e, _, value| {
        e.lexinfo_pos = Some(extract::lexinfo_pos(value)?);
        Ok(())
    }),
];

static LEX_SENSE_PROPERTIES: &[(&str, Setter<SenseRecord>)] = &[
    ("dbnary:senseNumber", |s, _, value| {
        s.sense_id = Some(extract::sense_id(value)?);
        Ok(())
    }),
    (SYNONYM_PROPERTY, |s, _, value| {
        s.synonyms = extract::synonyms(value)?;
        Ok(())
    }),
    ("lemon:definition", |s, _, value| {
        s.definition = Some(extract::definition(value)?);
        Ok(())
    }),
];

#[derive(Debug, Default)]
struct SynonymDraft {
    word: Option<String>,
    subject: Option<String>,
    gloss: Option<String>,
}

static SYNONYM_RELATION_PROPERTIES: &[(&str, Setter<SynonymDraft>)] = &[
    ("rdf:object", |d, patterns, value| {
        d.word = Some(extract::synonym_word(patterns, value)?);
        Ok(())
    }),
    ("rdf:subject", |d, _, value| {
        d.subject = Some(extract::subject(value)?);
        Ok(())
    }),
    ("dbnary:gloss", |d, _, value| {
        d.gloss = Some(extract::synonym_gloss(value)?);
        Ok(())
    }),
];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildStats {
    pub translations: usize,
    pub lexical_entries: usize,
    pub lexical_senses: usize,
    pub synonym_relations: usize,
    pub entries_with_synonyms: usize,
    pub senses_with_synonyms: usize,
}

impl BuildStats {
    pub fn log(&self) {
        info!("dbnary:Translation records: {}", self.translations);
        info!("lemon:LexicalEntry records: {}", self.lexical_entries);
        info!("lemon:LexicalSense records: {}", self.lexical_senses);
        info!("synonym relation records: {}", self.synonym_relations);
        info!("lexical entries with dbnary:synonym: {}", self.entries_with_synonyms);
        info!("lexical senses with dbnary:synonym: {}", self.senses_with_synonyms);
    }
}

/// Runs every record builder over each source-language record and collects
/// the results.
pub struct Builders {
    patterns: SourcePatterns,
    records: Records,
    stats: BuildStats,
}

impl Builders {
    pub fn new(code3: &str) -> Result<Self> {
        Ok(Self {
            patterns: SourcePatterns::new(code3)?,
            records: Records::default(),
            stats: BuildStats::default(),
        })
    }

    pub fn finish(self) -> (Records, BuildStats) {
        (self.records, self.stats)
    }

    /// Expects a buffer that has been through [`RecordBuffer::reorganized`].
    pub fn build(&mut self, record: &RecordBuffer) {
        if record.kind != RecordKind::Source {
            return;
        }
        self.build_translation(record);
        self.build_lex_entry(record);
        self.build_lex_sense(record);
        self.build_synonym_relation(record);
    }

    fn build_translation(&mut self, record: &RecordBuffer) {
        let Some(properties) = typed_properties(record, TRANSLATION_MARKER) else {
            return;
        };
        self.stats.translations += 1;
        let mut translation = TranslationRecord {
            source: None,
            source_lang: self.patterns.code().to_string(),
            target_lang: None,
            gloss: None,
            written_form: None,
            usage: None,
            line: record.first_line,
            disambiguated_senses: vec![],
        };
        dispatch(&mut translation, TRANSLATION_PROPERTIES, &self.patterns, record, properties);
        self.records
            .translations
            .save_logged(record.key(), translation, record.first_line);
    }

    fn build_lex_entry(&mut self, record: &RecordBuffer) {
        let Some(properties) = typed_properties(record, LEX_ENTRY_MARKER) else {
            return;
        };
        self.stats.lexical_entries += 1;
        if has_property(properties, SYNONYM_PROPERTY) {
            self.stats.entries_with_synonyms += 1;
        }
        let key = record.key();
        let mut entry = LexEntryRecord {
            lemma: logged(extract::entry_lemma(key), "lexical entry key", record, key),
            lexinfo_pos: None,
            dbnary_pos: None,
            synonyms: vec![],
            senses: vec![],
        };
        dispatch(&mut entry, LEX_ENTRY_PROPERTIES, &self.patterns, record, properties);
        if !entry.synonyms.is_empty() {
            debug!("lexical entry {key} has synonyms {:?}", entry.synonyms);
        }
        self.records
            .lex_entries
            .save_logged(key, entry, record.first_line);
    }

    fn build_lex_sense(&mut self, record: &RecordBuffer) {
        let Some(properties) = typed_properties(record, LEX_SENSE_MARKER) else {
            return;
        };
        self.stats.lexical_senses += 1;
        if has_property(properties, SYNONYM_PROPERTY) {
            self.stats.senses_with_synonyms += 1;
        }
        let key = record.key();
        let mut sense = SenseRecord {
            lemma: logged(extract::sense_lemma(key), "lexical sense key", record, key),
            sense_id: None,
            definition: None,
            synonyms: vec![],
            disambiguated_translations: vec![],
        };
        dispatch(&mut sense, LEX_SENSE_PROPERTIES, &self.patterns, record, properties);
        self.records.senses.save_logged(key, sense, record.first_line);
    }

    fn build_synonym_relation(&mut self, record: &RecordBuffer) {
        if !record.lines.iter().any(|line| SYNONYM_PREDICATE.is_match(line)) {
            return;
        }
        self.stats.synonym_relations += 1;
        let mut draft = SynonymDraft::default();
        let properties = record.lines.get(1..).unwrap_or_default();
        dispatch(&mut draft, SYNONYM_RELATION_PROPERTIES, &self.patterns, record, properties);
        let code = self.patterns.code();
        match draft {
            SynonymDraft {
                word: Some(word),
                subject: Some(entry_key),
                gloss,
            } if entry_key.starts_with(code) => {
                let synonym = SynonymRecord {
                    word,
                    entry_key,
                    gloss,
                    line: record.first_line,
                };
                self.records
                    .synonyms
                    .save_logged(record.key(), synonym, record.first_line);
            }
            _ => debug!(
                "synonym relation at line {}+ has no {code} word or subject",
                record.first_line
            ),
        }
    }
}

/// The property lines after the type statement, if line 1 carries `marker`.
fn typed_properties<'a>(record: &'a RecordBuffer, marker: &str) -> Option<&'a [String]> {
    match record.lines.get(1) {
        Some(type_line) if type_line.contains(marker) => Some(&record.lines[2..]),
        _ => None,
    }
}

fn has_property(lines: &[String], property: &str) -> bool {
    lines
        .iter()
        .any(|line| line.split_whitespace().next() == Some(property))
}

fn dispatch<D>(
    draft: &mut D,
    table: &[(&'static str, Setter<D>)],
    patterns: &SourcePatterns,
    record: &RecordBuffer,
    lines: &[String],
) {
    for line in lines {
        let (name, value) = extract::split_property(line);
        let Some((property, setter)) = table.iter().find(|(property, _)| *property == name) else {
            continue;
        };
        if let Err(kind) = setter(draft, patterns, &value) {
            debug!(
                "{}",
                PatternMiss {
                    kind,
                    property: *property,
                    line: record.first_line,
                    value,
                }
            );
        }
    }
}

fn logged(
    result: Result<String, MissKind>,
    property: &'static str,
    record: &RecordBuffer,
    value: &str,
) -> Option<String> {
    match result {
        Ok(v) => Some(v),
        Err(kind) => {
            debug!(
                "{}",
                PatternMiss {
                    kind,
                    property,
                    line: record.first_line,
                    value: value.to_string(),
                }
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::TranslationOf;

    fn record(first_line: usize, lines: &[&str]) -> RecordBuffer {
        RecordBuffer {
            kind: RecordKind::Source,
            first_line,
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
        .reorganized()
    }

    fn built(records: &[RecordBuffer]) -> (Records, BuildStats) {
        let mut builders = Builders::new("eng").unwrap();
        for r in records {
            builders.build(r);
        }
        builders.finish()
    }

    #[test]
    fn builds_translation() {
        let (records, stats) = built(&[record(
            7,
            &[
                "eng:__tr_fra_1_mouse__Noun__1",
                "a dbnary:Translation ;",
                "dbnary:gloss \"a small rodent\" ;",
                "dbnary:isTranslationOf eng:mouse__Noun__1 ;",
                "dbnary:targetLanguage lexvo:fra ;",
                "dbnary:usage \"f\" ;",
                "dbnary:writtenForm \"souris\"@fr .",
            ],
        )]);
        assert_eq!(1, stats.translations);
        let t = records.translations.get("eng:__tr_fra_1_mouse__Noun__1").unwrap();
        assert_eq!(
            &TranslationRecord {
                source: Some(TranslationOf {
                    entry_key: "eng:mouse__Noun__1".into(),
                    headword: "mouse".into(),
                    pos: "Noun".into(),
                    lex_id: "1".into(),
                }),
                source_lang: "eng".into(),
                target_lang: Some("fra".into()),
                gloss: Some("a small rodent".into()),
                written_form: Some("souris".into()),
                usage: Some("f".into()),
                line: 7,
                disambiguated_senses: vec![],
            },
            t
        );
    }

    #[test]
    fn fused_first_line_is_typed_after_reorganization() {
        let (records, _) = built(&[record(
            1,
            &[
                "eng:mouse__Noun__1 a lemon:LexicalEntry ;",
                "dbnary:partOfSpeech \"-noun-\" ;",
                "dbnary:synonym eng:vole , eng:field_mouse ;",
                "lemon:sense eng:__ws_1_mouse__Noun__1 , eng:__ws_2_mouse__Noun__1 ;",
                "lexinfo:partOfSpeech lexinfo:noun .",
            ],
        )]);
        let entry = records.lex_entries.get("eng:mouse__Noun__1").unwrap();
        assert_eq!(Some("mouse"), entry.lemma.as_deref());
        assert_eq!(Some("noun"), entry.lexinfo_pos.as_deref());
        assert_eq!(Some("-noun-"), entry.dbnary_pos.as_deref());
        assert_eq!(vec!["vole", "field_mouse"], entry.synonyms);
        assert_eq!(2, entry.senses.len());
    }

    #[test]
    fn builds_sense() {
        let (records, stats) = built(&[record(
            3,
            &[
                "eng:__ws_1_mouse__Noun__1",
                "a lemon:LexicalSense ;",
                "dbnary:senseNumber \"1\" ;",
                "dbnary:synonym eng:vole ;",
                "lemon:definition [ lemon:value \"A small rodent.\"@en ] .",
            ],
        )]);
        assert_eq!(1, stats.senses_with_synonyms);
        let sense = records.senses.get("eng:__ws_1_mouse__Noun__1").unwrap();
        assert_eq!(Some("mouse"), sense.lemma.as_deref());
        assert_eq!(Some("1"), sense.sense_id.as_deref());
        assert_eq!(Some("A small rodent."), sense.definition.as_deref());
        assert_eq!(vec!["vole"], sense.synonyms);
    }

    #[test]
    fn builds_synonym_relation_for_source_subjects_only() {
        let (records, stats) = built(&[
            record(
                40,
                &[
                    "eng:__sr_1",
                    "a rdf:Statement ;",
                    "rdf:subject eng:mouse__Noun__1 ;",
                    "rdf:predicate dbnary:synonym ;",
                    "rdf:object eng:vole ;",
                    "dbnary:gloss \"rodent\" .",
                ],
            ),
            record(
                50,
                &[
                    "eng:__sr_2",
                    "a rdf:Statement ;",
                    "rdf:subject fra:souris__Nom__1 ;",
                    "rdf:predicate dbnary:synonym ;",
                    "rdf:object eng:vole .",
                ],
            ),
        ]);
        assert_eq!(2, stats.synonym_relations);
        assert_eq!(1, records.synonyms.len());
        let s = records.synonyms.get("eng:__sr_1").unwrap();
        assert_eq!(
            &SynonymRecord {
                word: "vole".into(),
                entry_key: "eng:mouse__Noun__1".into(),
                gloss: Some("rodent".into()),
                line: 40,
            },
            s
        );
    }

    #[test]
    fn untyped_or_short_records_are_ignored() {
        let (records, stats) = built(&[
            record(1, &["eng:lonely"]),
            record(3, &["eng:thing", "a owl:Thing ;", "dbnary:gloss \"x\" ."]),
            RecordBuffer {
                kind: RecordKind::External,
                first_line: 6,
                lines: vec![
                    "<http://example.org/x>".into(),
                    "a dbnary:Translation ;".into(),
                ],
            },
        ]);
        assert_eq!(BuildStats::default(), stats);
        assert!(records.translations.is_empty());
        assert!(records.lex_entries.is_empty());
        assert!(records.senses.is_empty());
        assert!(records.synonyms.is_empty());
    }

    #[test]
    fn pattern_misses_leave_fields_empty() {
        let (records, _) = built(&[record(
            9,
            &[
                "eng:__tr_deu_1_mouse__Noun__1",
                "a dbnary:Translation ;",
                "dbnary:isTranslationOf <http://kaiko.getalp.org/dbnary/eng/mouse> ;",
                "dbnary:writtenForm \"\"@de .",
            ],
        )]);
        let t = records.translations.get("eng:__tr_deu_1_mouse__Noun__1").unwrap();
        assert_eq!(None, t.source);
        assert_eq!(None, t.written_form);
        assert_eq!(None, t.target_lang);
    }

    #[test]
    fn duplicate_keys_keep_first_record() {
        let lines = [
            "eng:__tr_fra_1_mouse__Noun__1",
            "a dbnary:Translation ;",
            "dbnary:writtenForm \"souris\"@fr .",
        ];
        let (records, stats) = built(&[record(1, &lines), record(5, &lines)]);
        assert_eq!(2, stats.translations);
        assert_eq!(1, records.translations.len());
        assert_eq!(1, records.translations.get(lines[0]).unwrap().line);
    }
}
