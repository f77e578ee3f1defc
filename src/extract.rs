//! Field extractors for the property lines of a dump record. Each one takes
//! the raw value string (everything after the property name) and either
//! yields its field or reports which sub-pattern was missing.

use crate::error::MissKind;

use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref QUOTED: Regex = Regex::new(r#""(.*)""#).unwrap();
    static ref TARGET_LANGUAGE: Regex = Regex::new(r"lexvo:(.*)\s+;").unwrap();
    static ref LEXINFO_POS: Regex = Regex::new(r"lexinfo:(\S+)\s+").unwrap();
    static ref PREFIXED_TOKEN: Regex = Regex::new(r":\S+\s").unwrap();
    static ref SENSE_REF: Regex = Regex::new(r"\S+:\S+\s").unwrap();
    static ref DEFINITION: Regex = Regex::new(r#"lemon:value\s+"(.+)""#).unwrap();
    static ref UNDERSCORE_RUN: Regex = Regex::new(r"_{2,}").unwrap();
    pub static ref SYNONYM_PREDICATE: Regex = Regex::new(r"rdf:predicate\s+dbnary:synonym").unwrap();
}

const URL_PREFIX: &str = "<http:";

/// Patterns that embed the source-language code.
#[derive(Debug)]
pub struct SourcePatterns {
    code: String,
    translation_of: Regex,
    synonym_word: Regex,
}

impl SourcePatterns {
    pub fn new(code3: &str) -> Result<Self> {
        let code = regex::escape(code3);
        Ok(Self {
            code: code3.to_string(),
            translation_of: Regex::new(&format!(r"{code}:(\S+)\s+;"))?,
            synonym_word: Regex::new(&format!(r"{code}:\S+"))?,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

/// The source lexical entry a translation belongs to, as named by its
/// `dbnary:isTranslationOf` value `<code>:<headword>__<pos>__<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationOf {
    pub entry_key: String,
    pub headword: String,
    pub pos: String,
    pub lex_id: String,
}

/// Splits a trimmed record line into its property name and the rest of the
/// line, re-joined with single spaces.
pub fn split_property(line: &str) -> (&str, String) {
    let mut parts = line.split_whitespace();
    let name = parts.next().unwrap_or_default();
    (name, parts.collect::<Vec<_>>().join(" "))
}

/// The first double-quoted substring, which may be empty.
pub fn quoted(value: &str) -> Result<String, MissKind> {
    QUOTED
        .captures(value)
        .map(|caps| caps[1].to_string())
        .ok_or(MissKind::Quoted)
}

pub fn non_empty_quoted(value: &str) -> Result<String, MissKind> {
    quoted(value).and_then(|s| if s.is_empty() { Err(MissKind::Quoted) } else { Ok(s) })
}

pub fn translation_of(patterns: &SourcePatterns, value: &str) -> Result<TranslationOf, MissKind> {
    if let Some(caps) = patterns.translation_of.captures(value) {
        let token = &caps[1];
        let items: Vec<&str> = UNDERSCORE_RUN.split(token).collect();
        if let [headword, pos, lex_id] = items[..] {
            return Ok(TranslationOf {
                entry_key: format!("{}:{token}", patterns.code),
                headword: headword.to_string(),
                pos: pos.to_string(),
                lex_id: lex_id.to_string(),
            });
        }
    }
    if value.contains(URL_PREFIX) {
        Err(MissKind::Url)
    } else {
        Err(MissKind::Shape)
    }
}

pub fn target_language(value: &str) -> Result<String, MissKind> {
    TARGET_LANGUAGE
        .captures(value)
        .map(|caps| caps[1].trim().to_string())
        .filter(|code| !code.is_empty())
        .ok_or(MissKind::Prefixed)
}

pub fn lexinfo_pos(value: &str) -> Result<String, MissKind> {
    LEXINFO_POS
        .captures(value)
        .map(|caps| caps[1].to_lowercase())
        .ok_or(MissKind::Prefixed)
}

/// Prefixed tokens with their prefix removed. Tokens containing `/` are URLs
/// and are dropped.
pub fn synonyms(value: &str) -> Result<Vec<String>, MissKind> {
    let finds: Vec<&str> = PREFIXED_TOKEN.find_iter(value).map(|m| m.as_str()).collect();
    if finds.is_empty() {
        return Err(MissKind::Prefixed);
    }
    Ok(finds
        .into_iter()
        .filter(|token| !token.contains('/'))
        .map(|token| token[1..].trim().to_string())
        .collect())
}

/// Prefixed tokens kept whole, e.g. the `lemon:sense` list of an entry.
pub fn sense_refs(value: &str) -> Result<Vec<String>, MissKind> {
    let senses: Vec<String> = SENSE_REF
        .find_iter(value)
        .map(|m| m.as_str().trim().to_string())
        .collect();
    if senses.is_empty() {
        Err(MissKind::Prefixed)
    } else {
        Ok(senses)
    }
}

pub fn sense_id(value: &str) -> Result<String, MissKind> {
    non_empty_quoted(value).map(|id| id.to_lowercase())
}

pub fn definition(value: &str) -> Result<String, MissKind> {
    DEFINITION
        .captures(value)
        .map(|caps| caps[1].to_string())
        .ok_or(MissKind::Definition)
}

/// The first source-prefixed token of an `rdf:object` value, without its prefix.
pub fn synonym_word(patterns: &SourcePatterns, value: &str) -> Result<String, MissKind> {
    patterns
        .synonym_word
        .find(value)
        .map(|m| m.as_str()[patterns.code.len() + 1..].to_string())
        .ok_or(MissKind::Prefixed)
}

pub fn subject(value: &str) -> Result<String, MissKind> {
    value
        .split_whitespace()
        .next()
        .map(str::to_string)
        .ok_or(MissKind::Prefixed)
}

pub fn synonym_gloss(value: &str) -> Result<String, MissKind> {
    quoted(value).map(|gloss| gloss.trim().to_string())
}

/// `eng:mouse__Noun__1` → `mouse`
pub fn entry_lemma(key: &str) -> Result<String, MissKind> {
    let head = UNDERSCORE_RUN.split(key).next().unwrap_or_default();
    head.split(':')
        .nth(1)
        .filter(|lemma| !lemma.is_empty())
        .map(str::to_string)
        .ok_or(MissKind::Lemma)
}

/// `eng:__ws_1_mouse__Noun__1` → `mouse`
pub fn sense_lemma(key: &str) -> Result<String, MissKind> {
    let parts: Vec<&str> = UNDERSCORE_RUN.split(key).collect();
    let Some(sense) = parts.get(1) else {
        return Err(MissKind::Lemma);
    };
    let sub_parts: Vec<&str> = sense.split('_').collect();
    if sub_parts.len() < 3 {
        return Err(MissKind::Lemma);
    }
    Ok(sub_parts[2..].join("_"))
}
