use crate::{
    align::AlignmentTable,
    defgroups::{DefGroups, Definitions, LemmaLists},
    error::CacheError,
    wordnet::SynsetGroups,
};

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
    time::Instant,
};

use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use indicatif::HumanDuration;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Bumped whenever a cached type changes shape.
pub const FORMAT_VERSION: u32 = 1;

const TRANSLATIONS_FILE: &str = "wk-translations.json.gz";
const SYNONYMS_FILE: &str = "wk-synonyms.json.gz";
const SYNSET_LEMMAS_FILE: &str = "wn-lemmas.json.gz";
const DEFINITIONS_FILE: &str = "wk-definitions.json.gz";

#[derive(Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
enum PayloadRef<'a> {
    Translations(&'a LemmaLists),
    Synonyms(&'a LemmaLists),
    SynsetLemmas(&'a SynsetGroups),
    Definitions(&'a Definitions),
    Alignments(&'a AlignmentTable),
}

#[derive(Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
enum Payload {
    Translations(LemmaLists),
    Synonyms(LemmaLists),
    SynsetLemmas(SynsetGroups),
    Definitions(Definitions),
    Alignments(AlignmentTable),
}

#[derive(Serialize)]
struct CacheFileRef<'a> {
    format_version: u32,
    payload: PayloadRef<'a>,
}

#[derive(Deserialize)]
struct CacheFile {
    format_version: u32,
    payload: Value,
}

impl Payload {
    fn kind(&self) -> &'static str {
        match self {
            Payload::Translations(_) => "translations",
            Payload::Synonyms(_) => "synonyms",
            Payload::SynsetLemmas(_) => "synset_lemmas",
            Payload::Definitions(_) => "definitions",
            Payload::Alignments(_) => "alignments",
        }
    }
}

fn write(path: &Path, payload: PayloadRef) -> Result<(), CacheError> {
    let t = Instant::now();
    info!("Writing cache {}...", path.display());
    let writer = BufWriter::new(File::create(path)?);
    let should_gz_compress = path.extension().map_or(false, |ext| ext == "gz");
    let cache_file = CacheFileRef {
        format_version: FORMAT_VERSION,
        payload,
    };
    let mut writer = if should_gz_compress {
        let mut encoder = GzEncoder::new(writer, Compression::fast());
        serde_json::to_writer(&mut encoder, &cache_file)?;
        // the gzip trailer is only written by finish
        encoder.finish()?
    } else {
        let mut writer = writer;
        serde_json::to_writer(&mut writer, &cache_file)?;
        writer
    };
    writer.flush()?;
    info!("Finished. Took {}.", HumanDuration(t.elapsed()));
    Ok(())
}

fn read<T>(
    path: &Path,
    expected: &'static str,
    pick: fn(Payload) -> Option<T>,
) -> Result<T, CacheError> {
    let t = Instant::now();
    info!("Reading cache {}...", path.display());
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let is_gz_compressed = path.extension().map_or(false, |ext| ext == "gz");
    let uncompressed: Box<dyn Read> = if is_gz_compressed {
        Box::new(GzDecoder::new(reader))
    } else {
        Box::new(reader)
    };
    // the version is checked before the payload is given a shape
    let cache_file: CacheFile = serde_json::from_reader(uncompressed)?;
    if cache_file.format_version != FORMAT_VERSION {
        return Err(CacheError::Version {
            path: path.to_path_buf(),
            found: cache_file.format_version,
            expected: FORMAT_VERSION,
        });
    }
    let payload: Payload = serde_json::from_value(cache_file.payload)?;
    let found = payload.kind();
    let data = pick(payload).ok_or_else(|| CacheError::Kind {
        path: path.to_path_buf(),
        found,
        expected,
    })?;
    info!("Finished. Took {}.", HumanDuration(t.elapsed()));
    Ok(data)
}

/// The intermediate dictionaries of a run, kept as versioned gzipped JSON
/// files in one directory.
#[derive(Debug, Clone)]
pub struct Cache {
    dir: PathBuf,
}

impl Cache {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    fn path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    fn alignments_path(&self, name: &str) -> PathBuf {
        self.path(&format!("align-{name}.json.gz"))
    }

    pub fn save_def_groups(&self, groups: &DefGroups) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;
        write(
            &self.path(TRANSLATIONS_FILE),
            PayloadRef::Translations(&groups.translations),
        )?;
        write(
            &self.path(SYNONYMS_FILE),
            PayloadRef::Synonyms(&groups.synonyms),
        )?;
        write(
            &self.path(DEFINITIONS_FILE),
            PayloadRef::Definitions(&groups.definitions),
        )
    }

    pub fn load_def_groups(&self) -> Result<DefGroups, CacheError> {
        let translations = read(&self.path(TRANSLATIONS_FILE), "translations", |p| match p {
            Payload::Translations(data) => Some(data),
            _ => None,
        })?;
        let synonyms = read(&self.path(SYNONYMS_FILE), "synonyms", |p| match p {
            Payload::Synonyms(data) => Some(data),
            _ => None,
        })?;
        let definitions = read(&self.path(DEFINITIONS_FILE), "definitions", |p| match p {
            Payload::Definitions(data) => Some(data),
            _ => None,
        })?;
        Ok(DefGroups {
            translations,
            synonyms,
            definitions,
        })
    }

    pub fn save_synsets(&self, synsets: &SynsetGroups) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;
        write(
            &self.path(SYNSET_LEMMAS_FILE),
            PayloadRef::SynsetLemmas(synsets),
        )
    }

    pub fn load_synsets(&self) -> Result<SynsetGroups, CacheError> {
        read(&self.path(SYNSET_LEMMAS_FILE), "synset_lemmas", |p| match p {
            Payload::SynsetLemmas(data) => Some(data),
            _ => None,
        })
    }

    /// `name` is a short part of speech, or `all` for the combined table.
    pub fn save_alignments(&self, name: &str, table: &AlignmentTable) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;
        write(&self.alignments_path(name), PayloadRef::Alignments(table))
    }

    pub fn load_alignments(&self, name: &str) -> Result<AlignmentTable, CacheError> {
        read(&self.alignments_path(name), "alignments", |p| match p {
            Payload::Alignments(data) => Some(data),
            _ => None,
        })
    }
}
