use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

pub const DEFAULT_CODE2: &str = "en";
pub const DEFAULT_CODE3: &str = "eng";

/// The language whose dump is being processed, as 2- and 3-letter codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLang {
    pub code2: String,
    pub code3: String,
}

impl Default for SourceLang {
    fn default() -> Self {
        Self {
            code2: DEFAULT_CODE2.to_string(),
            code3: DEFAULT_CODE3.to_string(),
        }
    }
}

impl SourceLang {
    /// The 2-letter code is the first two characters of the dump's file name;
    /// the 3-letter code comes from the code table. Any failure falls back to
    /// English.
    pub fn resolve(dump_path: &Path, table_path: &Path) -> Self {
        let file_name = dump_path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        let code2: String = file_name.chars().take(2).collect();
        if code2.chars().count() < 2 {
            warn!(
                "cannot take a 2-letter language code from {}, using {DEFAULT_CODE2}",
                dump_path.display()
            );
            return Self::default();
        }
        let table = match fs::read_to_string(table_path) {
            Ok(table) => table,
            Err(e) => {
                error!(
                    "cannot read language code table {}: {e}",
                    table_path.display()
                );
                return Self::default();
            }
        };
        match lookup_code3(&table, &code2) {
            Some(code3) => Self { code2, code3 },
            None => {
                warn!("language code {code2} is not in the code table, using {DEFAULT_CODE3}");
                Self::default()
            }
        }
    }
}

fn lookup_code3(table: &str, code2: &str) -> Option<String> {
    table.lines().find_map(|line| {
        let mut fields = line.split_whitespace();
        (fields.next()? == code2)
            .then(|| fields.next())
            .flatten()
            .map(str::to_string)
    })
}
