//! Name-to-code lookup tables stored as CSV files.
//!
//! Every table has a `name,value` header. Names are matched after trimming,
//! ignoring ASCII case. Tables are read from disk on each call so edits to
//! the directory take effect without a restart.

use std::path::{Component, Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::Error;

/// Table of country names to upstream country codes.
pub const COUNTRIES: &str = "countries.csv";

#[derive(thiserror::Error, Debug)]
pub enum LookupError {
    #[error("lookup table '{0}' not found")]
    Missing(String),
    #[error("failed to read lookup table '{table}': {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },
    #[error("invalid lookup table name '{0}'")]
    InvalidName(String),
}

#[derive(Debug, Deserialize)]
struct Entry {
    name: String,
    value: String,
}

/// Directory of lookup tables.
#[derive(Debug, Clone)]
pub struct LookupTables {
    dir: PathBuf,
}

impl LookupTables {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolves `table` inside the tables directory, rejecting absolute paths
    /// and any `..` or root component.
    fn path_of(&self, table: &str) -> Result<PathBuf, LookupError> {
        let relative = Path::new(table);
        let safe = !table.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(LookupError::InvalidName(table.to_string()));
        }
        Ok(self.dir.join(relative))
    }

    /// Deserializes every row of `table`.
    pub fn read_rows<T: DeserializeOwned>(&self, table: &str) -> Result<Vec<T>, LookupError> {
        let path = self.path_of(table)?;
        if !path.is_file() {
            return Err(LookupError::Missing(table.to_string()));
        }
        let csv_error = |source| LookupError::Csv {
            table: table.to_string(),
            source,
        };
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(csv_error)?;
        reader
            .deserialize()
            .collect::<Result<Vec<T>, _>>()
            .map_err(csv_error)
    }

    fn load(&self, table: &str) -> Result<Vec<Entry>, LookupError> {
        self.read_rows(table)
    }

    /// Code for `name` in `table`, or `None` when no row matches.
    pub fn resolve(&self, table: &str, name: &str) -> Result<Option<String>, LookupError> {
        let wanted = name.trim();
        Ok(self
            .load(table)?
            .into_iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(wanted))
            .map(|entry| entry.value))
    }

    /// True if `name` resolves in `table`. A missing or unreadable table
    /// counts as no match.
    pub fn validate(&self, table: &str, name: &str) -> bool {
        match self.resolve(table, name) {
            Ok(found) => found.is_some(),
            Err(e) => {
                tracing::warn!("Validation against {} failed: {}", table, e);
                false
            }
        }
    }

    /// Code for `name` in `table`; an unknown name is [`Error::InvalidInput`]
    /// naming the closest known entry.
    pub fn require(&self, table: &str, name: &str) -> Result<String, Error> {
        let entries = self.load(table)?;
        let wanted = name.trim();
        if let Some(entry) = entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(wanted))
        {
            return Ok(entry.value.clone());
        }

        let label = table.trim_end_matches(".csv").replace('_', " ");
        let message = match closest_match(wanted, entries.iter().map(|e| e.name.as_str())) {
            Some(suggestion) => format!(
                "unknown {} '{}'. Did you mean '{}'?",
                label, wanted, suggestion
            ),
            None => format!("unknown {} '{}'", label, wanted),
        };
        Err(Error::InvalidInput(message))
    }

    /// Every name in `table`, in file order.
    pub fn names(&self, table: &str) -> Result<Vec<String>, LookupError> {
        Ok(self.load(table)?.into_iter().map(|entry| entry.name).collect())
    }
}

fn closest_match<'a>(input: &str, candidates: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let input = input.to_lowercase();
    candidates
        .map(|candidate| (candidate, strsim::jaro_winkler(&input, &candidate.to_lowercase())))
        .filter(|(_, score)| *score >= 0.8)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(candidate, _)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> LookupTables {
        LookupTables::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../tables"))
    }

    #[test]
    fn resolve_known_country() {
        assert_eq!(
            tables().resolve(COUNTRIES, "United Kingdom").unwrap(),
            Some("united-kingdom".to_string())
        );
    }

    #[test]
    fn resolve_unknown_country_is_none() {
        assert_eq!(tables().resolve(COUNTRIES, "Atlantis").unwrap(), None);
    }

    #[test]
    fn resolve_ignores_case_and_padding() {
        assert_eq!(
            tables().resolve(COUNTRIES, "  united states ").unwrap(),
            Some("united-states".to_string())
        );
    }

    #[test]
    fn validate_fails_closed() {
        let tables = tables();
        assert!(tables.validate(COUNTRIES, "Japan"));
        assert!(!tables.validate(COUNTRIES, "Atlantis"));
        assert!(!tables.validate("no_such_table.csv", "Japan"));
    }

    #[test]
    fn require_suggests_closest_name() {
        let err = tables().require(COUNTRIES, "Untied States").unwrap_err();
        match err {
            Error::InvalidInput(msg) => {
                assert!(msg.contains("Did you mean 'United States'?"), "{}", msg)
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn require_missing_table_is_data_not_found() {
        let err = tables().require("no_such_table.csv", "x").unwrap_err();
        assert!(matches!(err, Error::DataNotFound(_)));
    }

    #[test]
    fn names_lists_every_row() {
        let names = tables().names(COUNTRIES).unwrap();
        assert!(names.iter().any(|n| n == "United Kingdom"));
        assert!(names.len() > 10);
    }

    #[test]
    fn names_missing_table_fails() {
        assert!(matches!(
            tables().names("no_such_table.csv"),
            Err(LookupError::Missing(_))
        ));
    }

    #[test]
    fn traversal_is_rejected() {
        let tables = tables();
        for name in ["../Cargo.toml", "/etc/passwd", "", "stocks/../countries.csv"] {
            assert!(
                matches!(tables.names(name), Err(LookupError::InvalidName(_))),
                "{}",
                name
            );
        }
    }
}
