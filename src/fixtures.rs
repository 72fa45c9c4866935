//! Seed data for every collection.
//!
//! Fixtures are compiled in from `fixtures/{collection}.json`. When a
//! fixture directory is configured, a file of the same name there replaces
//! the embedded one; missing files fall back to the embedded copy.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::record::Record;

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("no embedded fixture for collection {0}")]
    Unknown(&'static str),
    #[error("failed to read fixture {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed {collection} fixture: {source}")]
    Parse {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("duplicate id {id} in {collection} fixture")]
    DuplicateId { collection: &'static str, id: i64 },
}

fn embedded(collection: &str) -> Option<&'static str> {
    Some(match collection {
        "messages" => include_str!("../fixtures/messages.json"),
        "wins" => include_str!("../fixtures/wins.json"),
        "recommendations" => include_str!("../fixtures/recommendations.json"),
        "tools" => include_str!("../fixtures/tools.json"),
        "scripts" => include_str!("../fixtures/scripts.json"),
        "learning" => include_str!("../fixtures/learning.json"),
        "calendar" => include_str!("../fixtures/calendar.json"),
        "users" => include_str!("../fixtures/users.json"),
        "metrics" => include_str!("../fixtures/metrics.json"),
        _ => return None,
    })
}

/// Load the fixture for `T`, preferring `{dir}/{collection}.json`.
///
/// # Errors
///
/// Returns `FixtureError` when an override cannot be read, the JSON does not
/// match the record schema, or two records share an id.
pub fn load<T: Record>(dir: Option<&Path>) -> Result<Vec<T>, FixtureError> {
    let override_path = dir
        .map(|dir| dir.join(format!("{}.json", T::COLLECTION)))
        .filter(|path| path.is_file());

    let text = match override_path {
        Some(path) => {
            tracing::info!(collection = T::COLLECTION, path = %path.display(), "loading fixture override");
            std::fs::read_to_string(&path).map_err(|source| FixtureError::Read { path, source })?
        }
        None => embedded(T::COLLECTION)
            .ok_or(FixtureError::Unknown(T::COLLECTION))?
            .to_owned(),
    };

    parse(&text)
}

fn parse<T: Record>(text: &str) -> Result<Vec<T>, FixtureError> {
    let records: Vec<T> =
        serde_json::from_str(text).map_err(|source| FixtureError::Parse { collection: T::COLLECTION, source })?;

    let mut seen = HashSet::new();
    if let Some(dup) = records.iter().find(|record| !seen.insert(record.id())) {
        return Err(FixtureError::DuplicateId { collection: T::COLLECTION, id: dup.id() });
    }
    Ok(records)
}

#[cfg(test)]
#[path = "fixtures_test.rs"]
mod tests;
