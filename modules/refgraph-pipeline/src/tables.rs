//! CSV interfaces: the raw input table and the four persisted relations.

use std::fs;
use std::path::Path;

use serde::Serialize;

use refgraph_common::{reference_type_rows, RawReference, RefGraphError};

use crate::normalize::NormalizedTables;

pub const EPISODES_FILE: &str = "episodes.csv";
pub const EPISODE_REFERENCES_FILE: &str = "episode_references.csv";
pub const EXTERNAL_REFERENCES_FILE: &str = "external_references.csv";
pub const REFERENCE_TYPES_FILE: &str = "reference_types.csv";

/// Read the raw `(episode, reference)` table.
pub fn read_raw(path: impl AsRef<Path>) -> Result<Vec<RawReference>, RefGraphError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

fn write_records<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), RefGraphError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the three normalized relations plus the seeded reference type
/// table under `data_dir`. Row order is already deterministic, so repeated
/// runs on the same input produce byte-identical files.
pub fn write_all(data_dir: impl AsRef<Path>, tables: &NormalizedTables) -> Result<(), RefGraphError> {
    let dir = data_dir.as_ref();
    fs::create_dir_all(dir)?;
    write_records(&dir.join(EPISODES_FILE), &tables.episodes)?;
    write_records(&dir.join(EPISODE_REFERENCES_FILE), &tables.episode_references)?;
    write_records(&dir.join(EXTERNAL_REFERENCES_FILE), &tables.external_references)?;
    write_records(&dir.join(REFERENCE_TYPES_FILE), &reference_type_rows())?;
    Ok(())
}
