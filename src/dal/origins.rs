use std::{fs::File, io::Read, path::Path};

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info};

use crate::model::coordinate::Coordinate;

#[derive(thiserror::Error, Debug)]
pub enum OriginLoadError {
    #[error("error opening the origin table {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    #[error("error reading the origin table: {0}")]
    Read(#[from] csv::Error),
}

/// Loads origins from a CSV file: latitude in the first column, longitude in the second.
/// Rows that don't hold two numbers in range are skipped.
#[tracing::instrument(err)]
pub fn load_origins(path: &Path, has_headers: bool) -> Result<Vec<Coordinate>, OriginLoadError> {
    let file = File::open(path).map_err(|source| OriginLoadError::Open {
        path: path.display().to_string(),
        source,
    })?;

    let origins = read_origins(file, has_headers)?;

    info!("Loaded {} origins from {}", origins.len(), path.display());

    Ok(origins)
}

pub fn read_origins<R: Read>(reader: R, has_headers: bool) -> Result<Vec<Coordinate>, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut origins = vec![];

    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e),
            Err(e) => {
                debug!("skipping malformed row: {e}");
                continue;
            }
        };

        if let Some(origin) = coordinate_from_record(&record) {
            origins.push(origin);
        }
    }

    Ok(origins)
}

fn coordinate_from_record(record: &StringRecord) -> Option<Coordinate> {
    let latitude: f64 = record.get(0)?.parse().ok()?;
    let longitude: f64 = record.get(1)?.parse().ok()?;

    Coordinate::new(latitude, longitude).ok()
}
