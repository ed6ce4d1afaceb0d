use std::{fs, io, path::Path};

use tracing::info;

use crate::model::result_model::OriginResult;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("error accessing result document {path}: {source}")]
    Io { path: String, source: io::Error },

    #[error("error parsing result document {path}: {source}")]
    Parsing {
        path: String,
        source: serde_json::Error,
    },

    #[error("error serializing results: {0}")]
    Serializing(#[from] serde_json::Error),
}

impl ResultsError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResultsError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// Replaces the document at `path` with `results`.
/// Written to a sibling temp file first so a crash never leaves half a document behind.
#[tracing::instrument(err, skip(results), fields(count = results.len()))]
pub fn write_results(path: &Path, results: &[OriginResult]) -> Result<(), ResultsError> {
    let json = serde_json::to_string_pretty(results)?;

    let mut tmp_path = path.as_os_str().to_owned();
    tmp_path.push(".tmp");

    let io_err = |source| ResultsError::Io {
        path: path.display().to_string(),
        source,
    };
    fs::write(&tmp_path, json).map_err(io_err)?;
    fs::rename(&tmp_path, path).map_err(io_err)?;

    info!("Saved {} results to {}", results.len(), path.display());

    Ok(())
}

pub fn read_results(path: &Path) -> Result<Vec<OriginResult>, ResultsError> {
    let json = fs::read_to_string(path).map_err(|source| ResultsError::Io {
        path: path.display().to_string(),
        source,
    })?;

    serde_json::from_str(&json).map_err(|source| ResultsError::Parsing {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        coordinate::Coordinate,
        directions_api_model::{
            ApiStatus, Leg, Route, Step, TextValue, TransitDetails, TransitLine,
        },
        route_candidate::RouteCandidate,
    };
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{}_{}_{name}", env!("CARGO_PKG_NAME"), std::process::id()))
    }

    fn sample_results() -> Result<Vec<OriginResult>, anyhow::Error> {
        let destination = Coordinate::new(48.35389065534375, 11.786086141168415)?;
        let route = Route {
            summary: None,
            legs: vec![Leg {
                duration: Some(TextValue {
                    text: "38 mins".to_string(),
                    value: 2280,
                }),
                steps: vec![Step {
                    html_instructions: Some("S-Bahn Richtung Flughafen München".to_string()),
                    travel_mode: Some("TRANSIT".to_string()),
                    transit_details: Some(TransitDetails {
                        line: TransitLine {
                            short_name: Some("S8".to_string()),
                            ..Default::default()
                        },
                        headsign: Some("Flughafen München".to_string()),
                        ..Default::default()
                    }),
                    ..Default::default()
                }],
                ..Default::default()
            }],
        };

        Ok(vec![
            OriginResult::new(
                Coordinate::new(48.1, 11.5)?,
                destination,
                ApiStatus::Ok,
                RouteCandidate::validate(route),
            ),
            OriginResult::new(
                Coordinate::new(48.2, 11.6)?,
                destination,
                ApiStatus::ZeroResults,
                None,
            ),
        ])
    }

    #[test]
    fn written_documents_read_back_identically() -> Result<(), anyhow::Error> {
        let path = temp_path("round_trip.json");
        let results = sample_results()?;

        write_results(&path, &results)?;
        let read_back = read_results(&path)?;
        fs::remove_file(&path)?;

        assert_eq!(read_back, results);

        Ok(())
    }

    #[test]
    fn overwrites_the_previous_document() -> Result<(), anyhow::Error> {
        let path = temp_path("overwrite.json");
        let results = sample_results()?;

        write_results(&path, &results)?;
        write_results(&path, &results[1..])?;
        let read_back = read_results(&path)?;
        fs::remove_file(&path)?;

        assert_eq!(read_back, results[1..].to_vec());

        Ok(())
    }

    #[test]
    fn document_is_indented_utf8() -> Result<(), anyhow::Error> {
        let path = temp_path("pretty.json");

        write_results(&path, &sample_results()?)?;
        let text = fs::read_to_string(&path)?;
        fs::remove_file(&path)?;

        assert!(text.starts_with("[\n  {"));
        assert!(text.contains("Flughafen München"));

        Ok(())
    }

    #[test]
    fn missing_document_is_reported_as_not_found() {
        let err = read_results(Path::new("/definitely/not/here.json"));

        assert!(err.is_err_and(|e| e.is_not_found()));
    }
}
