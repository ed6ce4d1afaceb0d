//! In-memory directions provider for tests
use std::{collections::HashMap, future::Future, sync::Mutex};

use serde_json::json;

use super::directions_client::{DirectionsProvider, DirectionsRequest, FetchError};
use crate::model::{coordinate::Coordinate, directions_api_model::DirectionsResponse};

/// Answers by departure time, falling back to `default` for unknown times
pub struct ScriptedProvider {
    by_departure: HashMap<Option<i64>, DirectionsResponse>,
    default: DirectionsResponse,
    failing: Vec<Coordinate>,
    requests: Mutex<Vec<DirectionsRequest>>,
}

impl ScriptedProvider {
    pub fn new(default: DirectionsResponse) -> Self {
        ScriptedProvider {
            by_departure: HashMap::new(),
            default,
            failing: vec![],
            requests: Mutex::new(vec![]),
        }
    }

    pub fn at(mut self, departure_time: i64, response: DirectionsResponse) -> Self {
        self.by_departure.insert(Some(departure_time), response);
        self
    }

    /// Requests from `origin` fail as if the body couldn't be parsed
    pub fn failing_for(mut self, origin: Coordinate) -> Self {
        self.failing.push(origin);
        self
    }

    pub fn requests(&self) -> Vec<DirectionsRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl DirectionsProvider for ScriptedProvider {
    fn directions(
        &self,
        request: &DirectionsRequest,
    ) -> impl Future<Output = Result<DirectionsResponse, FetchError>> + Send {
        self.requests.lock().unwrap().push(request.clone());

        let response = if self.failing.contains(&request.origin) {
            Err(parsing_error())
        } else {
            Ok(self
                .by_departure
                .get(&request.departure_time)
                .unwrap_or(&self.default)
                .clone())
        };

        async move { response }
    }
}

/// An OK response whose routes take the given number of seconds
pub fn ok_response(durations: &[u64]) -> DirectionsResponse {
    let routes = durations
        .iter()
        .map(|secs| {
            json!({
                "summary": format!("{secs}s"),
                "legs": [{
                    "duration": { "text": format!("{} mins", secs / 60), "value": secs },
                    "steps": [
                        { "html_instructions": "Walk to <b>Marienplatz</b>", "travel_mode": "WALKING" },
                        {
                            "html_instructions": "Subway towards Fürstenried West",
                            "travel_mode": "TRANSIT",
                            "transit_details": {
                                "headsign": "Fürstenried West",
                                "line": { "short_name": "U3", "name": "U-Bahn" }
                            }
                        }
                    ]
                }]
            })
        })
        .collect::<Vec<_>>();

    serde_json::from_value(json!({ "status": "OK", "routes": routes })).unwrap()
}

pub fn status_response(status: &str) -> DirectionsResponse {
    serde_json::from_value(json!({ "status": status, "routes": [] })).unwrap()
}

pub fn parsing_error() -> FetchError {
    let source = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();

    FetchError::ParsingError {
        source,
        body: "<html>".to_string(),
    }
}
