//! Talks to the directions API
use std::future::Future;

use itertools::Itertools;
use reqwest::Client;
use tracing::{Instrument, info_span};

use crate::{
    config::ApiKey,
    model::{
        coordinate::Coordinate,
        directions_api_model::{DirectionsResponse, TransitMode, TravelMode},
    },
};

pub const DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";

/// One directions query: a single origin, a single destination and at most one departure time
#[derive(Clone, Debug, PartialEq)]
pub struct DirectionsRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub travel_mode: TravelMode,
    pub transit_modes: Vec<TransitMode>,
    /// Unix seconds
    pub departure_time: Option<i64>,
}

impl DirectionsRequest {
    /// Query parameters without the credential
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("origin", self.origin.to_query_value()),
            ("destination", self.destination.to_query_value()),
            ("mode", self.travel_mode.as_query_value().to_string()),
        ];

        if self.travel_mode == TravelMode::Transit && !self.transit_modes.is_empty() {
            pairs.push((
                "transit_mode",
                self.transit_modes
                    .iter()
                    .map(TransitMode::as_query_value)
                    .join("|"),
            ));
        }

        if let Some(departure_time) = self.departure_time {
            pairs.push(("departure_time", departure_time.to_string()));
        }

        pairs
    }
}

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("error requesting directions: {0}")]
    HttpRequestError(#[from] reqwest::Error),

    #[error("error parsing the directions response: {source}\n{body}")]
    ParsingError {
        source: serde_json::Error,
        body: String,
    },
}

/// Anything that answers directions queries.
/// The batch shares one provider between all of its tasks.
pub trait DirectionsProvider: Send + Sync + 'static {
    fn directions(
        &self,
        request: &DirectionsRequest,
    ) -> impl Future<Output = Result<DirectionsResponse, FetchError>> + Send;
}

pub struct GoogleDirectionsClient {
    client: Client,
    api_key: ApiKey,
    base_url: String,
}

impl GoogleDirectionsClient {
    pub fn new(api_key: ApiKey) -> Self {
        Self::with_base_url(api_key, DIRECTIONS_URL)
    }

    pub fn with_base_url(api_key: ApiKey, base_url: &str) -> Self {
        GoogleDirectionsClient {
            client: Client::new(),
            api_key,
            base_url: base_url.to_string(),
        }
    }
}

impl DirectionsProvider for GoogleDirectionsClient {
    fn directions(
        &self,
        request: &DirectionsRequest,
    ) -> impl Future<Output = Result<DirectionsResponse, FetchError>> + Send {
        let mut query = request.query_pairs();
        query.push(("key", self.api_key.expose().to_string()));

        async move {
            let response = self
                .client
                .get(&self.base_url)
                .query(&query)
                .send()
                .instrument(info_span!("Fetching directions"))
                .await?
                .error_for_status()?;

            let body = response
                .text()
                .instrument(info_span!("Reading body of response"))
                .await?;

            serde_json::from_str(&body).map_err(|source| FetchError::ParsingError { source, body })
        }
    }
}
