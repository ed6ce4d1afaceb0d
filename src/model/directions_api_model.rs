use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tracing::debug;

/// Body of a directions API response.
///
/// Only the fields the pipeline reads or persists are modelled; everything is optional
/// because the API drops keys freely depending on the route and the status.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct DirectionsResponse {
    pub status: ApiStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, deserialize_with = "routes_skipping_malformed")]
    pub routes: Vec<Route>,
}

/// A route that doesn't match the model is dropped on its own, its siblings are kept
fn routes_skipping_malformed<'de, D>(deserializer: D) -> Result<Vec<Route>, D::Error>
where
    D: Deserializer<'de>,
{
    let routes = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;

    Ok(routes
        .into_iter()
        .flatten()
        .filter_map(|route| match serde_json::from_value(route) {
            Ok(route) => Some(route),
            Err(e) => {
                debug!("Dropping malformed route: {e}");
                None
            }
        })
        .collect())
}

#[derive(Copy, Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiStatus {
    Ok,
    ZeroResults,
    NotFound,
    InvalidRequest,
    OverQueryLimit,
    OverDailyLimit,
    RequestDenied,
    MaxWaypointsExceeded,
    MaxRouteLengthExceeded,
    UnknownError,
    /// Anything the API adds later
    #[serde(other, rename = "UNRECOGNIZED_STATUS")]
    Unrecognized,
}

impl ApiStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, ApiStatus::Ok)
    }
}

impl fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ApiStatus::Ok => "OK",
            ApiStatus::ZeroResults => "ZERO_RESULTS",
            ApiStatus::NotFound => "NOT_FOUND",
            ApiStatus::InvalidRequest => "INVALID_REQUEST",
            ApiStatus::OverQueryLimit => "OVER_QUERY_LIMIT",
            ApiStatus::OverDailyLimit => "OVER_DAILY_LIMIT",
            ApiStatus::RequestDenied => "REQUEST_DENIED",
            ApiStatus::MaxWaypointsExceeded => "MAX_WAYPOINTS_EXCEEDED",
            ApiStatus::MaxRouteLengthExceeded => "MAX_ROUTE_LENGTH_EXCEEDED",
            ApiStatus::UnknownError => "UNKNOWN_ERROR",
            ApiStatus::Unrecognized => "UNRECOGNIZED_STATUS",
        };
        f.write_str(text)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Route {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub legs: Vec<Leg>,
}

impl Route {
    /// Trip duration in seconds, read from the first leg.
    /// `None` when the route has no legs or the first leg has no duration.
    pub fn trip_duration_secs(&self) -> Option<u64> {
        Some(self.legs.first()?.duration.as_ref()?.value)
    }

    /// Steps of the first leg. Transit routes always have exactly one leg.
    pub fn steps(&self) -> &[Step] {
        self.legs.first().map(|l| l.steps.as_slice()).unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Leg {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<TextValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<TextValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<TimeText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<TimeText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_address: Option<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// `{ "text": "21 mins", "value": 1260 }`
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct TextValue {
    #[serde(default)]
    pub text: String,
    pub value: u64,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct TimeText {
    #[serde(default)]
    pub text: String,
    /// Unix seconds
    pub value: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Step {
    /// Already HTML, as sent by the API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<TextValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<TextValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transit_details: Option<TransitDetails>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct TransitDetails {
    #[serde(default)]
    pub line: TransitLine,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headsign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_stops: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_stop: Option<TransitStop>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_stop: Option<TransitStop>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct TransitLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<Vehicle>,
}

impl TransitLine {
    /// Short name when there is one, otherwise the full name
    pub fn label(&self) -> &str {
        self.short_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Vehicle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct TransitStop {
    #[serde(default)]
    pub name: String,
}

/// The `mode` query parameter
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TravelMode {
    Transit,
    Bicycling,
}

impl TravelMode {
    pub fn as_query_value(&self) -> &'static str {
        match self {
            TravelMode::Transit => "transit",
            TravelMode::Bicycling => "bicycling",
        }
    }

    /// Label used in map layer names
    pub fn layer_label(&self) -> &'static str {
        match self {
            TravelMode::Transit => "train",
            TravelMode::Bicycling => "bike",
        }
    }
}

/// One entry of the pipe separated `transit_mode` query parameter
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransitMode {
    Bus,
    Subway,
    Train,
    Tram,
    Rail,
}

impl TransitMode {
    pub fn as_query_value(&self) -> &'static str {
        match self {
            TransitMode::Bus => "bus",
            TransitMode::Subway => "subway",
            TransitMode::Train => "train",
            TransitMode::Tram => "tram",
            TransitMode::Rail => "rail",
        }
    }
}
