use serde::{Deserialize, Serialize};

use super::{
    coordinate::Coordinate,
    directions_api_model::{ApiStatus, Route},
    route_candidate::RouteCandidate,
};

/// One entry of a result document
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct OriginResult {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub response: RouteResponse,
}

impl OriginResult {
    pub fn new(
        origin: Coordinate,
        destination: Coordinate,
        status: ApiStatus,
        best: Option<RouteCandidate>,
    ) -> Self {
        OriginResult {
            origin,
            destination,
            response: RouteResponse::new(status, best),
        }
    }

    /// Travel time of the stored route in minutes
    pub fn duration_minutes(&self) -> Option<f64> {
        let secs = self.response.best_route()?.trip_duration_secs()?;
        Some(secs as f64 / 60.0)
    }
}

/// The persisted, already reduced, API response.
///
/// `routes` never holds more than the single best route.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RouteResponse {
    pub status: ApiStatus,
    #[serde(default)]
    routes: Vec<Route>,
}

impl RouteResponse {
    pub fn new(status: ApiStatus, best: Option<RouteCandidate>) -> Self {
        RouteResponse {
            status,
            routes: best.map(RouteCandidate::into_route).into_iter().collect(),
        }
    }

    pub fn best_route(&self) -> Option<&Route> {
        self.routes.first()
    }
}
