//! Fetches the best route from one origin to one target
use itertools::Itertools;
use tracing::debug;

use super::{
    directions_client::{DirectionsProvider, DirectionsRequest, FetchError},
    route_selector::select_best,
};
use crate::{
    config::{DepartureSchedule, FetchJob},
    model::{
        coordinate::Coordinate, directions_api_model::ApiStatus, result_model::OriginResult,
        route_candidate::RouteCandidate,
    },
};

/// The reduced answer for one origin: the API status and the best valid route, if any
#[derive(Debug)]
pub struct FetchedRoute {
    pub status: ApiStatus,
    pub best: Option<RouteCandidate>,
}

/// Runs the job's query for a single origin.
/// Non-OK statuses end up in the result, only transport failures are errors.
pub async fn fetch_origin<P: DirectionsProvider>(
    provider: &P,
    job: &FetchJob,
    origin: Coordinate,
) -> Result<OriginResult, FetchError> {
    let request = DirectionsRequest {
        origin,
        destination: job.target.coordinate,
        travel_mode: job.travel_mode,
        transit_modes: job.transit_modes.clone(),
        departure_time: None,
    };

    let fetched = match &job.schedule {
        DepartureSchedule::Now => fetch_single(provider, &request).await?,
        DepartureSchedule::At(departure) => {
            let request = DirectionsRequest {
                departure_time: Some(departure.timestamp()),
                ..request
            };
            fetch_single(provider, &request).await?
        }
        DepartureSchedule::Window(window) => {
            let departures = window.departures().map(|t| t.timestamp()).collect_vec();
            fetch_windowed(provider, &request, &departures).await?
        }
    };

    Ok(OriginResult::new(
        origin,
        job.target.coordinate,
        fetched.status,
        fetched.best,
    ))
}

/// One request, collapsed to the fastest valid alternative
pub async fn fetch_single<P: DirectionsProvider>(
    provider: &P,
    request: &DirectionsRequest,
) -> Result<FetchedRoute, FetchError> {
    let response = provider.directions(request).await?;

    if !response.status.is_ok() {
        debug!(
            status = %response.status,
            error_message = response.error_message.as_deref(),
            "no route from {}",
            request.origin
        );
        return Ok(FetchedRoute {
            status: response.status,
            best: None,
        });
    }

    let best = select_best(
        response
            .routes
            .into_iter()
            .filter_map(RouteCandidate::validate),
    );

    Ok(FetchedRoute {
        status: response.status,
        best,
    })
}

/// Repeats `request` for every departure and keeps the fastest route over all of them.
/// A later departure only replaces the current best when it is strictly faster.
pub async fn fetch_windowed<P: DirectionsProvider>(
    provider: &P,
    request: &DirectionsRequest,
    departures: &[i64],
) -> Result<FetchedRoute, FetchError> {
    let mut best: Option<RouteCandidate> = None;
    let mut last_status = None;

    for &departure_time in departures {
        let request = DirectionsRequest {
            departure_time: Some(departure_time),
            ..request.clone()
        };

        let fetched = fetch_single(provider, &request).await?;

        last_status = Some(fetched.status);
        best = select_best(best.into_iter().chain(fetched.best));
    }

    let status = match (&best, last_status) {
        (Some(_), _) => ApiStatus::Ok,
        (None, Some(status)) => status,
        (None, None) => ApiStatus::ZeroResults,
    };

    Ok(FetchedRoute { status, best })
}
