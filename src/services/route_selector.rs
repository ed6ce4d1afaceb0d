use crate::model::route_candidate::RouteCandidate;

/// Picks the fastest candidate. On ties the first one wins.
pub fn select_best<I>(candidates: I) -> Option<RouteCandidate>
where
    I: IntoIterator<Item = RouteCandidate>,
{
    candidates.into_iter().min_by_key(RouteCandidate::duration_secs)
}
