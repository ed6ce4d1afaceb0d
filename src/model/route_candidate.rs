use super::directions_api_model::Route;

/// A route that passed validation: it has a first leg with a known duration.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteCandidate {
    duration_secs: u64,
    route: Route,
}

impl RouteCandidate {
    /// Returns `None` for routes lacking `legs` or `legs[0].duration`
    pub fn validate(route: Route) -> Option<Self> {
        let duration_secs = route.trip_duration_secs()?;

        Some(RouteCandidate {
            duration_secs,
            route,
        })
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn into_route(self) -> Route {
        self.route
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::directions_api_model::{Leg, TextValue};

    #[test]
    fn keeps_the_first_leg_duration() {
        let route = Route {
            legs: vec![Leg {
                duration: Some(TextValue {
                    text: "15 mins".to_string(),
                    value: 900,
                }),
                ..Default::default()
            }],
            ..Default::default()
        };

        let candidate = RouteCandidate::validate(route.clone());

        assert_eq!(candidate.as_ref().map(|c| c.duration_secs()), Some(900));
        assert_eq!(candidate.map(|c| c.into_route()), Some(route));
    }

    #[test]
    fn drops_routes_without_duration() {
        assert!(RouteCandidate::validate(Route::default()).is_none());
    }
}
