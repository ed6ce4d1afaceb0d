pub mod coordinate;
pub mod directions_api_model;
pub mod result_model;
pub mod route_candidate;
