pub mod batch;
pub mod directions_client;
pub mod fetch_job;
pub mod rate_limiter;
pub mod route_fetcher;
pub mod route_selector;

#[cfg(test)]
mod test_support;
