//! Shared test helpers: loopback HTTP stubs and client builders.

use std::time::Duration;

use home_feeds::{Endpoints, FeedClient};

pub use home_feeds::testing::{serve_once, unreachable_base};

/// Client sending every request to `base`.
pub fn client_at(base: &str) -> FeedClient {
    client_with(Endpoints::all_at(base))
}

/// Client with explicit endpoints and a short timeout.
pub fn client_with(endpoints: Endpoints) -> FeedClient {
    FeedClient::new(endpoints, Duration::from_secs(5)).expect("client builds")
}
