//! Outbound HTTP client
//!
//! Every call to a third-party endpoint goes through a client built here so
//! that a hung upstream cannot hold a request task forever.

use std::time::Duration;

/// Build a `reqwest::Client` with connect and overall request timeouts.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(timeout)
        .timeout(timeout)
        .user_agent(concat!("platform/", env!("CARGO_PKG_VERSION")))
        .build()
}
