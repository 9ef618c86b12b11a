//! # home-feeds
//!
//! Async clients for the third-party services behind the home dashboard:
//!
//! - current weather by city or coordinates ([`FeedClient::weather`])
//! - RSS feeds through an RSS-to-JSON converter ([`FeedClient::rss_items`])
//! - upcoming events of a shared calendar ([`FeedClient::calendar_events`])
//! - approximate position by IP ([`FeedClient::locate`])
//!
//! Every call is a single outbound read. Failures surface as [`FeedError`];
//! nothing is retried here.
//!
//! ## Example
//!
//! ```rust,ignore
//! use home_feeds::FeedClient;
//!
//! let client = FeedClient::with_defaults()?;
//! let report = client.weather("Sakata").await?;
//! println!("{}°C {}", report.temperature_c, report.description);
//! ```

pub mod calendar;
pub mod client;
pub mod error;
pub mod locate;
pub mod rss;
pub mod weather;

pub use calendar::{CalendarCredentials, CalendarEvent, EventStart};
pub use client::{Endpoints, FeedClient};
pub use error::FeedError;
pub use locate::GeoPoint;
pub use rss::FeedItem;
pub use weather::WeatherReport;

/// Loopback HTTP stubs for exercising the clients without the network.
///
/// Built for this crate's tests and, with the `test-util` feature, for the
/// tests of crates that depend on it.
#[cfg(any(test, feature = "test-util"))]
pub mod testing {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serves exactly one response, returning the base URL and a handle
    /// resolving to the raw request head.
    pub async fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind stub listener");
        let addr = listener.local_addr().expect("stub has no local addr");
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("stub accept failed");
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap_or(0);
            let head = String::from_utf8_lossy(&buf[..n]).to_string();
            let response = format!(
                "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
            head
        });
        (format!("http://{addr}"), handle)
    }

    /// Returns a base URL on a port nothing is listening on.
    pub async fn unreachable_base() -> String {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind unused-port listener");
        let addr = listener.local_addr().expect("listener has no local addr");
        drop(listener);
        format!("http://{addr}")
    }
}
