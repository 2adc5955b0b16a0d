//! Best-effort ISP/city lookup.
//!
//! The original kiosks called a third-party geolocation endpoint to type a
//! "we even know your connection" line. Strictly cosmetic: short timeout,
//! any failure resolves to `None`, never surfaces to the visitor.

use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const GEO_ENDPOINT: &str = "https://ipapi.co/json/";
const GEO_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Deserialize, Debug, Default)]
struct GeoReply {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    org: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeoClient {
    http: reqwest::Client,
}

impl GeoClient {
    /// `None` when the HTTP client cannot be built (no TLS backend etc.) —
    /// the prober then simply skips the location line.
    pub fn new() -> Option<Self> {
        reqwest::Client::builder()
            .timeout(GEO_TIMEOUT)
            .build()
            .ok()
            .map(|http| GeoClient { http })
    }

    /// "City · ISP" when the endpoint answered with at least one of the two,
    /// `None` otherwise.
    pub async fn location_hint(&self) -> Option<String> {
        let reply: GeoReply = self
            .http
            .get(GEO_ENDPOINT)
            .send()
            .await
            .ok()?
            .json()
            .await
            .ok()?;
        debug!("geo: reply city={:?} org={:?}", reply.city, reply.org);

        let city = reply.city.filter(|c| !c.trim().is_empty());
        let org = reply.org.filter(|o| !o.trim().is_empty());
        match (city, org) {
            (Some(c), Some(o)) => Some(format!("{c} · {o}")),
            (Some(c), None) => Some(c),
            (None, Some(o)) => Some(o),
            (None, None) => None,
        }
    }
}
