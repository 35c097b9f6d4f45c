use crate::core::ReverseGeocoder;
use crate::domain::model::Coordinates;
use crate::utils::error::{Result, ShuttleError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_GEOCODER_ENDPOINT: &str = "https://nominatim.openstreetmap.org/reverse";
pub const DEFAULT_USER_AGENT: &str = concat!("shuttle-finder/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
    address: Option<serde_json::Map<String, serde_json::Value>>,
    error: Option<String>,
}

/// Nominatim 相容的反向地理編碼服務
pub struct HttpReverseGeocoder {
    endpoint: String,
    client: Client,
}

impl HttpReverseGeocoder {
    pub fn new(endpoint: String, user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { endpoint, client })
    }
}

#[async_trait]
impl ReverseGeocoder for HttpReverseGeocoder {
    async fn reverse(&self, coords: Coordinates) -> Result<Option<String>> {
        tracing::debug!("Reverse geocoding {} via {}", coords, self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShuttleError::GeocodingError {
                message: format!("service responded with HTTP {}", status),
            });
        }

        let body: ReverseResponse =
            response
                .json()
                .await
                .map_err(|e| ShuttleError::GeocodingError {
                    message: format!("unexpected response body: {}", e),
                })?;

        if let Some(error) = body.error {
            tracing::debug!("Geocoder returned no result: {}", error);
            return Ok(None);
        }

        if let Some(name) = body.display_name.filter(|n| !n.trim().is_empty()) {
            return Ok(Some(name));
        }

        // 沒有 display_name 時以地址欄位拼接
        let joined = body.address.as_ref().and_then(join_address_parts);

        Ok(joined)
    }
}

/// 依固定順序組合地址欄位；country_code 與 ISO3166-* 不列入
fn join_address_parts(address: &serde_json::Map<String, serde_json::Value>) -> Option<String> {
    let field = move |key: &str| {
        address
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let street = [field("house_number"), field("road")]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    let locality = ["city", "town", "village", "hamlet"]
        .into_iter()
        .find_map(|key| field(key));

    let parts: Vec<&str> = [
        Some(street.as_str()).filter(|s| !s.is_empty()),
        field("suburb"),
        locality,
        field("state"),
        field("postcode"),
        field("country"),
    ]
    .into_iter()
    .flatten()
    .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

pub struct DisabledGeocoder;

#[async_trait]
impl ReverseGeocoder for DisabledGeocoder {
    async fn reverse(&self, _coords: Coordinates) -> Result<Option<String>> {
        Ok(None)
    }
}
