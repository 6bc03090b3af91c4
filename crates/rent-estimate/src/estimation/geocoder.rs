use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::domain::Coordinate;
use crate::config::GeocoderConfig;

/// Resolves a free-text address to a coordinate.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn locate(&self, address: &str) -> Result<Coordinate, GeocodeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("geocoding service unavailable: {0}")]
    Unavailable(String),
    #[error("no coordinates found for address '{0}'")]
    AddressNotFound(String),
}

/// Kakao Local address search client.
pub struct KakaoGeocoder {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl KakaoGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| GeocodeError::Unavailable(err.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

impl fmt::Debug for KakaoGeocoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KakaoGeocoder")
            .field("endpoint", &self.endpoint)
            .field("has_api_key", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Geocoder for KakaoGeocoder {
    async fn locate(&self, address: &str) -> Result<Coordinate, GeocodeError> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("KAKAO_API_KEY is not configured; refusing to geocode");
            return Err(GeocodeError::Unavailable(
                "geocoder credential is not configured".to_string(),
            ));
        };

        let response = self
            .client
            .get(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, format!("KakaoAK {api_key}"))
            .query(&[("query", address)])
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, "geocode request failed");
                GeocodeError::Unavailable(err.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "geocoder returned an error status");
            return Err(GeocodeError::Unavailable(format!(
                "geocoder returned status {status}"
            )));
        }

        let body: AddressSearchResponse = response
            .json()
            .await
            .map_err(|err| GeocodeError::Unavailable(format!("unreadable response: {err}")))?;

        let coordinate = first_coordinate(address, body)?;
        debug!(
            latitude = coordinate.latitude,
            longitude = coordinate.longitude,
            "address resolved"
        );
        Ok(coordinate)
    }
}

#[derive(Debug, Deserialize)]
struct AddressSearchResponse {
    #[serde(default)]
    documents: Vec<AddressDocument>,
}

/// Kakao reports coordinates as decimal strings: `x` is longitude, `y` latitude.
#[derive(Debug, Deserialize)]
struct AddressDocument {
    x: String,
    y: String,
}

fn first_coordinate(
    address: &str,
    response: AddressSearchResponse,
) -> Result<Coordinate, GeocodeError> {
    let document = response
        .documents
        .into_iter()
        .next()
        .ok_or_else(|| GeocodeError::AddressNotFound(address.to_string()))?;

    let longitude = parse_degrees(&document.x, "x")?;
    let latitude = parse_degrees(&document.y, "y")?;
    Ok(Coordinate::new(latitude, longitude))
}

fn parse_degrees(raw: &str, field: &str) -> Result<f64, GeocodeError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| GeocodeError::Unavailable(format!("invalid '{field}' coordinate '{raw}'")))
}
