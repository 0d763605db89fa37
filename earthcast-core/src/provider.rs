use crate::{error::FetchError, model::ForecastBundle};
use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::{convert::TryFrom, fmt::Debug};

pub mod geocoding;
pub mod openmeteo;

/// The remote services the app talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointId {
    Geocoding,
    Reverse,
    Forecast,
}

impl EndpointId {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointId::Geocoding => "geocoding",
            EndpointId::Reverse => "reverse",
            EndpointId::Forecast => "forecast",
        }
    }

    pub fn default_url(&self) -> &'static str {
        match self {
            EndpointId::Geocoding => "https://geocoding-api.open-meteo.com/v1/search",
            EndpointId::Reverse => "https://nominatim.openstreetmap.org/reverse",
            EndpointId::Forecast => "https://api.open-meteo.com/v1/forecast",
        }
    }

    pub const fn all() -> &'static [EndpointId] {
        &[EndpointId::Geocoding, EndpointId::Reverse, EndpointId::Forecast]
    }
}

impl std::fmt::Display for EndpointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for EndpointId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "geocoding" => Ok(EndpointId::Geocoding),
            "reverse" => Ok(EndpointId::Reverse),
            "forecast" => Ok(EndpointId::Forecast),
            _ => Err(anyhow::anyhow!(
                "Unknown endpoint '{value}'. Supported endpoints: geocoding, reverse, forecast."
            )),
        }
    }
}

/// Anything that can turn coordinates into a forecast.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn forecast(&self, latitude: f64, longitude: f64) -> Option<ForecastBundle>;
}

/// Send a request and decode a JSON body, mapping each failure to its [`FetchError`] kind.
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: RequestBuilder,
    service: &'static str,
) -> Result<T, FetchError> {
    let res = request
        .send()
        .await
        .map_err(|source| FetchError::Network { service, source })?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|source| FetchError::Network { service, source })?;

    if !status.is_success() {
        return Err(FetchError::HttpStatus {
            service,
            status: status.as_u16(),
            body: truncate_body(&body),
        });
    }

    tracing::debug!(service, body = %truncate_body(&body), "response received");

    serde_json::from_str(&body).map_err(|e| FetchError::malformed(service, e.to_string()))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
