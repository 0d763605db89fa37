use reqwest::{Client, header::USER_AGENT};
use serde::Deserialize;

use crate::{
    config::Config,
    error::FetchError,
    model::City,
    provider::{EndpointId, get_json},
    store::CityRepository,
};

/// Forward geocoding (Open-Meteo) and reverse geocoding (Nominatim).
#[derive(Debug, Clone)]
pub struct GeocodingFetcher {
    http: Client,
    search_url: String,
    reverse_url: String,
    user_agent: String,
}

impl GeocodingFetcher {
    pub fn new(
        search_url: impl Into<String>,
        reverse_url: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            search_url: search_url.into(),
            reverse_url: reverse_url.into(),
            user_agent: user_agent.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.endpoint_url(EndpointId::Geocoding),
            config.endpoint_url(EndpointId::Reverse),
            config.user_agent(),
        )
    }

    /// Best match for `name`, if the provider knows one.
    pub async fn try_search(&self, name: &str) -> Result<Option<City>, FetchError> {
        let request = self
            .http
            .get(&self.search_url)
            .query(&[("name", name), ("count", "1")]);

        let parsed: GeoSearchResponse = get_json(request, "geocoding").await?;

        Ok(parsed
            .results
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(|r| City::new(r.name, r.latitude, r.longitude)))
    }

    /// Look up `name` and persist the best match through `store`.
    ///
    /// Returns the city when it was found and is now in storage. Storing a
    /// name that already exists leaves the stored row untouched.
    pub async fn search_by_name(&self, name: &str, store: &dyn CityRepository) -> Option<City> {
        tracing::debug!("Fetching city: {}", name);

        let city = match self.try_search(name).await {
            Ok(Some(city)) => city,
            Ok(None) => {
                tracing::info!("No geocoding results for '{}'", name);
                return None;
            }
            Err(e) => {
                tracing::warn!("Error fetching city data: {}", e);
                return None;
            }
        };

        match store.insert_or_ignore(&city) {
            Ok(inserted) => {
                tracing::info!(
                    inserted,
                    "Stored city: {} ({}, {})",
                    city.name,
                    city.latitude,
                    city.longitude
                );
                Some(city)
            }
            Err(e) => {
                tracing::warn!("Failed to store city '{}': {:#}", city.name, e);
                None
            }
        }
    }

    pub async fn try_suggest(&self, name: &str) -> Result<Vec<City>, FetchError> {
        let request = self.http.get(&self.search_url).query(&[("name", name)]);
        let parsed: GeoSearchResponse = get_json(request, "geocoding").await?;

        Ok(parsed
            .results
            .unwrap_or_default()
            .into_iter()
            .map(|r| City {
                name: r.name,
                region: r.admin1.unwrap_or_default(),
                latitude: r.latitude,
                longitude: r.longitude,
            })
            .collect())
    }

    /// Every candidate the provider returns for `name`; empty on any failure.
    pub async fn suggest(&self, name: &str) -> Vec<City> {
        self.try_suggest(name).await.unwrap_or_else(|e| {
            tracing::warn!("Error fetching suggestions: {}", e);
            Vec::new()
        })
    }

    pub async fn try_reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<String>, FetchError> {
        let request = self
            .http
            .get(&self.reverse_url)
            .header(USER_AGENT, &self.user_agent)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("format", "json".to_string()),
            ]);

        let parsed: ReverseResponse = get_json(request, "reverse geocoding").await?;

        Ok(parsed
            .address
            .and_then(|addr| addr.city.or(addr.town).or(addr.village).or(addr.hamlet)))
    }

    /// Nearest city/town/village/hamlet name for the coordinates.
    pub async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Option<String> {
        match self.try_reverse_geocode(latitude, longitude).await {
            Ok(place) => place,
            Err(e) => {
                tracing::warn!("Error reverse geocoding: {}", e);
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    name: String,
    admin1: Option<String>,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct GeoSearchResponse {
    results: Option<Vec<GeoResult>>,
}

#[derive(Debug, Deserialize)]
struct ReverseAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    hamlet: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<ReverseAddress>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_response_without_results_key() {
        let parsed: GeoSearchResponse =
            serde_json::from_str(r#"{"generationtime_ms":0.1}"#).unwrap();
        assert!(parsed.results.is_none());
    }

    #[test]
    fn from_config_uses_overrides() {
        let mut cfg = Config::default();
        cfg.set_endpoint_url(EndpointId::Geocoding, "http://local/search".into());

        let fetcher = GeocodingFetcher::from_config(&cfg);
        assert_eq!(fetcher.search_url, "http://local/search");
        assert_eq!(fetcher.reverse_url, EndpointId::Reverse.default_url());
        assert_eq!(fetcher.user_agent, "EarthCastApp");
    }
}
