//! Integration tests for GeocodingFetcher using wiremock.

use earthcast_core::{CityStore, FetchError, GeocodingFetcher};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER_AGENT: &str = "EarthCastTest/1.0";

fn fetcher(server: &MockServer) -> GeocodingFetcher {
    GeocodingFetcher::new(
        format!("{}/v1/search", server.uri()),
        format!("{}/reverse", server.uri()),
        USER_AGENT,
    )
}

fn temp_store() -> (tempfile::TempDir, CityStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = CityStore::open(dir.path().join("cities.db")).unwrap();
    (dir, store)
}

#[tokio::test]
async fn search_stores_first_result_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Paris"))
        .and(query_param("count", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "name": "Paris", "latitude": 48.85, "longitude": 2.35 }]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let (_dir, store) = temp_store();
    let geocoder = fetcher(&server);

    let first = geocoder.search_by_name("Paris", &store).await.unwrap();
    assert_eq!(first.name, "Paris");
    assert_eq!(first.latitude, 48.85);
    assert_eq!(first.longitude, 2.35);

    let second = geocoder.search_by_name("Paris", &store).await;
    assert!(second.is_some());

    let saved = store.list().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0], first);
}

#[tokio::test]
async fn search_without_results_stores_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "generationtime_ms": 0.4 })))
        .mount(&server)
        .await;

    let (_dir, store) = temp_store();
    assert!(fetcher(&server).search_by_name("Atlantis", &store).await.is_none());
    assert!(store.list().unwrap().is_empty());
}

#[tokio::test]
async fn search_with_empty_results_stores_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .mount(&server)
        .await;

    let (_dir, store) = temp_store();
    assert!(fetcher(&server).search_by_name("Nowhere", &store).await.is_none());
    assert!(store.list().unwrap().is_empty());
}

#[tokio::test]
async fn search_server_error_is_absence() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let (_dir, store) = temp_store();
    let geocoder = fetcher(&server);
    assert!(geocoder.search_by_name("Paris", &store).await.is_none());

    let err = geocoder.try_search("Paris").await.unwrap_err();
    assert!(matches!(err, FetchError::HttpStatus { status: 503, .. }));
}

#[tokio::test]
async fn suggestions_fill_missing_region_with_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Springfield"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {
                    "name": "Springfield",
                    "admin1": "Illinois",
                    "latitude": 39.80,
                    "longitude": -89.64
                },
                { "name": "Springfield", "latitude": -43.33, "longitude": 171.93 }
            ]
        })))
        .mount(&server)
        .await;

    let suggestions = fetcher(&server).suggest("Springfield").await;

    assert_eq!(suggestions.len(), 2);
    assert_eq!(suggestions[0].region, "Illinois");
    assert_eq!(suggestions[0].display_name(), "Springfield, Illinois");
    assert_eq!(suggestions[1].region, "");
    assert_eq!(suggestions[1].latitude, -43.33);
}

#[tokio::test]
async fn suggestions_swallow_malformed_json() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{ not json"))
        .mount(&server)
        .await;

    let geocoder = fetcher(&server);
    assert!(geocoder.suggest("Oslo").await.is_empty());
    assert!(matches!(
        geocoder.try_suggest("Oslo").await.unwrap_err(),
        FetchError::MalformedResponse { .. }
    ));
}

#[tokio::test]
async fn reverse_geocode_falls_back_to_town() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(header("user-agent", USER_AGENT))
        .and(query_param("lat", "39.8"))
        .and(query_param("lon", "-89.64"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "address": { "town": "Springfield", "state": "Illinois" }
        })))
        .mount(&server)
        .await;

    let place = fetcher(&server).reverse_geocode(39.8, -89.64).await;
    assert_eq!(place.as_deref(), Some("Springfield"));
}

#[tokio::test]
async fn reverse_geocode_prefers_city_over_village() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "address": { "village": "Little Whinging", "city": "London", "hamlet": "X" }
        })))
        .mount(&server)
        .await;

    let place = fetcher(&server).reverse_geocode(51.5, -0.12).await;
    assert_eq!(place.as_deref(), Some("London"));
}

#[tokio::test]
async fn reverse_geocode_without_place_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "address": { "county": "Somewhere", "country": "Nowhere" }
        })))
        .mount(&server)
        .await;

    let geocoder = fetcher(&server);
    assert!(geocoder.reverse_geocode(0.0, 0.0).await.is_none());
    assert!(geocoder.try_reverse_geocode(0.0, 0.0).await.unwrap().is_none());
}

#[tokio::test]
async fn unreachable_server_is_network_failure() {
    // Grab a free port and release it so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let geocoder = GeocodingFetcher::new(
        format!("{base}/v1/search"),
        format!("{base}/reverse"),
        USER_AGENT,
    );

    assert!(geocoder.reverse_geocode(1.0, 2.0).await.is_none());
    assert!(matches!(
        geocoder.try_search("Paris").await.unwrap_err(),
        FetchError::Network { .. }
    ));
}
