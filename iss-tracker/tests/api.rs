use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use iss_tracker::api::{AppState, create_router};
use iss_tracker::module::geo::{GeocodeError, ReverseGeocoder};
use iss_tracker::module::oem::{EphemerisSource, FetchError, OemDocument, XmlError};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

struct FixtureSource(Value);

#[async_trait]
impl EphemerisSource for FixtureSource {
    async fn fetch(&self) -> Result<OemDocument, FetchError> {
        Ok(OemDocument::from_value(self.0.clone()))
    }
}

struct UnreachableSource;

#[async_trait]
impl EphemerisSource for UnreachableSource {
    async fn fetch(&self) -> Result<OemDocument, FetchError> {
        Err(FetchError::Xml(XmlError::NoRoot))
    }
}

struct StubGeocoder;

#[async_trait]
impl ReverseGeocoder for StubGeocoder {
    async fn reverse(&self, lat: f64, _lon: f64) -> Result<Option<String>, GeocodeError> {
        // Northern hemisphere resolves, southern is "ocean"
        Ok((lat >= 0.0).then(|| "Somewhere, Earth".to_string()))
    }
}

fn state_vector(day: u32, position: [f64; 3], velocity: [f64; 3]) -> Value {
    json!({
        "EPOCH": format!("2024-{:03}T12:00:00.000Z", day),
        "X": {"@units": "km", "#text": position[0].to_string()},
        "Y": {"@units": "km", "#text": position[1].to_string()},
        "Z": {"@units": "km", "#text": position[2].to_string()},
        "X_DOT": {"@units": "km/s", "#text": velocity[0].to_string()},
        "Y_DOT": {"@units": "km/s", "#text": velocity[1].to_string()},
        "Z_DOT": {"@units": "km/s", "#text": velocity[2].to_string()},
    })
}

/// Ten daily vectors starting 2024-01-01 12:00, plus one malformed entry
fn fixture() -> Value {
    let mut vectors: Vec<Value> = (1..=10)
        .map(|day| {
            let d = day as f64;
            state_vector(
                day,
                [-4505.7 + d, -3322.8 - d, 3855.9 + d],
                [0.35 * d, -5.9, -4.7],
            )
        })
        .collect();
    vectors.insert(3, json!({"EPOCH": "2024-004T00:00:00.000Z", "X": {"#text": "oops"}}));

    json!({
        "ndm": {
            "oem": {
                "header": {"CREATION_DATE": "2024-077T14:50:19.041Z", "ORIGINATOR": "JSC"},
                "body": {
                    "segment": {
                        "metadata": {"OBJECT_NAME": "ISS", "REF_FRAME": "EME2000"},
                        "data": {
                            "COMMENT": ["COMMENT LINE 1", "COMMENT LINE 2"],
                            "stateVector": vectors
                        }
                    }
                }
            }
        }
    })
}

fn app_with(source: impl EphemerisSource + 'static) -> Router {
    create_router(AppState::new(Arc::new(source), Arc::new(StubGeocoder)))
}

fn app() -> Router {
    app_with(FixtureSource(fixture()))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_header_comment_metadata() {
    let (status, header) = get(app(), "/header").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(header, json!({"CREATION_DATE": "2024-077T14:50:19.041Z", "ORIGINATOR": "JSC"}));

    let (_, comments) = get(app(), "/comment").await;
    assert_eq!(comments, json!(["COMMENT LINE 1", "COMMENT LINE 2"]));

    let (_, metadata) = get(app(), "/metadata").await;
    assert_eq!(metadata["OBJECT_NAME"], "ISS");
}

#[tokio::test]
async fn test_missing_paths_are_empty_not_errors() {
    let app = || app_with(FixtureSource(json!({"ndm": {}})));

    let (status, header) = get(app(), "/header").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(header, json!({}));

    let (status, epochs) = get(app(), "/epochs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(epochs, json!([]));
}

#[tokio::test]
async fn test_epochs_drop_malformed_entries() {
    let (status, epochs) = get(app(), "/epochs").await;
    assert_eq!(status, StatusCode::OK);

    let epochs = epochs.as_array().unwrap();
    assert_eq!(epochs.len(), 10);
    assert_eq!(epochs[0]["timestamp"], "2024-01-01 12:00:00.000000");
    assert_eq!(epochs[9]["timestamp"], "2024-01-10 12:00:00.000000");
}

#[tokio::test]
async fn test_epochs_slice_consistency() {
    let (_, offset) = get(app(), "/epochs?limit=5&offset=2").await;
    let (_, plain) = get(app(), "/epochs?limit=5").await;

    let offset = offset.as_array().unwrap();
    let plain = plain.as_array().unwrap();
    assert_eq!(offset.len(), 5);
    assert_eq!(plain.len(), 5);
    assert_eq!(offset[0]["timestamp"], plain[2]["timestamp"]);
    assert_eq!(offset[2]["timestamp"], plain[4]["timestamp"]);

    let (_, tail) = get(app(), "/epochs?offset=8").await;
    assert_eq!(tail.as_array().unwrap().len(), 2);

    let (_, past_end) = get(app(), "/epochs?offset=50").await;
    assert_eq!(past_end, json!([]));
}

#[tokio::test]
async fn test_epochs_rejects_bad_query() {
    let (status, _) = get(app(), "/epochs?limit=many").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_epoch_lookup_and_speed() {
    let (status, epoch) = get(app(), "/epochs/2024-01-03__12_00_00.000000").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(epoch["timestamp"], "2024-01-03 12:00:00.000000");

    let (status, speed) = get(app(), "/epochs/2024-01-03__12_00_00.000000/speed").await;
    assert_eq!(status, StatusCode::OK);
    let dx = epoch["dx"].as_f64().unwrap();
    let dy = epoch["dy"].as_f64().unwrap();
    let dz = epoch["dz"].as_f64().unwrap();
    let expected = (dx * dx + dy * dy + dz * dz).sqrt();
    assert!((speed["speed"].as_f64().unwrap() - expected).abs() < 1e-12);
}

#[tokio::test]
async fn test_unknown_epoch_is_404() {
    for uri in [
        "/epochs/1999-01-01__00_00_00.000000",
        "/epochs/1999-01-01__00_00_00.000000/speed",
        "/epochs/1999-01-01__00_00_00.000000/location",
    ] {
        let (status, body) = get(app(), uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(body, json!({"error": "Epoch not found"}));
    }
}

#[tokio::test]
async fn test_epoch_location() {
    let (status, geo) = get(app(), "/epochs/2024-01-02__12_00_00.000000/location").await;
    assert_eq!(status, StatusCode::OK);

    let lat = geo["lat"].as_f64().unwrap();
    let lon = geo["lon"].as_f64().unwrap();
    assert!((-90.0..=90.0).contains(&lat));
    assert!((-180.0..=180.0).contains(&lon));
    assert!(geo["alt"].as_f64().unwrap() > 0.0);

    let expected_place = if lat >= 0.0 { "Somewhere, Earth" } else { "Over Ocean or Unknown" };
    assert_eq!(geo["place"], expected_place);
}

#[tokio::test]
async fn test_now_returns_latest_for_past_data() {
    let (status, now) = get(app(), "/now").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(now["closest_epoch"]["timestamp"], "2024-01-10 12:00:00.000000");
    assert!(now["speed"].as_f64().unwrap() > 0.0);
    assert!(now["geo"]["alt"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_now_without_epochs_is_404() {
    let (status, body) = get(app_with(FixtureSource(json!({}))), "/now").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "No epochs available"}));
}

#[tokio::test]
async fn test_summary() {
    let (status, summary) = get(app(), "/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["count"], 10);
    assert_eq!(summary["first_epoch"], "2024-01-01 12:00:00.000000");
    assert_eq!(summary["last_epoch"], "2024-01-10 12:00:00.000000");
    assert!(summary["average_speed"].as_f64().unwrap() > 7.0);

    let (_, empty) = get(app_with(FixtureSource(json!({}))), "/summary").await;
    assert_eq!(
        empty,
        json!({"first_epoch": null, "last_epoch": null, "count": 0, "average_speed": null})
    );
}

#[tokio::test]
async fn test_upstream_failure_is_502() {
    for uri in ["/header", "/epochs", "/now"] {
        let (status, body) = get(app_with(UnreachableSource), uri).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY, "{}", uri);
        assert_eq!(body, json!({"error": "Upstream ephemeris unavailable"}));
    }
}

#[tokio::test]
async fn test_health() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
