use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use geo::Point;
use serde_json::{Value, json};
use tower::ServiceExt;
use tranzit::TransitModel;
use tranzit_core::loading::calculate_transfers;
use tranzit_core::loading::gtfs::FeedInfo;
use tranzit_core::model::{
    FeedMeta, PublicTransitData, ScheduledTrip, Stop, StopTime, StreetGraph, StreetNode,
    TransitModelMeta,
};
use tranzit_server::{AppState, ServerConfig, create_router};

const LAT: f64 = 56.25;

fn lon_of_node(idx: usize) -> f64 {
    93.49 + idx as f64 * 0.002
}

/// Street of 41 nodes, line R1 over A, B, C and line R2 from E (next to B) to D
fn fixture_model() -> TransitModel {
    let nodes = (0..41)
        .map(|idx| StreetNode {
            id: idx as i64,
            geometry: Point::new(lon_of_node(idx), LAT),
        })
        .collect();
    let street_graph = StreetGraph::from_segments(nodes, (1..41).map(|idx| (idx - 1, idx)));

    let stops = [("A", 5), ("B", 15), ("C", 25), ("D", 35), ("E", 16)]
        .into_iter()
        .map(|(name, node)| Stop::new(name, Point::new(lon_of_node(node), LAT)))
        .collect();

    let ride = |route: &str, first: u32, stops: &[(usize, u32)]| ScheduledTrip {
        route_id: route.to_string(),
        stop_times: stops
            .iter()
            .map(|&(stop, offset)| (stop, StopTime::new(first + offset, first + offset)))
            .collect(),
    };
    let trips = (0..8)
        .flat_map(|k| {
            [
                ride("R1", 28800 + 1800 * k, &[(0, 0), (1, 300), (2, 600)]),
                ride("R2", 29400 + 1800 * k, &[(4, 0), (3, 600)]),
            ]
        })
        .collect();

    let feeds_meta = vec![FeedMeta {
        feed_info: FeedInfo {
            feed_publisher_name: "Fixture Transit".to_string(),
            ..FeedInfo::default()
        },
    }];

    let transit_data = PublicTransitData::from_trips(stops, trips, feeds_meta).unwrap();
    let mut model = TransitModel::with_transit(
        street_graph,
        transit_data,
        TransitModelMeta {
            max_transfer_time: 600,
        },
    );
    calculate_transfers(&mut model);
    model
}

fn app() -> Router {
    let config = ServerConfig::default();
    create_router(AppState::new(fixture_model(), config.concurrency_limit), &config)
}

fn point(node: usize) -> Value {
    json!({ "lat": LAT, "lon": lon_of_node(node) })
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    read(app.oneshot(request).await.unwrap()).await
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    read(app.oneshot(request).await.unwrap()).await
}

async fn read(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn health_is_ok() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn model_describes_loaded_data() {
    let (status, body) = get(app(), "/model").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["summary"],
        "TransitModel with 5 stops, 2 routes and 40 trips"
    );
    assert_eq!(body["info"]["feeds"][0]["feed_publisher_name"], "Fixture Transit");
}

#[tokio::test]
async fn route_between_points() {
    let (status, body) = post(
        app(),
        "/route",
        json!({ "start": point(5), "end": point(35), "departure_time": 28800 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["route"]["travel_time_seconds"], 1200);
    assert_eq!(body["route"]["transfers"], 1);
    assert_eq!(body["route"]["used_transit"], true);
}

#[tokio::test]
async fn unreachable_route_is_null() {
    let (status, body) = post(
        app(),
        "/route",
        json!({ "start": point(35), "end": point(5), "departure_time": 28800 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["route"].is_null());
}

#[tokio::test]
async fn point_far_from_streets_is_not_found() {
    let (status, body) = post(
        app(),
        "/route",
        json!({ "start": { "lat": 0.0, "lon": 0.0 }, "end": point(35), "departure_time": 28800 }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("No nearby points"));
}

#[tokio::test]
async fn invalid_coordinates_are_rejected() {
    let (status, _) = post(
        app(),
        "/route",
        json!({ "start": { "lat": 91.0, "lon": 0.0 }, "end": point(35), "departure_time": 0 }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn one_to_many_keeps_order() {
    let (status, body) = post(
        app(),
        "/route/one-to-many",
        json!({
            "start": point(5),
            "ends": [point(35), point(15)],
            "departure_time": 28800,
            "max_transfers": 2,
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let routes = body["routes"].as_array().unwrap();
    assert_eq!(routes.len(), 2);
    assert_eq!(routes[0]["travel_time_seconds"], 1200);
    assert_eq!(routes[1]["travel_time_seconds"], 300);
}

#[tokio::test]
async fn detailed_route_is_geojson() {
    let (status, body) = post(
        app(),
        "/route/detailed",
        json!({ "start": point(5), "end": point(35), "departure_time": 28800 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["journey"]["type"], "FeatureCollection");
    assert_eq!(body["journey"]["features"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn matrix_is_square() {
    let (status, body) = post(
        app(),
        "/matrix",
        json!({ "points": [point(5), point(35)], "departure_time": 28800 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["travel_times"], json!([[0, 1200], [null, 0]]));
}

#[tokio::test]
async fn isochrone_returns_wkt() {
    let area = "POLYGON((93.49 56.246, 93.57 56.246, 93.57 56.254, 93.49 56.254, 93.49 56.246))";
    let (status, body) = post(
        app(),
        "/isochrone",
        json!({
            "start": point(5),
            "departure_time": 28800,
            "cutoff": 1800,
            "area": area,
            "resolution": 8,
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["wkt"].as_str().unwrap().starts_with("MULTIPOLYGON"));
    assert!(body["cells"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn isochrone_with_line_area_is_bad_request() {
    let (status, _) = post(
        app(),
        "/isochrone",
        json!({
            "start": point(5),
            "departure_time": 28800,
            "cutoff": 1800,
            "area": "LINESTRING(93.49 56.25, 93.57 56.25)",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_isochrone_is_rejected_up_front() {
    let city = "POLYGON((93.49 56.246, 93.57 56.246, 93.57 56.254, 93.49 56.254, 93.49 56.246))";
    let country = "POLYGON((80 50, 90 50, 90 60, 80 60, 80 50))";

    for (area, resolution, max_transfers) in [(city, 15, 2), (country, 9, 2), (city, 8, 1_000_000)] {
        let (status, body) = post(
            app(),
            "/isochrone",
            json!({
                "start": point(5),
                "departure_time": 28800,
                "cutoff": 1800,
                "area": area,
                "resolution": resolution,
                "max_transfers": max_transfers,
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{area} at {resolution}");
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn huge_transfer_budget_is_bad_request() {
    let (status, _) = post(
        app(),
        "/route",
        json!({
            "start": point(5),
            "end": point(35),
            "departure_time": 28800,
            "max_transfers": u64::MAX,
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn range_and_pareto_range() {
    let body = json!({
        "start": point(5),
        "end": point(35),
        "earliest_departure": 28000,
        "latest_departure": 30000,
    });

    let (status, range) = post(app(), "/range", body.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(range["median_travel_time"], 1790);
    assert_eq!(
        range["departure_times"],
        json!([28000, 28210, 28421, 28800, 30000])
    );

    let (status, pareto) = post(app(), "/range/pareto", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pareto["departure_times"], json!([28800, 30000]));
    assert_eq!(pareto["travel_times"], json!([1200, 1800]));
}

#[tokio::test]
async fn inverted_range_is_bad_request() {
    let (status, body) = post(
        app(),
        "/range",
        json!({
            "start": point(5),
            "end": point(35),
            "earliest_departure": 30000,
            "latest_departure": 28000,
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
