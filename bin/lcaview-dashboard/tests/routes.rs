// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use lcaview::config::ColumnConfig;
use lcaview::data_handler::{Column, TableMetadata};
use lcaview::{Dashboard, DashboardConfig, Table};
use lcaview_dashboard::{build_router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    let config = DashboardConfig {
        columns: ColumnConfig {
            filter: vec!["main?".into(), "product".into(), "origin".into()],
            contributor: vec!["steam".into(), "water".into()],
        },
        ..Default::default()
    };
    let mut table = Table::new(TableMetadata::named("routes"));
    table
        .add_column("main?", Column::text([Some("Yes"), Some("Yes"), Some("No")]))
        .unwrap();
    table
        .add_column("product", Column::text([Some("X"), Some("X"), Some("X")]))
        .unwrap();
    table
        .add_column("origin", Column::text([Some("A"), Some("A"), Some("B")]))
        .unwrap();
    table
        .add_column("unit", Column::text([Some("kg CO2-eq"); 3]))
        .unwrap();
    table
        .add_column("steam", Column::numbers([Some(1.0), Some(2.0), Some(3.0)]))
        .unwrap();
    table
        .add_column("water", Column::numbers([Some(0.0); 3]))
        .unwrap();
    let dashboard = Dashboard::from_table(config, table).unwrap();
    build_router(AppState::new(dashboard))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_index_serves_page() {
    let response = app()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("plotly"));
    assert!(html.contains("/api/update"));
}

#[tokio::test]
async fn test_health_reports_rows() {
    let (status, body) = send(app(), Request::get("/healthz").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "rows": 3}));
}

#[tokio::test]
async fn test_controls_list_filters_in_order() {
    let (status, body) =
        send(app(), Request::get("/api/controls").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    let filters = body["filters"].as_array().unwrap();
    let columns: Vec<&str> = filters
        .iter()
        .map(|f| f["column"].as_str().unwrap())
        .collect();
    assert_eq!(columns, vec!["main?", "product", "origin"]);
    assert_eq!(
        filters[2]["options"],
        json!([{"label": "A", "value": "A"}, {"label": "B", "value": "B"}])
    );
}

#[tokio::test]
async fn test_options_skip_the_trigger() {
    let (status, body) = send(
        app(),
        post(
            "/api/options",
            json!({"trigger": "origin", "selections": {"origin": ["B"]}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["options"].get("origin").is_none());
    assert_eq!(body["options"]["main?"], json!([{"label": "No", "value": "No"}]));
}

#[tokio::test]
async fn test_figure_for_selection() {
    let (status, body) = send(
        app(),
        post(
            "/api/figure",
            json!({"selections": {"product": ["X"], "origin": ["A"], "main?": null}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["figure"]["layout"]["title"]["text"], "per kg of X");
    assert_eq!(body["figure"]["layout"]["barmode"], "stack");
    assert_eq!(body["figure"]["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["figure"]["data"][0]["y"], json!([1.0, 2.0]));
    assert!(body["notice"].is_null());
}

#[tokio::test]
async fn test_update_with_empty_result_keeps_unit() {
    let (status, body) = send(
        app(),
        post(
            "/api/update",
            json!({
                "trigger": "main?",
                "selections": {"main?": ["No"], "origin": ["A"]},
                "last_unit": "kg CO2-eq"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["figure"]["data"], json!([]));
    assert_eq!(body["figure"]["layout"]["yaxis"]["title"]["text"], "kg CO2-eq");
    assert_eq!(body["notice"], "No results match the selected filters.");
    assert_eq!(body["options"]["origin"], json!([]));
}

#[tokio::test]
async fn test_unknown_column_is_a_client_error() {
    let (status, body) = send(
        app(),
        post("/api/update", json!({"trigger": "colour", "selections": {}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "UNKNOWN_FILTER_COLUMN");
    assert!(body["message"].as_str().unwrap().contains("colour"));
}

#[tokio::test]
async fn test_malformed_body_is_a_client_error() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/figure")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_router_over_loaded_csv() {
    use std::io::Write;
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(
        b"main?,product,origin,unit,steam,water\n\
          Yes,X,A,kg,1,0\n\
          Yes,,B,kg,5,0\n\
          No,Y,B,kg,2,1\n",
    )
    .unwrap();
    file.flush().unwrap();
    let mut config = DashboardConfig {
        columns: ColumnConfig {
            filter: vec!["main?".into(), "product".into(), "origin".into()],
            contributor: vec!["steam".into(), "water".into()],
        },
        ..Default::default()
    };
    config.dataset.path = file.path().to_path_buf();
    let dashboard = Dashboard::load(config).unwrap();
    let app = build_router(AppState::new(dashboard));

    let (status, body) = send(
        app.clone(),
        Request::get("/healthz").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"], 2);

    let (status, body) = send(
        app,
        post("/api/figure", json!({"selections": {"product": ["Y"]}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["figure"]["layout"]["title"]["text"], "per kg of Y");
    assert_eq!(body["figure"]["data"].as_array().unwrap().len(), 2);
}
