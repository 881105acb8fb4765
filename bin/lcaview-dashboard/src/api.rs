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

use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use indexmap::IndexMap;
use lcaview::reactive::ChartUpdate;
use lcaview::{ConfigError, DataError, DropdownOption, FilterState, LcaViewError};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip)]
    status: StatusCode,
}
impl ApiError {
    fn bad_request(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            status: StatusCode::BAD_REQUEST,
        }
    }
    pub fn status(&self) -> StatusCode {
        self.status
    }
}
impl From<LcaViewError> for ApiError {
    fn from(e: LcaViewError) -> Self {
        match &e {
            LcaViewError::Config(ConfigError::UnknownFilterColumn { .. }) => {
                Self::bad_request("UNKNOWN_FILTER_COLUMN", e.user_message())
            }
            LcaViewError::Data(DataError::ColumnNotFound { .. }) => {
                Self::bad_request("COLUMN_NOT_FOUND", e.user_message())
            }
            _ => {
                error!(category = e.category(), "callback failed: {e}");
                Self {
                    code: "INTERNAL_ERROR".to_string(),
                    message: e.user_message(),
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                }
            }
        }
    }
}
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request("INVALID_REQUEST", rejection.body_text())
    }
}
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        let body = Json(self);
        (status, body).into_response()
    }
}

type ApiResult = Result<Response, ApiError>;

fn respond<T: Serialize>(state: &AppState, value: &T) -> ApiResult {
    let body = if state.pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| ApiError::from(LcaViewError::from(e)))?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

#[derive(Debug, Deserialize)]
pub struct OptionsRequest {
    #[serde(default)]
    pub trigger: Option<String>,
    #[serde(default)]
    pub selections: FilterState,
}
#[derive(Debug, Deserialize)]
pub struct FigureRequest {
    #[serde(default)]
    pub selections: FilterState,
    #[serde(default)]
    pub last_unit: Option<String>,
}
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    #[serde(default)]
    pub trigger: Option<String>,
    #[serde(default)]
    pub selections: FilterState,
    #[serde(default)]
    pub last_unit: Option<String>,
}
#[derive(Debug, Serialize, Deserialize)]
pub struct FilterControl {
    pub column: String,
    pub options: Vec<DropdownOption>,
}
#[derive(Debug, Serialize, Deserialize)]
pub struct ControlsResponse {
    pub filters: Vec<FilterControl>,
}
#[derive(Debug, Serialize, Deserialize)]
pub struct OptionsResponse {
    pub options: IndexMap<String, Vec<DropdownOption>>,
}

pub async fn health(State(state): State<AppState>) -> ApiResult {
    respond(
        &state,
        &serde_json::json!({
            "status": "ok",
            "rows": state.dashboard.dataset().row_count(),
        }),
    )
}

pub async fn controls(State(state): State<AppState>) -> ApiResult {
    let filters = state
        .dashboard
        .graph()
        .initial_options()?
        .into_iter()
        .map(|(column, options)| FilterControl { column, options })
        .collect();
    respond(&state, &ControlsResponse { filters })
}

pub async fn options(
    State(state): State<AppState>,
    payload: Result<Json<OptionsRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    debug!(trigger = ?request.trigger, constrained = request.selections.len(), "options callback");
    let options = state
        .dashboard
        .graph()
        .options(request.trigger.as_deref(), &request.selections)?;
    respond(&state, &OptionsResponse { options })
}

pub async fn figure(
    State(state): State<AppState>,
    payload: Result<Json<FigureRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    debug!(constrained = request.selections.len(), "figure callback");
    let update: ChartUpdate = state
        .dashboard
        .graph()
        .chart(&request.selections, request.last_unit.as_deref())?;
    respond(&state, &update)
}

pub async fn update(
    State(state): State<AppState>,
    payload: Result<Json<UpdateRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = payload?;
    debug!(trigger = ?request.trigger, constrained = request.selections.len(), "update callback");
    let update = state.dashboard.graph().fire(
        request.trigger.as_deref(),
        &request.selections,
        request.last_unit.as_deref(),
    )?;
    respond(&state, &update)
}
