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

//! Plotly figure documents handed to the browser-side renderer.

use crate::chart::ChartPayload;
use crate::config::FigureConfig;
use serde::{Deserialize, Serialize};
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub data: Vec<BarTrace>,
    pub layout: Layout,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarTrace {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<f64>,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub title: Title,
    pub barmode: String,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub margin: Margin,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub text: Option<String>,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub title: Title,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickangle: Option<i32>,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub t: u32,
    pub b: u32,
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub text: String,
    pub xref: String,
    pub yref: String,
    pub x: f64,
    pub y: f64,
    pub showarrow: bool,
}
impl Annotation {
    fn centred(text: &str) -> Self {
        Self {
            text: text.to_string(),
            xref: "paper".to_string(),
            yref: "paper".to_string(),
            x: 0.5,
            y: 0.5,
            showarrow: false,
        }
    }
}
impl Layout {
    fn stacked(title: &str, unit: Option<String>, config: &FigureConfig) -> Self {
        Self {
            title: Title {
                text: Some(title.to_string()),
            },
            barmode: "stack".to_string(),
            xaxis: Axis {
                title: Title { text: None },
                tickangle: Some(config.tick_angle),
            },
            yaxis: Axis {
                title: Title { text: unit },
                tickangle: None,
            },
            margin: Margin {
                t: config.margin_top,
                b: config.margin_bottom,
            },
            annotations: Vec::new(),
        }
    }
}
impl Figure {
    /// One bar trace per contributing column, stacked, labels on the x axis.
    pub fn stacked_bar(payload: &ChartPayload, config: &FigureConfig) -> Self {
        let x: Vec<String> = payload.rows.iter().map(|r| r.label.clone()).collect();
        let data = payload
            .contributing_columns
            .iter()
            .map(|column| BarTrace {
                kind: "bar".to_string(),
                name: column.clone(),
                x: x.clone(),
                y: payload.series(column),
            })
            .collect();
        Self {
            data,
            layout: Layout::stacked(&payload.title, payload.unit.clone(), config),
        }
    }
    /// A chart with no bars and a centred notice.
    pub fn empty(title: &str, unit: Option<String>, notice: &str, config: &FigureConfig) -> Self {
        let mut layout = Layout::stacked(title, unit, config);
        layout.annotations.push(Annotation::centred(notice));
        Self {
            data: Vec::new(),
            layout,
        }
    }
    pub fn title(&self) -> Option<&str> {
        self.layout.title.text.as_deref()
    }
    pub fn unit(&self) -> Option<&str> {
        self.layout.yaxis.title.text.as_deref()
    }
    pub fn notice(&self) -> Option<&str> {
        self.layout.annotations.first().map(|a| a.text.as_str())
    }
}
