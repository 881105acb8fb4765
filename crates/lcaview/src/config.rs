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

use crate::data_handler::{DatasetLoader, TableSchema, DEFAULT_SHEET};
use crate::error::{ConfigError, ConfigResult, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
const DEFAULT_FILTER_COLUMNS: [&str; 12] = [
    "impact category",
    "main?",
    "product",
    "energy carrier",
    "end-use",
    "end-use technology",
    "transport type",
    "synthesis type",
    "electrolyzer tech",
    "feedstock origin",
    "CO2 origin",
    "CO2 allocation",
];
const DEFAULT_CONTRIBUTOR_COLUMNS: [&str; 22] = [
    "boiler",
    "CCS/CCU",
    "CHP",
    "CNG pipeline",
    "electricity",
    "electrolyzer",
    "emissions",
    "EoL",
    "fuel cell",
    "hydrogen pipeline",
    "hydrogen production",
    "hydrogen storage",
    "hydrogen supply",
    "leak",
    "methanol production",
    "methanol supply",
    "others",
    "SNG production",
    "SNG supply",
    "steam",
    "transport",
    "water",
];
pub const PRODUCTS_PLACEHOLDER: &str = "{products}";
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub dataset: DatasetConfig,
    pub columns: ColumnConfig,
    pub labels: LabelConfig,
    pub titles: TitleConfig,
    pub figure: FigureConfig,
    pub server: ServerConfig,
}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub path: PathBuf,
    pub sheet: String,
    pub product_column: String,
    pub unit_column: String,
}
impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("all_results.xlsx"),
            sheet: DEFAULT_SHEET.to_string(),
            product_column: "product".to_string(),
            unit_column: "unit".to_string(),
        }
    }
}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    /// Dropdown order on the page and token order in composite labels.
    pub filter: Vec<String>,
    /// Stacking order of the bar segments.
    pub contributor: Vec<String>,
}
impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER_COLUMNS.iter().map(|s| s.to_string()).collect(),
            contributor: DEFAULT_CONTRIBUTOR_COLUMNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub delimiter: String,
    pub filler_tokens: Vec<String>,
}
impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            delimiter: " | ".to_string(),
            filler_tokens: vec!["Yes".to_string(), "No".to_string()],
        }
    }
}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleConfig {
    pub generic: String,
    pub heat_keyword: String,
    pub heat: String,
    pub electricity_keyword: String,
    pub electricity: String,
    /// `{products}` is replaced by the comma-joined product selection.
    pub per_mass: String,
}
impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            generic: "Contributions".to_string(),
            heat_keyword: "heat".to_string(),
            heat: "per MJ heat".to_string(),
            electricity_keyword: "electricity".to_string(),
            electricity: "per kWh electricity".to_string(),
            per_mass: format!("per kg of {PRODUCTS_PLACEHOLDER}"),
        }
    }
}
impl TitleConfig {
    pub fn per_mass_title(&self, products: &str) -> String {
        self.per_mass.replace(PRODUCTS_PLACEHOLDER, products)
    }
}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    pub tick_angle: i32,
    pub margin_top: u32,
    pub margin_bottom: u32,
}
impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            tick_angle: 45,
            margin_top: 60,
            margin_bottom: 160,
        }
    }
}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
}
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:8050".to_string(),
        }
    }
}
impl ServerConfig {
    pub fn socket_addr(&self) -> ConfigResult<SocketAddr> {
        self.address
            .parse()
            .map_err(|_| ConfigError::InvalidAddress {
                value: self.address.clone(),
            })
    }
}
impl DashboardConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::ConfigFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }
    pub fn validate(&self) -> ConfigResult<()> {
        if self.columns.filter.is_empty() {
            return Err(ConfigError::EmptyColumnList {
                field: "columns.filter".to_string(),
            });
        }
        if self.columns.contributor.is_empty() {
            return Err(ConfigError::EmptyColumnList {
                field: "columns.contributor".to_string(),
            });
        }
        let mut seen = HashSet::new();
        for column in &self.columns.filter {
            if !seen.insert(column.as_str()) {
                return Err(ConfigError::DuplicateColumn {
                    column: column.clone(),
                });
            }
        }
        let filters = seen;
        let mut seen = HashSet::new();
        for column in &self.columns.contributor {
            if filters.contains(column.as_str()) {
                return Err(ConfigError::OverlappingColumn {
                    column: column.clone(),
                });
            }
            if !seen.insert(column.as_str()) {
                return Err(ConfigError::DuplicateColumn {
                    column: column.clone(),
                });
            }
        }
        if !filters.contains(self.dataset.product_column.as_str()) {
            return Err(ConfigError::ProductNotFiltered {
                column: self.dataset.product_column.clone(),
            });
        }
        if self.labels.delimiter.trim().is_empty() {
            return Err(ConfigError::InvalidDelimiter);
        }
        self.server.socket_addr()?;
        Ok(())
    }
    pub fn schema(&self) -> TableSchema {
        TableSchema::new()
            .with_text(self.columns.filter.iter().cloned())
            .with_text([self.dataset.unit_column.clone()])
            .with_numeric(self.columns.contributor.iter().cloned())
            .with_key(self.dataset.product_column.clone())
    }
    pub fn loader(&self) -> DatasetLoader {
        DatasetLoader::new(self.schema()).with_sheet(self.dataset.sheet.clone())
    }
    pub fn is_filter_column(&self, column: &str) -> bool {
        self.columns.filter.iter().any(|c| c == column)
    }
}
