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

//! Explicit dependency graph between the filter dropdowns and the chart.
//!
//! Every dropdown feeds two edges: the options edge narrows the choices of
//! the other dropdowns and the chart edge redraws the figure. Edges only read
//! the shared dataset and the filter state handed to them, so they can run in
//! either order.

use crate::catalog::{self, DropdownOption};
use crate::chart::ChartAssembler;
use crate::config::{DashboardConfig, FigureConfig};
use crate::data_handler::Table;
use crate::error::{ChartError, ConfigError, LcaViewError, Result};
use crate::figure::Figure;
use crate::filter::{self, FilterState};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Node {
    Dropdown(String),
    Chart,
}
/// Everything an edge may read while firing.
pub struct EdgeContext<'a> {
    pub dataset: &'a Table,
    pub state: &'a FilterState,
    pub trigger: Option<&'a str>,
    pub last_unit: Option<&'a str>,
}
pub trait Edge {
    type Output;
    fn sources(&self) -> Vec<Node>;
    fn targets(&self) -> Vec<Node>;
    fn fire(&self, ctx: &EdgeContext<'_>) -> Result<Self::Output>;
}
/// Dropdown values → options of every dropdown except the one that changed.
#[derive(Debug, Clone)]
pub struct OptionsEdge {
    columns: Vec<String>,
}
impl OptionsEdge {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }
}
impl Edge for OptionsEdge {
    type Output = IndexMap<String, Vec<DropdownOption>>;
    fn sources(&self) -> Vec<Node> {
        self.columns.iter().cloned().map(Node::Dropdown).collect()
    }
    fn targets(&self) -> Vec<Node> {
        self.sources()
    }
    fn fire(&self, ctx: &EdgeContext<'_>) -> Result<Self::Output> {
        let narrowed = filter::apply(ctx.dataset, ctx.state)?;
        let mut out = IndexMap::with_capacity(self.columns.len());
        for column in &self.columns {
            if ctx.trigger == Some(column.as_str()) {
                continue;
            }
            out.insert(column.clone(), catalog::dropdown_options(&narrowed, column)?);
        }
        debug!(
            trigger = ctx.trigger.unwrap_or("<initial>"),
            rows = narrowed.row_count(),
            recomputed = out.len(),
            "options edge fired"
        );
        Ok(out)
    }
}
/// What the chart edge produced: the figure and, for an empty selection, the
/// notice shown in place of bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartUpdate {
    pub figure: Figure,
    pub notice: Option<String>,
}
/// Dropdown values → chart figure.
#[derive(Debug, Clone)]
pub struct ChartEdge {
    columns: Vec<String>,
    assembler: ChartAssembler,
    figure: FigureConfig,
}
impl ChartEdge {
    pub fn new(columns: Vec<String>, assembler: ChartAssembler, figure: FigureConfig) -> Self {
        Self {
            columns,
            assembler,
            figure,
        }
    }
}
impl Edge for ChartEdge {
    type Output = ChartUpdate;
    fn sources(&self) -> Vec<Node> {
        self.columns.iter().cloned().map(Node::Dropdown).collect()
    }
    fn targets(&self) -> Vec<Node> {
        vec![Node::Chart]
    }
    fn fire(&self, ctx: &EdgeContext<'_>) -> Result<Self::Output> {
        match self.assembler.render(ctx.dataset, ctx.state) {
            Ok(payload) => Ok(ChartUpdate {
                figure: Figure::stacked_bar(&payload, &self.figure),
                notice: None,
            }),
            Err(err @ LcaViewError::Chart(ChartError::EmptySelection)) => {
                warn!(constrained = ctx.state.len(), "no rows match the selection");
                let notice = err.user_message();
                let title = self
                    .assembler
                    .title(&ctx.state.selected(self.assembler.product_column()));
                Ok(ChartUpdate {
                    figure: Figure::empty(
                        &title,
                        ctx.last_unit.map(str::to_string),
                        &notice,
                        &self.figure,
                    ),
                    notice: Some(notice),
                })
            }
            Err(err) => Err(err),
        }
    }
}
/// Result of one interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub options: IndexMap<String, Vec<DropdownOption>>,
    pub figure: Figure,
    pub notice: Option<String>,
}
#[derive(Debug, Clone)]
pub struct ReactiveGraph {
    dataset: Arc<Table>,
    columns: Vec<String>,
    options_edge: OptionsEdge,
    chart_edge: ChartEdge,
}
impl ReactiveGraph {
    /// Wires the graph over `dataset`; fails if a filter column is absent.
    pub fn new(dataset: Arc<Table>, config: &DashboardConfig) -> Result<Self> {
        for column in &config.columns.filter {
            dataset.column(column)?;
        }
        let columns = config.columns.filter.clone();
        Ok(Self {
            options_edge: OptionsEdge::new(columns.clone()),
            chart_edge: ChartEdge::new(
                columns.clone(),
                ChartAssembler::new(config)?,
                config.figure.clone(),
            ),
            dataset,
            columns,
        })
    }
    pub fn dataset(&self) -> &Arc<Table> {
        &self.dataset
    }
    pub fn filter_columns(&self) -> &[String] {
        &self.columns
    }
    pub fn nodes(&self) -> Vec<Node> {
        let mut nodes: Vec<Node> = self.columns.iter().cloned().map(Node::Dropdown).collect();
        nodes.push(Node::Chart);
        nodes
    }
    /// Nodes downstream of `node`.
    pub fn dependents(&self, node: &Node) -> Vec<Node> {
        let mut out = Vec::new();
        if self.options_edge.sources().contains(node) {
            out.extend(self.options_edge.targets().into_iter().filter(|t| t != node));
        }
        if self.chart_edge.sources().contains(node) {
            out.extend(self.chart_edge.targets());
        }
        out
    }
    fn check_column(&self, column: &str) -> Result<()> {
        if self.columns.iter().any(|c| c == column) {
            Ok(())
        } else {
            Err(ConfigError::UnknownFilterColumn {
                column: column.to_string(),
            }
            .into())
        }
    }
    fn context<'a>(
        &'a self,
        trigger: Option<&'a str>,
        state: &'a FilterState,
        last_unit: Option<&'a str>,
    ) -> Result<EdgeContext<'a>> {
        if let Some(column) = trigger {
            self.check_column(column)?;
        }
        for column in state.columns() {
            self.check_column(column)?;
        }
        Ok(EdgeContext {
            dataset: &self.dataset,
            state,
            trigger,
            last_unit,
        })
    }
    /// Options of every column, straight from the full dataset.
    pub fn initial_options(&self) -> Result<IndexMap<String, Vec<DropdownOption>>> {
        self.options(None, &FilterState::new())
    }
    pub fn options(
        &self,
        trigger: Option<&str>,
        state: &FilterState,
    ) -> Result<IndexMap<String, Vec<DropdownOption>>> {
        self.options_edge.fire(&self.context(trigger, state, None)?)
    }
    pub fn chart(&self, state: &FilterState, last_unit: Option<&str>) -> Result<ChartUpdate> {
        self.chart_edge.fire(&self.context(None, state, last_unit)?)
    }
    /// Runs both edges for a change of `trigger` (or for the initial render
    /// when `None`).
    pub fn fire(
        &self,
        trigger: Option<&str>,
        state: &FilterState,
        last_unit: Option<&str>,
    ) -> Result<Update> {
        let ctx = self.context(trigger, state, last_unit)?;
        let options = self.options_edge.fire(&ctx)?;
        let ChartUpdate { figure, notice } = self.chart_edge.fire(&ctx)?;
        Ok(Update {
            options,
            figure,
            notice,
        })
    }
}
/// Per-user state for driving the graph one interaction at a time.
#[derive(Debug, Clone)]
pub struct Session {
    graph: Arc<ReactiveGraph>,
    state: FilterState,
    options: IndexMap<String, Vec<DropdownOption>>,
    figure: Figure,
    last_unit: Option<String>,
}
impl Session {
    pub fn new(graph: Arc<ReactiveGraph>) -> Result<Self> {
        let update = graph.fire(None, &FilterState::new(), None)?;
        let last_unit = update.figure.unit().map(str::to_string);
        Ok(Self {
            graph,
            state: FilterState::new(),
            options: update.options,
            figure: update.figure,
            last_unit,
        })
    }
    /// Applies one dropdown change and returns what the page must redraw.
    pub fn select<I, S>(&mut self, column: &str, values: I) -> Result<Update>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.graph.check_column(column)?;
        let mut state = self.state.clone();
        state.set(column, values);
        let update = self
            .graph
            .fire(Some(column), &state, self.last_unit.as_deref())?;
        self.state = state;
        for (name, options) in &update.options {
            self.options.insert(name.clone(), options.clone());
        }
        if let Some(unit) = update.figure.unit() {
            self.last_unit = Some(unit.to_string());
        }
        self.figure = update.figure.clone();
        Ok(update)
    }
    pub fn state(&self) -> &FilterState {
        &self.state
    }
    pub fn options(&self, column: &str) -> Option<&[DropdownOption]> {
        self.options.get(column).map(Vec::as_slice)
    }
    pub fn all_options(&self) -> &IndexMap<String, Vec<DropdownOption>> {
        &self.options
    }
    pub fn figure(&self) -> &Figure {
        &self.figure
    }
    pub fn last_unit(&self) -> Option<&str> {
        self.last_unit.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnConfig;
    use crate::data_handler::{Column, TableMetadata};

    fn config() -> DashboardConfig {
        DashboardConfig {
            columns: ColumnConfig {
                filter: vec!["product".into(), "origin".into(), "year".into()],
                contributor: vec!["steam".into(), "water".into()],
            },
            ..Default::default()
        }
    }

    fn graph() -> Arc<ReactiveGraph> {
        let mut t = Table::new(TableMetadata::named("reactive"));
        t.add_column(
            "product",
            Column::text([Some("methanol"), Some("methanol"), Some("heat"), Some("heat")]),
        )
        .unwrap();
        t.add_column("origin", Column::text([Some("A"), Some("B"), Some("A"), Some("C")]))
            .unwrap();
        t.add_column(
            "year",
            Column::text([Some("2020"), Some("2030"), Some("2030"), Some("2050")]),
        )
        .unwrap();
        t.add_column("unit", Column::text([Some("kg CO2-eq"); 4])).unwrap();
        t.add_column("steam", Column::numbers([Some(1.0), Some(2.0), Some(3.0), Some(4.0)]))
            .unwrap();
        t.add_column("water", Column::numbers([Some(0.0); 4])).unwrap();
        Arc::new(ReactiveGraph::new(Arc::new(t), &config()).unwrap())
    }

    fn values(options: &[DropdownOption]) -> Vec<&str> {
        options.iter().map(|o| o.value.as_str()).collect()
    }

    #[test]
    fn graph_wiring() {
        let g = graph();
        assert_eq!(g.nodes().len(), 4);
        let deps = g.dependents(&Node::Dropdown("origin".into()));
        assert!(deps.contains(&Node::Dropdown("product".into())));
        assert!(deps.contains(&Node::Dropdown("year".into())));
        assert!(!deps.contains(&Node::Dropdown("origin".into())));
        assert!(deps.contains(&Node::Chart));
        assert!(g.dependents(&Node::Chart).is_empty());
    }

    #[test]
    fn initial_session_has_full_options_and_chart() {
        let session = Session::new(graph()).unwrap();
        assert_eq!(values(session.options("origin").unwrap()), vec!["A", "B", "C"]);
        assert_eq!(session.figure().title(), Some("Contributions"));
        assert_eq!(session.figure().data.len(), 1);
        assert_eq!(session.last_unit(), Some("kg CO2-eq"));
    }

    #[test]
    fn changed_column_keeps_its_options() {
        let mut session = Session::new(graph()).unwrap();
        let update = session.select("product", ["heat"]).unwrap();
        assert!(!update.options.contains_key("product"));
        assert_eq!(values(&update.options["origin"]), vec!["A", "C"]);
        assert_eq!(values(&update.options["year"]), vec!["2030", "2050"]);
        assert_eq!(
            values(session.options("product").unwrap()),
            vec!["heat", "methanol"]
        );
        assert_eq!(update.figure.title(), Some("per MJ heat"));
    }

    #[test]
    fn empty_selection_keeps_last_unit_and_notifies() {
        let mut session = Session::new(graph()).unwrap();
        session.select("product", ["methanol"]).unwrap();
        let update = session.select("origin", ["C"]).unwrap();
        assert!(update.figure.data.is_empty());
        assert_eq!(update.figure.unit(), Some("kg CO2-eq"));
        assert_eq!(
            update.notice.as_deref(),
            Some("No results match the selected filters.")
        );
        assert_eq!(update.figure.notice(), update.notice.as_deref());
        assert_eq!(values(&update.options["year"]), Vec::<&str>::new());
        assert_eq!(session.last_unit(), Some("kg CO2-eq"));
    }

    #[test]
    fn clearing_a_selection_widens_again() {
        let mut session = Session::new(graph()).unwrap();
        session.select("product", ["heat"]).unwrap();
        let update = session.select("product", Vec::<String>::new()).unwrap();
        assert_eq!(values(&update.options["origin"]), vec!["A", "B", "C"]);
        assert!(session.state().is_unconstrained());
    }

    #[test]
    fn unknown_columns_are_rejected() {
        let g = graph();
        let err = g.fire(Some("colour"), &FilterState::new(), None).unwrap_err();
        assert!(matches!(
            err,
            LcaViewError::Config(ConfigError::UnknownFilterColumn { .. })
        ));
        let state = FilterState::new().with("steam", ["1"]);
        assert!(g.fire(None, &state, None).is_err());
        let mut session = Session::new(g).unwrap();
        assert!(session.select("colour", ["red"]).is_err());
        assert!(session.state().is_unconstrained());
    }

    #[test]
    fn edges_are_order_independent() {
        let g = graph();
        let state = FilterState::new().with("origin", ["A"]);
        let chart_first = g.chart(&state, None).unwrap();
        let options = g.options(Some("origin"), &state).unwrap();
        let both = g.fire(Some("origin"), &state, None).unwrap();
        assert_eq!(both.figure, chart_first.figure);
        assert_eq!(both.options, options);
    }
}
