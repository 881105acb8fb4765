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

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lcaview::{Dashboard, DashboardConfig, ErrorReporter, FilterState, LcaViewError};
use lcaview_dashboard::{build_router, AppState};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug, Clone)]
#[command(name = "lcaview-dashboard", about = "LCA contribution dashboard")]
struct Cli {
    /// YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Dataset file, overriding `dataset.path`.
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    #[arg(long, global = true)]
    sheet: Option<String>,
    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    Serve {
        #[arg(long)]
        addr: Option<String>,
        /// Debug logging and pretty-printed responses.
        #[arg(long)]
        debug: bool,
    },
    /// Print the chart payload for a selection as JSON.
    Inspect {
        #[arg(long = "select", value_name = "COLUMN=VALUE")]
        select: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let cmd = cli.cmd.clone().unwrap_or(Command::Serve {
        addr: None,
        debug: false,
    });
    let debug = matches!(cmd, Command::Serve { debug: true, .. });
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let mut config = load_config(&cli)?;
    match cmd {
        Command::Serve { addr, debug } => {
            if let Some(addr) = addr {
                config.server.address = addr;
            }
            run_server(config, debug).await
        }
        Command::Inspect { select } => inspect(config, &select),
    }
}

fn load_config(cli: &Cli) -> Result<DashboardConfig> {
    let mut config = match &cli.config {
        Some(path) => DashboardConfig::from_yaml_file(path).map_err(report)?,
        None => DashboardConfig::default(),
    };
    if let Some(data) = &cli.data {
        config.dataset.path = data.clone();
    }
    if let Some(sheet) = &cli.sheet {
        config.dataset.sheet = sheet.clone();
    }
    Ok(config)
}

fn report(err: LcaViewError) -> anyhow::Error {
    eprint!("{}", ErrorReporter::new().report(&err));
    anyhow::Error::new(err)
}

async fn run_server(config: DashboardConfig, debug: bool) -> Result<()> {
    let addr = config
        .server
        .socket_addr()
        .map_err(|e| report(e.into()))?;
    let dashboard = Dashboard::load(config).map_err(report)?;
    let app = build_router(AppState::new(dashboard).with_pretty(debug));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let debug_enabled = debug;
    info!(%addr, debug = debug_enabled, "dashboard listening");
    axum::serve(listener, app).await?;
    Ok(())
}

fn parse_selections(pairs: &[String]) -> Result<FilterState> {
    let mut grouped: indexmap::IndexMap<String, Vec<String>> = indexmap::IndexMap::new();
    for pair in pairs {
        let (column, value) = pair
            .split_once('=')
            .with_context(|| format!("expected COLUMN=VALUE, got '{pair}'"))?;
        grouped
            .entry(column.trim().to_string())
            .or_default()
            .push(value.trim().to_string());
    }
    let mut state = FilterState::new();
    for (column, values) in grouped {
        state.set(column, values);
    }
    Ok(state)
}

fn inspect(config: DashboardConfig, select: &[String]) -> Result<()> {
    let state = parse_selections(select)?;
    let dashboard = Dashboard::load(config).map_err(report)?;
    for column in state.columns() {
        if !dashboard.config().is_filter_column(column) {
            anyhow::bail!("'{column}' is not a filter column");
        }
    }
    let payload = dashboard.payload(&state).map_err(report)?;
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
