//!  Travel Buddy Trip Agent
//!
//!  Copyright (C) 2026  Mamy Ratsimbazafy
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! # Unified MCP Server Entry Point
//!
//! Supports stdio and streamable HTTP transports via subcommand.

use anyhow::{Context, Error, Result};
use clap::{Parser, Subcommand};
use rmcp::handler::server::{ServerHandler, tool::ToolRouter, wrapper::Parameters};
use rmcp::service::serve_server;
use rmcp::tool;
use rmcp::tool_router;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use travelbuddy_trip_agent::{
    AmadeusClient, DateRangeExtractor, FlightSearchGateway, GatewayConfig, to_records,
};

#[derive(Parser, Debug)]
#[command(name = "travelbuddy-mcp")]
#[command(
    author,
    version,
    about = "MCP server for travel date extraction and flight offer search"
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run MCP server over stdio (for Claude Desktop, etc.)
    Stdio,

    /// Run MCP server over HTTP
    Http {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        #[arg(long, default_value = "8080")]
        port: u16,
    },
}

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct DatesInput {
    pub text: String,
}

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct FlightsInput {
    pub from: String,
    pub to: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
}

type Gateway = FlightSearchGateway<AmadeusClient>;

#[derive(Clone)]
pub struct TravelBuddyServer {
    // startup error kept so date extraction works without credentials
    flights: Result<Arc<Gateway>, String>,
    tool_router: ToolRouter<Self>,
}

impl TravelBuddyServer {
    pub fn new(flights: Result<Arc<Gateway>, String>) -> Self {
        Self {
            flights,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl TravelBuddyServer {
    #[tool(
        name = "extract_travel_dates",
        description = "Extract a departure and return date (YYYY-MM-DD) from free text such as 'Paris from Feb 5 to Feb 12' or 'Tokyo in February'. Always returns a future range."
    )]
    async fn extract_travel_dates(&self, params: Parameters<DatesInput>) -> Result<String, String> {
        let input = params.0;
        let (range, source) = DateRangeExtractor::default().extract_with_source(&input.text);
        tracing::debug!("extract_travel_dates: {} via {:?}", range, source);
        let response = serde_json::json!({
            "depart": range.depart_str(),
            "return": range.return_str(),
            "nights": range.nights(),
            "source": format!("{:?}", source),
        });
        serde_json::to_string(&response).map_err(|e| e.to_string())
    }

    #[tool(
        name = "search_flights",
        description = "Search flight offers. Parameters: from (IATA city/airport code), to (IATA), date (YYYY-MM-DD), return_date (YYYY-MM-DD, optional). Past or inverted dates are repaired. Returns a list of {price, itineraries, raw} or a single {error, ...} record."
    )]
    async fn search_flights(&self, params: Parameters<FlightsInput>) -> Result<String, String> {
        let input = params.0;
        let gateway = self.flights.as_ref().map_err(|e| e.clone())?;

        let result = gateway
            .safe_search(
                &input.from,
                &input.to,
                &input.date,
                input.return_date.as_deref(),
            )
            .await
            .map_err(|e| format!("Flight search failed: {e:#}"))?;

        serde_json::to_string(&to_records(&result)).map_err(|e| e.to_string())
    }
}

impl ServerHandler for TravelBuddyServer {
    fn list_tools(
        &self,
        _request: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl Future<Output = Result<rmcp::model::ListToolsResult, rmcp::ErrorData>> + Send + '_
    {
        tracing::debug!(
            "list_tools called, tools count: {}",
            self.tool_router.list_all().len()
        );
        Box::pin(async move {
            let tools = self.tool_router.list_all();
            Ok(rmcp::model::ListToolsResult::with_all_items(tools))
        })
    }

    fn call_tool(
        &self,
        request: rmcp::model::CallToolRequestParam,
        context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl Future<Output = Result<rmcp::model::CallToolResult, rmcp::ErrorData>> + Send + '_
    {
        let router = self.tool_router.clone();
        let self_clone = self.clone();
        Box::pin(async move {
            let context =
                rmcp::handler::server::tool::ToolCallContext::new(&self_clone, request, context);
            router.call(context).await
        })
    }

    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            protocol_version: rmcp::model::ProtocolVersion::V_2025_03_26,
            capabilities: rmcp::model::ServerCapabilities {
                tools: Some(rmcp::model::ToolsCapability::default()),
                ..Default::default()
            },
            server_info: rmcp::model::Implementation::from_build_env(),
            instructions: None,
        }
    }
}

fn build_gateway() -> Result<Arc<Gateway>, String> {
    let config = GatewayConfig::from_env().map_err(|e| format!("{e:#}"))?;
    tracing::debug!("Gateway config: {:?}", config);
    FlightSearchGateway::from_config(config)
        .map(Arc::new)
        .map_err(|e| format!("Failed to create flight gateway: {e:#}"))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".to_string().into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_timer(tracing_subscriber::fmt::time::ChronoUtc::rfc_3339())
                .with_writer(std::io::stderr),
        )
        .init();

    let args = Args::parse();
    tracing::debug!("Parsed args: {:?}", args);

    let flights = build_gateway();
    if let Err(e) = &flights {
        tracing::warn!("Flight search disabled: {}", e);
    }

    match args.command {
        Command::Stdio => {
            eprintln!("Starting MCP server over stdio...");
            let server = TravelBuddyServer::new(flights);
            let (stdin, stdout) = rmcp::transport::io::stdio();
            let _running = serve_server(Arc::new(server), (stdin, stdout))
                .await
                .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;
            tracing::debug!("Server running. Press Ctrl+C to stop.");
            std::future::pending::<()>().await;
        }
        Command::Http { host, port } => {
            let addr: SocketAddr = format!("{}:{}", host, port)
                .parse()
                .context("Invalid host:port")?;
            tracing::info!("Starting MCP server over HTTP on {}", addr);
            let server = TravelBuddyServer::new(flights);
            let session_manager = Arc::new(LocalSessionManager::default());
            let config = StreamableHttpServerConfig {
                stateful_mode: true,
                ..Default::default()
            };
            let service =
                StreamableHttpService::new(move || Ok(server.clone()), session_manager, config);
            let app = axum::Router::new().nest_service("/mcp", service);
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .context("Failed to bind to address")?;
            tracing::debug!("Listening on {}", addr);
            axum::serve(listener, app)
                .await
                .context("HTTP server error")?;
        }
    }

    Ok(())
}
