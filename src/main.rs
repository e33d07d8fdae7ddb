//! CareLink MCP Server - Rust Implementation
//!
//! A Model Context Protocol (MCP) server for the CareLink EMR.
//! Serves patient search, visit history, and visit note creation tools over
//! stdio. Runs in mock mode by default when the API is not configured.

use std::sync::Arc;

use clap::Parser;

use carelink_mcp_server::config::Config;
use carelink_mcp_server::emr::service::PatientService;
use carelink_mcp_server::emr::supabase::DashboardSync;
use carelink_mcp_server::error::Result;
use carelink_mcp_server::logging;
use carelink_mcp_server::mcp::server::McpServer;
use carelink_mcp_server::mcp::tools::ToolHandler;

/// CareLink MCP Server
#[derive(Parser)]
#[command(name = "carelink-mcp-server")]
#[command(author, version, about = "CareLink MCP Server - A Model Context Protocol server for the CareLink EMR")]
struct Cli {}

#[tokio::main]
async fn main() -> Result<()> {
    let _cli = Cli::parse();

    let config = Config::from_env();
    logging::init(&config);

    if let Err(e) = config.validate() {
        tracing::error!("configuration error: {}", e);
        std::process::exit(1);
    }

    run_server(config).await?;

    Ok(())
}

async fn run_server(config: Config) -> Result<()> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        mock_mode = config.mock_mode,
        "starting CareLink MCP server"
    );

    if config.mock_mode {
        tracing::warn!("running in MOCK MODE - no real API calls will be made");
    }

    let config = Arc::new(config);
    let service = Arc::new(PatientService::new(config.clone()));
    let dashboard = Arc::new(DashboardSync::new(config.clone()));
    let tool_handler = Arc::new(ToolHandler::new(service, dashboard, config));

    let mut server = McpServer::new(tool_handler);
    server.run_stdio().await?;

    tracing::info!("stdin closed, shutting down");

    Ok(())
}
