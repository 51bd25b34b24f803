//! Thin CLI over [`swagger_mcp_server`]: `convert` runs the pipeline
//! once and prints a summary; `serve` starts the MCP server on stdio.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use rmcp::ServiceExt;
use tracing::info;

use swagger_mcp_server::{convert, ServerSettings, ServerState, SwaggerMcpServer};

#[derive(Parser)]
#[command(name = "swagger-mcp")]
#[command(about = "Convert an OpenAPI/Swagger document and serve it as an MCP tool surface")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Path to a JSON or YAML settings file; falls back to defaults for
    /// any key it omits.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize, categorize, and index one specification file.
    Convert {
        /// Path to the OpenAPI/Swagger document (JSON or YAML).
        file: PathBuf,
        /// Fail on the first recoverable diagnostic instead of
        /// collecting and continuing (design §2's strict mode).
        #[arg(long)]
        strict: bool,
    },
    /// Serve the MCP tool/resource surface over stdio.
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => ServerSettings::load(path)?,
        None => ServerSettings::default(),
    };
    let _logging_guard = swagger_mcp_server::logging::init(&settings.logging)?;

    match cli.command {
        Commands::Convert { file, strict } => run_convert(settings, file, strict).await,
        Commands::Serve => run_serve(settings).await,
    }
}

async fn run_convert(settings: ServerSettings, file: PathBuf, strict: bool) -> Result<(), Box<dyn std::error::Error>> {
    let state = ServerState::bootstrap(settings).await?;
    let raw_text = std::fs::read_to_string(&file)?;
    let source_file_path = file.to_str().map(str::to_string);

    let summary = convert(&state, raw_text, source_file_path, strict).await?;
    println!("converted '{}': {} endpoint(s) indexed under generation {}", summary.title, summary.endpoint_count, summary.generation);
    for warning in &summary.warnings {
        println!("warning: {warning}");
    }
    Ok(())
}

async fn run_serve(settings: ServerSettings) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(ServerState::bootstrap(settings).await?);
    let server = SwaggerMcpServer::new(state);
    let transport = rmcp::transport::io::stdio();

    info!("starting swagger-mcp-server on stdio");
    let service = server.serve(transport).await.inspect_err(|e| {
        tracing::error!(%e, "mcp serve error");
    })?;
    service.waiting().await?;
    Ok(())
}
