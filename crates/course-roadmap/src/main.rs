mod catalog;
mod config;
mod error;
mod extract;
mod graph;
mod matcher;
mod model;
mod pipeline;
mod prompts;
mod render;
mod requester;
mod roadmap;
mod server;

use std::sync::Arc;

use rmcp::{ServiceExt, transport::stdio};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use catalog::CourseCorpus;
use config::Config;
use pipeline::RoadmapPipeline;
use render::GraphvizRenderer;
use requester::LlmRequester;
use roadmap_common::embedding::Embedder;
use roadmap_common::openai::{OpenAiClient, OpenAiClientConfig};
use server::CourseRoadmapServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing to stderr (stdout is reserved for MCP JSON-RPC)
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting course-roadmap MCP server");

    let config = Config::from_env()?;
    info!(
        catalog = %config.catalog_path.display(),
        output_dir = %config.output_dir.display(),
        model = %config.llm_model,
        format = config.output_format.extension(),
        "configuration loaded"
    );

    let corpus = Arc::new(CourseCorpus::from_path(&config.catalog_path)?);
    if corpus.is_empty() {
        warn!("course catalog has no rows; every request will fail qualification matching");
    }

    let openai_config = OpenAiClientConfig::from_env();
    info!(
        base_url = %openai_config.base_url,
        timeout_ms = openai_config.default_timeout.as_millis(),
        max_retries = openai_config.max_retries,
        api_key = openai_config.api_key.is_some(),
        "chat completions client configured"
    );
    let openai = Arc::new(OpenAiClient::new(openai_config)?);

    // Loaded on the first request, not here.
    let embedder = Arc::new(Embedder::new());

    let pipeline = Arc::new(RoadmapPipeline::new(
        corpus,
        embedder,
        LlmRequester::new(openai),
        GraphvizRenderer::new(config.dot_binary.clone(), config.output_format),
        config.llm_model.clone(),
        config.output_dir.clone(),
    ));

    let server = CourseRoadmapServer::new(pipeline);

    info!("MCP server ready, serving on stdio");
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!(error = %e, "MCP server error");
    })?;

    service.waiting().await?;
    info!("MCP server shut down");
    Ok(())
}

/// `RUST_LOG` directives when set and valid, `info` otherwise.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
