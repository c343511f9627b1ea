use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::render::OutputFormat;

const DEFAULT_MODEL: &str = "meta-llama/llama-3.3-70b-instruct";

/// Application configuration loaded explicitly from environment variables.
///
/// The catalog path has no default; everything else falls back to values that work
/// for a local run with Graphviz installed.
#[derive(Debug, Clone)]
pub struct Config {
    /// CSV catalog with `Course`, `Field`, `Minimum_Qualification` columns.
    pub catalog_path: PathBuf,
    /// Directory rendered roadmaps are written to. Created on demand.
    pub output_dir: PathBuf,
    /// Model identifier passed to the chat-completions endpoint.
    pub llm_model: String,
    pub output_format: OutputFormat,
    /// Graphviz `dot` executable.
    pub dot_binary: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `COURSE_CATALOG_PATH`: path to the course catalog CSV
    ///
    /// Optional:
    /// - `ROADMAP_OUTPUT_DIR` (default `roadmaps`)
    /// - `LLM_MODEL` (default `meta-llama/llama-3.3-70b-instruct`)
    /// - `ROADMAP_FORMAT` (default `pdf`; `dot` skips Graphviz)
    /// - `GRAPHVIZ_DOT` (default `dot`)
    pub fn from_env() -> Result<Self, AppError> {
        let catalog_path = std::env::var("COURSE_CATALOG_PATH").map_err(|_| {
            AppError::Config("COURSE_CATALOG_PATH environment variable is required".to_string())
        })?;
        let catalog_path = PathBuf::from(catalog_path);
        if !catalog_path.exists() {
            return Err(AppError::Config(format!(
                "course catalog not found at {}",
                catalog_path.display()
            )));
        }

        let output_dir = std::env::var("ROADMAP_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Path::new("roadmaps").to_path_buf());

        let llm_model = std::env::var("LLM_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let output_format = match std::env::var("ROADMAP_FORMAT") {
            Ok(raw) => OutputFormat::parse(&raw)
                .ok_or_else(|| AppError::Config(format!("unsupported ROADMAP_FORMAT: {raw}")))?,
            Err(_) => OutputFormat::Pdf,
        };

        let dot_binary = std::env::var("GRAPHVIZ_DOT").unwrap_or_else(|_| "dot".to_string());

        Ok(Self {
            catalog_path,
            output_dir,
            llm_model,
            output_format,
            dot_binary,
        })
    }
}
