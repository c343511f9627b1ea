/// Graphviz rendering of roadmap graphs.
///
/// The graph is written as DOT source (top-to-bottom layout) and either saved as-is or
/// piped through the `dot` executable to produce the requested format. Any failure to
/// produce the artifact is an `AppError::Render`.
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};

use crate::error::AppError;
use crate::graph::{NodeStyle, RoadmapGraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pdf,
    Png,
    Svg,
    /// DOT source only; Graphviz is not invoked.
    Dot,
}

impl OutputFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "png" => Some(Self::Png),
            "svg" => Some(Self::Svg),
            "dot" | "gv" => Some(Self::Dot),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Png => "png",
            Self::Svg => "svg",
            Self::Dot => "dot",
        }
    }
}

/// Turns a graph description into an artifact on disk.
pub trait GraphRenderer: Send + Sync {
    /// Render `graph` to `output_stem` plus a format extension, returning the final path.
    fn render(
        &self,
        graph: &RoadmapGraph,
        title: &str,
        output_stem: &Path,
    ) -> Result<PathBuf, AppError>;
}

pub struct GraphvizRenderer {
    dot_binary: String,
    format: OutputFormat,
}

impl GraphvizRenderer {
    pub fn new(dot_binary: impl Into<String>, format: OutputFormat) -> Self {
        Self {
            dot_binary: dot_binary.into(),
            format,
        }
    }

    fn run_dot(&self, source: &str, output: &Path) -> Result<(), AppError> {
        let mut child = Command::new(&self.dot_binary)
            .arg(format!("-T{}", self.format.extension()))
            .arg("-o")
            .arg(output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| AppError::Render(format!("failed to run {}: {e}", self.dot_binary)))?;

        child
            .stdin
            .take()
            .ok_or_else(|| AppError::Render("graphviz stdin unavailable".to_string()))?
            .write_all(source.as_bytes())
            .map_err(|e| AppError::Render(format!("failed to write DOT source: {e}")))?;

        let result = child
            .wait_with_output()
            .map_err(|e| AppError::Render(format!("graphviz did not finish: {e}")))?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(AppError::Render(format!(
                "{} exited with {}: {}",
                self.dot_binary,
                result.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

impl GraphRenderer for GraphvizRenderer {
    fn render(
        &self,
        graph: &RoadmapGraph,
        title: &str,
        output_stem: &Path,
    ) -> Result<PathBuf, AppError> {
        if graph.is_empty() {
            debug!(title, "rendering roadmap with no nodes");
        }
        let source = to_dot(graph, title);
        let mut file_name = output_stem.as_os_str().to_owned();
        file_name.push(".");
        file_name.push(self.format.extension());
        let output = PathBuf::from(file_name);

        match self.format {
            OutputFormat::Dot => std::fs::write(&output, source).map_err(|e| {
                AppError::Render(format!("failed to write {}: {e}", output.display()))
            })?,
            _ => self.run_dot(&source, &output)?,
        }

        info!(
            path = %output.display(),
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "roadmap rendered"
        );
        Ok(output)
    }
}

/// DOT source for `graph`, laid out top to bottom.
pub fn to_dot(graph: &RoadmapGraph, title: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("// {}\n", title.replace(['\r', '\n'], " ")));
    out.push_str("digraph {\n\trankdir=TB\n");
    for node in &graph.nodes {
        let (shape, style) = match node.style {
            NodeStyle::Branch => ("box", "rounded,filled"),
            NodeStyle::LeafListItem => ("box", "filled"),
            NodeStyle::LeafScalar => ("ellipse", "rounded,filled"),
        };
        out.push_str(&format!(
            "\t\"{}\" [label=\"{}\" fillcolor={} shape={} style=\"{}\"]\n",
            node.id,
            escape_label(&node.label),
            node.fill_color(),
            shape,
            style
        ));
    }
    for edge in &graph.edges {
        out.push_str(&format!("\t\"{}\" -> \"{}\"\n", edge.from_id, edge.to_id));
    }
    out.push_str("}\n");
    out
}

fn escape_label(label: &str) -> String {
    label
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "")
}

/// File-system-safe name: everything but word characters, `-` and `_` becomes `_`.
pub fn sanitize_filename(title: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let re = UNSAFE.get_or_init(|| Regex::new(r"[^\w\-_]").expect("valid regex"));
    let name = re.replace_all(title.trim(), "_").into_owned();
    if name.is_empty() {
        "roadmap".to_string()
    } else {
        name
    }
}
