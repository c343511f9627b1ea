/// MCP server exposing the recommendation pipeline.
///
/// Exposes two tools:
/// - `generate_roadmap`: recommend a course and render its roadmap
/// - `list_qualifications`: qualifications present in the catalog
use std::sync::Arc;

use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::model::{RecommendationPayload, UserQuery};
use crate::pipeline::RoadmapPipeline;
use crate::render::GraphvizRenderer;
use crate::requester::LlmRequester;
use roadmap_common::embedding::Embedder;

pub type DefaultPipeline = RoadmapPipeline<Embedder, LlmRequester, GraphvizRenderer>;

#[derive(Clone)]
pub struct CourseRoadmapServer {
    pipeline: Arc<DefaultPipeline>,
    tool_router: ToolRouter<CourseRoadmapServer>,
}

impl CourseRoadmapServer {
    pub fn new(pipeline: Arc<DefaultPipeline>) -> Self {
        Self {
            pipeline,
            tool_router: Self::tool_router(),
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct GenerateRoadmapParams {
    /// Free-text description of what the user enjoys or wants to study.
    interest: String,
    /// Current qualification, e.g. "12th" or "graduate". Matched case-insensitively.
    qualification: String,
}

#[derive(Debug, Serialize, JsonSchema)]
struct QualificationsResponse {
    qualifications: Vec<String>,
}

#[tool_router]
impl CourseRoadmapServer {
    #[tool(description = "Recommend the catalog course closest to the user's interests among courses open to their qualification, then generate and render a 4-year learning roadmap for it. Returns the course, related courses, the roadmap tree and the rendered file path.")]
    async fn generate_roadmap(
        &self,
        Parameters(params): Parameters<GenerateRoadmapParams>,
    ) -> Result<Json<RecommendationPayload>, String> {
        let qualification = params.qualification.trim().to_string();
        if qualification.is_empty() {
            return Err("qualification must not be empty".to_string());
        }
        let query = UserQuery {
            interest_text: params.interest,
            qualification,
        };
        info!(qualification = %query.qualification, "generate_roadmap tool invoked");

        let payload = self.pipeline.generate(&query).await.map_err(|e| {
            warn!(error = %e, "roadmap generation failed");
            e.to_string()
        })?;
        Ok(Json(payload))
    }

    #[tool(description = "List the qualifications accepted by at least one catalog course.")]
    async fn list_qualifications(&self) -> Result<Json<QualificationsResponse>, String> {
        Ok(Json(QualificationsResponse {
            qualifications: self.pipeline.corpus().qualifications(),
        }))
    }
}

#[tool_handler]
impl ServerHandler for CourseRoadmapServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "course-roadmap".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Course recommendation and roadmap server. Call list_qualifications to see \
                 which qualifications the catalog covers, then generate_roadmap with the \
                 user's interests and qualification. LLM outages degrade to an empty roadmap \
                 rather than an error; an unknown qualification is an error."
                    .to_string(),
            ),
        }
    }
}
