use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single catalog row, e.g. "Computer Science" in "Engineering" after "12th".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
    #[serde(rename = "Course")]
    pub course_name: String,
    #[serde(rename = "Field")]
    pub field: String,
    /// Qualification required to enrol, compared case-insensitively.
    #[serde(rename = "Minimum_Qualification")]
    pub minimum_qualification: String,
}

impl CourseRecord {
    /// Text embedded for this course.
    pub fn summary_text(&self) -> String {
        format!("Course: {} | Field: {}", self.course_name, self.field)
    }

    pub fn accepts(&self, qualification: &str) -> bool {
        self.minimum_qualification.to_lowercase() == qualification.to_lowercase()
    }
}

/// What the user told us: a free-text interest and their current qualification.
#[derive(Debug, Clone)]
pub struct UserQuery {
    pub interest_text: String,
    pub qualification: String,
}

/// Outcome of semantic matching over the qualification-filtered catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub selected_course: String,
    /// One score per filtered candidate, in filtered catalog order.
    pub similarity_scores: Vec<f32>,
}

/// Payload returned to callers of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecommendationPayload {
    pub recommended_course: String,
    /// The recommended course first, then whatever related courses the LLM suggested.
    pub related_courses: Vec<String>,
    /// Roadmap as a nested mapping; `{}` when the LLM gave nothing usable.
    pub roadmap: serde_json::Value,
    /// Where the rendered roadmap was written.
    pub artifact_path: String,
}
