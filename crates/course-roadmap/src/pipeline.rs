/// Recommendation pipeline: match a course, ask the LLM for related courses and a
/// roadmap, turn the roadmap into a graph and render it.
///
/// Only `NoCandidates` and render failures abort a run. LLM failures and malformed LLM
/// output degrade to an empty related-course list or an empty roadmap.
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::catalog::CourseCorpus;
use crate::error::AppError;
use crate::extract::{extract_list, extract_tree};
use crate::graph::build_graph;
use crate::matcher::CourseMatcher;
use crate::model::{RecommendationPayload, UserQuery};
use crate::prompts;
use crate::render::{sanitize_filename, GraphRenderer};
use crate::requester::ContentRequester;
use roadmap_common::embedding::TextEmbedder;

pub struct RoadmapPipeline<E, R, G> {
    corpus: Arc<CourseCorpus>,
    matcher: CourseMatcher<E>,
    requester: R,
    renderer: G,
    model: String,
    output_dir: PathBuf,
}

impl<E, R, G> RoadmapPipeline<E, R, G>
where
    E: TextEmbedder,
    R: ContentRequester,
    G: GraphRenderer,
{
    pub fn new(
        corpus: Arc<CourseCorpus>,
        embedder: Arc<E>,
        requester: R,
        renderer: G,
        model: impl Into<String>,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            corpus,
            matcher: CourseMatcher::new(embedder),
            requester,
            renderer,
            model: model.into(),
            output_dir,
        }
    }

    pub fn corpus(&self) -> &CourseCorpus {
        &self.corpus
    }

    pub async fn generate(&self, query: &UserQuery) -> Result<RecommendationPayload, AppError> {
        let matched = self.matcher.match_course(&self.corpus, query).await?;
        debug!(scores = ?matched.similarity_scores, "candidate similarity scores");
        let course = matched.selected_course;

        let related_raw = self
            .requester
            .request(&prompts::related_courses(&course), &self.model)
            .await;
        let related = extract_list(related_raw.as_deref());

        let roadmap_raw = self
            .requester
            .request(&prompts::roadmap(&course), &self.model)
            .await;
        let roadmap = extract_tree(roadmap_raw.as_deref());

        let graph = build_graph(&roadmap.tree);
        let (branches, list_items, scalars) = roadmap.tree.count_descendants();
        info!(
            course = %course,
            related = related.len(),
            branches,
            leaves = list_items + scalars,
            edges = graph.edges.len(),
            "roadmap graph built"
        );

        std::fs::create_dir_all(&self.output_dir).map_err(|e| {
            AppError::Render(format!(
                "cannot create output directory {}: {e}",
                self.output_dir.display()
            ))
        })?;
        let stem = self.output_dir.join(sanitize_filename(&course));
        let artifact = self
            .renderer
            .render(&graph, &format!("Roadmap for {course}"), &stem)?;

        let mut related_courses = Vec::with_capacity(related.len() + 1);
        related_courses.push(course.clone());
        related_courses.extend(related);

        Ok(RecommendationPayload {
            recommended_course: course,
            related_courses,
            roadmap: roadmap.value,
            artifact_path: artifact.display().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Mutex;

    use super::*;
    use crate::graph::RoadmapGraph;
    use crate::matcher::tests::WordBucketEmbedder;
    use crate::model::CourseRecord;
    use serde_json::json;

    /// Replies with canned text chosen by a substring of the prompt.
    struct ScriptedRequester {
        related: Option<String>,
        roadmap: Option<String>,
    }

    impl ContentRequester for ScriptedRequester {
        async fn request(&self, prompt: &str, _model: &str) -> Option<String> {
            if prompt.contains("Root key") {
                self.roadmap.clone()
            } else {
                self.related.clone()
            }
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        rendered: Mutex<Vec<(RoadmapGraph, String, PathBuf)>>,
        fail: bool,
    }

    impl GraphRenderer for RecordingRenderer {
        fn render(
            &self,
            graph: &RoadmapGraph,
            title: &str,
            output_stem: &Path,
        ) -> Result<PathBuf, AppError> {
            if self.fail {
                return Err(AppError::Render("renderer exploded".to_string()));
            }
            let path = output_stem.with_extension("pdf");
            self.rendered
                .lock()
                .unwrap()
                .push((graph.clone(), title.to_string(), path.clone()));
            Ok(path)
        }
    }

    fn corpus() -> Arc<CourseCorpus> {
        Arc::new(CourseCorpus::new(vec![CourseRecord {
            course_name: "Computer Science".to_string(),
            field: "Engineering".to_string(),
            minimum_qualification: "12th".to_string(),
        }]))
    }

    fn output_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("course-roadmap-pipeline-{name}-{}", std::process::id()))
    }

    fn pipeline(
        requester: ScriptedRequester,
        renderer: RecordingRenderer,
        dir: &Path,
    ) -> RoadmapPipeline<WordBucketEmbedder, ScriptedRequester, RecordingRenderer> {
        RoadmapPipeline::new(
            corpus(),
            Arc::new(WordBucketEmbedder),
            requester,
            renderer,
            "test-model",
            dir.to_path_buf(),
        )
    }

    fn query(qualification: &str) -> UserQuery {
        UserQuery {
            interest_text: "I like coding".to_string(),
            qualification: qualification.to_string(),
        }
    }

    #[tokio::test]
    async fn test_unreachable_llm_still_renders_empty_roadmap() {
        let dir = output_dir("offline");
        let pipeline = pipeline(
            ScriptedRequester {
                related: None,
                roadmap: None,
            },
            RecordingRenderer::default(),
            &dir,
        );

        let payload = pipeline.generate(&query("12th")).await.unwrap();
        assert_eq!(payload.recommended_course, "Computer Science");
        assert_eq!(payload.related_courses, vec!["Computer Science"]);
        assert_eq!(payload.roadmap, json!({}));
        assert_eq!(
            payload.artifact_path,
            dir.join("Computer_Science.pdf").display().to_string()
        );

        let rendered = pipeline.renderer.rendered.lock().unwrap();
        assert_eq!(rendered.len(), 1);
        assert!(rendered[0].0.is_empty());
        assert_eq!(rendered[0].1, "Roadmap for Computer Science");
        drop(rendered);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_llm_output_flows_into_payload_and_graph() {
        let dir = output_dir("online");
        let pipeline = pipeline(
            ScriptedRequester {
                related: Some("1. Software Engineering\n2. Data Science".to_string()),
                roadmap: Some(
                    "Here you go:\n{\"roadmap\": {\"Year 1\": [\"Math\", \"Physics\"]}}".to_string(),
                ),
            },
            RecordingRenderer::default(),
            &dir,
        );

        let payload = pipeline.generate(&query("12TH")).await.unwrap();
        assert_eq!(
            payload.related_courses,
            vec!["Computer Science", "Software Engineering", "Data Science"]
        );
        assert_eq!(payload.roadmap, json!({"Year 1": ["Math", "Physics"]}));

        let rendered = pipeline.renderer.rendered.lock().unwrap();
        let graph = &rendered[0].0;
        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.edges.len(), 2);
        drop(rendered);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_unknown_qualification_aborts_before_llm() {
        let dir = output_dir("nomatch");
        let pipeline = pipeline(
            ScriptedRequester {
                related: Some("[\"A\"]".to_string()),
                roadmap: None,
            },
            RecordingRenderer::default(),
            &dir,
        );

        let err = pipeline.generate(&query("PhD")).await.unwrap_err();
        assert!(matches!(err, AppError::NoCandidates { .. }));
        assert!(pipeline.renderer.rendered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_render_failure_is_fatal() {
        let dir = output_dir("renderfail");
        let pipeline = pipeline(
            ScriptedRequester {
                related: None,
                roadmap: None,
            },
            RecordingRenderer {
                fail: true,
                ..Default::default()
            },
            &dir,
        );

        let err = pipeline.generate(&query("12th")).await.unwrap_err();
        assert!(matches!(err, AppError::Render(_)));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_payload_roadmap_keeps_llm_values() {
        let dir = output_dir("values");
        let pipeline = pipeline(
            ScriptedRequester {
                related: None,
                roadmap: Some(
                    r#"{"roadmap": {"Year 1": [], "Credits": 120, "Note": null, "Done": true}}"#
                        .to_string(),
                ),
            },
            RecordingRenderer::default(),
            &dir,
        );

        let payload = pipeline.generate(&query("12th")).await.unwrap();
        assert_eq!(
            payload.roadmap,
            json!({"Year 1": [], "Credits": 120, "Note": null, "Done": true})
        );

        let rendered = pipeline.renderer.rendered.lock().unwrap();
        assert_eq!(rendered[0].0.nodes.len(), 6);
        drop(rendered);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_unusable_output_dir_is_render_failure() {
        let blocker = output_dir("blocked");
        std::fs::write(&blocker, "not a directory").unwrap();
        let pipeline = pipeline(
            ScriptedRequester {
                related: None,
                roadmap: None,
            },
            RecordingRenderer::default(),
            &blocker.join("nested"),
        );

        let err = pipeline.generate(&query("12th")).await.unwrap_err();
        assert!(matches!(err, AppError::Render(_)));
        assert!(pipeline.renderer.rendered.lock().unwrap().is_empty());
        let _ = std::fs::remove_file(&blocker);
    }
}
