/// Qualification-filtered semantic course matching.
///
/// Filters the catalog by qualification, embeds the candidates' summary text and the
/// user's interest with the same embedder, and picks the candidate with the highest
/// cosine similarity. Ties go to the earliest candidate in catalog order.
use std::sync::Arc;

use tracing::{debug, info};

use crate::catalog::CourseCorpus;
use crate::error::AppError;
use crate::model::{MatchResult, UserQuery};
use roadmap_common::embedding::{cosine_similarity, TextEmbedder};
use roadmap_common::error::CommonError;

pub struct CourseMatcher<E> {
    embedder: Arc<E>,
}

impl<E: TextEmbedder> CourseMatcher<E> {
    pub fn new(embedder: Arc<E>) -> Self {
        Self { embedder }
    }

    pub async fn match_course(
        &self,
        corpus: &CourseCorpus,
        query: &UserQuery,
    ) -> Result<MatchResult, AppError> {
        let candidates = corpus.filter_by_qualification(&query.qualification);
        if candidates.is_empty() {
            return Err(AppError::NoCandidates {
                qualification: query.qualification.clone(),
            });
        }
        debug!(
            qualification = %query.qualification,
            candidates = candidates.len(),
            "qualification filter applied"
        );

        // One call for candidates and query so both go through the same model state.
        let mut texts: Vec<String> = candidates.iter().map(|r| r.summary_text()).collect();
        texts.push(query.interest_text.clone());
        let mut vectors = self.embedder.embed(texts).await?;

        let query_vector = vectors
            .pop()
            .ok_or_else(|| CommonError::Embedding("empty embedding result".to_string()))?;
        if vectors.len() != candidates.len() {
            return Err(CommonError::Embedding(format!(
                "embedding count mismatch: expected {}, got {}",
                candidates.len(),
                vectors.len()
            ))
            .into());
        }

        let similarity_scores: Vec<f32> = vectors
            .iter()
            .map(|v| cosine_similarity(&query_vector, v))
            .collect();

        let best_index = argmax_first(&similarity_scores).unwrap_or(0);
        let selected_course = candidates[best_index].course_name.clone();
        info!(
            course = %selected_course,
            score = similarity_scores[best_index],
            "best matching course selected"
        );

        Ok(MatchResult {
            selected_course,
            similarity_scores,
        })
    }
}

/// Index of the largest score; the first one wins on ties. NaN never wins.
fn argmax_first(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::CourseRecord;

    /// Deterministic bag-of-words embedder: each lowercase word bumps one of 32 buckets.
    pub(crate) struct WordBucketEmbedder;

    impl TextEmbedder for WordBucketEmbedder {
        async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, CommonError> {
            Ok(texts.iter().map(|t| word_buckets(t)).collect())
        }
    }

    /// Maps every text to the same vector, so all candidates tie.
    struct ConstantEmbedder;

    impl TextEmbedder for ConstantEmbedder {
        async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, CommonError> {
            Ok(vec![vec![1.0, 0.0]; texts.len()])
        }
    }

    fn word_buckets(text: &str) -> Vec<f32> {
        let mut v = vec![0.0_f32; 32];
        for word in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let bucket = word.bytes().fold(7u32, |h, b| h.wrapping_mul(31).wrapping_add(b as u32));
            v[(bucket % 32) as usize] += 1.0;
        }
        v
    }

    fn record(name: &str, field: &str, qualification: &str) -> CourseRecord {
        CourseRecord {
            course_name: name.to_string(),
            field: field.to_string(),
            minimum_qualification: qualification.to_string(),
        }
    }

    fn query(interest: &str, qualification: &str) -> UserQuery {
        UserQuery {
            interest_text: interest.to_string(),
            qualification: qualification.to_string(),
        }
    }

    #[test]
    fn test_argmax_first_prefers_earliest_tie() {
        assert_eq!(argmax_first(&[0.2, 0.9, 0.9, 0.1]), Some(1));
        assert_eq!(argmax_first(&[f32::NAN, -0.5]), Some(1));
        assert_eq!(argmax_first(&[]), None);
    }

    #[tokio::test]
    async fn test_no_candidates_for_unknown_qualification() {
        let corpus = CourseCorpus::new(vec![record("Computer Science", "Engineering", "12th")]);
        let matcher = CourseMatcher::new(Arc::new(WordBucketEmbedder));
        let err = matcher
            .match_course(&corpus, &query("coding", "PhD"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NoCandidates { ref qualification } if qualification == "PhD"));
    }

    #[tokio::test]
    async fn test_picks_most_similar_course() {
        let corpus = CourseCorpus::new(vec![
            record("Fine Arts", "Arts", "12th"),
            record("Computer Science", "Engineering", "12th"),
            record("Law", "Legal", "Graduate"),
        ]);
        let matcher = CourseMatcher::new(Arc::new(WordBucketEmbedder));
        let result = matcher
            .match_course(&corpus, &query("computer science and engineering", "12TH"))
            .await
            .unwrap();
        assert_eq!(result.selected_course, "Computer Science");
        assert_eq!(result.similarity_scores.len(), 2);
        assert!(result.similarity_scores[1] > result.similarity_scores[0]);
        assert!(result.similarity_scores.iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[tokio::test]
    async fn test_tied_scores_resolve_to_first_candidate() {
        let corpus = CourseCorpus::new(vec![
            record("Physics", "Science", "12th"),
            record("Chemistry", "Science", "12th"),
            record("Biology", "Science", "12th"),
        ]);
        let matcher = CourseMatcher::new(Arc::new(ConstantEmbedder));
        let result = matcher
            .match_course(&corpus, &query("science", "12th"))
            .await
            .unwrap();
        assert_eq!(result.similarity_scores, vec![1.0, 1.0, 1.0]);
        assert_eq!(result.selected_course, "Physics");
    }

    #[tokio::test]
    async fn test_match_is_deterministic() {
        let corpus = CourseCorpus::new(vec![
            record("Data Science", "Computing", "12th"),
            record("Biology", "Science", "12th"),
        ]);
        let matcher = CourseMatcher::new(Arc::new(WordBucketEmbedder));
        let q = query("I like data and computing", "12th");
        let first = matcher.match_course(&corpus, &q).await.unwrap();
        let second = matcher.match_course(&corpus, &q).await.unwrap();
        assert_eq!(first, second);
    }
}
