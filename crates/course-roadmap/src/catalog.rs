/// In-memory course catalog loaded from CSV.
///
/// The catalog is loaded once at startup and never mutated. Rows keep file order,
/// which is also the tie-break order for matching.
use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::error::AppError;
use crate::model::CourseRecord;

#[derive(Debug, Clone, Default)]
pub struct CourseCorpus {
    records: Vec<CourseRecord>,
}

impl CourseCorpus {
    pub fn new(records: Vec<CourseRecord>) -> Self {
        Self { records }
    }

    /// Load a catalog CSV from disk.
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let file = std::fs::File::open(path).map_err(|e| {
            AppError::Catalog(format!("failed to open {}: {e}", path.display()))
        })?;
        let corpus = Self::from_reader(file)?;
        info!(path = %path.display(), courses = corpus.len(), "course catalog loaded");
        Ok(corpus)
    }

    /// Parse catalog CSV with a header row. Unknown columns are ignored.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, AppError> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        for required in ["Course", "Field", "Minimum_Qualification"] {
            if !headers.iter().any(|h| h == required) {
                return Err(AppError::Catalog(format!("missing required column '{required}'")));
            }
        }

        let mut records = Vec::new();
        for row in csv_reader.deserialize::<CourseRecord>() {
            records.push(row?);
        }
        Ok(Self::new(records))
    }

    pub fn records(&self) -> &[CourseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows whose minimum qualification equals `qualification`, ignoring case.
    pub fn filter_by_qualification(&self, qualification: &str) -> Vec<&CourseRecord> {
        self.records()
            .iter()
            .filter(|r| r.accepts(qualification))
            .collect()
    }

    /// Distinct qualifications, lowercased, in first-seen order.
    pub fn qualifications(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for record in &self.records {
            let q = record.minimum_qualification.to_lowercase();
            if !seen.contains(&q) {
                seen.push(q);
            }
        }
        seen
    }
}
