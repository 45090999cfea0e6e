// Exam dataset loading for mock-mode and demo deployments.
//
// The surrounding product owns problems and exams in a real database; this
// binary seeds an in-memory store from a JSON file instead so the judging
// subsystem can run standalone.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use gradex_common::store::MemoryStore;
use gradex_common::types::{Exam, ExamProblem, ExamSession, Problem};

#[derive(Debug, Deserialize)]
pub struct ExamDataset {
    #[serde(default)]
    pub problems: Vec<Problem>,
    #[serde(default)]
    pub exams: Vec<Exam>,
    #[serde(default)]
    pub exam_problems: Vec<ExamProblem>,
    #[serde(default)]
    pub sessions: Vec<ExamSession>,
}

pub struct SeedSummary {
    pub problems: usize,
    pub exams: usize,
    pub sessions: usize,
}

impl ExamDataset {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("Dataset file not found: {}", path.display());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let dataset: ExamDataset = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        for problem in &dataset.problems {
            if problem.test_cases.is_empty() {
                bail!("Problem '{}' has no test cases", problem.title);
            }
        }

        Ok(dataset)
    }

    pub fn seed(self, store: &MemoryStore) -> SeedSummary {
        let summary = SeedSummary {
            problems: self.problems.len(),
            exams: self.exams.len(),
            sessions: self.sessions.len(),
        };

        for problem in self.problems {
            store.insert_problem(problem);
        }
        for exam in self.exams {
            store.insert_exam(exam);
        }
        for row in self.exam_problems {
            store.insert_exam_problem(row);
        }
        for session in self.sessions {
            store.insert_session(session);
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sample_dataset() {
        let raw = r#"{
            "problems": [{
                "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
                "title": "Sum",
                "description": "Add the inputs.",
                "test_cases": [
                    {"input": "3 5", "expected": "8"},
                    {"input": "2 2", "expected": "4", "hidden": true}
                ]
            }],
            "exams": [{
                "id": "11e55044-10b1-426f-9247-bb680e5fe0c8",
                "title": "Screen",
                "ends_at": "2030-01-01T00:00:00Z"
            }],
            "exam_problems": [{
                "exam_id": "11e55044-10b1-426f-9247-bb680e5fe0c8",
                "problem_id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
                "points": 50,
                "order": 1
            }],
            "sessions": [{
                "id": "22e55044-10b1-426f-9247-bb680e5fe0c8",
                "exam_id": "11e55044-10b1-426f-9247-bb680e5fe0c8",
                "candidate_name": "ada",
                "status": "in_progress",
                "total_score": 0
            }]
        }"#;

        let dataset: ExamDataset = serde_json::from_str(raw).unwrap();
        assert_eq!(dataset.problems.len(), 1);
        assert!(dataset.problems[0].test_cases[1].hidden);

        let store = MemoryStore::new();
        let summary = dataset.seed(&store);
        assert_eq!(summary.problems, 1);
        assert_eq!(summary.sessions, 1);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = ExamDataset::load(Path::new("/nonexistent/dataset.json")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
