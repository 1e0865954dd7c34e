//! Scraped course curriculum
//!
//! The curriculum document is produced by the course scraper and is read-only
//! here. Lessons are visited in curriculum order (sections, then lessons within
//! a section); that order decides which lesson wins an ambiguous match.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::duration::normalize_duration;
use crate::error::{PlanError, Result};

/// Scraped curriculum document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurriculumDocument {
    pub course_title: String,
    pub sections: Vec<CurriculumSection>,
}

/// Ordered group of lessons under a titled heading
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurriculumSection {
    pub section_title: String,
    #[serde(default)]
    pub lessons: Vec<CurriculumLesson>,
}

/// One lesson as published by the course
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurriculumLesson {
    pub lesson_title: String,
    /// Raw published duration (`H:MM:SS`, `MM:SS` or `SS`)
    #[serde(default)]
    pub duration: String,
}

/// A lesson positioned in curriculum order with its parsed duration
#[derive(Debug, Clone, PartialEq)]
pub struct FlatLesson {
    pub section_index: usize,
    pub lesson_index: usize,
    pub title: String,
    pub raw_duration: String,
    pub duration_seconds: u64,
}

impl CurriculumDocument {
    /// Load and validate a curriculum document from disk
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(PlanError::CurriculumMissing(path.to_path_buf()));
        }

        let content = tokio::fs::read_to_string(path).await?;
        let document = Self::from_json(&content)?;

        info!(
            "📚 Loaded curriculum '{}': {} sections, {} lessons",
            document.course_title,
            document.sections.len(),
            document.lesson_count()
        );

        Ok(document)
    }

    /// Parse and validate a curriculum document
    pub fn from_json(content: &str) -> Result<Self> {
        let document: CurriculumDocument = serde_json::from_str(content)
            .map_err(|e| PlanError::CurriculumInvalid(e.to_string()))?;
        document.validate()?;
        Ok(document)
    }

    /// Check the preconditions for matching
    pub fn validate(&self) -> Result<()> {
        if self.course_title.trim().is_empty() {
            return Err(PlanError::CurriculumInvalid("courseTitle is empty".to_string()));
        }

        if self.sections.is_empty() {
            return Err(PlanError::CurriculumInvalid("curriculum has no sections".to_string()));
        }

        Ok(())
    }

    /// Total number of lessons across all sections
    pub fn lesson_count(&self) -> usize {
        self.sections.iter().map(|s| s.lessons.len()).sum()
    }

    /// Flatten into traversal order with normalized durations
    pub fn flatten(&self) -> Vec<FlatLesson> {
        let lessons: Vec<FlatLesson> = self
            .sections
            .iter()
            .enumerate()
            .flat_map(|(section_index, section)| {
                section
                    .lessons
                    .iter()
                    .enumerate()
                    .map(move |(lesson_index, lesson)| FlatLesson {
                        section_index,
                        lesson_index,
                        title: lesson.lesson_title.clone(),
                        raw_duration: lesson.duration.clone(),
                        duration_seconds: normalize_duration(&lesson.duration),
                    })
            })
            .collect();

        debug!("Flattened curriculum into {} lessons", lessons.len());
        lessons
    }
}
