//! Master Plan assembly and persistence
//!
//! The plan document is consumed by the downstream media-assembly automation;
//! its JSON field names and nesting are a fixed contract.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::OutputConfig;
use crate::curriculum::{CurriculumDocument, CurriculumSection};
use crate::error::{PlanError, Result};
use crate::matching::MatchOutcome;
use crate::slides::{SlideInventory, SlotAllocator, BLANK_SLOT_1, BLANK_SLOT_2};

/// The persisted editing plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MasterPlan {
    pub course_title: String,
    pub base_video_path: PathBuf,
    pub base_slide_path: PathBuf,
    pub project_data_path: PathBuf,
    pub premiere_project_file: PathBuf,
    pub sections: Vec<PlanSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanSection {
    pub udemy_section_title: String,
    pub section_index: usize,
    pub section_intro_slide: String,
    pub lessons: Vec<PlanLesson>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanLesson {
    pub lesson_title: String,
    pub udemy_duration: String,
    pub lesson_index_in_section: usize,
    /// Only set on the first matched lesson of a section
    pub blank_slide1: Option<String>,
    pub blank_slide2: Option<String>,
    pub lesson_intro_slide: String,
    pub matched_video_file: String,
    pub lesson_outro_slide: String,
    pub global_lesson_index: usize,
}

impl MasterPlan {
    /// Emitted lessons across all sections, in plan order
    pub fn lessons(&self) -> impl Iterator<Item = &PlanLesson> {
        self.sections.iter().flat_map(|s| s.lessons.iter())
    }

    pub fn lesson_count(&self) -> usize {
        self.sections.iter().map(|s| s.lessons.len()).sum()
    }

    /// Canonical JSON representation
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Read a persisted plan back from disk
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_json(&content)
    }
}

/// Output locations derived from the course name
#[derive(Debug, Clone, PartialEq)]
pub struct PlanPaths {
    pub course_root: PathBuf,
    pub project_data_path: PathBuf,
    pub premiere_project_file: PathBuf,
    pub plan_file: PathBuf,
}

impl PlanPaths {
    pub fn new(output_dir: &Path, course_name: &str, output: &OutputConfig) -> Self {
        let folder = sanitize_name(course_name);
        let course_root = output_dir.join(&folder);
        let project_data_path = course_root.join(&output.project_data_dir);
        let premiere_project_file =
            course_root.join(format!("{}.{}", folder, output.project_file_extension));
        let plan_file = project_data_path.join(&output.plan_file_name);

        Self {
            course_root,
            project_data_path,
            premiere_project_file,
            plan_file,
        }
    }
}

/// Make a course name safe to use as a folder name
pub fn sanitize_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = replaced.trim().trim_end_matches('.').trim_end();
    if trimmed.is_empty() {
        "course".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Assembles a `MasterPlan` from validated match results
pub struct MasterPlanBuilder<'a> {
    curriculum: &'a CurriculumDocument,
    outcome: &'a MatchOutcome,
    inventory: &'a SlideInventory,
    base_video_path: PathBuf,
    base_slide_path: PathBuf,
    paths: PlanPaths,
}

impl<'a> MasterPlanBuilder<'a> {
    pub fn new(
        curriculum: &'a CurriculumDocument,
        outcome: &'a MatchOutcome,
        inventory: &'a SlideInventory,
        paths: PlanPaths,
    ) -> Self {
        Self {
            curriculum,
            outcome,
            inventory,
            base_video_path: PathBuf::new(),
            base_slide_path: PathBuf::new(),
            paths,
        }
    }

    pub fn with_sources(mut self, video_dir: &Path, slide_dir: &Path) -> Self {
        self.base_video_path = video_dir.to_path_buf();
        self.base_slide_path = slide_dir.to_path_buf();
        self
    }

    /// Walk sections and lessons in curriculum order and emit matched lessons
    pub fn build(self) -> MasterPlan {
        let mut allocator = SlotAllocator::new();
        let mut sections = Vec::new();

        for (section_index, section) in self.curriculum.sections.iter().enumerate() {
            if let Some(plan_section) = self.build_section(section_index, section, &mut allocator) {
                sections.push(plan_section);
            }
        }

        let mut global_index = 0;
        for lesson in sections.iter_mut().flat_map(|s| s.lessons.iter_mut()) {
            lesson.global_lesson_index = global_index;
            global_index += 1;
        }

        info!(
            "🗂️ Assembled master plan: {} sections, {} lessons, {} sequential slides",
            sections.len(),
            global_index,
            allocator.allocated()
        );

        MasterPlan {
            course_title: self.curriculum.course_title.clone(),
            base_video_path: self.base_video_path,
            base_slide_path: self.base_slide_path,
            project_data_path: self.paths.project_data_path,
            premiere_project_file: self.paths.premiere_project_file,
            sections,
        }
    }

    fn build_section(
        &self,
        section_index: usize,
        section: &CurriculumSection,
        allocator: &mut SlotAllocator,
    ) -> Option<PlanSection> {
        let mut section_intro_slide: Option<String> = None;
        let mut lessons = Vec::new();

        for (lesson_index, lesson) in section.lessons.iter().enumerate() {
            let Some(matched) = self.outcome.matched(section_index, lesson_index) else {
                continue;
            };

            let (blank_slide1, blank_slide2) = if section_intro_slide.is_none() {
                section_intro_slide = Some(self.inventory.resolve(allocator.next_slot()));
                (
                    Some(self.inventory.resolve(BLANK_SLOT_1)),
                    Some(self.inventory.resolve(BLANK_SLOT_2)),
                )
            } else {
                (None, None)
            };

            let lesson_intro_slide = self.inventory.resolve(allocator.next_slot());
            let lesson_outro_slide = self.inventory.resolve(allocator.next_slot());

            lessons.push(PlanLesson {
                lesson_title: lesson.lesson_title.clone(),
                udemy_duration: lesson.duration.clone(),
                lesson_index_in_section: lesson_index,
                blank_slide1,
                blank_slide2,
                lesson_intro_slide,
                matched_video_file: matched.file_name.clone(),
                lesson_outro_slide,
                global_lesson_index: 0,
            });
        }

        let section_intro_slide = section_intro_slide?;
        debug!("Section '{}': {} lessons emitted", section.section_title, lessons.len());

        Some(PlanSection {
            udemy_section_title: section.section_title.clone(),
            section_index,
            section_intro_slide,
            lessons,
        })
    }
}

/// Writes the plan to its fixed location
pub struct PlanWriter;

impl PlanWriter {
    /// Create the project data folder if needed and write the plan once
    pub async fn write(plan: &MasterPlan, plan_file: &Path) -> Result<PathBuf> {
        let json = plan.to_json()?;

        if let Some(parent) = plan_file.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| PlanError::Persist {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(plan_file, json)
            .await
            .map_err(|source| PlanError::Persist {
                path: plan_file.to_path_buf(),
                source,
            })?;

        info!("💾 Master plan saved to: {}", plan_file.display());
        Ok(plan_file.to_path_buf())
    }
}
