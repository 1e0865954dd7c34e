use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::config::Config;
use crate::curriculum::CurriculumDocument;
use crate::error::Result;
use crate::handoff::DownstreamHandoff;
use crate::matching::MatchEngine;
use crate::plan::{MasterPlan, MasterPlanBuilder, PlanPaths, PlanWriter};
use crate::slides::{SlideRequirements, SlideValidator};
use crate::video::{probe_all, DurationProbe, FfprobeDurationProbe, VideoDiscovery};

/// Summary of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub files_discovered: usize,
    pub probe_failures: usize,
    pub lessons_total: usize,
    pub lessons_matched: usize,
    pub unmatched_lessons: Vec<String>,
    pub sections_emitted: usize,
    pub slides_required: usize,
    pub plan: MasterPlan,
    /// Where the plan was written; `None` on a dry run
    pub plan_path: Option<PathBuf>,
    pub handed_off: bool,
    pub total_time: Duration,
    pub completed_at: DateTime<Utc>,
}

/// End-to-end planning pipeline: curriculum + videos + slides -> Master Plan
pub struct PlanPipeline {
    config: Config,
    probe: Arc<dyn DurationProbe>,
    discovery: VideoDiscovery,
    dry_run: bool,
}

impl PlanPipeline {
    /// Pipeline using the configured external duration probe
    pub fn new(config: Config) -> Self {
        let probe: Arc<dyn DurationProbe> = Arc::new(FfprobeDurationProbe::new(&config.probe));
        Self::with_probe(config, probe)
    }

    pub fn with_probe(config: Config, probe: Arc<dyn DurationProbe>) -> Self {
        let discovery = VideoDiscovery::new(&config.discovery);
        Self {
            config,
            probe,
            discovery,
            dry_run: false,
        }
    }

    /// Stop after assembly without writing the plan
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the whole pipeline
    pub async fn run(&self) -> Result<PipelineReport> {
        let start_time = Instant::now();
        let paths = &self.config.paths;

        info!("🚀 Starting master plan build...");
        info!("📄 Curriculum: {}", paths.curriculum_file.display());
        info!("📁 Videos: {}", paths.video_dir.display());
        info!("🖼️ Slides: {}", paths.slide_dir.display());

        let curriculum = CurriculumDocument::load(&paths.curriculum_file).await?;
        let lessons = curriculum.flatten();

        let video_paths = self.discovery.discover_videos(&paths.video_dir)?;
        let files_discovered = video_paths.len();
        if video_paths.is_empty() {
            warn!("No videos found in {}", paths.video_dir.display());
        } else {
            info!("📹 Found {} video files", files_discovered);
        }

        // Barrier: matching starts only after every probe has settled.
        let files = probe_all(Arc::clone(&self.probe), video_paths, self.config.probe.max_concurrent).await;
        let probe_failures = files.iter().filter(|f| f.probe_error.is_some()).count();

        let outcome = MatchEngine::new().run(&lessons, files);
        for lesson in outcome.unmatched() {
            warn!("❓ Unmatched lesson: '{}' ({})", lesson.title, lesson.raw_duration);
        }

        let requirements = SlideRequirements::from_outcome(&outcome);
        info!(
            "🖼️ Slides required: {} ({} sections, {} lessons)",
            requirements.total(),
            requirements.sections_with_a_match,
            requirements.matched_lessons
        );
        let inventory = SlideValidator::new(&paths.slide_dir).validate(&requirements)?;

        let course_name = paths
            .course_name
            .clone()
            .unwrap_or_else(|| curriculum.course_title.clone());
        let plan_paths = PlanPaths::new(&paths.output_dir, &course_name, &self.config.output);
        let plan_file = plan_paths.plan_file.clone();

        let plan = MasterPlanBuilder::new(&curriculum, &outcome, &inventory, plan_paths)
            .with_sources(&paths.video_dir, &paths.slide_dir)
            .build();

        let mut handed_off = false;
        let plan_path = if self.dry_run {
            info!("🧪 Dry run: master plan not written");
            None
        } else {
            let written = PlanWriter::write(&plan, &plan_file).await?;
            if let Some(handoff) = DownstreamHandoff::from_config(&self.config.handoff) {
                handoff.trigger(&written).await?;
                handed_off = true;
            }
            Some(written)
        };

        let total_time = start_time.elapsed();
        info!("🎉 Master plan built in {:.2}s", total_time.as_secs_f64());

        Ok(PipelineReport {
            files_discovered,
            probe_failures,
            lessons_total: lessons.len(),
            lessons_matched: outcome.matched_count(),
            unmatched_lessons: outcome.unmatched().iter().map(|l| l.title.clone()).collect(),
            sections_emitted: plan.sections.len(),
            slides_required: requirements.total(),
            plan,
            plan_path,
            handed_off,
            total_time,
            completed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::error::PlanError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_curriculum_aborts_before_probing() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigBuilder::new()
            .with_curriculum_file(temp_dir.path().join("missing.json"))
            .with_video_dir(temp_dir.path().to_path_buf())
            .build();

        let result = PlanPipeline::new(config).run().await;
        assert!(matches!(result, Err(PlanError::CurriculumMissing(_))));
    }

    #[tokio::test]
    async fn test_empty_video_directory_builds_empty_plan() {
        let temp_dir = TempDir::new().unwrap();
        let curriculum = temp_dir.path().join("curriculum.json");
        tokio::fs::write(
            &curriculum,
            r#"{"courseTitle":"Empty","sections":[{"sectionTitle":"S","lessons":[{"lessonTitle":"L","duration":"1:00"}]}]}"#,
        )
        .await
        .unwrap();
        let videos = temp_dir.path().join("videos");
        tokio::fs::create_dir_all(&videos).await.unwrap();

        let config = ConfigBuilder::new()
            .with_curriculum_file(curriculum)
            .with_video_dir(videos)
            .with_slide_dir(temp_dir.path().join("no-slides"))
            .with_output_dir(temp_dir.path().join("out"))
            .build();

        let report = PlanPipeline::new(config).run().await.unwrap();
        assert_eq!(report.files_discovered, 0);
        assert_eq!(report.lessons_matched, 0);
        assert_eq!(report.slides_required, 0);
        assert!(report.plan.sections.is_empty());
        assert_eq!(report.unmatched_lessons, vec!["L".to_string()]);
        assert!(report.plan_path.unwrap().exists());
    }
}
