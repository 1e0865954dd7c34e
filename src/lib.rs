/// Course Planner
///
/// Pairs a scraped course curriculum with local lesson videos and turns the
/// result into a Master Plan for downstream editing automation.

pub mod config;
pub mod curriculum;
pub mod duration;
pub mod error;
pub mod handoff;
pub mod matching;
pub mod plan;
pub mod processing;
pub mod similarity;
pub mod slides;
pub mod video;

// Re-export main types for easy access
pub use crate::config::{Config, ConfigBuilder};
pub use crate::curriculum::{CurriculumDocument, CurriculumLesson, CurriculumSection, FlatLesson};
pub use crate::duration::normalize_duration;
pub use crate::error::{PlanError, Result};
pub use crate::matching::{CandidatePool, MatchEngine, MatchOutcome, MatchedPair, MATCH_TOLERANCE_SECS};
pub use crate::plan::{MasterPlan, MasterPlanBuilder, PlanLesson, PlanPaths, PlanSection, PlanWriter};
pub use crate::processing::{PipelineReport, PlanPipeline};
pub use crate::similarity::title_distance;
pub use crate::slides::{SlideAllocation, SlideInventory, SlideRequirements, SlideValidator, SlotAllocator};
pub use crate::video::{DurationProbe, FfprobeDurationProbe, LocalVideoFile, VideoDiscovery};
