//! Error types for the planning pipeline

use std::path::PathBuf;

/// Number of missing slide names shown before the list is truncated
pub const MISSING_SLIDES_SHOWN: usize = 10;

/// Result type for course planner operations
pub type Result<T> = std::result::Result<T, PlanError>;

/// Error types for course planner operations
#[derive(thiserror::Error, Debug)]
pub enum PlanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Curriculum file not found: {}", .0.display())]
    CurriculumMissing(PathBuf),

    #[error("Invalid curriculum data: {0}")]
    CurriculumInvalid(String),

    #[error("Video directory not found: {}", .0.display())]
    VideoDirectoryMissing(PathBuf),

    #[error("Slide directory not found or not a directory: {}", .0.display())]
    SlideDirectoryMissing(PathBuf),

    #[error("Slide count {0} does not fit the slot numbering")]
    TooManySlides(usize),

    #[error("{total} required slide(s) missing: {}", format_missing(.missing))]
    MissingSlides { missing: Vec<String>, total: usize },

    #[error("Failed to write master plan to {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Duration probe failed for {file}: {reason}")]
    Probe { file: String, reason: String },

    #[error("Downstream hand-off failed: {0}")]
    Handoff(String),
}

impl PlanError {
    /// Build a missing-slides error from the full list of missing names
    pub fn missing_slides(missing: Vec<String>) -> Self {
        let total = missing.len();
        PlanError::MissingSlides { missing, total }
    }
}

fn format_missing(missing: &[String]) -> String {
    let mut shown = missing
        .iter()
        .take(MISSING_SLIDES_SHOWN)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    if missing.len() > MISSING_SLIDES_SHOWN {
        shown.push_str(&format!(", ... and {} more", missing.len() - MISSING_SLIDES_SHOWN));
    }
    shown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_slides_short_list() {
        let err = PlanError::missing_slides(vec!["Slide7.tiff (or .tif)".to_string()]);
        assert_eq!(
            err.to_string(),
            "1 required slide(s) missing: Slide7.tiff (or .tif)"
        );
    }

    #[test]
    fn test_missing_slides_truncated() {
        let missing: Vec<String> = (1..=13).map(|n| format!("Slide{}.tiff (or .tif)", n)).collect();
        let message = PlanError::missing_slides(missing).to_string();

        assert!(message.starts_with("13 required slide(s) missing: Slide1.tiff"));
        assert!(message.contains("Slide10.tiff (or .tif)"));
        assert!(!message.contains("Slide11.tiff"));
        assert!(message.ends_with("... and 3 more"));
    }
}
