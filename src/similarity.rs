use std::path::Path;
use strsim::levenshtein;

/// Edit distance between a video file name and a lesson title.
///
/// The extension is stripped from the file name and both sides are compared
/// lowercase. Only used to break ties between equally close durations.
pub fn title_distance(file_name: &str, lesson_title: &str) -> usize {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);

    levenshtein(&stem.to_lowercase(), &lesson_title.to_lowercase())
}
