//! Lesson to video file matching
//!
//! Greedy, single-pass assignment: lessons are visited in curriculum order and
//! each one claims the closest remaining file within the duration tolerance.
//! Earlier lessons have first claim; earlier bindings are never revisited.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::curriculum::FlatLesson;
use crate::duration::format_seconds;
use crate::similarity::title_distance;
use crate::video::LocalVideoFile;

/// Maximum duration delta (seconds) for a lesson and a file to match
pub const MATCH_TOLERANCE_SECS: u64 = 1;

/// A lesson bound to a local file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchedPair {
    pub section_index: usize,
    pub lesson_index: usize,
    pub lesson_title: String,
    pub file_name: String,
    pub duration_delta: u64,
}

/// Pool of match candidates with exclusive claiming
#[derive(Debug)]
pub struct CandidatePool {
    candidates: Vec<LocalVideoFile>,
    claimed: Vec<bool>,
}

impl CandidatePool {
    /// Build a pool from probed files; unusable files never become candidates
    pub fn new(files: Vec<LocalVideoFile>) -> Self {
        let candidates: Vec<LocalVideoFile> = files.into_iter().filter(|f| f.is_usable()).collect();
        let claimed = vec![false; candidates.len()];
        Self { candidates, claimed }
    }

    /// Candidates that have not been claimed yet, in scan order
    pub fn available(&self) -> impl Iterator<Item = (usize, &LocalVideoFile)> {
        self.candidates
            .iter()
            .enumerate()
            .filter(move |(index, _)| !self.claimed[*index])
    }

    /// Claim a candidate. Returns `None` if it was already claimed or does not exist.
    pub fn claim(&mut self, index: usize) -> Option<&LocalVideoFile> {
        match self.claimed.get_mut(index) {
            Some(claimed) if !*claimed => {
                *claimed = true;
                self.candidates.get(index)
            }
            _ => None,
        }
    }

    pub fn get(&self, index: usize) -> Option<&LocalVideoFile> {
        self.candidates.get(index)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.claimed.iter().filter(|c| !**c).count()
    }
}

/// Result of a matching run
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    matches: HashMap<(usize, usize), MatchedPair>,
    order: Vec<(usize, usize)>,
    unmatched: Vec<FlatLesson>,
}

impl MatchOutcome {
    /// Match bound to the lesson at `(section_index, lesson_index)`
    pub fn matched(&self, section_index: usize, lesson_index: usize) -> Option<&MatchedPair> {
        self.matches.get(&(section_index, lesson_index))
    }

    /// All matches in traversal order
    pub fn pairs(&self) -> impl Iterator<Item = &MatchedPair> {
        self.order.iter().filter_map(|key| self.matches.get(key))
    }

    pub fn unmatched(&self) -> &[FlatLesson] {
        &self.unmatched
    }

    pub fn matched_count(&self) -> usize {
        self.matches.len()
    }

    /// Number of distinct sections with at least one match
    pub fn sections_with_a_match(&self) -> usize {
        let mut sections: Vec<usize> = self.matches.keys().map(|(section, _)| *section).collect();
        sections.sort_unstable();
        sections.dedup();
        sections.len()
    }
}

struct Best {
    index: usize,
    diff: u64,
    distance: Option<usize>,
}

/// Greedy duration matcher with a title tie-break
#[derive(Debug, Default)]
pub struct MatchEngine;

impl MatchEngine {
    pub fn new() -> Self {
        Self
    }

    /// Match lessons (already in traversal order) against the probed files
    pub fn run(&self, lessons: &[FlatLesson], files: Vec<LocalVideoFile>) -> MatchOutcome {
        let mut pool = CandidatePool::new(files);
        let mut outcome = MatchOutcome::default();

        info!("🔗 Matching {} lessons against {} candidate files", lessons.len(), pool.len());

        for lesson in lessons {
            let Some(best) = self.find_best(lesson, &pool) else {
                debug!(
                    "No file within {}s of '{}' ({})",
                    MATCH_TOLERANCE_SECS,
                    lesson.title,
                    format_seconds(lesson.duration_seconds)
                );
                outcome.unmatched.push(lesson.clone());
                continue;
            };

            let Some(file_name) = pool.claim(best.index).map(|file| file.file_name.clone()) else {
                outcome.unmatched.push(lesson.clone());
                continue;
            };

            if lesson.duration_seconds == 0 {
                warn!("⚠️ Lesson '{}' has no parseable duration but matched {}", lesson.title, file_name);
            }

            debug!("✅ '{}' -> {} (Δ{}s)", lesson.title, file_name, best.diff);

            let key = (lesson.section_index, lesson.lesson_index);
            outcome.order.push(key);
            outcome.matches.insert(
                key,
                MatchedPair {
                    section_index: lesson.section_index,
                    lesson_index: lesson.lesson_index,
                    lesson_title: lesson.title.clone(),
                    file_name,
                    duration_delta: best.diff,
                },
            );
        }

        info!(
            "🔗 Matched {} lessons, {} unmatched, {} files left over",
            outcome.matched_count(),
            outcome.unmatched.len(),
            pool.remaining()
        );

        outcome
    }

    /// Scan unclaimed candidates in order and pick the best one for `lesson`.
    ///
    /// Smallest duration delta wins; an equal delta goes to the smaller title
    /// edit distance; a further tie keeps the earlier candidate.
    fn find_best(&self, lesson: &FlatLesson, pool: &CandidatePool) -> Option<Best> {
        let mut best: Option<Best> = None;

        for (index, candidate) in pool.available() {
            let diff = lesson.duration_seconds.abs_diff(candidate.duration_seconds);
            if diff > MATCH_TOLERANCE_SECS {
                continue;
            }

            match &mut best {
                None => {
                    best = Some(Best {
                        index,
                        diff,
                        distance: None,
                    });
                }
                Some(current) if diff < current.diff => {
                    *current = Best {
                        index,
                        diff,
                        distance: None,
                    };
                }
                Some(current) if diff == current.diff => {
                    let current_distance = match current.distance {
                        Some(distance) => distance,
                        None => {
                            let file_name = pool.get(current.index).map(|f| f.file_name.as_str()).unwrap_or_default();
                            title_distance(file_name, &lesson.title)
                        }
                    };
                    current.distance = Some(current_distance);

                    let distance = title_distance(&candidate.file_name, &lesson.title);
                    if distance < current_distance {
                        *current = Best {
                            index,
                            diff,
                            distance: Some(distance),
                        };
                    }
                }
                Some(_) => {}
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn lesson(section_index: usize, lesson_index: usize, title: &str, seconds: u64) -> FlatLesson {
        FlatLesson {
            section_index,
            lesson_index,
            title: title.to_string(),
            raw_duration: String::new(),
            duration_seconds: seconds,
        }
    }

    fn file(name: &str, seconds: u64) -> LocalVideoFile {
        LocalVideoFile {
            file_name: name.to_string(),
            path: PathBuf::from(name),
            duration_seconds: seconds,
            probe_error: None,
        }
    }

    #[test]
    fn test_pool_claim_is_exclusive() {
        let mut pool = CandidatePool::new(vec![file("a.mp4", 10), file("b.mp4", 20)]);
        assert_eq!(pool.claim(0).map(|f| f.file_name.as_str()), Some("a.mp4"));
        assert!(pool.claim(0).is_none());
        assert!(pool.claim(5).is_none());
        assert_eq!(pool.remaining(), 1);
        assert_eq!(pool.available().map(|(i, _)| i).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_pool_excludes_unusable_files() {
        let mut broken = file("broken.mp4", 0);
        broken.probe_error = Some("probe failed".to_string());
        let pool = CandidatePool::new(vec![broken, file("zero.mp4", 0), file("ok.mp4", 5)]);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(0).unwrap().file_name, "ok.mp4");
    }

    #[test]
    fn test_basic_matching() {
        let lessons = vec![lesson(0, 0, "Welcome", 600), lesson(0, 1, "Setup", 300)];
        let outcome = MatchEngine::new().run(&lessons, vec![file("a.mp4", 600), file("b.mp4", 300)]);

        assert_eq!(outcome.matched(0, 0).unwrap().file_name, "a.mp4");
        assert_eq!(outcome.matched(0, 1).unwrap().file_name, "b.mp4");
        assert!(outcome.unmatched().is_empty());
        assert_eq!(outcome.sections_with_a_match(), 1);
    }

    #[test]
    fn test_tolerance_is_one_second() {
        let lessons = vec![lesson(0, 0, "A", 100), lesson(0, 1, "B", 200)];
        let outcome = MatchEngine::new().run(&lessons, vec![file("a.mp4", 101), file("b.mp4", 202)]);

        assert_eq!(outcome.matched(0, 0).unwrap().duration_delta, 1);
        assert!(outcome.matched(0, 1).is_none());
        assert_eq!(outcome.unmatched().len(), 1);
        assert_eq!(outcome.unmatched()[0].title, "B");
    }

    #[test]
    fn test_smaller_delta_wins() {
        let lessons = vec![lesson(0, 0, "A", 100)];
        let outcome = MatchEngine::new().run(&lessons, vec![file("x.mp4", 101), file("y.mp4", 100)]);
        assert_eq!(outcome.matched(0, 0).unwrap().file_name, "y.mp4");
    }

    #[test]
    fn test_tie_broken_by_title_distance() {
        let lessons = vec![lesson(0, 0, "Ownership Basics", 300)];
        let files = vec![file("Closures.mp4", 300), file("ownership basics.mp4", 300)];
        let outcome = MatchEngine::new().run(&lessons, files);
        assert_eq!(outcome.matched(0, 0).unwrap().file_name, "ownership basics.mp4");
    }

    #[test]
    fn test_full_tie_keeps_first_scanned() {
        let lessons = vec![lesson(0, 0, "zz", 300)];
        let files = vec![file("ab.mp4", 300), file("cd.mp4", 300)];
        let outcome = MatchEngine::new().run(&lessons, files);
        assert_eq!(outcome.matched(0, 0).unwrap().file_name, "ab.mp4");
    }

    #[test]
    fn test_earlier_lesson_has_first_claim() {
        let lessons = vec![lesson(0, 0, "First", 300), lesson(1, 0, "Second", 300)];
        let outcome = MatchEngine::new().run(&lessons, vec![file("Second.mp4", 300)]);

        assert_eq!(outcome.matched(0, 0).unwrap().file_name, "Second.mp4");
        assert!(outcome.matched(1, 0).is_none());
    }

    #[test]
    fn test_pairing_is_injective_and_within_tolerance() {
        let lessons: Vec<FlatLesson> = (0..20).map(|i| lesson(i / 5, i % 5, "L", 60 + (i as u64 % 4))).collect();
        let files: Vec<LocalVideoFile> = (0..12).map(|i| file(&format!("f{:02}.mp4", i), 60 + (i as u64 % 6))).collect();
        let durations: HashMap<String, u64> = files.iter().map(|f| (f.file_name.clone(), f.duration_seconds)).collect();

        let outcome = MatchEngine::new().run(&lessons, files);

        let mut seen = std::collections::HashSet::new();
        for pair in outcome.pairs() {
            assert!(seen.insert(pair.file_name.clone()), "file bound twice: {}", pair.file_name);
            let lesson = lessons
                .iter()
                .find(|l| l.section_index == pair.section_index && l.lesson_index == pair.lesson_index)
                .unwrap();
            assert!(lesson.duration_seconds.abs_diff(durations[&pair.file_name]) <= MATCH_TOLERANCE_SECS);
        }
        assert_eq!(outcome.matched_count() + outcome.unmatched().len(), lessons.len());
    }

    #[test]
    fn test_every_lesson_lands_in_matched_or_unmatched() {
        let lessons = vec![
            lesson(0, 0, "First", 90),
            lesson(0, 1, "Second", 90),
            lesson(1, 0, "Third", 90),
        ];
        let mut broken = file("broken.mp4", 0);
        broken.probe_error = Some("exit 1".to_string());

        let outcome = MatchEngine::new().run(&lessons, vec![broken, file("only.mp4", 90)]);

        assert_eq!(outcome.matched_count(), 1);
        assert_eq!(outcome.matched(0, 0).unwrap().file_name, "only.mp4");
        let unmatched: Vec<&str> = outcome.unmatched().iter().map(|l| l.title.as_str()).collect();
        assert_eq!(unmatched, vec!["Second", "Third"]);
        assert_eq!(outcome.matched_count() + outcome.unmatched().len(), lessons.len());
    }

    #[test]
    fn test_zero_duration_lesson_matches_one_second_file() {
        let lessons = vec![lesson(0, 0, "Unknown", 0)];
        let outcome = MatchEngine::new().run(&lessons, vec![file("blip.mp4", 1)]);
        assert_eq!(outcome.matched(0, 0).unwrap().file_name, "blip.mp4");
    }

    #[test]
    fn test_pairs_follow_traversal_order() {
        let lessons = vec![lesson(0, 0, "A", 10), lesson(0, 1, "B", 20), lesson(1, 0, "C", 30)];
        let files = vec![file("c.mp4", 30), file("b.mp4", 20), file("a.mp4", 10)];
        let outcome = MatchEngine::new().run(&lessons, files);
        let names: Vec<&str> = outcome.pairs().map(|p| p.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.mp4", "b.mp4", "c.mp4"]);
    }
}
