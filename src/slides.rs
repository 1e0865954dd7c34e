//! Slide inventory
//!
//! Slots 1 and 2 are the reserved blank slides. Sequential slots start at 3:
//! one section intro per section with a match, then an intro and an outro per
//! matched lesson.

use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{PlanError, Result};
use crate::matching::MatchOutcome;

/// First reserved blank slide
pub const BLANK_SLOT_1: u32 = 1;
/// Second reserved blank slide
pub const BLANK_SLOT_2: u32 = 2;
/// First sequentially allocated slot
pub const FIRST_SEQUENTIAL_SLOT: u32 = 3;

/// How many slides a set of match results needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideRequirements {
    pub sections_with_a_match: usize,
    pub matched_lessons: usize,
}

impl SlideRequirements {
    pub fn new(sections_with_a_match: usize, matched_lessons: usize) -> Self {
        Self {
            sections_with_a_match,
            matched_lessons,
        }
    }

    pub fn from_outcome(outcome: &MatchOutcome) -> Self {
        Self::new(outcome.sections_with_a_match(), outcome.matched_count())
    }

    /// Section intros plus lesson intro/outro pairs
    pub fn sequential_slides_needed(&self) -> usize {
        self.sections_with_a_match + self.matched_lessons * 2
    }

    /// Whether the blank slides 1 and 2 are needed
    pub fn needs_blanks(&self) -> bool {
        self.matched_lessons > 0 || self.sections_with_a_match > 0
    }

    /// Every required slot number, ascending
    pub fn required_slots(&self) -> Result<Vec<u32>> {
        if !self.needs_blanks() {
            return Ok(Vec::new());
        }

        let needed = self.sequential_slides_needed();
        let last = u32::try_from(needed)
            .ok()
            .and_then(|n| FIRST_SEQUENTIAL_SLOT.checked_add(n))
            .ok_or(PlanError::TooManySlides(needed))?;

        let mut slots = vec![BLANK_SLOT_1, BLANK_SLOT_2];
        slots.extend(FIRST_SEQUENTIAL_SLOT..last);
        Ok(slots)
    }

    /// Number of required slots, blanks included
    pub fn total(&self) -> usize {
        if self.needs_blanks() {
            2 + self.sequential_slides_needed()
        } else {
            0
        }
    }
}

/// Expected on-disk name for a slot, used when reporting missing slides
pub fn expected_slide_name(slot: u32) -> String {
    format!("Slide{}.tiff", slot)
}

fn missing_slide_label(slot: u32) -> String {
    format!("Slide{}.tiff (or .tif)", slot)
}

/// One slot and the file it resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideAllocation {
    pub slot: u32,
    pub file_name: String,
    pub present: bool,
}

/// Resolved slot to file name mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlideInventory {
    slots: BTreeMap<u32, String>,
    missing: Vec<u32>,
}

impl SlideInventory {
    /// File name for a slot, or the synthesized expected name if it was not found
    pub fn resolve(&self, slot: u32) -> String {
        self.slots
            .get(&slot)
            .cloned()
            .unwrap_or_else(|| expected_slide_name(slot))
    }

    /// Every required slot in order, present or not
    pub fn allocations(&self) -> Vec<SlideAllocation> {
        let mut allocations: Vec<SlideAllocation> = self
            .slots
            .iter()
            .map(|(slot, name)| SlideAllocation {
                slot: *slot,
                file_name: name.clone(),
                present: true,
            })
            .chain(self.missing.iter().map(|slot| SlideAllocation {
                slot: *slot,
                file_name: expected_slide_name(*slot),
                present: false,
            }))
            .collect();
        allocations.sort_by_key(|a| a.slot);
        allocations
    }

    pub fn found(&self) -> &BTreeMap<u32, String> {
        &self.slots
    }

    pub fn missing(&self) -> &[u32] {
        &self.missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Missing slots as display names
    pub fn missing_names(&self) -> Vec<String> {
        self.missing.iter().map(|slot| missing_slide_label(*slot)).collect()
    }

    /// Fail with the batched missing list if anything is missing
    pub fn ensure_complete(&self) -> Result<()> {
        if self.is_complete() {
            Ok(())
        } else {
            Err(PlanError::missing_slides(self.missing_names()))
        }
    }
}

/// Checks a slide directory for the required slot files
#[derive(Debug, Clone)]
pub struct SlideValidator {
    slide_dir: PathBuf,
    pattern: Regex,
}

impl SlideValidator {
    pub fn new(slide_dir: impl Into<PathBuf>) -> Self {
        Self {
            slide_dir: slide_dir.into(),
            pattern: Regex::new(r"(?i)^slide\s*(\d+)\.(tif|tiff)$").expect("static slide pattern"),
        }
    }

    pub fn slide_dir(&self) -> &Path {
        &self.slide_dir
    }

    /// Slot number encoded in a slide file name, if it follows the naming convention
    pub fn slot_of(&self, file_name: &str) -> Option<u32> {
        self.pattern
            .captures(file_name)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// Resolve every required slot against the slide directory.
    ///
    /// Nothing is read from disk when no slides are required.
    pub fn inventory(&self, requirements: &SlideRequirements) -> Result<SlideInventory> {
        let required = requirements.required_slots()?;
        if required.is_empty() {
            debug!("No slides required, skipping slide validation");
            return Ok(SlideInventory::default());
        }

        if !self.slide_dir.is_dir() {
            return Err(PlanError::SlideDirectoryMissing(self.slide_dir.clone()));
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(&self.slide_dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| PlanError::Io(e.into()))?;
            if entry.file_type().is_file() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        names.sort();

        let mut on_disk: BTreeMap<u32, String> = BTreeMap::new();
        for name in names {
            if let Some(slot) = self.slot_of(&name) {
                on_disk.entry(slot).or_insert(name);
            }
        }

        let mut inventory = SlideInventory::default();
        for slot in required {
            match on_disk.get(&slot) {
                Some(name) => {
                    inventory.slots.insert(slot, name.clone());
                }
                None => inventory.missing.push(slot),
            }
        }

        if inventory.is_complete() {
            info!("🖼️ All {} required slides present in {}", inventory.slots.len(), self.slide_dir.display());
        } else {
            for slot in &inventory.missing {
                warn!("   ❌ Missing slide {}", missing_slide_label(*slot));
            }
            warn!(
                "❌ {} of {} required slides missing in {}",
                inventory.missing.len(),
                requirements.total(),
                self.slide_dir.display()
            );
        }

        Ok(inventory)
    }

    /// Build the inventory and fail if any required slide is missing
    pub fn validate(&self, requirements: &SlideRequirements) -> Result<SlideInventory> {
        let inventory = self.inventory(requirements)?;
        inventory.ensure_complete()?;
        Ok(inventory)
    }
}

/// Running cursor over sequential slots, shared across the whole plan
#[derive(Debug)]
pub struct SlotAllocator {
    next: u32,
}

impl SlotAllocator {
    pub fn new() -> Self {
        Self {
            next: FIRST_SEQUENTIAL_SLOT,
        }
    }

    /// Hand out the next sequential slot
    pub fn next_slot(&mut self) -> u32 {
        let slot = self.next;
        self.next += 1;
        slot
    }

    /// Number of slots handed out so far
    pub fn allocated(&self) -> u32 {
        self.next - FIRST_SEQUENTIAL_SLOT
    }
}

impl Default for SlotAllocator {
    fn default() -> Self {
        Self::new()
    }
}
