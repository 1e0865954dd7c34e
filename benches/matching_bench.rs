use criterion::{black_box, criterion_group, criterion_main, Criterion};
use course_planner::{
    CurriculumDocument, CurriculumLesson, CurriculumSection, LocalVideoFile, MasterPlanBuilder,
    MatchEngine, PlanPaths, SlideInventory,
};
use course_planner::config::Config;
use std::path::{Path, PathBuf};

/// Synthetic curriculum: 40 sections x 25 lessons with spread-out durations
fn synthetic_course() -> (CurriculumDocument, Vec<LocalVideoFile>) {
    let mut sections = Vec::new();
    let mut files = Vec::new();

    for s in 0..40u64 {
        let mut lessons = Vec::new();
        for l in 0..25u64 {
            let seconds = 60 + (s * 25 + l) * 7 % 1800;
            lessons.push(CurriculumLesson {
                lesson_title: format!("Lesson {} of section {}", l, s),
                duration: format!("{}:{:02}", seconds / 60, seconds % 60),
            });
            files.push(LocalVideoFile {
                file_name: format!("{:02}-{:02} lesson {}.mp4", s, l, l),
                path: PathBuf::from(format!("/videos/{:02}-{:02}.mp4", s, l)),
                duration_seconds: seconds + (l % 2),
                probe_error: None,
            });
        }
        sections.push(CurriculumSection {
            section_title: format!("Section {}", s),
            lessons,
        });
    }

    let document = CurriculumDocument {
        course_title: "Benchmark Course".to_string(),
        sections,
    };
    (document, files)
}

/// Benchmark the greedy match engine
fn bench_match_engine(c: &mut Criterion) {
    let (document, files) = synthetic_course();
    let lessons = document.flatten();
    let engine = MatchEngine::new();

    c.bench_function("match_engine_1000_lessons", |b| {
        b.iter(|| engine.run(black_box(&lessons), black_box(files.clone())))
    });
}

/// Benchmark plan assembly from a fixed match outcome
fn bench_plan_assembly(c: &mut Criterion) {
    let (document, files) = synthetic_course();
    let outcome = MatchEngine::new().run(&document.flatten(), files);
    let inventory = SlideInventory::default();
    let output = Config::default().output;

    c.bench_function("plan_assembly_1000_lessons", |b| {
        b.iter(|| {
            let paths = PlanPaths::new(Path::new("/out"), "Benchmark Course", &output);
            MasterPlanBuilder::new(black_box(&document), &outcome, &inventory, paths).build()
        })
    });
}

criterion_group!(benches, bench_match_engine, bench_plan_assembly);
criterion_main!(benches);
