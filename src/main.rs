use anyhow::Result;
use clap::{Arg, Command};
use course_planner::{Config, PlanPipeline};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("Course Planner")
        .version("0.1.0")
        .author("TigreRoll")
        .about("Match a scraped curriculum to local videos and build a Master Plan")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (TOML)")
        )
        .arg(
            Arg::new("curriculum")
                .short('j')
                .long("curriculum")
                .value_name("FILE")
                .help("Scraped curriculum JSON")
        )
        .arg(
            Arg::new("video-dir")
                .short('d')
                .long("video-dir")
                .value_name("DIR")
                .help("Directory containing the lesson videos")
        )
        .arg(
            Arg::new("slide-dir")
                .short('s')
                .long("slide-dir")
                .value_name("DIR")
                .help("Directory containing the exported slides")
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .help("Base output directory")
        )
        .arg(
            Arg::new("course-name")
                .short('n')
                .long("course-name")
                .value_name("NAME")
                .help("Course name for output folders (defaults to the curriculum title)")
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Build the plan and print it without writing")
                .action(clap::ArgAction::SetTrue)
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue)
        )
        .get_matches();

    // Load configuration
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::load_from(&PathBuf::from(path))?,
        None => Config::load()?,
    };

    if let Some(path) = matches.get_one::<String>("curriculum") {
        config.paths.curriculum_file = PathBuf::from(path);
    }
    if let Some(dir) = matches.get_one::<String>("video-dir") {
        config.paths.video_dir = PathBuf::from(dir);
    }
    if let Some(dir) = matches.get_one::<String>("slide-dir") {
        config.paths.slide_dir = PathBuf::from(dir);
    }
    if let Some(dir) = matches.get_one::<String>("output-dir") {
        config.paths.output_dir = PathBuf::from(dir);
    }
    if let Some(name) = matches.get_one::<String>("course-name") {
        config.paths.course_name = Some(name.clone());
    }

    let verbose = matches.get_flag("verbose");
    let dry_run = matches.get_flag("dry-run");

    // Initialize logging
    let level = if verbose { "debug" } else { config.output.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("course_planner={},warn", level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if verbose {
        info!("Verbose logging enabled");
    }

    config.validate()?;
    info!("{}", config.summary());

    let pipeline = PlanPipeline::new(config).dry_run(dry_run);
    let report = match pipeline.run().await {
        Ok(report) => report,
        Err(e) => {
            error!("❌ Master plan not created: {}", e);
            return Err(e.into());
        }
    };

    info!("✅ Matched: {}/{} lessons", report.lessons_matched, report.lessons_total);
    info!("📂 Sections in plan: {}", report.sections_emitted);
    info!("🖼️ Slides used: {}", report.slides_required);
    if report.probe_failures > 0 {
        warn!("⚠️ {} of {} video files could not be probed", report.probe_failures, report.files_discovered);
    }
    if !report.unmatched_lessons.is_empty() {
        warn!("❓ {} lessons without a matching video", report.unmatched_lessons.len());
    }

    match &report.plan_path {
        Some(path) => info!("💾 Master plan: {}", path.display()),
        None => println!("{}", report.plan.to_json()?),
    }

    Ok(())
}
