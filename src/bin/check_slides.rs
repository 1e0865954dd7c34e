use anyhow::Result;
use clap::Parser;
use course_planner::{SlideRequirements, SlideValidator};
use std::path::PathBuf;
use tracing::{info, warn};

/// Check a slide folder against the slots a plan would need
#[derive(Parser, Debug)]
#[command(name = "check-slides", version, about)]
struct Args {
    /// Directory containing the exported slides
    #[arg(short = 's', long)]
    slide_dir: PathBuf,

    /// Number of sections with at least one matched lesson
    #[arg(long, default_value_t = 0)]
    sections: usize,

    /// Number of matched lessons
    #[arg(long, default_value_t = 0)]
    lessons: usize,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("course_planner=info,check_slides=info")
        .init();

    let args = Args::parse();
    let requirements = SlideRequirements::new(args.sections, args.lessons);

    info!("🔍 Checking slides in {}", args.slide_dir.display());
    info!("   - Sequential slides needed: {}", requirements.sequential_slides_needed());
    info!("   - Total slots required: {}", requirements.total());

    let validator = SlideValidator::new(args.slide_dir);
    let inventory = validator.inventory(&requirements)?;

    for allocation in inventory.allocations() {
        if allocation.present {
            info!("   ✅ {:>3} -> {}", allocation.slot, allocation.file_name);
        } else {
            warn!("   ❌ {:>3} missing ({})", allocation.slot, allocation.file_name);
        }
    }

    if inventory.is_complete() {
        info!("🎉 All required slides are present");
        return Ok(());
    }

    inventory.ensure_complete()?;

    Ok(())
}
