use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{PlanError, Result};

/// Configuration for the course planner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Input and output locations
    pub paths: PathsConfig,

    /// External duration probe settings
    pub probe: ProbeConfig,

    /// Local video discovery settings
    pub discovery: DiscoveryConfig,

    /// Output and logging settings
    pub output: OutputConfig,

    /// Downstream automation hand-off
    pub handoff: HandoffConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Scraped curriculum JSON document
    pub curriculum_file: PathBuf,

    /// Directory containing the raw lesson videos
    pub video_dir: PathBuf,

    /// Directory containing the exported slide images
    pub slide_dir: PathBuf,

    /// Base directory under which the course folder is created
    pub output_dir: PathBuf,

    /// Course name used for output folders (defaults to the curriculum title)
    pub course_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Probe executable
    pub command: String,

    /// Arguments placed before the file path
    pub args: Vec<String>,

    /// Maximum number of probe processes in flight
    pub max_concurrent: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Video file extensions considered for matching
    pub video_extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Folder under the course root holding the plan
    pub project_data_dir: String,

    /// Plan file name inside the project data folder
    pub plan_file_name: String,

    /// Extension of the editing project file
    pub project_file_extension: String,

    /// Log level
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffConfig {
    /// Run the downstream command after the plan is written
    pub enabled: bool,

    /// Downstream executable
    pub command: Option<String>,

    /// Arguments placed before the plan path
    pub args: Vec<String>,
}

impl Config {
    /// Load configuration from the first well-known path that exists.
    ///
    /// A file that exists but does not parse is an error, not a silent
    /// fallback to defaults.
    pub fn load() -> Result<Self> {
        let mut config_paths = vec![
            PathBuf::from("course-planner.toml"),
            PathBuf::from("config/course-planner.toml"),
        ];
        if let Ok(home) = std::env::var("HOME") {
            config_paths.push(PathBuf::from(home).join(".config/course-planner/config.toml"));
        }
        config_paths.push(PathBuf::from("/etc/course-planner/config.toml"));

        Self::load_first(&config_paths)
    }

    /// Load the first existing file among `paths`, or fall back to the environment
    pub fn load_first(paths: &[PathBuf]) -> Result<Self> {
        match paths.iter().find(|path| path.is_file()) {
            Some(path) => Self::load_from(path),
            None => Self::from_env(),
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&config_str)
            .map_err(|e| PlanError::Config(format!("{}: {}", path.display(), e)))?;
        tracing::info!("📄 Loaded configuration from: {}", path.display());
        Ok(config.apply_env())
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self::default().apply_env())
    }

    /// Override values with `COURSE_PLANNER_*` environment variables
    fn apply_env(mut self) -> Self {
        if let Ok(dir) = std::env::var("COURSE_PLANNER_VIDEO_DIR") {
            self.paths.video_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = std::env::var("COURSE_PLANNER_SLIDE_DIR") {
            self.paths.slide_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = std::env::var("COURSE_PLANNER_OUTPUT_DIR") {
            self.paths.output_dir = PathBuf::from(dir);
        }

        if let Ok(file) = std::env::var("COURSE_PLANNER_CURRICULUM") {
            self.paths.curriculum_file = PathBuf::from(file);
        }

        if let Ok(name) = std::env::var("COURSE_PLANNER_COURSE_NAME") {
            self.paths.course_name = Some(name);
        }

        if let Ok(command) = std::env::var("COURSE_PLANNER_PROBE_COMMAND") {
            self.probe.command = command;
        }

        if let Ok(max) = std::env::var("COURSE_PLANNER_MAX_PROBES") {
            self.probe.max_concurrent = max.parse().unwrap_or(self.probe.max_concurrent);
        }

        if let Ok(log_level) = std::env::var("COURSE_PLANNER_LOG_LEVEL") {
            self.output.log_level = log_level;
        }

        self
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)
            .map_err(|e| PlanError::Config(e.to_string()))?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.probe.command.trim().is_empty() {
            return Err(PlanError::Config("probe command must not be empty".to_string()));
        }

        if self.probe.max_concurrent == 0 {
            return Err(PlanError::Config("probe.max_concurrent must be greater than 0".to_string()));
        }

        if self.discovery.video_extensions.is_empty() {
            return Err(PlanError::Config("at least one video extension is required".to_string()));
        }

        if self.output.plan_file_name.trim().is_empty() {
            return Err(PlanError::Config("plan_file_name must not be empty".to_string()));
        }

        if self.handoff.enabled && self.handoff.command.is_none() {
            return Err(PlanError::Config("handoff is enabled but no command is set".to_string()));
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Course Planner Configuration:\n\
            - Curriculum: {}\n\
            - Video Directory: {}\n\
            - Slide Directory: {}\n\
            - Output Directory: {}\n\
            - Probe: {} (max {} concurrent)\n\
            - Video Extensions: {}\n\
            - Hand-off Enabled: {}",
            self.paths.curriculum_file.display(),
            self.paths.video_dir.display(),
            self.paths.slide_dir.display(),
            self.paths.output_dir.display(),
            self.probe.command,
            self.probe.max_concurrent,
            self.discovery.video_extensions.join(", "),
            self.handoff.enabled
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig {
                curriculum_file: PathBuf::from("curriculum.json"),
                video_dir: PathBuf::from("./videos"),
                slide_dir: PathBuf::from("./slides"),
                output_dir: PathBuf::from("./output"),
                course_name: None,
            },
            probe: ProbeConfig {
                command: "ffprobe".to_string(),
                args: vec![
                    "-v".to_string(),
                    "error".to_string(),
                    "-show_entries".to_string(),
                    "format=duration".to_string(),
                    "-of".to_string(),
                    "default=noprint_wrappers=1:nokey=1".to_string(),
                ],
                max_concurrent: num_cpus::get() * 2,
            },
            discovery: DiscoveryConfig {
                video_extensions: vec![
                    "mp4".to_string(),
                    "mov".to_string(),
                    "mkv".to_string(),
                    "avi".to_string(),
                    "m4v".to_string(),
                    "webm".to_string(),
                ],
            },
            output: OutputConfig {
                project_data_dir: "_project_data".to_string(),
                plan_file_name: "master_plan.json".to_string(),
                project_file_extension: "prproj".to_string(),
                log_level: "info".to_string(),
            },
            handoff: HandoffConfig {
                enabled: false,
                command: None,
                args: Vec::new(),
            },
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_curriculum_file(mut self, path: PathBuf) -> Self {
        self.config.paths.curriculum_file = path;
        self
    }

    pub fn with_video_dir(mut self, dir: PathBuf) -> Self {
        self.config.paths.video_dir = dir;
        self
    }

    pub fn with_slide_dir(mut self, dir: PathBuf) -> Self {
        self.config.paths.slide_dir = dir;
        self
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.config.paths.output_dir = dir;
        self
    }

    pub fn with_course_name(mut self, name: impl Into<String>) -> Self {
        self.config.paths.course_name = Some(name.into());
        self
    }

    pub fn with_max_concurrent_probes(mut self, max: usize) -> Self {
        self.config.probe.max_concurrent = max;
        self
    }

    pub fn with_handoff(mut self, command: impl Into<String>, args: Vec<String>) -> Self {
        self.config.handoff = HandoffConfig {
            enabled: true,
            command: Some(command.into()),
            args,
        };
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
