use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

/// Closed set of activity categories the classifier may assign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    SystemConfiguration,
    EntertainmentAndProcrastination,
    MachineLearningResearch,
}

impl ProjectType {
    pub const ALL: [ProjectType; 3] = [
        ProjectType::SystemConfiguration,
        ProjectType::EntertainmentAndProcrastination,
        ProjectType::MachineLearningResearch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::SystemConfiguration => "system_configuration",
            ProjectType::EntertainmentAndProcrastination => "entertainment_and_procrastination",
            ProjectType::MachineLearningResearch => "machine_learning_research",
        }
    }

    /// Human-readable form for console output.
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system_configuration" => Ok(ProjectType::SystemConfiguration),
            "entertainment_and_procrastination" => Ok(ProjectType::EntertainmentAndProcrastination),
            "machine_learning_research" => Ok(ProjectType::MachineLearningResearch),
            other => bail!("unknown project type: {other}"),
        }
    }
}

/// Structured answer the external classifier is asked to produce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityOutput {
    pub project_name: String,
    pub project_type: ProjectType,
    pub details: String,
    #[serde(default)]
    pub confidence: f64,
}

impl ActivityOutput {
    /// Confidence is a probability; anything outside [0, 1] means the
    /// classifier did not honor the schema.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.confidence) {
            bail!("confidence {} out of range [0, 1]", self.confidence);
        }
        Ok(())
    }
}

/// One persisted observation. Timestamps are epoch milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: Option<i64>,
    pub timestamp: i64,
    pub window_title: String,
    pub window_class: String,
    pub project_name: String,
    pub project_type: ProjectType,
    pub details: String,
    pub confidence: f64,
    pub screenshot_path: Option<String>,
    pub context_summary: Option<String>,
}
