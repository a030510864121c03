use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::json;
use tokio::process::Command;

use crate::config::settings::ClassifierConfig;
use crate::db::models::{ActivityOutput, ProjectType};
use crate::llm::context::ContextWindow;

/// At most this many history lines make it into the prompt; anything more
/// just burns tokens without adding signal.
const PROMPT_CONTEXT_LINES: usize = 5;

/// Outcome of one classification. `Degraded` still carries a usable output;
/// the pipeline never has to special-case a misbehaving classifier.
#[derive(Debug, Clone)]
pub enum Classification {
    Valid(ActivityOutput),
    Degraded(ActivityOutput),
}

impl Classification {
    pub fn into_output(self) -> ActivityOutput {
        match self {
            Classification::Valid(output) | Classification::Degraded(output) => output,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Classification::Degraded(_))
    }
}

#[async_trait]
pub trait Classifier {
    async fn classify(&self, screenshot: &Path, context: &ContextWindow) -> Result<Classification>;
}

/// Shells out to `mods` with the screenshot, a context-aware prompt, and the
/// output schema, then interprets whatever comes back on stdout.
pub struct ModsClassifier {
    config: ClassifierConfig,
}

impl ModsClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Classifier for ModsClassifier {
    async fn classify(&self, screenshot: &Path, context: &ContextWindow) -> Result<Classification> {
        let prompt = build_prompt(context);
        let schema = output_schema();

        let output = Command::new(&self.config.command)
            .args(["--no-cache", "-q"])
            .arg("-i")
            .arg(screenshot)
            .arg("-j")
            .arg(schema.to_string())
            .arg("-a")
            .arg(&self.config.api)
            .arg("-m")
            .arg(&self.config.model)
            .arg(&prompt)
            .output()
            .await
            .with_context(|| format!("Failed to run classifier `{}`", self.config.command))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(interpret_response(&stdout))
    }
}

/// Build the classification prompt. Line order and the five-entry history
/// cut are fixed; tests pin the exact text.
pub fn build_prompt(context: &ContextWindow) -> String {
    let mut prompt = String::from("Analyze the screenshot and describe what the user is doing.\n");

    if !context.recent_activities.is_empty() {
        prompt.push_str("\nRecent context:\n");
        for act in context.recent_activities.iter().take(PROMPT_CONTEXT_LINES) {
            prompt.push_str(&format!("- {}: {}\n", act.project_name, act.details));
        }
    }

    prompt.push_str(&format!("\nCurrent window: {}", context.current_window.title));
    prompt.push_str("\n\nProvide structured output about the current activity.");

    prompt
}

/// JSON schema descriptor handed to the external tool so it conforms its
/// response to the `ActivityOutput` shape.
pub fn output_schema() -> serde_json::Value {
    let type_values: Vec<&str> = ProjectType::ALL.iter().map(|t| t.as_str()).collect();

    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "user_activity",
            "schema": {
                "type": "object",
                "properties": {
                    "project_name": { "type": "string" },
                    "project_type": { "type": "string", "enum": type_values },
                    "details": { "type": "string" },
                    "confidence": { "type": "number", "minimum": 0.0, "maximum": 1.0 }
                },
                "required": ["project_name", "project_type", "details"]
            }
        }
    })
}

/// Parse and validate the classifier's stdout. Malformed output is a normal
/// condition here, so every failure collapses into a degraded result instead
/// of an error.
pub fn interpret_response(raw: &str) -> Classification {
    match serde_json::from_str::<ActivityOutput>(raw.trim()) {
        Ok(output) => match output.validate() {
            Ok(()) => Classification::Valid(output),
            Err(err) => Classification::Degraded(fallback_output(&err.to_string())),
        },
        Err(err) => Classification::Degraded(fallback_output(&err.to_string())),
    }
}

fn fallback_output(cause: &str) -> ActivityOutput {
    ActivityOutput {
        project_name: "unknown".to_string(),
        project_type: ProjectType::EntertainmentAndProcrastination,
        details: format!("Analysis failed: {cause}"),
        confidence: 0.0,
    }
}
