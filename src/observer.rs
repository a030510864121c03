use anyhow::Result;
use chrono::Utc;

use crate::capture::Capturer;
use crate::db::models::ActivityRecord;
use crate::db::store::ActivityStore;
use crate::llm::classifier::Classifier;
use crate::llm::context::{build_context, DEFAULT_CONTEXT_MINUTES};

/// Drives one observation cycle: capture the focused window, build context
/// from recent history, classify, persist, hand the record back for display.
///
/// Collaborators are injected so the pipeline can run against fakes in tests
/// and against swaymsg/grim/mods/SQLite in production.
pub struct Observer<C, A, S> {
    capture: C,
    classifier: A,
    store: S,
}

impl<C, A, S> Observer<C, A, S>
where
    C: Capturer,
    A: Classifier,
    S: ActivityStore,
{
    pub fn new(capture: C, classifier: A, store: S) -> Self {
        Self {
            capture,
            classifier,
            store,
        }
    }

    /// One capture → context → classify → persist pass.
    ///
    /// Capture and store failures propagate; a misbehaving classifier does
    /// not (it degrades inside the adapter). Context is always built from
    /// history that predates this cycle's own record.
    pub async fn run_cycle(&self) -> Result<ActivityRecord> {
        let capture = self.capture.capture().await?;

        let context = build_context(&self.store, capture.window, DEFAULT_CONTEXT_MINUTES);

        let classification = self
            .classifier
            .classify(&capture.screenshot_path, &context)
            .await?;
        if classification.is_degraded() {
            log::warn!("classifier returned unusable output, recording fallback");
        }
        let output = classification.into_output();

        let record = ActivityRecord {
            id: None,
            timestamp: Utc::now().timestamp_millis(),
            window_title: context.current_window.title.clone(),
            window_class: context.current_window.class.clone(),
            project_name: output.project_name,
            project_type: output.project_type,
            details: output.details,
            confidence: output.confidence,
            screenshot_path: Some(capture.screenshot_path.display().to_string()),
            context_summary: context.session_summary.clone(),
        };

        let id = self.store.save(&record)?;

        Ok(ActivityRecord {
            id: Some(id),
            ..record
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{Capture, Rect, WindowInfo};
    use crate::db::models::{ActivityOutput, ProjectType};
    use crate::db::store::SqliteStore;
    use crate::llm::classifier::Classification;
    use crate::llm::context::ContextWindow;
    use anyhow::bail;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};

    struct FixedCapture {
        title: &'static str,
        class: &'static str,
    }

    #[async_trait]
    impl Capturer for FixedCapture {
        async fn capture(&self) -> Result<Capture> {
            Ok(Capture {
                screenshot_path: PathBuf::from("/tmp/screenshots/shot.png"),
                window: WindowInfo {
                    title: self.title.to_string(),
                    class: self.class.to_string(),
                    rect: Rect {
                        x: 0,
                        y: 0,
                        width: 1280,
                        height: 720,
                    },
                },
            })
        }
    }

    struct BrokenCapture;

    #[async_trait]
    impl Capturer for BrokenCapture {
        async fn capture(&self) -> Result<Capture> {
            bail!("screenshot utility not found")
        }
    }

    struct FixedClassifier {
        output: ActivityOutput,
    }

    #[async_trait]
    impl Classifier for FixedClassifier {
        async fn classify(
            &self,
            _screenshot: &Path,
            _context: &ContextWindow,
        ) -> Result<Classification> {
            Ok(Classification::Valid(self.output.clone()))
        }
    }

    struct GarbageClassifier;

    #[async_trait]
    impl Classifier for GarbageClassifier {
        async fn classify(
            &self,
            _screenshot: &Path,
            _context: &ContextWindow,
        ) -> Result<Classification> {
            Ok(crate::llm::classifier::interpret_response("not json at all"))
        }
    }

    fn ml_output() -> ActivityOutput {
        ActivityOutput {
            project_name: "repo-x".to_string(),
            project_type: ProjectType::MachineLearningResearch,
            details: "writing code".to_string(),
            confidence: 0.92,
        }
    }

    #[tokio::test]
    async fn test_first_cycle_against_empty_store() {
        let observer = Observer::new(
            FixedCapture {
                title: "editor — main.go",
                class: "term",
            },
            FixedClassifier {
                output: ml_output(),
            },
            SqliteStore::in_memory().unwrap(),
        );

        let record = observer.run_cycle().await.unwrap();

        assert!(record.id.is_some());
        assert_eq!(record.window_title, "editor — main.go");
        assert_eq!(record.window_class, "term");
        assert_eq!(record.project_name, "repo-x");
        assert_eq!(record.project_type, ProjectType::MachineLearningResearch);
        assert_eq!(record.details, "writing code");
        assert_eq!(record.confidence, 0.92);
        assert_eq!(
            record.context_summary.as_deref(),
            Some("Starting new session")
        );
        assert_eq!(
            record.screenshot_path.as_deref(),
            Some("/tmp/screenshots/shot.png")
        );
    }

    #[tokio::test]
    async fn test_cycle_persists_exactly_one_record() {
        let observer = Observer::new(
            FixedCapture {
                title: "editor",
                class: "term",
            },
            FixedClassifier {
                output: ml_output(),
            },
            SqliteStore::in_memory().unwrap(),
        );

        observer.run_cycle().await.unwrap();
        let recent = observer.store.get_recent(10).unwrap();
        assert_eq!(recent.len(), 1);
    }

    #[tokio::test]
    async fn test_second_cycle_sees_only_prior_history() {
        let observer = Observer::new(
            FixedCapture {
                title: "editor",
                class: "term",
            },
            FixedClassifier {
                output: ml_output(),
            },
            SqliteStore::in_memory().unwrap(),
        );

        observer.run_cycle().await.unwrap();
        let second = observer.run_cycle().await.unwrap();

        // Context for the second cycle was built before its record existed.
        assert_eq!(
            second.context_summary.as_deref(),
            Some("Recent: repo-x (1 activities)")
        );
    }

    #[tokio::test]
    async fn test_degraded_classification_still_produces_a_record() {
        let observer = Observer::new(
            FixedCapture {
                title: "editor",
                class: "term",
            },
            GarbageClassifier,
            SqliteStore::in_memory().unwrap(),
        );

        let record = observer.run_cycle().await.unwrap();

        assert!(record.id.is_some());
        assert_eq!(record.project_name, "unknown");
        assert_eq!(
            record.project_type,
            ProjectType::EntertainmentAndProcrastination
        );
        assert!(record.details.starts_with("Analysis failed: "));
        assert_eq!(record.confidence, 0.0);
    }

    #[tokio::test]
    async fn test_capture_failure_aborts_the_cycle() {
        let store = SqliteStore::in_memory().unwrap();
        let observer = Observer::new(
            BrokenCapture,
            FixedClassifier {
                output: ml_output(),
            },
            store,
        );

        assert!(observer.run_cycle().await.is_err());
        assert!(observer.store.get_recent(10).unwrap().is_empty());
    }
}
