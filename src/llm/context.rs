use crate::capture::WindowInfo;
use crate::db::models::ActivityRecord;
use crate::db::store::ActivityStore;

/// How far back a cycle looks for continuity with earlier observations.
pub const DEFAULT_CONTEXT_MINUTES: i64 = 10;

/// Everything the classifier gets to see for one cycle. Built fresh each
/// cycle and discarded afterwards.
#[derive(Debug, Clone)]
pub struct ContextWindow {
    pub recent_activities: Vec<ActivityRecord>,
    pub current_window: WindowInfo,
    pub session_summary: Option<String>,
}

/// Assemble the rolling context for one cycle. A failed store lookup is not
/// worth aborting the cycle over; the classifier just runs without history.
pub fn build_context(
    store: &impl ActivityStore,
    window: WindowInfo,
    minutes: i64,
) -> ContextWindow {
    let recent = store.get_recent(minutes).unwrap_or_else(|err| {
        log::warn!("context lookup failed, continuing without history: {err:#}");
        Vec::new()
    });

    let summary = summarize_recent(&recent);

    ContextWindow {
        recent_activities: recent,
        current_window: window,
        session_summary: Some(summary),
    }
}

/// One line of session continuity, stored on the next record: activity
/// counts per project, in the order projects were last seen.
pub fn summarize_recent(recent: &[ActivityRecord]) -> String {
    if recent.is_empty() {
        return "Starting new session".to_string();
    }

    let mut projects: Vec<(&str, usize)> = Vec::new();
    for act in recent {
        if let Some(entry) = projects.iter_mut().find(|(name, _)| *name == act.project_name) {
            entry.1 += 1;
        } else {
            projects.push((act.project_name.as_str(), 1));
        }
    }

    let parts: Vec<String> = projects
        .iter()
        .map(|(name, count)| format!("{name} ({count} activities)"))
        .collect();

    format!("Recent: {}", parts.join(", "))
}
