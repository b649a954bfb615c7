//! Run summary report

use perception_decoder::{RunSummary, TimeBase};

/// Human-readable summary of a finished run
pub fn format_summary(summary: &RunSummary, time_base: TimeBase) -> String {
    let mut lines = vec![
        "═══════════════════════════════════════════════".to_string(),
        "  Run Summary".to_string(),
        "═══════════════════════════════════════════════".to_string(),
        format!(
            "  Frames:        {} ({:.2}s at {} fps)",
            summary.frames,
            time_base.time_of(summary.frames),
            time_base.frames_per_second()
        ),
        format!("  Notifications: {}", summary.notifications),
    ];

    if !summary.open_episodes.is_empty() {
        lines.push(format!(
            "  Still active:  {}",
            summary.open_episodes.join(", ")
        ));
    }
    if summary.cancelled {
        lines.push("  Run was cancelled before the end of input".to_string());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_lines() {
        let summary = RunSummary {
            frames: 61,
            notifications: 1,
            open_episodes: vec![],
            cancelled: false,
        };
        let text = format_summary(&summary, TimeBase::new(20).unwrap());

        assert!(text.contains("Frames:        61 (3.05s at 20 fps)"));
        assert!(text.contains("Notifications: 1"));
        assert!(!text.contains("Still active"));
        assert!(!text.contains("cancelled"));
    }

    #[test]
    fn test_summary_open_episodes() {
        let summary = RunSummary {
            frames: 10,
            notifications: 0,
            open_episodes: vec!["Eyes closed".to_string(), "Looking away".to_string()],
            cancelled: true,
        };
        let text = format_summary(&summary, TimeBase::new(10).unwrap());

        assert!(text.contains("Still active:  Eyes closed, Looking away"));
        assert!(text.contains("cancelled"));
    }
}
