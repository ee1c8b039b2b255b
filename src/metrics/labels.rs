use regex::Regex;
use std::sync::OnceLock;

/// Smallest and largest accepted effort-saved label values
pub const MIN_AI_POINTS: u32 = 1;
pub const MAX_AI_POINTS: u32 = 999;

static AI_LABEL_PATTERN: OnceLock<Regex> = OnceLock::new();

/// `AI` (any case) immediately followed by ASCII digits and nothing else
fn ai_label_pattern() -> &'static Regex {
    AI_LABEL_PATTERN.get_or_init(|| {
        Regex::new(r"^(?i:ai)([0-9]+)$").expect("AI label pattern is a valid regex")
    })
}

/// Parse a single label such as `AI3` into the points it says were saved.
///
/// Surrounding whitespace is ignored, anything else between or after the
/// prefix and the digits rejects the label. Values outside 1..=999 are rejected.
pub fn parse_ai_label(label: &str) -> Option<f64> {
    let captures = ai_label_pattern().captures(label.trim())?;
    let digits = captures.get(1)?.as_str();
    let points: u32 = digits.parse().ok()?;

    if (MIN_AI_POINTS..=MAX_AI_POINTS).contains(&points) {
        Some(f64::from(points))
    } else {
        None
    }
}

/// Extract the effort-saved value from an item's labels.
///
/// Labels are scanned in order and the first valid one wins; later matching
/// labels are ignored rather than summed.
pub fn ai_points_from_labels(labels: &[impl AsRef<str>]) -> Option<f64> {
    labels
        .iter()
        .find_map(|label| parse_ai_label(label.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_labels() {
        assert_eq!(ai_points_from_labels(&["AI5"]), Some(5.0));
        assert_eq!(ai_points_from_labels(&["ai5"]), Some(5.0));
        assert_eq!(ai_points_from_labels(&["Ai12"]), Some(12.0));
        assert_eq!(ai_points_from_labels(&["AI5 "]), Some(5.0));
        assert_eq!(ai_points_from_labels(&["  AI7"]), Some(7.0));
        assert_eq!(ai_points_from_labels(&["AI05"]), Some(5.0));
        assert_eq!(ai_points_from_labels(&["AI999"]), Some(999.0));
        assert_eq!(ai_points_from_labels(&["AI1"]), Some(1.0));
    }

    #[test]
    fn test_rejected_labels() {
        assert_eq!(ai_points_from_labels(&["AI1000"]), None);
        assert_eq!(ai_points_from_labels(&["AI0"]), None);
        assert_eq!(ai_points_from_labels(&["AI000"]), None);
        assert_eq!(ai_points_from_labels(&["AIJHS"]), None);
        assert_eq!(ai_points_from_labels(&["AI 1"]), None);
        assert_eq!(ai_points_from_labels(&["AI2121212"]), None);
        assert_eq!(ai_points_from_labels(&["AI"]), None);
        assert_eq!(ai_points_from_labels(&["AI-3"]), None);
        assert_eq!(ai_points_from_labels(&["AI3.5"]), None);
        assert_eq!(ai_points_from_labels(&["XAI3"]), None);
        assert_eq!(ai_points_from_labels(&["AI99999999999999999999999"]), None);
        assert_eq!(ai_points_from_labels(&[] as &[&str]), None);
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(ai_points_from_labels(&["AI3", "AI7"]), Some(3.0));
        assert_eq!(ai_points_from_labels(&["AI7", "AI3"]), Some(7.0));
    }

    #[test]
    fn test_scan_continues_past_rejected_labels() {
        assert_eq!(
            ai_points_from_labels(&["frontend", "AI0", "AI 2", "AI1000", "ai4", "AI9"]),
            Some(4.0)
        );
    }

    #[test]
    fn test_accepts_owned_strings() {
        let labels = vec!["backend".to_string(), "AI2".to_string()];
        assert_eq!(ai_points_from_labels(&labels), Some(2.0));
    }
}
