//! Normalization of raw Jira issue JSON into [`WorkItem`]s.
//!
//! The Agile API and the search API return issues in the same `fields` shape,
//! but story points live in whichever custom field the instance was set up
//! with. Everything here is pure so it can be tested without HTTP.

use crate::metrics::labels::ai_points_from_labels;
use crate::metrics::WorkItem;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields always requested alongside the story point candidates
pub const BASE_FIELDS: [&str; 6] = [
    "summary",
    "status",
    "issuetype",
    "created",
    "resolutiondate",
    "labels",
];

/// Which custom fields hold story points and saved effort on this instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Checked in order, first usable value wins
    pub story_point_fields: Vec<String>,
    /// Optional field holding the "story points without AI" estimate
    pub ai_points_field: Option<String>,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            story_point_fields: vec![
                "customfield_10129".to_string(),
                "customfield_10016".to_string(),
                "customfield_10020".to_string(),
                "customfield_10021".to_string(),
            ],
            ai_points_field: None,
        }
    }
}

impl FieldMapping {
    pub fn requested_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = BASE_FIELDS.iter().map(|f| f.to_string()).collect();
        for field in self.story_point_fields.iter().chain(self.ai_points_field.iter()) {
            if !fields.contains(field) {
                fields.push(field.clone());
            }
        }
        fields
    }
}

/// Read a number out of a field value; lists contribute their first element
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        Value::Array(items) => items.first().and_then(|first| match first {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }),
        _ => None,
    }
}

/// First candidate field that holds a usable number
pub fn story_points_from_fields(fields: &Value, candidates: &[String]) -> Option<f64> {
    candidates
        .iter()
        .filter_map(|field| fields.get(field))
        .filter(|value| !value.is_null())
        .find_map(numeric_value)
}

/// Labels as strings; anything else Jira might put in the array is dropped
pub fn labels_from_fields(fields: &Value) -> Vec<String> {
    fields
        .get("labels")
        .and_then(Value::as_array)
        .map(|labels| {
            labels
                .iter()
                .filter_map(|label| label.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

/// Effort saved on one issue.
///
/// An `AI<n>` label is authoritative. Without one, a configured AI estimate
/// field is compared against the story points; only a positive difference
/// counts as saved effort.
pub fn ai_points_saved(
    labels: &[String],
    story_points: Option<f64>,
    fields: &Value,
    mapping: &FieldMapping,
) -> Option<f64> {
    if let Some(points) = ai_points_from_labels(labels) {
        return Some(points);
    }

    let field = mapping.ai_points_field.as_deref()?;
    let ai_story_points = fields.get(field).and_then(numeric_value)?;
    let story_points = story_points?;
    if ai_story_points == 0.0 || story_points == 0.0 {
        return None;
    }

    Some(ai_story_points - story_points).filter(|saved| *saved > 0.0)
}

fn nested_name(fields: &Value, field: &str) -> String {
    fields
        .get(field)
        .and_then(|v| v.get("name"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn optional_string(fields: &Value, field: &str) -> Option<String> {
    fields.get(field).and_then(Value::as_str).map(String::from)
}

/// Convert one issue object (`{"key": .., "fields": {..}}`) into a work item
pub fn work_item_from_issue(issue: &Value, mapping: &FieldMapping) -> WorkItem {
    let null = Value::Null;
    let fields = issue.get("fields").unwrap_or(&null);

    let story_points = story_points_from_fields(fields, &mapping.story_point_fields);
    let labels = labels_from_fields(fields);
    let ai_points_saved = ai_points_saved(&labels, story_points, fields, mapping);

    WorkItem {
        key: issue
            .get("key")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        summary: optional_string(fields, "summary").unwrap_or_default(),
        status: nested_name(fields, "status"),
        issue_type: nested_name(fields, "issuetype"),
        story_points,
        labels,
        ai_points_saved,
        created: optional_string(fields, "created"),
        resolved: optional_string(fields, "resolutiondate"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidates() -> Vec<String> {
        FieldMapping::default().story_point_fields
    }

    #[test]
    fn test_story_points_priority_order() {
        let fields = json!({
            "customfield_10016": 8.0,
            "customfield_10129": 3,
        });
        assert_eq!(story_points_from_fields(&fields, &candidates()), Some(3.0));
    }

    #[test]
    fn test_story_points_skip_null_and_unusable_values() {
        let fields = json!({
            "customfield_10129": null,
            "customfield_10016": {"value": 5},
            "customfield_10020": [],
            "customfield_10021": "2.5",
        });
        assert_eq!(story_points_from_fields(&fields, &candidates()), Some(2.5));
    }

    #[test]
    fn test_story_points_from_list_and_absent() {
        assert_eq!(
            story_points_from_fields(&json!({"customfield_10020": [13, 5]}), &candidates()),
            Some(13.0)
        );
        assert_eq!(
            story_points_from_fields(&json!({"customfield_10020": [{"id": 1, "name": "Sprint 1"}]}), &candidates()),
            None
        );
        assert_eq!(story_points_from_fields(&json!({}), &candidates()), None);
    }

    #[test]
    fn test_zero_story_points_are_present() {
        assert_eq!(
            story_points_from_fields(&json!({"customfield_10129": 0}), &candidates()),
            Some(0.0)
        );
    }

    #[test]
    fn test_labels_drop_non_strings() {
        let fields = json!({"labels": ["AI2", 7, null, "backend"]});
        assert_eq!(labels_from_fields(&fields), vec!["AI2", "backend"]);
        assert!(labels_from_fields(&json!({})).is_empty());
    }

    #[test]
    fn test_ai_points_from_custom_field() {
        let mapping = FieldMapping {
            ai_points_field: Some("customfield_20000".to_string()),
            ..Default::default()
        };
        let fields = json!({"customfield_20000": 8});

        assert_eq!(ai_points_saved(&[], Some(5.0), &fields, &mapping), Some(3.0));
        // smaller AI estimate is not saved effort
        assert_eq!(ai_points_saved(&[], Some(10.0), &fields, &mapping), None);
        assert_eq!(ai_points_saved(&[], None, &fields, &mapping), None);
        assert_eq!(ai_points_saved(&[], Some(0.0), &fields, &mapping), None);
    }

    #[test]
    fn test_label_wins_over_custom_field() {
        let mapping = FieldMapping {
            ai_points_field: Some("customfield_20000".to_string()),
            ..Default::default()
        };
        let fields = json!({"customfield_20000": 20});
        let labels = vec!["AI2".to_string()];

        assert_eq!(ai_points_saved(&labels, Some(5.0), &fields, &mapping), Some(2.0));
        assert_eq!(ai_points_saved(&labels, None, &fields, &mapping), Some(2.0));
    }

    #[test]
    fn test_requested_fields() {
        let mapping = FieldMapping {
            ai_points_field: Some("customfield_20000".to_string()),
            ..Default::default()
        };
        let fields = mapping.requested_fields();

        assert_eq!(&fields[..6], &BASE_FIELDS.map(String::from));
        assert!(fields.contains(&"customfield_10016".to_string()));
        assert_eq!(fields.last().map(String::as_str), Some("customfield_20000"));
    }

    #[test]
    fn test_work_item_from_issue() {
        let issue = json!({
            "key": "ELECOM-12",
            "fields": {
                "summary": "Add export",
                "status": {"name": "Done"},
                "issuetype": {"name": "Bug"},
                "customfield_10129": 3.0,
                "labels": ["AI2"],
                "created": "2024-02-01T10:00:00.000+0000",
                "resolutiondate": null
            }
        });
        let item = work_item_from_issue(&issue, &FieldMapping::default());

        assert_eq!(item.key, "ELECOM-12");
        assert_eq!(item.summary, "Add export");
        assert_eq!(item.status, "Done");
        assert_eq!(item.issue_type, "Bug");
        assert_eq!(item.story_points, Some(3.0));
        assert_eq!(item.ai_points_saved, Some(2.0));
        assert_eq!(item.created.as_deref(), Some("2024-02-01T10:00:00.000+0000"));
        assert_eq!(item.resolved, None);
    }

    #[test]
    fn test_work_item_tolerates_missing_fields() {
        let item = work_item_from_issue(&json!({"key": "X-1"}), &FieldMapping::default());

        assert_eq!(item.status, "");
        assert_eq!(item.story_points, None);
        assert_eq!(item.ai_points_saved, None);
        assert!(item.labels.is_empty());
    }
}
