//! Field-level diff summaries for audit entries

use serde_json::Value;

/// Bookkeeping fields left out of summaries
const IGNORED_FIELDS: &[&str] = &["updated_at"];

/// Summarize top-level field changes between two JSON snapshots
///
/// Returns `None` when nothing but bookkeeping fields changed.
pub fn generate_diff(before: &Value, after: &Value) -> Option<String> {
    let (Value::Object(before_obj), Value::Object(after_obj)) = (before, after) else {
        return (before != after)
            .then(|| format!("{} -> {}", format_value(before), format_value(after)));
    };

    let mut changes = Vec::new();

    for (key, before_val) in before_obj {
        if IGNORED_FIELDS.contains(&key.as_str()) {
            continue;
        }
        match after_obj.get(key) {
            Some(after_val) if after_val != before_val => changes.push(format!(
                "{}: {} -> {}",
                key,
                format_value(before_val),
                format_value(after_val)
            )),
            Some(_) => {}
            None => changes.push(format!("{}: {} -> (removed)", key, format_value(before_val))),
        }
    }

    for (key, after_val) in after_obj {
        if !before_obj.contains_key(key) && !IGNORED_FIELDS.contains(&key.as_str()) {
            changes.push(format!("{}: (added) -> {}", key, format_value(after_val)));
        }
    }

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if s.chars().count() > 50 => {
            format!("\"{}...\"", s.chars().take(47).collect::<String>())
        }
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_changed_field() {
        let diff = generate_diff(
            &json!({"title": "Dishes", "completed": false}),
            &json!({"title": "Dishes", "completed": true}),
        );
        assert_eq!(diff.as_deref(), Some("completed: false -> true"));
    }

    #[test]
    fn test_added_and_removed_fields() {
        let diff = generate_diff(
            &json!({"settled_by": "mem-1"}),
            &json!({"settled_at": "2024-01-01"}),
        )
        .unwrap();
        assert!(diff.contains("settled_by: \"mem-1\" -> (removed)"));
        assert!(diff.contains("settled_at: (added) -> \"2024-01-01\""));
    }

    #[test]
    fn test_updated_at_ignored() {
        let diff = generate_diff(
            &json!({"title": "Dishes", "updated_at": "a"}),
            &json!({"title": "Dishes", "updated_at": "b"}),
        );
        assert!(diff.is_none());
    }

    #[test]
    fn test_arrays_summarized() {
        let diff = generate_diff(&json!({"payments": []}), &json!({"payments": [1, 2]}));
        assert_eq!(diff.as_deref(), Some("payments: [0 items] -> [2 items]"));
    }
}
