pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Row collections that table and CSV output render as one line per item,
/// in the order they are looked for.
const ROW_KEYS: [&str; 5] = ["metrics", "sections", "competencies", "questions", "responses"];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The `result` object of a computation envelope, or the value itself.
pub(crate) fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// First non-empty row collection in a result object.
pub(crate) fn primary_rows(result: &Map<String, Value>) -> Option<(&'static str, &Vec<Value>)> {
    ROW_KEYS.iter().find_map(|key| match result.get(*key) {
        Some(Value::Array(rows)) if !rows.is_empty() => Some((*key, rows)),
        _ => None,
    })
}

/// Scalar cell text. Undefined values print as "n/a", never as zero.
pub(crate) fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "n/a".to_string(),
        Value::Array(arr) if arr.iter().all(|v| !v.is_object()) => {
            arr.iter().map(cell).collect::<Vec<_>>().join(", ")
        }
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Column headers for a set of row objects: keys of the first row whose
/// values are not nested rows.
pub(crate) fn headers(rows: &[Value]) -> Vec<String> {
    match rows.first() {
        Some(Value::Object(first)) => first
            .iter()
            .filter(|(_, v)| !matches!(v, Value::Array(a) if a.iter().any(Value::is_object)))
            .map(|(k, _)| k.clone())
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_cells_are_not_zero() {
        assert_eq!(cell(&Value::Null), "n/a");
        assert_eq!(cell(&json!("4.5")), "4.5");
        assert_eq!(cell(&json!(["c1", "c2"])), "c1, c2");
    }

    #[test]
    fn metrics_win_over_other_rows() {
        let envelope = json!({
            "result": {
                "sections": [{"section_id": "s1"}],
                "metrics": [{"metric": "completion_rate", "value": "50"}]
            }
        });
        let result = result_of(&envelope).as_object().unwrap();
        let (key, rows) = primary_rows(result).unwrap();
        assert_eq!(key, "metrics");
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn nested_row_columns_are_skipped() {
        let rows = vec![json!({
            "section_id": "s1",
            "questions": [{"question_id": "q1"}],
            "gap": null
        })];
        assert_eq!(headers(&rows), vec!["gap".to_string(), "section_id".to_string()]);
    }
}
