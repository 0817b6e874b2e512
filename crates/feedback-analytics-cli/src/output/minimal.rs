use serde_json::{Map, Value};

use super::{cell, result_of};

/// Print only the headline answer of a computation.
///
/// Trend output prints one line per metric; everything else prints the
/// first defined field from a short priority list, falling back to the
/// first field of the result.
pub fn print_minimal(value: &Value) {
    let result = result_of(value);

    let Value::Object(map) = result else {
        println!("{}", cell(result));
        return;
    };

    if let Some(Value::Array(metrics)) = map.get("metrics") {
        for metric in metrics {
            println!("{}", metric_line(metric));
        }
        return;
    }

    println!("{}", headline(map));
}

fn headline(map: &Map<String, Value>) -> String {
    // Reports carry their verdict on the overall assessment
    if let Some(Value::Object(overall)) = map.get("overall") {
        return format!(
            "gap {} ({})",
            cell(overall.get("gap").unwrap_or(&Value::Null)),
            cell(overall.get("alignment").unwrap_or(&Value::Null))
        );
    }

    let priority_keys = ["alignment", "percentile", "status", "clamped_values"];
    for key in &priority_keys {
        if let Some(val) = map.get(*key) {
            if !val.is_null() {
                return cell(val);
            }
        }
    }

    match map.iter().next() {
        Some((key, val)) => format!("{}: {}", key, cell(val)),
        None => String::new(),
    }
}

fn metric_line(metric: &Value) -> String {
    let field = |k: &str| cell(metric.get(k).unwrap_or(&Value::Null));
    format!("{}: {} ({}%, {})", field("label"), field("value"), field("change_pct"), field("trend"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn overall_verdict_for_reports() {
        let map = json!({"overall": {"gap": "-0.75", "alignment": "aligned"}});
        assert_eq!(headline(map.as_object().unwrap()), "gap -0.75 (aligned)");
    }

    #[test]
    fn undefined_percentile_falls_through() {
        let map = json!({"available": false, "percentile": null, "status": "insufficient_data"});
        assert_eq!(headline(map.as_object().unwrap()), "insufficient_data");
    }

    #[test]
    fn metric_line_format() {
        let m = json!({
            "label": "Completion Rate",
            "value": "50",
            "change_pct": "100",
            "trend": "up"
        });
        assert_eq!(metric_line(&m), "Completion Rate: 50 (100%, up)");
    }
}
