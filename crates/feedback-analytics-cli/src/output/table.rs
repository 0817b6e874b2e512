use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{cell, headers, primary_rows, result_of};

/// Render a computation envelope as terminal tables.
///
/// Scalar result fields go in a Field/Value table; the primary row
/// collection (metrics, sections, ...) gets a table of its own.
pub fn print_table(value: &Value) {
    match result_of(value) {
        Value::Object(result) => {
            print_fields(result);
            if let Some((key, rows)) = primary_rows(result) {
                println!("\n{}:", key);
                print_rows(rows);
            }
        }
        Value::Array(rows) => print_rows(rows),
        other => println!("{}", cell(other)),
    }

    if let Value::Object(envelope) = value {
        print_footer(envelope);
    }
}

fn print_fields(result: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut any = false;
    for (key, val) in result {
        if matches!(val, Value::Array(a) if a.iter().any(Value::is_object)) {
            continue;
        }
        builder.push_record([key.as_str(), &cell(val)]);
        any = true;
    }
    if any {
        println!("{}", Table::from(builder));
    }
}

fn print_rows(rows: &[Value]) {
    let columns = headers(rows);
    if columns.is_empty() {
        for row in rows {
            println!("{}", cell(row));
        }
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(String::as_str));
    for row in rows {
        if let Value::Object(map) = row {
            builder.push_record(
                columns
                    .iter()
                    .map(|h| map.get(h.as_str()).map(cell).unwrap_or_default()),
            );
        }
    }
    println!("{}", Table::from(builder));
}

fn print_footer(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}
