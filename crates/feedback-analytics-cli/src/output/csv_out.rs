use serde_json::{Map, Value};
use std::io;

use super::{cell, headers, primary_rows, result_of};

/// Write the result as CSV to stdout: one line per item of the primary row
/// collection, or `field,value` pairs when there is none.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    if let Err(e) = write_csv(&mut wtr, result_of(value)) {
        eprintln!("CSV output error: {}", e);
    }
    let _ = wtr.flush();
}

fn write_csv<W: io::Write>(wtr: &mut csv::Writer<W>, result: &Value) -> csv::Result<()> {
    match result {
        Value::Object(map) => match primary_rows(map) {
            Some((_, rows)) => write_rows(wtr, rows),
            None => write_fields(wtr, map),
        },
        Value::Array(rows) => write_rows(wtr, rows),
        other => wtr.write_record([csv_cell(other)]),
    }
}

fn write_fields<W: io::Write>(
    wtr: &mut csv::Writer<W>,
    map: &Map<String, Value>,
) -> csv::Result<()> {
    wtr.write_record(["field", "value"])?;
    for (key, val) in map {
        wtr.write_record([key.as_str(), &csv_cell(val)])?;
    }
    Ok(())
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> csv::Result<()> {
    let columns = headers(rows);
    if columns.is_empty() {
        for row in rows {
            wtr.write_record([csv_cell(row)])?;
        }
        return Ok(());
    }

    wtr.write_record(&columns)?;
    for row in rows {
        if let Value::Object(map) = row {
            let record: Vec<String> = columns
                .iter()
                .map(|h| map.get(h.as_str()).map(csv_cell).unwrap_or_default())
                .collect();
            wtr.write_record(&record)?;
        }
    }
    Ok(())
}

/// Undefined values are empty cells in CSV.
fn csv_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => cell(other),
    }
}
