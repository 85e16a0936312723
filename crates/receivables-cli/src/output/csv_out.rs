use serde_json::Value;
use std::io::{self, Write};

/// Array fields written as rows, in order of preference.
const ROW_KEYS: [&str; 3] = ["records", "results", "entries"];

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    if let Err(e) = write_csv(&mut wtr, value) {
        eprintln!("CSV output error: {}", e);
    }
}

/// The ledger (or any row array) becomes the CSV body; otherwise the
/// result's scalar fields are written as field,value pairs.
fn write_csv<W: Write>(wtr: &mut csv::Writer<W>, value: &Value) -> csv::Result<()> {
    let body = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match body {
        Value::Object(map) => {
            if let Some(rows) = ROW_KEYS
                .iter()
                .find_map(|k| map.get(*k).and_then(Value::as_array))
            {
                write_array_csv(wtr, rows)?;
            } else {
                wtr.write_record(["field", "value"])?;
                for (key, val) in map {
                    wtr.write_record([key.as_str(), &format_csv_value(val)])?;
                }
            }
        }
        Value::Array(arr) => write_array_csv(wtr, arr)?,
        _ => wtr.write_record([&format_csv_value(body)])?,
    }

    wtr.flush()?;
    Ok(())
}

fn write_array_csv<W: Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            wtr.write_record([&format_csv_value(item)])?;
        }
        return Ok(());
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    wtr.write_record(&headers)?;
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                .collect();
            wtr.write_record(&row)?;
        }
    }
    Ok(())
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: &Value) -> String {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_csv(&mut wtr, value).unwrap();
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_records_become_rows() {
        let out = render(&json!({
            "result": {
                "fee_loss": "30.00",
                "records": [
                    {"installments": 12, "kind": "Flow", "net_value": "1000.00"},
                    {"installments": 12, "kind": "Advanced", "net_value": "970.00"}
                ]
            }
        }));
        assert_eq!(
            out,
            "installments,kind,net_value\n12,Flow,1000.00\n12,Advanced,970.00\n"
        );
    }

    #[test]
    fn test_scalar_result_as_field_value() {
        let out = render(&json!({"result": {"records": 3}}));
        assert_eq!(out, "field,value\nrecords,3\n");
    }
}
