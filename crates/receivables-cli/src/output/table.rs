use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => print_result(result, map),
            _ => println!("{}", scalar_table(map)),
        },
        Value::Array(arr) => println!("{}", array_table(arr)),
        _ => println!("{}", value),
    }
}

fn print_result(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    // Scalars first, then one table per array field (ledger, entries, bars).
    let scalars: Map<String, Value> = result
        .iter()
        .filter(|(_, v)| !v.is_array())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    if !scalars.is_empty() {
        println!("{}", scalar_table(&scalars));
    }

    for (key, val) in result {
        if let Value::Array(arr) = val {
            println!("\n{}:", key);
            println!("{}", array_table(arr));
        }
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn scalar_table(map: &Map<String, Value>) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    builder.build()
}

fn array_table(arr: &[Value]) -> String {
    if arr.is_empty() {
        return "(empty)".to_string();
    }

    let Some(Value::Object(first)) = arr.first() else {
        return arr.iter().map(format_value).collect::<Vec<_>>().join("\n");
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(String::as_str));
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }
    builder.build().to_string()
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array_table_has_header_and_rows() {
        let rendered = array_table(&[
            json!({"days_until_receipt": 30, "kind": "Flow"}),
            json!({"days_until_receipt": 60, "kind": "Advanced"}),
        ]);
        assert!(rendered.contains("days_until_receipt"));
        assert!(rendered.contains("Advanced"));
        assert_eq!(rendered.lines().filter(|l| l.contains("Flow")).count(), 1);
    }

    #[test]
    fn test_empty_array_table() {
        assert_eq!(array_table(&[]), "(empty)");
    }

    #[test]
    fn test_format_nested_values() {
        assert_eq!(format_value(&json!([12, 0.25])), "12, 0.25");
        assert_eq!(format_value(&Value::Null), "null");
    }
}
