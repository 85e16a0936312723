use serde_json::Value;

/// Key figures in order of interest.
const PRIORITY_KEYS: [&str; 5] = ["fee_loss", "total_net", "total_gross", "files_written", "accepted"];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

/// Heuristic: the first well-known result field that is not null, then the
/// first field of the result object.
fn minimal_line(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        if let Some(val) = PRIORITY_KEYS
            .iter()
            .filter_map(|k| map.get(*k))
            .find(|v| !v.is_null())
        {
            return format_minimal(val);
        }
        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_minimal(val));
        }
    }

    format_minimal(result_obj)
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
