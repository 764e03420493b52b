//! Output formatting helpers.
//!
//! Records go to stdout as one JSON object per line; status messages go to
//! stderr.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use serde_json::{Map, Value, json};

use airtab_core::{Attachment, FieldValue, FieldValues, FormulaResult};

use crate::columns::DynamicRecord;

/// Print a success message.
pub fn success(msg: &str) {
    eprintln!("{} {}", "✓".green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a value as compact JSON.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a record in the service's own layout.
pub fn record(record: &DynamicRecord, pretty: bool) -> Result<()> {
    let value = record_json(record);
    if pretty { json_pretty(&value) } else { json(&value) }
}

fn record_json(record: &DynamicRecord) -> Value {
    let mut out = Map::new();
    out.insert("id".into(), Value::String(record.id.clone()));
    if let Some(created) = record.created_time {
        out.insert("createdTime".into(), Value::String(created.to_rfc3339()));
    }
    out.insert("fields".into(), Value::Object(values_json(&record.fields.0)));
    Value::Object(out)
}

fn values_json(values: &FieldValues) -> Map<String, Value> {
    values
        .iter()
        .map(|(name, value)| (name.clone(), value_json(value)))
        .collect()
}

fn value_json(value: &FieldValue) -> Value {
    match value {
        FieldValue::Text(s) => Value::String(s.clone()),
        FieldValue::Integer(n) => Value::from(*n),
        FieldValue::Float(f) => Value::from(*f),
        FieldValue::Checkbox(b) => Value::Bool(*b),
        FieldValue::Date(d) if d.is_empty() => Value::Null,
        FieldValue::Date(d) => Value::String(d.to_string()),
        FieldValue::StringList(list) => Value::from(list.clone()),
        FieldValue::Attachments(list) => list.iter().map(attachment_json).collect(),
        FieldValue::Formula(result) => match result {
            FormulaResult::Empty => Value::Null,
            FormulaResult::Number(n) => Value::from(*n),
            FormulaResult::Text(s) => Value::String(s.clone()),
            FormulaResult::Error(code) => json!({ "error": code }),
        },
        FieldValue::Struct(values) => Value::Object(values_json(values)),
    }
}

fn attachment_json(attachment: &Attachment) -> Value {
    let mut out = Map::new();
    let mut put = |key: &str, value: &str| {
        if !value.is_empty() {
            out.insert(key.to_string(), Value::String(value.to_string()));
        }
    };
    put("id", &attachment.id);
    put("url", &attachment.url);
    put("filename", &attachment.filename);
    put("type", &attachment.mime_type);
    if attachment.size > 0.0 {
        out.insert("size".into(), Value::from(attachment.size));
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use airtab_core::Date;
    use chrono::{TimeZone, Utc};

    use crate::columns::DynamicFields;

    #[test]
    fn record_layout() {
        let mut values = FieldValues::new();
        values.insert("Name", "Alice");
        values.insert("Rating", 4);
        values.insert("Tags", vec!["a", "b"]);
        values.insert("Due", Date::new(""));

        let record = DynamicRecord {
            id: "rec1".to_string(),
            created_time: Some(Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap()),
            fields: DynamicFields(values),
        };

        assert_eq!(
            record_json(&record),
            json!({
                "id": "rec1",
                "createdTime": "2020-01-02T03:04:05+00:00",
                "fields": {"Name": "Alice", "Rating": 4, "Tags": ["a", "b"], "Due": null}
            })
        );
    }

    #[test]
    fn formula_results() {
        assert_eq!(
            value_json(&FieldValue::Formula(FormulaResult::Number(2.5))),
            json!(2.5)
        );
        assert_eq!(
            value_json(&FieldValue::Formula(FormulaResult::Error("#ERROR".into()))),
            json!({"error": "#ERROR"})
        );
        assert_eq!(value_json(&FieldValue::Formula(FormulaResult::Empty)), Value::Null);
    }

    #[test]
    fn attachments_skip_empty_members() {
        let attachment = Attachment::from_url("https://example.com/a.png").with_filename("a.png");
        assert_eq!(
            value_json(&FieldValue::Attachments(vec![attachment])),
            json!([{"url": "https://example.com/a.png", "filename": "a.png"}])
        );
    }
}
