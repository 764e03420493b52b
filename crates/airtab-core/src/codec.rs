//! Conversion between record types and the service's JSON envelopes.
//!
//! Decoding walks the `Fields` descriptor of the target record field by
//! field: each field's wire name is looked up in the response, and the wire
//! value is converted according to the field's declared kind. Fields the
//! response does not carry keep their zero value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use tracing::trace;

use crate::Result;
use crate::error::{Error, ParseError, TypeError};
use crate::record::{Fields, Record};
use crate::schema::{
    FieldDescriptor, FieldKind, Mode, RecordShape, StructShape, has_created_time,
};
use crate::types::{Attachment, Date, FieldValue, FieldValues, FormulaResult};

/// A single record as returned by the service.
#[derive(Debug, Deserialize)]
struct RecordEnvelope {
    #[serde(default)]
    id: String,
    #[serde(default)]
    fields: Map<String, Value>,
    #[serde(default, rename = "createdTime")]
    created_time: Option<String>,
}

/// One page of a list response.
#[derive(Debug, Deserialize)]
struct ListEnvelope {
    #[serde(default)]
    records: Vec<RecordEnvelope>,
    #[serde(default)]
    offset: Option<String>,
}

/// Body of a create or update request.
#[derive(Debug, Serialize)]
struct WriteEnvelope {
    fields: Map<String, Value>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    typecast: bool,
}

/// Response to a delete request.
#[derive(Debug, Deserialize)]
pub(crate) struct DeleteEnvelope {
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub id: String,
}

/// Decode a single record response into a new record.
pub fn decode_one<R: Record>(bytes: &[u8], shape: &RecordShape) -> Result<R> {
    let mut record = R::default();
    decode_into(bytes, shape, &mut record)?;
    Ok(record)
}

/// Decode a single record response onto an existing record.
///
/// The id, creation time and every field of `record` are replaced. Nothing
/// is changed if decoding fails.
pub fn decode_into<R: Record>(bytes: &[u8], shape: &RecordShape, record: &mut R) -> Result<()> {
    let envelope: RecordEnvelope = serde_json::from_slice(bytes)?;
    populate(envelope, shape, record)
}

/// Decode one page of a list response.
///
/// Returns the page's records in order and the cursor of the next page,
/// `None` when this was the last page.
pub fn decode_list<R: Record>(
    bytes: &[u8],
    shape: &RecordShape,
) -> Result<(Vec<R>, Option<String>)> {
    let envelope: ListEnvelope = serde_json::from_slice(bytes)?;
    trace!(
        records = envelope.records.len(),
        offset = ?envelope.offset,
        "decoding list page"
    );

    let records = envelope
        .records
        .into_iter()
        .map(|entry| {
            let mut record = R::default();
            populate(entry, shape, &mut record)?;
            Ok(record)
        })
        .collect::<Result<Vec<_>>>()?;

    let offset = envelope.offset.filter(|o| !o.is_empty());
    Ok((records, offset))
}

/// Encode a record's payload as a create/update body: `{"fields": {...}}`.
///
/// Only the payload is sent; the id and creation time never are. Formula
/// fields are computed by the service and are left out.
pub fn encode_for_write<R: Record>(record: &R, shape: &RecordShape, typecast: bool) -> Result<Vec<u8>> {
    let fields = fields_shape(shape)?;
    let values = record.fields().to_values();
    let body = WriteEnvelope {
        fields: encode_struct(fields, &values, "")?,
        typecast,
    };
    Ok(serde_json::to_vec(&body)?)
}

fn fields_shape(shape: &RecordShape) -> Result<&StructShape> {
    shape.fields().ok_or_else(|| {
        Error::from(TypeError::MissingFields {
            mode: Mode::Single,
            type_name: shape.type_name().to_string(),
        })
    })
}

fn populate<R: Record>(envelope: RecordEnvelope, shape: &RecordShape, record: &mut R) -> Result<()> {
    let fields = fields_shape(shape)?;
    let values = decode_struct(fields, &envelope.fields, "")?;
    let created_time = match envelope.created_time.as_deref() {
        Some(raw) if has_created_time(shape) => Some(parse_created_time(raw)?),
        _ => None,
    };

    let mut payload = R::Fields::default();
    payload.apply_values(values)?;

    record.set_id(envelope.id);
    record.set_created_time(created_time);
    *record.fields_mut() = payload;
    Ok(())
}

fn parse_created_time(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| ParseError::new("createdTime", "RFC 3339 timestamp", raw).into())
}

fn field_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn decode_struct(shape: &StructShape, wire: &Map<String, Value>, prefix: &str) -> Result<FieldValues> {
    let mut values = FieldValues::new();
    for field in shape.fields() {
        let raw = match wire.get(field.wire_name()) {
            None | Some(Value::Null) => continue,
            Some(raw) => raw,
        };
        let path = field_path(prefix, field.wire_name());
        values.insert(field.name(), decode_value(field, raw, &path)?);
    }
    Ok(values)
}

fn decode_value(field: &FieldDescriptor, raw: &Value, path: &str) -> Result<FieldValue> {
    let mismatch = |expected: &'static str| -> Error {
        ParseError::new(path, expected, json_kind(raw)).into()
    };

    match field.kind() {
        FieldKind::Text => raw
            .as_str()
            .map(|s| FieldValue::Text(s.to_string()))
            .ok_or_else(|| mismatch("string")),
        FieldKind::Integer => {
            let n = raw
                .as_i64()
                .or_else(|| raw.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
                .ok_or_else(|| mismatch("number"))?;
            if !field.accepts_integer(n) {
                return Err(ParseError::new(path, "integer in range", n.to_string()).into());
            }
            Ok(FieldValue::Integer(n))
        }
        FieldKind::Float => raw
            .as_f64()
            .map(FieldValue::Float)
            .ok_or_else(|| mismatch("number")),
        FieldKind::Checkbox => raw
            .as_bool()
            .map(FieldValue::Checkbox)
            .ok_or_else(|| mismatch("bool")),
        FieldKind::Date => raw
            .as_str()
            .map(|s| FieldValue::Date(Date::new(s)))
            .ok_or_else(|| mismatch("string")),
        FieldKind::StringList => {
            let items = raw.as_array().ok_or_else(|| mismatch("array of strings"))?;
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        Error::from(ParseError::new(format!("{path}[{i}]"), "string", json_kind(item)))
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(FieldValue::StringList)
        }
        FieldKind::Attachments => {
            let items = raw.as_array().ok_or_else(|| mismatch("array of objects"))?;
            let shape = Attachment::shape();
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let item_path = format!("{path}[{i}]");
                    let object = item.as_object().ok_or_else(|| {
                        Error::from(ParseError::new(&item_path, "object", json_kind(item)))
                    })?;
                    let mut attachment = Attachment::default();
                    attachment.apply_values(decode_struct(&shape, object, &item_path)?)?;
                    Ok(attachment)
                })
                .collect::<Result<Vec<_>>>()
                .map(FieldValue::Attachments)
        }
        FieldKind::Struct(shape) => {
            let object = raw.as_object().ok_or_else(|| mismatch("object"))?;
            decode_struct(shape, object, path).map(FieldValue::Struct)
        }
        FieldKind::Formula => decode_formula(raw, path).map(FieldValue::Formula),
        FieldKind::Unsupported(kind) => Err(Error::UnhandledType {
            field: path.to_string(),
            kind: kind.clone(),
        }),
    }
}

/// A formula evaluates to a number, a string, or `{"error": "#ERROR"}`.
///
/// Booleans and arrays are never formula results; they mean the field was
/// declared with the wrong type and are reported as such. An object without
/// a string `error` member is malformed data.
fn decode_formula(raw: &Value, path: &str) -> Result<FormulaResult> {
    match raw {
        Value::Number(n) => n
            .as_f64()
            .map(FormulaResult::Number)
            .ok_or_else(|| ParseError::new(path, "finite number", n.to_string()).into()),
        Value::String(s) => Ok(FormulaResult::Text(s.clone())),
        Value::Object(map) => match map.get("error") {
            Some(Value::String(e)) => Ok(FormulaResult::Error(e.clone())),
            _ => Err(ParseError::new(path, "object with an error string", "object").into()),
        },
        other => Err(Error::UnhandledType {
            field: path.to_string(),
            kind: format!("formula result of kind {}", json_kind(other)),
        }),
    }
}

fn encode_struct(shape: &StructShape, values: &FieldValues, prefix: &str) -> Result<Map<String, Value>> {
    let mut wire = Map::new();
    for field in shape.fields() {
        let Some(value) = values.get(field.name()) else {
            continue;
        };
        let path = field_path(prefix, field.wire_name());
        if let Some(encoded) = encode_value(field, value, &path)? {
            wire.insert(field.wire_name().to_string(), encoded);
        }
    }
    Ok(wire)
}

fn encode_value(field: &FieldDescriptor, value: &FieldValue, path: &str) -> Result<Option<Value>> {
    if let FieldKind::Unsupported(kind) = field.kind() {
        return Err(Error::UnhandledType {
            field: path.to_string(),
            kind: kind.clone(),
        });
    }

    let encoded = match value {
        FieldValue::Text(s) => Value::String(s.clone()),
        FieldValue::Integer(n) => Value::from(*n),
        FieldValue::Float(f) => Number::from_f64(*f)
            .map(Value::Number)
            .ok_or_else(|| ParseError::new(path, "finite number", f.to_string()))?,
        FieldValue::Checkbox(b) => Value::Bool(*b),
        FieldValue::Date(d) if d.is_empty() => Value::Null,
        FieldValue::Date(d) => Value::String(d.as_str().to_string()),
        FieldValue::StringList(list) => Value::from(list.clone()),
        FieldValue::Attachments(list) => serde_json::to_value(
            list.iter().map(Attachment::write_form).collect::<Vec<_>>(),
        )?,
        FieldValue::Formula(_) => return Ok(None),
        FieldValue::Struct(values) => match field.kind() {
            FieldKind::Struct(shape) => Value::Object(encode_struct(shape, values, path)?),
            other => {
                return Err(Error::FieldMismatch {
                    type_name: path.to_string(),
                    field: field.name().to_string(),
                    expected: other.to_string(),
                    got: value.kind_name().to_string(),
                });
            }
        },
    };
    Ok(Some(encoded))
}
