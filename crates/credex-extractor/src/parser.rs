//! Parse model replies into routing answers and schema records
//!
//! Replies are untrusted: they may wrap the object in markdown fences, add
//! prose around it, emit raw newlines inside strings or quote numbers. Each
//! reply is cut into candidates that are tried in order until one decodes
//! against the expected shape.

use crate::error::{CandidateFailure, ParseError, Strategy};
use credex_definitions::{ExtractionSchema, FieldSpec, FieldType, SchemaRecord, SchemaValue};
use credex_domain::OutputContract;
use serde_json::{Map, Value};
use tracing::{debug, warn};

const JSON_FENCE: &str = "```json";
const YAML_FENCES: [&str; 2] = ["```yaml", "```yml"];
const FENCE_END: &str = "```";
const FINAL_MARKER: &str = "assistantfinal";

/// Routing field of the main category judgment
pub const MAIN_CATEGORY_FIELD: &str = "mainCategory";

/// Routing field of the sub-category judgment
pub const SUB_CATEGORY_FIELD: &str = "subCategory";

/// Stateless reply parser
///
/// Never retries and never calls the provider.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResponseParser;

impl ResponseParser {
    /// Create a parser
    pub fn new() -> Self {
        Self
    }

    /// Id answered by the main category judgment
    pub fn parse_main_category(&self, raw: &str) -> Result<String, ParseError> {
        self.parse_routing_field(raw, MAIN_CATEGORY_FIELD)
    }

    /// Id answered by the sub-category judgment
    pub fn parse_sub_category(&self, raw: &str) -> Result<String, ParseError> {
        self.parse_routing_field(raw, SUB_CATEGORY_FIELD)
    }

    /// Decode an object holding `field` as a string and return that string
    pub fn parse_routing_field(&self, raw: &str, field: &str) -> Result<String, ParseError> {
        let mut failures = Vec::new();

        for (strategy, candidate) in json_candidates(raw) {
            let attempt = decode_json_object(&sanitize(candidate)).and_then(|map| {
                match map.get(field) {
                    Some(Value::String(id)) => Ok(id.trim().to_string()),
                    Some(other) => Err(format!("'{}' is not a string: {}", field, other)),
                    None => Err(format!("missing '{}'", field)),
                }
            });
            match attempt {
                Ok(id) => {
                    debug!(%strategy, field, id = %id, "Routing answer decoded");
                    return Ok(id);
                }
                Err(reason) => failures.push(CandidateFailure { strategy, reason }),
            }
        }

        Err(failed(raw, failures))
    }

    /// Decode an extraction reply against `schema`
    ///
    /// Integer fields must be integers within their declared bounds; quoted
    /// digit strings are accepted. Keys the schema does not declare are
    /// ignored.
    pub fn parse_schema_record(
        &self,
        raw: &str,
        schema: &ExtractionSchema,
        contract: OutputContract,
    ) -> Result<SchemaRecord, ParseError> {
        let integer_fields: Vec<&str> = schema.integer_fields().map(|f| f.name.as_str()).collect();
        let mut failures = Vec::new();

        for (strategy, candidate) in json_candidates(raw) {
            let normalized = normalize_integer_fields(&sanitize(candidate), &integer_fields);
            match decode_json_object(&normalized).and_then(|map| schema_record(&map, schema)) {
                Ok(record) => {
                    debug!(%strategy, fields = record.len(), "Extraction reply decoded");
                    return Ok(record);
                }
                Err(reason) => failures.push(CandidateFailure { strategy, reason }),
            }
        }

        if contract == OutputContract::Yaml {
            for (strategy, candidate) in yaml_candidates(raw) {
                let attempt = serde_yaml::from_str::<Value>(candidate)
                    .map_err(|e| e.to_string())
                    .and_then(|value| match value {
                        Value::Object(mut map) => {
                            coerce_digit_strings(&mut map, &integer_fields);
                            schema_record(&map, schema)
                        }
                        other => Err(format!("expected a mapping, found {}", kind(&other))),
                    });
                match attempt {
                    Ok(record) => {
                        debug!(%strategy, fields = record.len(), "Extraction reply decoded");
                        return Ok(record);
                    }
                    Err(reason) => failures.push(CandidateFailure { strategy, reason }),
                }
            }
        }

        Err(failed(raw, failures))
    }
}

fn failed(raw: &str, failures: Vec<CandidateFailure>) -> ParseError {
    warn!(candidates = failures.len(), raw = %raw, "No parse candidate decoded");
    ParseError {
        raw: raw.to_string(),
        failures,
    }
}

/// JSON candidates of a reply, in the order they are tried
///
/// Empty candidates and repeats of an earlier candidate are skipped.
pub fn json_candidates(raw: &str) -> Vec<(Strategy, &str)> {
    let found = [
        (Strategy::JsonFence, fenced(raw, JSON_FENCE)),
        (Strategy::FinalAnswerMarker, after_final_marker(raw)),
        (Strategy::Braces, braces(raw)),
        (Strategy::WholeText, Some(raw.trim())),
    ];
    distinct(found)
}

fn yaml_candidates(raw: &str) -> Vec<(Strategy, &str)> {
    let fence = YAML_FENCES.iter().find_map(|tag| fenced(raw, tag));
    distinct([(Strategy::YamlFence, fence), (Strategy::YamlText, Some(raw.trim()))])
}

fn distinct<'a, const N: usize>(found: [(Strategy, Option<&'a str>); N]) -> Vec<(Strategy, &'a str)> {
    let mut candidates: Vec<(Strategy, &str)> = Vec::with_capacity(N);
    for (strategy, text) in found {
        let Some(text) = text.filter(|t| !t.is_empty()) else {
            continue;
        };
        if candidates.iter().all(|(_, seen)| *seen != text) {
            candidates.push((strategy, text));
        }
    }
    candidates
}

fn fenced<'a>(text: &'a str, tag: &str) -> Option<&'a str> {
    let start = text.find(tag)? + tag.len();
    let rest = &text[start..];
    let end = rest.find(FENCE_END)?;
    Some(rest[..end].trim())
}

fn after_final_marker(text: &str) -> Option<&str> {
    // ASCII lowercasing keeps byte offsets valid for `text`
    let start = text.to_ascii_lowercase().rfind(FINAL_MARKER)? + FINAL_MARKER.len();
    let rest = text[start..].trim_start();
    Some(rest.strip_prefix(':').unwrap_or(rest).trim())
}

fn braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Escape raw control characters inside JSON strings
///
/// A single scan tracks whether it is inside a string, honoring backslash
/// escapes. Raw `\n`, `\r` and `\t` inside strings become two-character
/// escapes; nothing outside strings is touched. Applying it twice gives the
/// same result as applying it once.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if escaped {
            out.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => {
                out.push(c);
                escaped = true;
            }
            '"' => {
                out.push(c);
                in_string = !in_string;
            }
            '\n' if in_string => out.push_str("\\n"),
            '\r' if in_string => out.push_str("\\r"),
            '\t' if in_string => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

/// Rewrite `"field": "22"` to `"field": 22` for each of `fields`
///
/// Only a quoted run of digits directly followed by `,` or `}` is rewritten;
/// anything else under the key is left for the decoder to judge.
pub fn normalize_integer_fields(text: &str, fields: &[&str]) -> String {
    let mut out = text.to_string();
    for name in fields {
        out = unquote_integer(&out, name);
    }
    out
}

fn unquote_integer(text: &str, name: &str) -> String {
    let key = format!("\"{}\"", name);
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find(&key) {
        let (head, tail) = rest.split_at(pos + key.len());
        out.push_str(head);
        rest = match quoted_digits(tail) {
            Some((digits, remaining)) => {
                out.push_str(": ");
                out.push_str(digits);
                remaining
            }
            None => tail,
        };
    }
    out.push_str(rest);
    out
}

/// Split `  : " 22 " ,...` into the digits and the text after the closing quote
fn quoted_digits(text: &str) -> Option<(&str, &str)> {
    let value = text.trim_start().strip_prefix(':')?.trim_start().strip_prefix('"')?;
    let value = value.trim_start();
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    if end == 0 {
        return None;
    }
    let (digits, after) = value.split_at(end);
    let remaining = after.trim_start().strip_prefix('"')?;
    matches!(remaining.trim_start().chars().next(), Some(',' | '}')).then_some((digits, remaining))
}

fn decode_json_object(text: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("expected an object, found {}", kind(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn coerce_digit_strings(map: &mut Map<String, Value>, fields: &[&str]) {
    for name in fields {
        if let Some(value) = map.get_mut(*name) {
            let digits = match value {
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            };
            if let Some(n) = digits {
                *value = Value::from(n);
            }
        }
    }
}

fn schema_record(map: &Map<String, Value>, schema: &ExtractionSchema) -> Result<SchemaRecord, String> {
    let mut record = SchemaRecord::new(schema.sub_category);

    for field in &schema.fields {
        let value = match map.get(&field.name) {
            Some(value) => match field.field_type {
                FieldType::Integer => integer_value(field, value)?.map(SchemaValue::Integer),
                FieldType::String => text_value(value).map(SchemaValue::Text),
            },
            None => None,
        };
        match value {
            Some(value) => record.insert(field.name.clone(), value),
            None if field.required => return Err(format!("required '{}' is missing", field.name)),
            None => {}
        }
    }

    let ignored = map.keys().filter(|k| !schema.declares(k)).count();
    if ignored > 0 {
        debug!(sub_category = %schema.sub_category, ignored, "Reply has undeclared keys");
    }
    Ok(record)
}

fn integer_value(field: &FieldSpec, value: &Value) -> Result<Option<i64>, String> {
    let n = match value {
        Value::Null => return Ok(None),
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::Number(n) => n.as_i64(),
        _ => None,
    };
    let Some(n) = n else {
        return Err(format!("'{}' must be an integer, found {}", field.name, value));
    };
    if !field.accepts(n) {
        return Err(format!(
            "'{}' value {} is outside {}..={}",
            field.name,
            n,
            field.min.map_or_else(String::new, |m| m.to_string()),
            field.max.map_or_else(String::new, |m| m.to_string()),
        ));
    }
    Ok(Some(n))
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(text_value).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Object(_) => Some(value.to_string()),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
