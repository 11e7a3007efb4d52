//! Convert schema records to canonical records

use credex_definitions::{MappingRule, SchemaRecord, SchemaValue};
use credex_domain::{parse_port, CanonicalField, CanonicalRecord};
use tracing::debug;

/// Applies mapping rules; pure and total
#[derive(Debug, Default, Clone, Copy)]
pub struct FieldMapper;

impl FieldMapper {
    /// Map `record` to a canonical record using `rule`
    ///
    /// Entries are visited in schema order. A direct mapping only fills an
    /// unset canonical field, so the first source wins when several map to
    /// the same target. Note-append entries become `label: value` lines
    /// added after any existing note, separated by a blank line.
    pub fn map(record: &SchemaRecord, rule: &MappingRule) -> CanonicalRecord {
        let mut canonical = CanonicalRecord::new();
        let mut note_lines = Vec::new();

        for (name, value) in record.entries() {
            if let Some(target) = rule.direct_mapping.get(name) {
                match CanonicalField::from_wire_name(target) {
                    Some(field) => assign(&mut canonical, field, value),
                    None => debug!(source = name, target = %target, "Mapping target is not canonical"),
                }
            }
            if let Some(label) = rule.note_append_mapping.get(name) {
                if let Some(text) = value.as_text() {
                    note_lines.push(format!("{}: {}", label, text));
                }
            }
        }

        if !note_lines.is_empty() {
            let appended = note_lines.join("\n");
            canonical.note = Some(match canonical.note.take() {
                Some(existing) if !existing.trim().is_empty() => {
                    format!("{}\n\n{}", existing, appended)
                }
                _ => appended,
            });
        }

        canonical
    }
}

fn assign(record: &mut CanonicalRecord, field: CanonicalField, value: &SchemaValue) {
    match field {
        CanonicalField::Port => {
            if record.port.is_none() {
                record.port = match value {
                    SchemaValue::Integer(n) => u16::try_from(*n).ok().filter(|p| *p > 0),
                    SchemaValue::Text(text) => parse_port(text),
                };
            }
        }
        CanonicalField::Confidence => {
            if record.confidence.is_none() {
                record.confidence = match value {
                    SchemaValue::Integer(n) => Some(*n as f64),
                    SchemaValue::Text(text) => text.trim().parse().ok(),
                };
            }
        }
        _ => {
            let slot = match field {
                CanonicalField::Title => &mut record.title,
                CanonicalField::UserId => &mut record.user_id,
                CanonicalField::Password => &mut record.password,
                CanonicalField::Url => &mut record.url,
                CanonicalField::Number => &mut record.number,
                CanonicalField::Note => &mut record.note,
                CanonicalField::Host => &mut record.host,
                CanonicalField::AuthKey => &mut record.auth_key,
                CanonicalField::Port | CanonicalField::Confidence => return,
            };
            if slot.is_none() {
                *slot = value.as_text();
            }
        }
    }
}
