//! Raw provider records to a canonical slot series
//!
//! Records are parsed one by one; anything unparseable or not exactly one slot
//! long is dropped without failing the batch. Duplicated start times resolve
//! to the record seen last.

use super::types::{RateSlot, SlotSeries, slot_length};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Normalize a batch of raw provider records
pub fn normalize(raw: &[Value]) -> SlotSeries {
    SlotSeries::from_slots(raw.iter().filter_map(parse_record))
}

/// Normalize a cached payload (a JSON array of raw records)
pub fn normalize_payload(payload: &Value) -> SlotSeries {
    payload
        .as_array()
        .map(|records| normalize(records))
        .unwrap_or_default()
}

/// Parse a single record, `None` if any field is unusable
pub fn parse_record(record: &Value) -> Option<RateSlot> {
    let valid_from = parse_instant(record.get("valid_from")?)?;
    let valid_to = parse_instant(record.get("valid_to")?)?;
    if valid_to - valid_from != slot_length() {
        return None;
    }
    let value_inc_vat = record.get("value_inc_vat")?.as_f64()?;
    if !value_inc_vat.is_finite() {
        return None;
    }
    Some(RateSlot {
        valid_from,
        valid_to,
        value_inc_vat,
    })
}

fn parse_instant(value: &Value) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.as_str()?.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn offsets_are_converted_to_utc() {
        let slot = parse_record(&json!({
            "valid_from": "2025-07-01T13:00:00+01:00",
            "valid_to": "2025-07-01T13:30:00+01:00",
            "value_inc_vat": 12.5
        }))
        .unwrap();
        assert_eq!(slot.valid_from.to_rfc3339(), "2025-07-01T12:00:00+00:00");
        assert!((slot.price() - 0.125).abs() < 1e-12);
    }

    #[test]
    fn missing_or_bad_fields_drop_the_record() {
        assert!(parse_record(&json!({"valid_from": "2025-01-01T00:00:00Z"})).is_none());
        assert!(
            parse_record(&json!({
                "valid_from": "yesterday",
                "valid_to": "2025-01-01T00:30:00Z",
                "value_inc_vat": 1.0
            }))
            .is_none()
        );
        assert!(
            parse_record(&json!({
                "valid_from": "2025-01-01T00:00:00Z",
                "valid_to": "2025-01-01T00:30:00Z",
                "value_inc_vat": "cheap"
            }))
            .is_none()
        );
        // Open-ended periods have a null end
        assert!(
            parse_record(&json!({
                "valid_from": "2025-01-01T00:00:00Z",
                "valid_to": null,
                "value_inc_vat": 1.0
            }))
            .is_none()
        );
    }

    #[test]
    fn non_array_payload_is_empty() {
        assert!(normalize_payload(&json!({"results": []})).is_empty());
        assert!(normalize_payload(&json!("oops")).is_empty());
    }
}
