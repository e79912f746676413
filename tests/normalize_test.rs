use agile_tracker::rates::{SlotSeries, normalize};
use serde_json::{Value, json};

fn record(from: &str, to: &str, price: f64) -> Value {
    json!({"valid_from": from, "valid_to": to, "value_inc_vat": price})
}

/// Shape of a page as the provider sends it: newest first
fn provider_page() -> Vec<Value> {
    vec![
        record("2025-01-15T01:00:00Z", "2025-01-15T01:30:00Z", 14.7),
        record("2025-01-15T00:30:00Z", "2025-01-15T01:00:00Z", 16.2),
        record("2025-01-15T00:00:00Z", "2025-01-15T00:30:00Z", 18.9),
    ]
}

#[test]
fn output_is_sorted_by_start() {
    let series = normalize(&provider_page());
    assert_eq!(series.len(), 3);
    for pair in series.as_slice().windows(2) {
        assert!(pair[0].valid_from < pair[1].valid_from);
        assert_eq!(pair[0].valid_to, pair[1].valid_from);
    }
    assert!((series.first().unwrap().value_inc_vat - 18.9).abs() < 1e-12);
}

#[test]
fn renormalizing_output_is_identity() {
    let once = normalize(&provider_page());
    let twice = normalize(&once.to_raw());
    assert_eq!(once, twice);
}

#[test]
fn duplicate_start_keeps_later_record() {
    let raw = vec![
        record("2025-01-15T00:00:00Z", "2025-01-15T00:30:00Z", 10.0),
        record("2025-01-15T00:30:00Z", "2025-01-15T01:00:00Z", 11.0),
        // Overlapping page repeats the first slot with a revised price
        record("2025-01-15T00:00:00+00:00", "2025-01-15T00:30:00+00:00", 12.5),
    ];
    let series = normalize(&raw);
    assert_eq!(series.len(), 2);
    assert!((series.first().unwrap().value_inc_vat - 12.5).abs() < 1e-12);
}

#[test]
fn records_not_exactly_one_slot_long_are_dropped() {
    let raw = vec![
        record("2025-01-15T00:00:00Z", "2025-01-15T00:30:00Z", 10.0),
        record("2025-01-15T00:30:00Z", "2025-01-15T01:30:00Z", 11.0),
        record("2025-01-15T01:30:00Z", "2025-01-15T01:45:00Z", 12.0),
        record("2025-01-15T02:00:00Z", "2025-01-15T02:00:00Z", 13.0),
    ];
    let series = normalize(&raw);
    assert_eq!(series.len(), 1);
    assert!(
        series
            .iter()
            .all(|s| s.valid_to - s.valid_from == chrono::Duration::minutes(30))
    );
}

#[test]
fn garbage_records_do_not_fail_the_batch() {
    let mut raw = provider_page();
    raw.push(json!(42));
    raw.push(json!({"valid_from": "2025-01-15T02:00:00Z"}));
    raw.push(json!(null));
    assert_eq!(normalize(&raw).len(), 3);
}

#[test]
fn negative_prices_are_kept() {
    let raw = vec![record("2025-01-15T13:00:00Z", "2025-01-15T13:30:00Z", -2.1)];
    let series = normalize(&raw);
    assert!(series.first().unwrap().price() < 0.0);
}

#[test]
fn empty_input_gives_empty_series() {
    assert_eq!(normalize(&[]), SlotSeries::default());
}
