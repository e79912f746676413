#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(payload) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    let series = agile_tracker::rates::normalize_payload(&payload);

    // Output must be sorted, unique and made of whole slots
    for pair in series.as_slice().windows(2) {
        assert!(pair[0].valid_from < pair[1].valid_from);
    }
    for slot in series.iter() {
        assert_eq!(slot.valid_to - slot.valid_from, agile_tracker::rates::slot_length());
    }
});
