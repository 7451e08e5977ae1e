#![no_main]
use chrono::{TimeZone, Utc};
use libfuzzer_sys::fuzz_target;
use tariffwatch::provider::SpotRecord;
use tariffwatch::provider::spot::select_current;

fuzz_target!(|data: &[u8]| {
    let Ok(records) = serde_json::from_slice::<Vec<SpotRecord>>(data) else {
        return;
    };
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 13, 30, 0).unwrap();
    if let Some(record) = select_current(&records, now) {
        assert!(record.timestamp <= now);
    }
});
