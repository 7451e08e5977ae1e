#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let page = String::from_utf8_lossy(data);
    let extraction = tariffwatch::provider::extract_fees(&page);

    // Every rule either matched or is reported as missed
    assert!(extraction.components.found_count() <= 8);
    assert!(extraction.missed.len() <= 5);
    for value in [
        extraction.components.energy_tax_electricity_kwh,
        extraction.components.energy_tax_gas_m3,
        extraction.components.greening_fee_electricity_kwh,
    ]
    .into_iter()
    .flatten()
    {
        assert!(value.is_finite() && value >= 0.0);
    }
});
