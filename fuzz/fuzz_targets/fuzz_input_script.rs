#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(data);
    if let Ok(rows) = cruise_config::parse_input_script(rdr) {
        // accepted scripts are strictly ordered
        assert!(rows.windows(2).all(|w| w[0].at_ms < w[1].at_ms));
    }
});
