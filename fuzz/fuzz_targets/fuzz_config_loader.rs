#![no_main]
use libfuzzer_sys::fuzz_target;

// Arbitrary text must either fail to parse or validate without panicking.
fuzz_target!(|data: &str| {
    if let Ok(cfg) = toml::from_str::<cruise_config::Config>(data) {
        let _ = cfg.validate();
    }
});
