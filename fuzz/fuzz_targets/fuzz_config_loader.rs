#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;
use valentine::config::ConfigLoader;

fuzz_target!(|data: &[u8]| {
    if let Ok(yaml) = std::str::from_utf8(data) {
        // Env expansion, parsing and validation must never panic.
        let _ = ConfigLoader::with_defaults().load_str(yaml, Path::new("<fuzz>"));
    }
});
