//! Fuzz target for operation-set document parsing.
//!
//! Goal: The parser should **never panic** on any input.
//! Unknown module names must turn into stubs, never into errors or panics.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_opset_parser
//! ```

#![no_main]

use bimqa_domain::{ConfigInstance, HostCatalog, ModuleRegistry};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let _ = bimqa_types::peek_config_type(text);

    let Ok(registry) = ModuleRegistry::with_builtin_modules(HostCatalog::default()) else {
        return;
    };
    if let Ok(ConfigInstance::OperationSet(set)) = ConfigInstance::from_json(text, &registry) {
        // Whatever parsed must serialize back.
        let _ = set.to_json();
    }
});
