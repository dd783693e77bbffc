//! Fuzz target for model snapshot parsing.
//!
//! Goal: Loading a snapshot should **never panic**, including snapshots with
//! dangling view/tag references or duplicate ids.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_snapshot_parser
//! ```

#![no_main]

use bimqa_domain::{HostCatalog, MemoryDocument};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = bimqa_domain::parse_snapshot(text);

        if let Ok(doc) = MemoryDocument::from_json(text) {
            let _ = HostCatalog::from_document(&doc);
        }
    }
});
