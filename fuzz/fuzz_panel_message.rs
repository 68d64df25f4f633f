//! Fuzz target for the panel message and mapping decoders.
//!
//! Run with: cargo +nightly fuzz run fuzz_panel_message
//!
//! Arbitrary JSON must never panic the decoders, and decoded messages must
//! always route to a panel.

#![no_main]

use composer_core::mapping::{InstructionMapping, MappingStatus};
use composer_core::{InstructionId, PanelMessage, estimate};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(message) = PanelMessage::decode(s) {
        let _ = message.target();
        let _ = message.kind();
    }

    let mapping = InstructionMapping::from_json(s);
    let _ = MappingStatus::of(mapping.as_ref()).label();
    if let Some(mapping) = mapping {
        let _ = mapping.versions_header(&InstructionId::ALL);
    }

    let est = estimate(s);
    assert_eq!(est.approx_tokens, est.chars.div_ceil(4));
});
