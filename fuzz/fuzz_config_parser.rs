//! Fuzz target for the workspace settings parser.
//!
//! Run with: cargo +nightly fuzz run fuzz_config_parser
//!
//! Feeds arbitrary text to `ComposerConfig::parse()`. Anything that parses
//! must validate, render back to TOML, and parse again to the same value.

#![no_main]

use composer_config::ComposerConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = ComposerConfig::parse(s) {
        let rendered = config.to_toml().expect("parsed settings must render");
        let reparsed = ComposerConfig::parse(&rendered).expect("rendered settings must parse");
        assert_eq!(config, reparsed);
    }
});
