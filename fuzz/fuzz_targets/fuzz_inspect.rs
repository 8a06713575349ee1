// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use polybin::{CodecConfig, Inspector};

fuzz_target!(|data: &[u8]| {
    let config = CodecConfig::default()
        .with_max_collection_len(1 << 16)
        .with_max_string_len(1 << 16);
    for value in Inspector::with_config(data, config) {
        match value {
            // Rendering must not panic either
            Ok(v) => {
                let _ = v.to_string();
                let _ = v.to_json();
            }
            Err(_) => break,
        }
    }
});
