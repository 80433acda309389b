// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use tracing_subscriber::EnvFilter;

/// Level directive for the crate given the configured level and `-v` count.
pub fn directive(configured: &str, verbosity: u8) -> String {
    let level = match verbosity {
        0 => configured,
        1 => "debug",
        _ => "trace",
    };
    format!("pocketbook={}", level)
}

/// Install the stderr subscriber. `RUST_LOG` wins over everything else.
pub fn init(configured: &str, verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive(configured, verbosity)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
