// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding the log filter, e.g. `fintrack=debug`.
pub const LOG_ENV: &str = "FINTRACK_LOG";
pub const DEFAULT_FILTER: &str = "fintrack=warn";

static TRACING_INIT: Once = Once::new();

/// Installs the global subscriber. Logs go to stderr so `--json` output on
/// stdout stays machine readable.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    });
}
